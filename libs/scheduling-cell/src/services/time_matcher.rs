use regex::Regex;
use tracing::debug;

use super::text::fold;

/// Picks one of the offered `HH:MM` slots from free text.
///
/// Tried in order: a slot written out literally, an hour number ("às 9h"),
/// then an ordinal ("o segundo").
pub struct TimeChoiceMatcher {
    digits: Regex,
}

impl Default for TimeChoiceMatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeChoiceMatcher {
    pub fn new() -> Self {
        Self {
            digits: Regex::new(r"\d+").expect("digit pattern is valid"),
        }
    }

    pub fn match_choice<'a>(&self, raw_text: &str, candidates: &'a [String]) -> Option<&'a str> {
        let text = raw_text.to_lowercase();

        if let Some(exact) = candidates.iter().find(|c| text.contains(c.as_str())) {
            debug!("Time '{}' matched literally", exact);
            return Some(exact.as_str());
        }

        for run in self.digits.find_iter(&text) {
            let hour = format!("{:0>2}", run.as_str());
            let hit = candidates
                .iter()
                .find(|c| c.split(':').next().map(|h| h.starts_with(&hour)).unwrap_or(false));
            if let Some(slot) = hit {
                debug!("Time '{}' matched by hour {}", slot, hour);
                return Some(slot.as_str());
            }
        }

        let folded = fold(&text);
        let position = folded
            .split(|c: char| !c.is_ascii_alphanumeric())
            .find_map(ordinal_index);

        match position {
            Some(index) if index < candidates.len() => {
                debug!("Time '{}' matched by position {}", candidates[index], index + 1);
                Some(candidates[index].as_str())
            }
            Some(index) => {
                debug!("Position {} is outside the {} offered slots", index + 1, candidates.len());
                None
            }
            None => None,
        }
    }
}

fn ordinal_index(word: &str) -> Option<usize> {
    match word {
        "primeiro" | "primeira" | "1" => Some(0),
        "segundo" | "segunda" | "2" => Some(1),
        "terceiro" | "terceira" | "3" => Some(2),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slots(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn pick(text: &str, candidates: &[&str]) -> Option<String> {
        let candidates = slots(candidates);
        TimeChoiceMatcher::new()
            .match_choice(text, &candidates)
            .map(str::to_string)
    }

    #[test]
    fn test_exact_candidate_is_returned_unchanged() {
        let offered = ["09:00", "10:30", "14:00"];
        for slot in offered {
            assert_eq!(pick(slot, &offered).as_deref(), Some(slot));
        }
        assert_eq!(pick("pode ser 10:30?", &offered).as_deref(), Some("10:30"));
    }

    #[test]
    fn test_hour_number_is_zero_padded() {
        assert_eq!(pick("às 9h", &["09:00", "14:00"]).as_deref(), Some("09:00"));
        assert_eq!(pick("14 horas", &["09:00", "14:00"]).as_deref(), Some("14:00"));
    }

    #[test]
    fn test_hour_number_takes_first_candidate_in_order() {
        assert_eq!(pick("as 10", &["10:30", "10:00"]).as_deref(), Some("10:30"));
    }

    #[test]
    fn test_ordinal_words() {
        let offered = ["09:00", "10:00", "11:00"];
        assert_eq!(pick("quero o segundo horário", &offered).as_deref(), Some("10:00"));
        assert_eq!(pick("o primeiro", &offered).as_deref(), Some("09:00"));
        assert_eq!(pick("A TERCEIRA opção", &offered).as_deref(), Some("11:00"));
    }

    #[test]
    fn test_digit_ordinal_when_no_hour_matches() {
        assert_eq!(pick("opção 1", &["09:00", "10:00"]).as_deref(), Some("09:00"));
        assert_eq!(pick("o 2º", &["09:00", "10:00"]).as_deref(), Some("10:00"));
    }

    #[test]
    fn test_out_of_bounds_ordinal_is_invalid() {
        assert_eq!(pick("o terceiro", &["09:00", "10:00"]), None);
    }

    #[test]
    fn test_unmatched_text_is_invalid() {
        assert_eq!(pick("de tarde", &["09:00", "10:00"]), None);
        assert_eq!(pick("às 16h", &["09:00", "10:00"]), None);
        assert_eq!(pick("o primeiro", &[]), None);
    }
}
