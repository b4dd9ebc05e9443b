use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc, Weekday};
use regex::Regex;
use tracing::debug;

use super::text::fold;

/// A calendar date resolved from user text, pinned to midday UTC so that
/// deriving the lookup key never crosses a day boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedDate {
    pub at_midday: DateTime<Utc>,
}

impl ResolvedDate {
    fn from_date(date: NaiveDate) -> Option<Self> {
        let midday = date.and_hms_opt(12, 0, 0)?;
        Some(Self {
            at_midday: Utc.from_utc_datetime(&midday),
        })
    }

    pub fn date(&self) -> NaiveDate {
        self.at_midday.date_naive()
    }

    /// `YYYY-MM-DD`, as expected by the availability endpoint.
    pub fn date_key(&self) -> String {
        self.date().format("%Y-%m-%d").to_string()
    }
}

/// Turns Portuguese date expressions into calendar dates.
///
/// Rules are tried in order and the first one that matches wins:
/// `DD/MM[/YYYY]`, `hoje`, `amanhã`, then a weekday name.
pub struct DateResolver {
    numeric: Regex,
    today: Regex,
    tomorrow: Regex,
    weekday: Regex,
}

impl Default for DateResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl DateResolver {
    pub fn new() -> Self {
        Self {
            numeric: Regex::new(r"\b(\d{1,2})/(\d{1,2})(?:/(\d+))?\b")
                .expect("numeric date pattern is valid"),
            today: Regex::new(r"\bhoje\b").expect("today pattern is valid"),
            tomorrow: Regex::new(r"\bamanha\b").expect("tomorrow pattern is valid"),
            weekday: Regex::new(r"\b(segunda|terca|quarta|quinta|sexta|sabado|domingo)(?:-feira)?\b")
                .expect("weekday pattern is valid"),
        }
    }

    pub fn resolve(&self, raw_text: &str, reference_now: DateTime<Utc>) -> Option<ResolvedDate> {
        let text = fold(raw_text);
        let today = reference_now.date_naive();

        let date = if let Some(caps) = self.numeric.captures(&text) {
            let day: u32 = caps[1].parse().ok()?;
            let month: u32 = caps[2].parse().ok()?;
            match caps.get(3) {
                Some(year) => {
                    let year = expand_year(year.as_str())?;
                    NaiveDate::from_ymd_opt(year, month, day)?
                }
                None => next_occurrence(today, month, day)?,
            }
        } else if self.today.is_match(&text) {
            today
        } else if self.tomorrow.is_match(&text) {
            today + Duration::days(1)
        } else if let Some(caps) = self.weekday.captures(&text) {
            let target = parse_weekday(&caps[1])?;
            next_weekday_after(today, target)
        } else {
            debug!("No date rule matched '{}'", raw_text);
            return None;
        };

        let resolved = ResolvedDate::from_date(date)?;
        debug!("Resolved '{}' to {}", raw_text, resolved.date_key());
        Some(resolved)
    }
}

/// Two-digit years below 50 belong to this century, the rest to the last one.
/// Any other length is not a year.
fn expand_year(raw: &str) -> Option<i32> {
    let year: i32 = raw.parse().ok()?;
    match raw.len() {
        2 => Some(if year < 50 { 2000 + year } else { 1900 + year }),
        4 => Some(year),
        _ => None,
    }
}

/// First `day/month` on or after `today`. 29/02 waits for the next leap year.
fn next_occurrence(today: NaiveDate, month: u32, day: u32) -> Option<NaiveDate> {
    (today.year()..=today.year() + 8)
        .filter_map(|year| NaiveDate::from_ymd_opt(year, month, day))
        .find(|date| *date >= today)
}

fn parse_weekday(name: &str) -> Option<Weekday> {
    match name {
        "segunda" => Some(Weekday::Mon),
        "terca" => Some(Weekday::Tue),
        "quarta" => Some(Weekday::Wed),
        "quinta" => Some(Weekday::Thu),
        "sexta" => Some(Weekday::Fri),
        "sabado" => Some(Weekday::Sat),
        "domingo" => Some(Weekday::Sun),
        _ => None,
    }
}

/// Next occurrence of `target` strictly after `from`; a week later when `from` already is `target`.
fn next_weekday_after(from: NaiveDate, target: Weekday) -> NaiveDate {
    let current = from.weekday().num_days_from_monday() as i64;
    let wanted = target.num_days_from_monday() as i64;
    let mut days_ahead = (wanted - current).rem_euclid(7);
    if days_ahead == 0 {
        days_ahead = 7;
    }
    from + Duration::days(days_ahead)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Sunday, 18 October 2026, late evening UTC.
    fn reference() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 18, 22, 30, 0).unwrap()
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn resolve(text: &str) -> Option<NaiveDate> {
        DateResolver::new().resolve(text, reference()).map(|r| r.date())
    }

    #[test]
    fn test_numeric_date_this_year() {
        assert_eq!(resolve("25/10"), Some(ymd(2026, 10, 25)));
        assert_eq!(resolve("pode ser dia 5/12?"), Some(ymd(2026, 12, 5)));
    }

    #[test]
    fn test_numeric_date_today_is_not_rolled() {
        assert_eq!(resolve("18/10"), Some(ymd(2026, 10, 18)));
    }

    #[test]
    fn test_past_numeric_date_rolls_to_next_year() {
        assert_eq!(resolve("17/10"), Some(ymd(2027, 10, 17)));
        assert_eq!(resolve("01/01"), Some(ymd(2027, 1, 1)));
        assert_eq!(resolve("15/03"), Some(ymd(2027, 3, 15)));
    }

    #[test]
    fn test_numeric_date_with_year() {
        assert_eq!(resolve("10/11/2026"), Some(ymd(2026, 11, 10)));
        assert_eq!(resolve("10/11/27"), Some(ymd(2027, 11, 10)));
        assert_eq!(resolve("10/11/99"), Some(ymd(1999, 11, 10)));
    }

    #[test]
    fn test_explicit_year_is_never_rolled() {
        assert_eq!(resolve("01/01/2026"), Some(ymd(2026, 1, 1)));
    }

    #[test]
    fn test_impossible_numeric_date_is_invalid() {
        assert_eq!(resolve("31/02"), None);
        assert_eq!(resolve("12/13"), None);
        assert_eq!(resolve("00/10"), None);
    }

    #[test]
    fn test_malformed_year_is_invalid() {
        assert_eq!(resolve("10/11/202"), None);
        assert_eq!(resolve("10/11/20261"), None);
        assert_eq!(resolve("10/11/2"), None);
    }

    #[test]
    fn test_leap_day_without_year_waits_for_leap_year() {
        assert_eq!(resolve("29/02"), Some(ymd(2028, 2, 29)));
        assert_eq!(resolve("29/02/2027"), None);
    }

    #[test]
    fn test_numeric_takes_precedence_over_keywords() {
        assert_eq!(resolve("amanhã não, 30/10"), Some(ymd(2026, 10, 30)));
    }

    #[test]
    fn test_today_and_tomorrow() {
        assert_eq!(resolve("hoje"), Some(ymd(2026, 10, 18)));
        assert_eq!(resolve("Amanhã"), Some(ymd(2026, 10, 19)));
        assert_eq!(resolve("pode ser amanha de manhã"), Some(ymd(2026, 10, 19)));
    }

    #[test]
    fn test_weekday_names() {
        assert_eq!(resolve("segunda"), Some(ymd(2026, 10, 19)));
        assert_eq!(resolve("terça-feira"), Some(ymd(2026, 10, 20)));
        assert_eq!(resolve("quarta feira"), Some(ymd(2026, 10, 21)));
        assert_eq!(resolve("na quinta"), Some(ymd(2026, 10, 22)));
        assert_eq!(resolve("sexta-feira"), Some(ymd(2026, 10, 23)));
        assert_eq!(resolve("sábado"), Some(ymd(2026, 10, 24)));
    }

    #[test]
    fn test_same_weekday_advances_a_week() {
        assert_eq!(resolve("domingo"), Some(ymd(2026, 10, 25)));

        for offset in 0..7 {
            let now = reference() + Duration::days(offset);
            let name = match now.weekday() {
                Weekday::Mon => "segunda",
                Weekday::Tue => "terça",
                Weekday::Wed => "quarta",
                Weekday::Thu => "quinta",
                Weekday::Fri => "sexta",
                Weekday::Sat => "sábado",
                Weekday::Sun => "domingo",
            };
            let resolved = DateResolver::new().resolve(name, now).unwrap();
            assert_eq!(resolved.date(), now.date_naive() + Duration::days(7));
        }
    }

    #[test]
    fn test_unrecognized_text_is_invalid() {
        assert_eq!(resolve("semana que vem"), None);
        assert_eq!(resolve(""), None);
        assert_eq!(resolve("depois"), None);
    }

    #[test]
    fn test_resolved_date_is_pinned_to_midday() {
        let resolved = DateResolver::new().resolve("amanhã", reference()).unwrap();

        assert_eq!(resolved.at_midday, Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap());
        assert_eq!(resolved.date_key(), "2026-10-19");
    }
}
