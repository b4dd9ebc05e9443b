/// Lower-cases and strips Portuguese diacritics so that "Amanhã", "amanha"
/// and "AMANHÃ" compare equal.
pub fn fold(text: &str) -> String {
    text.trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'í' | 'ì' | 'î' | 'ï' => 'i',
            'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
            'ú' | 'ù' | 'û' | 'ü' => 'u',
            'ç' => 'c',
            other => other,
        })
        .collect()
}

/// Collapses runs of whitespace into single spaces.
pub fn squash_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fold() {
        assert_eq!(fold("  Amanhã "), "amanha");
        assert_eq!(fold("Terça-Feira"), "terca-feira");
        assert_eq!(fold("SÁBADO"), "sabado");
        assert_eq!(fold("Clínica Geral"), "clinica geral");
    }

    #[test]
    fn test_squash_whitespace() {
        assert_eq!(squash_whitespace("  Maria   de  Souza "), "Maria de Souza");
    }
}
