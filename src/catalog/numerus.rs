use serde::Serialize;

/// How a language picks between plural forms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum PluralRule {
    /// A single form for every count (Chinese, Japanese, Korean, ...)
    Single,
    /// "one" for 1, "other" for everything else
    #[default]
    OneOther,
    /// 0 and 1 are singular (French, Brazilian Portuguese)
    French,
    /// one / few / many (Russian, Ukrainian, Serbian, Croatian, ...)
    EastSlavic,
    Polish,
    /// one / few (2-4) / other
    Czech,
    /// one / few (0 and 2-19 modulo 100) / other
    Romanian,
}

impl PluralRule {
    /// Rule for a language code such as `de`, `zh_CN` or `pt-BR`
    pub fn for_language(code: &str) -> Self {
        let normalized = code.replace('-', "_").to_ascii_lowercase();
        let lang = normalized.split('_').next().unwrap_or_default();
        match lang {
            "zh" | "ja" | "ko" | "id" | "ms" | "vi" | "th" | "tr" | "lo" | "my" => Self::Single,
            "fr" => Self::French,
            "pt" if normalized == "pt_br" => Self::French,
            "ru" | "uk" | "be" | "sr" | "hr" | "bs" => Self::EastSlavic,
            "pl" => Self::Polish,
            "cs" | "sk" => Self::Czech,
            "ro" => Self::Romanian,
            _ => Self::OneOther,
        }
    }

    pub fn form_count(self) -> usize {
        match self {
            Self::Single => 1,
            Self::OneOther | Self::French => 2,
            Self::EastSlavic | Self::Polish | Self::Czech | Self::Romanian => 3,
        }
    }

    /// Index of the numerus form to use for `n`
    pub fn form_index(self, n: i64) -> usize {
        let n = n.unsigned_abs();
        let (m10, m100) = (n % 10, n % 100);
        match self {
            Self::Single => 0,
            Self::OneOther => usize::from(n != 1),
            Self::French => usize::from(n > 1),
            Self::EastSlavic => {
                if m10 == 1 && m100 != 11 {
                    0
                } else if (2..=4).contains(&m10) && !(12..=14).contains(&m100) {
                    1
                } else {
                    2
                }
            }
            Self::Polish => {
                if n == 1 {
                    0
                } else if (2..=4).contains(&m10) && !(12..=14).contains(&m100) {
                    1
                } else {
                    2
                }
            }
            Self::Czech => match n {
                1 => 0,
                2..=4 => 1,
                _ => 2,
            },
            Self::Romanian => {
                if n == 1 {
                    0
                } else if n == 0 || (1..=19).contains(&m100) {
                    1
                } else {
                    2
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_mapping() {
        assert_eq!(PluralRule::for_language("zh_CN"), PluralRule::Single);
        assert_eq!(PluralRule::for_language("ko_KR"), PluralRule::Single);
        assert_eq!(PluralRule::for_language("de"), PluralRule::OneOther);
        assert_eq!(PluralRule::for_language("es_ES"), PluralRule::OneOther);
        assert_eq!(PluralRule::for_language("fr"), PluralRule::French);
        assert_eq!(PluralRule::for_language("pt-BR"), PluralRule::French);
        assert_eq!(PluralRule::for_language("pt_PT"), PluralRule::OneOther);
        assert_eq!(PluralRule::for_language("ru_RU"), PluralRule::EastSlavic);
        assert_eq!(PluralRule::for_language("ro_RO"), PluralRule::Romanian);
    }

    #[test]
    fn test_east_slavic_forms() {
        let rule = PluralRule::EastSlavic;
        assert_eq!(rule.form_index(1), 0);
        assert_eq!(rule.form_index(21), 0);
        assert_eq!(rule.form_index(11), 2);
        assert_eq!(rule.form_index(3), 1);
        assert_eq!(rule.form_index(13), 2);
        assert_eq!(rule.form_index(5), 2);
        assert_eq!(rule.form_index(0), 2);
    }

    #[test]
    fn test_romanian_forms() {
        let rule = PluralRule::Romanian;
        assert_eq!(rule.form_index(1), 0);
        assert_eq!(rule.form_index(0), 1);
        assert_eq!(rule.form_index(19), 1);
        assert_eq!(rule.form_index(20), 2);
        assert_eq!(rule.form_index(101), 1);
    }

    #[test]
    fn test_french_and_single() {
        assert_eq!(PluralRule::French.form_index(0), 0);
        assert_eq!(PluralRule::French.form_index(2), 1);
        assert_eq!(PluralRule::Single.form_index(42), 0);
        assert_eq!(PluralRule::Single.form_count(), 1);
    }

    #[test]
    fn test_forms_within_count() {
        for rule in [
            PluralRule::Single,
            PluralRule::OneOther,
            PluralRule::French,
            PluralRule::EastSlavic,
            PluralRule::Polish,
            PluralRule::Czech,
            PluralRule::Romanian,
        ] {
            for n in -5..250 {
                assert!(rule.form_index(n) < rule.form_count());
            }
        }
    }
}
