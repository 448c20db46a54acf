//! Language codes understood by the prompt builder.
//!
//! Codes outside the table are passed through to the prompt unchanged, so a
//! host may send any name or code the model understands.

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LanguageCode {
    En,
    Zh,
    ZhCn,
    ZhTw,
    Ja,
    Ko,
    Fr,
    Es,
    De,
    Ru,
    It,
    Pt,
    Ar,
    Hi,
    Th,
    Vi,
    Tr,
    Auto,
}

impl LanguageCode {
    pub const ALL: [LanguageCode; 18] = [
        Self::En,
        Self::Zh,
        Self::ZhCn,
        Self::ZhTw,
        Self::Ja,
        Self::Ko,
        Self::Fr,
        Self::Es,
        Self::De,
        Self::Ru,
        Self::It,
        Self::Pt,
        Self::Ar,
        Self::Hi,
        Self::Th,
        Self::Vi,
        Self::Tr,
        Self::Auto,
    ];

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|lang| lang.code() == code)
    }

    pub fn code(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Zh => "zh",
            Self::ZhCn => "zh_cn",
            Self::ZhTw => "zh_tw",
            Self::Ja => "ja",
            Self::Ko => "ko",
            Self::Fr => "fr",
            Self::Es => "es",
            Self::De => "de",
            Self::Ru => "ru",
            Self::It => "it",
            Self::Pt => "pt",
            Self::Ar => "ar",
            Self::Hi => "hi",
            Self::Th => "th",
            Self::Vi => "vi",
            Self::Tr => "tr",
            Self::Auto => "auto",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::En => "English",
            Self::Zh => "Chinese",
            Self::ZhCn => "Chinese Simplified",
            Self::ZhTw => "Chinese Traditional",
            Self::Ja => "Japanese",
            Self::Ko => "Korean",
            Self::Fr => "French",
            Self::Es => "Spanish",
            Self::De => "German",
            Self::Ru => "Russian",
            Self::It => "Italian",
            Self::Pt => "Portuguese",
            Self::Ar => "Arabic",
            Self::Hi => "Hindi",
            Self::Th => "Thai",
            Self::Vi => "Vietnamese",
            Self::Tr => "Turkish",
            Self::Auto => "auto-detect",
        }
    }
}

/// Display name for a known code, the code itself otherwise.
pub fn resolve_language_name(code: &str) -> &str {
    LanguageCode::from_code(code)
        .map(LanguageCode::display_name)
        .unwrap_or(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_codes_resolve_to_display_names() {
        let expected = [
            ("en", "English"),
            ("zh", "Chinese"),
            ("zh_cn", "Chinese Simplified"),
            ("zh_tw", "Chinese Traditional"),
            ("ja", "Japanese"),
            ("ko", "Korean"),
            ("fr", "French"),
            ("es", "Spanish"),
            ("de", "German"),
            ("ru", "Russian"),
            ("it", "Italian"),
            ("pt", "Portuguese"),
            ("ar", "Arabic"),
            ("hi", "Hindi"),
            ("th", "Thai"),
            ("vi", "Vietnamese"),
            ("tr", "Turkish"),
            ("auto", "auto-detect"),
        ];
        assert_eq!(expected.len(), LanguageCode::ALL.len());
        for (code, name) in expected {
            assert_eq!(resolve_language_name(code), name, "code {code}");
        }
    }

    #[test]
    fn unknown_codes_pass_through() {
        for code in ["nl", "pt-BR", "EN", "", "Klingon"] {
            assert_eq!(resolve_language_name(code), code);
        }
    }

    #[test]
    fn codes_round_trip_through_enum() {
        for lang in LanguageCode::ALL {
            assert_eq!(LanguageCode::from_code(lang.code()), Some(lang));
        }
    }
}
