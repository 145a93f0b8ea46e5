/// The two languages the bot translates between.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Language {
    Arabic,
    English,
}

impl Language {
    pub fn code(self) -> &'static str {
        match self {
            Language::Arabic => "ar",
            Language::English => "en",
        }
    }

    /// Arabic if any character falls in the Arabic block (U+0600..=U+06FF), English otherwise.
    pub fn detect(text: &str) -> Self {
        if text.chars().any(|c| ('\u{0600}'..='\u{06FF}').contains(&c)) {
            Language::Arabic
        } else {
            Language::English
        }
    }

    /// Arabic goes to English; everything else goes to Arabic.
    pub fn counterpart(self) -> Self {
        match self {
            Language::Arabic => Language::English,
            Language::English => Language::Arabic,
        }
    }
}

/// Target language for a message, picked from its detected source language.
pub fn target_for(text: &str) -> Language {
    Language::detect(text).counterpart()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arabic_text_targets_english() {
        assert_eq!(target_for("مرحبا"), Language::English);
        assert_eq!(target_for("hello مرحبا"), Language::English);
        assert_eq!(Language::English.code(), "en");
    }

    #[test]
    fn other_text_targets_arabic() {
        assert_eq!(target_for("hello"), Language::Arabic);
        assert_eq!(target_for("bonjour 123"), Language::Arabic);
        assert_eq!(target_for("שלום"), Language::Arabic);
    }
}
