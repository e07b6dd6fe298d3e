//! Phrase lexicons used by the content filter
//!
//! The built-in lists target Turkish-language posts. Every list can be replaced
//! from the `[filter]` configuration section.

/// Topics the agent must never joke about: bereavement, disasters, violence,
/// medical distress, charitable appeals and national observances
pub const SENSITIVE: &[&str] = &[
    "şehit",
    "cenaze",
    "ölüm",
    "ölmüş",
    "öldü",
    "öldürüldü",
    "katledildi",
    "vuruldu",
    "kaza",
    "trafik kazası",
    "deprem",
    "sel",
    "yangın",
    "terör",
    "bomba",
    "saldırı",
    "hastane",
    "ameliyat",
    "kanser",
    "hasta",
    "rahatsız",
    "başsağlığı",
    "taziye",
    "yas",
    "acı",
    "üzüntü",
    "felaket",
    "afet",
    "yardım kampanyası",
    "bağış",
    "yardım",
    "10 kasım",
    "anma töreni",
];

/// Hostility aimed at Atatürk
pub const TOPIC_NEGATIVE: &[&str] = &[
    "atatürk düşman",
    "atatürk karşıt",
    "atatürk nefret",
    "atatürk hakaret",
    "mustafa kemal düşman",
    "kemalist düşman",
    "atatürk sevmiyorum",
    "atatürk nefret ediyorum",
];

/// National team and sports keywords
pub const PROMOTED_TOPIC: &[&str] = &[
    "milli takım",
    "a milli",
    "ay-yıldızlılar",
    "filenin sultanları",
    "12 dev adam",
    "bizim çocuklar",
];

/// Troll and humor indicators
pub const HUMOR: &[&str] = &[
    "troll", "şaka", "mizah", "komik", "gül", "lol", "haha", "😂", "🤣", "😄",
];

/// Lowercases text for matching
///
/// A dotted capital I is folded to a plain `i` first; the generic Unicode mapping
/// would leave a combining dot behind and miss phrases like "şehit".
pub fn fold_case(text: &str) -> String {
    text.replace('İ', "i").to_lowercase()
}

/// A list of lowercase phrases matched as substrings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Lexicon {
    phrases: Vec<String>,
}

impl Lexicon {
    /// Builds a lexicon, case-folding every phrase and dropping blanks
    pub fn new<I, S>(phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let phrases = phrases
            .into_iter()
            .map(|p| fold_case(p.as_ref().trim()))
            .filter(|p| !p.is_empty())
            .collect();
        Self { phrases }
    }

    /// Returns the first phrase contained in already case-folded text
    pub fn find(&self, folded_text: &str) -> Option<&str> {
        self.phrases
            .iter()
            .find(|phrase| folded_text.contains(phrase.as_str()))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.phrases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty()
    }
}
