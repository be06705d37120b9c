use std::collections::HashMap;

/// Irregular plurals whose lemma no suffix rule can reach.
const EXCEPTIONS: &[(&str, &str)] = &[
    ("children", "child"),
    ("men", "man"),
    ("women", "woman"),
    ("feet", "foot"),
    ("teeth", "tooth"),
    ("geese", "goose"),
    ("mice", "mouse"),
    ("lice", "louse"),
    ("oxen", "ox"),
    ("criteria", "criterion"),
    ("phenomena", "phenomenon"),
    ("wives", "wife"),
    ("lives", "life"),
    ("knives", "knife"),
    ("leaves", "leaf"),
    ("halves", "half"),
    ("selves", "self"),
    ("shelves", "shelf"),
    ("wolves", "wolf"),
    ("movies", "movie"),
    ("cookies", "cookie"),
    ("calories", "calorie"),
    ("caches", "cache"),
    ("niches", "niche"),
    ("analyses", "analysis"),
    ("crises", "crisis"),
    ("bases", "basis"),
];

/// Words that look plural but are already their own lemma.
const INVARIANT: &[&str] = &[
    "news", "series", "species", "means", "always", "perhaps", "whereas", "sometimes",
    "afterwards", "towards", "besides", "nevertheless", "mathematics", "physics", "economics",
    "politics", "yes", "gas", "bias", "alias", "atlas", "canvas", "lens", "sales",
];

/// Suffix detachment rules applied in order; the first one that fits wins.
const SUFFIX_RULES: &[(&str, &str)] = &[
    ("ies", "y"),
    ("sses", "ss"),
    ("ches", "ch"),
    ("shes", "sh"),
    ("xes", "x"),
    ("zes", "z"),
    ("ses", "s"),
    ("s", ""),
];

/// Noun lemmatizer modelled on WordNet's morphy: exceptions first, then
/// suffix detachment guarded against words that only look inflected.
#[derive(Debug, Clone)]
pub struct Lemmatizer {
    exceptions: HashMap<&'static str, &'static str>,
}

impl Default for Lemmatizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Lemmatizer {
    pub fn new() -> Self {
        Self {
            exceptions: EXCEPTIONS.iter().copied().collect(),
        }
    }

    pub fn lemmatize(&self, word: &str) -> String {
        if let Some(lemma) = self.exceptions.get(word) {
            return (*lemma).to_string();
        }
        if !is_detachable(word) {
            return word.to_string();
        }
        for (suffix, replacement) in SUFFIX_RULES {
            if let Some(stem) = word.strip_suffix(suffix) {
                if stem.chars().count() < 2 {
                    continue;
                }
                return format!("{stem}{replacement}");
            }
        }
        word.to_string()
    }
}

fn is_detachable(word: &str) -> bool {
    word.chars().count() > 3
        && word.chars().all(|c| c.is_alphabetic())
        && !word.ends_with("ss")
        && !word.ends_with("us")
        && !word.ends_with("is")
        && !INVARIANT.contains(&word)
}
