use once_cell::sync::Lazy;

/// Nepali case endings and postpositions that attach directly to a noun.
const NEPALI_SUFFIXES: &[&str] = &[
    "हरू",  // plural
    "ले",   // ergative / instrumental
    "को",   // genitive
    "लाई",  // dative / accusative
    "मा",   // locative
    "बाट",  // ablative
    "सम्म", // terminative
    "सँग",  // comitative
    "बिना", // privative
    "का",   // genitive, plural agreement
    "देखि", // "from"
    "तिर",  // "towards"
];

static NEPALI: Lazy<SuffixTable> = Lazy::new(|| SuffixTable::new(NEPALI_SUFFIXES.iter().copied()));

/// Ordered, deduplicated set of grammatical suffixes.
///
/// Root resolution walks [`SuffixTable::longest_first`]; the prefix fallback
/// and boundary relaxation use the table order.
#[derive(Debug, Clone)]
pub struct SuffixTable {
    ordered: Vec<&'static str>,
    longest_first: Vec<&'static str>,
}

impl SuffixTable {
    pub fn new<I>(suffixes: I) -> Self
    where
        I: IntoIterator<Item = &'static str>,
    {
        let mut ordered: Vec<&'static str> = Vec::new();
        for suffix in suffixes {
            if !suffix.is_empty() && !ordered.contains(&suffix) {
                ordered.push(suffix);
            }
        }
        let mut longest_first = ordered.clone();
        // Stable, so equal-length suffixes keep table order.
        longest_first.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()));
        Self {
            ordered,
            longest_first,
        }
    }

    pub fn nepali() -> &'static SuffixTable {
        &NEPALI
    }

    pub fn ordered(&self) -> &[&'static str] {
        &self.ordered
    }

    pub fn longest_first(&self) -> &[&'static str] {
        &self.longest_first
    }

    /// True when `text` begins with any known suffix.
    pub fn starts_any(&self, text: &str) -> bool {
        self.ordered.iter().any(|suffix| text.starts_with(suffix))
    }
}

impl Default for SuffixTable {
    fn default() -> Self {
        NEPALI.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deduplicates_and_keeps_order() {
        let table = SuffixTable::new(["को", "ले", "को", ""]);
        assert_eq!(table.ordered(), &["को", "ले"]);
    }

    #[test]
    fn longest_first_is_stable() {
        let table = SuffixTable::nepali();
        let lengths: Vec<usize> = table
            .longest_first()
            .iter()
            .map(|s| s.chars().count())
            .collect();
        assert!(lengths.windows(2).all(|w| w[0] >= w[1]));
        assert_eq!(table.longest_first()[0], "सम्म");
        assert_eq!(table.longest_first().last(), Some(&"का"));
        assert_eq!(table.ordered().len(), 12);
    }

    #[test]
    fn starts_any_detects_attached_suffix() {
        let table = SuffixTable::nepali();
        assert!(table.starts_any("को गर्नु"));
        assert!(table.starts_any("हरूले"));
        assert!(!table.starts_any("गर्नु"));
    }
}
