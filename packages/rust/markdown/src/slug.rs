//! GitHub-style heading slugs.

use std::collections::HashMap;

/// Hands out unique heading slugs for one document.
///
/// Slugs follow GitHub's scheme: lowercase, punctuation removed except `-` and
/// `_`, each space turned into `-`. A repeated slug gets `-1`, `-2`, … appended.
#[derive(Debug, Default)]
pub struct Slugger {
    occurrences: HashMap<String, usize>,
}

impl Slugger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Slug for `text`, unique among the slugs this slugger has returned.
    pub fn slug(&mut self, text: &str) -> String {
        let original = slugify(text);
        let mut candidate = original.clone();

        while self.occurrences.contains_key(&candidate) {
            let count = self.occurrences.entry(original.clone()).or_insert(0);
            *count += 1;
            candidate = format!("{original}-{count}");
        }

        self.occurrences.insert(candidate.clone(), 0);
        candidate
    }
}

/// Stateless part of the slug algorithm.
pub fn slugify(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | ' '))
        .map(|c| if c == ' ' { '-' } else { c })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_matches_github() {
        assert_eq!(slugify("Getting Started"), "getting-started");
        assert_eq!(slugify("What's new in v1.2?"), "whats-new-in-v12");
        assert_eq!(slugify("`nizam up` command"), "nizam-up-command");
        assert_eq!(slugify("A  B"), "a--b");
        assert_eq!(slugify("Über_Config"), "über_config");
        assert_eq!(slugify("🚀 Launch"), "-launch");
    }

    #[test]
    fn duplicates_get_counters() {
        let mut slugger = Slugger::new();
        assert_eq!(slugger.slug("Install"), "install");
        assert_eq!(slugger.slug("Install"), "install-1");
        assert_eq!(slugger.slug("Install"), "install-2");
        assert_eq!(slugger.slug("Usage"), "usage");
    }

    #[test]
    fn counter_skips_slugs_already_taken() {
        let mut slugger = Slugger::new();
        assert_eq!(slugger.slug("foo-1"), "foo-1");
        assert_eq!(slugger.slug("foo"), "foo");
        assert_eq!(slugger.slug("foo"), "foo-2");
    }
}
