//! Profanity filtering of alert messages
//!
//! Runs before selection so a `disable-alerts` policy can cancel the alert
//! outright instead of playing it with empty text.

mod word_lists;

pub use alertcast_types::{ProfanityConfig, ProfanityPolicy};
pub use word_lists::{DirectoryWordLists, StaticWordLists, WordListError, WordListSource};

use rand::Rng;
use rand::seq::SliceRandom;
use regex::{NoExpand, Regex, RegexBuilder};

/// Replacement text for `replace-with-asterisk`
pub const MASK: &str = "***";

/// Compiled vulgarity list plus the policy to apply on a match
#[derive(Debug, Clone, Default)]
pub struct ProfanityFilter {
    policy: ProfanityPolicy,
    patterns: Vec<Regex>,
    happy_words: Vec<String>,
}

impl ProfanityFilter {
    /// Build a filter from raw words. Blank and repeated words are skipped.
    pub fn new(
        policy: ProfanityPolicy,
        words: impl IntoIterator<Item = String>,
        happy_words: Vec<String>,
    ) -> Self {
        let words = dedup_words(words);
        let patterns = words
            .iter()
            .filter_map(|word| {
                RegexBuilder::new(&regex::escape(word))
                    .case_insensitive(true)
                    .build()
                    .map_err(|e| tracing::warn!(word = %word, error = %e, "Skipping vulgarity pattern"))
                    .ok()
            })
            .collect();

        Self {
            policy,
            patterns,
            happy_words: dedup_words(happy_words),
        }
    }

    /// Load the enabled languages' lists and merge the custom words
    pub fn from_config(config: &ProfanityConfig, source: &dyn WordListSource) -> Self {
        let mut words = Vec::new();
        let mut happy_words = Vec::new();

        for lang in &config.languages {
            match source.vulgarities(lang) {
                Ok(list) => words.extend(list),
                Err(e) => tracing::warn!(lang = %lang, error = %e, "Vulgarity list unavailable"),
            }
            match source.happy_words(lang) {
                Ok(list) => happy_words.extend(list),
                Err(e) => tracing::warn!(lang = %lang, error = %e, "Happy word list unavailable"),
            }
        }
        words.extend(config.custom_words.split(',').map(|w| w.trim().to_string()));

        let filter = Self::new(config.policy, words, happy_words);
        tracing::debug!(
            policy = ?filter.policy,
            patterns = filter.patterns.len(),
            happy_words = filter.happy_words.len(),
            "Profanity filter loaded"
        );
        filter
    }

    pub fn policy(&self) -> ProfanityPolicy {
        self.policy
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Apply the policy to `message`.
    ///
    /// Returns `None` when the whole alert must be cancelled
    /// (`disable-alerts`), never an empty stand-in.
    pub fn sanitize<R: Rng + ?Sized>(&self, message: &str, rng: &mut R) -> Option<String> {
        let mut text = message.to_string();

        for pattern in &self.patterns {
            if !pattern.is_match(&text) {
                continue;
            }

            match self.policy {
                ProfanityPolicy::ReplaceWithAsterisk => {
                    text = pattern.replace_all(&text, NoExpand(MASK)).into_owned();
                }
                ProfanityPolicy::ReplaceWithHappyWords => {
                    let word = self
                        .happy_words
                        .choose(rng)
                        .map(String::as_str)
                        .unwrap_or(MASK);
                    text = pattern.replace_all(&text, NoExpand(word)).into_owned();
                }
                ProfanityPolicy::HideMessages => {
                    tracing::debug!(pattern = pattern.as_str(), "Message hidden by profanity filter");
                    return Some(String::new());
                }
                ProfanityPolicy::DisableAlerts => {
                    tracing::debug!(pattern = pattern.as_str(), "Alert disabled by profanity filter");
                    return None;
                }
            }
        }

        Some(text)
    }
}

/// Trim, drop blanks and drop repeats while keeping first-seen order
fn dedup_words(words: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut seen = hashbrown::HashSet::new();
    words
        .into_iter()
        .map(|w| w.trim().to_string())
        .filter(|w| !w.is_empty())
        .filter(|w| seen.insert(w.to_lowercase()))
        .collect()
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn words(list: &[&str]) -> Vec<String> {
        list.iter().map(|w| w.to_string()).collect()
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn asterisk_masks_every_occurrence_case_insensitively() {
        let filter = ProfanityFilter::new(
            ProfanityPolicy::ReplaceWithAsterisk,
            words(&["darn", "heck"]),
            Vec::new(),
        );
        assert_eq!(
            filter.sanitize("Darn it, what the HECK, darn", &mut rng()).unwrap(),
            "*** it, what the ***, ***"
        );
    }

    #[test]
    fn happy_words_replace_matches() {
        let filter = ProfanityFilter::new(
            ProfanityPolicy::ReplaceWithHappyWords,
            words(&["darn"]),
            words(&["sunshine"]),
        );
        assert_eq!(filter.sanitize("oh darn", &mut rng()).unwrap(), "oh sunshine");
    }

    #[test]
    fn happy_words_without_list_fall_back_to_mask() {
        let filter =
            ProfanityFilter::new(ProfanityPolicy::ReplaceWithHappyWords, words(&["darn"]), Vec::new());
        assert_eq!(filter.sanitize("darn", &mut rng()).unwrap(), MASK);
    }

    #[test]
    fn hide_messages_keeps_alert_with_empty_text() {
        let filter = ProfanityFilter::new(ProfanityPolicy::HideMessages, words(&["darn"]), Vec::new());
        assert_eq!(filter.sanitize("well darn", &mut rng()), Some(String::new()));
        assert_eq!(filter.sanitize("all good", &mut rng()), Some("all good".to_string()));
    }

    #[test]
    fn disable_alerts_cancels() {
        let filter =
            ProfanityFilter::new(ProfanityPolicy::DisableAlerts, words(&["darn"]), Vec::new());
        assert_eq!(filter.sanitize("DARN", &mut rng()), None);
        assert_eq!(filter.sanitize("fine", &mut rng()), Some("fine".to_string()));
    }

    #[test]
    fn regex_metacharacters_are_literal() {
        let filter =
            ProfanityFilter::new(ProfanityPolicy::ReplaceWithAsterisk, words(&["a.b", "$x"]), Vec::new());
        assert_eq!(filter.sanitize("axb a.b $x", &mut rng()).unwrap(), "axb *** ***");
    }

    #[test]
    fn config_merges_languages_and_custom_words() {
        let mut lists = StaticWordLists::default();
        lists.insert_vulgarities("en", words(&["darn", ""]));
        lists.insert_happy_words("en", words(&["rainbow"]));

        let config = ProfanityConfig {
            policy: ProfanityPolicy::ReplaceWithHappyWords,
            languages: vec!["en".to_string(), "xx".to_string()],
            custom_words: " gosh , darn,".to_string(),
        };

        let filter = ProfanityFilter::from_config(&config, &lists);
        assert_eq!(filter.patterns.len(), 2);
        assert_eq!(
            filter.sanitize("gosh darn", &mut rng()).unwrap(),
            "rainbow rainbow"
        );
    }
}
