//! Central keyword tables for the DOM heuristics.
//!
//! Every phrase the classifiers match on lives here, compiled into
//! Aho-Corasick automata so a scan over extracted cell text is a single
//! linear pass regardless of how many locale phrases are registered.
//! Adding a locale means adding a phrase to a table (or to the
//! `extra_*` lists in `nestsweep.json`); the matching logic never changes.

use aho_corasick::AhoCorasick;

use crate::core::config::SweepConfig;

/// Phrases marking a mutual relationship (the other party follows back).
pub const MUTUAL_PHRASES: &[&str] = &["follows you", "شما را دنبال می‌کند"];

/// Labels marking an active, reversible follow control.
pub const CONTROL_KEYWORDS: &[&str] = &["following", "unfollow", "دنبال می‌کنید"];

/// Labels accepted during the confirmation full-button scan. Deliberately
/// narrower than [`CONTROL_KEYWORDS`]: "following" would match every follow
/// button still sitting in the list behind the dialog.
pub const CONFIRM_KEYWORDS: &[&str] = &["unfollow"];

/// Case-insensitive multi-pattern substring matcher.
pub struct KeywordMatcher {
    automaton: AhoCorasick,
}

impl KeywordMatcher {
    pub fn new<I, P>(phrases: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<str>,
    {
        let patterns: Vec<String> = phrases
            .into_iter()
            .map(|p| p.as_ref().to_lowercase())
            .collect();
        let automaton = AhoCorasick::builder()
            .ascii_case_insensitive(true)
            .build(&patterns)
            .expect("valid keyword patterns");
        Self { automaton }
    }

    /// True when any registered phrase occurs as a substring of `text`.
    pub fn matches(&self, text: &str) -> bool {
        self.automaton.is_match(text)
    }
}

/// The three matcher tables a session runs with.
pub struct KeywordSet {
    mutual: KeywordMatcher,
    control: KeywordMatcher,
    confirm: KeywordMatcher,
}

impl KeywordSet {
    /// Built-in tables only.
    pub fn builtin() -> Self {
        Self {
            mutual: KeywordMatcher::new(MUTUAL_PHRASES),
            control: KeywordMatcher::new(CONTROL_KEYWORDS),
            confirm: KeywordMatcher::new(CONFIRM_KEYWORDS),
        }
    }

    /// Built-in tables extended with the config's extra phrases.
    pub fn from_config(cfg: &SweepConfig) -> Self {
        let extend = |base: &[&str], extra: &[String]| {
            base.iter()
                .map(|s| s.to_string())
                .chain(extra.iter().cloned())
                .collect::<Vec<_>>()
        };
        Self {
            mutual: KeywordMatcher::new(extend(MUTUAL_PHRASES, &cfg.extra_mutual_phrases)),
            control: KeywordMatcher::new(extend(CONTROL_KEYWORDS, &cfg.extra_control_keywords)),
            confirm: KeywordMatcher::new(extend(CONFIRM_KEYWORDS, &cfg.extra_confirm_keywords)),
        }
    }

    pub fn mutual(&self) -> &KeywordMatcher {
        &self.mutual
    }

    pub fn control(&self) -> &KeywordMatcher {
        &self.control
    }

    pub fn confirm(&self) -> &KeywordMatcher {
        &self.confirm
    }
}

impl Default for KeywordSet {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substring_and_case_insensitive() {
        let m = KeywordMatcher::new(["following"]);
        assert!(m.matches("⚡ following"));
        assert!(m.matches("FOLLOWING"));
        assert!(m.matches("unfollowing soon"));
        assert!(!m.matches("follow"));
    }

    #[test]
    fn test_non_ascii_phrase() {
        let m = KeywordMatcher::new(MUTUAL_PHRASES);
        assert!(m.matches("نام کاربری شما را دنبال می‌کند"));
    }

    #[test]
    fn test_config_extension_requires_no_code_change() {
        let cfg: SweepConfig =
            serde_json::from_str(r#"{ "extra_mutual_phrases": ["te sigue"] }"#).unwrap();
        let set = KeywordSet::from_config(&cfg);
        assert!(set.mutual().matches("maria te sigue"));
        assert!(set.mutual().matches("john follows you"));
    }
}
