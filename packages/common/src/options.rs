use serde::{Deserialize, Serialize};

/// Engine-wide knobs, usually loaded from `graft.config.json`. Every
/// field has a default so a missing or partial config file still works.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineOptions {
    /// Class-join matching: how many target tokens may be unexplained by
    /// a call's literal arguments before the call stops matching
    pub max_unexplained_tokens: usize,
    /// Function names treated as class-join calls
    pub class_join_callees: Vec<String>,
    /// Quiet period after the last edit before a draft commits
    pub commit_debounce_ms: u64,
    /// Preview coalescing interval
    pub frame_ms: u64,
    /// File extensions the engine is allowed to rewrite
    pub extensions: Vec<String>,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            max_unexplained_tokens: 3,
            class_join_callees: vec![
                "cn".to_string(),
                "clsx".to_string(),
                "classNames".to_string(),
                "cx".to_string(),
            ],
            commit_debounce_ms: 120,
            frame_ms: 16,
            extensions: vec!["tsx".to_string(), "jsx".to_string()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_fills_in_defaults() {
        let options: EngineOptions =
            serde_json::from_str(r#"{ "commitDebounceMs": 250 }"#).unwrap();
        assert_eq!(options.commit_debounce_ms, 250);
        assert_eq!(options.max_unexplained_tokens, 3);
        assert_eq!(options.frame_ms, 16);
        assert!(options.class_join_callees.iter().any(|c| c == "clsx"));
    }

    #[test]
    fn unknown_callees_are_kept_verbatim() {
        let options: EngineOptions =
            serde_json::from_str(r#"{ "classJoinCallees": ["twMerge"] }"#).unwrap();
        assert_eq!(options.class_join_callees, vec!["twMerge"]);
    }
}
