use std::path::Path;

/// Source dialects the engine understands. Everything else is passed
/// through untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceDialect {
    Tsx,
    Jsx,
}

impl SourceDialect {
    /// Classify a path by extension. Returns `None` for files the engine
    /// must not rewrite (css, json, plain ts, ...).
    pub fn from_path(path: &str) -> Option<Self> {
        let ext = Path::new(path).extension()?.to_str()?;
        match ext {
            "tsx" => Some(SourceDialect::Tsx),
            "jsx" => Some(SourceDialect::Jsx),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_component_extensions() {
        assert_eq!(SourceDialect::from_path("src/App.tsx"), Some(SourceDialect::Tsx));
        assert_eq!(SourceDialect::from_path("src/legacy.jsx"), Some(SourceDialect::Jsx));
    }

    #[test]
    fn rejects_everything_else() {
        assert_eq!(SourceDialect::from_path("styles.css"), None);
        assert_eq!(SourceDialect::from_path("lib/util.ts"), None);
        assert_eq!(SourceDialect::from_path("README"), None);
    }
}
