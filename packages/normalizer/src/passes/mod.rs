mod color;
mod components;
mod grid;
mod spacing;
mod typography;

pub use color::ColorPass;
pub use components::{substitute_components, ComponentOutcome};
pub use grid::GridPass;
pub use spacing::SpacingPass;
pub use typography::TypographyPass;

use crate::report::Violation;
use crate::tokens::TokenTable;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum NormalizeError {
    #[error("unparseable utility value `{0}`")]
    BadValue(String),
}

/// Rewrite of one class-list literal by one pass
#[derive(Debug, Clone, PartialEq)]
pub struct PassOutcome {
    pub classes: String,
    pub violations: Vec<Violation>,
}

impl PassOutcome {
    pub fn unchanged(classes: &str) -> Self {
        Self {
            classes: classes.to_string(),
            violations: Vec::new(),
        }
    }
}

/// A pure rewrite over one class-list literal. Passes never see the
/// surrounding markup and never touch tokens they do not understand.
pub trait ClassPass: Send + Sync {
    /// Unique identifier for this pass
    fn name(&self) -> &'static str;

    fn apply(&self, classes: &str, table: &TokenTable) -> Result<PassOutcome, NormalizeError>;
}

/// The class-list passes in their fixed run order:
/// color, spacing, grid/rhythm, typography
pub struct PassRegistry {
    passes: Vec<Box<dyn ClassPass>>,
}

impl PassRegistry {
    pub fn new() -> Self {
        Self {
            passes: vec![
                Box::new(ColorPass::new()),
                Box::new(SpacingPass::new()),
                Box::new(GridPass::new()),
                Box::new(TypographyPass::new()),
            ],
        }
    }

    pub fn empty() -> Self {
        Self { passes: Vec::new() }
    }

    pub fn passes(&self) -> &[Box<dyn ClassPass>] {
        &self.passes
    }

    pub fn add_pass(&mut self, pass: Box<dyn ClassPass>) {
        self.passes.push(pass);
    }
}

impl Default for PassRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PassRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PassRegistry")
            .field("passes", &format!("{} passes", self.passes.len()))
            .finish()
    }
}

/// Rewrite tokens one at a time, keeping every separator byte as it
/// was. `f` returns `Some((replacement, reason))` for tokens it
/// rewrites.
pub(crate) fn map_tokens(
    classes: &str,
    mut f: impl FnMut(&str) -> Option<(String, String)>,
) -> (String, Vec<Violation>) {
    let mut out = String::with_capacity(classes.len());
    let mut violations = Vec::new();
    let b = classes.as_bytes();
    let mut i = 0;
    while i < b.len() {
        let start = i;
        while i < b.len() && b[i].is_ascii_whitespace() {
            i += 1;
        }
        out.push_str(&classes[start..i]);
        let tok_start = i;
        while i < b.len() && !b[i].is_ascii_whitespace() {
            i += 1;
        }
        if i > tok_start {
            let token = &classes[tok_start..i];
            match f(token) {
                Some((replacement, reason)) => {
                    violations.push(Violation::new(token, &replacement, reason));
                    out.push_str(&replacement);
                }
                None => out.push_str(token),
            }
        }
    }
    (out, violations)
}

/// Drop every occurrence of a token together with the separator next
/// to it. Everything else stays byte-identical.
pub(crate) fn remove_token(classes: &str, token: &str) -> String {
    let mut out = classes.to_string();
    loop {
        let Some((start, end)) = token_at(&out, token) else {
            return out;
        };
        let b = out.as_bytes();
        let mut cut_start = start;
        while cut_start > 0 && b[cut_start - 1].is_ascii_whitespace() {
            cut_start -= 1;
        }
        let mut cut_end = end;
        if cut_start == 0 {
            while cut_end < b.len() && b[cut_end].is_ascii_whitespace() {
                cut_end += 1;
            }
        }
        out.replace_range(cut_start..cut_end, "");
    }
}

fn token_at(classes: &str, token: &str) -> Option<(usize, usize)> {
    let b = classes.as_bytes();
    let mut i = 0;
    while i < b.len() {
        while i < b.len() && b[i].is_ascii_whitespace() {
            i += 1;
        }
        let start = i;
        while i < b.len() && !b[i].is_ascii_whitespace() {
            i += 1;
        }
        if &classes[start..i] == token {
            return Some((start, i));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_tokens_preserves_separators() {
        let (out, violations) = map_tokens("  a   b c ", |tok| {
            (tok == "b").then(|| ("B".to_string(), "swap".to_string()))
        });
        assert_eq!(out, "  a   B c ");
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].original, "b");
        assert_eq!(violations[0].replacement, "B");
    }

    #[test]
    fn remove_token_drops_exactly_one_kind() {
        assert_eq!(remove_token("a font-bold b", "font-bold"), "a b");
        assert_eq!(remove_token("font-bold b", "font-bold"), "b");
        assert_eq!(remove_token("font-bold", "font-bold"), "");
        // untouched strings keep their exact bytes
        assert_eq!(remove_token("a  b", "missing"), "a  b");
    }
}
