use super::{map_tokens, ClassPass, NormalizeError, PassOutcome};
use crate::tokens::TokenTable;
use regex::Regex;

/// Maps literal palette utilities onto the token table's color roles:
/// `bg-blue-600` becomes `bg-primary`. Unmapped literals pass through.
pub struct ColorPass {
    utility: Regex,
}

impl ColorPass {
    pub fn new() -> Self {
        Self {
            // variant prefixes (hover:, md:, ...) are carried over
            utility: Regex::new(r"^((?:[A-Za-z0-9-]+:)*)(bg|text|border|ring|fill|stroke)-(.+)$")
                .unwrap(),
        }
    }
}

impl Default for ColorPass {
    fn default() -> Self {
        Self::new()
    }
}

impl ClassPass for ColorPass {
    fn name(&self) -> &'static str {
        "color"
    }

    fn apply(&self, classes: &str, table: &TokenTable) -> Result<PassOutcome, NormalizeError> {
        let (classes, violations) = map_tokens(classes, |token| {
            let caps = self.utility.captures(token)?;
            let role = table.color_role(&caps[3])?;
            Some((
                format!("{}{}-{}", &caps[1], &caps[2], role),
                "raw palette color mapped to a semantic role".to_string(),
            ))
        });
        Ok(PassOutcome {
            classes,
            violations,
        })
    }
}
