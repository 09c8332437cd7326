use super::{map_tokens, remove_token, ClassPass, NormalizeError, PassOutcome};
use crate::report::Violation;
use crate::tokens::TokenTable;
use regex::Regex;

/// Maps raw font sizes to the semantic scale (`text-3xl` -> `text-h2`)
/// and strips the font weight the semantic already implies.
pub struct TypographyPass {
    raw_size: Regex,
    arbitrary_size: Regex,
}

impl TypographyPass {
    pub fn new() -> Self {
        Self {
            raw_size: Regex::new(r"^((?:[A-Za-z0-9-]+:)*)text-([a-z0-9]+)$").unwrap(),
            arbitrary_size: Regex::new(r"^((?:[A-Za-z0-9-]+:)*)text-\[(\d+(?:\.\d+)?)px\]$")
                .unwrap(),
        }
    }

    fn map_size(&self, token: &str, table: &TokenTable) -> Option<(String, String)> {
        if let Some(caps) = self.raw_size.captures(token) {
            let semantic = table.font_semantic(&caps[2])?;
            return Some((
                format!("{}text-{}", &caps[1], semantic),
                "raw font size mapped to the semantic scale".to_string(),
            ));
        }
        let caps = self.arbitrary_size.captures(token)?;
        let px: f32 = caps[2].parse().ok()?;
        let step = table.nearest_font(px)?;
        let semantic = table.font_semantic(&step.raw)?;
        Some((
            format!("{}text-{}", &caps[1], semantic),
            "raw font size mapped to the semantic scale".to_string(),
        ))
    }
}

impl Default for TypographyPass {
    fn default() -> Self {
        Self::new()
    }
}

impl ClassPass for TypographyPass {
    fn name(&self) -> &'static str {
        "typography"
    }

    fn apply(&self, classes: &str, table: &TokenTable) -> Result<PassOutcome, NormalizeError> {
        let (mut classes, mut violations) =
            map_tokens(classes, |token| self.map_size(token, table));

        // a semantic size carries its own weight; the explicit utility
        // is now redundant
        let semantics: Vec<String> = classes
            .split_whitespace()
            .filter_map(|tok| tok.strip_prefix("text-"))
            .filter(|tail| table.implied_weight(tail).is_some())
            .map(str::to_string)
            .collect();
        for semantic in semantics {
            let Some(weight) = table.implied_weight(&semantic) else {
                continue;
            };
            let utility = format!("font-{}", weight);
            if classes.split_whitespace().any(|tok| tok == utility) {
                classes = remove_token(&classes, &utility);
                violations.push(Violation::new(
                    &utility,
                    "",
                    format!("weight implied by text-{}", semantic),
                ));
            }
        }

        Ok(PassOutcome {
            classes,
            violations,
        })
    }
}
