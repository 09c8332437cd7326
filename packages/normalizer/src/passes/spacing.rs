use super::{map_tokens, ClassPass, NormalizeError, PassOutcome};
use crate::tokens::TokenTable;
use regex::Regex;

/// Snaps arbitrary lengths on padding/margin/gap utilities to the
/// spacing scale: `p-[23px]` becomes `p-6`. Only px/rem/em convert
/// (1rem = 1em = 16px); percentages, viewport units, `calc(` and
/// `var(` are left alone.
pub struct SpacingPass {
    arbitrary: Regex,
    length: Regex,
}

impl SpacingPass {
    pub fn new() -> Self {
        Self {
            arbitrary: Regex::new(
                r"^((?:[A-Za-z0-9-]+:)*)(gap-x|gap-y|gap|space-x|space-y|px|py|pt|pr|pb|pl|p|mx|my|mt|mr|mb|ml|m)-\[([^\]]+)\]$",
            )
            .unwrap(),
            length: Regex::new(r"^(\d+(?:\.\d+)?)(px|rem|em)$").unwrap(),
        }
    }
}

impl Default for SpacingPass {
    fn default() -> Self {
        Self::new()
    }
}

impl ClassPass for SpacingPass {
    fn name(&self) -> &'static str {
        "spacing"
    }

    fn apply(&self, classes: &str, table: &TokenTable) -> Result<PassOutcome, NormalizeError> {
        let (classes, violations) = map_tokens(classes, |token| {
            let caps = self.arbitrary.captures(token)?;
            let length = self.length.captures(&caps[3])?;
            let number: f32 = length[1].parse().ok()?;
            let px = match &length[2] {
                "px" => number,
                _ => number * 16.0,
            };
            let step = table.nearest_spacing(px)?;
            Some((
                format!("{}{}-{}", &caps[1], &caps[2], step.suffix),
                "arbitrary length snapped to the spacing scale".to_string(),
            ))
        });
        Ok(PassOutcome {
            classes,
            violations,
        })
    }
}
