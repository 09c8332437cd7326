use super::{map_tokens, ClassPass, NormalizeError, PassOutcome};
use crate::tokens::TokenTable;
use regex::Regex;

/// Keeps layout on the 12-column / 8px system: grid column and span
/// counts clamp into `[1, 12]`, and numeric gap/space suffixes whose
/// pixel value is off the 8px rhythm snap up to the next aligned step.
pub struct GridPass {
    columns: Regex,
    rhythm: Regex,
}

impl GridPass {
    pub fn new() -> Self {
        Self {
            columns: Regex::new(
                r"^((?:[A-Za-z0-9-]+:)*)(grid-cols|col-span)-(?:\[(\d+)\]|(\d+))$",
            )
            .unwrap(),
            rhythm: Regex::new(
                r"^((?:[A-Za-z0-9-]+:)*)(gap-x|gap-y|gap|space-x|space-y)-(\d+(?:\.\d+)?)$",
            )
            .unwrap(),
        }
    }

    fn clamp_columns(&self, token: &str) -> Option<(String, String)> {
        let caps = self.columns.captures(token)?;
        let count: i64 = caps
            .get(3)
            .or_else(|| caps.get(4))?
            .as_str()
            .parse()
            .ok()?;
        let clamped = count.clamp(1, 12);
        let replacement = format!("{}{}-{}", &caps[1], &caps[2], clamped);
        if replacement == token {
            return None;
        }
        Some((
            replacement,
            "grid dimension clamped to the 12-column system".to_string(),
        ))
    }

    fn snap_rhythm(&self, token: &str) -> Option<(String, String)> {
        let caps = self.rhythm.captures(token)?;
        let suffix: f32 = caps[3].parse().ok()?;
        let px = suffix * 4.0;
        if px % 8.0 == 0.0 {
            return None;
        }
        let snapped = (px / 8.0).ceil() * 8.0;
        Some((
            format!("{}{}-{}", &caps[1], &caps[2], (snapped / 4.0) as u32),
            "spacing rhythm snapped up to the 8px grid".to_string(),
        ))
    }
}

impl Default for GridPass {
    fn default() -> Self {
        Self::new()
    }
}

impl ClassPass for GridPass {
    fn name(&self) -> &'static str {
        "grid"
    }

    fn apply(&self, classes: &str, _table: &TokenTable) -> Result<PassOutcome, NormalizeError> {
        let (classes, violations) = map_tokens(classes, |token| {
            self.clamp_columns(token).or_else(|| self.snap_rhythm(token))
        });
        Ok(PassOutcome {
            classes,
            violations,
        })
    }
}
