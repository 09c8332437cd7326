//! The design-token policy the passes normalize toward.
//!
//! `TokenTable::default()` carries the built-in policy; callers with a
//! project-specific theme deserialize their own table over it.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One entry of the discrete spacing scale
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpacingStep {
    pub px: f32,
    /// Utility suffix, e.g. `"6"` in `p-6`
    pub suffix: String,
}

/// One entry of the raw font-size scale
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontStep {
    pub px: f32,
    /// Raw suffix, e.g. `"3xl"` in `text-3xl`
    pub raw: String,
}

/// A raw element and the design-system component that replaces it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentMapping {
    pub element: String,
    pub component: String,
    pub module: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TokenTable {
    /// Palette literal to semantic role: `"blue-600"` -> `"primary"`
    pub color_roles: HashMap<String, String>,
    /// Discrete spacing scale, ascending by px
    pub spacing_scale: Vec<SpacingStep>,
    /// Raw font-size suffix to semantic size: `"3xl"` -> `"h2"`
    pub font_sizes: HashMap<String, String>,
    /// Raw font-size scale in px, used for arbitrary `text-[Npx]` values
    pub font_scale: Vec<FontStep>,
    /// Semantic size to the font-weight it implies: `"h2"` -> `"bold"`
    pub implied_weights: HashMap<String, String>,
    /// Raw elements promoted to design-system components
    pub components: Vec<ComponentMapping>,
}

impl TokenTable {
    pub fn color_role(&self, literal: &str) -> Option<&str> {
        self.color_roles.get(literal).map(String::as_str)
    }

    /// Nearest scale entry by distance; ties resolve to the lower entry
    pub fn nearest_spacing(&self, px: f32) -> Option<&SpacingStep> {
        nearest_by(&self.spacing_scale, |step| step.px, px)
    }

    pub fn nearest_font(&self, px: f32) -> Option<&FontStep> {
        nearest_by(&self.font_scale, |step| step.px, px)
    }

    pub fn font_semantic(&self, raw: &str) -> Option<&str> {
        self.font_sizes.get(raw).map(String::as_str)
    }

    pub fn implied_weight(&self, semantic: &str) -> Option<&str> {
        self.implied_weights.get(semantic).map(String::as_str)
    }

    pub fn component_for(&self, element: &str) -> Option<&ComponentMapping> {
        self.components.iter().find(|m| m.element == element)
    }
}

fn nearest_by<T>(entries: &[T], key: impl Fn(&T) -> f32, px: f32) -> Option<&T> {
    let mut best: Option<(&T, f32)> = None;
    for entry in entries {
        let distance = (key(entry) - px).abs();
        let closer = match best {
            // strict comparison keeps the earlier (lower) entry on ties
            Some((_, best_distance)) => distance < best_distance,
            None => true,
        };
        if closer {
            best = Some((entry, distance));
        }
    }
    best.map(|(entry, _)| entry)
}

impl Default for TokenTable {
    fn default() -> Self {
        let color_roles = [
            ("blue-500", "primary"),
            ("blue-600", "primary"),
            ("blue-700", "primary"),
            ("indigo-600", "primary"),
            ("gray-900", "foreground"),
            ("gray-700", "foreground"),
            ("gray-600", "muted"),
            ("gray-500", "muted"),
            ("gray-400", "muted"),
            ("gray-100", "surface"),
            ("gray-50", "surface"),
            ("white", "background"),
            ("red-500", "destructive"),
            ("red-600", "destructive"),
            ("green-600", "success"),
            ("amber-500", "warning"),
            ("yellow-500", "warning"),
        ];

        let spacing = [
            (0.0, "0"),
            (1.0, "px"),
            (2.0, "0.5"),
            (4.0, "1"),
            (6.0, "1.5"),
            (8.0, "2"),
            (10.0, "2.5"),
            (12.0, "3"),
            (14.0, "3.5"),
            (16.0, "4"),
            (20.0, "5"),
            (24.0, "6"),
            (28.0, "7"),
            (32.0, "8"),
            (36.0, "9"),
            (40.0, "10"),
            (44.0, "11"),
            (48.0, "12"),
            (56.0, "14"),
            (64.0, "16"),
            (80.0, "20"),
            (96.0, "24"),
            (112.0, "28"),
            (128.0, "32"),
            (144.0, "36"),
            (160.0, "40"),
        ];

        let font_sizes = [
            ("xs", "caption"),
            ("sm", "body"),
            ("base", "body"),
            ("lg", "h4"),
            ("xl", "h4"),
            ("2xl", "h3"),
            ("3xl", "h2"),
            ("4xl", "h1"),
            ("5xl", "h1"),
            ("6xl", "h1"),
        ];

        let font_scale = [
            (12.0, "xs"),
            (14.0, "sm"),
            (16.0, "base"),
            (18.0, "lg"),
            (20.0, "xl"),
            (24.0, "2xl"),
            (30.0, "3xl"),
            (36.0, "4xl"),
            (48.0, "5xl"),
            (60.0, "6xl"),
        ];

        let implied_weights = [
            ("h1", "bold"),
            ("h2", "bold"),
            ("h3", "semibold"),
            ("h4", "semibold"),
            ("body", "normal"),
            ("caption", "normal"),
        ];

        let components = [
            ("button", "Button", "@/components/ui/button"),
            ("input", "Input", "@/components/ui/input"),
            ("select", "Select", "@/components/ui/select"),
            ("textarea", "Textarea", "@/components/ui/textarea"),
        ];

        Self {
            color_roles: color_roles
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            spacing_scale: spacing
                .into_iter()
                .map(|(px, suffix)| SpacingStep {
                    px,
                    suffix: suffix.to_string(),
                })
                .collect(),
            font_sizes: font_sizes
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            font_scale: font_scale
                .into_iter()
                .map(|(px, raw)| FontStep {
                    px,
                    raw: raw.to_string(),
                })
                .collect(),
            implied_weights: implied_weights
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            components: components
                .into_iter()
                .map(|(element, component, module)| ComponentMapping {
                    element: element.to_string(),
                    component: component.to_string(),
                    module: module.to_string(),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nearest_spacing_ties_resolve_low() {
        let table = TokenTable::default();
        assert_eq!(table.nearest_spacing(23.0).unwrap().suffix, "6");
        // 18px is equidistant from 16 and 20
        assert_eq!(table.nearest_spacing(18.0).unwrap().suffix, "4");
        assert_eq!(table.nearest_spacing(0.0).unwrap().suffix, "0");
    }

    #[test]
    fn font_scale_maps_to_semantics() {
        let table = TokenTable::default();
        assert_eq!(table.font_semantic("3xl"), Some("h2"));
        assert_eq!(table.nearest_font(31.0).unwrap().raw, "3xl");
        assert_eq!(table.implied_weight("h2"), Some("bold"));
        assert_eq!(table.font_semantic("h2"), None);
    }

    #[test]
    fn custom_tables_deserialize_over_defaults() {
        let table: TokenTable = serde_json::from_str(
            r#"{ "colorRoles": { "pink-500": "accent" } }"#,
        )
        .unwrap();
        assert_eq!(table.color_role("pink-500"), Some("accent"));
        // other sections keep their defaults
        assert!(table.component_for("button").is_some());
    }
}
