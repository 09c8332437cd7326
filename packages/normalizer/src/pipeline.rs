//! Fixed-order normalization pipeline.
//!
//! Components run first so the class passes see the promoted markup,
//! then color, spacing, grid and typography in that order. Every pass
//! is a fixed point on its own output, so running the pipeline on an
//! already-normalized file rewrites nothing.

use crate::passes::{substitute_components, PassRegistry};
use crate::report::{NormalizationReport, NormalizedCode, PassReport};
use crate::tokens::TokenTable;
use graft_common::EngineOptions;
use graft_parser::{parse_with_path, scan_class_join, AttrValue, Tree};
use serde::{Deserialize, Serialize};

/// Pipeline knobs, a subset of the engine options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NormalizerOptions {
    /// File extensions the pipeline will touch. Anything else passes
    /// through unchanged.
    pub extensions: Vec<String>,
    pub class_join_callees: Vec<String>,
}

impl Default for NormalizerOptions {
    fn default() -> Self {
        Self {
            extensions: vec!["tsx".to_string(), "jsx".to_string()],
            class_join_callees: vec![
                "cn".to_string(),
                "clsx".to_string(),
                "classNames".to_string(),
                "cx".to_string(),
            ],
        }
    }
}

impl From<&EngineOptions> for NormalizerOptions {
    fn from(options: &EngineOptions) -> Self {
        Self {
            extensions: options.extensions.clone(),
            class_join_callees: options.class_join_callees.clone(),
        }
    }
}

/// Project files the caller knows about. When non-empty, component
/// substitution only fires for mappings whose module resolves to one
/// of these files; an empty set disables the gate.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContextFiles(Vec<String>);

impl ContextFiles {
    pub fn new<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(paths.into_iter().map(Into::into).collect())
    }

    pub fn empty() -> Self {
        Self(Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether some context file provides `module`. Alias prefixes are
    /// ignored and extensions stripped, so `@/components/ui/button`
    /// matches `src/components/ui/button.tsx`.
    pub fn has_module(&self, module: &str) -> bool {
        let needle = module.trim_start_matches("@/").trim_start_matches("./");
        self.0.iter().any(|path| {
            let stem = match path.rfind('.') {
                Some(dot) => &path[..dot],
                None => path.as_str(),
            };
            stem == needle || stem.ends_with(&format!("/{}", needle))
        })
    }
}

/// The normalizer: a token table plus the registered class passes.
#[derive(Debug)]
pub struct NormalizationPipeline {
    table: TokenTable,
    options: NormalizerOptions,
    registry: PassRegistry,
}

impl Default for NormalizationPipeline {
    fn default() -> Self {
        Self::new(TokenTable::default(), NormalizerOptions::default())
    }
}

impl NormalizationPipeline {
    pub fn new(table: TokenTable, options: NormalizerOptions) -> Self {
        Self {
            table,
            options,
            registry: PassRegistry::new(),
        }
    }

    /// Whether a path is eligible for normalization at all
    pub fn supports(&self, path: &str) -> bool {
        let name = path.rsplit('/').next().unwrap_or(path);
        match name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => {
                self.options.extensions.iter().any(|e| e == ext)
            }
            _ => false,
        }
    }

    /// Normalize one file. Files the pipeline does not support, or that
    /// fail to parse, come back byte for byte unchanged with an empty
    /// report.
    pub fn run(&self, source: &str, path: &str, context: &ContextFiles) -> NormalizedCode {
        if !self.supports(path) {
            return NormalizedCode {
                code: source.to_string(),
                report: NormalizationReport::default(),
            };
        }
        let mut tree = match parse_with_path(source, path) {
            Ok(tree) => tree,
            Err(err) => {
                tracing::warn!(path, error = %err, "file failed to parse, left unchanged");
                return NormalizedCode {
                    code: source.to_string(),
                    report: NormalizationReport::default(),
                };
            }
        };

        let mut report = NormalizationReport::default();
        let mut code = source.to_string();

        let outcome = substitute_components(&code, &tree, &self.table, context);
        if outcome.changed {
            // The substitution splices text, so the result must still
            // parse before any later pass builds on it.
            match parse_with_path(&outcome.code, path) {
                Ok(updated) => {
                    code = outcome.code;
                    tree = updated;
                    report.passes.push(outcome.report);
                    report.had_changes = true;
                }
                Err(err) => {
                    tracing::warn!(
                        path,
                        error = %err,
                        "component substitution produced unparseable output, pass reverted"
                    );
                }
            }
        }

        let mut buckets: Vec<PassReport> = self
            .registry
            .passes()
            .iter()
            .map(|pass| PassReport::new(pass.name()))
            .collect();
        let mut splices: Vec<(usize, usize, String)> = Vec::new();

        for (start, end) in collect_class_sites(&tree, &self.options.class_join_callees) {
            let original = &code[start..end];
            let mut classes = original.to_string();
            for (i, pass) in self.registry.passes().iter().enumerate() {
                match pass.apply(&classes, &self.table) {
                    Ok(outcome) => {
                        classes = outcome.classes;
                        buckets[i].violations.extend(outcome.violations);
                    }
                    Err(err) => {
                        tracing::warn!(path, pass = pass.name(), error = %err, "pass skipped");
                    }
                }
            }
            if classes != original {
                splices.push((start, end, classes));
            }
        }

        if !splices.is_empty() {
            report.had_changes = true;
            splices.sort_by(|a, b| b.0.cmp(&a.0));
            for (start, end, replacement) in splices {
                code.replace_range(start..end, &replacement);
            }
        }
        report
            .passes
            .extend(buckets.into_iter().filter(|b| !b.violations.is_empty()));

        NormalizedCode { code, report }
    }
}

/// Every rewritable class string in the file: literal `className`
/// values plus each string literal inside a recognized class-join
/// call. Spans never overlap, so splices can apply right to left.
fn collect_class_sites(tree: &Tree, callees: &[String]) -> Vec<(usize, usize)> {
    let mut sites = Vec::new();
    tree.visit_elements(&mut |el| {
        let Some(attr) = el.class_attribute() else {
            return;
        };
        match &attr.value {
            Some(AttrValue::Literal { value_span, .. }) => {
                sites.push((value_span.start, value_span.end));
            }
            Some(AttrValue::Expression {
                text, inner_span, ..
            }) => {
                if let Some(call) = scan_class_join(text, inner_span.start, callees) {
                    for seg in &call.segments {
                        sites.push((seg.start, seg.end));
                    }
                }
            }
            None => {}
        }
    });
    sites.sort_by_key(|s| s.0);
    sites
}
