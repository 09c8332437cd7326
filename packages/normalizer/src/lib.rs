//! # Normalizer
//!
//! Rewrites generated markup onto the project's design system: raw
//! interactive elements become their designated components, palette
//! colors become semantic roles, arbitrary lengths snap to the spacing
//! scale, layout rhythm snaps to an 8px grid, and raw font sizes become
//! semantic text styles.
//!
//! The pipeline is idempotent. Every pass maps tokens onto vocabulary
//! no pass rewrites, so a second run over normalized output is a no-op.
//! Files that fail to parse, or whose extension is not handled, pass
//! through byte for byte.

pub mod passes;
pub mod pipeline;
pub mod report;
pub mod tokens;

pub use passes::{
    substitute_components, ClassPass, ColorPass, ComponentOutcome, GridPass, NormalizeError,
    PassOutcome, PassRegistry, SpacingPass, TypographyPass,
};
pub use pipeline::{ContextFiles, NormalizationPipeline, NormalizerOptions};
pub use report::{NormalizationReport, NormalizedCode, PassReport, Violation};
pub use tokens::{ComponentMapping, FontStep, SpacingStep, TokenTable};
