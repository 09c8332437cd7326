pub mod ast;
pub mod class_join;
pub mod error;
pub mod id_generator;
pub mod line_index;
pub mod locator;
pub mod parser;
pub mod tokenizer;

pub use ast::*;
pub use class_join::{scan_class_join, ClassJoinCall, LiteralSegment};
pub use error::{ParseError, ParseResult};
pub use id_generator::{get_document_id, IDGenerator};
pub use line_index::LineIndex;
pub use locator::{locate, LocateError, SourceLocation};
pub use parser::{parse, parse_with_path, Parser};
pub use tokenizer::{tokenize, Token};

#[cfg(feature = "pretty-errors")]
pub use error::format_error;
