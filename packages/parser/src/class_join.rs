//! Scanner for conditional class-join calls (`cn(...)`, `clsx(...)`).
//!
//! Given the text of an expression container, detects whether the whole
//! expression is a call to one of the configured callees and extracts
//! every string literal inside it with file-absolute spans. Literals that
//! are direct arguments are safe to grow or shrink; literals buried in
//! conditional arguments can only be rewritten token for token, so each
//! segment records which kind it is.

use crate::parser::{scan_balanced_braces, skip_string, skip_template};

/// One string literal inside a class-join call. `start..end` covers the
/// content between the quotes, in file-absolute bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct LiteralSegment {
    pub start: usize,
    pub end: usize,
    pub text: String,
    /// True when the literal is a direct argument of the call rather
    /// than part of a conditional expression
    pub top_level: bool,
}

/// A recognized class-join call
#[derive(Debug, Clone, PartialEq)]
pub struct ClassJoinCall {
    pub callee: String,
    /// File-absolute span of the whole call
    pub start: usize,
    pub end: usize,
    pub segments: Vec<LiteralSegment>,
    /// Number of non-literal arguments
    pub dynamic_args: usize,
}

impl ClassJoinCall {
    /// Direct string arguments, in order
    pub fn top_level_segments(&self) -> impl Iterator<Item = &LiteralSegment> {
        self.segments.iter().filter(|s| s.top_level)
    }
}

/// Scan an expression container's text for a class-join call.
///
/// `expr` is the text between the braces and `base` its file-absolute
/// start. Returns `None` unless the expression is exactly one call to a
/// configured callee (trailing content disqualifies it).
pub fn scan_class_join(expr: &str, base: usize, callees: &[String]) -> Option<ClassJoinCall> {
    let b = expr.as_bytes();

    let mut i = 0;
    while i < b.len() && b[i].is_ascii_whitespace() {
        i += 1;
    }
    let callee_start = i;
    while i < b.len() && (b[i].is_ascii_alphanumeric() || b[i] == b'_' || b[i] == b'$') {
        i += 1;
    }
    if i == callee_start {
        return None;
    }
    let callee = &expr[callee_start..i];
    if !callees.iter().any(|c| c == callee) {
        return None;
    }

    while i < b.len() && b[i].is_ascii_whitespace() {
        i += 1;
    }
    if b.get(i) != Some(&b'(') {
        return None;
    }
    let open = i;
    let after_close = scan_balanced_parens(expr, open)?;

    // the container must hold nothing but the call
    if !expr[after_close..].trim().is_empty() {
        return None;
    }

    let mut segments = Vec::new();
    let mut dynamic_args = 0;
    for (arg_start, arg_end) in split_args(expr, open, after_close - 1) {
        collect_arg(
            expr,
            base,
            arg_start,
            arg_end,
            &mut segments,
            &mut dynamic_args,
        );
    }

    Some(ClassJoinCall {
        callee: callee.to_string(),
        start: base + callee_start,
        end: base + after_close,
        segments,
        dynamic_args,
    })
}

/// Scan from `(` to the byte just past its matching `)`. Braces are
/// skipped wholesale; brackets never close a paren, so only parens are
/// counted.
fn scan_balanced_parens(src: &str, open: usize) -> Option<usize> {
    let b = src.as_bytes();
    let mut depth = 0usize;
    let mut i = open;
    while i < b.len() {
        match b[i] {
            b'(' => {
                depth += 1;
                i += 1;
            }
            b')' => {
                depth = depth.saturating_sub(1);
                i += 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            b'{' => i = scan_balanced_braces(src, i).ok()?,
            b'"' | b'\'' => i = skip_string(b, i),
            b'`' => i = skip_template(src, i),
            b'/' if b.get(i + 1) == Some(&b'/') => {
                while i < b.len() && b[i] != b'\n' {
                    i += 1;
                }
            }
            b'/' if b.get(i + 1) == Some(&b'*') => {
                i += 2;
                while i + 1 < b.len() && !(b[i] == b'*' && b[i + 1] == b'/') {
                    i += 1;
                }
                i = (i + 2).min(b.len());
            }
            _ => i += 1,
        }
    }
    None
}

/// Split the argument list between `open` (at `(`) and `close` (at `)`)
/// at top-level commas.
fn split_args(src: &str, open: usize, close: usize) -> Vec<(usize, usize)> {
    let b = src.as_bytes();
    let mut args = Vec::new();
    let mut arg_start = open + 1;
    let mut paren_depth = 0usize;
    let mut bracket_depth = 0usize;
    let mut i = open + 1;
    while i < close {
        match b[i] {
            b'(' => paren_depth += 1,
            b')' => paren_depth = paren_depth.saturating_sub(1),
            b'[' => bracket_depth += 1,
            b']' => bracket_depth = bracket_depth.saturating_sub(1),
            b'{' => {
                i = scan_balanced_braces(src, i).unwrap_or(close);
                continue;
            }
            b'"' | b'\'' => {
                i = skip_string(b, i);
                continue;
            }
            b'`' => {
                i = skip_template(src, i);
                continue;
            }
            b',' if paren_depth == 0 && bracket_depth == 0 => {
                args.push((arg_start, i));
                arg_start = i + 1;
            }
            _ => {}
        }
        i += 1;
    }
    if arg_start < close {
        args.push((arg_start, close));
    }
    args
}

/// Record the literals inside one argument. A bare string literal is a
/// top-level segment; anything else is a dynamic argument whose embedded
/// literals are swap-only.
fn collect_arg(
    src: &str,
    base: usize,
    start: usize,
    end: usize,
    segments: &mut Vec<LiteralSegment>,
    dynamic_args: &mut usize,
) {
    let b = src.as_bytes();
    let mut s = start;
    while s < end && b[s].is_ascii_whitespace() {
        s += 1;
    }
    let mut e = end;
    while e > s && b[e - 1].is_ascii_whitespace() {
        e -= 1;
    }
    if s >= e {
        return;
    }

    if b[s] == b'"' || b[s] == b'\'' {
        let str_end = skip_string(b, s);
        if str_end == e && str_end > s + 1 {
            segments.push(LiteralSegment {
                start: base + s + 1,
                end: base + str_end - 1,
                text: src[s + 1..str_end - 1].to_string(),
                top_level: true,
            });
            return;
        }
    }

    *dynamic_args += 1;
    let mut i = s;
    while i < e {
        match b[i] {
            b'"' | b'\'' => {
                let str_end = skip_string(b, i);
                if str_end > i + 1 && b.get(str_end - 1) == Some(&b[i]) {
                    segments.push(LiteralSegment {
                        start: base + i + 1,
                        end: base + str_end - 1,
                        text: src[i + 1..str_end - 1].to_string(),
                        top_level: false,
                    });
                }
                i = str_end;
            }
            b'`' => i = skip_template(src, i),
            b'/' if b.get(i + 1) == Some(&b'/') => {
                while i < e && b[i] != b'\n' {
                    i += 1;
                }
            }
            b'/' if b.get(i + 1) == Some(&b'*') => {
                i += 2;
                while i + 1 < e && !(b[i] == b'*' && b[i + 1] == b'/') {
                    i += 1;
                }
                i = (i + 2).min(e);
            }
            _ => i += 1,
        }
    }
}
