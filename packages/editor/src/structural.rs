//! Structural mutations: text, node and attribute edits.
//!
//! Everything here is AST-exact except `update_text_by_pattern`, the one
//! sanctioned fallback: it replaces a text run that sits strictly
//! between `>` and `<`, optionally narrowed by the classes of the
//! enclosing element. Node insertion and deletion never fall back to
//! patterns; a stale anchor rejects the edit.

use crate::classes::{parse_classes, splice};
use crate::errors::{EditError, PatternClass};
use crate::intent::{AttributeValue, InsertPosition};
use graft_parser::{AttrValue, Element, Node, TextNode, Tree};

/// Attributes whose values form a closed set. `Keyword` writes are
/// validated against this table.
const ATTRIBUTE_ENUMS: &[(&str, &[&str])] = &[
    (
        "type",
        &[
            "button", "submit", "reset", "text", "checkbox", "radio", "number", "email",
            "password", "file", "hidden", "date", "search", "tel", "url",
        ],
    ),
    ("target", &["_blank", "_self", "_parent", "_top"]),
    ("autocomplete", &["on", "off"]),
    ("dir", &["ltr", "rtl", "auto"]),
    ("draggable", &["true", "false"]),
    ("contentEditable", &["true", "false", "plaintext-only"]),
    ("loading", &["eager", "lazy"]),
    ("decoding", &["sync", "async", "auto"]),
    ("wrap", &["hard", "soft"]),
    ("method", &["get", "post", "dialog"]),
];

// --- text ---

/// Replace a text run under an anchored node
pub(crate) fn update_text_at(
    source: &str,
    node: &Node,
    original: &str,
    new: &str,
) -> Result<String, EditError> {
    match node {
        Node::Text(text) => replace_text_node(source, text, original, new),
        Node::Element(el) => {
            for child in &el.children {
                if let Node::Text(text) = child {
                    if text.value.trim() == original.trim() {
                        return replace_text_node(source, text, original, new);
                    }
                }
            }
            Err(EditError::NotFound(format!(
                "text {:?} under <{}>",
                original.trim(),
                el.tag_name
            )))
        }
        Node::Fragment(frag) => {
            for child in &frag.children {
                if let Node::Text(text) = child {
                    if text.value.trim() == original.trim() {
                        return replace_text_node(source, text, original, new);
                    }
                }
            }
            Err(EditError::NotFound(format!("text {:?}", original.trim())))
        }
        Node::Expression(_) => Err(EditError::unsafe_edit(
            "cannot rewrite text inside an expression",
        )),
    }
}

/// Pattern fallback: first text run matching `original`, strictly
/// between `>` and `<`, under an element whose classes contain the
/// context tokens when a context is given.
pub(crate) fn update_text_by_pattern(
    source: &str,
    tree: &Tree,
    original: &str,
    new: &str,
    context_classes: Option<&str>,
) -> Result<String, EditError> {
    let mut found: Option<&TextNode> = None;
    for root in &tree.roots {
        if found.is_some() {
            break;
        }
        search_text(root, None, source, original, context_classes, &mut found);
    }
    match found {
        Some(text) => replace_text_node(source, text, original, new),
        None => Err(EditError::pattern_not_found(PatternClass::ReadOnly)),
    }
}

fn search_text<'t>(
    node: &'t Node,
    parent: Option<&'t Element>,
    source: &str,
    original: &str,
    context_classes: Option<&str>,
    found: &mut Option<&'t TextNode>,
) {
    if found.is_some() {
        return;
    }
    match node {
        Node::Text(text) => {
            if text.value.trim() != original.trim() {
                return;
            }
            if !between_tags(source, text) {
                return;
            }
            if let Some(context) = context_classes {
                let Some(parent) = parent else { return };
                if !context_matches(parent, context) {
                    return;
                }
            }
            *found = Some(text);
        }
        Node::Element(el) => {
            for child in &el.children {
                search_text(child, Some(el), source, original, context_classes, found);
            }
        }
        Node::Fragment(frag) => {
            for child in &frag.children {
                search_text(child, parent, source, original, context_classes, found);
            }
        }
        Node::Expression(_) => {}
    }
}

/// The run must sit directly between a tag close and a tag open, so the
/// replacement cannot bleed into attribute or expression territory
fn between_tags(source: &str, text: &TextNode) -> bool {
    let b = source.as_bytes();
    let before_ok = text.span.start > 0 && b[text.span.start - 1] == b'>';
    let after_ok = b.get(text.span.end) == Some(&b'<');
    before_ok && after_ok
}

/// Context check uses the literal class attribute only. An expression
/// class list cannot be verified statically, so it never matches.
fn context_matches(el: &Element, context: &str) -> bool {
    let Some(attr) = el.class_attribute() else {
        return false;
    };
    let Some((value, _)) = attr.value.as_ref().and_then(|v| v.as_literal()) else {
        return false;
    };
    let have = parse_classes(value);
    parse_classes(context)
        .iter()
        .all(|needed| have.contains(needed))
}

fn replace_text_node(
    source: &str,
    text: &TextNode,
    original: &str,
    new: &str,
) -> Result<String, EditError> {
    if text.value.trim() != original.trim() {
        return Err(EditError::NotFound(format!("text {:?}", original.trim())));
    }
    // keep the run's own leading and trailing whitespace
    let lead = text.value.len() - text.value.trim_start().len();
    let trail = text.value.len() - text.value.trim_end().len();
    Ok(splice(
        source,
        text.span.start + lead,
        text.span.end - trail,
        new.trim(),
    ))
}

// --- nodes ---

/// Remove a node. When the node owns its line, the whole line goes.
pub(crate) fn delete_node(source: &str, node: &Node) -> Result<String, EditError> {
    let span = node.span();
    let (start, end) = expand_to_line(source, span.start, span.end);
    Ok(splice(source, start, end, ""))
}

fn expand_to_line(source: &str, start: usize, end: usize) -> (usize, usize) {
    let b = source.as_bytes();
    let mut line_start = start;
    while line_start > 0 && (b[line_start - 1] == b' ' || b[line_start - 1] == b'\t') {
        line_start -= 1;
    }
    let leading_blank = line_start == 0 || b[line_start - 1] == b'\n';

    let mut line_end = end;
    while line_end < b.len() && (b[line_end] == b' ' || b[line_end] == b'\t') {
        line_end += 1;
    }
    if leading_blank && line_end < b.len() && b[line_end] == b'\n' {
        return (line_start, line_end + 1);
    }
    if leading_blank && line_end == b.len() {
        return (line_start, line_end);
    }
    (start, end)
}

/// Insert markup as a child of an element
pub(crate) fn insert_child(
    source: &str,
    el: &Element,
    markup: &str,
    position: InsertPosition,
) -> Result<String, EditError> {
    if markup.trim_start().starts_with('<') {
        if let Err(err) = graft_parser::parse(markup) {
            return Err(EditError::unsafe_edit(format!(
                "inserted markup does not parse: {}",
                err
            )));
        }
    }

    let indent = line_indent(source, el.span.start);
    let child_indent = format!("{}  ", indent);

    if el.self_closing {
        // expand `<tag ... />` into an open/close pair around the child
        let b = source.as_bytes();
        let mut slash = el.span.end.saturating_sub(2);
        while slash > el.span.start && b[slash] != b'/' {
            slash -= 1;
        }
        let mut cut = slash;
        while cut > el.span.start && (b[cut - 1] == b' ' || b[cut - 1] == b'\t') {
            cut -= 1;
        }
        let replacement = format!(
            ">\n{}{}\n{}</{}>",
            child_indent, markup, indent, el.tag_name
        );
        return Ok(splice(source, cut, el.span.end, &replacement));
    }

    let significant: Vec<&Node> = el
        .children
        .iter()
        .filter(|c| !is_blank_text(c))
        .collect();

    let at_index = |index: usize| -> String {
        // insert before the child currently at `index`
        let child_start = significant[index].span().start;
        splice(
            source,
            child_start,
            child_start,
            &format!("{}\n{}", markup, child_indent),
        )
    };

    let append = || -> String {
        match significant.last() {
            Some(last) => {
                let after = last.span().end;
                splice(source, after, after, &format!("\n{}{}", child_indent, markup))
            }
            None => {
                let insertion = if el.children.is_empty() {
                    format!("\n{}{}\n{}", child_indent, markup, indent)
                } else {
                    format!("\n{}{}", child_indent, markup)
                };
                splice(source, el.open_end, el.open_end, &insertion)
            }
        }
    };

    Ok(match position {
        InsertPosition::Prepend => {
            if significant.is_empty() {
                append()
            } else {
                at_index(0)
            }
        }
        InsertPosition::Append => append(),
        InsertPosition::At { index } => {
            if index < significant.len() {
                at_index(index)
            } else {
                append()
            }
        }
    })
}

fn is_blank_text(node: &Node) -> bool {
    matches!(node, Node::Text(t) if t.value.trim().is_empty())
}

fn line_indent(source: &str, offset: usize) -> String {
    let line_start = source[..offset].rfind('\n').map(|i| i + 1).unwrap_or(0);
    source[line_start..]
        .chars()
        .take_while(|c| *c == ' ' || *c == '\t')
        .collect()
}

// --- attributes ---

/// Set an attribute to a typed value, adding it when missing
pub(crate) fn update_attribute(
    source: &str,
    el: &Element,
    name: &str,
    value: &AttributeValue,
) -> Result<String, EditError> {
    match value {
        AttributeValue::Bool(false) => match el.attribute(name) {
            Some(attr) => Ok(remove_attr_bytes(source, el, attr.span.start, attr.span.end)),
            None => Ok(source.to_string()),
        },
        AttributeValue::Bool(true) => match el.attribute(name) {
            Some(attr) if attr.value.is_none() => Ok(source.to_string()),
            Some(attr) => Ok(splice(source, attr.name_span.end, attr.span.end, "")),
            None => insert_attribute_text(source, el, name),
        },
        AttributeValue::Str(s) => write_string_attr(source, el, name, s),
        AttributeValue::Keyword(k) => {
            validate_keyword(name, k)?;
            write_string_attr(source, el, name, k)
        }
    }
}

/// Remove an attribute. Unlike `Bool(false)`, a missing attribute here
/// is an error: the caller named something that does not exist.
pub(crate) fn remove_attribute(
    source: &str,
    el: &Element,
    name: &str,
) -> Result<String, EditError> {
    match el.attribute(name) {
        Some(attr) => Ok(remove_attr_bytes(source, el, attr.span.start, attr.span.end)),
        None => Err(EditError::NotFound(format!(
            "attribute `{}` on <{}>",
            name, el.tag_name
        ))),
    }
}

fn write_string_attr(
    source: &str,
    el: &Element,
    name: &str,
    raw: &str,
) -> Result<String, EditError> {
    let quoted = quote_attr_value(raw)?;
    match el.attribute(name) {
        Some(attr) => match &attr.value {
            Some(AttrValue::Literal { span, .. }) => {
                Ok(splice(source, span.start, span.end, &quoted))
            }
            Some(AttrValue::Expression { .. }) => Err(EditError::unsafe_edit(format!(
                "attribute `{}` holds an expression; refusing to overwrite code",
                name
            ))),
            None => Ok(splice(
                source,
                attr.name_span.end,
                attr.name_span.end,
                &format!("={}", quoted),
            )),
        },
        None => insert_attribute_text(source, el, &format!("{}={}", name, quoted)),
    }
}

pub(crate) fn insert_attribute_text(
    source: &str,
    el: &Element,
    text: &str,
) -> Result<String, EditError> {
    let b = source.as_bytes();
    let at = if el.self_closing {
        let mut slash = el.span.end.saturating_sub(2);
        while slash > el.span.start && b[slash] != b'/' {
            slash -= 1;
        }
        let mut at = slash;
        while at > el.span.start && (b[at - 1] == b' ' || b[at - 1] == b'\t') {
            at -= 1;
        }
        at
    } else {
        el.open_end - 1
    };
    Ok(splice(source, at, at, &format!(" {}", text)))
}

fn remove_attr_bytes(source: &str, el: &Element, start: usize, end: usize) -> String {
    let b = source.as_bytes();
    let mut cut = start;
    while cut > el.span.start + 1 && b[cut - 1].is_ascii_whitespace() {
        cut -= 1;
    }
    splice(source, cut, end, "")
}

fn quote_attr_value(raw: &str) -> Result<String, EditError> {
    if !raw.contains('"') {
        Ok(format!("\"{}\"", raw))
    } else if !raw.contains('\'') {
        Ok(format!("'{}'", raw))
    } else {
        Err(EditError::unsafe_edit(
            "attribute value mixes both quote kinds",
        ))
    }
}

fn validate_keyword(name: &str, keyword: &str) -> Result<(), EditError> {
    let Some((_, values)) = ATTRIBUTE_ENUMS.iter().find(|(n, _)| *n == name) else {
        return Err(EditError::unsafe_edit(format!(
            "attribute `{}` has no enumerated values",
            name
        )));
    };
    if values.contains(&keyword) {
        Ok(())
    } else {
        Err(EditError::unsafe_edit(format!(
            "`{}` is not an allowed value for `{}`",
            keyword, name
        )))
    }
}
