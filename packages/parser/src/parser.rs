//! Recursive descent parser for TSX-like component modules.
//!
//! The parser does not understand the surrounding script language. It
//! recognizes three things and records exact byte spans for each:
//!
//! - the import header at the top of the module
//! - markup regions (elements and fragments), found by scanning script
//!   for a `<` in expression position
//! - inside markup: nested elements, text runs, and `{...}` expression
//!   containers, which are kept as opaque text with balanced braces
//!
//! Expression position means the `<` follows `( , = ? : { [ ; ! && || =>`
//! or a keyword like `return`, or sits at the start of the file. A `<`
//! anywhere else is treated as a comparison and skipped.

use crate::ast::*;
use crate::error::{ParseError, ParseResult};
use crate::id_generator::IDGenerator;
use crate::tokenizer::Token;
use logos::Logos;

/// Parse a module without a file path (anonymous document ID)
pub fn parse(source: &str) -> ParseResult<Tree> {
    parse_with_path(source, "untitled")
}

/// Parse a module, seeding node IDs from the file path
pub fn parse_with_path(source: &str, path: &str) -> ParseResult<Tree> {
    Parser::new(source, IDGenerator::new(path)).parse_document()
}

pub struct Parser<'src> {
    src: &'src str,
    pos: usize,
    ids: IDGenerator,
}

impl<'src> Parser<'src> {
    pub fn new(src: &'src str, ids: IDGenerator) -> Self {
        Self { src, pos: 0, ids }
    }

    /// Parse a complete module
    pub fn parse_document(&mut self) -> ParseResult<Tree> {
        let id = self.ids.seed().to_string();

        let mut imports = Vec::new();
        loop {
            self.skip_trivia();
            if self.at_keyword("import") {
                imports.push(self.parse_import()?);
            } else {
                break;
            }
        }

        let mut roots = Vec::new();
        while let Some(start) = self.scan_markup_start() {
            self.pos = start;
            roots.push(self.parse_node()?);
        }

        Ok(Tree { id, imports, roots })
    }

    // --- script scanning ---

    /// Find the next `<` in expression position, skipping strings,
    /// templates and comments. Tolerant of malformed script: scanning
    /// just runs to the end of the file.
    fn scan_markup_start(&self) -> Option<usize> {
        let b = self.src.as_bytes();
        let mut i = self.pos;
        let mut last_sig: Option<usize> = None;
        while i < b.len() {
            let c = b[i];
            match c {
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
                b'"' | b'\'' => {
                    i = skip_string(b, i);
                    last_sig = Some(i.saturating_sub(1));
                }
                b'`' => {
                    i = skip_template(self.src, i);
                    last_sig = Some(i.saturating_sub(1));
                }
                b'<' => {
                    if self.is_markup_start(i, last_sig) {
                        return Some(i);
                    }
                    last_sig = Some(i);
                    i += 1;
                }
                _ if c.is_ascii_whitespace() => i += 1,
                _ => {
                    last_sig = Some(i);
                    i += 1;
                }
            }
        }
        None
    }

    fn is_markup_start(&self, lt: usize, last_sig: Option<usize>) -> bool {
        let b = self.src.as_bytes();
        let opens_tag = match b.get(lt + 1) {
            Some(&c) => c.is_ascii_alphabetic() || c == b'_' || c == b'>',
            None => false,
        };
        if !opens_tag {
            return false;
        }
        let Some(prev) = last_sig else {
            return true;
        };
        match b[prev] {
            b'(' | b',' | b'=' | b'?' | b':' | b'{' | b'[' | b';' | b'!' => true,
            b'&' => prev > 0 && b[prev - 1] == b'&',
            b'|' => prev > 0 && b[prev - 1] == b'|',
            b'>' => prev > 0 && b[prev - 1] == b'=',
            c if c.is_ascii_alphanumeric() || c == b'_' || c == b'$' => matches!(
                self.word_ending_at(prev),
                "return" | "yield" | "do" | "else" | "typeof" | "await"
            ),
            _ => false,
        }
    }

    fn word_ending_at(&self, end: usize) -> &str {
        let b = self.src.as_bytes();
        let mut start = end;
        while start > 0 {
            let c = b[start - 1];
            if c.is_ascii_alphanumeric() || c == b'_' || c == b'$' {
                start -= 1;
            } else {
                break;
            }
        }
        &self.src[start..=end]
    }

    // --- imports ---

    /// Parse one import declaration with the logos lexer. Tokens are
    /// pulled lazily so the lexer never sees the script that follows.
    fn parse_import(&mut self) -> ParseResult<ImportDecl> {
        let stmt_start = self.pos;
        let rest = &self.src[self.pos..];
        let mut lexer = Token::lexer(rest);

        let mut tokens: Vec<(Token, std::ops::Range<usize>)> = Vec::new();
        let mut saw_module = false;
        loop {
            let Some(result) = lexer.next() else { break };
            let range = lexer.span();
            let token = result
                .map_err(|_| ParseError::lexer_error(stmt_start + range.start))?;
            if saw_module {
                if matches!(token, Token::Semi) {
                    tokens.push((token, range));
                }
                break;
            }
            let is_module = matches!(token, Token::String(_) | Token::SingleQuoteString(_));
            tokens.push((token, range));
            if is_module {
                saw_module = true;
            }
        }

        if !saw_module {
            return Err(ParseError::unexpected_eof(self.src.len()));
        }

        let mut idx = 0;
        let pos_of = |range: &std::ops::Range<usize>| stmt_start + range.start;

        match tokens.get(idx) {
            Some((Token::Import, _)) => idx += 1,
            Some((tok, range)) => {
                return Err(ParseError::unexpected_token(
                    pos_of(range),
                    "import",
                    format!("{:?}", tok),
                ))
            }
            None => return Err(ParseError::unexpected_eof(stmt_start)),
        }

        let mut type_only = false;
        if matches!(tokens.get(idx), Some((Token::Type, _))) {
            type_only = true;
            idx += 1;
        }

        let mut default_import: Option<String> = None;
        let mut namespace: Option<String> = None;
        let mut named: Vec<ImportSpecifier> = Vec::new();
        let mut named_span: Option<Span> = None;
        let mut module: Option<String> = None;

        while idx < tokens.len() {
            let (token, range) = &tokens[idx];
            match token {
                Token::String(s) | Token::SingleQuoteString(s) => {
                    module = Some(s.to_string());
                    idx += 1;
                    break;
                }
                Token::From | Token::Comma => idx += 1,
                Token::Ident(name) => {
                    if default_import.is_some() {
                        return Err(ParseError::unexpected_token(
                            pos_of(range),
                            "from",
                            (*name).to_string(),
                        ));
                    }
                    default_import = Some((*name).to_string());
                    idx += 1;
                }
                Token::Star => {
                    idx += 1;
                    if !matches!(tokens.get(idx), Some((Token::As, _))) {
                        return Err(ParseError::unexpected_token(
                            pos_of(range),
                            "as",
                            "namespace import without alias",
                        ));
                    }
                    idx += 1;
                    match tokens.get(idx) {
                        Some((Token::Ident(name), _)) => {
                            namespace = Some((*name).to_string());
                            idx += 1;
                        }
                        _ => {
                            return Err(ParseError::unexpected_token(
                                pos_of(range),
                                "identifier",
                                "namespace import without name",
                            ))
                        }
                    }
                }
                Token::LBrace => {
                    let open_end = stmt_start + range.end;
                    idx += 1;
                    let close_start;
                    loop {
                        match tokens.get(idx) {
                            Some((Token::RBrace, r)) => {
                                close_start = stmt_start + r.start;
                                idx += 1;
                                break;
                            }
                            Some((Token::Comma, _)) | Some((Token::Type, _)) => idx += 1,
                            Some((Token::Ident(name), _)) => {
                                let mut spec = ImportSpecifier {
                                    name: (*name).to_string(),
                                    alias: None,
                                };
                                idx += 1;
                                if matches!(tokens.get(idx), Some((Token::As, _))) {
                                    idx += 1;
                                    if let Some((Token::Ident(alias), _)) = tokens.get(idx) {
                                        spec.alias = Some((*alias).to_string());
                                        idx += 1;
                                    }
                                }
                                named.push(spec);
                            }
                            Some((tok, r)) => {
                                return Err(ParseError::unexpected_token(
                                    pos_of(r),
                                    "import specifier",
                                    format!("{:?}", tok),
                                ))
                            }
                            None => return Err(ParseError::unexpected_eof(self.src.len())),
                        }
                    }
                    named_span = Some(Span::new(open_end, close_start, self.ids.new_id()));
                }
                tok => {
                    return Err(ParseError::unexpected_token(
                        pos_of(range),
                        "import specifier",
                        format!("{:?}", tok),
                    ))
                }
            }
        }

        // trailing semi, when present, is the last collected token
        if matches!(tokens.get(idx), Some((Token::Semi, _))) {
            idx += 1;
        }
        let stmt_end = stmt_start
            + tokens
                .get(idx.saturating_sub(1))
                .map(|(_, r)| r.end)
                .unwrap_or(0);
        self.pos = stmt_end;

        let module = module.ok_or_else(|| ParseError::unexpected_eof(self.src.len()))?;
        Ok(ImportDecl {
            module,
            default_import,
            namespace,
            named,
            type_only,
            named_span,
            span: Span::new(stmt_start, stmt_end, self.ids.new_id()),
        })
    }

    // --- markup ---

    fn parse_node(&mut self) -> ParseResult<Node> {
        match self.peek_byte() {
            Some(b'<') => {
                if self.src.as_bytes().get(self.pos + 1) == Some(&b'>') {
                    Ok(Node::Fragment(self.parse_fragment()?))
                } else {
                    Ok(Node::Element(self.parse_element()?))
                }
            }
            Some(b'{') => Ok(Node::Expression(self.parse_expression_child()?)),
            Some(_) => Ok(Node::Text(self.parse_text())),
            None => Err(ParseError::unexpected_eof(self.pos)),
        }
    }

    fn parse_element(&mut self) -> ParseResult<Element> {
        let start = self.pos;
        self.expect_byte(b'<')?;
        let name_start = self.pos;
        let tag_name = self.parse_tag_name()?;
        let name_span = Span::new(name_start, self.pos, self.ids.new_id());

        let mut attributes = Vec::new();
        let (self_closing, open_end) = loop {
            self.skip_ws();
            match self.peek_byte() {
                None => return Err(ParseError::unexpected_eof(self.pos)),
                Some(b'/') => {
                    self.pos += 1;
                    self.skip_ws();
                    self.expect_byte(b'>')?;
                    break (true, self.pos);
                }
                Some(b'>') => {
                    self.pos += 1;
                    break (false, self.pos);
                }
                Some(b'{') => attributes.push(self.parse_spread_attribute()?),
                Some(_) => attributes.push(Attribute::Named(self.parse_named_attribute()?)),
            }
        };

        if self_closing {
            let span = Span::new(start, open_end, self.ids.new_id());
            return Ok(Element {
                tag_name,
                name_span,
                attributes,
                children: Vec::new(),
                self_closing: true,
                open_end,
                close_start: open_end,
                close_name_span: None,
                span,
            });
        }

        let children = self.parse_children()?;

        let close_start = self.pos;
        self.pos += 2; // consume `</`
        self.skip_ws();
        let cname_start = self.pos;
        let close_name = self.parse_tag_name()?;
        let close_name_span = Span::new(cname_start, self.pos, self.ids.new_id());
        self.skip_ws();
        self.expect_byte(b'>')?;

        if close_name != tag_name {
            return Err(ParseError::mismatched_closing_tag(
                close_start,
                tag_name,
                close_name,
            ));
        }

        Ok(Element {
            tag_name,
            name_span,
            attributes,
            children,
            self_closing: false,
            open_end,
            close_start,
            close_name_span: Some(close_name_span),
            span: Span::new(start, self.pos, self.ids.new_id()),
        })
    }

    fn parse_fragment(&mut self) -> ParseResult<Fragment> {
        let start = self.pos;
        self.expect_byte(b'<')?;
        self.expect_byte(b'>')?;
        let open_end = self.pos;

        let children = self.parse_children()?;

        let close_start = self.pos;
        self.pos += 2; // consume `</`
        self.skip_ws();
        if self.peek_byte() != Some(b'>') {
            return Err(ParseError::invalid_syntax(
                self.pos,
                "expected `</>` to close fragment",
            ));
        }
        self.pos += 1;

        Ok(Fragment {
            children,
            open_end,
            close_start,
            span: Span::new(start, self.pos, self.ids.new_id()),
        })
    }

    /// Parse children until a `</` is seen. The caller consumes the
    /// closing tag itself.
    fn parse_children(&mut self) -> ParseResult<Vec<Node>> {
        let mut children = Vec::new();
        loop {
            if self.pos >= self.src.len() {
                return Err(ParseError::unexpected_eof(self.pos));
            }
            if self.src[self.pos..].starts_with("</") {
                return Ok(children);
            }
            children.push(self.parse_node()?);
        }
    }

    fn parse_text(&mut self) -> TextNode {
        let start = self.pos;
        let b = self.src.as_bytes();
        while self.pos < b.len() && b[self.pos] != b'<' && b[self.pos] != b'{' {
            self.pos += 1;
        }
        TextNode {
            value: self.src[start..self.pos].to_string(),
            span: Span::new(start, self.pos, self.ids.new_id()),
        }
    }

    fn parse_expression_child(&mut self) -> ParseResult<ExpressionNode> {
        let start = self.pos;
        let end = scan_balanced_braces(self.src, start)?;
        self.pos = end;
        Ok(ExpressionNode {
            text: self.src[start + 1..end - 1].to_string(),
            span: Span::new(start, end, self.ids.new_id()),
        })
    }

    fn parse_named_attribute(&mut self) -> ParseResult<NamedAttribute> {
        let start = self.pos;
        let name = self.parse_attr_name()?;
        let name_end = self.pos;
        let name_span = Span::new(start, name_end, self.ids.new_id());

        self.skip_ws();
        if self.peek_byte() != Some(b'=') {
            self.pos = name_end;
            return Ok(NamedAttribute {
                name,
                name_span,
                value: None,
                span: Span::new(start, name_end, self.ids.new_id()),
            });
        }
        self.pos += 1;
        self.skip_ws();

        let value = self.parse_attr_value()?;
        let span = Span::new(start, value.span().end, self.ids.new_id());
        Ok(NamedAttribute {
            name,
            name_span,
            value: Some(value),
            span,
        })
    }

    fn parse_attr_value(&mut self) -> ParseResult<AttrValue> {
        match self.peek_byte() {
            Some(q @ (b'"' | b'\'')) => {
                let vstart = self.pos;
                let b = self.src.as_bytes();
                let mut i = vstart + 1;
                while i < b.len() && b[i] != q {
                    i += 1;
                }
                if i >= b.len() {
                    return Err(ParseError::unterminated(vstart, "attribute value"));
                }
                self.pos = i + 1;
                Ok(AttrValue::Literal {
                    value: self.src[vstart + 1..i].to_string(),
                    value_span: Span::new(vstart + 1, i, self.ids.new_id()),
                    quote: q as char,
                    span: Span::new(vstart, self.pos, self.ids.new_id()),
                })
            }
            Some(b'{') => {
                let vstart = self.pos;
                let end = scan_balanced_braces(self.src, vstart)?;
                self.pos = end;
                Ok(AttrValue::Expression {
                    text: self.src[vstart + 1..end - 1].to_string(),
                    inner_span: Span::new(vstart + 1, end - 1, self.ids.new_id()),
                    span: Span::new(vstart, end, self.ids.new_id()),
                })
            }
            Some(c) => Err(ParseError::unexpected_token(
                self.pos,
                "attribute value",
                (c as char).to_string(),
            )),
            None => Err(ParseError::unexpected_eof(self.pos)),
        }
    }

    fn parse_spread_attribute(&mut self) -> ParseResult<Attribute> {
        let start = self.pos;
        let end = scan_balanced_braces(self.src, start)?;
        self.pos = end;
        Ok(Attribute::Spread(SpreadAttribute {
            expression: self.src[start + 1..end - 1].to_string(),
            span: Span::new(start, end, self.ids.new_id()),
        }))
    }

    fn parse_tag_name(&mut self) -> ParseResult<String> {
        let b = self.src.as_bytes();
        let start = self.pos;
        match b.get(self.pos) {
            Some(&c) if c.is_ascii_alphabetic() || c == b'_' => self.pos += 1,
            Some(&c) => {
                return Err(ParseError::unexpected_token(
                    self.pos,
                    "tag name",
                    (c as char).to_string(),
                ))
            }
            None => return Err(ParseError::unexpected_eof(self.pos)),
        }
        while let Some(&c) = b.get(self.pos) {
            if c.is_ascii_alphanumeric() || c == b'_' || c == b'-' || c == b'.' || c == b':' {
                self.pos += 1;
            } else {
                break;
            }
        }
        Ok(self.src[start..self.pos].to_string())
    }

    fn parse_attr_name(&mut self) -> ParseResult<String> {
        let b = self.src.as_bytes();
        let start = self.pos;
        match b.get(self.pos) {
            Some(&c) if c.is_ascii_alphabetic() || c == b'_' || c == b'@' => self.pos += 1,
            Some(&c) => {
                return Err(ParseError::unexpected_token(
                    self.pos,
                    "attribute name",
                    (c as char).to_string(),
                ))
            }
            None => return Err(ParseError::unexpected_eof(self.pos)),
        }
        while let Some(&c) = b.get(self.pos) {
            if c.is_ascii_alphanumeric() || c == b'_' || c == b'-' || c == b'.' || c == b':' {
                self.pos += 1;
            } else {
                break;
            }
        }
        Ok(self.src[start..self.pos].to_string())
    }

    // --- low level helpers ---

    fn peek_byte(&self) -> Option<u8> {
        self.src.as_bytes().get(self.pos).copied()
    }

    fn expect_byte(&mut self, expected: u8) -> ParseResult<()> {
        match self.peek_byte() {
            Some(c) if c == expected => {
                self.pos += 1;
                Ok(())
            }
            Some(c) => Err(ParseError::unexpected_token(
                self.pos,
                (expected as char).to_string(),
                (c as char).to_string(),
            )),
            None => Err(ParseError::unexpected_eof(self.pos)),
        }
    }

    fn skip_ws(&mut self) {
        let b = self.src.as_bytes();
        while self.pos < b.len() && b[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }
    }

    fn skip_trivia(&mut self) {
        let b = self.src.as_bytes();
        loop {
            self.skip_ws();
            if b.get(self.pos) == Some(&b'/') && b.get(self.pos + 1) == Some(&b'/') {
                while self.pos < b.len() && b[self.pos] != b'\n' {
                    self.pos += 1;
                }
            } else if b.get(self.pos) == Some(&b'/') && b.get(self.pos + 1) == Some(&b'*') {
                self.pos += 2;
                while self.pos + 1 < b.len()
                    && !(b[self.pos] == b'*' && b[self.pos + 1] == b'/')
                {
                    self.pos += 1;
                }
                self.pos = (self.pos + 2).min(b.len());
            } else {
                break;
            }
        }
    }

    fn at_keyword(&self, kw: &str) -> bool {
        if !self.src[self.pos..].starts_with(kw) {
            return false;
        }
        !self.src[self.pos + kw.len()..]
            .chars()
            .next()
            .map_or(false, |c| c.is_alphanumeric() || c == '_' || c == '$')
    }
}

/// Skip past a `"` or `'` string starting at `i`. A bare newline ends a
/// broken string so scanning cannot run away.
pub(crate) fn skip_string(b: &[u8], i: usize) -> usize {
    let quote = b[i];
    let mut i = i + 1;
    while i < b.len() {
        match b[i] {
            b'\\' => i += 2,
            b'\n' => return i,
            c if c == quote => return i + 1,
            _ => i += 1,
        }
    }
    i
}

/// Skip past a template literal starting at the backtick, descending
/// into `${}` holes.
pub(crate) fn skip_template(src: &str, i: usize) -> usize {
    let b = src.as_bytes();
    let mut i = i + 1;
    while i < b.len() {
        match b[i] {
            b'\\' => i += 2,
            b'`' => return i + 1,
            b'$' if b.get(i + 1) == Some(&b'{') => match scan_balanced_braces(src, i + 1) {
                Ok(end) => i = end,
                Err(_) => return b.len(),
            },
            _ => i += 1,
        }
    }
    i
}

/// Scan from an opening `{` to the byte just past its matching `}`,
/// skipping strings, templates and comments.
pub(crate) fn scan_balanced_braces(src: &str, open: usize) -> ParseResult<usize> {
    let b = src.as_bytes();
    let mut depth = 0usize;
    let mut i = open;
    while i < b.len() {
        match b[i] {
            b'{' => {
                depth += 1;
                i += 1;
            }
            b'}' => {
                depth = depth.saturating_sub(1);
                i += 1;
                if depth == 0 {
                    return Ok(i);
                }
            }
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
    Err(ParseError::unterminated(open, "expression"))
}
