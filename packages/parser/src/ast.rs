use serde::{Deserialize, Serialize};

/// Span information for source location tracking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub id: String,
}

impl Span {
    pub fn new(start: usize, end: usize, id: String) -> Self {
        Self { start, end, id }
    }

    pub fn contains(&self, offset: usize) -> bool {
        offset >= self.start && offset < self.end
    }
}

/// Parsed module: the import header plus every markup region found in
/// the file. Script between markup regions is not represented; mutations
/// never touch it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    /// Document ID (CRC32 of the file path)
    pub id: String,
    pub imports: Vec<ImportDecl>,
    pub roots: Vec<Node>,
}

impl Tree {
    /// Find an import declaration by module specifier
    pub fn find_import(&self, module: &str) -> Option<&ImportDecl> {
        self.imports.iter().find(|i| i.module == module)
    }

    /// Visit every element in the tree, depth first
    pub fn visit_elements<'a>(&'a self, f: &mut impl FnMut(&'a Element)) {
        for root in &self.roots {
            root.visit_elements(f);
        }
    }
}

/// Import specifier inside braces: `name` or `name as alias`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportSpecifier {
    pub name: String,
    pub alias: Option<String>,
}

/// Import declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportDecl {
    pub module: String,
    pub default_import: Option<String>,
    pub namespace: Option<String>,
    pub named: Vec<ImportSpecifier>,
    pub type_only: bool,
    /// Region between the braces of the named list, when present.
    /// Used to merge a new specifier into an existing declaration.
    pub named_span: Option<Span>,
    pub span: Span,
}

impl ImportDecl {
    pub fn has_named(&self, name: &str) -> bool {
        self.named.iter().any(|s| s.name == name)
    }
}

/// Markup node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Node {
    Element(Element),
    Fragment(Fragment),
    Text(TextNode),
    Expression(ExpressionNode),
}

impl Node {
    pub fn span(&self) -> &Span {
        match self {
            Node::Element(el) => &el.span,
            Node::Fragment(frag) => &frag.span,
            Node::Text(text) => &text.span,
            Node::Expression(expr) => &expr.span,
        }
    }

    pub fn children(&self) -> Option<&[Node]> {
        match self {
            Node::Element(el) => Some(&el.children),
            Node::Fragment(frag) => Some(&frag.children),
            _ => None,
        }
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(el) => Some(el),
            _ => None,
        }
    }

    fn visit_elements<'a>(&'a self, f: &mut impl FnMut(&'a Element)) {
        match self {
            Node::Element(el) => {
                f(el);
                for child in &el.children {
                    child.visit_elements(f);
                }
            }
            Node::Fragment(frag) => {
                for child in &frag.children {
                    child.visit_elements(f);
                }
            }
            _ => {}
        }
    }
}

/// Element node: `<div ...>children</div>` or `<br />`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    pub tag_name: String,
    /// Span of the tag name inside the open tag
    pub name_span: Span,
    pub attributes: Vec<Attribute>,
    pub children: Vec<Node>,
    pub self_closing: bool,
    /// Byte just past the `>` of the open tag
    pub open_end: usize,
    /// Byte at the `<` of the close tag. Equals `span.end` when self closing.
    pub close_start: usize,
    /// Span of the tag name inside the close tag, when present
    pub close_name_span: Option<Span>,
    pub span: Span,
}

impl Element {
    /// Look up a named attribute
    pub fn attribute(&self, name: &str) -> Option<&NamedAttribute> {
        self.attributes.iter().find_map(|attr| match attr {
            Attribute::Named(named) if named.name == name => Some(named),
            _ => None,
        })
    }

    /// The class attribute, under either of its accepted names
    pub fn class_attribute(&self) -> Option<&NamedAttribute> {
        self.attributes.iter().find_map(|attr| match attr {
            Attribute::Named(named) if named.is_class() => Some(named),
            _ => None,
        })
    }

    pub fn has_spread(&self) -> bool {
        self.attributes
            .iter()
            .any(|attr| matches!(attr, Attribute::Spread(_)))
    }
}

/// Attribute position: named attribute or `{...expr}` spread
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Attribute {
    Named(NamedAttribute),
    Spread(SpreadAttribute),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamedAttribute {
    pub name: String,
    pub name_span: Span,
    /// `None` for bare attributes like `disabled`
    pub value: Option<AttrValue>,
    pub span: Span,
}

impl NamedAttribute {
    pub fn is_class(&self) -> bool {
        matches!(self.name.as_str(), "class" | "className")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpreadAttribute {
    /// Expression text inside the braces, including the `...`
    pub expression: String,
    pub span: Span,
}

/// Attribute value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum AttrValue {
    /// Quoted string: `name="value"`
    #[serde(rename_all = "camelCase")]
    Literal {
        value: String,
        /// Span of the content between the quotes
        value_span: Span,
        quote: char,
        span: Span,
    },
    /// Braced expression: `name={expr}`
    #[serde(rename_all = "camelCase")]
    Expression {
        /// Expression text inside the braces
        text: String,
        /// Span of the content between the braces
        inner_span: Span,
        span: Span,
    },
}

impl AttrValue {
    pub fn span(&self) -> &Span {
        match self {
            AttrValue::Literal { span, .. } => span,
            AttrValue::Expression { span, .. } => span,
        }
    }

    pub fn as_literal(&self) -> Option<(&str, &Span)> {
        match self {
            AttrValue::Literal {
                value, value_span, ..
            } => Some((value, value_span)),
            _ => None,
        }
    }
}

/// Fragment node: `<>children</>`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fragment {
    pub children: Vec<Node>,
    /// Byte just past the `>` of `<>`
    pub open_end: usize,
    /// Byte at the `<` of `</>`
    pub close_start: usize,
    pub span: Span,
}

/// Raw text run between tags
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextNode {
    pub value: String,
    pub span: Span,
}

/// Braced expression child: `{expr}`. The span includes the braces,
/// `text` does not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpressionNode {
    pub text: String,
    pub span: Span,
}
