//! Node model
//!
//! The closed set of graph values that cross the wire: IRIs, blank nodes and
//! literals. Every variant renders to the canonical N-Triples-style text used in
//! query parameters and parses back from it.

mod escape;
mod interop;
mod text;

pub use escape::{escape, unescape};

use crate::error::{WireError, WireResult};
use crate::vocab::{rdf, xsd};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Resource identifier, absolute or relative
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Iri(String);

impl Iri {
    pub fn new(iri: impl Into<String>) -> Self {
        Self(iri.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Iri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>", escape(&self.0))
    }
}

impl From<&str> for Iri {
    fn from(iri: &str) -> Self {
        Self::new(iri)
    }
}

impl From<String> for Iri {
    fn from(iri: String) -> Self {
        Self(iri)
    }
}

impl PartialEq<str> for Iri {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Iri {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Blank node with a locally scoped label
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Blank(String);

impl Blank {
    /// Create a blank node, validating the label grammar
    pub fn new(label: impl Into<String>) -> WireResult<Self> {
        let label = label.into();
        if !is_valid_label(&label) {
            return Err(WireError::invalid_argument(format!(
                "invalid blank node label {:?}",
                label
            )));
        }
        Ok(Self(label))
    }

    /// Create a blank node with a globally unique label
    pub fn fresh() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    pub fn label(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Blank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "_:{}", self.0)
    }
}

pub(crate) fn is_label_start(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || !c.is_ascii()
}

pub(crate) fn is_label_char(c: char) -> bool {
    is_label_start(c) || matches!(c, '-' | '.' | ':')
}

fn is_valid_label(label: &str) -> bool {
    let mut chars = label.chars();
    match chars.next() {
        Some(first) if is_label_start(first) => {}
        _ => return false,
    }
    chars.all(is_label_char) && !label.ends_with('.')
}

/// `[A-Za-z]+(-[A-Za-z0-9]+)*`
fn is_valid_language(tag: &str) -> bool {
    let mut subtags = tag.split('-');
    let primary = subtags.next().unwrap_or_default();
    !primary.is_empty()
        && primary.chars().all(|c| c.is_ascii_alphabetic())
        && subtags.all(|s| !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric()))
}

/// Literal: lexical form, datatype and an optional language tag
///
/// A language tag is only ever attached to `xsd:string` literals.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Literal {
    lexical: String,
    datatype: Iri,
    language: Option<String>,
}

impl Literal {
    /// Create a typed literal; `rdf:langString` without a tag becomes `xsd:string`
    pub fn new(lexical: impl Into<String>, datatype: impl Into<Iri>) -> Self {
        let mut datatype = datatype.into();
        if datatype == rdf::LANG_STRING {
            datatype = Iri::new(xsd::STRING);
        }
        Self {
            lexical: lexical.into(),
            datatype,
            language: None,
        }
    }

    /// Create a plain `xsd:string` literal
    pub fn string(lexical: impl Into<String>) -> Self {
        Self::new(lexical, xsd::STRING)
    }

    /// Create a language-tagged string literal
    pub fn lang_string(lexical: impl Into<String>, language: &str) -> WireResult<Self> {
        Self::with_language(lexical, xsd::STRING, Some(language))
    }

    /// Create a literal with an optional language tag
    ///
    /// Fails with `InvalidArgument` when a tag is given for any datatype other
    /// than `xsd:string` (or `rdf:langString`, which normalizes to it), or when
    /// the tag does not match the language-tag grammar.
    pub fn with_language(
        lexical: impl Into<String>,
        datatype: impl Into<Iri>,
        language: Option<&str>,
    ) -> WireResult<Self> {
        let mut literal = Self::new(lexical, datatype);
        if let Some(tag) = language {
            if literal.datatype != xsd::STRING {
                return Err(WireError::invalid_argument(format!(
                    "language tag {:?} on a literal of datatype {}",
                    tag, literal.datatype.0
                )));
            }
            if !is_valid_language(tag) {
                return Err(WireError::invalid_argument(format!(
                    "invalid language tag {:?}",
                    tag
                )));
            }
            literal.language = Some(tag.to_string());
        }
        Ok(literal)
    }

    pub fn lexical(&self) -> &str {
        &self.lexical
    }

    pub fn datatype(&self) -> &Iri {
        &self.datatype
    }

    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    /// Case-insensitive comparison of the language tag
    pub fn lang_matches(&self, tag: &str) -> bool {
        self.language
            .as_deref()
            .map_or(false, |own| own.eq_ignore_ascii_case(tag))
    }

    pub fn has_datatype(&self, datatype: &str) -> bool {
        self.datatype == datatype
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\"", escape(&self.lexical))?;
        if let Some(lang) = &self.language {
            write!(f, "@{}", lang)
        } else if self.datatype == xsd::STRING {
            Ok(())
        } else {
            write!(f, "^^{}", self.datatype)
        }
    }
}

/// A graph value
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Node {
    Iri(Iri),
    Blank(Blank),
    Literal(Literal),
}

impl Node {
    pub fn iri(iri: impl Into<String>) -> Self {
        Node::Iri(Iri::new(iri))
    }

    pub fn is_iri(&self) -> bool {
        matches!(self, Node::Iri(_))
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, Node::Blank(_))
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, Node::Literal(_))
    }

    pub fn as_iri(&self) -> Option<&Iri> {
        match self {
            Node::Iri(iri) => Some(iri),
            _ => None,
        }
    }

    pub fn as_blank(&self) -> Option<&Blank> {
        match self {
            Node::Blank(blank) => Some(blank),
            _ => None,
        }
    }

    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            Node::Literal(literal) => Some(literal),
            _ => None,
        }
    }

    /// Datatype label used in coercion messages
    pub fn datatype_label(&self) -> &str {
        match self {
            Node::Iri(_) => "IRI",
            Node::Blank(_) => "blank node",
            Node::Literal(literal) => literal.datatype.as_str(),
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Iri(iri) => iri.fmt(f),
            Node::Blank(blank) => blank.fmt(f),
            Node::Literal(literal) => literal.fmt(f),
        }
    }
}

impl From<Iri> for Node {
    fn from(iri: Iri) -> Self {
        Node::Iri(iri)
    }
}

impl From<Blank> for Node {
    fn from(blank: Blank) -> Self {
        Node::Blank(blank)
    }
}

impl From<Literal> for Node {
    fn from(literal: Literal) -> Self {
        Node::Literal(literal)
    }
}

impl FromStr for Node {
    type Err = WireError;

    /// Parse canonical text
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        text::parse_node(s)
    }
}

impl FromStr for Iri {
    type Err = WireError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match text::parse_node(s)? {
            Node::Iri(iri) => Ok(iri),
            other => Err(WireError::invalid_argument(format!("{} is not an IRI", other))),
        }
    }
}

impl FromStr for Blank {
    type Err = WireError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match text::parse_node(s)? {
            Node::Blank(blank) => Ok(blank),
            other => Err(WireError::invalid_argument(format!(
                "{} is not a blank node",
                other
            ))),
        }
    }
}

impl FromStr for Literal {
    type Err = WireError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match text::parse_node(s)? {
            Node::Literal(literal) => Ok(literal),
            other => Err(WireError::invalid_argument(format!(
                "{} is not a literal",
                other
            ))),
        }
    }
}
