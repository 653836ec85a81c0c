//! Conversions to and from oxrdf terms

use super::{Blank, Iri, Literal, Node};
use crate::error::{WireError, WireResult};
use crate::vocab::xsd;
use oxrdf::{
    BlankNode as OxBlankNode, Literal as OxLiteral, NamedNode as OxNamedNode, Term as OxTerm,
};

impl From<Iri> for OxNamedNode {
    fn from(iri: Iri) -> Self {
        OxNamedNode::new_unchecked(iri.into_string())
    }
}

impl From<Blank> for OxBlankNode {
    fn from(blank: Blank) -> Self {
        OxBlankNode::new_unchecked(blank.0)
    }
}

impl From<Literal> for OxLiteral {
    fn from(literal: Literal) -> Self {
        match literal.language {
            Some(lang) => OxLiteral::new_language_tagged_literal_unchecked(literal.lexical, lang),
            None if literal.datatype == xsd::STRING => OxLiteral::new_simple_literal(literal.lexical),
            None => OxLiteral::new_typed_literal(literal.lexical, OxNamedNode::from(literal.datatype)),
        }
    }
}

impl From<Node> for OxTerm {
    fn from(node: Node) -> Self {
        match node {
            Node::Iri(iri) => OxTerm::NamedNode(iri.into()),
            Node::Blank(blank) => OxTerm::BlankNode(blank.into()),
            Node::Literal(literal) => OxTerm::Literal(literal.into()),
        }
    }
}

impl From<OxNamedNode> for Iri {
    fn from(node: OxNamedNode) -> Self {
        Iri::new(node.into_string())
    }
}

impl TryFrom<OxBlankNode> for Blank {
    type Error = WireError;

    fn try_from(node: OxBlankNode) -> WireResult<Self> {
        Blank::new(node.into_string())
    }
}

impl TryFrom<OxLiteral> for Literal {
    type Error = WireError;

    fn try_from(literal: OxLiteral) -> WireResult<Self> {
        let language = literal.language().map(str::to_string);
        let datatype = literal.datatype().as_str().to_string();
        Literal::with_language(literal.value(), datatype, language.as_deref())
    }
}

impl TryFrom<OxTerm> for Node {
    type Error = WireError;

    fn try_from(term: OxTerm) -> WireResult<Self> {
        #[allow(unreachable_patterns)]
        match term {
            OxTerm::NamedNode(node) => Ok(Node::Iri(node.into())),
            OxTerm::BlankNode(node) => Ok(Node::Blank(node.try_into()?)),
            OxTerm::Literal(literal) => Ok(Node::Literal(literal.try_into()?)),
            _ => Err(WireError::unsupported("quoted triples have no node form")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_term_round_trip() {
        let nodes = vec![
            Node::iri("http://example.org/about"),
            Node::Blank(Blank::new("b0").unwrap()),
            Node::Literal(Literal::string("plain")),
            Node::Literal(Literal::lang_string("Anna's Homepage", "en").unwrap()),
            Node::Literal(Literal::new("7", xsd::INT)),
        ];
        for node in nodes {
            let term: OxTerm = node.clone().into();
            assert_eq!(Node::try_from(term).unwrap(), node);
        }
    }

    #[test]
    fn test_oxrdf_lang_string_normalized() {
        let literal = OxLiteral::new_language_tagged_literal("hallo", "de").unwrap();
        let ours = Literal::try_from(literal).unwrap();
        assert_eq!(ours.datatype().as_str(), xsd::STRING);
        assert_eq!(ours.language(), Some("de"));
    }
}
