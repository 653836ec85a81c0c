//! JSON term objects shared by the results and RDF/JSON formats

use crate::error::{WireError, WireResult};
use crate::node::{Blank, Iri, Literal, Node};
use crate::vocab::xsd;
use serde::Deserialize;
use std::collections::HashMap;

/// `{ "type", "value", "xml:lang" | "lang", "datatype" }`
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct JsonTerm {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: String,
    #[serde(rename = "xml:lang", alias = "lang", default)]
    pub lang: Option<String>,
    #[serde(default)]
    pub datatype: Option<String>,
}

impl JsonTerm {
    pub fn into_node(self, blanks: &mut BlankLabels) -> WireResult<Node> {
        match self.kind.as_str() {
            "uri" => Ok(Node::Iri(Iri::new(self.value))),
            "bnode" => Ok(Node::Blank(blanks.resolve(&self.value)?)),
            "literal" | "typed-literal" => {
                literal(self.value, self.datatype.as_deref(), self.lang.as_deref())
            }
            other => Err(WireError::malformed(format!(
                "unknown term type {:?}",
                other
            ))),
        }
    }
}

/// Literal from wire parts; construction failures are wire errors here
pub(crate) fn literal(
    lexical: String,
    datatype: Option<&str>,
    language: Option<&str>,
) -> WireResult<Node> {
    Literal::with_language(lexical, datatype.unwrap_or(xsd::STRING), language)
        .map(Node::Literal)
        .map_err(|e| WireError::malformed_with("invalid literal", e))
}

/// How wire blank labels become [`Blank`] values
pub(crate) enum BlankLabels {
    /// Keep the label as sent
    Preserve,
    /// One fresh blank per distinct label, for the life of a parse
    Scoped(HashMap<String, Blank>),
}

impl BlankLabels {
    pub fn scoped() -> Self {
        BlankLabels::Scoped(HashMap::new())
    }

    pub fn resolve(&mut self, label: &str) -> WireResult<Blank> {
        let label = label.strip_prefix("_:").unwrap_or(label);
        match self {
            BlankLabels::Preserve => Blank::new(label)
                .map_err(|e| WireError::malformed_with("invalid blank node label", e)),
            BlankLabels::Scoped(seen) => {
                if let Some(blank) = seen.get(label) {
                    return Ok(blank.clone());
                }
                let blank = Blank::fresh();
                seen.insert(label.to_string(), blank.clone());
                Ok(blank)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn term(json: &str) -> JsonTerm {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_term_kinds() {
        let mut blanks = BlankLabels::Preserve;
        assert_eq!(
            term(r#"{"type":"uri","value":"http://example.org/a"}"#)
                .into_node(&mut blanks)
                .unwrap(),
            Node::iri("http://example.org/a")
        );
        assert_eq!(
            term(r#"{"type":"bnode","value":"b0"}"#).into_node(&mut blanks).unwrap(),
            Node::Blank(Blank::new("b0").unwrap())
        );
        let tagged = term(r#"{"type":"literal","value":"chat","xml:lang":"fr"}"#)
            .into_node(&mut blanks)
            .unwrap();
        assert_eq!(tagged.as_literal().and_then(Literal::language), Some("fr"));
        let typed = term(
            r#"{"type":"typed-literal","value":"1","datatype":"http://www.w3.org/2001/XMLSchema#int"}"#,
        )
        .into_node(&mut blanks)
        .unwrap();
        assert_eq!(typed.to_string(), "\"1\"^^<http://www.w3.org/2001/XMLSchema#int>");
    }

    #[test]
    fn test_rdf_json_lang_key() {
        let node = term(r#"{"type":"literal","value":"hi","lang":"en"}"#)
            .into_node(&mut BlankLabels::Preserve)
            .unwrap();
        assert_eq!(node.to_string(), "\"hi\"@en");
    }

    #[test]
    fn test_bad_terms_are_malformed() {
        let mut blanks = BlankLabels::Preserve;
        assert!(term(r#"{"type":"triple","value":"x"}"#)
            .into_node(&mut blanks)
            .unwrap_err()
            .is_malformed());
        assert!(term(r#"{"type":"literal","value":"1","xml:lang":"en","datatype":"http://www.w3.org/2001/XMLSchema#int"}"#)
            .into_node(&mut blanks)
            .unwrap_err()
            .is_malformed());
        assert!(term(r#"{"type":"bnode","value":"not a label"}"#)
            .into_node(&mut blanks)
            .is_err());
    }

    #[test]
    fn test_scoped_labels_are_stable() {
        let mut blanks = BlankLabels::scoped();
        let a = blanks.resolve("_:b0").unwrap();
        let b = blanks.resolve("b0").unwrap();
        let c = blanks.resolve("_:b1").unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a.label(), "b0");
    }
}
