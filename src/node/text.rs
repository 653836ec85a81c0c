//! Canonical text parser
//!
//! Accepts exactly one term in the grammar produced by `Display`:
//! `<iri>`, `_:label`, `"lexical"`, `"lexical"@lang` or `"lexical"^^<datatype>`.

use super::{is_label_char, is_label_start, unescape, Blank, Iri, Literal, Node};
use crate::error::{WireError, WireResult};

pub(super) fn parse_node(text: &str) -> WireResult<Node> {
    let mut cursor = Cursor { text, pos: 0 };
    let node = cursor.term()?;
    if cursor.pos != text.len() {
        return Err(cursor.error("trailing characters"));
    }
    Ok(node)
}

struct Cursor<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn rest(&self) -> &'a str {
        &self.text[self.pos..]
    }

    fn error(&self, what: &str) -> WireError {
        WireError::invalid_argument(format!(
            "{} at offset {} in {:?}",
            what, self.pos, self.text
        ))
    }

    fn eat(&mut self, prefix: &str) -> bool {
        if self.rest().starts_with(prefix) {
            self.pos += prefix.len();
            true
        } else {
            false
        }
    }

    fn term(&mut self) -> WireResult<Node> {
        if self.rest().starts_with('<') {
            self.iri().map(Node::Iri)
        } else if self.rest().starts_with("_:") {
            self.blank().map(Node::Blank)
        } else if self.rest().starts_with('"') {
            self.literal().map(Node::Literal)
        } else {
            Err(self.error("expected '<', '_:' or '\"'"))
        }
    }

    fn iri(&mut self) -> WireResult<Iri> {
        self.eat("<");
        let end = self
            .rest()
            .find('>')
            .ok_or_else(|| self.error("unterminated IRI"))?;
        let raw = &self.rest()[..end];
        let iri = unescape(raw).map_err(|e| self.error(&e))?.into_owned();
        self.pos += end + 1;
        Ok(Iri::new(iri))
    }

    fn blank(&mut self) -> WireResult<Blank> {
        self.eat("_:");
        let rest = self.rest();
        let mut end = 0;
        for (i, c) in rest.char_indices() {
            let ok = if i == 0 { is_label_start(c) } else { is_label_char(c) };
            if !ok {
                break;
            }
            end = i + c.len_utf8();
        }
        // A statement terminator is not part of the label
        while rest[..end].ends_with('.') {
            end -= 1;
        }
        let blank = Blank::new(&rest[..end])?;
        self.pos += end;
        Ok(blank)
    }

    fn literal(&mut self) -> WireResult<Literal> {
        self.eat("\"");
        let rest = self.rest();
        let mut end = None;
        let mut escaped = false;
        for (i, c) in rest.char_indices() {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => {
                    end = Some(i);
                    break;
                }
                _ => {}
            }
        }
        let end = end.ok_or_else(|| self.error("unterminated literal"))?;
        let lexical = unescape(&rest[..end])
            .map_err(|e| self.error(&e))?
            .into_owned();
        self.pos += end + 1;

        if self.eat("@") {
            let tag_len = self
                .rest()
                .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-'))
                .unwrap_or(self.rest().len());
            let tag = &self.rest()[..tag_len];
            let literal = Literal::lang_string(lexical, tag)?;
            self.pos += tag_len;
            Ok(literal)
        } else if self.eat("^^") {
            if !self.rest().starts_with('<') {
                return Err(self.error("expected datatype IRI"));
            }
            let datatype = self.iri()?;
            Ok(Literal::new(lexical, datatype))
        } else {
            Ok(Literal::string(lexical))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocab::xsd;

    #[test]
    fn test_parse_each_form() {
        assert_eq!(parse_node("<http://ex/a>").unwrap(), Node::iri("http://ex/a"));
        assert_eq!(
            parse_node("_:b1").unwrap(),
            Node::Blank(Blank::new("b1").unwrap())
        );
        assert_eq!(
            parse_node("\"x\"").unwrap(),
            Node::Literal(Literal::string("x"))
        );
        assert_eq!(
            parse_node("\"chat\"@fr").unwrap(),
            Node::Literal(Literal::lang_string("chat", "fr").unwrap())
        );
        assert_eq!(
            parse_node("\"1\"^^<http://www.w3.org/2001/XMLSchema#int>").unwrap(),
            Node::Literal(Literal::new("1", xsd::INT))
        );
    }

    #[test]
    fn test_short_escapes_accepted() {
        let node = parse_node("\"a\\nb\\\"c\"").unwrap();
        assert_eq!(node.as_literal().unwrap().lexical(), "a\nb\"c");
    }

    #[test]
    fn test_render_parse_render_is_stable() {
        let nodes = vec![
            Node::iri("http://ex/with space/ü"),
            Node::Blank(Blank::new("x.y").unwrap()),
            Node::Literal(Literal::string("tab\t\"quote\" \\ end")),
            Node::Literal(Literal::lang_string("Grüße", "de-AT").unwrap()),
            Node::Literal(Literal::new("2024-01-01", xsd::DATE)),
        ];
        for node in nodes {
            let text = node.to_string();
            let reparsed = parse_node(&text).unwrap();
            assert_eq!(reparsed, node);
            assert_eq!(reparsed.to_string(), text);
        }
    }

    #[test]
    fn test_rejects_garbage() {
        for text in ["", "plain", "<open", "\"open", "_:", "\"x\"^^int", "<a> extra", "\"x\"@"] {
            assert!(parse_node(text).unwrap_err().is_invalid_argument(), "{}", text);
        }
    }
}
