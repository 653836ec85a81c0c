//! N-Triples and N-Quads statements, one row per statement
//!
//! Statements are parsed with `rio_turtle` one step at a time; graph names
//! are read and dropped.

use super::term::BlankLabels;
use super::TripleProjection;
use crate::error::{WireError, WireResult};
use crate::node::{Iri, Literal, Node};
use crate::response::Row;
use crate::vocab::xsd;
use rio_api::model::{Quad, Subject, Term};
use rio_api::parser::QuadsParser;
use rio_turtle::{NQuadsParser, TurtleError};
use std::collections::VecDeque;
use std::io::BufRead;

impl From<TurtleError> for WireError {
    fn from(err: TurtleError) -> Self {
        WireError::malformed_with("invalid N-Triples statement", err)
    }
}

pub(crate) struct NTriplesRows<R: BufRead> {
    parser: NQuadsParser<R>,
    pending: VecDeque<[Node; 3]>,
    blanks: BlankLabels,
    projection: TripleProjection,
    done: bool,
}

impl<R: BufRead> NTriplesRows<R> {
    pub fn new(reader: R, projection: TripleProjection) -> Self {
        Self {
            parser: NQuadsParser::new(reader),
            pending: VecDeque::new(),
            blanks: BlankLabels::scoped(),
            projection,
            done: false,
        }
    }

    fn advance(&mut self) -> WireResult<Option<Row>> {
        while self.pending.is_empty() {
            if self.parser.is_end() {
                return Ok(None);
            }
            let Self {
                parser,
                pending,
                blanks,
                ..
            } = self;
            parser.parse_step(&mut |quad: Quad<'_>| -> WireResult<()> {
                pending.push_back(statement(quad, blanks)?);
                Ok(())
            })?;
        }
        Ok(self
            .pending
            .pop_front()
            .map(|triple| self.projection.project(triple)))
    }
}

fn statement(quad: Quad<'_>, blanks: &mut BlankLabels) -> WireResult<[Node; 3]> {
    let subject = match quad.subject {
        Subject::NamedNode(n) => Node::Iri(Iri::new(n.iri)),
        Subject::BlankNode(b) => Node::Blank(blanks.resolve(b.id)?),
        _ => return Err(WireError::malformed("unsupported subject type")),
    };
    let predicate = Node::Iri(Iri::new(quad.predicate.iri));
    let object = match quad.object {
        Term::NamedNode(n) => Node::Iri(Iri::new(n.iri)),
        Term::BlankNode(b) => Node::Blank(blanks.resolve(b.id)?),
        Term::Literal(rio_api::model::Literal::Simple { value }) => {
            Node::Literal(Literal::string(value))
        }
        Term::Literal(rio_api::model::Literal::LanguageTaggedString { value, language }) => {
            Literal::with_language(value, xsd::STRING, Some(language))
                .map(Node::Literal)
                .map_err(|e| WireError::malformed_with("invalid literal", e))?
        }
        Term::Literal(rio_api::model::Literal::Typed { value, datatype }) => {
            Node::Literal(Literal::new(value, datatype.iri))
        }
        _ => return Err(WireError::malformed("unsupported object type")),
    };
    Ok([subject, predicate, object])
}

impl<R: BufRead> Iterator for NTriplesRows<R> {
    type Item = WireResult<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.advance() {
            Ok(Some(row)) => Some(Ok(row)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn rows(text: &str, projection: TripleProjection) -> Vec<WireResult<Row>> {
        NTriplesRows::new(Cursor::new(text.as_bytes().to_vec()), projection).collect()
    }

    #[test]
    fn test_statements_and_literals() {
        let rows = rows(
            "# comment\n\
             <http://example.org/a> <http://example.org/p> \"x\\ty\" .\n\
             <http://example.org/a> <http://example.org/p> \"5\"^^<http://www.w3.org/2001/XMLSchema#int> <http://example.org/g> .\n",
            TripleProjection::ALL,
        );
        assert_eq!(rows.len(), 2);
        let first = rows[0].as_ref().unwrap();
        assert_eq!(first[0], Some(Node::iri("http://example.org/a")));
        assert_eq!(first[2], Some(Node::Literal(Literal::string("x\ty"))));
        let second = rows[1].as_ref().unwrap();
        assert_eq!(
            second[2],
            Some(Node::Literal(Literal::new("5", xsd::INT)))
        );
    }

    #[test]
    fn test_blank_scope() {
        let rows = rows(
            "_:a <http://example.org/p> _:b .\n_:b <http://example.org/p> _:a .\n",
            TripleProjection::ALL,
        );
        let first = rows[0].as_ref().unwrap();
        let second = rows[1].as_ref().unwrap();
        assert_eq!(first[0], second[2]);
        assert_eq!(first[2], second[0]);
        assert_ne!(first[0], first[2]);
    }

    #[test]
    fn test_projection_and_errors() {
        let rows = rows(
            "<http://example.org/a> <http://example.org/p> <http://example.org/b> .\nnot a statement\n",
            TripleProjection::OBJECT_ONLY,
        );
        assert_eq!(rows.len(), 2);
        assert_eq!(
            rows[0].as_ref().unwrap(),
            &vec![Some(Node::iri("http://example.org/b"))]
        );
        assert!(rows[1].as_ref().unwrap_err().is_malformed());
    }
}
