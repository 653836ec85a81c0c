//! RDF/JSON triples: `{ subject: { predicate: [ object, ... ] } }`
//!
//! A document is one such object or an array of them, one per graph. Each
//! subject's predicate map is read whole and queued as triples; subjects are
//! pulled one at a time in document order.

use super::json::JsonPull;
use super::term::{BlankLabels, JsonTerm};
use super::TripleProjection;
use crate::error::{WireError, WireResult};
use crate::node::{Iri, Node};
use crate::response::Row;
use indexmap::IndexMap;
use std::collections::VecDeque;
use std::io::BufRead;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    /// Inside a graph object
    Graph,
    /// Between graph objects of a top-level array
    Graphs,
    Done,
}

pub(crate) struct RdfJsonRows<R> {
    pull: JsonPull<R>,
    stage: Stage,
    in_array: bool,
    first: bool,
    first_graph: bool,
    pending: VecDeque<[Node; 3]>,
    blanks: BlankLabels,
    projection: TripleProjection,
}

impl<R: BufRead> RdfJsonRows<R> {
    /// Read up to the first subject
    pub fn open(reader: R, projection: TripleProjection) -> WireResult<Self> {
        let mut pull = JsonPull::new(reader);
        let (stage, in_array) = match pull.peek()? {
            Some(b'{') => {
                pull.expect(b'{')?;
                (Stage::Graph, false)
            }
            Some(b'[') => {
                pull.expect(b'[')?;
                (Stage::Graphs, true)
            }
            Some(_) => return Err(WireError::malformed("RDF/JSON must be an object or an array")),
            None => return Err(WireError::malformed("empty RDF/JSON document")),
        };
        Ok(Self {
            pull,
            stage,
            in_array,
            first: true,
            first_graph: true,
            pending: VecDeque::new(),
            blanks: BlankLabels::scoped(),
            projection,
        })
    }

    fn advance(&mut self) -> WireResult<Option<Row>> {
        loop {
            if let Some(triple) = self.pending.pop_front() {
                return Ok(Some(self.projection.project(triple)));
            }
            match self.stage {
                Stage::Graph => match self.pull.next_member(&mut self.first)? {
                    Some(subject) => self.read_subject(&subject)?,
                    None if self.in_array => self.stage = Stage::Graphs,
                    None => {
                        self.pull.expect_end()?;
                        self.stage = Stage::Done;
                    }
                },
                Stage::Graphs => {
                    if self.pull.next_element(&mut self.first_graph)? {
                        self.pull.expect(b'{')?;
                        self.first = true;
                        self.stage = Stage::Graph;
                    } else {
                        self.pull.expect_end()?;
                        self.stage = Stage::Done;
                    }
                }
                Stage::Done => return Ok(None),
            }
        }
    }

    fn read_subject(&mut self, subject: &str) -> WireResult<()> {
        let subject = if subject.starts_with("_:") {
            Node::Blank(self.blanks.resolve(subject)?)
        } else {
            Node::Iri(Iri::new(subject))
        };
        let predicates: IndexMap<String, Vec<JsonTerm>> = self.pull.read_value()?;
        for (predicate, objects) in predicates {
            let predicate = Node::Iri(Iri::new(predicate));
            for object in objects {
                let object = object.into_node(&mut self.blanks)?;
                self.pending
                    .push_back([subject.clone(), predicate.clone(), object]);
            }
        }
        Ok(())
    }
}

impl<R: BufRead> Iterator for RdfJsonRows<R> {
    type Item = WireResult<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.stage == Stage::Done && self.pending.is_empty() {
            return None;
        }
        match self.advance() {
            Ok(row) => row.map(Ok),
            Err(e) => {
                self.stage = Stage::Done;
                self.pending.clear();
                Some(Err(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn rows(json: &str) -> Vec<WireResult<Row>> {
        RdfJsonRows::open(Cursor::new(json.as_bytes().to_vec()), TripleProjection::ALL)
            .unwrap()
            .collect()
    }

    #[test]
    fn test_document_order_is_kept() {
        let rows = rows(
            r#"{
              "http://example.org/b": {"http://example.org/p": [{"type":"literal","value":"1"}, {"type":"literal","value":"2"}]},
              "http://example.org/a": {"http://example.org/q": [{"type":"uri","value":"http://example.org/c"}]}
            }"#,
        );
        let objects: Vec<String> = rows
            .into_iter()
            .map(|row| row.unwrap()[2].as_ref().unwrap().to_string())
            .collect();
        assert_eq!(objects, vec!["\"1\"", "\"2\"", "<http://example.org/c>"]);
    }

    #[test]
    fn test_graph_array() {
        let rows = rows(
            r#"[
              {"_:x": {"http://example.org/p": [{"type":"bnode","value":"_:y"}]}},
              {},
              {"_:y": {"http://example.org/p": [{"type":"bnode","value":"_:x"}]}}
            ]"#,
        );
        assert_eq!(rows.len(), 2);
        let first = rows[0].as_ref().unwrap();
        let second = rows[1].as_ref().unwrap();
        assert_eq!(first[0], second[2]);
        assert_eq!(first[2], second[0]);
        assert!(first[0].as_ref().unwrap().is_blank());
    }

    #[test]
    fn test_bad_documents() {
        assert!(RdfJsonRows::open(Cursor::new(b"\"s\"".to_vec()), TripleProjection::ALL).is_err());
        let missing_value =
            rows(r#"{"http://example.org/s": {"http://example.org/p": [{"type":"uri"}]}}"#);
        assert_eq!(missing_value.len(), 1);
        assert!(missing_value[0].as_ref().unwrap_err().is_malformed());

        let trailing = rows(r#"{"http://example.org/s": {}} trailing"#);
        assert!(trailing.last().unwrap().is_err());
    }
}
