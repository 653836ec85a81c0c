//! Wire parsers
//!
//! A response body is decoded according to its content type into a
//! [`Response`]: a boolean, or columns plus a lazy row sequence. The body is
//! read incrementally; with a spill threshold configured, whatever exceeds it
//! is drained to a temporary file in the background. Byte-source and format
//! failures surface as `MalformedWireData`, and every route out of a parse
//! (exhaustion, early close, failure) closes the response's cleanup once.

mod json;
mod ntriples;
mod rdf_json;
mod results;
mod term;

use crate::column::{Column, ColumnTyping, Nullability};
use crate::config::WireConfig;
use crate::error::{WireError, WireResult};
use crate::node::Node;
use crate::response::{Response, Row, Rows};
use crate::stream::{Cleanup, SpillOptions, SpillReader};
use ntriples::NTriplesRows;
use rdf_json::RdfJsonRows;
use bytes::Bytes;
use std::fmt;
use std::io::{BufReader, Cursor, Read};
use tracing::{debug, info, warn};

/// Supported response content types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WireFormat {
    /// `application/sparql-results+json`
    SparqlResults,
    /// `application/x-sparql-results-typed+json`
    TypedResults,
    /// `application/rdf+json`
    RdfJson,
    /// `application/n-triples`, `application/n-quads`, `text/plain`
    NTriples,
}

impl WireFormat {
    /// Select a format from a `Content-Type` header; parameters are ignored
    pub fn from_content_type(content_type: &str) -> WireResult<Self> {
        let mime: mime::Mime = content_type.trim().parse().map_err(|e| {
            WireError::malformed_with(format!("unsupported content type {:?}", content_type), e)
        })?;
        match mime.essence_str().to_ascii_lowercase().as_str() {
            "application/sparql-results+json" => Ok(WireFormat::SparqlResults),
            "application/x-sparql-results-typed+json" => Ok(WireFormat::TypedResults),
            "application/rdf+json" => Ok(WireFormat::RdfJson),
            "application/n-triples" | "application/n-quads" | "text/plain" => {
                Ok(WireFormat::NTriples)
            }
            other => Err(WireError::malformed(format!(
                "unsupported content type {:?}",
                other
            ))),
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            WireFormat::SparqlResults => "application/sparql-results+json",
            WireFormat::TypedResults => "application/x-sparql-results-typed+json",
            WireFormat::RdfJson => "application/rdf+json",
            WireFormat::NTriples => "application/n-triples",
        }
    }

    /// Whether responses of this format are tabular results rather than triples
    pub fn is_tabular(&self) -> bool {
        matches!(self, WireFormat::SparqlResults | WireFormat::TypedResults)
    }
}

impl fmt::Display for WireFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.content_type())
    }
}

/// Which statement positions a triple response reports, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TripleProjection {
    subject: bool,
    predicate: bool,
    object: bool,
}

impl TripleProjection {
    pub const ALL: TripleProjection = TripleProjection {
        subject: true,
        predicate: true,
        object: true,
    };

    pub const OBJECT_ONLY: TripleProjection = TripleProjection {
        subject: false,
        predicate: false,
        object: true,
    };

    const LABELS: [&'static str; 3] = ["subject", "predicate", "object"];

    /// At least one position must be kept
    pub fn new(subject: bool, predicate: bool, object: bool) -> WireResult<Self> {
        if !(subject || predicate || object) {
            return Err(WireError::invalid_argument(
                "a triple projection must keep at least one position",
            ));
        }
        Ok(Self {
            subject,
            predicate,
            object,
        })
    }

    fn keeps(&self) -> [bool; 3] {
        [self.subject, self.predicate, self.object]
    }

    /// Column labels of the kept positions
    pub fn labels(&self) -> Vec<&'static str> {
        Self::LABELS
            .iter()
            .zip(self.keeps())
            .filter(|(_, keep)| *keep)
            .map(|(label, _)| *label)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.keeps().iter().filter(|keep| **keep).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn project(&self, triple: [Node; 3]) -> Row {
        triple
            .into_iter()
            .zip(self.keeps())
            .filter(|(_, keep)| *keep)
            .map(|(node, _)| Some(node))
            .collect()
    }
}

impl Default for TripleProjection {
    fn default() -> Self {
        Self::ALL
    }
}

type Body = BufReader<Box<dyn Read + Send>>;

/// Decoder for response bodies
///
/// Holds the decoding configuration, the projection applied to triple
/// responses and an optional cleanup to run alongside the parser's own (for
/// example, releasing the transport connection).
#[derive(Debug, Clone, Default)]
pub struct ResponseParser {
    config: WireConfig,
    projection: TripleProjection,
    on_close: Cleanup,
}

impl ResponseParser {
    pub fn new(config: WireConfig) -> Self {
        Self {
            config,
            projection: TripleProjection::ALL,
            on_close: Cleanup::noop(),
        }
    }

    pub fn with_projection(mut self, projection: TripleProjection) -> Self {
        self.projection = projection;
        self
    }

    /// Run `cleanup` when the parsed response is done with
    pub fn with_cleanup(mut self, cleanup: Cleanup) -> Self {
        self.on_close = cleanup;
        self
    }

    pub fn config(&self) -> &WireConfig {
        &self.config
    }

    /// Decode `reader` according to its `Content-Type`
    pub fn parse<R>(&self, content_type: &str, reader: R) -> WireResult<Response>
    where
        R: Read + Send + 'static,
    {
        let format = match WireFormat::from_content_type(content_type) {
            Ok(format) => format,
            Err(e) => {
                self.on_close.close();
                return Err(e);
            }
        };
        self.parse_format(format, reader)
    }

    /// Decode `reader` as `format`
    pub fn parse_format<R>(&self, format: WireFormat, reader: R) -> WireResult<Response>
    where
        R: Read + Send + 'static,
    {
        info!("Decoding {} response", format);
        let (body, cleanup) = match self.open_body(reader) {
            Ok(opened) => opened,
            Err(e) => {
                self.on_close.close();
                warn!("Failed to open response body: {}", e);
                return Err(e);
            }
        };
        let parsed = match format {
            WireFormat::SparqlResults => {
                results::parse(body, false, self.config.column_typing, cleanup.clone())
            }
            WireFormat::TypedResults => {
                results::parse(body, true, self.config.column_typing, cleanup.clone())
            }
            WireFormat::RdfJson => RdfJsonRows::open(body, self.projection)
                .map(|rows| self.triples(rows, cleanup.clone())),
            WireFormat::NTriples => Ok(self.triples(
                NTriplesRows::new(body, self.projection),
                cleanup.clone(),
            )),
        };
        match parsed {
            Ok(response) => Ok(self.apply_limit(response)),
            Err(e) => {
                warn!("Failed to decode {} response: {}", format, e);
                cleanup.close();
                Err(e)
            }
        }
    }

    /// Buffer the body, spilling past the configured threshold
    fn open_body<R>(&self, reader: R) -> WireResult<(Body, Cleanup)>
    where
        R: Read + Send + 'static,
    {
        let buffer = self.config.drain_buffer_size.max(1);
        match SpillOptions::from_config(&self.config) {
            Some(options) => {
                let spill = SpillReader::open(reader, &options)?;
                let cleanup = self.on_close.chain(spill.abandon_handle());
                let body: Box<dyn Read + Send> = Box::new(spill);
                Ok((BufReader::with_capacity(buffer, body), cleanup))
            }
            None => {
                let body: Box<dyn Read + Send> = Box::new(reader);
                Ok((BufReader::with_capacity(buffer, body), self.on_close.clone()))
            }
        }
    }

    fn triples<I>(&self, source: I, cleanup: Cleanup) -> Response
    where
        I: Iterator<Item = WireResult<Row>> + Send + 'static,
    {
        let typing = self.config.column_typing;
        let mut rows = Rows::new(source, cleanup);
        let labels = self.projection.labels();
        let sample = match typing {
            ColumnTyping::Detected => rows.peek().ok().flatten(),
            _ => None,
        };
        let columns: Vec<Column> = labels
            .iter()
            .enumerate()
            .map(|(i, label)| {
                let value = sample.and_then(|row| row.get(i)).and_then(Option::as_ref);
                Column::detect(label, value, None, Nullability::NoNulls, typing)
            })
            .collect();
        debug!("Triple response with columns {:?}", labels);
        Response::from_rows(columns, rows)
    }

    fn apply_limit(&self, mut response: Response) -> Response {
        if let Some(max) = self.config.max_rows {
            debug!("Capping rows at {}", max);
            response.limit_rows(max);
        }
        response
    }
}

/// Decode a response body with `config`
pub fn parse_response<R>(content_type: &str, reader: R, config: &WireConfig) -> WireResult<Response>
where
    R: Read + Send + 'static,
{
    ResponseParser::new(config.clone()).parse(content_type, reader)
}

/// Decode a body already held in memory
pub fn parse_bytes(
    content_type: &str,
    body: impl Into<Bytes>,
    config: &WireConfig,
) -> WireResult<Response> {
    let body: Bytes = body.into();
    parse_response(content_type, Cursor::new(body), config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_dispatch() {
        assert_eq!(
            WireFormat::from_content_type("application/sparql-results+json; charset=utf-8").unwrap(),
            WireFormat::SparqlResults
        );
        assert_eq!(
            WireFormat::from_content_type("text/plain").unwrap(),
            WireFormat::NTriples
        );
        assert_eq!(
            WireFormat::from_content_type("Application/RDF+JSON").unwrap(),
            WireFormat::RdfJson
        );
        assert!(WireFormat::from_content_type("text/html").unwrap_err().is_malformed());
        assert!(WireFormat::from_content_type("not a mime").unwrap_err().is_malformed());
        assert!(WireFormat::TypedResults.is_tabular());
        assert!(!WireFormat::NTriples.is_tabular());
    }

    #[test]
    fn test_projection() {
        assert_eq!(TripleProjection::ALL.labels(), vec!["subject", "predicate", "object"]);
        assert_eq!(TripleProjection::OBJECT_ONLY.labels(), vec!["object"]);
        let sp = TripleProjection::new(true, true, false).unwrap();
        assert_eq!(sp.len(), 2);
        assert!(TripleProjection::new(false, false, false).unwrap_err().is_invalid_argument());
        let row = sp.project([Node::iri("s"), Node::iri("p"), Node::iri("o")]);
        assert_eq!(row, vec![Some(Node::iri("s")), Some(Node::iri("p"))]);
    }

    #[test]
    fn test_unsupported_type_runs_cleanup() {
        let cleanup = Cleanup::new(|| {});
        let parser = ResponseParser::default().with_cleanup(cleanup.clone());
        assert!(parser.parse("text/csv", std::io::empty()).is_err());
        assert!(cleanup.is_closed());
    }

    #[test]
    fn test_max_rows_caps_triples() {
        let config = WireConfig::default().with_max_rows(Some(1));
        let body = "<http://example.org/a> <http://example.org/p> \"1\" .\n\
                    <http://example.org/a> <http://example.org/p> \"2\" .\n";
        let mut response = parse_bytes("application/n-triples", body, &config).unwrap();
        let rows: Vec<Row> = response
            .rows()
            .unwrap()
            .collect::<WireResult<_>>()
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert!(response.cleanup().is_closed());
    }
}
