//! nodewire
//!
//! Graph values on the wire: a typed RDF node model, value coercion between
//! nodes and host types, a datatype-to-SQL-type map for relational adapters,
//! and streaming decoders for SPARQL result payloads.
//!
//! # Components
//!
//! - `node`: IRI, blank node and literal values with canonical N-Triples text
//! - `literal`: literal constructors for host values
//! - `coerce`: node ⇄ host value conversion with narrowing checks
//! - `types` / `column`: SQL type codes and column descriptors
//! - `parser`: SPARQL JSON results, RDF/JSON and N-Triples decoders
//! - `stream`: lookahead, bounded iteration, spill-to-disk bodies, cleanup handles
//!
//! ## Example Usage
//!
//! ```rust
//! use nodewire::{coerce, parse_bytes, WireConfig};
//!
//! let body = r#"{"head":{"vars":["n"]},"results":{"bindings":[
//!     {"n":{"type":"literal","value":"42","datatype":"http://www.w3.org/2001/XMLSchema#int"}}
//! ]}}"#;
//! let mut response = parse_bytes("application/sparql-results+json", body, &WireConfig::default())?;
//! let rows = response.rows().unwrap();
//! let row = rows.next().unwrap()?;
//! assert_eq!(coerce::to_i32(row[0].as_ref(), 0)?, 42);
//! # Ok::<(), nodewire::WireError>(())
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]

pub mod coerce;
pub mod column;
pub mod config;
pub mod error;
pub mod literal;
pub mod node;
pub mod parser;
pub mod response;
pub mod stream;
pub mod types;
pub mod vocab;

// Re-export main types for convenience
pub use coerce::{from_node, to_node, to_node_as, HostType, HostValue};

pub use column::{Column, ColumnTyping, Nullability};

pub use config::{ConfigError, ConfigResult, WireConfig};

pub use error::{WireError, WireResult};

pub use node::{Blank, Iri, Literal, Node};

pub use parser::{parse_bytes, parse_response, ResponseParser, TripleProjection, WireFormat};

pub use response::{Response, Row, Rows};

pub use stream::{Bounded, Cleanup, Lookahead, SpillOptions, SpillReader};

pub use types::{column_type_for, datatype_for, ColumnType, SqlType};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get version string
pub fn version() -> &'static str {
    VERSION
}
