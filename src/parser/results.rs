//! Tabular results: `application/sparql-results+json` and the typed variant
//!
//! The document skeleton is walked with [`JsonPull`]; `head` is read whole,
//! then rows are pulled one binding (or one cell array) at a time. After the
//! last row the rest of the document is still checked, so a trailing
//! `boolean` member fails the sequence with `ProtocolCombination`.

use super::json::JsonPull;
use super::term::{literal, BlankLabels, JsonTerm};
use crate::column::{Column, ColumnTyping, Nullability};
use crate::error::{WireError, WireResult};
use crate::node::{Iri, Node};
use crate::response::{Response, Row, Rows};
use crate::stream::Cleanup;
use serde::Deserialize;
use std::collections::HashMap;
use std::io::BufRead;
use tracing::debug;

#[derive(Debug, Default, Deserialize)]
struct Head {
    #[serde(default)]
    vars: Vec<String>,
    #[serde(default)]
    columns: Option<Vec<ColumnDecl>>,
}

/// One declared column of the typed variant
#[derive(Debug, Clone, Deserialize)]
struct ColumnDecl {
    name: String,
    #[serde(default)]
    datatype: Option<String>,
    #[serde(default)]
    kind: Option<String>,
    #[serde(default)]
    format: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Cell {
    Lexical(String),
    Term(JsonTerm),
}

#[derive(Clone)]
enum Layout {
    Bindings(Vec<String>),
    Cells(Vec<ColumnDecl>),
}

impl Layout {
    fn from_head(head: Head, typed: bool) -> WireResult<Self> {
        match (typed, head.columns) {
            (true, Some(columns)) => Ok(Layout::Cells(columns)),
            (true, None) => Err(WireError::malformed("typed results without head.columns")),
            (false, _) => Ok(Layout::Bindings(head.vars)),
        }
    }

    fn len(&self) -> usize {
        match self {
            Layout::Bindings(vars) => vars.len(),
            Layout::Cells(decls) => decls.len(),
        }
    }

    fn array_member(&self) -> &'static str {
        match self {
            Layout::Bindings(_) => "bindings",
            Layout::Cells(_) => "rows",
        }
    }

    fn columns(&self, sample: Option<&Row>, typing: ColumnTyping) -> Vec<Column> {
        let value = |i: usize| sample.and_then(|row| row.get(i)).and_then(Option::as_ref);
        match self {
            Layout::Bindings(vars) => vars
                .iter()
                .enumerate()
                .map(|(i, name)| Column::detect(name, value(i), None, Nullability::Nullable, typing))
                .collect(),
            Layout::Cells(decls) => decls
                .iter()
                .enumerate()
                .map(|(i, decl)| {
                    Column::detect(
                        &decl.name,
                        value(i),
                        decl.datatype.as_deref(),
                        Nullability::Nullable,
                        typing,
                    )
                })
                .collect(),
        }
    }
}

/// Decode a tabular results document
pub(crate) fn parse<R>(
    reader: R,
    typed: bool,
    typing: ColumnTyping,
    cleanup: Cleanup,
) -> WireResult<Response>
where
    R: BufRead + Send + 'static,
{
    let mut pull = JsonPull::new(reader);
    pull.expect(b'{')?;
    let mut first = true;
    let mut head: Option<Head> = None;
    let mut boolean: Option<bool> = None;

    while let Some(member) = pull.next_member(&mut first)? {
        match member.as_str() {
            "head" => head = Some(pull.read_value()?),
            "boolean" => boolean = Some(pull.read_bool()?),
            "results" if boolean.is_some() => {
                return Err(WireError::protocol("both boolean and results present"));
            }
            "results" => {
                let head = head
                    .take()
                    .ok_or_else(|| WireError::malformed("results before head"))?;
                let layout = Layout::from_head(head, typed)?;
                debug!("Results header parsed: {} columns", layout.len());
                let streaming = open_rows(pull, layout)?;
                return Ok(tabular(streaming, typing, cleanup));
            }
            _ => pull.skip_value()?,
        }
    }
    pull.expect_end()?;

    match boolean {
        Some(value) => {
            debug!("Boolean result: {}", value);
            Ok(Response::from_boolean(value, cleanup))
        }
        None => Err(WireError::protocol("neither boolean nor results present")),
    }
}

fn tabular<R>(streaming: ResultRows<R>, typing: ColumnTyping, cleanup: Cleanup) -> Response
where
    R: BufRead + Send + 'static,
{
    let layout = streaming.layout.clone();
    let mut rows = Rows::new(streaming, cleanup);
    let columns = if typing == ColumnTyping::Detected {
        match rows.peek() {
            Ok(sample) => layout.columns(sample, typing),
            Err(_) => layout.columns(None, typing),
        }
    } else {
        layout.columns(None, typing)
    };
    Response::from_rows(columns, rows)
}

/// Enter `results` and stop at the first row; a results object with no
/// row array yields an empty sequence
fn open_rows<R: BufRead>(mut pull: JsonPull<R>, layout: Layout) -> WireResult<ResultRows<R>> {
    pull.expect(b'{')?;
    let mut first = true;
    let mut in_array = false;
    while let Some(member) = pull.next_member(&mut first)? {
        if member == layout.array_member() {
            pull.expect(b'[')?;
            in_array = true;
            break;
        }
        pull.skip_value()?;
    }
    Ok(ResultRows {
        pull,
        layout,
        in_array,
        in_results: in_array,
        first_row: true,
        blanks: BlankLabels::Preserve,
        done: false,
    })
}

struct ResultRows<R> {
    pull: JsonPull<R>,
    layout: Layout,
    in_array: bool,
    in_results: bool,
    first_row: bool,
    blanks: BlankLabels,
    done: bool,
}

impl<R: BufRead> ResultRows<R> {
    fn advance(&mut self) -> WireResult<Option<Row>> {
        if self.in_array {
            if self.pull.next_element(&mut self.first_row)? {
                return self.read_row().map(Some);
            }
            self.in_array = false;
        }
        self.finish_document()?;
        Ok(None)
    }

    fn read_row(&mut self) -> WireResult<Row> {
        match &self.layout {
            Layout::Bindings(vars) => {
                let mut binding: HashMap<String, JsonTerm> = self.pull.read_value()?;
                vars.iter()
                    .map(|var| {
                        binding
                            .remove(var)
                            .map(|term| term.into_node(&mut self.blanks))
                            .transpose()
                    })
                    .collect()
            }
            Layout::Cells(decls) => {
                let cells: Vec<Option<Cell>> = self.pull.read_value()?;
                if cells.len() > decls.len() {
                    return Err(WireError::malformed(format!(
                        "row has {} cells for {} columns",
                        cells.len(),
                        decls.len()
                    )));
                }
                let mut cells = cells.into_iter();
                decls
                    .iter()
                    .map(|decl| match cells.next().flatten() {
                        None => Ok(None),
                        Some(Cell::Term(term)) => term.into_node(&mut self.blanks).map(Some),
                        Some(Cell::Lexical(text)) => cell_node(decl, text, &mut self.blanks).map(Some),
                    })
                    .collect()
            }
        }
    }

    /// Close `results` and the document, rejecting a late `boolean`
    fn finish_document(&mut self) -> WireResult<()> {
        if self.in_results {
            let mut first = false;
            while self.pull.next_member(&mut first)?.is_some() {
                self.pull.skip_value()?;
            }
            self.in_results = false;
        }
        let mut first = false;
        while let Some(member) = self.pull.next_member(&mut first)? {
            if member == "boolean" {
                return Err(WireError::protocol("both boolean and results present"));
            }
            self.pull.skip_value()?;
        }
        self.pull.expect_end()
    }
}

impl<R: BufRead> Iterator for ResultRows<R> {
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

/// A bare lexical cell, read with its column's kind, datatype and format
fn cell_node(decl: &ColumnDecl, text: String, blanks: &mut BlankLabels) -> WireResult<Node> {
    match decl.kind.as_deref().unwrap_or("literal") {
        "uri" => Ok(Node::Iri(Iri::new(text))),
        "bnode" => Ok(Node::Blank(blanks.resolve(&text)?)),
        "literal" => {
            let lexical = match decl.format.as_deref() {
                Some("year4") => pad_year(&text),
                _ => text,
            };
            literal(lexical, decl.datatype.as_deref(), None)
        }
        other => Err(WireError::malformed(format!(
            "unknown column kind {:?} for {}",
            other, decl.name
        ))),
    }
}

/// Zero-pad the leading year field to four digits: `812-05-01` → `0812-05-01`
fn pad_year(text: &str) -> String {
    let (sign, rest) = match text.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", text),
    };
    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 || digits >= 4 {
        return text.to_string();
    }
    format!("{}{}{}", sign, "0".repeat(4 - digits), rest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SqlType;
    use std::io::Cursor;

    fn decode(json: &str, typed: bool) -> WireResult<Response> {
        parse(
            Cursor::new(json.as_bytes().to_vec()),
            typed,
            ColumnTyping::Detected,
            Cleanup::noop(),
        )
    }

    fn collect(response: &mut Response) -> WireResult<Vec<Row>> {
        response.rows().map_or(Ok(Vec::new()), |rows| rows.collect())
    }

    #[test]
    fn test_bindings_with_missing_values() {
        let mut response = decode(
            r#"{"head":{"vars":["x","n"]},"results":{"bindings":[
                {"x":{"type":"uri","value":"http://example.org/a"},"n":{"type":"literal","value":"7","datatype":"http://www.w3.org/2001/XMLSchema#int"}},
                {"n":{"type":"literal","value":"8","datatype":"http://www.w3.org/2001/XMLSchema#int"}}
            ]}}"#,
            false,
        )
        .unwrap();
        let columns = response.columns().unwrap();
        assert_eq!(columns[0].name(), "x");
        assert_eq!(columns[1].sql_type(), SqlType::Integer);
        let rows = collect(&mut response).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0][0], Some(Node::iri("http://example.org/a")));
        assert_eq!(rows[1][0], None);
    }

    #[test]
    fn test_unknown_members_are_skipped() {
        let mut response = decode(
            r#"{"head":{"vars":["x"],"link":["info"]},"extra":[1,2.5,{"a":null}],
               "results":{"distinct":false,"ordered":true,"bindings":[]},"trailer":-3}"#,
            false,
        )
        .unwrap();
        assert!(collect(&mut response).unwrap().is_empty());
    }

    #[test]
    fn test_boolean_result() {
        let response = decode(r#"{"boolean": false, "head": {}}"#, false).unwrap();
        assert_eq!(response.boolean(), Some(false));
    }

    #[test]
    fn test_result_shape_violations() {
        assert!(decode(r#"{"head":{}}"#, false).unwrap_err().is_protocol());
        assert!(decode(r#"{"head":{},"boolean":true,"results":{"bindings":[]}}"#, false)
            .unwrap_err()
            .is_protocol());
        assert!(decode(r#"{"results":{"bindings":[]},"head":{"vars":[]}}"#, false)
            .unwrap_err()
            .is_malformed());

        let mut late = decode(
            r#"{"head":{"vars":["x"]},"results":{"bindings":[{}]},"boolean":true}"#,
            false,
        )
        .unwrap();
        let rows = late.rows().unwrap();
        assert_eq!(rows.next().unwrap().unwrap(), vec![None]);
        assert!(rows.next().unwrap().unwrap_err().is_protocol());
    }

    #[test]
    fn test_truncated_rows_fail_the_sequence() {
        let mut response = decode(
            r#"{"head":{"vars":["x"]},"results":{"bindings":[{"x":{"type":"uri","value":"a"}},{"x":"#,
            false,
        )
        .unwrap();
        let rows = response.rows().unwrap();
        assert!(rows.next().unwrap().is_ok());
        let err = rows.next().unwrap().unwrap_err();
        assert!(err.is_malformed());
        assert!(rows.next().unwrap().is_err());
    }

    #[test]
    fn test_typed_cells() {
        let mut response = decode(
            r#"{"head":{"columns":[
                {"name":"s","kind":"uri"},
                {"name":"born","datatype":"http://www.w3.org/2001/XMLSchema#date","format":"year4"},
                {"name":"label"}
            ]},"results":{"rows":[
                ["http://example.org/p", "812-04-02", {"type":"literal","value":"Karl","xml:lang":"de"}],
                [null, "1999-01-01"]
            ]}}"#,
            true,
        )
        .unwrap();
        let columns = response.columns().unwrap();
        assert_eq!(columns[1].sql_type(), SqlType::Date);
        let rows = collect(&mut response).unwrap();
        assert_eq!(rows[0][0], Some(Node::iri("http://example.org/p")));
        assert_eq!(
            rows[0][1].as_ref().map(Node::to_string).as_deref(),
            Some("\"0812-04-02\"^^<http://www.w3.org/2001/XMLSchema#date>")
        );
        assert_eq!(rows[0][2].as_ref().map(Node::to_string).as_deref(), Some("\"Karl\"@de"));
        assert_eq!(rows[1][0], None);
        assert!(rows[1][1].is_some());
        assert_eq!(rows[1][2], None);
    }

    #[test]
    fn test_typed_without_columns_is_malformed() {
        assert!(decode(r#"{"head":{"vars":["x"]},"results":{"rows":[]}}"#, true)
            .unwrap_err()
            .is_malformed());
    }

    #[test]
    fn test_pad_year() {
        assert_eq!(pad_year("812-04-02"), "0812-04-02");
        assert_eq!(pad_year("-44"), "-0044");
        assert_eq!(pad_year("2024-01-01"), "2024-01-01");
        assert_eq!(pad_year("12345"), "12345");
        assert_eq!(pad_year("--05"), "--05");
    }
}
