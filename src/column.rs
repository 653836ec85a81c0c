//! Column descriptors
//!
//! A descriptor is computed once, when a result's shape is known: either from
//! a declared datatype or from the first row's value. Which of the two, and
//! whether types are reported at all, is decided by the caller's
//! [`ColumnTyping`] policy.

use crate::node::Node;
use crate::types::{column_type_for, column_type_for_node, ColumnType, SqlType};
use serde::{Deserialize, Serialize};

/// Whether a column may hold absent values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Nullability {
    Nullable,
    NoNulls,
    Unknown,
}

/// Policy for reporting column types
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnTyping {
    /// From the datatype declared with the column
    Declared,
    /// From the value in the first row
    #[default]
    Detected,
    /// Every column is text
    Strings,
    /// Every column holds raw nodes
    RawNode,
}

/// Immutable description of one result column
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Column {
    name: String,
    label: String,
    nullability: Nullability,
    column_type: ColumnType,
    catalog: String,
    schema: String,
    table: String,
    read_only: bool,
    writable: bool,
    searchable: bool,
}

impl Column {
    fn with_type(name: &str, nullability: Nullability, column_type: ColumnType) -> Self {
        Self {
            name: name.to_string(),
            label: name.to_string(),
            nullability,
            column_type,
            catalog: String::new(),
            schema: String::new(),
            table: String::new(),
            read_only: true,
            writable: false,
            searchable: true,
        }
    }

    /// Column whose type comes from a declared datatype
    ///
    /// Under `Detected` the declared datatype is used as well, since no sample
    /// is available; an undeclared column reports as raw nodes.
    pub fn declared(
        name: &str,
        datatype: Option<&str>,
        nullability: Nullability,
        typing: ColumnTyping,
    ) -> Self {
        let column_type = match typing {
            ColumnTyping::Strings => ColumnType::string(),
            ColumnTyping::RawNode => ColumnType::raw_node(),
            ColumnTyping::Declared | ColumnTyping::Detected => {
                datatype.map_or_else(ColumnType::raw_node, column_type_for)
            }
        };
        Self::with_type(name, nullability, column_type)
    }

    /// Column whose type comes from a sampled value
    ///
    /// Under `Declared` the declared datatype wins; an absent sample reports
    /// as text.
    pub fn detect(
        name: &str,
        sample: Option<&Node>,
        declared: Option<&str>,
        nullability: Nullability,
        typing: ColumnTyping,
    ) -> Self {
        let column_type = match (typing, sample, declared) {
            (ColumnTyping::Strings, _, _) => ColumnType::string(),
            (ColumnTyping::RawNode, _, _) => ColumnType::raw_node(),
            (ColumnTyping::Declared, _, Some(datatype)) => column_type_for(datatype),
            (_, Some(node), _) => column_type_for_node(node),
            (_, None, Some(datatype)) => column_type_for(datatype),
            (_, None, None) => ColumnType::string(),
        };
        Self::with_type(name, nullability, column_type)
    }

    /// Replace the table association
    pub fn in_table(mut self, catalog: &str, schema: &str, table: &str) -> Self {
        self.catalog = catalog.to_string();
        self.schema = schema.to_string();
        self.table = table.to_string();
        self
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.label = label.to_string();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn nullability(&self) -> Nullability {
        self.nullability
    }

    pub fn column_type(&self) -> &ColumnType {
        &self.column_type
    }

    pub fn sql_type(&self) -> SqlType {
        self.column_type.sql_type
    }

    pub fn type_name(&self) -> &str {
        self.column_type.type_name
    }

    pub fn class_name(&self) -> &str {
        self.column_type.class_name
    }

    pub fn display_size(&self) -> u32 {
        self.column_type.display_size
    }

    pub fn precision(&self) -> u32 {
        self.column_type.precision
    }

    pub fn scale(&self) -> u32 {
        self.column_type.scale
    }

    pub fn is_signed(&self) -> bool {
        self.column_type.signed
    }

    pub fn catalog(&self) -> &str {
        &self.catalog
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn is_writable(&self) -> bool {
        self.writable
    }

    pub fn is_searchable(&self) -> bool {
        self.searchable
    }
}
