//! Datatype-to-column-type map
//!
//! Every relational type code has an explicit decision in [`datatype_for`]:
//! either a datatype or `None` for types that have no graph counterpart.
//! The match is exhaustive, so a new [`SqlType`] does not compile until it is
//! mapped or excluded.

use crate::node::Node;
use crate::vocab::{rdf, xsd, RAW_NODE};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Relational type codes with their JDBC values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SqlType {
    Bit,
    TinyInt,
    SmallInt,
    Integer,
    BigInt,
    Float,
    Real,
    Double,
    Numeric,
    Decimal,
    Char,
    VarChar,
    LongVarChar,
    Date,
    Time,
    Timestamp,
    Binary,
    VarBinary,
    LongVarBinary,
    Null,
    Other,
    JavaObject,
    Distinct,
    Struct,
    Array,
    Blob,
    Clob,
    Ref,
    DataLink,
    Boolean,
    RowId,
    NChar,
    NVarChar,
    LongNVarChar,
    NClob,
    SqlXml,
    RefCursor,
    TimeWithTimezone,
    TimestampWithTimezone,
}

impl SqlType {
    pub const ALL: [SqlType; 39] = [
        SqlType::Bit,
        SqlType::TinyInt,
        SqlType::SmallInt,
        SqlType::Integer,
        SqlType::BigInt,
        SqlType::Float,
        SqlType::Real,
        SqlType::Double,
        SqlType::Numeric,
        SqlType::Decimal,
        SqlType::Char,
        SqlType::VarChar,
        SqlType::LongVarChar,
        SqlType::Date,
        SqlType::Time,
        SqlType::Timestamp,
        SqlType::Binary,
        SqlType::VarBinary,
        SqlType::LongVarBinary,
        SqlType::Null,
        SqlType::Other,
        SqlType::JavaObject,
        SqlType::Distinct,
        SqlType::Struct,
        SqlType::Array,
        SqlType::Blob,
        SqlType::Clob,
        SqlType::Ref,
        SqlType::DataLink,
        SqlType::Boolean,
        SqlType::RowId,
        SqlType::NChar,
        SqlType::NVarChar,
        SqlType::LongNVarChar,
        SqlType::NClob,
        SqlType::SqlXml,
        SqlType::RefCursor,
        SqlType::TimeWithTimezone,
        SqlType::TimestampWithTimezone,
    ];

    /// Integer code as reported through the relational API
    pub fn code(&self) -> i32 {
        match self {
            SqlType::Bit => -7,
            SqlType::TinyInt => -6,
            SqlType::SmallInt => 5,
            SqlType::Integer => 4,
            SqlType::BigInt => -5,
            SqlType::Float => 6,
            SqlType::Real => 7,
            SqlType::Double => 8,
            SqlType::Numeric => 2,
            SqlType::Decimal => 3,
            SqlType::Char => 1,
            SqlType::VarChar => 12,
            SqlType::LongVarChar => -1,
            SqlType::Date => 91,
            SqlType::Time => 92,
            SqlType::Timestamp => 93,
            SqlType::Binary => -2,
            SqlType::VarBinary => -3,
            SqlType::LongVarBinary => -4,
            SqlType::Null => 0,
            SqlType::Other => 1111,
            SqlType::JavaObject => 2000,
            SqlType::Distinct => 2001,
            SqlType::Struct => 2002,
            SqlType::Array => 2003,
            SqlType::Blob => 2004,
            SqlType::Clob => 2005,
            SqlType::Ref => 2006,
            SqlType::DataLink => 70,
            SqlType::Boolean => 16,
            SqlType::RowId => -8,
            SqlType::NChar => -15,
            SqlType::NVarChar => -9,
            SqlType::LongNVarChar => -16,
            SqlType::NClob => 2011,
            SqlType::SqlXml => 2009,
            SqlType::RefCursor => 2012,
            SqlType::TimeWithTimezone => 2013,
            SqlType::TimestampWithTimezone => 2014,
        }
    }

    pub fn from_code(code: i32) -> Option<SqlType> {
        SqlType::ALL.iter().copied().find(|t| t.code() == code)
    }

    /// Type name as reported through the relational API
    pub const fn name(&self) -> &'static str {
        match self {
            SqlType::Bit => "BIT",
            SqlType::TinyInt => "TINYINT",
            SqlType::SmallInt => "SMALLINT",
            SqlType::Integer => "INTEGER",
            SqlType::BigInt => "BIGINT",
            SqlType::Float => "FLOAT",
            SqlType::Real => "REAL",
            SqlType::Double => "DOUBLE",
            SqlType::Numeric => "NUMERIC",
            SqlType::Decimal => "DECIMAL",
            SqlType::Char => "CHAR",
            SqlType::VarChar => "VARCHAR",
            SqlType::LongVarChar => "LONGVARCHAR",
            SqlType::Date => "DATE",
            SqlType::Time => "TIME",
            SqlType::Timestamp => "TIMESTAMP",
            SqlType::Binary => "BINARY",
            SqlType::VarBinary => "VARBINARY",
            SqlType::LongVarBinary => "LONGVARBINARY",
            SqlType::Null => "NULL",
            SqlType::Other => "OTHER",
            SqlType::JavaObject => "JAVA_OBJECT",
            SqlType::Distinct => "DISTINCT",
            SqlType::Struct => "STRUCT",
            SqlType::Array => "ARRAY",
            SqlType::Blob => "BLOB",
            SqlType::Clob => "CLOB",
            SqlType::Ref => "REF",
            SqlType::DataLink => "DATALINK",
            SqlType::Boolean => "BOOLEAN",
            SqlType::RowId => "ROWID",
            SqlType::NChar => "NCHAR",
            SqlType::NVarChar => "NVARCHAR",
            SqlType::LongNVarChar => "LONGNVARCHAR",
            SqlType::NClob => "NCLOB",
            SqlType::SqlXml => "SQLXML",
            SqlType::RefCursor => "REF_CURSOR",
            SqlType::TimeWithTimezone => "TIME_WITH_TIMEZONE",
            SqlType::TimestampWithTimezone => "TIMESTAMP_WITH_TIMEZONE",
        }
    }
}

impl fmt::Display for SqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Datatype used to bind a parameter declared with a relational type
///
/// `None` means the type is deliberately excluded: it has no graph counterpart.
pub fn datatype_for(sql_type: SqlType) -> Option<&'static str> {
    match sql_type {
        SqlType::Bit | SqlType::Boolean => Some(xsd::BOOLEAN),
        SqlType::TinyInt => Some(xsd::BYTE),
        SqlType::SmallInt => Some(xsd::SHORT),
        SqlType::Integer => Some(xsd::INT),
        SqlType::BigInt => Some(xsd::LONG),
        SqlType::Real => Some(xsd::FLOAT),
        SqlType::Float | SqlType::Double => Some(xsd::DOUBLE),
        SqlType::Numeric | SqlType::Decimal => Some(xsd::DECIMAL),
        SqlType::Char
        | SqlType::VarChar
        | SqlType::LongVarChar
        | SqlType::NChar
        | SqlType::NVarChar
        | SqlType::LongNVarChar
        | SqlType::Clob
        | SqlType::NClob => Some(xsd::STRING),
        SqlType::Date => Some(xsd::DATE),
        SqlType::Time | SqlType::TimeWithTimezone => Some(xsd::TIME),
        SqlType::Timestamp => Some(xsd::DATE_TIME),
        SqlType::TimestampWithTimezone => Some(xsd::DATE_TIME_STAMP),
        SqlType::Binary | SqlType::VarBinary | SqlType::LongVarBinary | SqlType::Blob => {
            Some(xsd::BASE64_BINARY)
        }
        SqlType::DataLink => Some(xsd::ANY_URI),
        SqlType::SqlXml => Some(rdf::XML_LITERAL),
        SqlType::Other | SqlType::JavaObject => Some(RAW_NODE),
        SqlType::Null
        | SqlType::Distinct
        | SqlType::Struct
        | SqlType::Array
        | SqlType::Ref
        | SqlType::RowId
        | SqlType::RefCursor => None,
    }
}

/// Reported shape of a column holding values of one datatype
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnType {
    pub sql_type: SqlType,
    pub type_name: &'static str,
    /// Host type a cell reads as by default
    pub class_name: &'static str,
    pub display_size: u32,
    pub precision: u32,
    pub scale: u32,
    pub signed: bool,
}

const UNBOUNDED: u32 = i32::MAX as u32;

impl ColumnType {
    const fn new(
        sql_type: SqlType,
        class_name: &'static str,
        display_size: u32,
        precision: u32,
        signed: bool,
    ) -> Self {
        Self {
            sql_type,
            type_name: sql_type.name(),
            class_name,
            display_size,
            precision,
            scale: 0,
            signed,
        }
    }

    /// Text column
    pub fn string() -> Self {
        ColumnType::new(SqlType::VarChar, "String", UNBOUNDED, UNBOUNDED, false)
    }

    /// Raw-node column
    pub fn raw_node() -> Self {
        ColumnType::new(SqlType::Other, "Node", UNBOUNDED, 0, false)
    }
}

/// Column shape for values of a datatype
pub fn column_type_for(datatype: &str) -> ColumnType {
    use SqlType as T;
    let text = |class: &'static str| ColumnType::new(T::VarChar, class, UNBOUNDED, UNBOUNDED, false);
    match datatype {
        xsd::STRING | xsd::NORMALIZED_STRING | xsd::TOKEN | xsd::LANGUAGE | rdf::LANG_STRING => {
            ColumnType::string()
        }
        xsd::BOOLEAN => ColumnType::new(T::Boolean, "bool", 5, 1, false),
        xsd::BYTE => ColumnType::new(T::TinyInt, "i8", 4, 3, true),
        xsd::SHORT => ColumnType::new(T::SmallInt, "i16", 6, 5, true),
        xsd::INT => ColumnType::new(T::Integer, "i32", 11, 10, true),
        xsd::LONG => ColumnType::new(T::BigInt, "i64", 20, 19, true),
        xsd::UNSIGNED_BYTE => ColumnType::new(T::SmallInt, "u8", 3, 3, false),
        xsd::UNSIGNED_SHORT => ColumnType::new(T::Integer, "u16", 5, 5, false),
        xsd::UNSIGNED_INT => ColumnType::new(T::BigInt, "u32", 10, 10, false),
        xsd::UNSIGNED_LONG => ColumnType::new(T::Numeric, "u64", 20, 20, false),
        xsd::INTEGER
        | xsd::NON_NEGATIVE_INTEGER
        | xsd::POSITIVE_INTEGER
        | xsd::NON_POSITIVE_INTEGER
        | xsd::NEGATIVE_INTEGER => {
            ColumnType::new(T::Numeric, "BigInt", UNBOUNDED, 0, true)
        }
        xsd::DECIMAL => ColumnType::new(T::Decimal, "BigDecimal", UNBOUNDED, 0, true),
        xsd::FLOAT => ColumnType::new(T::Real, "f32", 15, 7, true),
        xsd::DOUBLE => ColumnType::new(T::Double, "f64", 24, 15, true),
        xsd::DATE => ColumnType::new(T::Date, "NaiveDate", 10, 10, false),
        xsd::TIME => ColumnType::new(T::Time, "NaiveTime", 18, 18, false),
        xsd::DATE_TIME => ColumnType::new(T::Timestamp, "NaiveDateTime", 29, 29, false),
        xsd::DATE_TIME_STAMP => ColumnType::new(
            T::TimestampWithTimezone,
            "DateTime<FixedOffset>",
            35,
            35,
            false,
        ),
        xsd::G_YEAR => text("Year"),
        xsd::G_YEAR_MONTH => text("YearMonth"),
        xsd::G_MONTH => text("Month"),
        xsd::G_MONTH_DAY => text("MonthDay"),
        xsd::G_DAY => text("DayOfMonth"),
        xsd::YEAR_MONTH_DURATION => text("Period"),
        xsd::DAY_TIME_DURATION | xsd::DURATION => text("TimeDelta"),
        xsd::ANY_URI => text("IriRef"),
        xsd::BASE64_BINARY | xsd::HEX_BINARY => {
            ColumnType::new(T::VarBinary, "Vec<u8>", UNBOUNDED, UNBOUNDED, false)
        }
        rdf::XML_LITERAL => ColumnType::new(T::SqlXml, "String", UNBOUNDED, UNBOUNDED, false),
        _ => ColumnType::raw_node(),
    }
}

/// Column shape detected from a sampled value
pub fn column_type_for_node(node: &Node) -> ColumnType {
    match node {
        Node::Iri(_) => column_type_for(xsd::ANY_URI),
        Node::Blank(_) => ColumnType::string(),
        Node::Literal(literal) => column_type_for(literal.datatype().as_str()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{Blank, Literal};
    use std::collections::HashSet;

    #[test]
    fn test_every_code_has_a_decision() {
        let mut codes = HashSet::new();
        for sql_type in SqlType::ALL {
            assert!(codes.insert(sql_type.code()), "duplicate code for {}", sql_type);
            assert_eq!(SqlType::from_code(sql_type.code()), Some(sql_type));
            // Excluded types are a decision too; mapped ones must round trip
            if let Some(datatype) = datatype_for(sql_type) {
                assert!(!datatype.is_empty());
            }
        }
        assert_eq!(codes.len(), 39);
    }

    #[test]
    fn test_mapped_datatypes_report_a_column_type() {
        for sql_type in SqlType::ALL {
            if let Some(datatype) = datatype_for(sql_type) {
                let column = column_type_for(datatype);
                assert_eq!(column.type_name, column.sql_type.name());
            }
        }
        assert_eq!(column_type_for(xsd::INT).sql_type, SqlType::Integer);
        assert_eq!(column_type_for(RAW_NODE).sql_type, SqlType::Other);
        assert_eq!(column_type_for("http://example.org/custom").class_name, "Node");
    }

    #[test]
    fn test_detect_from_node() {
        assert_eq!(
            column_type_for_node(&Node::Literal(Literal::new("1", xsd::LONG))).sql_type,
            SqlType::BigInt
        );
        assert_eq!(column_type_for_node(&Node::iri("http://ex/a")).class_name, "IriRef");
        assert_eq!(
            column_type_for_node(&Node::Blank(Blank::fresh())).sql_type,
            SqlType::VarChar
        );
    }
}
