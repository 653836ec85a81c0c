//! Type coercion layer
//!
//! Converts host values into nodes when binding parameters, and nodes back
//! into host values when reading cells. Absent nodes read as `None` (or the
//! caller's default for primitives). A failed read is local to its cell.
//!
//! Failures carry the source datatype and the target type:
//! `Unable to marshal {datatype} to {target}`.

mod numeric;
mod temporal;

use crate::error::{LexicalError, WireError, WireResult};
use crate::literal::{self, DayOfMonth, MonthDay, OffsetTime, Period, Year, YearMonth};
use crate::node::{Iri, Node};
use crate::vocab::{rdfs, xsd};
use bigdecimal::BigDecimal;
use chrono::{DateTime, FixedOffset, Month, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use num_bigint::BigInt;
use oxiri::IriRef;
use std::error::Error as StdError;
use std::fmt;

/// A host value on either side of the coercion boundary
#[derive(Debug, Clone, PartialEq)]
pub enum HostValue {
    Null,
    Bool(bool),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    BigInt(BigInt),
    Decimal(BigDecimal),
    F32(f32),
    F64(f64),
    String(String),
    Uri(IriRef<String>),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    OffsetDateTime(DateTime<FixedOffset>),
    Time(NaiveTime),
    OffsetTime(OffsetTime),
    Year(Year),
    YearMonth(YearMonth),
    Month(Month),
    MonthDay(MonthDay),
    Day(DayOfMonth),
    /// Year-month duration
    Period(Period),
    /// Day-time duration
    Duration(TimeDelta),
    Node(Node),
    /// Binary data has no node mapping
    Bytes(Vec<u8>),
    /// Collections have no node mapping
    List(Vec<HostValue>),
}

impl HostValue {
    pub fn is_null(&self) -> bool {
        matches!(self, HostValue::Null)
    }

    /// Host type name used in messages
    pub fn type_name(&self) -> &'static str {
        match self {
            HostValue::Null => "null",
            HostValue::Bool(_) => "bool",
            HostValue::I8(_) => "i8",
            HostValue::I16(_) => "i16",
            HostValue::I32(_) => "i32",
            HostValue::I64(_) => "i64",
            HostValue::U8(_) => "u8",
            HostValue::U16(_) => "u16",
            HostValue::U32(_) => "u32",
            HostValue::U64(_) => "u64",
            HostValue::BigInt(_) => "BigInt",
            HostValue::Decimal(_) => "BigDecimal",
            HostValue::F32(_) => "f32",
            HostValue::F64(_) => "f64",
            HostValue::String(_) => "String",
            HostValue::Uri(_) => "IriRef",
            HostValue::Date(_) => "NaiveDate",
            HostValue::DateTime(_) => "NaiveDateTime",
            HostValue::OffsetDateTime(_) => "DateTime<FixedOffset>",
            HostValue::Time(_) => "NaiveTime",
            HostValue::OffsetTime(_) => "OffsetTime",
            HostValue::Year(_) => "Year",
            HostValue::YearMonth(_) => "YearMonth",
            HostValue::Month(_) => "Month",
            HostValue::MonthDay(_) => "MonthDay",
            HostValue::Day(_) => "DayOfMonth",
            HostValue::Period(_) => "Period",
            HostValue::Duration(_) => "TimeDelta",
            HostValue::Node(_) => "Node",
            HostValue::Bytes(_) => "Vec<u8>",
            HostValue::List(_) => "Vec<HostValue>",
        }
    }
}

macro_rules! host_value_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for HostValue {
                fn from(value: $ty) -> Self {
                    HostValue::$variant(value)
                }
            }
        )*
    };
}

host_value_from! {
    bool => Bool,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    BigInt => BigInt,
    BigDecimal => Decimal,
    f32 => F32,
    f64 => F64,
    String => String,
    NaiveDate => Date,
    NaiveDateTime => DateTime,
    DateTime<FixedOffset> => OffsetDateTime,
    NaiveTime => Time,
    OffsetTime => OffsetTime,
    Year => Year,
    YearMonth => YearMonth,
    Month => Month,
    MonthDay => MonthDay,
    DayOfMonth => Day,
    Period => Period,
    TimeDelta => Duration,
    Node => Node,
}

impl From<&str> for HostValue {
    fn from(value: &str) -> Self {
        HostValue::String(value.to_string())
    }
}

impl<T: Into<HostValue>> From<Option<T>> for HostValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(HostValue::Null, Into::into)
    }
}

/// Target type of a read, or of a bind with an explicit hint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostType {
    Bool,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    BigInt,
    Decimal,
    F32,
    F64,
    /// Narrowest number that loses nothing
    Number,
    String,
    Uri,
    Date,
    DateTime,
    OffsetDateTime,
    Time,
    OffsetTime,
    /// Zoned form when an offset is present, zoneless otherwise
    BestDateTime,
    Year,
    YearMonth,
    Month,
    MonthDay,
    Day,
    Period,
    Duration,
    Node,
}

impl HostType {
    pub fn name(&self) -> &'static str {
        match self {
            HostType::Bool => "bool",
            HostType::I8 => "i8",
            HostType::I16 => "i16",
            HostType::I32 => "i32",
            HostType::I64 => "i64",
            HostType::U8 => "u8",
            HostType::U16 => "u16",
            HostType::U32 => "u32",
            HostType::U64 => "u64",
            HostType::BigInt => "BigInt",
            HostType::Decimal => "BigDecimal",
            HostType::F32 => "f32",
            HostType::F64 => "f64",
            HostType::Number => "number",
            HostType::String => "String",
            HostType::Uri => "IriRef",
            HostType::Date => "NaiveDate",
            HostType::DateTime => "NaiveDateTime",
            HostType::OffsetDateTime => "DateTime<FixedOffset>",
            HostType::Time => "NaiveTime",
            HostType::OffsetTime => "OffsetTime",
            HostType::BestDateTime => "date/time",
            HostType::Year => "Year",
            HostType::YearMonth => "YearMonth",
            HostType::Month => "Month",
            HostType::MonthDay => "MonthDay",
            HostType::Day => "DayOfMonth",
            HostType::Period => "Period",
            HostType::Duration => "TimeDelta",
            HostType::Node => "Node",
        }
    }
}

impl fmt::Display for HostType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub(crate) fn marshal_error(
    node: &Node,
    target: &str,
    cause: impl StdError + Send + Sync + 'static,
) -> WireError {
    WireError::marshal(node.datatype_label(), target, cause)
}

/// A node kind or datatype that can never produce the target
pub(crate) fn mismatch(node: &Node, target: &str) -> WireError {
    marshal_error(
        node,
        target,
        LexicalError::new(format!("{} is not convertible to {}", node, target)),
    )
}

/// Build the node for a host value, dispatching on its runtime variant
///
/// `Null` yields `None`. Binary data and collections fail with
/// `UnsupportedConversion`.
pub fn to_node(value: &HostValue) -> WireResult<Option<Node>> {
    let literal = match value {
        HostValue::Null => return Ok(None),
        HostValue::Node(node) => return Ok(Some(node.clone())),
        HostValue::Uri(uri) => return Ok(Some(Node::Iri(Iri::new(uri.as_str())))),
        HostValue::Bytes(_) | HostValue::List(_) => {
            return Err(WireError::unsupported(format!(
                "{} has no node mapping",
                value.type_name()
            )))
        }
        HostValue::Bool(v) => literal::create_boolean(*v),
        HostValue::I8(v) => literal::create_byte(*v),
        HostValue::I16(v) => literal::create_short(*v),
        HostValue::I32(v) => literal::create_int(*v),
        HostValue::I64(v) => literal::create_long(*v),
        HostValue::U8(v) => literal::create_unsigned_byte(*v),
        HostValue::U16(v) => literal::create_unsigned_short(*v),
        HostValue::U32(v) => literal::create_unsigned_int(*v),
        HostValue::U64(v) => literal::create_unsigned_long(*v),
        HostValue::BigInt(v) => literal::create_big_integer(v),
        HostValue::Decimal(v) => literal::create_decimal(v),
        HostValue::F32(v) => literal::create_float(*v),
        HostValue::F64(v) => literal::create_double(*v),
        HostValue::String(v) => literal::create_string(v.as_str()),
        HostValue::Date(v) => literal::create_date(*v),
        HostValue::DateTime(v) => literal::create_date_time(*v),
        HostValue::OffsetDateTime(v) => literal::create_offset_date_time(v),
        HostValue::Time(v) => literal::create_time(*v),
        HostValue::OffsetTime(v) => literal::create_offset_time(*v),
        HostValue::Year(v) => literal::create_year(*v),
        HostValue::YearMonth(v) => literal::create_year_month(*v),
        HostValue::Month(v) => literal::create_month(*v),
        HostValue::MonthDay(v) => literal::create_month_day(*v),
        HostValue::Day(v) => literal::create_day(*v),
        HostValue::Period(v) => literal::create_year_month_duration(*v)?,
        HostValue::Duration(v) => literal::create_day_time_duration(*v),
    };
    Ok(Some(Node::Literal(literal)))
}

/// Build the node for a host value bound with an explicit target type
///
/// The value is converted to the target first, so binding an `i64` as
/// `HostType::I32` yields an `xsd:int` literal, or a `TypeCoercion` error
/// when it does not fit.
pub fn to_node_as(value: &HostValue, target: HostType) -> WireResult<Option<Node>> {
    let node = to_node(value)?;
    let converted = from_node(node.as_ref(), target)?;
    to_node(&converted)
}

/// Read a node as the requested host type; an absent node reads as `Null`
pub fn from_node(node: Option<&Node>, target: HostType) -> WireResult<HostValue> {
    let Some(node) = node else {
        return Ok(HostValue::Null);
    };
    let name = target.name();
    Ok(match target {
        HostType::Bool => HostValue::Bool(numeric::read_bool(node)?),
        HostType::I8 => HostValue::I8(numeric::read_integer(node, name)?),
        HostType::I16 => HostValue::I16(numeric::read_integer(node, name)?),
        HostType::I32 => HostValue::I32(numeric::read_integer(node, name)?),
        HostType::I64 => HostValue::I64(numeric::read_integer(node, name)?),
        HostType::U8 => HostValue::U8(numeric::read_integer(node, name)?),
        HostType::U16 => HostValue::U16(numeric::read_integer(node, name)?),
        HostType::U32 => HostValue::U32(numeric::read_integer(node, name)?),
        HostType::U64 => HostValue::U64(numeric::read_integer(node, name)?),
        HostType::BigInt => HostValue::BigInt(numeric::read_big_int(node, name)?),
        HostType::Decimal => HostValue::Decimal(numeric::read_big_decimal(node, name)?),
        HostType::F32 => HostValue::F32(numeric::read_f32(node, name)?),
        HostType::F64 => HostValue::F64(numeric::read_f64(node, name)?),
        HostType::Number => numeric::read_best_number(node)?,
        HostType::String => HostValue::String(read_string(node)),
        HostType::Uri => HostValue::Uri(read_uri(node)?),
        HostType::Date => HostValue::Date(temporal::read_local_date(node)?),
        HostType::DateTime => HostValue::DateTime(temporal::read_local_date_time(node)?),
        HostType::OffsetDateTime => {
            HostValue::OffsetDateTime(temporal::read_offset_date_time(node)?)
        }
        HostType::Time => HostValue::Time(temporal::read_local_time(node)?),
        HostType::OffsetTime => HostValue::OffsetTime(temporal::read_offset_time(node)?),
        HostType::BestDateTime => temporal::read_best_date_time(node)?,
        HostType::Year => HostValue::Year(temporal::read_year(node)?),
        HostType::YearMonth => HostValue::YearMonth(temporal::read_year_month(node)?),
        HostType::Month => HostValue::Month(temporal::read_month(node)?),
        HostType::MonthDay => HostValue::MonthDay(temporal::read_month_day(node)?),
        HostType::Day => HostValue::Day(temporal::read_day(node)?),
        HostType::Period => HostValue::Period(temporal::read_year_month_duration(node)?),
        HostType::Duration => HostValue::Duration(temporal::read_day_time_duration(node)?),
        HostType::Node => HostValue::Node(node.clone()),
    })
}

/// IRI text, blank label or lexical form
fn read_string(node: &Node) -> String {
    match node {
        Node::Iri(iri) => iri.as_str().to_string(),
        Node::Blank(blank) => blank.to_string(),
        Node::Literal(literal) => literal.lexical().to_string(),
    }
}

/// An IRI, or a literal typed `xsd:string`, `xsd:anyURI` or `rdfs:Resource`
fn read_uri(node: &Node) -> WireResult<IriRef<String>> {
    const TARGET: &str = "IriRef";
    let text = match node {
        Node::Iri(iri) => iri.as_str(),
        Node::Literal(literal)
            if matches!(
                literal.datatype().as_str(),
                xsd::STRING | xsd::ANY_URI | rdfs::RESOURCE
            ) =>
        {
            literal.lexical().trim()
        }
        _ => return Err(mismatch(node, TARGET)),
    };
    IriRef::parse(text.to_string()).map_err(|e| marshal_error(node, TARGET, e))
}

/// Generic typed read of a present node
pub trait FromNode: Sized {
    fn from_node(node: &Node) -> WireResult<Self>;
}

/// Read an optional node into any [`FromNode`] type
pub fn read<T: FromNode>(node: Option<&Node>) -> WireResult<Option<T>> {
    node.map(T::from_node).transpose()
}

macro_rules! from_node_impl {
    ($($ty:ty => |$node:ident| $body:expr),* $(,)?) => {
        $(
            impl FromNode for $ty {
                fn from_node($node: &Node) -> WireResult<Self> {
                    $body
                }
            }
        )*
    };
}

from_node_impl! {
    bool => |node| numeric::read_bool(node),
    i8 => |node| numeric::read_integer(node, "i8"),
    i16 => |node| numeric::read_integer(node, "i16"),
    i32 => |node| numeric::read_integer(node, "i32"),
    i64 => |node| numeric::read_integer(node, "i64"),
    u8 => |node| numeric::read_integer(node, "u8"),
    u16 => |node| numeric::read_integer(node, "u16"),
    u32 => |node| numeric::read_integer(node, "u32"),
    u64 => |node| numeric::read_integer(node, "u64"),
    BigInt => |node| numeric::read_big_int(node, "BigInt"),
    BigDecimal => |node| numeric::read_big_decimal(node, "BigDecimal"),
    f32 => |node| numeric::read_f32(node, "f32"),
    f64 => |node| numeric::read_f64(node, "f64"),
    String => |node| Ok(read_string(node)),
    IriRef<String> => |node| read_uri(node),
    NaiveDate => |node| temporal::read_local_date(node),
    NaiveDateTime => |node| temporal::read_local_date_time(node),
    DateTime<FixedOffset> => |node| temporal::read_offset_date_time(node),
    NaiveTime => |node| temporal::read_local_time(node),
    OffsetTime => |node| temporal::read_offset_time(node),
    Year => |node| temporal::read_year(node),
    YearMonth => |node| temporal::read_year_month(node),
    Month => |node| temporal::read_month(node),
    MonthDay => |node| temporal::read_month_day(node),
    DayOfMonth => |node| temporal::read_day(node),
    Period => |node| temporal::read_year_month_duration(node),
    TimeDelta => |node| temporal::read_day_time_duration(node),
    Node => |node| Ok(node.clone()),
}

pub fn to_bool(node: Option<&Node>, default: bool) -> WireResult<bool> {
    Ok(read(node)?.unwrap_or(default))
}

pub fn to_i8(node: Option<&Node>, default: i8) -> WireResult<i8> {
    Ok(read(node)?.unwrap_or(default))
}

pub fn to_i16(node: Option<&Node>, default: i16) -> WireResult<i16> {
    Ok(read(node)?.unwrap_or(default))
}

pub fn to_i32(node: Option<&Node>, default: i32) -> WireResult<i32> {
    Ok(read(node)?.unwrap_or(default))
}

pub fn to_i64(node: Option<&Node>, default: i64) -> WireResult<i64> {
    Ok(read(node)?.unwrap_or(default))
}

pub fn to_f32(node: Option<&Node>, default: f32) -> WireResult<f32> {
    Ok(read(node)?.unwrap_or(default))
}

pub fn to_f64(node: Option<&Node>, default: f64) -> WireResult<f64> {
    Ok(read(node)?.unwrap_or(default))
}

pub fn to_big_int(node: Option<&Node>) -> WireResult<Option<BigInt>> {
    read(node)
}

pub fn to_big_decimal(node: Option<&Node>) -> WireResult<Option<BigDecimal>> {
    read(node)
}

pub fn to_string(node: Option<&Node>) -> WireResult<Option<String>> {
    read(node)
}

pub fn to_uri(node: Option<&Node>) -> WireResult<Option<IriRef<String>>> {
    read(node)
}

pub fn to_local_date(node: Option<&Node>) -> WireResult<Option<NaiveDate>> {
    read(node)
}

pub fn to_local_date_time(node: Option<&Node>) -> WireResult<Option<NaiveDateTime>> {
    read(node)
}

pub fn to_local_time(node: Option<&Node>) -> WireResult<Option<NaiveTime>> {
    read(node)
}

pub fn to_offset_date_time(node: Option<&Node>) -> WireResult<Option<DateTime<FixedOffset>>> {
    read(node)
}

pub fn to_offset_time(node: Option<&Node>) -> WireResult<Option<OffsetTime>> {
    read(node)
}

pub fn to_year(node: Option<&Node>) -> WireResult<Option<Year>> {
    read(node)
}

pub fn to_year_month(node: Option<&Node>) -> WireResult<Option<YearMonth>> {
    read(node)
}

pub fn to_month(node: Option<&Node>) -> WireResult<Option<Month>> {
    read(node)
}

pub fn to_month_day(node: Option<&Node>) -> WireResult<Option<MonthDay>> {
    read(node)
}

pub fn to_day(node: Option<&Node>) -> WireResult<Option<DayOfMonth>> {
    read(node)
}

pub fn to_year_month_duration(node: Option<&Node>) -> WireResult<Option<Period>> {
    read(node)
}

pub fn to_day_time_duration(node: Option<&Node>) -> WireResult<Option<TimeDelta>> {
    read(node)
}

/// Narrowest host number: `Null` when absent
pub fn best_number(node: Option<&Node>) -> WireResult<HostValue> {
    from_node(node, HostType::Number)
}

/// Zoned or zoneless date/time: `Null` when absent
pub fn best_date_time(node: Option<&Node>) -> WireResult<HostValue> {
    from_node(node, HostType::BestDateTime)
}

/// Milliseconds since the epoch for a date or dateTime
pub fn to_epoch_millis(node: Option<&Node>) -> WireResult<Option<i64>> {
    node.map(temporal::read_epoch_millis).transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{Blank, Literal};
    use std::str::FromStr;

    #[test]
    fn test_to_node_dispatch() {
        let node = to_node(&HostValue::I32(5)).unwrap().unwrap();
        assert_eq!(node, Node::Literal(Literal::new("5", xsd::INT)));
        assert_eq!(to_node(&HostValue::Null).unwrap(), None);
        assert_eq!(
            to_node(&HostValue::from("text")).unwrap(),
            Some(Node::Literal(Literal::string("text")))
        );
    }

    #[test]
    fn test_unsupported_host_values() {
        assert!(to_node(&HostValue::Bytes(vec![1, 2])).unwrap_err().is_unsupported());
        assert!(to_node(&HostValue::List(vec![])).unwrap_err().is_unsupported());
    }

    #[test]
    fn test_to_node_as_narrows() {
        let node = to_node_as(&HostValue::I64(12), HostType::I32).unwrap().unwrap();
        assert_eq!(node, Node::Literal(Literal::new("12", xsd::INT)));

        let err = to_node_as(&HostValue::I64(i64::MAX), HostType::I32).unwrap_err();
        assert!(err.is_type_coercion());
        assert_eq!(
            err.to_string(),
            "Unable to marshal http://www.w3.org/2001/XMLSchema#long to i32"
        );
    }

    #[test]
    fn test_absent_nodes() {
        assert!(!to_bool(None, false).unwrap());
        assert_eq!(to_i32(None, 7).unwrap(), 7);
        assert_eq!(to_string(None).unwrap(), None);
        assert_eq!(from_node(None, HostType::Date).unwrap(), HostValue::Null);
    }

    #[test]
    fn test_uri_extraction() {
        let iri = Node::iri("http://example.org/a");
        assert_eq!(to_uri(Some(&iri)).unwrap().unwrap().as_str(), "http://example.org/a");

        let any_uri = Node::Literal(Literal::new("http://example.org/b", xsd::ANY_URI));
        assert!(to_uri(Some(&any_uri)).unwrap().is_some());

        let resource = Node::Literal(Literal::new("urn:x", rdfs::RESOURCE));
        assert!(to_uri(Some(&resource)).unwrap().is_some());

        let integer = Node::Literal(Literal::new("1", xsd::INTEGER));
        assert!(to_uri(Some(&integer)).unwrap_err().is_type_coercion());

        let bad = Node::Literal(Literal::string("not an iri"));
        assert!(to_uri(Some(&bad)).is_err());
    }

    #[test]
    fn test_strings_from_each_node_kind() {
        let blank = Node::Blank(Blank::new("b1").unwrap());
        assert_eq!(to_string(Some(&blank)).unwrap().unwrap(), "_:b1");
        assert_eq!(
            to_string(Some(&Node::iri("http://ex/a"))).unwrap().unwrap(),
            "http://ex/a"
        );
    }

    #[test]
    fn test_scenario_d_overflow_then_best_number() {
        let node = Node::Literal(Literal::new("9223372036854775808", xsd::INTEGER));
        let err = to_i32(Some(&node), 0).unwrap_err();
        assert!(err.is_type_coercion());
        assert_eq!(
            best_number(Some(&node)).unwrap(),
            HostValue::BigInt(BigInt::from_str("9223372036854775808").unwrap())
        );
    }

    #[test]
    fn test_special_floats_round_trip() {
        for value in [f64::INFINITY, f64::NEG_INFINITY] {
            let node = to_node(&HostValue::F64(value)).unwrap();
            assert_eq!(to_f64(node.as_ref(), 0.0).unwrap(), value);
        }
        let nan = to_node(&HostValue::F32(f32::NAN)).unwrap();
        assert!(to_f32(nan.as_ref(), 0.0).unwrap().is_nan());
    }

    #[test]
    fn test_period_with_days_is_rejected_on_bind() {
        let err = to_node(&HostValue::Period(Period::new(0, 1, 2))).unwrap_err();
        assert!(err.is_invalid_argument());
    }
}
