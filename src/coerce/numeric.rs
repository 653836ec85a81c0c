//! Numeric and boolean reads

use super::{marshal_error, mismatch};
use crate::coerce::HostValue;
use crate::error::{LexicalError, WireResult};
use crate::node::{Literal, Node};
use crate::vocab::xsd;
use bigdecimal::BigDecimal;
use num_bigint::BigInt;
use num_traits::{FromPrimitive, ToPrimitive, Zero};
use std::str::FromStr;

/// Numeric value as read from a lexical form, before narrowing
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Number {
    Integer(BigInt),
    Decimal(BigDecimal),
    Double(f64),
}

impl Number {
    fn is_truthy(&self) -> bool {
        match self {
            Number::Integer(n) => !n.is_zero(),
            Number::Decimal(d) => !d.is_zero(),
            // NaN is false, infinities are true
            Number::Double(v) => !v.is_nan() && *v != 0.0,
        }
    }
}

/// `INF`, `-INF`, `NaN` and ordinary decimal/exponent text
pub(crate) fn parse_double(text: &str) -> Result<f64, LexicalError> {
    match text.trim() {
        "INF" | "+INF" => Ok(f64::INFINITY),
        "-INF" => Ok(f64::NEG_INFINITY),
        "NaN" => Ok(f64::NAN),
        // Rust also accepts "inf" and "infinity"; XSD does not
        other if other.chars().any(|c| c.is_ascii_alphabetic() && c != 'e' && c != 'E') => {
            Err(LexicalError::new(format!("invalid floating-point text {:?}", other)))
        }
        other => other
            .parse::<f64>()
            .map_err(|e| LexicalError::new(format!("{}: {:?}", e, other))),
    }
}

fn parse_float(text: &str) -> Result<f32, LexicalError> {
    match text.trim() {
        "INF" | "+INF" => Ok(f32::INFINITY),
        "-INF" => Ok(f32::NEG_INFINITY),
        "NaN" => Ok(f32::NAN),
        other if other.chars().any(|c| c.is_ascii_alphabetic() && c != 'e' && c != 'E') => {
            Err(LexicalError::new(format!("invalid floating-point text {:?}", other)))
        }
        other => other
            .parse::<f32>()
            .map_err(|e| LexicalError::new(format!("{}: {:?}", e, other))),
    }
}

/// Narrowest of integer, decimal and double that accepts the text
fn parse_untyped(text: &str) -> Option<Number> {
    let text = text.trim();
    if let Ok(n) = BigInt::from_str(text) {
        return Some(Number::Integer(n));
    }
    if !text.contains(['e', 'E']) {
        if let Ok(d) = BigDecimal::from_str(text) {
            return Some(Number::Decimal(d));
        }
    }
    parse_double(text).ok().map(Number::Double)
}

/// Read any numeric literal; string literals are read as untyped numeric text
pub(crate) fn read_number(node: &Node, target: &str) -> WireResult<Number> {
    let literal = node.as_literal().ok_or_else(|| mismatch(node, target))?;
    let datatype = literal.datatype().as_str();
    let lexical = literal.lexical().trim();
    let fail = |cause: LexicalError| marshal_error(node, target, cause);

    if xsd::is_integer_family(datatype) {
        BigInt::from_str(lexical)
            .map(Number::Integer)
            .map_err(|e| fail(LexicalError::new(format!("{}: {:?}", e, lexical))))
    } else if datatype == xsd::DECIMAL {
        BigDecimal::from_str(lexical)
            .map(Number::Decimal)
            .map_err(|e| fail(LexicalError::new(format!("{}: {:?}", e, lexical))))
    } else if datatype == xsd::DOUBLE || datatype == xsd::FLOAT {
        parse_double(lexical).map(Number::Double).map_err(fail)
    } else if datatype == xsd::BOOLEAN {
        Ok(Number::Integer(BigInt::from(u8::from(boolean_lexical(lexical)))))
    } else if xsd::is_string_like(datatype) {
        parse_untyped(lexical)
            .ok_or_else(|| fail(LexicalError::new(format!("not a number: {:?}", lexical))))
    } else {
        Err(mismatch(node, target))
    }
}

/// Read an exact integer; fractional values are rejected rather than truncated
pub(crate) fn read_big_int(node: &Node, target: &str) -> WireResult<BigInt> {
    match read_number(node, target)? {
        Number::Integer(n) => Ok(n),
        Number::Decimal(d) if d.is_integer() => {
            let (digits, _) = d.with_scale(0).into_bigint_and_exponent();
            Ok(digits)
        }
        Number::Double(v) if v.is_finite() && v.fract() == 0.0 => BigInt::from_f64(v)
            .ok_or_else(|| marshal_error(node, target, LexicalError::new("not a finite number"))),
        other => Err(marshal_error(
            node,
            target,
            LexicalError::new(format!("{:?} is not an integer", other)),
        )),
    }
}

/// Read an integer and narrow it to a fixed-width type
pub(crate) fn read_integer<T>(node: &Node, target: &str) -> WireResult<T>
where
    T: for<'a> TryFrom<&'a BigInt, Error = num_bigint::TryFromBigIntError<()>>,
{
    let value = read_big_int(node, target)?;
    T::try_from(&value).map_err(|e| marshal_error(node, target, e))
}

pub(crate) fn read_big_decimal(node: &Node, target: &str) -> WireResult<BigDecimal> {
    match read_number(node, target)? {
        Number::Integer(n) => Ok(BigDecimal::from(n)),
        Number::Decimal(d) => Ok(d),
        Number::Double(v) => BigDecimal::from_f64(v)
            .ok_or_else(|| marshal_error(node, target, LexicalError::new("not a finite number"))),
    }
}

pub(crate) fn read_f64(node: &Node, target: &str) -> WireResult<f64> {
    match read_number(node, target)? {
        Number::Integer(n) => n
            .to_f64()
            .ok_or_else(|| marshal_error(node, target, LexicalError::new("out of range"))),
        Number::Decimal(d) => d
            .to_f64()
            .ok_or_else(|| marshal_error(node, target, LexicalError::new("out of range"))),
        Number::Double(v) => Ok(v),
    }
}

pub(crate) fn read_f32(node: &Node, target: &str) -> WireResult<f32> {
    // Single precision text is read directly to avoid double rounding
    if let Some(literal) = node.as_literal() {
        let datatype = literal.datatype().as_str();
        if datatype == xsd::FLOAT || datatype == xsd::DOUBLE {
            return parse_float(literal.lexical()).map_err(|e| marshal_error(node, target, e));
        }
    }
    let value = read_f64(node, target)?;
    if value.is_finite() && value.abs() > f64::from(f32::MAX) {
        return Err(marshal_error(
            node,
            target,
            LexicalError::new(format!("{} overflows single precision", value)),
        ));
    }
    Ok(value as f32)
}

/// Narrowest host number for the literal's datatype
pub(crate) fn read_best_number(node: &Node) -> WireResult<HostValue> {
    const TARGET: &str = "number";
    let literal = node.as_literal().ok_or_else(|| mismatch(node, TARGET))?;
    let datatype = literal.datatype().as_str();
    match datatype {
        xsd::BYTE => read_integer(node, TARGET).map(HostValue::I8),
        xsd::SHORT => read_integer(node, TARGET).map(HostValue::I16),
        xsd::INT => read_integer(node, TARGET).map(HostValue::I32),
        xsd::LONG => read_integer(node, TARGET).map(HostValue::I64),
        xsd::FLOAT => read_f32(node, TARGET).map(HostValue::F32),
        xsd::DOUBLE => read_f64(node, TARGET).map(HostValue::F64),
        xsd::DECIMAL => read_big_decimal(node, TARGET).map(HostValue::Decimal),
        _ => Ok(match read_number(node, TARGET)? {
            Number::Integer(n) => match n.to_i64() {
                Some(v) => HostValue::I64(v),
                None => HostValue::BigInt(n),
            },
            Number::Decimal(d) => HostValue::Decimal(d),
            Number::Double(v) => HostValue::F64(v),
        }),
    }
}

/// `xsd:boolean` lexical space: only `true` and `1` are true
fn boolean_lexical(lexical: &str) -> bool {
    matches!(lexical.trim(), "true" | "1")
}

pub(crate) fn read_bool(node: &Node) -> WireResult<bool> {
    const TARGET: &str = "bool";
    let literal: &Literal = node.as_literal().ok_or_else(|| mismatch(node, TARGET))?;
    let datatype = literal.datatype().as_str();
    let lexical = literal.lexical().trim();

    if datatype == xsd::BOOLEAN {
        return Ok(boolean_lexical(lexical));
    }
    if xsd::is_numeric(datatype) {
        return read_number(node, TARGET).map(|n| n.is_truthy());
    }
    if xsd::is_string_like(datatype) {
        if lexical.eq_ignore_ascii_case("true") || lexical.eq_ignore_ascii_case("yes") {
            return Ok(true);
        }
        if lexical.eq_ignore_ascii_case("false") || lexical.eq_ignore_ascii_case("no") {
            return Ok(false);
        }
        return parse_untyped(lexical).map(|n| n.is_truthy()).ok_or_else(|| {
            marshal_error(
                node,
                TARGET,
                LexicalError::new(format!("not a boolean: {:?}", lexical)),
            )
        });
    }
    Err(mismatch(node, TARGET))
}
