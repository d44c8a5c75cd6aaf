//! Decoding of SOAP response text into typed values.
//!
//! Only the data types gateways actually use for statistics are decoded.
//! `ui1`, `ui2` and `ui4` all decode to `u64`: TR-064 devices report byte
//! counters declared as `ui4` that exceed the 32-bit range.

use std::fmt;

use serde::Serialize;

use crate::error::{Result, UpnpError};

/// Data type of a state variable, as declared in `<dataType>`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DataType {
    String,
    Boolean,
    Ui1,
    Ui2,
    Ui4,
    I4,
    DateTime,
    Uuid,
    /// Any tag the decoder does not handle, kept verbatim
    Other(String),
}

impl DataType {
    /// The tag as it appears in the SCPD
    pub fn as_str(&self) -> &str {
        match self {
            DataType::String => "string",
            DataType::Boolean => "boolean",
            DataType::Ui1 => "ui1",
            DataType::Ui2 => "ui2",
            DataType::Ui4 => "ui4",
            DataType::I4 => "i4",
            DataType::DateTime => "dateTime",
            DataType::Uuid => "uuid",
            DataType::Other(tag) => tag.as_str(),
        }
    }
}

impl From<&str> for DataType {
    fn from(tag: &str) -> Self {
        match tag.trim() {
            "string" => DataType::String,
            "boolean" => DataType::Boolean,
            "ui1" => DataType::Ui1,
            "ui2" => DataType::Ui2,
            "ui4" => DataType::Ui4,
            "i4" => DataType::I4,
            "dateTime" => DataType::DateTime,
            "uuid" => DataType::Uuid,
            other => DataType::Other(other.to_string()),
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for DataType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// A decoded output value
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Value {
    String(String),
    UInt(u64),
    Int(i64),
    Bool(bool),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::UInt(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Numeric reading of the value for gauge/counter style consumers.
    ///
    /// Booleans map to `1.0`/`0.0`; strings yield `None`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::UInt(v) => Some(*v as f64),
            Value::Int(v) => Some(*v as f64),
            Value::Bool(v) => Some(if *v { 1.0 } else { 0.0 }),
            Value::String(_) => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => f.write_str(s),
            Value::UInt(v) => write!(f, "{}", v),
            Value::Int(v) => write!(f, "{}", v),
            Value::Bool(v) => write!(f, "{}", v),
        }
    }
}

/// Decode `raw` according to `data_type`.
///
/// `boolean` is true only for the literal `"1"`; every other literal is false.
pub fn decode(raw: &str, data_type: &DataType) -> Result<Value> {
    match data_type {
        DataType::String | DataType::DateTime | DataType::Uuid => Ok(Value::String(raw.to_string())),
        DataType::Boolean => Ok(Value::Bool(raw == "1")),
        DataType::Ui1 | DataType::Ui2 | DataType::Ui4 => raw
            .trim()
            .parse::<u64>()
            .map(Value::UInt)
            .map_err(|e| invalid(raw, data_type, e)),
        DataType::I4 => raw
            .trim()
            .parse::<i64>()
            .map(Value::Int)
            .map_err(|e| invalid(raw, data_type, e)),
        DataType::Other(tag) => Err(UpnpError::UnknownDataType {
            data_type: tag.clone(),
            value: raw.to_string(),
        }),
    }
}

fn invalid(raw: &str, data_type: &DataType, err: std::num::ParseIntError) -> UpnpError {
    UpnpError::InvalidValue {
        data_type: data_type.to_string(),
        value: raw.to_string(),
        reason: err.to_string(),
    }
}
