//! Sample - the unit of telemetry
//!
//! Fields keep their original text so that forwarding never reformats a value.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{ContractError, StreamKind};

/// Wire field separator
pub const FIELD_SEPARATOR: char = ',';

/// One textual field of a sample
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Field(String);

impl Field {
    /// Create a field from its textual representation
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Raw text as read
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric view of the field
    pub fn as_f64(&self) -> Option<f64> {
        self.0.trim().parse().ok()
    }
}

impl From<&str> for Field {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Field {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Timestamped telemetry record
///
/// Ordered fields; field 0 is the timestamp for the typed stream kinds.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Sample {
    fields: Vec<Field>,
}

impl Sample {
    /// Build a sample from already-validated fields
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    /// Build and validate a sample from raw fields
    ///
    /// # Errors
    /// `Format` if the fields do not match `kind`.
    pub fn from_fields<I, S>(fields: I, kind: StreamKind, origin: &str) -> Result<Self, ContractError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let fields: Vec<String> = fields.into_iter().map(Into::into).collect();
        kind.check(fields.as_slice())
            .map_err(|message| ContractError::format(origin, message))?;
        Ok(Self::new(fields.into_iter().map(Field).collect()))
    }

    /// Decode one wire payload
    ///
    /// # Errors
    /// `Format` on empty payloads or on a layout mismatch.
    pub fn parse_line(line: &str, kind: StreamKind) -> Result<Self, ContractError> {
        let line = line.trim_end_matches(['\r', '\n']);
        if line.is_empty() {
            return Err(ContractError::format("payload", "empty payload"));
        }
        Self::from_fields(line.split(FIELD_SEPARATOR), kind, "payload")
    }

    /// Encode as wire payload (comma join, no framing)
    pub fn encode(&self) -> String {
        let mut out = String::with_capacity(self.fields.iter().map(|f| f.0.len() + 1).sum());
        for (idx, field) in self.fields.iter().enumerate() {
            if idx > 0 {
                out.push(FIELD_SEPARATOR);
            }
            out.push_str(&field.0);
        }
        out
    }

    /// All fields in order
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Field at `index`
    pub fn field(&self, index: usize) -> Option<&Field> {
        self.fields.get(index)
    }

    /// Number of fields
    pub fn arity(&self) -> usize {
        self.fields.len()
    }

    /// Field 0 parsed as seconds, when numeric
    pub fn timestamp(&self) -> Option<f64> {
        self.field(0).and_then(Field::as_f64)
    }
}

impl fmt::Display for Sample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}
