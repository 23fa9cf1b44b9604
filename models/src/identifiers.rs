// models/src/identifiers.rs

use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::{ValidationError, ValidationResult};

/// Minimum number of digits in the display form of an identity.
pub const MIN_SEQUENCE_WIDTH: usize = 4;

/// The collection a record belongs to. Each kind owns a one-letter identity
/// prefix and a table in the record store.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub enum RecordKind {
    Patient,
    Doctor,
    Appointment,
}

impl RecordKind {
    pub const ALL: [RecordKind; 3] = [RecordKind::Patient, RecordKind::Doctor, RecordKind::Appointment];

    pub fn prefix(self) -> char {
        match self {
            RecordKind::Patient => 'P',
            RecordKind::Doctor => 'D',
            RecordKind::Appointment => 'A',
        }
    }

    pub fn from_prefix(prefix: char) -> Option<Self> {
        RecordKind::ALL.into_iter().find(|kind| kind.prefix() == prefix)
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RecordKind::Patient => "Patient",
            RecordKind::Doctor => "Doctor",
            RecordKind::Appointment => "Appointment",
        };
        f.write_str(name)
    }
}

/// A human-readable record identity such as `P0001`, `D0012` or `A0100`.
///
/// Identities order by kind first and then numerically by sequence, so
/// `A10000` sorts after `A9999` even though the string form is longer.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Ord, PartialOrd)]
pub struct RecordId {
    kind: RecordKind,
    sequence: u32,
}

impl RecordId {
    /// Creates an identity from its parts. Sequences start at 1.
    pub fn new(kind: RecordKind, sequence: u32) -> Self {
        RecordId { kind, sequence }
    }

    /// Parses an identity and checks it belongs to `expected`.
    pub fn parse_as(value: &str, expected: RecordKind) -> ValidationResult<Self> {
        let id = RecordId::from_str(value)?;
        if id.kind != expected {
            return Err(ValidationError::WrongIdentifierKind {
                expected,
                found: value.to_string(),
            });
        }
        Ok(id)
    }

    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    pub fn sequence(&self) -> u32 {
        self.sequence
    }
}

impl FromStr for RecordId {
    type Err = ValidationError;

    fn from_str(s: &str) -> ValidationResult<Self> {
        let invalid = || ValidationError::InvalidIdentifier(s.to_string());
        let trimmed = s.trim();
        let mut chars = trimmed.chars();
        let kind = chars.next().and_then(RecordKind::from_prefix).ok_or_else(invalid)?;
        let digits = chars.as_str();
        if digits.len() < MIN_SEQUENCE_WIDTH || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let sequence: u32 = digits.parse().map_err(|_| invalid())?;
        if sequence == 0 {
            return Err(invalid());
        }
        Ok(RecordId { kind, sequence })
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:0width$}", self.kind.prefix(), self.sequence, width = MIN_SEQUENCE_WIDTH)
    }
}

impl From<RecordId> for String {
    fn from(value: RecordId) -> Self {
        value.to_string()
    }
}

impl Serialize for RecordId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        RecordId::from_str(&raw).map_err(serde::de::Error::custom)
    }
}
