// models/src/identifiers.rs

use core::ops::Deref;
use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::errors::{ValidationError, ValidationResult};

/// An identifier. Identifiers are non-blank strings (255 bytes max) that
/// reference a stored document, such as a patient, doctor or establishment.
/// Legacy documents carry arbitrary ids, so no particular format is imposed.
#[derive(Clone, Debug, Eq, Hash, PartialEq, Ord, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct Identifier(String);

impl Identifier {
    /// Creates a new identifier.
    ///
    /// # Errors
    /// Returns a `ValidationError` if `value` is blank or longer than 255
    /// bytes.
    pub fn new(value: String) -> ValidationResult<Self> {
        if value.len() > u8::MAX as usize {
            return Err(ValidationError::InvalidIdentifierLength);
        }
        if value.trim().is_empty() {
            return Err(ValidationError::InvalidIdentifierLength);
        }
        if value.contains('/') {
            return Err(ValidationError::InvalidIdentifier(value));
        }

        Ok(Self(value))
    }

    /// Generates a fresh random identifier for a new document.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Identifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Deref for Identifier {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromStr for Identifier {
    type Err = ValidationError;

    fn from_str(s: &str) -> ValidationResult<Self> {
        Self::new(s.to_string())
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Identifier> for String {
    fn from(value: Identifier) -> Self {
        value.0
    }
}

impl PartialEq<str> for Identifier {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Identifier {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl<'de> Deserialize<'de> for Identifier {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Identifier::new(value).map_err(serde::de::Error::custom)
    }
}
