//! The structured record carried by a submission's data file.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Fields every submission must declare, in report order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RequiredField {
    Name,
    Breed,
    Image,
}

impl RequiredField {
    pub const ALL: [RequiredField; 3] =
        [RequiredField::Name, RequiredField::Breed, RequiredField::Image];

    /// JSON key of the field.
    pub fn as_str(&self) -> &'static str {
        match self {
            RequiredField::Name => "name",
            RequiredField::Breed => "breed",
            RequiredField::Image => "image",
        }
    }
}

impl fmt::Display for RequiredField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed submission.
///
/// A field is present only when the document holds a non-empty string under
/// its key. Anything else (absent key, `null`, number, empty string) is
/// recorded as `None` so rules can report it instead of tripping over it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Submission {
    pub name: Option<String>,
    pub breed: Option<String>,
    pub image: Option<String>,
}

impl Submission {
    /// Parse raw data-file text.
    ///
    /// Fails only when the text is not JSON at all. A JSON document that is
    /// not an object yields a submission with every field absent.
    pub fn parse(raw: &str) -> Result<Self, serde_json::Error> {
        let value: Value = serde_json::from_str(raw)?;
        Ok(Self::from_value(&value))
    }

    /// Extract the required fields from an already-parsed document.
    pub fn from_value(value: &Value) -> Self {
        let field = |key: &str| {
            value
                .get(key)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        Self {
            name: field("name"),
            breed: field("breed"),
            image: field("image"),
        }
    }

    pub fn field(&self, field: RequiredField) -> Option<&str> {
        match field {
            RequiredField::Name => self.name.as_deref(),
            RequiredField::Breed => self.breed.as_deref(),
            RequiredField::Image => self.image.as_deref(),
        }
    }

    /// Absent fields, in declaration order.
    pub fn missing_fields(&self) -> Vec<RequiredField> {
        RequiredField::ALL
            .into_iter()
            .filter(|f| self.field(*f).is_none())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.missing_fields().len() == RequiredField::ALL.len()
    }
}
