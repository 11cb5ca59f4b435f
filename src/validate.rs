//! Structural validation of UUID text

use serde::Serialize;

use crate::clock::{NodeId, TimeFields};
use crate::format::{self, UuidFormat};
use crate::{Uuid, Variant, Version};

const NIL: &str = "00000000-0000-0000-0000-000000000000";

/// Outcome of [`validate`].
///
/// Variant irregularities are listed in `errors` without clearing `is_valid`; callers should
/// treat them as warnings on an otherwise well-formed UUID.
#[derive(Clone, Eq, PartialEq, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    /// Format the input appears to be written in
    pub format: UuidFormat,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<Version>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant: Option<Variant>,
    /// Populated for version 1 UUIDs only
    #[serde(flatten)]
    pub time_fields: Option<TimeFields>,
    pub errors: Vec<String>,
    pub suggestions: Vec<String>,
}

impl ValidationResult {
    fn new(format: UuidFormat) -> Self {
        Self {
            is_valid: false,
            format,
            version: None,
            variant: None,
            time_fields: None,
            errors: Vec::new(),
            suggestions: Vec::new(),
        }
    }

    fn reject(mut self, error: impl Into<String>, suggestion: impl Into<String>) -> Self {
        self.is_valid = false;
        self.errors.push(error.into());
        self.suggestions.push(suggestion.into());
        self
    }
}

/// Checks whether `text` is a UUID and reports what it contains.
///
/// # Examples
///
/// ```rust
/// use uuidforge::{validate, UuidFormat, Version};
///
/// let result = validate("{550e8400-e29b-41d4-a716-446655440000}");
/// assert!(result.is_valid);
/// assert_eq!(result.format, UuidFormat::Braces);
/// assert_eq!(result.version, Some(Version::V4));
/// ```
pub fn validate(text: &str) -> ValidationResult {
    let result = ValidationResult::new(format::detect(text));
    if text.trim().is_empty() {
        return result.reject(
            "UUID is empty",
            "Paste a UUID such as 550e8400-e29b-41d4-a716-446655440000",
        );
    }

    let normalized = format::normalize(text);
    if normalized == NIL {
        return ValidationResult {
            is_valid: true,
            version: Some(Version::Nil),
            ..result
        };
    }

    let Ok(uuid) = normalized.parse::<Uuid>() else {
        return result.reject(
            "Invalid UUID format",
            "A UUID has 32 hexadecimal digits grouped 8-4-4-4-12, \
             e.g. 550e8400-e29b-41d4-a716-446655440000",
        );
    };

    let nibble = uuid.as_bytes()[6] >> 4;
    let Some(version) = Version::from_nibble(nibble) else {
        return result.reject(
            format!("Unknown UUID version: {nibble:x}"),
            "Supported versions are 1 to 5; the version is the first digit of the third group",
        );
    };

    let variant = uuid.variant();
    let mut result = ValidationResult {
        is_valid: true,
        version: Some(version),
        variant: Some(variant),
        ..result
    };
    match variant {
        Variant::Rfc4122 => {}
        Variant::Ncs => {
            result.errors.push(
                "Invalid variant bits: the fourth group must start with 8, 9, a or b".into(),
            );
        }
        Variant::Microsoft | Variant::Future => {
            result
                .errors
                .push("Non-standard variant: this range is reserved by RFC 4122".into());
        }
    }

    if version == Version::V1 {
        let (timestamp, clock_sequence, node) = uuid.fields_v1();
        result.time_fields = Some(TimeFields {
            timestamp,
            clock_sequence,
            node: NodeId(node),
        });
    }

    result
}
