//! Textual renderings of a UUID and their inverse

use std::{fmt, str};

use serde::{Deserialize, Serialize};

use crate::error::UuidError;
use crate::Uuid;

/// Textual variants a UUID can be rendered in.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UuidFormat {
    /// `550e8400-e29b-41d4-a716-446655440000`
    #[default]
    Standard,
    /// `550E8400-E29B-41D4-A716-446655440000`
    Uppercase,
    /// `550e8400-e29b-41d4-a716-446655440000`
    Lowercase,
    /// `550e8400e29b41d4a716446655440000`
    NoHyphens,
    /// `{550e8400-e29b-41d4-a716-446655440000}`
    Braces,
    /// `[550e8400-e29b-41d4-a716-446655440000]`
    Brackets,
}

impl UuidFormat {
    pub const ALL: [Self; 6] = [
        Self::Standard,
        Self::Uppercase,
        Self::Lowercase,
        Self::NoHyphens,
        Self::Braces,
        Self::Brackets,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Uppercase => "uppercase",
            Self::Lowercase => "lowercase",
            Self::NoHyphens => "no-hyphens",
            Self::Braces => "braces",
            Self::Brackets => "brackets",
        }
    }
}

impl fmt::Display for UuidFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl str::FromStr for UuidFormat {
    type Err = UuidError;

    fn from_str(src: &str) -> Result<Self, Self::Err> {
        let lower = src.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|e| e.as_str() == lower)
            .ok_or_else(|| UuidError::UnsupportedFormat(src.to_owned()))
    }
}

/// Renders `uuid` in the requested format.
pub fn format(uuid: &Uuid, format: UuidFormat) -> String {
    let canonical = uuid.encode();
    match format {
        UuidFormat::Standard | UuidFormat::Lowercase => canonical.to_string(),
        UuidFormat::Uppercase => canonical.to_ascii_uppercase(),
        UuidFormat::NoHyphens => canonical.replace('-', ""),
        UuidFormat::Braces => format!("{{{canonical}}}"),
        UuidFormat::Brackets => format!("[{canonical}]"),
    }
}

/// Brings arbitrary UUID-like text to the lowercase 8-4-4-4-12 form.
///
/// Surrounding whitespace and matching pairs of braces or brackets are removed, and hyphens are
/// re-inserted into 32-digit hex strings. Anything else is passed through lowercased; checking
/// the result is up to the caller. Applying it twice gives the same result as applying it once.
pub fn normalize(text: &str) -> String {
    let mut inner = text.trim();
    while let Some(e) = strip_wrapper(inner) {
        inner = e.trim();
    }
    let lower = inner.to_ascii_lowercase();

    if lower.len() == 32 && lower.bytes().all(|b| b.is_ascii_hexdigit()) {
        format!(
            "{}-{}-{}-{}-{}",
            &lower[..8],
            &lower[8..12],
            &lower[12..16],
            &lower[16..20],
            &lower[20..]
        )
    } else {
        lower
    }
}

/// Guesses the format `text` is written in from its shape alone.
pub fn detect(text: &str) -> UuidFormat {
    let trimmed = text.trim();
    if strip_pair(trimmed, '{', '}').is_some() {
        UuidFormat::Braces
    } else if strip_pair(trimmed, '[', ']').is_some() {
        UuidFormat::Brackets
    } else if !trimmed.contains('-') {
        UuidFormat::NoHyphens
    } else if trimmed.bytes().any(|b| b.is_ascii_uppercase()) {
        UuidFormat::Uppercase
    } else {
        UuidFormat::Standard
    }
}

fn strip_wrapper(text: &str) -> Option<&str> {
    strip_pair(text, '{', '}')
        .or_else(|| strip_pair(text, '[', ']'))
}

fn strip_pair(text: &str, open: char, close: char) -> Option<&str> {
    text.strip_prefix(open)?.strip_suffix(close)
}

#[cfg(test)]
mod tests {
    use super::{detect, format, normalize, UuidFormat};
    use crate::Uuid;

    const CANONICAL: &str = "550e8400-e29b-41d4-a716-446655440000";

    /// Renders every format
    #[test]
    fn renders_every_format() {
        let e: Uuid = CANONICAL.parse().unwrap();
        let cases = [
            (UuidFormat::Standard, CANONICAL),
            (UuidFormat::Lowercase, CANONICAL),
            (UuidFormat::Uppercase, "550E8400-E29B-41D4-A716-446655440000"),
            (UuidFormat::NoHyphens, "550e8400e29b41d4a716446655440000"),
            (UuidFormat::Braces, "{550e8400-e29b-41d4-a716-446655440000}"),
            (UuidFormat::Brackets, "[550e8400-e29b-41d4-a716-446655440000]"),
        ];
        for (f, text) in cases {
            assert_eq!(format(&e, f), text);
            assert_eq!(normalize(text), CANONICAL);
        }
    }

    /// Normalizes idempotently
    #[test]
    fn normalizes_idempotently() {
        let cases = [
            CANONICAL,
            "  {550E8400-E29B-41D4-A716-446655440000}\n",
            "[550e8400e29b41d4a716446655440000]",
            "not-a-uuid",
            "{unbalanced]",
            "{{550e8400-e29b-41d4-a716-446655440000}}",
            "{ 550e8400-e29b-41d4-a716-446655440000 }",
            "[{550E8400E29B41D4A716446655440000}]",
            "{}",
            "",
        ];
        for e in cases {
            let once = normalize(e);
            assert_eq!(normalize(&once), once);
        }
        assert_eq!(normalize("{unbalanced]"), "{unbalanced]");
        assert_eq!(normalize("{{550e8400-e29b-41d4-a716-446655440000}}"), CANONICAL);
        assert_eq!(normalize("{ 550e8400-e29b-41d4-a716-446655440000 }"), CANONICAL);
    }

    /// Leaves non-hex text of hyphenless length alone
    #[test]
    fn leaves_non_hex_text_of_hyphenless_length_alone() {
        let text = "550e8400e29b41d4a716446655440zzz";
        assert_eq!(normalize(text), text);
    }

    /// Detects formats from shape
    #[test]
    fn detects_formats_from_shape() {
        assert_eq!(detect(CANONICAL), UuidFormat::Standard);
        assert_eq!(detect("550E8400-E29B-41D4-A716-446655440000"), UuidFormat::Uppercase);
        assert_eq!(detect("550e8400e29b41d4a716446655440000"), UuidFormat::NoHyphens);
        assert_eq!(detect("{550E8400-E29B-41D4-A716-446655440000}"), UuidFormat::Braces);
        assert_eq!(detect("[550e8400-e29b-41d4-a716-446655440000]"), UuidFormat::Brackets);
    }

    /// Parses format names
    #[test]
    fn parses_format_names() {
        for f in UuidFormat::ALL {
            assert_eq!(f.as_str().parse::<UuidFormat>().unwrap(), f);
            assert_eq!(f.to_string().to_uppercase().parse::<UuidFormat>().unwrap(), f);
        }
        assert!("base64".parse::<UuidFormat>().is_err());
    }
}
