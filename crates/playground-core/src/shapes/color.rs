//! RGBA colors serialized as CSS hex strings.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Serializable color representation (RGBA8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

/// Error returned for strings that are not `#rgb`, `#rrggbb` or `#rrggbbaa`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid color: {0}")]
pub struct ColorParseError(pub String);

impl SerializableColor {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    pub fn black() -> Self {
        Self::rgb(0, 0, 0)
    }

    pub fn white() -> Self {
        Self::rgb(255, 255, 255)
    }

    /// Format as `#rrggbb`, or `#rrggbbaa` when not opaque.
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

impl FromStr for SerializableColor {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ColorParseError(s.to_string());
        let hex = s.trim().strip_prefix('#').ok_or_else(err)?;
        if !hex.is_ascii() {
            return Err(err());
        }
        let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).map_err(|_| err());
        match hex.len() {
            3 => {
                let nibble = |i: usize| channel(i..i + 1).map(|v| v * 17);
                Ok(Self::rgb(nibble(0)?, nibble(1)?, nibble(2)?))
            }
            6 => Ok(Self::rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?)),
            8 => Ok(Self::new(channel(0..2)?, channel(2..4)?, channel(4..6)?, channel(6..8)?)),
            _ => Err(err()),
        }
    }
}

impl fmt::Display for SerializableColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for SerializableColor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for SerializableColor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_forms() {
        assert_eq!("#aabbcc".parse(), Ok(SerializableColor::rgb(0xaa, 0xbb, 0xcc)));
        assert_eq!("#abc".parse(), Ok(SerializableColor::rgb(0xaa, 0xbb, 0xcc)));
        assert_eq!("#00000080".parse(), Ok(SerializableColor::new(0, 0, 0, 0x80)));
        assert!("aabbcc".parse::<SerializableColor>().is_err());
        assert!("#zzzzzz".parse::<SerializableColor>().is_err());
    }

    #[test]
    fn test_hex_output() {
        assert_eq!(SerializableColor::rgb(0xaa, 0xbb, 0xcc).to_hex(), "#aabbcc");
        assert_eq!(SerializableColor::new(1, 2, 3, 4).to_hex(), "#01020304");
    }

    #[test]
    fn test_serde_as_string() {
        let json = serde_json::to_string(&SerializableColor::white()).unwrap();
        assert_eq!(json, "\"#ffffff\"");
        let back: SerializableColor = serde_json::from_str(&json).unwrap();
        assert_eq!(back, SerializableColor::white());
    }
}
