//! Serde utilities for Boardlens.

use serde::de::{self, Visitor};
use serde::{Deserializer, Serializer};
use std::fmt;

/// Module to handle deserialization of upstream ids that might be strings or numbers.
///
/// The board backend is inconsistent about id types: the same asset id can
/// arrive as `"7"` in one payload and `7` in another. Everything is
/// normalized to a `String` on the way in.
pub mod string_or_number {
    use super::{Deserializer, Serializer, Visitor, de, fmt};

    /// Serializes the id as a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the serializer fails.
    pub fn serialize<S>(value: &str, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(value)
    }

    /// Deserializes an id from a string, integer or float.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not a string or number.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct StringOrNumberVisitor;

        impl Visitor<'_> for StringOrNumberVisitor {
            type Value = String;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a string or number id")
            }

            fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(value.to_string())
            }

            fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(value.to_string())
            }

            fn visit_f64<E>(self, value: f64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(value.to_string())
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(value.to_owned())
            }
        }

        deserializer.deserialize_any(StringOrNumberVisitor)
    }

    /// Handles optional ids with the same string-or-number tolerance.
    pub mod option {
        use super::{Deserializer, Serializer};
        use serde::Deserialize;

        /// Serializes an optional id as a string.
        ///
        /// # Errors
        ///
        /// Returns an error if the serializer fails.
        pub fn serialize<S>(value: &Option<String>, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            match value {
                Some(v) => serializer.serialize_some(v),
                None => serializer.serialize_none(),
            }
        }

        /// Deserializes an optional id from a string, number or null.
        ///
        /// # Errors
        ///
        /// Returns an error if the value is not a string, number or null.
        pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
        where
            D: Deserializer<'de>,
        {
            #[derive(Deserialize)]
            #[serde(untagged)]
            enum Raw {
                Str(String),
                Int(i64),
                UInt(u64),
                Float(f64),
            }

            let raw: Option<Raw> = Option::deserialize(deserializer)?;
            Ok(raw.map(|r| match r {
                Raw::Str(s) => s,
                Raw::Int(i) => i.to_string(),
                Raw::UInt(u) => u.to_string(),
                Raw::Float(f) => f.to_string(),
            }))
        }
    }
}
