//! Value formats for serializing cached data.
//!
//! [`Format`] is object-safe so adapters can hold `Box<dyn Format>` chosen at
//! runtime. Typed `serialize`/`deserialize` come from the blanket
//! [`FormatExt`] extension, built on `erased-serde`.

use cachebox_core::Raw;
use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;

mod json;
mod ron;

pub use json::JsonFormat;
pub use ron::RonFormat;

/// Value serialization error.
#[derive(Error, Debug)]
pub enum FormatError {
    /// Value could not be encoded.
    #[error(transparent)]
    Serialize(Box<dyn std::error::Error + Send + Sync>),

    /// Stored bytes could not be decoded into the requested type.
    #[error(transparent)]
    Deserialize(Box<dyn std::error::Error + Send + Sync>),
}

/// Unique identifier for format types, used to compare format equality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatTypeId {
    /// [`JsonFormat`].
    Json,
    /// [`RonFormat`].
    Ron,
    /// For user-defined custom formats. The string should be a unique identifier.
    Custom(&'static str),
}

/// Object-safe format trait (uses erased-serde for type erasure)
/// This trait can be used with `&dyn Format` for dynamic dispatch
pub trait Format: std::fmt::Debug + Send + Sync {
    /// Provides access to a serializer via a callback to avoid lifetime issues
    fn with_serializer(
        &self,
        f: &mut dyn FnMut(&mut dyn erased_serde::Serializer) -> Result<(), FormatError>,
    ) -> Result<Raw, FormatError>;

    /// Provides access to a deserializer via a callback to avoid lifetime issues
    fn with_deserializer(
        &self,
        data: &[u8],
        f: &mut dyn FnMut(&mut dyn erased_serde::Deserializer<'_>) -> Result<(), FormatError>,
    ) -> Result<(), FormatError>;

    /// Clone this format into a box (for object safety)
    fn clone_box(&self) -> Box<dyn Format>;

    /// Returns a unique identifier for this format type.
    fn format_type_id(&self) -> FormatTypeId;
}

/// Extension trait providing generic serialize/deserialize methods
/// This is automatically implemented for all Format types
pub trait FormatExt: Format {
    /// Serializes a value into raw bytes.
    fn serialize<T>(&self, value: &T) -> Result<Raw, FormatError>
    where
        T: Serialize,
    {
        self.with_serializer(&mut |serializer| {
            let erased = value as &dyn erased_serde::Serialize;
            erased
                .erased_serialize(serializer)
                .map_err(|error| FormatError::Serialize(Box::new(error)))
        })
    }

    /// Deserializes raw bytes into a value.
    fn deserialize<T>(&self, data: &Raw) -> Result<T, FormatError>
    where
        T: DeserializeOwned,
    {
        let mut result: Option<T> = None;
        self.with_deserializer(data, &mut |deserializer| {
            let value = erased_serde::deserialize::<T>(deserializer)
                .map_err(|error| FormatError::Deserialize(Box::new(error)))?;
            result = Some(value);
            Ok(())
        })?;

        result.ok_or_else(|| {
            FormatError::Deserialize(Box::new(std::io::Error::other(
                "deserialization produced no result",
            )))
        })
    }
}

// Blanket implementation: all Formats automatically get generic methods
impl<T: Format + ?Sized> FormatExt for T {}

impl Clone for Box<dyn Format> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

impl Format for Box<dyn Format> {
    fn with_serializer(
        &self,
        f: &mut dyn FnMut(&mut dyn erased_serde::Serializer) -> Result<(), FormatError>,
    ) -> Result<Raw, FormatError> {
        (**self).with_serializer(f)
    }

    fn with_deserializer(
        &self,
        data: &[u8],
        f: &mut dyn FnMut(&mut dyn erased_serde::Deserializer<'_>) -> Result<(), FormatError>,
    ) -> Result<(), FormatError> {
        (**self).with_deserializer(data, f)
    }

    fn clone_box(&self) -> Box<dyn Format> {
        (**self).clone_box()
    }

    fn format_type_id(&self) -> FormatTypeId {
        (**self).format_type_id()
    }
}

impl Format for std::sync::Arc<dyn Format> {
    fn with_serializer(
        &self,
        f: &mut dyn FnMut(&mut dyn erased_serde::Serializer) -> Result<(), FormatError>,
    ) -> Result<Raw, FormatError> {
        (**self).with_serializer(f)
    }

    fn with_deserializer(
        &self,
        data: &[u8],
        f: &mut dyn FnMut(&mut dyn erased_serde::Deserializer<'_>) -> Result<(), FormatError>,
    ) -> Result<(), FormatError> {
        (**self).with_deserializer(data, f)
    }

    fn clone_box(&self) -> Box<dyn Format> {
        (**self).clone_box()
    }

    fn format_type_id(&self) -> FormatTypeId {
        (**self).format_type_id()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Person {
        name: String,
        age: u8,
    }

    fn jacob() -> Person {
        Person {
            name: "Jacob".to_owned(),
            age: 30,
        }
    }

    #[test]
    fn json_is_textual() {
        let raw = JsonFormat.serialize(&jacob()).unwrap();
        assert_eq!(&raw[..], br#"{"name":"Jacob","age":30}"#);
        assert_eq!(JsonFormat.deserialize::<Person>(&raw).unwrap(), jacob());
    }

    #[test]
    fn ron_through_trait_object() {
        let format: Box<dyn Format> = Box::new(RonFormat);
        let raw = format.serialize(&jacob()).unwrap();
        assert_eq!(format.deserialize::<Person>(&raw).unwrap(), jacob());
        assert_eq!(format.clone().format_type_id(), FormatTypeId::Ron);
    }

    #[test]
    fn type_mismatch_is_a_deserialize_error() {
        let raw = JsonFormat.serialize(&"not a person").unwrap();
        let error = JsonFormat.deserialize::<Person>(&raw).unwrap_err();
        assert!(matches!(error, FormatError::Deserialize(_)));
    }
}
