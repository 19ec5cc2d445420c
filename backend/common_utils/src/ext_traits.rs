//! Extension traits for byte slices and serializable values.

use error_stack::ResultExt;
use serde::{Deserialize, Serialize};

use crate::errors::{CustomResult, ParsingError};

/// Extending functionalities of `[u8]` for performing parsing
pub trait ByteSliceExt {
    /// Convert `[u8]` into type `<T>` by using `serde::Deserialize`
    fn parse_struct<'de, T>(&'de self, type_name: &'static str) -> CustomResult<T, ParsingError>
    where
        T: Deserialize<'de>;
}

impl ByteSliceExt for [u8] {
    #[track_caller]
    fn parse_struct<'de, T>(&'de self, type_name: &'static str) -> CustomResult<T, ParsingError>
    where
        T: Deserialize<'de>,
    {
        serde_json::from_slice(self)
            .change_context(ParsingError::StructParseFailure(type_name))
            .attach_printable_lazy(|| {
                format!(
                    "Unable to parse {type_name} from &[u8] {:?}",
                    String::from_utf8_lossy(self)
                )
            })
    }
}

/// Encode interface
pub trait Encode<'e>
where
    Self: 'e + Serialize,
{
    /// Functionality, for specifically encoding `Self` into `serde_json::Value`
    fn encode_to_value(&'e self) -> CustomResult<serde_json::Value, ParsingError>;
}

impl<'e, A> Encode<'e> for A
where
    Self: 'e + Serialize,
{
    fn encode_to_value(&'e self) -> CustomResult<serde_json::Value, ParsingError> {
        serde_json::to_value(self)
            .change_context(ParsingError::EncodeError("json-value"))
            .attach_printable_lazy(|| format!("Unable to convert {} to a value", std::any::type_name::<A>()))
    }
}
