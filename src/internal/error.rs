use thiserror::Error;

use crate::schema::types::Type;

/// Unified error type for the tydefaults library.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// A value could not be converted to the requested type.
    #[error("Conversion Error: {0}")]
    ConversionError(String),

    /// The assembled result does not conform to the declared type of a defaults node.
    #[error("Mismatch Error: cannot use {source_type} as {target_type}: {message}")]
    MismatchError {
        source_type: Type,
        target_type: Type,
        message: String,
    },

    /// Error related to applier configuration.
    #[error("Config Error: {0}")]
    ConfigError(String),

    /// Error related to JSON encoding/decoding of values.
    #[error("Json Error: {0}")]
    JsonError(String),
}

/// A specialized `Result` type for tydefaults operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::JsonError(err.to_string())
    }
}

impl Error {
    /// Builds a mismatch error for a value of type `got` that does not fit `want`.
    pub fn mismatch(got: &Type, want: &Type) -> Self {
        Error::MismatchError {
            source_type: got.clone(),
            target_type: want.clone(),
            message: crate::convert::mismatch_message(got, want),
        }
    }
}

/*
Panic policy:

Recoverable failures (bad runtime values, bad configuration) are returned as
Result<T, Error>. A conversion failure in the plain apply path means the
defaults tree disagrees with its own declared types; that is a construction
defect, not a runtime condition, and Defaults::apply panics on it.
*/

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mismatch_names_both_types() {
        let err = Error::mismatch(&Type::String, &Type::Number);
        let text = err.to_string();
        assert!(text.contains("string"));
        assert!(text.contains("number"));
    }

    #[test]
    fn test_mismatch_renders_structural_types() {
        let got = Type::object([("a", Type::String)]);
        let want = Type::object_with_optional([("a", Type::Number)], ["a"]);
        assert_eq!(
            Error::mismatch(&got, &want).to_string(),
            "Mismatch Error: cannot use object {a: string} as object {a?: number}: \
             attribute \"a\": number required, but have string"
        );
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::JsonError(_)));
    }
}
