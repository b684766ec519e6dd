//! Crate error type.
//!
//! Most failure conditions in this crate are encoded as `bool`/`Option`
//! return values (unknown ids, invalid registrations) or contained per
//! callback. `Error` covers the few operations that can genuinely fail:
//! building a module and changing its configuration.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid props: {0}")]
    InvalidProps(#[from] serde_json::Error),

    #[error("Props must be a JSON object, got {0}")]
    NotAnObject(&'static str),

    #[error("Parent module is already destroyed")]
    ParentDestroyed,

    #[error("Module '{0}' is destroyed")]
    Destroyed(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Name of a JSON value's type, for error messages.
pub(crate) fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
