use thiserror::Error;

pub type CoreResult<T> = Result<T, CoreError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Non-finite numeric value for {what}: {value}")]
    NonFinite { what: String, value: f64 },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: String },

    #[error("Duplicate parameter name: {name}")]
    DuplicateParam { name: String },

    #[error("Directory name '{name}' does not match grammar {grammar}")]
    GrammarMismatch { name: String, grammar: String },

    #[error("Value {value} cannot be encoded with grammar {grammar}")]
    Unencodable { value: f64, grammar: String },
}
