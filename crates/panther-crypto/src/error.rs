/// Errors from canonical encoding.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum EncodingError {
    /// NaN and infinities have no canonical form.
    #[error("non-finite number cannot be encoded")]
    NonFiniteNumber,

    #[error("value nesting exceeds {max} levels")]
    TooDeep { max: usize },

    /// Text that was expected to hold a JSON document did not parse.
    #[error("invalid JSON document: {0}")]
    InvalidJson(String),
}
