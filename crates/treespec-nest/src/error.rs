#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NestError {
    /// The rule string is not a sequence of `{path,max}` groups.
    #[error("at byte {index}: {message}")]
    Syntax { index: usize, message: String },

    /// A position token that is neither `R`, `*` nor a number.
    #[error("position token {token:?} is not `R`, `*` or a number")]
    InvalidToken { token: String },

    #[error("nest rule compiled to an invalid pattern: {0}")]
    Regex(String),
}
