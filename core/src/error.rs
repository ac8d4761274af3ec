use thiserror::Error;

use crate::MAX_PRECISION;

pub type Result<T> = std::result::Result<T, TokenError>;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Failed to parse token source {source_name}: {error}")]
    Parse {
        source_name: String,
        #[source]
        error: serde_json::Error,
    },

    #[error("Invalid token {token}: {reason}")]
    InvalidDescriptor { token: String, reason: String },

    #[error("Token {token} has no value for breakpoint {breakpoint}")]
    MissingBreakpointValue { token: String, breakpoint: String },

    #[error("Token {token} is defined more than once (again in {source_name})")]
    DuplicateToken { token: String, source_name: String },

    #[error("Tokens {first} and {second} both map to the CSS property {property}")]
    DuplicateIdentifier {
        property: String,
        first: String,
        second: String,
    },

    #[error("Invalid breakpoints: {0}")]
    InvalidBreakpoints(String),

    #[error("Precision {0} is above the maximum of {MAX_PRECISION}")]
    InvalidPrecision(u32),
}

impl TokenError {
    pub(crate) fn invalid(token: impl Into<String>, reason: impl Into<String>) -> Self {
        TokenError::InvalidDescriptor {
            token: token.into(),
            reason: reason.into(),
        }
    }

    /// Errors that only concern one token, and so fall under the invalid-token policy.
    pub fn is_token_scoped(&self) -> bool {
        matches!(
            self,
            TokenError::InvalidDescriptor { .. } | TokenError::MissingBreakpointValue { .. }
        )
    }
}
