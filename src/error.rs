use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("operation not supported: {operation}")]
    Unsupported { operation: &'static str },

    #[error("index {index} is out of range for length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("invariant violated: {reason}")]
    InvariantViolation { reason: String },
}

impl Error {
    #[must_use]
    pub fn unsupported(operation: &'static str) -> Self {
        Self::Unsupported { operation }
    }

    #[must_use]
    pub fn invariant(reason: impl Into<String>) -> Self {
        Self::InvariantViolation {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages() {
        assert_eq!(
            Error::unsupported("move").to_string(),
            "operation not supported: move"
        );
        assert_eq!(
            Error::IndexOutOfRange { index: 3, len: 2 }.to_string(),
            "index 3 is out of range for length 2"
        );
        assert_eq!(
            Error::invariant("batched edit").to_string(),
            "invariant violated: batched edit"
        );
    }
}
