use crate::ReturnCode;

/// Errors surfaced by the [`crate::runtime::Runtime`] factory (C4).
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RuntimeError {
    /// `create_response`/`create_error_response` was given a request whose
    /// return code already falls in the reserved range (0x40-0xff) that a
    /// request is not supposed to carry.
    ReservedReturnCodeInRequest(ReturnCode),

    /// `create_error_response` was asked to stamp a return code that is not
    /// actually an error (e.g. `ReturnCode::Ok`).
    NotAnErrorReturnCode(ReturnCode),
}

impl core::fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use RuntimeError::*;
        match self {
            ReservedReturnCodeInRequest(code) => write!(
                f,
                "cannot build a response: the request already carries the reserved return code {code:?}"
            ),
            NotAnErrorReturnCode(code) => write!(
                f,
                "cannot build an error response with non-error return code {code:?}"
            ),
        }
    }
}

impl std::error::Error for RuntimeError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fmt() {
        assert_eq!(
            format!(
                "{}",
                RuntimeError::ReservedReturnCodeInRequest(ReturnCode::Generic(0x41))
            ),
            "cannot build a response: the request already carries the reserved return code Generic(65)"
        );
        assert_eq!(
            format!("{}", RuntimeError::NotAnErrorReturnCode(ReturnCode::Ok)),
            "cannot build an error response with non-error return code Ok"
        );
    }

    #[test]
    fn source_is_none() {
        use std::error::Error;
        assert!(RuntimeError::NotAnErrorReturnCode(ReturnCode::Ok)
            .source()
            .is_none());
    }
}
