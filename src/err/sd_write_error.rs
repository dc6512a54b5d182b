use super::*;

/// Errors that can occur when serializing a someip & tp header.
#[derive(Debug)]
pub enum SdWriteError {
    IoError(std::io::Error),
    ///The slice length was not large enough to write the header.
    UnexpectedEndOfSlice(usize),
    /// Error in the data that was attempted to be written
    ValueError(SdValueError),
}

impl From<std::io::Error> for SdWriteError {
    fn from(err: std::io::Error) -> SdWriteError {
        SdWriteError::IoError(err)
    }
}

impl From<SdValueError> for SdWriteError {
    fn from(err: SdValueError) -> SdWriteError {
        SdWriteError::ValueError(err)
    }
}
