use super::*;

/// Error when decoding an SOMEIP header & payload from a slice.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum SomeipSliceError {
    /// Error when an length error is encountered (e.g. unexpected
    /// end of slice).
    Len(LenError),

    /// Error caused by the contents of the header.
    Content(SomeipHeaderError),
}

impl core::fmt::Display for SomeipSliceError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        use SomeipSliceError::*;
        match self {
            Len(err) => err.fmt(f),
            Content(value) => value.fmt(f),
        }
    }
}

impl std::error::Error for SomeipSliceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        use SomeipSliceError::*;
        match self {
            Len(err) => Some(err),
            Content(err) => Some(err),
        }
    }
}
