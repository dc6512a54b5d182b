/// Errors that can occur when adding an entry to an [`crate::sd::SdHeader`]
/// via [`crate::sd::SdHeader::add_entry`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SdAddEntryError {
    /// Adding the entry (and any newly required options) would make the
    /// header's serialized size exceed the configured UDP SD payload cap.
    SdSizeCapExceeded { cap: usize, would_be: usize },
}

impl core::fmt::Display for SdAddEntryError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            SdAddEntryError::SdSizeCapExceeded { cap, would_be } => write!(
                f,
                "adding the sd entry would grow the serialized sd message to {} bytes, exceeding the configured cap of {} bytes",
                would_be, cap
            ),
        }
    }
}

impl std::error::Error for SdAddEntryError {}
