#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum TpSegmentError {
    /// Error if the requested maximum segment length is zero or not a
    /// multiple of 16 (every non-final TP offset must be a multiple of 16).
    InvalidMaxSegmentLen(u32),

    /// Error if an intermediate (non-final) segment's payload length is not
    /// a multiple of 16. Should not normally happen as long as
    /// `max_segment_len` itself is a multiple of 16, kept as a defensive
    /// check mirroring [`crate::err::TpReassembleError::UnalignedTpPayloadLen`]
    /// on the receiving side.
    UnalignedSegment { offset: u32, payload_len: usize },
}

impl core::fmt::Display for TpSegmentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use TpSegmentError::*;
        match self {
            InvalidMaxSegmentLen(max) => write!(
                f,
                "TP segmenter maximum segment length {max} must be non-zero and a multiple of 16."
            ),
            UnalignedSegment { offset, payload_len } => write!(
                f,
                "TP segment at offset {offset} has payload length {payload_len}, which is not a multiple of 16."
            ),
        }
    }
}

impl std::error::Error for TpSegmentError {}
