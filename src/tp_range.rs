/// Describing the range of received data in an TP stream.
#[derive(Debug, Copy, Clone, Eq, Hash, PartialEq, Ord, PartialOrd)]
pub struct TpRange {
    /// Offset of section
    pub start: u32,
    /// Offset + length of section
    pub end: u32,
}

impl TpRange {
    /// Return if the value is contained within the section.
    fn is_value_connected(&self, value: u32) -> bool {
        self.start <= value && self.end >= value
    }

    /// Combine both sections if possible.
    pub fn merge(&self, other: TpRange) -> Option<TpRange> {
        if self.is_value_connected(other.start)
            || self.is_value_connected(other.end)
            || other.is_value_connected(self.start)
            || other.is_value_connected(self.end)
        {
            Some(TpRange {
                start: core::cmp::min(self.start, other.start),
                end: core::cmp::max(self.end, other.end),
            })
        } else {
            None
        }
    }
}
