/// Source of the length that was used to determine if enough data
/// is available (e.g. the length of the slice passed in, or a length
/// value read from an enclosing header).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum LenSource {
    /// Length was derived from the slice length.
    Slice,
    /// Length was derived from the `length` field of a SOMEIP header.
    SomeipHeaderLength,
}
