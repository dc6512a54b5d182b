//! Error types returned by the parsing, serializing and reassembly
//! operations of this crate.
//!
//! The older, flat [`ReadError`]/[`WriteError`]/[`ValueError`] enums and the
//! newer, layer-scoped [`SomeipSliceError`]/[`LenError`] family currently
//! coexist: lower level SD entry/option parsing still reports through the
//! flat enums, while the SOMEIP header/slice layer and the code built on top
//! of it (TP reassembly, the SD message model) have moved to the scoped
//! errors. Both are part of the public API.

mod layer;
pub use layer::*;

mod len_error;
pub use len_error::*;

mod len_source;
pub use len_source::*;

mod netlink_error;
pub use netlink_error::*;

mod read_error;
pub use read_error::*;

mod runtime_error;
pub use runtime_error::*;

mod sd_add_entry_error;
pub use sd_add_entry_error::*;

mod sd_read_error;
pub use sd_read_error::*;

mod sd_value_error;
pub use sd_value_error::*;

mod sd_write_error;
pub use sd_write_error::*;

mod slice_write_space_error;
pub use slice_write_space_error::*;

mod someip_header_error;
pub use someip_header_error::*;

mod someip_header_read_error;
pub use someip_header_read_error::*;

mod someip_slice_error;
pub use someip_slice_error::*;

mod tp_buf_config_error;
pub use tp_buf_config_error::*;

mod tp_offset_not_multiple_of_16_error;
pub use tp_offset_not_multiple_of_16_error::*;

mod tp_reassemble_error;
pub use tp_reassemble_error::*;

mod tp_segment_error;
pub use tp_segment_error::*;

mod value_error;
pub use value_error::*;

mod write_error;
pub use write_error::*;
