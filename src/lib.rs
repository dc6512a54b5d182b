//! A library for parsing & writing the SOME/IP network protocol (without
//! payload interpretation) including the SOME/IP-SD (service discovery) and
//! SOME/IP-TP (transport protocol / segmentation) sub-protocols.
//!
//! # Example
//!
//! ```
//! use someip_core::{SomeipMsgsIterator, err::SomeipSliceError};
//!
//! # let udp_payload = [0u8;0];
//! for someip_message in SomeipMsgsIterator::new(&udp_payload) {
//!     match someip_message {
//!         Ok(value) => {
//!             //the message is alright, you can access the fields and
//!             //payload via the slice now
//!             println!("{:?}", value.message_id());
//!         },
//!         Err(err) => {
//!             //a parsing error occurred
//!             match err {
//!                 SomeipSliceError::Len(len_err) => println!("{:?}", len_err),
//!                 SomeipSliceError::Content(content_err) => println!("{:?}", content_err),
//!             }
//!         }
//!     }
//! }
//! ```

pub mod err;

// The older, flat read/write/value error enums are still used directly by
// the SD entry/option parsing code and are kept available at the crate root
// alongside the newer layer-scoped errors in [`err`].
pub use err::{ReadError, ValueError, WriteError};

mod message_type;
pub use message_type::*;

mod return_code;
pub use return_code::*;

mod someip_header;
pub use someip_header::*;

mod someip_msg_slice;
pub use someip_msg_slice::*;

mod message;
pub use message::*;

mod someip_msgs_iterator;
pub use someip_msgs_iterator::*;

mod section_range;
pub use section_range::*;

mod tp_range;
pub use tp_range::*;

mod tp_buf_config;
pub use tp_buf_config::*;

mod tp_header;
pub use tp_header::*;

mod tp_buf;
pub use tp_buf::*;

mod tp_pool;
pub use tp_pool::*;

mod tp_segment;
pub use tp_segment::*;

mod sd_config;
pub use sd_config::*;

mod sd;
pub use sd::*;

mod runtime;
pub use runtime::*;

mod async_sender;
pub use async_sender::*;

#[cfg(target_os = "linux")]
mod netlink;
#[cfg(target_os = "linux")]
pub use netlink::*;

#[cfg(test)]
mod proptest_generators;

/// The protocol version supported & used by this library (currently 1, the
/// only protocol version specified so far).
pub const SOMEIP_PROTOCOL_VERSION: u8 = 1;

/// Number of bytes of the someip header that are not part of the `length`
/// field (the `length` field covers everything from the request id to the
/// end of the payload, so the message id & length field itself are excluded).
pub const SOMEIP_LEN_OFFSET_TO_PAYLOAD: u32 = 4 * 2; // 2x 32bits

/// Maximum payload length supported based on the maximum value the `length`
/// field can encode.
pub const SOMEIP_MAX_PAYLOAD_LEN: u32 = std::u32::MAX - SOMEIP_LEN_OFFSET_TO_PAYLOAD;

/// Maximum payload length of a SOME/IP message sent over UDP (bounded by the
/// maximum size of an IPv4/UDP datagram, 65535 bytes minus the 20 byte IPv4
/// header and 8 byte UDP header).
pub const SOMEIP_MAX_PAYLOAD_LEN_UDP: u32 = 65507;

/// Length of a SOMEIP header in bytes (message id, length, request id,
/// protocol version, interface version, message type and return code).
pub const SOMEIP_HEADER_LENGTH: usize = 4 * 4;

/// Length of the additional SOME/IP-TP header in bytes.
pub const TP_HEADER_LENGTH: usize = 4;

/// Flag in the message type byte signaling that a SOME/IP-TP header follows
/// the SOMEIP header (the message has been segmented).
pub const SOMEIP_HEADER_MESSAGE_TYPE_TP_FLAG: u8 = 0x20;

/// Message id reserved for SOME/IP service discovery (SOME/IP-SD) messages.
pub const SOMEIP_SD_MESSAGE_ID: u32 = 0xffff_8100;
