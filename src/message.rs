//! Owning SOME/IP message value type (C3/C4).
//!
//! [`SomeipMsgSlice`] only ever borrows from a caller-owned buffer; the
//! runtime factory (`Runtime::create_request` & friends) and anything that
//! needs to hold on to a message past the lifetime of the datagram it was
//! read from needs a type that owns its payload. [`SomeipMessage`] is that
//! type, plus the runtime-only bookkeeping fields (`is_reliable`,
//! `is_initial`, `check_result`, `sec_client`, `env`) that never appear on
//! the wire (`spec.md` §3/§4.3).

use crate::*;

/// Security credentials of the local client that produced or is about to
/// consume a message. Mirrors the original stack's client identity
/// (`vsomeip_sec_client_t`) to the extent the distilled spec needs: enough
/// to let a security policy layer built on top of this crate tell local
/// clients apart. Populated by the endpoint layer, never read from the wire.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct SecClient {
    pub uid: u32,
    pub gid: u32,
}

/// An owning SOME/IP message: the header plus a payload buffer it owns, and
/// the runtime-only flags that travel with a message through this crate but
/// are never serialized onto the wire.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SomeipMessage {
    pub header: SomeipHeader,
    payload: Vec<u8>,

    /// Whether this message was (or should be) sent over a reliable
    /// (TCP) connection, as opposed to an unreliable (UDP) one. Chosen by
    /// the caller of the runtime factory, never encoded in the header.
    pub is_reliable: bool,

    /// Runtime-only flag: true for a message that has not been handed to
    /// the endpoint layer for sending/dispatch yet. Never set by
    /// [`SomeipMessage::read`] (a deserialized message was, by definition,
    /// already sent by its originator).
    pub is_initial: bool,

    /// E2E/security check result of the local security policy, stamped by
    /// the endpoint layer after validating an inbound message. `0` means
    /// "not checked" (the default for freshly created outbound messages).
    pub check_result: u8,

    /// Identity of the local client this message was sent by/is destined
    /// for, as reported by the security policy layer.
    pub sec_client: SecClient,

    /// Name of the network/VRF this message was received on or should be
    /// sent on. Empty for messages the runtime factory creates (the
    /// endpoint layer stamps it once it knows which network picked the
    /// message up).
    pub env: String,
}

impl SomeipMessage {
    /// Builds a message from a header and an owned payload, with every
    /// runtime-only field at its default (not reliable, not initial, no
    /// check result, default sec client, empty env). `header.length` is
    /// overwritten to match `payload`.
    pub fn new(mut header: SomeipHeader, payload: Vec<u8>) -> Self {
        header.length = SOMEIP_LEN_OFFSET_TO_PAYLOAD + payload.len() as u32;
        SomeipMessage {
            header,
            payload,
            is_reliable: false,
            is_initial: false,
            check_result: 0,
            sec_client: SecClient::default(),
            env: String::new(),
        }
    }

    /// The message's payload (everything after the header/TP header).
    #[inline]
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Replaces the payload, keeping `header.length` consistent with it.
    pub fn set_payload(&mut self, payload: Vec<u8>) {
        self.header.length = SOMEIP_LEN_OFFSET_TO_PAYLOAD + payload.len() as u32;
        self.payload = payload;
    }

    /// Consumes the message, returning its payload buffer.
    pub fn into_payload(self) -> Vec<u8> {
        self.payload
    }

    /// Serializes the header and payload to `writer` (§4.4 "Serializer").
    /// Runtime-only fields (`is_reliable`, `is_initial`, `check_result`,
    /// `sec_client`, `env`) are never written: they have no wire
    /// representation.
    pub fn write<T: std::io::Write>(&self, writer: &mut T) -> Result<(), std::io::Error> {
        self.header.write_raw(writer)?;
        writer.write_all(&self.payload)
    }

    /// Deserializes a message from `reader` (§4.4 "Deserializer"). The
    /// resulting message is never `is_initial` (it was necessarily already
    /// sent by its originator) and carries default runtime-only fields
    /// otherwise; callers (the endpoint layer) stamp `sec_client`/`env`/
    /// `check_result` once they know them.
    pub fn read<T: std::io::Read>(reader: &mut T) -> Result<Self, err::SomeipHeaderReadError> {
        let header = SomeipHeader::read(reader)?;
        let payload_len = (header.length - SOMEIP_LEN_OFFSET_TO_PAYLOAD) as usize
            - header.tp_header.as_ref().map_or(0, |_| TP_HEADER_LENGTH);
        let mut payload = vec![0u8; payload_len];
        reader
            .read_exact(&mut payload)
            .map_err(err::SomeipHeaderReadError::Io)?;
        Ok(SomeipMessage {
            header,
            payload,
            is_reliable: false,
            is_initial: false,
            check_result: 0,
            sec_client: SecClient::default(),
            env: String::new(),
        })
    }
}
