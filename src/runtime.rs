//! Process-wide factory creating headers/messages with stamped protocol and
//! interface versions (C4).
//!
//! Endpoint connection management, handler dispatch and the JSON
//! configuration layer that would normally feed `Runtime` its defaults are
//! all out of scope for this crate (see the module docs at the crate root);
//! `Runtime` only owns the bits of process-wide state the wire layer itself
//! needs: default interface version and the named-application registry.

use crate::err::RuntimeError;
use crate::{MessageType, ReturnCode, SomeipHeader, SomeipMessage};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock, Weak};

/// Lower bound of the reserved return code range (0x40-0xff, see
/// `spec.md` §3 "ReturnCode").
pub const RESERVED_RETURN_CODE_START: u8 = 0x40;

#[inline]
fn is_reserved_return_code(code: u8) -> bool {
    code >= RESERVED_RETURN_CODE_START
}

#[inline]
fn request_id(client: u16, session: u16) -> u32 {
    (u32::from(client) << 16) | u32::from(session)
}

#[inline]
fn client_id(request_id: u32) -> u16 {
    (request_id >> 16) as u16
}

#[inline]
fn session_id(request_id: u32) -> u16 {
    (request_id & 0xffff) as u16
}

/// A named application registration. Held by the caller; dropped from the
/// registry once the last clone goes away (the registry itself only stores
/// a [`Weak`] reference).
#[derive(Debug)]
pub struct AppHandle {
    name: String,
    // Kept so the Arc stays alive for as long as any AppHandle clone does;
    // the registry never reads the contents, only the Weak it derives from it.
    _keepalive: Arc<()>,
}

impl AppHandle {
    /// The (possibly suffixed) name this application was registered under.
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Process-wide registry + header factory.
///
/// A single instance is reachable through [`Runtime::get`], mirroring the
/// global runtime singleton the original stack exposes (see `spec.md` §9
/// "Global runtime singleton"). Construction never fails: all defaults are
/// applied lazily at first use.
pub struct Runtime {
    default_interface_version: Mutex<u8>,
    applications: Mutex<HashMap<String, Weak<()>>>,
}

static RUNTIME: OnceLock<Runtime> = OnceLock::new();

impl Runtime {
    /// Returns the process-wide [`Runtime`] instance, initializing it on
    /// first access.
    pub fn get() -> &'static Runtime {
        RUNTIME.get_or_init(|| Runtime {
            default_interface_version: Mutex::new(0x01),
            applications: Mutex::new(HashMap::new()),
        })
    }

    /// Current default interface (major) version stamped onto new requests
    /// and notifications.
    pub fn default_interface_version(&self) -> u8 {
        *self.default_interface_version.lock().unwrap()
    }

    /// Change the default interface version used by future
    /// `create_request`/`create_notification` calls.
    pub fn set_default_interface_version(&self, version: u8) {
        *self.default_interface_version.lock().unwrap() = version;
    }

    /// Build a `REQUEST` (or `REQUEST_NO_RETURN`) message stamped with the
    /// current protocol version, default interface version and `E_OK`, with
    /// an empty payload and `is_initial` set (the message has not been
    /// handed to the endpoint layer yet, §4.4 "create_request").
    pub fn create_request(
        &self,
        service_id: u16,
        method_id: u16,
        client: u16,
        session: u16,
        no_return: bool,
        is_reliable: bool,
    ) -> SomeipMessage {
        let header = SomeipHeader {
            message_id: (u32::from(service_id) << 16) | u32::from(method_id & 0x7fff),
            length: crate::SOMEIP_LEN_OFFSET_TO_PAYLOAD,
            request_id: request_id(client, session),
            interface_version: self.default_interface_version(),
            message_type: if no_return {
                MessageType::RequestNoReturn
            } else {
                MessageType::Request
            },
            return_code: ReturnCode::Ok.into(),
            tp_header: None,
        };
        let mut msg = SomeipMessage::new(header, Vec::new());
        msg.is_reliable = is_reliable;
        msg.is_initial = true;
        msg
    }

    /// Build a `NOTIFICATION` message (client id `0x0000`, event bit set),
    /// with an empty payload and `is_initial` set.
    pub fn create_notification(
        &self,
        service_id: u16,
        event_id: u16,
        is_reliable: bool,
    ) -> SomeipMessage {
        let header = SomeipHeader {
            message_id: (u32::from(service_id) << 16) | 0x8000 | u32::from(event_id & 0x7fff),
            length: crate::SOMEIP_LEN_OFFSET_TO_PAYLOAD,
            request_id: request_id(0, 0),
            interface_version: self.default_interface_version(),
            message_type: MessageType::Notification,
            return_code: ReturnCode::Ok.into(),
            tp_header: None,
        };
        let mut msg = SomeipMessage::new(header, Vec::new());
        msg.is_reliable = is_reliable;
        msg.is_initial = true;
        msg
    }

    /// Build a `RESPONSE` message mirroring `request`'s service/method,
    /// client, session, interface version and reliability (§4.4
    /// "create_response"), with an empty payload and `is_initial` set.
    pub fn create_response(
        &self,
        request: &SomeipMessage,
    ) -> Result<SomeipMessage, RuntimeError> {
        if is_reserved_return_code(request.header.return_code) {
            return Err(RuntimeError::ReservedReturnCodeInRequest(
                ReturnCode::Generic(request.header.return_code),
            ));
        }
        let header = SomeipHeader {
            message_id: request.header.message_id,
            length: crate::SOMEIP_LEN_OFFSET_TO_PAYLOAD,
            request_id: request.header.request_id,
            interface_version: request.header.interface_version,
            message_type: MessageType::Response,
            return_code: ReturnCode::Ok.into(),
            tp_header: None,
        };
        let mut msg = SomeipMessage::new(header, Vec::new());
        msg.is_reliable = request.is_reliable;
        msg.is_initial = true;
        Ok(msg)
    }

    /// Build an `ERROR` response mirroring `request`, with `code` (which
    /// must itself signal an error, i.e. not `E_OK`) as its return code, an
    /// empty payload and `is_initial` set.
    pub fn create_error_response(
        &self,
        request: &SomeipMessage,
        code: ReturnCode,
    ) -> Result<SomeipMessage, RuntimeError> {
        if matches!(code, ReturnCode::Ok) {
            return Err(RuntimeError::NotAnErrorReturnCode(code));
        }
        let header = SomeipHeader {
            message_id: request.header.message_id,
            length: crate::SOMEIP_LEN_OFFSET_TO_PAYLOAD,
            request_id: request.header.request_id,
            interface_version: request.header.interface_version,
            message_type: MessageType::Error,
            return_code: code.into(),
            tp_header: None,
        };
        let mut msg = SomeipMessage::new(header, Vec::new());
        msg.is_reliable = request.is_reliable;
        msg.is_initial = true;
        Ok(msg)
    }

    /// Build a payload buffer from `data`, ready to be handed to
    /// [`SomeipMessage::set_payload`] (§4.4 "create_payload"). This is a
    /// thin, allocation-owning wrapper: the runtime does not interpret
    /// payload bytes, it only owns the allocation on the caller's behalf.
    pub fn create_payload(&self, data: &[u8]) -> Vec<u8> {
        data.to_vec()
    }

    /// Register a named application, appending an incrementing numeric
    /// suffix (`name`, `name_1`, `name_2`, …) on collision with a still-live
    /// registration (§4.4 "Applications are tracked by name…").
    pub fn register_application(&self, name: &str) -> AppHandle {
        let mut apps = self.applications.lock().unwrap();
        apps.retain(|_, weak| weak.strong_count() > 0);

        let mut candidate = name.to_string();
        let mut suffix = 0usize;
        while apps.contains_key(&candidate) {
            suffix += 1;
            candidate = format!("{name}_{suffix}");
        }

        let keepalive = Arc::new(());
        apps.insert(candidate.clone(), Arc::downgrade(&keepalive));
        AppHandle {
            name: candidate,
            _keepalive: keepalive,
        }
    }

    /// Number of currently live application registrations.
    pub fn application_count(&self) -> usize {
        let mut apps = self.applications.lock().unwrap();
        apps.retain(|_, weak| weak.strong_count() > 0);
        apps.len()
    }
}
