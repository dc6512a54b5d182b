use crate::{ReadError, ValueError, WriteError};
use std::io::{Read, Write, Seek};

///Length of someip sd header, flags + reserved + entries length + options length
///excluding entries and options arrays
pub const MIN_SD_HEADER_LENGTH: usize = 1 + 3 + 4 + 4;

pub const EVENT_ENTRY_INITIAL_DATA_REQUESTED_FLAG: u8 = 0b1000_0000;

/// Constants related to the flags in the sd header
pub mod flags {
    /// Reboot flag in the first byte of the sd header indicating
    /// that the session ids have not yet wrapped around since startup.
    pub const REBOOT_FLAG: u8 = 0b1000_0000;

    /// Unicast flag in the first byte of the sd header indicating
    /// that unicast is supported.
    ///
    /// # Note (from the SOMEIP SD specification):
    ///
    /// The Unicast Flag is left over from historical SOME/IP versions
    /// and is only kept for compatibility reasons. Its use besides this
    /// is very limited.
    pub const UNICAST_FLAG: u8 = 0b0100_0000;

    /// Explicit initial data control is supported.
    ///
    /// # Note:
    ///
    /// This flag has been removed in the release R21-11
    /// of the "SOME/IP Service Discovery Protocol Specification".
    pub const EXPLICIT_INITIAL_DATA_CONTROL_FLAG: u8 = 0b0010_0000;
}

/// Constants related to sd entries.
pub mod entries {
    /// Maximum entry length that is supported by the read & from slice functions.
    ///
    /// This constant is used to make sure no attacks with too large length
    /// values can trigger large allocations. E.g. if a some ip sd header
    /// with an entries length of 4 gigabytes gets passed to the `read` function
    /// it could triggering an allocation of 4 gigabytes. This allocation would then
    /// take a very long time or lead to a failure and potential crash.
    ///
    /// To prevent attacks like these the length gets checked against
    /// this constant before any allocation gets triggered.
    ///
    /// The maximum entry length is calculated from the fact that SOMEIP SD is
    /// only allowed via UDP and that the SOMEIP specification states the following
    /// conceirning the maximum payload size:
    ///
    /// > The size of the SOME/IP payload field depends on the transport protocol used.
    /// > With UDP the SOME/IP payload shall be between 0 and 1400 Bytes.
    ///
    /// With these facts we can calculcuate the maximum length of bytes
    /// the following way:
    ///
    /// `1400 - sd reserved & flags (4) - entries length(4) - options length(4)`
    ///
    /// For sd options array we assume an empty array.
    pub const MAX_ENTRIES_LEN: u32 = crate::SOMEIP_MAX_PAYLOAD_LEN_UDP - 4 - 4 - 4;

    /// Length of an sd entry (note that all entry types currently have
    /// the same length).
    pub const ENTRY_LEN: usize = 16;
}

/// Constants related to sd options.
pub mod options {
    use super::TransportProtocol;

    /// Maximum length of options array that is supported by the read & from slice functions.
    ///
    /// This constant is used to make sure no attacks with large length
    /// values can trigger large allocations. E.g. if a some ip sd header
    /// with an options array length of 4 gigabytes gets passed to the `read` function
    /// it could triggering an allocation of 4 gigabytes. This allocation would then
    /// take a very long time or lead to a failure and potential crash.
    ///
    /// To prevent attacks like these the length gets checked against
    /// this constant before any allocation gets triggered.
    ///
    /// The maximum entry length is calculated from the fact that SOMEIP SD is
    /// only allowed via UDP and that the SOMEIP specification states the following
    /// conceirning the maximum payload size:
    ///
    /// > The size of the SOME/IP payload field depends on the transport protocol used.
    /// > With UDP the SOME/IP payload shall be between 0 and 1400 Bytes.
    ///
    /// With these facts we can calculcuate the maximum length of bytes
    /// the following way:
    ///
    /// `1400 - sd reserved & flags (4) - entries length(4) - options length(4)`
    ///
    /// For the sd entries we assume an empty array.
    pub const MAX_OPTIONS_LEN: u32 = crate::SOMEIP_MAX_PAYLOAD_LEN_UDP - 4 - 4 - 4;

    /// Flag in the 4th byte (reserved) indicating that the option is allowed 
    /// to be discarded by the receiver if not supported.
    pub const DISCARDABLE_FLAG: u8 = 0b1000_0000;
    
    /// Value of the `type` field of a configuration sd option.
    pub const CONFIGURATION_TYPE: u8 = 0x01;

    /// Value of the `length` field of a load balancing sd option.
    pub const LOAD_BALANCING_LEN: u16 = 0x0005;

    /// Value of the `type` field of a load balancing sd option.
    pub const LOAD_BALANCING_TYPE: u8 = 0x02;

    /// Value of the `length` field of an ipv4 endpoint sd option.
    pub const IPV4_ENDPOINT_LEN: u16 = 0x0009;

    /// Value of the `type` field of an ipv4 endpoint sd option.
    pub const IPV4_ENDPOINT_TYPE: u8 = 0x04;

    /// Value of the `length` field of an ipv6 endpoint sd option.
    pub const IPV6_ENDPOINT_LEN: u16 = 0x0015;

    /// Value of the `type` field of an ipv6 endpoint sd option.
    pub const IPV6_ENDPOINT_TYPE: u8 = 0x06;

    /// Value of the `length` field of an ipv4 multicast sd option.
    pub const IPV4_MULTICAST_LEN: u16 = 0x0009;

    /// Value of the `type` field of an ipv4 multicast sd option.
    pub const IPV4_MULTICAST_TYPE: u8 = 0x14;

    /// Value of the `length` field of an ipv6 multicast sd option.
    pub const IPV6_MULTICAST_LEN: u16 = 0x0015;

    /// Value of the `type` field of an ipv6 multicast sd option.
    pub const IPV6_MULTICAST_TYPE: u8 = 0x16;

    /// Value of the `length` field of an ipv4 sd endpoint sd option.
    pub const IPV4_SD_ENDPOINT_LEN: u16 = 0x009;

    /// Value of the `type` field of an ipv4 sd endpoint sd option.
    pub const IPV4_SD_ENDPOINT_TYPE: u8 = 0x24;

    /// Value of the `length` field of an ipv6 sd endpoint sd option.
    pub const IPV6_SD_ENDPOINT_LEN: u16 = 0x0015;

    /// Value of the `type` field of an ipv6 sd endpoint sd option.
    pub const IPV6_SD_ENDPOINT_TYPE: u8 = 0x26;

    /// Value of the `length` field of a protection sd option.
    pub const PROTECTION_LEN: u16 = 0x0009;

    /// Value of the `type` field of a protection sd option.
    pub const PROTECTION_TYPE: u8 = 0x03;

    /// Value of the `type` field of a selective sd option.
    pub const SELECTIVE_TYPE: u8 = 0x20;

    #[derive(Clone, Debug, Eq, PartialEq)]
    pub struct ConfigurationOption {
        /// Shall be set to `true` if the option can be discarded by the receiver.
        pub discardable: bool,
        // TODO DNS TXT / DNS-SD format
        pub configuration_string: Vec<u8>,
    }

    impl ConfigurationOption {
        /// New configuration option without any key/value entries yet.
        pub fn new(discardable: bool) -> ConfigurationOption {
            ConfigurationOption {
                discardable,
                configuration_string: Vec::new(),
            }
        }

        /// Iterates over the `key`/`value` tokens contained in the
        /// option (`value` is `None` for bare keys).
        ///
        /// Parsing stops at the first malformed (non length-prefixed)
        /// token or at a zero-length terminator, whichever comes first.
        pub fn iter_items(&self) -> ConfigurationItemsIter<'_> {
            ConfigurationItemsIter {
                rest: &self.configuration_string,
            }
        }

        /// Appends a `key` (or `key=value`) token.
        ///
        /// `key` must be non-empty, printable ASCII (`0x20..=0x7E`) and must
        /// not contain `=`. The combined token (`key` plus `=value` when
        /// `value` is set) must fit in a single byte length prefix (255
        /// bytes max).
        pub fn add_item(
            &mut self,
            key: &str,
            value: Option<&str>,
        ) -> Result<(), crate::ValueError> {
            use crate::ValueError::*;

            if key.is_empty() || !key.bytes().all(|b| (0x20..=0x7E).contains(&b) && b != b'=') {
                return Err(SdConfigurationInvalidKey(key.to_string()));
            }

            let mut token = Vec::with_capacity(key.len() + value.map_or(0, |v| v.len() + 1));
            token.extend_from_slice(key.as_bytes());
            if let Some(v) = value {
                token.push(b'=');
                token.extend_from_slice(v.as_bytes());
            }

            if token.len() > 255 {
                return Err(SdConfigurationTokenTooLong(token.len()));
            }

            self.configuration_string.push(token.len() as u8);
            self.configuration_string.extend_from_slice(&token);
            Ok(())
        }

        /// Returns `true` if `key` occurs at least once (bare or with a value).
        pub fn has_key(&self, key: &str) -> bool {
            self.iter_items().any(|(k, _)| k == key)
        }

        /// Returns `true` if `key` occurs at least once with a value attached.
        pub fn has_value(&self, key: &str) -> bool {
            self.iter_items().any(|(k, v)| k == key && v.is_some())
        }

        /// Returns the value of the first (0-indexed) occurrence of `key`.
        pub fn get_value(&self, key: &str) -> Option<&str> {
            self.get_value_n(key, 0)
        }

        /// Returns the value of the `occurrence`-th (0-indexed) occurrence
        /// of `key`, to disambiguate duplicate keys.
        pub fn get_value_n(&self, key: &str, occurrence: usize) -> Option<&str> {
            self.iter_items()
                .filter(|(k, _)| *k == key)
                .nth(occurrence)
                .and_then(|(_, v)| v)
        }
    }

    /// Iterator over the `key`/`value` tokens of a [`ConfigurationOption`].
    pub struct ConfigurationItemsIter<'a> {
        rest: &'a [u8],
    }

    impl<'a> Iterator for ConfigurationItemsIter<'a> {
        type Item = (&'a str, Option<&'a str>);

        fn next(&mut self) -> Option<Self::Item> {
            loop {
                let (&len, tail) = self.rest.split_first()?;
                if len == 0 {
                    // zero-length marker terminates the token sequence.
                    self.rest = &[];
                    return None;
                }
                if tail.len() < len as usize {
                    // malformed/truncated token, stop iterating.
                    self.rest = &[];
                    return None;
                }
                let (token, rest) = tail.split_at(len as usize);
                self.rest = rest;
                let token = match core::str::from_utf8(token) {
                    Ok(s) => s,
                    Err(_) => continue,
                };
                return Some(match token.split_once('=') {
                    Some((k, v)) => (k, Some(v)),
                    None => (token, None),
                });
            }
        }
    }

    #[derive(Clone, Debug, Eq, PartialEq)]
    pub struct LoadBalancingOption {
        /// Shall be set to `true` if the option can be discarded by the receiver.
        pub discardable: bool,
        pub priority: u16,
        pub weight: u16,
    }

    #[derive(Clone, Debug, Eq, PartialEq)]
    pub struct Ipv4EndpointOption {
        pub ipv4_address: [u8;4],
        pub transport_protocol: TransportProtocol,
        pub transport_protocol_number: u16,
    }

    #[derive(Clone, Debug, Eq, PartialEq)]
    pub struct Ipv6EndpointOption {
        pub ipv6_address: [u8;16],
        pub transport_protocol: TransportProtocol,
        pub transport_protocol_number: u16,
    }

    #[derive(Clone, Debug, Eq, PartialEq)]
    pub struct Ipv4MulticastOption {
        pub ipv4_address: [u8;4],
        pub transport_protocol: TransportProtocol,
        pub transport_protocol_number: u16,
    }

    #[derive(Clone, Debug, Eq, PartialEq)]
    pub struct Ipv6MulticastOption {
        pub ipv6_address: [u8;16],
        pub transport_protocol: TransportProtocol,
        pub transport_protocol_number: u16,
    }

    #[derive(Clone, Debug, Eq, PartialEq)]
    pub struct Ipv4SdEndpointOption {
        pub ipv4_address: [u8;4],
        pub transport_protocol: TransportProtocol,
        pub transport_protocol_number: u16,
    }

    #[derive(Clone, Debug, Eq, PartialEq)]
    pub struct Ipv6SdEndpointOption {
        pub ipv6_address: [u8;16],
        pub transport_protocol: TransportProtocol,
        pub transport_protocol_number: u16,
    }

    /// An unknown option that is flagged as "discardable" and
    /// should be ignored by the receiver if not supported.
    ///
    /// The raw option body is kept opaque so a message carrying an option
    /// type this crate does not know about can still be round-tripped
    /// through a forwarder without data loss (see `spec.md` §3: "unknown
    /// types are preserved opaquely").
    #[derive(Clone, Debug, Eq, PartialEq)]
    pub struct UnknownDiscardableOption {
        pub length: u16,
        pub option_type: u8,
        pub body: Vec<u8>,
    }

    /// Protection option, carrying a rolling alive counter plus a CRC
    /// used to detect spoofed SD entries referencing this option.
    #[derive(Clone, Debug, Eq, PartialEq)]
    pub struct ProtectionOption {
        /// Shall be set to `true` if the option can be discarded by the receiver.
        pub discardable: bool,
        pub alive_counter: u32,
        pub crc: u32,
    }

    /// Selective subscription option, restricting the eventgroup entry
    /// it is attached to so that only the listed client ids are
    /// subscribed/offered to.
    #[derive(Clone, Debug, Eq, PartialEq)]
    pub struct SelectiveOption {
        /// Shall be set to `true` if the option can be discarded by the receiver.
        pub discardable: bool,
        pub client_ids: Vec<u16>,
    }
}

use self::options::*;

/// Flags at the start of a SOMEIP service discovery
/// header.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SdHeaderFlags {
    pub reboot: bool,
    pub unicast: bool,
    pub explicit_initial_data_control: bool,
}

impl Default for SdHeaderFlags {
    fn default() -> Self {
        SdHeaderFlags {
            reboot: false,
            // set unicast & explicit_initial_data_control to true
            // by default as they have to be supported by current someip
            // implementations by default.
            unicast: true,
            explicit_initial_data_control: true,
        }
    }
}

impl SdHeaderFlags {
    /// Returns the first 4 bytes of an SOMEIP SD header.
    pub fn to_bytes(&self) -> [u8;4] {
        use sd::flags::*;
        [
            if self.reboot {
                REBOOT_FLAG
            } else {
                0
            } | if self.unicast {
                UNICAST_FLAG
            } else {
                0
            } | if self.explicit_initial_data_control {
                EXPLICIT_INITIAL_DATA_CONTROL_FLAG
            } else {
                0
            },
            0,
            0,
            0,
        ]
    }
}

/// SOMEIP service discovery header
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SdHeader {
    pub flags: SdHeaderFlags,
    // reserved: [u8;3],
    // Length of entries array in bytes
    // length_of_entries: u32,
    pub entries: Vec<SdEntry>,
    // Length of entries array in bytes
    // length_of_options: u32,
    pub options: Vec<SdOption>,
}

impl SdHeader {
    #[inline]
    pub fn new(reboot: bool, entries: Vec<SdEntry>, options: Vec<SdOption>) -> Self {
        Self {
            flags: SdHeaderFlags {
                reboot,
                unicast: true,
                explicit_initial_data_control: true,
            },
            entries,
            options,
        }
    }

    #[inline]
    #[cfg(any(target_pointer_width = "32", target_pointer_width = "64"))]
    pub fn read<T: Read + Seek>(reader: &mut T) -> Result<Self, ReadError> {
        use sd::entries::*;
        use sd::options::*;
        
        const HEADER_LENGTH: usize = 1 + 3 + 4; // flags + rev + entries length
        let mut header_bytes: [u8; HEADER_LENGTH] = [0; HEADER_LENGTH];
        reader.read_exact(&mut header_bytes)?;

        let num_entries = {
            let length_entries = u32::from_be_bytes([
                header_bytes[4],
                header_bytes[5],
                header_bytes[6],
                header_bytes[7],
            ]);

            if length_entries > MAX_ENTRIES_LEN {
                return Err(
                    ReadError::SdEntriesArrayLengthTooLarge(length_entries)
                );
            }

            // Note this function only supports 32 & 64 bit systems.
            // `read` has been disabled for 16 bit systems to
            // make this explicit.
            (length_entries as usize) / usize::from(ENTRY_LEN)
        };
        let entries = {
            let mut entries = Vec::new();
            entries.try_reserve(num_entries)?;
            for _ in 0..num_entries {
                entries.push(SdEntry::read(reader)?);
            }
            entries
        };

        let mut options_length = {
            let mut options_length_bytes: [u8; 4] = [0x00; 4];
            reader.read_exact(&mut options_length_bytes)?;
            u32::from_be_bytes(options_length_bytes)
        };

        if options_length > MAX_OPTIONS_LEN {
            return Err(
                ReadError::SdOptionsArrayLengthTooLarge(options_length)
            );
        }

        let mut options = Vec::new();
        // pessimistically reserve memory so if we trigger an
        // allocation failure we trigger it here.
        // (minimum size of an option is 4 bytes)
        options.try_reserve((options_length as usize) / 4)?;

        while options_length > 0 {
            let (read_bytes, option) = SdOption::read(reader)?;
            options.push(option);
            options_length -= read_bytes as u32;
        }

        //return result
        use sd::flags::*;
        Ok(Self {
            flags: SdHeaderFlags {
                reboot: 0 != header_bytes[0] & REBOOT_FLAG,
                unicast: 0 != header_bytes[0] & UNICAST_FLAG,
                explicit_initial_data_control: 0 != header_bytes[0] & EXPLICIT_INITIAL_DATA_CONTROL_FLAG,
            },
            entries,
            options,
        })
    }

    /// Writes the header to the given writer.
    #[inline]
    pub fn write<T: Write>(&self, writer: &mut T) -> Result<(), WriteError> {
        writer.write_all(&self.to_bytes_vec()?)?;
        Ok(())
    }

    /// Writes the header to a slice.
    #[inline]
    pub fn write_to_slice(&self, slice: &mut [u8]) -> Result<(), WriteError> {
        let buffer = self.to_bytes_vec()?;
        if slice.len() < buffer.len() {
            use WriteError::*;
            Err(UnexpectedEndOfSlice(buffer.len()))
        } else {
            // TODO figure out a better way
            for (idx, b) in buffer.iter().enumerate() {
                slice[idx] = *b;
            }
            Ok(())
        }
    }

    /// Length of the serialized header in bytes.
    #[inline]
    pub fn header_len(&self) -> usize {
        use self::entries::*;
        // 4*3 (flags, entries len & options len)
        let options_len: usize = self.options.iter().map(|ref o| o.header_len()).sum();
        4*3 + self.entries.len()*ENTRY_LEN + options_len
    }

    /// Writes the header to a slice without checking the slice length.
    #[inline]
    pub fn to_bytes_vec(&self) -> Result<Vec<u8>, ValueError> {
        use self::entries::*;

        // calculate memory usage
        let entries_len = self.entries.len()*ENTRY_LEN;
        let options_len: usize = self.options.iter().map(|ref o| o.header_len()).sum();

        // pre-allocate the resulting buffer (4*3 for flags, entries len & options len)
        let mut bytes = Vec::with_capacity(4*3 + entries_len + options_len);

        // flags & reserved
        bytes.extend_from_slice(&self.flags.to_bytes());
        // entries len
        bytes.extend_from_slice(&(entries_len as u32).to_be_bytes());

        // entries
        for e in &self.entries {
            bytes.extend_from_slice(&e.to_bytes());
        }

        // options len
        bytes.extend_from_slice(&(options_len as u32).to_be_bytes());
        for o in &self.options {
            o.append_bytes_to_vec(&mut bytes)?;
        }

        Ok(bytes)
    }

    /// Finds an already-stored option equal (by [`SdOption::is_same_option`])
    /// to `option`, returning its index. If none exists, the option is
    /// appended and the index of the newly inserted option is returned.
    pub fn find_option(&mut self, option: &SdOption) -> u8 {
        if let Some(idx) = self.options.iter().position(|o| o.is_same_option(option)) {
            idx as u8
        } else {
            self.options.push(option.clone());
            (self.options.len() - 1) as u8
        }
    }

    /// Adds `entry` to the header, sharing any options it references with
    /// already-stored, equal options (inserting new ones otherwise), and
    /// optionally adding a paired entry (e.g. a subscribe-ack entry mirroring
    /// a subscribe entry) that references the very same option set.
    ///
    /// Option-index assignment follows the two-run policy used by the
    /// entry's `index_first_option_run`/`index_second_option_run` fields:
    /// each run holds up to 15 option indices and a new index can only be
    /// appended to a run if the run is still empty or the index is adjacent
    /// (`run_end + 1`) to the run's current end. An option that fits neither
    /// run is unreachable from this entry; the reference is dropped (a
    /// warning is logged) rather than failing the whole call.
    ///
    /// Returns an error without mutating `self` if the resulting serialized
    /// size would exceed `config.udp_sd_payload_cap` bytes.
    pub fn add_entry(
        &mut self,
        entry: SdEntryKind,
        options: &[SdOption],
        other: Option<SdEntryKind>,
        config: &crate::SdConfig,
    ) -> Result<(), crate::err::SdAddEntryError> {
        let sd_cap = config.udp_sd_payload_cap as usize;
        // snapshot so we can roll back if the size cap would be exceeded.
        let options_snapshot = self.options.clone();
        let entries_snapshot_len = self.entries.len();

        let mut runs = OptionRuns::default();
        for option in options {
            let idx = self.find_option(option);
            runs.assign(idx);
        }
        self.entries.push(runs.build_entry(entry));

        if let Some(other_kind) = other {
            // the paired entry shares the same option reference set.
            self.entries.push(runs.build_entry(other_kind));
        }

        let would_be = self.header_len() + crate::SOMEIP_HEADER_LENGTH;
        if would_be > sd_cap {
            // roll back
            self.options = options_snapshot;
            self.entries.truncate(entries_snapshot_len);
            return Err(crate::err::SdAddEntryError::SdSizeCapExceeded {
                cap: sd_cap,
                would_be,
            });
        }

        Ok(())
    }
}

/// Like [`SdEntry`], but without the option-index/option-count fields, which
/// [`SdHeader::add_entry`] computes from the options actually attached.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SdEntryKind {
    Service {
        _type: SdServiceEntryType,
        service_id: u16,
        instance_id: u16,
        major_version: u8,
        ttl: u32,
        minor_version: u32,
    },
    Eventgroup {
        _type: SdEventGroupEntryType,
        service_id: u16,
        instance_id: u16,
        major_version: u8,
        ttl: u32,
        initial_data_requested: bool,
        counter: u8,
        eventgroup_id: u16,
    },
}

/// Accumulates option indices into the two 15-slot runs an entry can carry,
/// dropping references that fit in neither run (see [`SdHeader::add_entry`]).
#[derive(Default)]
struct OptionRuns {
    run1_start: u8,
    run1_len: u8,
    run2_start: u8,
    run2_len: u8,
}

impl OptionRuns {
    fn assign(&mut self, idx: u8) {
        if self.run1_len == 0 {
            self.run1_start = idx;
            self.run1_len = 1;
        } else if self.run1_len < 15 && idx == self.run1_start + self.run1_len {
            self.run1_len += 1;
        } else if self.run2_len == 0 {
            self.run2_start = idx;
            self.run2_len = 1;
        } else if self.run2_len < 15 && idx == self.run2_start + self.run2_len {
            self.run2_len += 1;
        } else {
            log::warn!(
                "sd option at index {} is not adjacent to either option run of this entry, dropping the reference",
                idx
            );
        }
    }

    fn build_entry(&self, kind: SdEntryKind) -> SdEntry {
        match kind {
            SdEntryKind::Service {
                _type,
                service_id,
                instance_id,
                major_version,
                ttl,
                minor_version,
            } => SdEntry::Service {
                _type,
                index_first_option_run: self.run1_start,
                index_second_option_run: self.run2_start,
                number_of_options_1: self.run1_len,
                number_of_options_2: self.run2_len,
                service_id,
                instance_id,
                major_version,
                ttl,
                minor_version,
            },
            SdEntryKind::Eventgroup {
                _type,
                service_id,
                instance_id,
                major_version,
                ttl,
                initial_data_requested,
                counter,
                eventgroup_id,
            } => SdEntry::Eventgroup {
                _type,
                index_first_option_run: self.run1_start,
                index_second_option_run: self.run2_start,
                number_of_options_1: self.run1_len,
                number_of_options_2: self.run2_len,
                service_id,
                instance_id,
                major_version,
                ttl,
                initial_data_requested,
                counter,
                eventgroup_id,
            },
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SdEntry {
    ///SOMEIP service discovery entry for a service.
    Service {
        _type: SdServiceEntryType,
        index_first_option_run: u8,
        index_second_option_run: u8,
        number_of_options_1: u8,
        number_of_options_2: u8,
        service_id: u16,
        instance_id: u16,
        major_version: u8,
        ttl: u32,
        minor_version: u32,
    },

    ///SOMEIP service discovery entry for an eventgroup.
    Eventgroup {
        _type: SdEventGroupEntryType,
        index_first_option_run: u8,
        index_second_option_run: u8,
        number_of_options_1: u8,
        number_of_options_2: u8,
        service_id: u16,
        instance_id: u16,
        major_version: u8,
        ttl: u32,
        // reserved: u8,
        /// True if initial data shall be sent by server
        initial_data_requested: bool,
        // reserved: 3 bit
        /// distinguish identical subscribe eventgroups of the same subscriber
        /// 4 bit
        counter: u8,
        eventgroup_id: u16,
    },
}

impl SdEntry {
    #[allow(clippy::too_many_arguments)]
    pub fn new_service_entry(
        _type: SdServiceEntryType,
        index_first_option_run: u8,
        index_second_option_run: u8,
        number_of_options_1: u8,
        number_of_options_2: u8,
        service_id: u16,
        instance_id: u16,
        major_version: u8,
        ttl: u32,
        minor_version: u32,
    ) -> Result<Self, ValueError> {
        if ttl > 0x00FF_FFFF {
            Err(ValueError::TtlTooLarge(ttl))
        } else if number_of_options_1 > 0x0F {
            Err(ValueError::NumberOfOption1TooLarge(number_of_options_1))
        } else if number_of_options_2 > 0x0F {
            Err(ValueError::NumberOfOption2TooLarge(number_of_options_2))
        } else {
            Ok(Self::Service {
                _type,
                index_first_option_run,
                index_second_option_run,
                number_of_options_1,
                number_of_options_2,
                service_id,
                instance_id,
                major_version,
                ttl,
                minor_version,
            })
        }
    }

    /// Find service instances. Only use when the state of the given service is unknown.
    /// * `service_id` - Set to 0xFFFF if all service instances should be returned.
    /// * `instance_id` - Set to 0xFFFF if all instances should be returned.
    /// * `major_version` - Set to 0xFF if any version should be returned.
    /// * `minor_version` - Set to 0xFFFF_FFFF if any version should be returned.
    /// * `ttl` - Must not be 0 as this indicates a "stop offering".
    #[allow(clippy::too_many_arguments)]
    pub fn new_find_service_entry(
        index_first_option_run: u8,
        index_second_option_run: u8,
        number_of_options_1: u8,
        number_of_options_2: u8,
        service_id: u16,
        instance_id: u16,
        major_version: u8,
        ttl: u32,
        minor_version: u32,
    ) -> Result<Self, ValueError> {
        if ttl == 0 {
            Err(ValueError::TtlZeroIndicatesStopOffering)
        } else {
            Self::new_service_entry(
                SdServiceEntryType::FindService,
                index_first_option_run,
                index_second_option_run,
                number_of_options_1,
                number_of_options_2,
                service_id,
                instance_id,
                major_version,
                ttl,
                minor_version,
            )
        }
    }

    /// Createa a service offer entry.
    ///
    /// # Errors:
    ///
    /// `ttl` must not be 0 as this indicates a "stop offering". If ttl
    /// 0 is passed [`ValueError::TtlZeroIndicatesStopOffering`] as an error
    /// is returned.
    #[allow(clippy::too_many_arguments)]
    pub fn new_offer_service_entry(
        index_first_option_run: u8,
        index_second_option_run: u8,
        number_of_options_1: u8,
        number_of_options_2: u8,
        service_id: u16,
        instance_id: u16,
        major_version: u8,
        ttl: u32,
        minor_version: u32,
    ) -> Result<Self, ValueError> {
        if ttl == 0 {
            Err(ValueError::TtlZeroIndicatesStopOffering)
        } else {
            Self::new_service_entry(
                SdServiceEntryType::OfferService,
                index_first_option_run,
                index_second_option_run,
                number_of_options_1,
                number_of_options_2,
                service_id,
                instance_id,
                major_version,
                ttl,
                minor_version,
            )
        }
    }

    /// Stop offering a given service.
    #[allow(clippy::too_many_arguments)]
    pub fn new_stop_offer_service_entry(
        index_first_option_run: u8,
        index_second_option_run: u8,
        number_of_options_1: u8,
        number_of_options_2: u8,
        service_id: u16,
        instance_id: u16,
        major_version: u8,
        minor_version: u32,
    ) -> Result<Self, ValueError> {
        Self::new_service_entry(
            SdServiceEntryType::OfferService,
            index_first_option_run,
            index_second_option_run,
            number_of_options_1,
            number_of_options_2,
            service_id,
            instance_id,
            major_version,
            0x00,
            minor_version,
        )
    }

    #[allow(clippy::too_many_arguments)]
    pub fn new_eventgroup(
        _type: SdEventGroupEntryType,
        index_first_option_run: u8,
        index_second_option_run: u8,
        number_of_options_1: u8,
        number_of_options_2: u8,
        service_id: u16,
        instance_id: u16,
        major_version: u8,
        ttl: u32,
        initial_data_requested: bool,
        counter: u8,
        eventgroup_id: u16,
    ) -> Result<Self, ValueError> {
        if counter > 0x0F {
            Err(ValueError::CounterTooLarge(counter))
        } else if ttl > 0x00FF_FFFF {
            Err(ValueError::TtlTooLarge(ttl))
        } else if number_of_options_1 > 0x0F {
            Err(ValueError::NumberOfOption1TooLarge(number_of_options_1))
        } else if number_of_options_2 > 0x0F {
            Err(ValueError::NumberOfOption2TooLarge(number_of_options_2))
        } else {
            Ok(Self::Eventgroup {
                _type,
                index_first_option_run,
                index_second_option_run,
                number_of_options_1,
                number_of_options_2,
                service_id,
                instance_id,
                major_version,
                ttl,
                initial_data_requested,
                counter,
                eventgroup_id,
            })
        }
    }

    #[inline]
    pub fn read<T: Read + Seek>(reader: &mut T) -> Result<Self, ReadError> {
        let mut entry_bytes: [u8; entries::ENTRY_LEN] = [0; entries::ENTRY_LEN];
        reader.read_exact(&mut entry_bytes)?;

        let _type_raw = entry_bytes[0];
        match _type_raw {
            0x00 => Self::read_service(SdServiceEntryType::FindService, entry_bytes),
            0x01 => Self::read_service(SdServiceEntryType::OfferService, entry_bytes),
            0x04 => Self::read_entry_group(SdEventGroupEntryType::FindEventGroup, entry_bytes),
            0x05 => Self::read_entry_group(SdEventGroupEntryType::PublishEventgroup, entry_bytes),
            0x06 => Self::read_entry_group(SdEventGroupEntryType::Subscribe, entry_bytes),
            0x07 => Self::read_entry_group(SdEventGroupEntryType::SubscribeAck, entry_bytes),
            _ => Err(ReadError::UnknownSdServiceEntryType(_type_raw)),
        }
    }

    /// Read a service entry from a byte array.
    #[inline]
    pub fn read_service(
        _type: SdServiceEntryType,
        entry_bytes: [u8; entries::ENTRY_LEN],
    ) -> Result<Self, ReadError> {
        //return result
        Ok(Self::Service {
            _type,
            index_first_option_run: entry_bytes[1],
            index_second_option_run: entry_bytes[2],
            number_of_options_1: entry_bytes[3] >> 4,
            number_of_options_2: entry_bytes[3] & 0x0F,
            service_id: u16::from_be_bytes([entry_bytes[4], entry_bytes[5]]),
            instance_id: u16::from_be_bytes([entry_bytes[6], entry_bytes[7]]),
            major_version: entry_bytes[8],
            ttl: u32::from_be_bytes([0x00, entry_bytes[9], entry_bytes[10], entry_bytes[11]]),
            minor_version: u32::from_be_bytes([
                entry_bytes[12],
                entry_bytes[13],
                entry_bytes[14],
                entry_bytes[15],
            ]),
        })
    }

    /// Read an entry group from byte array.
    #[inline]
    pub fn read_entry_group(
        _type: SdEventGroupEntryType,
        entry_bytes: [u8; entries::ENTRY_LEN],
    ) -> Result<Self, ReadError> {
        //return result
        Ok(Self::Eventgroup {
            _type,
            index_first_option_run: entry_bytes[1],
            index_second_option_run: entry_bytes[2],
            number_of_options_1: entry_bytes[3] >> 4,
            number_of_options_2: entry_bytes[3] & 0x0F,
            service_id: u16::from_be_bytes([entry_bytes[4], entry_bytes[5]]),
            instance_id: u16::from_be_bytes([entry_bytes[6], entry_bytes[7]]),
            major_version: entry_bytes[8],
            ttl: u32::from_be_bytes([0x00, entry_bytes[9], entry_bytes[10], entry_bytes[11]]),
            // skip reserved byte, TODO: should this be verified to be 0x00 ?
            initial_data_requested: 0 != entry_bytes[13] & EVENT_ENTRY_INITIAL_DATA_REQUESTED_FLAG,
            // ignore reserved bits, TODO: should this be verified to be 0x00 ?
            counter: entry_bytes[13] & 0x0F,
            eventgroup_id: u16::from_be_bytes([entry_bytes[14], entry_bytes[15]]),
        })
    }

    /// Writes the eventgroup entry to the given writer.
    #[inline]
    pub fn write<T: Write>(&self, writer: &mut T) -> Result<(), WriteError> {
        writer.write_all(&self.to_bytes())?;
        Ok(())
    }

    ///Writes the eventgroup entry to a slice without checking the slice length.
    #[inline]
    pub fn to_bytes(&self) -> [u8; entries::ENTRY_LEN] {
        match self {
            SdEntry::Eventgroup {
                _type,
                index_first_option_run,
                index_second_option_run,
                number_of_options_1,
                number_of_options_2,
                service_id,
                instance_id,
                major_version,
                ttl,
                initial_data_requested,
                counter,
                eventgroup_id,
            } => {
                let mut result = [0x00; entries::ENTRY_LEN];

                result[0] = _type.clone() as u8;
                result[1] = *index_first_option_run;
                result[2] = *index_second_option_run;
                result[3] = (number_of_options_1 << 4) | (number_of_options_2 & 0x0F);

                let service_id_bytes = service_id.to_be_bytes();
                result[4] = service_id_bytes[0];
                result[5] = service_id_bytes[1];

                let instance_id_bytes = instance_id.to_be_bytes();
                result[6] = instance_id_bytes[0];
                result[7] = instance_id_bytes[1];

                result[8] = *major_version;

                let ttl_bytes = ttl.to_be_bytes();
                result[9] = ttl_bytes[1];
                result[10] = ttl_bytes[2];
                result[11] = ttl_bytes[3];

                // skip reserved byte, already initialized as 0x00

                if *initial_data_requested {
                    result[13] |= EVENT_ENTRY_INITIAL_DATA_REQUESTED_FLAG;
                }
                result[13] |= counter & 0x0F;

                let eventgroup_id_bytes = eventgroup_id.to_be_bytes();
                result[14] = eventgroup_id_bytes[0];
                result[15] = eventgroup_id_bytes[1];

                result
            }
            SdEntry::Service {
                _type,
                index_first_option_run,
                index_second_option_run,
                number_of_options_1,
                number_of_options_2,
                service_id,
                instance_id,
                major_version,
                ttl,
                minor_version,
            } => {
                let mut result = [0x00; entries::ENTRY_LEN];

                result[0] = _type.clone() as u8;
                result[1] = *index_first_option_run;
                result[2] = *index_second_option_run;
                result[3] = (number_of_options_1 << 4) | (number_of_options_2 & 0x0F);

                let service_id_bytes = service_id.to_be_bytes();
                result[4] = service_id_bytes[0];
                result[5] = service_id_bytes[1];

                let instance_id_bytes = instance_id.to_be_bytes();
                result[6] = instance_id_bytes[0];
                result[7] = instance_id_bytes[1];

                result[8] = *major_version;

                let ttl_bytes = ttl.to_be_bytes();
                result[9] = ttl_bytes[1];
                result[10] = ttl_bytes[2];
                result[11] = ttl_bytes[3];

                let minor_version_bytes = minor_version.to_be_bytes();
                result[12] = minor_version_bytes[0];
                result[13] = minor_version_bytes[1];
                result[14] = minor_version_bytes[2];
                result[15] = minor_version_bytes[3];

                result
            }
        }
    }

    /// Length of the serialized header in bytes.
    pub fn header_len(&self) -> usize {
        4*4
    }

    /// `service` field of the entry (`service_id` for both entry kinds).
    pub fn service_id(&self) -> u16 {
        match self {
            SdEntry::Service { service_id, .. } => *service_id,
            SdEntry::Eventgroup { service_id, .. } => *service_id,
        }
    }

    /// `instance` field of the entry.
    pub fn instance_id(&self) -> u16 {
        match self {
            SdEntry::Service { instance_id, .. } => *instance_id,
            SdEntry::Eventgroup { instance_id, .. } => *instance_id,
        }
    }

    /// `major` field of the entry.
    pub fn major_version(&self) -> u8 {
        match self {
            SdEntry::Service { major_version, .. } => *major_version,
            SdEntry::Eventgroup { major_version, .. } => *major_version,
        }
    }

    /// `ttl` field of the entry.
    pub fn ttl(&self) -> u32 {
        match self {
            SdEntry::Service { ttl, .. } => *ttl,
            SdEntry::Eventgroup { ttl, .. } => *ttl,
        }
    }

    /// `true` if a `ttl` of zero makes this entry a "stop" variant
    /// (stop-offer / stop-subscribe / subscribe-nack), which is the only
    /// thing that distinguishes it from its non-stop counterpart on the wire.
    pub fn is_stop(&self) -> bool {
        self.ttl() == 0
    }

    /// Indices (within the owning [`SdHeader::options`]) referenced by this
    /// entry, in run-1-then-run-2 order.
    pub fn option_indices(&self) -> Vec<u8> {
        let (run1, run2, n1, n2) = match self {
            SdEntry::Service {
                index_first_option_run,
                index_second_option_run,
                number_of_options_1,
                number_of_options_2,
                ..
            } => (
                *index_first_option_run,
                *index_second_option_run,
                *number_of_options_1,
                *number_of_options_2,
            ),
            SdEntry::Eventgroup {
                index_first_option_run,
                index_second_option_run,
                number_of_options_1,
                number_of_options_2,
                ..
            } => (
                *index_first_option_run,
                *index_second_option_run,
                *number_of_options_1,
                *number_of_options_2,
            ),
        };
        let mut result = Vec::with_capacity(usize::from(n1 + n2));
        result.extend(run1..run1.saturating_add(n1));
        result.extend(run2..run2.saturating_add(n2));
        result
    }
}

/// Looks up the [`options::SelectiveOption`] referenced by an eventgroup
/// entry, if any, so subscribers can be filtered by client id.
///
/// Returns `None` if the entry references no selective option (i.e. it
/// is not a selective subscription).
pub fn selective_option_of<'a>(
    entry: &SdEntry,
    header_options: &'a [SdOption],
) -> Option<&'a options::SelectiveOption> {
    for idx in entry.option_indices() {
        if let Some(SdOption::Selective(s)) = header_options.get(usize::from(idx)) {
            return Some(s);
        }
    }
    None
}

/// Matching rule used by SD to recognize re-subscriptions of an eventgroup:
/// two eventgroup entries refer to the same subscription if
/// `(service, instance, eventgroup, major, counter)` agree AND either
/// their option references are identical, or their referenced endpoint
/// addresses compare equal by `(l4proto, port, address)`.
pub fn eventgroup_entries_match(
    a: &SdEntry,
    a_options: &[SdOption],
    b: &SdEntry,
    b_options: &[SdOption],
) -> bool {
    let (a_sid, a_iid, a_major, a_eg, a_counter) = match a {
        SdEntry::Eventgroup {
            service_id,
            instance_id,
            major_version,
            counter,
            eventgroup_id,
            ..
        } => (*service_id, *instance_id, *major_version, *eventgroup_id, *counter),
        SdEntry::Service { .. } => return false,
    };
    let (b_sid, b_iid, b_major, b_eg, b_counter) = match b {
        SdEntry::Eventgroup {
            service_id,
            instance_id,
            major_version,
            counter,
            eventgroup_id,
            ..
        } => (*service_id, *instance_id, *major_version, *eventgroup_id, *counter),
        SdEntry::Service { .. } => return false,
    };

    if (a_sid, a_iid, a_major, a_eg, a_counter) != (b_sid, b_iid, b_major, b_eg, b_counter) {
        return false;
    }

    let a_idx = a.option_indices();
    let b_idx = b.option_indices();
    let a_opts: Vec<&SdOption> = a_idx.iter().filter_map(|i| a_options.get(usize::from(*i))).collect();
    let b_opts: Vec<&SdOption> = b_idx.iter().filter_map(|i| b_options.get(usize::from(*i))).collect();

    if a_opts.len() == b_opts.len() && a_opts.iter().zip(b_opts.iter()).all(|(x, y)| x.is_same_option(y)) {
        return true;
    }

    // fall back to comparing referenced endpoint addresses.
    let a_endpoints: Vec<(u8, u16, EndpointAddr)> =
        a_opts.iter().filter_map(|o| o.endpoint_tuple()).collect();
    let b_endpoints: Vec<(u8, u16, EndpointAddr)> =
        b_opts.iter().filter_map(|o| o.endpoint_tuple()).collect();
    !a_endpoints.is_empty() && a_endpoints == b_endpoints
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SdServiceEntryType {
    FindService = 0x00,
    OfferService = 0x01,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SdEventGroupEntryType {
    FindEventGroup = 0x04,
    PublishEventgroup = 0x05,
    Subscribe = 0x06,
    SubscribeAck = 0x07,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SdOptionType {
    Configuration = 0x01,
    LoadBalancing = 0x02,
    Ipv4Endpoint = 0x04,
    Ipv6Endpoint = 0x06,
    Ipv4Multicast = 0x14,
    Ipv6Multicast = 0x16,
    Ipv4SdEndpoint = 0x24,
    Ipv6SdEndpoint = 0x26,
}

/// Protocol numbers based on IANA/IETF
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum TransportProtocol {
    Tcp,
    Udp,
    Generic(u8),
}

impl From<TransportProtocol> for u8 {
    fn from(tp: TransportProtocol) -> u8 {
        match tp {
            TransportProtocol::Tcp => 0x06,
            TransportProtocol::Udp => 0x11,
            TransportProtocol::Generic(tp) => tp,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SdOption {
    ///Arbitrary configuration strings.
    Configuration(ConfigurationOption),
    LoadBalancing(LoadBalancingOption),
    Ipv4Endpoint(Ipv4EndpointOption),
    Ipv6Endpoint(Ipv6EndpointOption),
    Ipv4Multicast(Ipv4MulticastOption),
    Ipv6Multicast(Ipv6MulticastOption),
    Ipv4SdEndpoint(Ipv4SdEndpointOption),
    Ipv6SdEndpoint(Ipv6SdEndpointOption),
    Protection(ProtectionOption),
    Selective(SelectiveOption),
    /// An unknown option that is flagged as "discardable" and
    /// should be ignored by the receiver if not supported.
    ///
    /// This option is only intended to be used for reading,
    /// to ensure the option indices are still matching. In case
    /// this option is passed to a write function an error will be
    /// triggered.
    UnknownDiscardable(UnknownDiscardableOption),
}

impl From<ConfigurationOption> for SdOption {
    #[inline]
    fn from(o: ConfigurationOption) -> Self { SdOption::Configuration(o) }
}

impl From<LoadBalancingOption> for SdOption {
    #[inline]
    fn from(o: LoadBalancingOption) -> Self { SdOption::LoadBalancing(o) }
}

impl From<Ipv4EndpointOption> for SdOption {
    #[inline]
    fn from(o: Ipv4EndpointOption) -> Self { SdOption::Ipv4Endpoint(o) }
}

impl From<Ipv6EndpointOption> for SdOption {
    #[inline]
    fn from(o: Ipv6EndpointOption) -> Self { SdOption::Ipv6Endpoint(o) }
}

impl From<Ipv4MulticastOption> for SdOption {
    #[inline]
    fn from(o: Ipv4MulticastOption) -> Self { SdOption::Ipv4Multicast(o) }
}

impl From<Ipv6MulticastOption> for SdOption {
    #[inline]
    fn from(o: Ipv6MulticastOption) -> Self { SdOption::Ipv6Multicast(o) }
}

impl From<Ipv4SdEndpointOption> for SdOption {
    #[inline]
    fn from(o: Ipv4SdEndpointOption) -> Self { SdOption::Ipv4SdEndpoint(o) }
}

impl From<Ipv6SdEndpointOption> for SdOption {
    #[inline]
    fn from(o: Ipv6SdEndpointOption) -> Self { SdOption::Ipv6SdEndpoint(o) }
}

impl From<UnknownDiscardableOption> for SdOption {
    #[inline]
    fn from(o: UnknownDiscardableOption) -> Self { SdOption::UnknownDiscardable(o) }
}

impl From<ProtectionOption> for SdOption {
    #[inline]
    fn from(o: ProtectionOption) -> Self { SdOption::Protection(o) }
}

impl From<SelectiveOption> for SdOption {
    #[inline]
    fn from(o: SelectiveOption) -> Self { SdOption::Selective(o) }
}

impl SdOption {
    /// Read the value from a [`std::io::Read`] source.
    #[inline]
    pub fn read<T: Read + Seek>(reader: &mut T) -> Result<(u16, Self), ReadError> {
        use ReadError::*;
        use self::SdOption::*;
        use self::options::*;

        let mut option_bytes: [u8; 4] = [0; 4];
        reader.read_exact(&mut option_bytes)?;

        let length = u16::from_be_bytes([option_bytes[0], option_bytes[1]]);
        if length < 1 {
            return Err(SdOptionLengthZero);
        }

        let type_raw = option_bytes[2];
        // reserved byte
        let discardable = 0 != option_bytes[3] & DISCARDABLE_FLAG;

        // Helper function that returns an SdOptionUnexpectedLen error
        // when the expected_len does not match the len.
        let expect_len = |expected_len: u16| -> Result<(), ReadError> {
            if expected_len == length {
                Ok(())
            } else {
                Err(
                    SdOptionUnexpectedLen {
                        expected_len,
                        actual_len: length,
                        option_type: type_raw,
                    }
                )
            }
        };

        let option = match type_raw {
            // Configuration
            CONFIGURATION_TYPE => {
                let length_array = (length - 1) as usize;
                let mut configuration_string = Vec::with_capacity(length_array);
                reader
                    .take(length_array as u64)
                    .read_to_end(&mut configuration_string)?;
                Configuration(
                    ConfigurationOption {
                        discardable,
                        configuration_string,
                    }
                )
            },
            LOAD_BALANCING_TYPE => {
                expect_len(LOAD_BALANCING_LEN)?;

                let mut load_balancing_bytes: [u8; 4] = [0; 4];
                reader.read_exact(&mut load_balancing_bytes)?;
                LoadBalancing(
                    LoadBalancingOption {
                        discardable,
                        priority: u16::from_be_bytes([
                            load_balancing_bytes[0],
                            load_balancing_bytes[1],
                        ]),
                        weight: u16::from_be_bytes([load_balancing_bytes[2], load_balancing_bytes[3]]),
                    }
                )
            },
            IPV4_ENDPOINT_TYPE => {
                expect_len(IPV4_ENDPOINT_LEN)?;

                let (ipv4_address, transport_protocol, transport_protocol_number) =
                    Self::read_ip4_option(reader)?;
                Ipv4Endpoint(
                    Ipv4EndpointOption {
                        ipv4_address,
                        transport_protocol,
                        transport_protocol_number,
                    }
                )
            },
            IPV6_ENDPOINT_TYPE => {
                expect_len(IPV6_ENDPOINT_LEN)?;

                let (ipv6_address, transport_protocol, transport_protocol_number) =
                    Self::read_ip6_option(reader)?;
                Ipv6Endpoint(
                    Ipv6EndpointOption {
                        ipv6_address,
                        transport_protocol,
                        transport_protocol_number,
                    }
                )
            },
            IPV4_MULTICAST_TYPE => {
                expect_len(IPV4_MULTICAST_LEN)?;

                let (ipv4_address, transport_protocol, transport_protocol_number) =
                    Self::read_ip4_option(reader)?;
                Ipv4Multicast(
                    Ipv4MulticastOption {
                        ipv4_address,
                        transport_protocol,
                        transport_protocol_number,
                    }
                )
            },
            IPV6_MULTICAST_TYPE => {
                expect_len(IPV6_MULTICAST_LEN)?;

                let (ipv6_address, transport_protocol, transport_protocol_number) =
                    Self::read_ip6_option(reader)?;
                Ipv6Multicast(
                    Ipv6MulticastOption {
                        ipv6_address,
                        transport_protocol,
                        transport_protocol_number,
                    }
                )
            },
            IPV4_SD_ENDPOINT_TYPE => {
                expect_len(IPV4_SD_ENDPOINT_LEN)?;

                let (ipv4_address, transport_protocol, transport_protocol_number) =
                    Self::read_ip4_option(reader)?;
                Ipv4SdEndpoint(
                    Ipv4SdEndpointOption {
                        ipv4_address,
                        transport_protocol,
                        transport_protocol_number,
                    }
                )
            },
            IPV6_SD_ENDPOINT_TYPE => {
                expect_len(IPV6_SD_ENDPOINT_LEN)?;

                let (ipv6_address, transport_protocol, transport_protocol_number) =
                    Self::read_ip6_option(reader)?;
                Ipv6SdEndpoint(
                    Ipv6SdEndpointOption {
                        ipv6_address,
                        transport_protocol,
                        transport_protocol_number,
                    }
                )
            },
            PROTECTION_TYPE => {
                expect_len(PROTECTION_LEN)?;

                let mut protection_bytes: [u8; 8] = [0; 8];
                reader.read_exact(&mut protection_bytes)?;
                Protection(
                    ProtectionOption {
                        discardable,
                        alive_counter: u32::from_be_bytes([
                            protection_bytes[0],
                            protection_bytes[1],
                            protection_bytes[2],
                            protection_bytes[3],
                        ]),
                        crc: u32::from_be_bytes([
                            protection_bytes[4],
                            protection_bytes[5],
                            protection_bytes[6],
                            protection_bytes[7],
                        ]),
                    }
                )
            },
            SELECTIVE_TYPE => {
                let length_array = (length - 1) as usize;
                if 0 != length_array % 2 {
                    return Err(SdOptionUnexpectedLen {
                        expected_len: length - (length_array % 2) as u16,
                        actual_len: length,
                        option_type: type_raw,
                    });
                }
                let mut client_ids = Vec::with_capacity(length_array / 2);
                for _ in 0..(length_array / 2) {
                    let mut client_id_bytes: [u8; 2] = [0; 2];
                    reader.read_exact(&mut client_id_bytes)?;
                    client_ids.push(u16::from_be_bytes(client_id_bytes));
                }
                Selective(SelectiveOption { discardable, client_ids })
            },
            option_type => if discardable {
                // read the unknown option's body verbatim (note that we
                // already read length 1 as this contains the "discardable"
                // flag) so the option can be re-emitted byte-for-byte
                // instead of being dropped on write.
                let body_len = (length - 1) as usize;
                let mut body = Vec::with_capacity(body_len);
                reader.take(body_len as u64).read_to_end(&mut body)?;

                UnknownDiscardable(
                    UnknownDiscardableOption {
                        length,
                        option_type,
                        body,
                    }
                )
            } else {
                return Err(UnknownSdOptionType(option_type))
            },
        };
        Ok((3 + length, option))
    }

    #[inline]
    fn read_ip4_option<T: Read>(
        reader: &mut T,
    ) -> Result<([u8;4], TransportProtocol, u16), ReadError> {
        let mut ipv4endpoint_bytes: [u8; 8] = [0; 8];
        reader.read_exact(&mut ipv4endpoint_bytes)?;

        // ignore reserved byte
        let ipv4_address = [
            ipv4endpoint_bytes[0],
            ipv4endpoint_bytes[1],
            ipv4endpoint_bytes[2],
            ipv4endpoint_bytes[3],
        ];
        // ignore reserved byte
        let transport_protocol_raw = ipv4endpoint_bytes[5];
        let transport_protocol = match transport_protocol_raw {
            0x06 => TransportProtocol::Tcp,
            0x11 => TransportProtocol::Udp,
            other => TransportProtocol::Generic(other),
        };

        let transport_protocol_number =
            u16::from_be_bytes([ipv4endpoint_bytes[6], ipv4endpoint_bytes[7]]);

        Ok((ipv4_address, transport_protocol, transport_protocol_number))
    }

    #[inline]
    fn read_ip6_option<T: Read>(
        reader: &mut T,
    ) -> Result<([u8;16], TransportProtocol, u16), ReadError> {
        let mut ipv6endpoint_bytes: [u8; 20] = [0; 20];
        reader.read_exact(&mut ipv6endpoint_bytes)?;

        // ignore reserved byte
        let ipv6_address = [
            ipv6endpoint_bytes[0],
            ipv6endpoint_bytes[1],
            ipv6endpoint_bytes[2],
            ipv6endpoint_bytes[3],
            ipv6endpoint_bytes[4],
            ipv6endpoint_bytes[5],
            ipv6endpoint_bytes[6],
            ipv6endpoint_bytes[7],
            ipv6endpoint_bytes[8],
            ipv6endpoint_bytes[9],
            ipv6endpoint_bytes[10],
            ipv6endpoint_bytes[11],
            ipv6endpoint_bytes[12],
            ipv6endpoint_bytes[13],
            ipv6endpoint_bytes[14],
            ipv6endpoint_bytes[15],
        ];
        // ignore reserved byte
        let transport_protocol_raw = ipv6endpoint_bytes[17];
        let transport_protocol = match transport_protocol_raw {
            0x06 => TransportProtocol::Tcp,
            0x11 => TransportProtocol::Udp,
            other => TransportProtocol::Generic(other),
        };

        let transport_protocol_number =
            u16::from_be_bytes([ipv6endpoint_bytes[18], ipv6endpoint_bytes[19]]);

        Ok((ipv6_address, transport_protocol, transport_protocol_number))
    }

    /// Writes the eventgroup entry to the given writer.
    #[inline]
    pub fn write<T: Write>(&self, writer: &mut T) -> Result<(), WriteError> {
        use self::SdOption::*;
        use self::options::*;

        fn write_ipv4<R: Write>(
            writer: &mut R,
            len: u16,
            t: u8,
            addr: [u8;4],
            tp: TransportProtocol,
            port: u16,
        ) -> Result<(), WriteError> {
            let len_be = len.to_be_bytes();
            let port_be = port.to_be_bytes();
            writer.write_all(&[
                len_be[0], len_be[1], t, 0, 
                addr[0], addr[1], addr[2], addr[3],
                0, tp.into(), port_be[0], port_be[1],
            ])?;
            Ok(())
        }

        fn write_ipv6<R: Write>(
            writer: &mut R,
            len: u16,
            t: u8,
            addr: [u8;16],
            tp: TransportProtocol,
            port: u16,
        ) -> Result<(), WriteError> {
            let len_be = len.to_be_bytes();
            let port_be = port.to_be_bytes();
            writer.write_all(&[
                len_be[0], len_be[1], t, 0, 
                addr[0], addr[1], addr[2], addr[3],
                addr[4], addr[5], addr[6], addr[7],
                addr[8], addr[9], addr[10], addr[11],
                addr[12], addr[13], addr[14], addr[15],
                0, tp.into(), port_be[0], port_be[1],
            ])?;
            Ok(())
        }

        match self {
            Configuration(c) => {
                let len_be = (1u16 + c.configuration_string.len() as u16).to_be_bytes();
                writer.write_all(
                    &[
                        len_be[0],
                        len_be[1],
                        CONFIGURATION_TYPE,
                        if c.discardable { DISCARDABLE_FLAG } else { 0 },
                    ]
                )?;
                writer.write_all(&c.configuration_string)?;
                Ok(())
            },
            LoadBalancing(o) => {
                
                let len_be = LOAD_BALANCING_LEN.to_be_bytes();
                let prio_be = o.priority.to_be_bytes();
                let weight_be = o.weight.to_be_bytes();

                writer.write_all(
                    &[
                        len_be[0],
                        len_be[1],
                        LOAD_BALANCING_TYPE,
                        if o.discardable { DISCARDABLE_FLAG } else { 0 },
                        prio_be[0],
                        prio_be[1],
                        weight_be[0],
                        weight_be[1],
                    ]
                )?;
                Ok(())
            },
            Ipv4Endpoint(o) => write_ipv4(
                writer,
                IPV4_ENDPOINT_LEN,
                IPV4_ENDPOINT_TYPE,
                o.ipv4_address,
                o.transport_protocol,
                o.transport_protocol_number,
            ),
            Ipv6Endpoint(o) => write_ipv6(
                writer,
                IPV6_ENDPOINT_LEN,
                IPV6_ENDPOINT_TYPE,
                o.ipv6_address,
                o.transport_protocol,
                o.transport_protocol_number,
            ),
            Ipv4Multicast(o) => write_ipv4(
                writer,
                IPV4_MULTICAST_LEN,
                IPV4_MULTICAST_TYPE,
                o.ipv4_address,
                o.transport_protocol,
                o.transport_protocol_number,
            ),
            Ipv6Multicast(o) => write_ipv6(
                writer,
                IPV6_MULTICAST_LEN,
                IPV6_MULTICAST_TYPE,
                o.ipv6_address,
                o.transport_protocol,
                o.transport_protocol_number,
            ),
            Ipv4SdEndpoint(o) => write_ipv4(
                writer,
                IPV4_SD_ENDPOINT_LEN,
                IPV4_SD_ENDPOINT_TYPE,
                o.ipv4_address,
                o.transport_protocol,
                o.transport_protocol_number,
            ),
            Ipv6SdEndpoint(o) => write_ipv6(
                writer,
                IPV6_SD_ENDPOINT_LEN,
                IPV6_SD_ENDPOINT_TYPE,
                o.ipv6_address,
                o.transport_protocol,
                o.transport_protocol_number,
            ),
            Protection(o) => {
                let len_be = PROTECTION_LEN.to_be_bytes();
                let counter_be = o.alive_counter.to_be_bytes();
                let crc_be = o.crc.to_be_bytes();
                writer.write_all(
                    &[
                        len_be[0],
                        len_be[1],
                        PROTECTION_TYPE,
                        if o.discardable { DISCARDABLE_FLAG } else { 0 },
                        counter_be[0],
                        counter_be[1],
                        counter_be[2],
                        counter_be[3],
                        crc_be[0],
                        crc_be[1],
                        crc_be[2],
                        crc_be[3],
                    ]
                )?;
                Ok(())
            },
            Selective(o) => {
                let len_be = (1u16 + 2 * o.client_ids.len() as u16).to_be_bytes();
                writer.write_all(
                    &[
                        len_be[0],
                        len_be[1],
                        SELECTIVE_TYPE,
                        if o.discardable { DISCARDABLE_FLAG } else { 0 },
                    ]
                )?;
                for client_id in &o.client_ids {
                    writer.write_all(&client_id.to_be_bytes())?;
                }
                Ok(())
            },
            UnknownDiscardable(o) => {
                let len_be = (1u16 + o.body.len() as u16).to_be_bytes();
                writer.write_all(
                    &[
                        len_be[0],
                        len_be[1],
                        o.option_type,
                        DISCARDABLE_FLAG,
                    ]
                )?;
                writer.write_all(&o.body)?;
                Ok(())
            },
        }
    }

    /// Serializes option and append data to a vec
    pub fn append_bytes_to_vec(&self, buffer: &mut Vec<u8>) -> Result<(), ValueError> {
        use self::SdOption::*;
        use self::options::*;

        fn append_ip4(
            buffer: &mut Vec<u8>,
            ipv4_address: [u8;4],
            transport_protocol: TransportProtocol,
            transport_protocol_number: u16,
        ) {
            buffer.extend_from_slice(&ipv4_address);
            buffer.push(0x00); // reserved
            buffer.push(transport_protocol.into());
            buffer.extend_from_slice(&transport_protocol_number.to_be_bytes());
        }

        fn append_ip6(
            buffer: &mut Vec<u8>,
            ipv6_address: [u8;16],
            transport_protocol: TransportProtocol,
            transport_protocol_number: u16,
        ) {
            buffer.extend_from_slice(&ipv6_address);
            buffer.push(0x00); // reserved
            buffer.push(transport_protocol.into());
            buffer.extend_from_slice(&transport_protocol_number.to_be_bytes());
        }

        match self {
            Configuration(o) => {
                // + 1 for reserved byte
                let length_bytes = (1u16 + o.configuration_string.len() as u16).to_be_bytes();
                buffer.extend_from_slice(&length_bytes);
                buffer.push(CONFIGURATION_TYPE);
                buffer.push(if o.discardable { DISCARDABLE_FLAG } else { 0 });
                buffer.extend_from_slice(&o.configuration_string);
            },
            LoadBalancing(o) => {
                buffer.extend_from_slice(&LOAD_BALANCING_LEN.to_be_bytes());
                buffer.push(LOAD_BALANCING_TYPE);
                buffer.push(if o.discardable { DISCARDABLE_FLAG } else { 0 });
                buffer.extend_from_slice(&o.priority.to_be_bytes());
                buffer.extend_from_slice(&o.weight.to_be_bytes());
            },
            Ipv4Endpoint(o) => {
                buffer.extend_from_slice(&IPV4_ENDPOINT_LEN.to_be_bytes());
                buffer.push(IPV4_ENDPOINT_TYPE);
                buffer.push(0x00u8); // Reserved byte
                append_ip4(
                    buffer,
                    o.ipv4_address,
                    o.transport_protocol,
                    o.transport_protocol_number,
                );
            },
            Ipv6Endpoint(o) => {
                buffer.extend_from_slice(&IPV6_ENDPOINT_LEN.to_be_bytes());
                buffer.push(IPV6_ENDPOINT_TYPE); // Type
                buffer.push(0x00u8); // Reserved byte
                append_ip6(
                    buffer,
                    o.ipv6_address,
                    o.transport_protocol,
                    o.transport_protocol_number,
                );
            },
            Ipv4Multicast(o) => {
                buffer.extend_from_slice(&IPV4_MULTICAST_LEN.to_be_bytes());
                buffer.push(IPV4_MULTICAST_TYPE); // Type
                buffer.push(0x00u8); // Reserved byte
                append_ip4(
                    buffer,
                    o.ipv4_address,
                    o.transport_protocol,
                    o.transport_protocol_number,
                );
            },
            Ipv6Multicast(o) => {
                buffer.extend_from_slice(&IPV6_MULTICAST_LEN.to_be_bytes());
                buffer.push(IPV6_MULTICAST_TYPE); // Type
                buffer.push(0x00u8); // Reserved byte
                append_ip6(
                    buffer,
                    o.ipv6_address,
                    o.transport_protocol,
                    o.transport_protocol_number,
                );
            },
            Ipv4SdEndpoint(o) => {
                buffer.extend_from_slice(&IPV4_SD_ENDPOINT_LEN.to_be_bytes());
                buffer.push(IPV4_SD_ENDPOINT_TYPE);
                buffer.push(0x00u8); // Reserved byte
                append_ip4(
                    buffer,
                    o.ipv4_address,
                    o.transport_protocol,
                    o.transport_protocol_number,
                );
            },
            Ipv6SdEndpoint(o) => {
                buffer.extend_from_slice(&IPV6_SD_ENDPOINT_LEN.to_be_bytes());
                buffer.push(IPV6_SD_ENDPOINT_TYPE); // Type
                buffer.push(0x00u8); // Reserved byte
                append_ip6(
                    buffer,
                    o.ipv6_address,
                    o.transport_protocol,
                    o.transport_protocol_number,
                );
            },
            Protection(o) => {
                buffer.extend_from_slice(&PROTECTION_LEN.to_be_bytes());
                buffer.push(PROTECTION_TYPE);
                buffer.push(if o.discardable { DISCARDABLE_FLAG } else { 0 });
                buffer.extend_from_slice(&o.alive_counter.to_be_bytes());
                buffer.extend_from_slice(&o.crc.to_be_bytes());
            },
            Selective(o) => {
                let len_be = (1u16 + 2 * o.client_ids.len() as u16).to_be_bytes();
                buffer.extend_from_slice(&len_be);
                buffer.push(SELECTIVE_TYPE);
                buffer.push(if o.discardable { DISCARDABLE_FLAG } else { 0 });
                for client_id in &o.client_ids {
                    buffer.extend_from_slice(&client_id.to_be_bytes());
                }
            },
            UnknownDiscardable(o) => {
                let len_be = (1u16 + o.body.len() as u16).to_be_bytes();
                buffer.extend_from_slice(&len_be);
                buffer.push(o.option_type);
                buffer.push(DISCARDABLE_FLAG);
                buffer.extend_from_slice(&o.body);
            },
        }
        Ok(())
    }

    /// Length of the serialized header in bytes.
    #[inline]
    pub fn header_len(&self) -> usize {
        use self::SdOption::*;
        use self::options::*;

        3 + match self {
            Configuration(o) => 1 + o.configuration_string.len(),
            LoadBalancing(_) => usize::from(LOAD_BALANCING_LEN),
            Ipv4Endpoint(_) => usize::from(IPV4_ENDPOINT_LEN),
            Ipv6Endpoint(_) => usize::from(IPV6_ENDPOINT_LEN),
            Ipv4Multicast(_) => usize::from(IPV4_MULTICAST_LEN),
            Ipv6Multicast(_) => usize::from(IPV6_MULTICAST_LEN),
            Ipv4SdEndpoint(_) => usize::from(IPV4_SD_ENDPOINT_LEN),
            Ipv6SdEndpoint(_) => usize::from(IPV6_SD_ENDPOINT_LEN),
            Protection(_) => usize::from(PROTECTION_LEN),
            Selective(o) => 1 + 2 * o.client_ids.len(),
            UnknownDiscardable(o) => 1 + o.body.len(),
        }
    }

    /// Type-specific equality used when deciding whether a proposed option
    /// can reuse an already-stored one (see [`SdHeader::add_entry`]).
    ///
    /// This differs from `PartialEq` for endpoint/multicast options: two
    /// options referring to the same `(l4proto, port, addr)` are considered
    /// the same option even if the `discardable` flag differs, matching the
    /// comparison rule used by the entry/option sharing logic.
    pub fn is_same_option(&self, other: &SdOption) -> bool {
        use self::SdOption::*;
        match (self, other) {
            (Configuration(a), Configuration(b)) => {
                // Compared as a key/value multimap, not as raw bytes: the
                // same entries in a different token order are the same
                // option (spec.md: "by the key/value multimap").
                let mut a_items: Vec<_> = a.iter_items().collect();
                let mut b_items: Vec<_> = b.iter_items().collect();
                a_items.sort_unstable();
                b_items.sort_unstable();
                a_items == b_items
            }
            (LoadBalancing(a), LoadBalancing(b)) => a.priority == b.priority && a.weight == b.weight,
            (Ipv4Endpoint(a), Ipv4Endpoint(b)) => {
                a.transport_protocol_number == b.transport_protocol_number
                    && a.transport_protocol == b.transport_protocol
                    && a.ipv4_address == b.ipv4_address
            }
            (Ipv6Endpoint(a), Ipv6Endpoint(b)) => {
                a.transport_protocol_number == b.transport_protocol_number
                    && a.transport_protocol == b.transport_protocol
                    && a.ipv6_address == b.ipv6_address
            }
            (Ipv4Multicast(a), Ipv4Multicast(b)) => {
                a.transport_protocol_number == b.transport_protocol_number
                    && a.transport_protocol == b.transport_protocol
                    && a.ipv4_address == b.ipv4_address
            }
            (Ipv6Multicast(a), Ipv6Multicast(b)) => {
                a.transport_protocol_number == b.transport_protocol_number
                    && a.transport_protocol == b.transport_protocol
                    && a.ipv6_address == b.ipv6_address
            }
            (Ipv4SdEndpoint(a), Ipv4SdEndpoint(b)) => {
                a.transport_protocol_number == b.transport_protocol_number
                    && a.transport_protocol == b.transport_protocol
                    && a.ipv4_address == b.ipv4_address
            }
            (Ipv6SdEndpoint(a), Ipv6SdEndpoint(b)) => {
                a.transport_protocol_number == b.transport_protocol_number
                    && a.transport_protocol == b.transport_protocol
                    && a.ipv6_address == b.ipv6_address
            }
            (Protection(a), Protection(b)) => a.alive_counter == b.alive_counter && a.crc == b.crc,
            (Selective(a), Selective(b)) => a.client_ids == b.client_ids,
            (UnknownDiscardable(a), UnknownDiscardable(b)) => a == b,
            _ => false,
        }
    }

    /// Returns the endpoint address tuple `(l4proto, port, addr)` used to
    /// compare subscriptions that reference different option instances with
    /// equal endpoints (see [`eventgroup_entries_match`]).
    pub fn endpoint_tuple(&self) -> Option<(u8, u16, EndpointAddr)> {
        use self::SdOption::*;
        match self {
            Ipv4Endpoint(o) => Some((
                o.transport_protocol.into(),
                o.transport_protocol_number,
                EndpointAddr::V4(o.ipv4_address),
            )),
            Ipv6Endpoint(o) => Some((
                o.transport_protocol.into(),
                o.transport_protocol_number,
                EndpointAddr::V6(o.ipv6_address),
            )),
            Ipv4Multicast(o) => Some((
                o.transport_protocol.into(),
                o.transport_protocol_number,
                EndpointAddr::V4(o.ipv4_address),
            )),
            Ipv6Multicast(o) => Some((
                o.transport_protocol.into(),
                o.transport_protocol_number,
                EndpointAddr::V6(o.ipv6_address),
            )),
            Ipv4SdEndpoint(o) => Some((
                o.transport_protocol.into(),
                o.transport_protocol_number,
                EndpointAddr::V4(o.ipv4_address),
            )),
            Ipv6SdEndpoint(o) => Some((
                o.transport_protocol.into(),
                o.transport_protocol_number,
                EndpointAddr::V6(o.ipv6_address),
            )),
            _ => None,
        }
    }
}

/// Address half of the `(l4proto, port, addr)` tuple used to compare
/// endpoint/multicast options independent of their IPv4/IPv6 variant.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EndpointAddr {
    V4([u8; 4]),
    V6([u8; 16]),
}




#[test]
fn sd_header_write_unexpected_end_of_slice() {
    let header = SdHeader::default();
    let result = header.write_to_slice(&mut []);
    assert_matches!(result, Err(WriteError::UnexpectedEndOfSlice(_)));
}

#[test]
fn service_entry_read_unknown_service_entry_type() {
    let mut buffer = [0x00; entries::ENTRY_LEN];
    buffer[0] = 0xFF; // Unknown Type
    let mut cursor = std::io::Cursor::new(buffer);
    let result = SdEntry::read(&mut cursor);
    assert_matches!(result, Err(ReadError::UnknownSdServiceEntryType(0xFF)));
}

#[test]
fn new_service_entry_ttl_too_large() {
    let result = SdEntry::new_service_entry(
        SdServiceEntryType::OfferService,
        0,
        0,
        0,
        0,
        0,
        0,
        0,
        0xFFFF_FFFF,
        0,
    );
    assert_matches!(result, Err(ValueError::TtlTooLarge(0xFFFF_FFFF)));
}

#[test]
fn new_service_entry_number_option1_too_large() {
    let result = SdEntry::new_service_entry(
        SdServiceEntryType::OfferService,
        0,
        0,
        0xFF,
        0,
        0,
        0,
        0,
        0,
        0,
    );
    assert_matches!(result, Err(ValueError::NumberOfOption1TooLarge(0xFF)));
}

#[test]
fn new_service_entry_number_option2_too_large() {
    let result = SdEntry::new_service_entry(
        SdServiceEntryType::OfferService,
        0,
        0,
        0,
        0xFF,
        0,
        0,
        0,
        0,
        0,
    );
    assert_matches!(result, Err(ValueError::NumberOfOption2TooLarge(0xFF)));
}

#[test]
fn new_service_find_service_entry_zero_ttl() {
    let result = SdEntry::new_find_service_entry(0, 0, 0, 0, 0, 0, 0, 0, 0);
    assert_matches!(result, Err(ValueError::TtlZeroIndicatesStopOffering));
}

#[test]
fn new_service_offer_service_entry_zero_ttl() {
    let result = SdEntry::new_offer_service_entry(0, 0, 0, 0, 0, 0, 0, 0, 0);
    assert_matches!(result, Err(ValueError::TtlZeroIndicatesStopOffering));
}
