/// Configuration of the service discovery message builder.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct SdConfig {
    /// Maximum allowed serialized size (in bytes, including the SOME/IP
    /// header) of a single SD message sent over UDP. [`crate::sd::SdHeader::add_entry`]
    /// refuses to grow the message past this cap.
    pub udp_sd_payload_cap: u32,
}

impl core::default::Default for SdConfig {
    fn default() -> Self {
        Self {
            // common default MTU-driven cap for SD messages sent over UDP.
            udp_sd_payload_cap: 1400,
        }
    }
}
