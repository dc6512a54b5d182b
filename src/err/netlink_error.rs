/// Errors surfaced while parsing netlink messages in the link availability
/// supervisor (C9).
#[derive(Debug)]
pub enum NetlinkError {
    /// The kernel returned an `NLMSG_ERROR` frame carrying the given errno.
    Nlmsgerr(i32),

    /// A message or attribute chain claimed a length that runs past the end
    /// of the buffer it was read from.
    Truncated,

    /// An attribute or message had an internally inconsistent length (e.g.
    /// an `rtattr` shorter than its own header).
    Malformed(&'static str),

    /// The underlying socket call failed.
    Io(std::io::Error),
}

impl core::fmt::Display for NetlinkError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use NetlinkError::*;
        match self {
            Nlmsgerr(errno) => write!(f, "netlink request failed with errno {errno}"),
            Truncated => write!(f, "netlink message truncated before its declared length"),
            Malformed(what) => write!(f, "malformed netlink {what}"),
            Io(err) => write!(f, "netlink socket error: {err}"),
        }
    }
}

impl std::error::Error for NetlinkError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            NetlinkError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for NetlinkError {
    fn from(err: std::io::Error) -> Self {
        NetlinkError::Io(err)
    }
}
