use derive_more::derive::{Display, Error};

/// A specialized `Result` where the error is this crate's `Error` type.
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Define a unified error type for this crate.
#[expect(missing_docs, reason = "The variants are self-explanatory.")]
#[derive(Debug, Display, Error, defmt::Format)]
pub enum Error {
    // `SpawnError` does not implement `core::error::Error`, hence
    // `#[error(not(source))]`.
    #[cfg(feature = "wifi")]
    #[display("{_0:?}")]
    TaskSpawn(#[error(not(source))] embassy_executor::SpawnError),

    #[display("Format error")]
    Format,

    #[display("Record serialization failed")]
    RecordEncode,

    #[display("DNS lookup failed")]
    DnsLookup,

    #[display("No DNS results")]
    DnsEmpty,

    #[display("Socket bind failed")]
    SocketBind,

    #[display("NTP send failed")]
    NtpSend,

    #[display("NTP receive failed")]
    NtpReceive,

    #[display("NTP receive timed out")]
    NtpTimeout,

    #[display("NTP response too short")]
    NtpResponseTooShort,

    #[display("NTP timestamp out of range")]
    NtpTimestampInvalid,
}

impl From<core::fmt::Error> for Error {
    fn from(_: core::fmt::Error) -> Self {
        Self::Format
    }
}

#[cfg(feature = "wifi")]
impl From<embassy_executor::SpawnError> for Error {
    fn from(err: embassy_executor::SpawnError) -> Self {
        Self::TaskSpawn(err)
    }
}
