//! Line-oriented output seam for the serial-console-equivalent stream.
//!
//! The join supervisor and the snapshot emitter write through this trait so
//! their output contract is testable in memory. On hardware the stream is
//! the `defmt` RTT channel, this ecosystem's serial console.

/// Destination for the device's human-readable output stream.
pub trait Console {
    /// Write one complete line.
    fn line(&mut self, text: &str);

    /// Write a progress fragment (e.g. a waiting dot) without ending the line.
    fn progress(&mut self, text: &str);
}

#[cfg(feature = "wifi")]
mod defmt_impl {
    use super::Console;

    /// Console that routes the output stream through `defmt`.
    ///
    /// `defmt` is record-oriented, so progress fragments become one record
    /// each rather than a partially written line.
    #[derive(Default)]
    pub struct DefmtConsole;

    impl DefmtConsole {
        /// Create a console backed by the global `defmt` logger.
        #[must_use]
        pub const fn new() -> Self {
            Self
        }
    }

    impl Console for DefmtConsole {
        fn line(&mut self, text: &str) {
            defmt::info!("{=str}", text);
        }

        fn progress(&mut self, text: &str) {
            defmt::info!("{=str}", text);
        }
    }
}

#[cfg(feature = "wifi")]
pub use defmt_impl::DefmtConsole;
