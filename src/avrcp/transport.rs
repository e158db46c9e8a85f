//! Collaborator traits
//!
//! The controller never builds PDUs or pages devices itself. It drives a
//! [`ControlTransport`] that does, and reads time from a [`Clock`].

use bt_hci::param::BdAddr;

use super::{Command, SessionId};

/// Outbound side of the AVRCP control channel
///
/// Implementations map each [`Command`] onto its AVRCP PDU and hand it to the
/// AVCTP channel of `session`. All methods return immediately; results arrive
/// later as decoded events.
pub trait ControlTransport {
    /// Transport specific failure
    type Error: core::fmt::Debug;

    /// Start opening a control channel to `address`, returning the session id it will use
    ///
    /// # Errors
    /// Returns an error if the connection attempt could not be started.
    fn connect(&mut self, address: BdAddr) -> Result<SessionId, Self::Error>;

    /// Start closing the control channel of `session`
    ///
    /// # Errors
    /// Returns an error if the disconnect could not be started.
    fn disconnect(&mut self, session: SessionId) -> Result<(), Self::Error>;

    /// Send `command` on `session`
    ///
    /// # Errors
    /// Returns an error if the command could not be queued for transmission.
    fn send(&mut self, session: SessionId, command: Command) -> Result<(), Self::Error>;
}

/// Monotonic millisecond time source
pub trait Clock {
    /// Milliseconds since an arbitrary fixed point
    fn now_ms(&self) -> u64;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_ms(&self) -> u64 {
        (**self).now_ms()
    }
}
