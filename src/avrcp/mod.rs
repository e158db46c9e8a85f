//! AVRCP (Audio/Video Remote Control Profile) Controller
//!
//! This module implements the controller side of AVRCP: one control session
//! with a remote target, sequenced control commands, and the routing of
//! command responses and player notifications into typed outcomes.
//!
//! ## Architecture
//!
//! - **Session State**: phase, identity and handle of the single session,
//!   the Pending Command and the notification ledger
//! - **Dispatcher**: validates readiness and forwards one command at a time
//! - **Router**: correlates decoded events against the Session State
//! - **Controller**: owns all of the above plus the transport and clock
//!
//! PDU encoding and decoding stay outside this crate. The transport sends a
//! [`Command`] and a decoder hands back [`AvrcpEvent`] records.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use avrcp_controller::avrcp::{AvrcpController, Command};
//!
//! let mut controller = AvrcpController::new(transport, clock, outcomes.sender());
//! controller.connect("00:1B:DC:08:0A:A5".parse()?)?;
//! // ... connection-established event arrives through handle_event ...
//! controller.play()?;
//! ```

pub mod command;
pub mod controller;
pub mod dispatcher;
pub mod event;
pub mod ledger;
pub mod router;
pub mod session;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;

pub use command::*;
pub use controller::*;
pub use event::*;
pub use ledger::*;
pub use session::*;
pub use transport::*;

use core::fmt;

/// Locally assigned identifier of an AVRCP session (the AVCTP channel id)
pub type SessionId = u16;

/// AV/C response type carried by every command-status event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ResponseCode {
    /// Target does not implement the command
    NotImplemented,
    /// Command accepted
    Accepted,
    /// Command rejected
    Rejected,
    /// Target is changing state
    InTransition,
    /// Status inquiry answered
    ImplementedStable,
    /// Registered value changed
    Changed,
    /// Command received, final response follows
    Interim,
    /// Any other ctype value
    Unknown(u8),
}

impl ResponseCode {
    /// Decode a raw ctype value
    #[must_use]
    pub const fn from_raw(raw: u8) -> Self {
        match raw {
            0x08 => Self::NotImplemented,
            0x09 => Self::Accepted,
            0x0A => Self::Rejected,
            0x0B => Self::InTransition,
            0x0C => Self::ImplementedStable,
            0x0D => Self::Changed,
            0x0F => Self::Interim,
            other => Self::Unknown(other),
        }
    }

    /// Raw ctype value
    #[must_use]
    pub const fn raw(self) -> u8 {
        match self {
            Self::NotImplemented => 0x08,
            Self::Accepted => 0x09,
            Self::Rejected => 0x0A,
            Self::InTransition => 0x0B,
            Self::ImplementedStable => 0x0C,
            Self::Changed => 0x0D,
            Self::Interim => 0x0F,
            Self::Unknown(raw) => raw,
        }
    }

    /// Whether this is the interim acknowledgement rather than a final response
    #[must_use]
    pub const fn is_interim(self) -> bool {
        matches!(self, Self::Interim)
    }

    /// Whether the target refused the command
    #[must_use]
    pub const fn is_error(self) -> bool {
        matches!(
            self,
            Self::NotImplemented | Self::Rejected | Self::Unknown(_)
        )
    }
}

impl From<u8> for ResponseCode {
    fn from(raw: u8) -> Self {
        Self::from_raw(raw)
    }
}

/// Play status reported by the target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PlayStatus {
    /// Stopped
    Stopped,
    /// Playing
    Playing,
    /// Paused
    Paused,
    /// Seeking forward
    FwdSeek,
    /// Seeking backward
    RevSeek,
    /// Error or unknown value
    Error,
}

impl PlayStatus {
    /// Decode a raw play status, mapping unknown values to [`PlayStatus::Error`]
    #[must_use]
    pub const fn from_raw(raw: u8) -> Self {
        match raw {
            0x00 => Self::Stopped,
            0x01 => Self::Playing,
            0x02 => Self::Paused,
            0x03 => Self::FwdSeek,
            0x04 => Self::RevSeek,
            _ => Self::Error,
        }
    }
}

/// Repeat mode player application setting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum RepeatMode {
    /// Repeat off
    Off = 0x01,
    /// Repeat the current track
    SingleTrack = 0x02,
    /// Repeat all tracks
    AllTracks = 0x03,
    /// Repeat the current group
    Group = 0x04,
}

impl TryFrom<u8> for RepeatMode {
    type Error = u8;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        match raw {
            0x01 => Ok(Self::Off),
            0x02 => Ok(Self::SingleTrack),
            0x03 => Ok(Self::AllTracks),
            0x04 => Ok(Self::Group),
            other => Err(other),
        }
    }
}

/// Shuffle mode player application setting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum ShuffleMode {
    /// Shuffle off
    Off = 0x01,
    /// Shuffle all tracks
    AllTracks = 0x02,
    /// Shuffle within the current group
    Group = 0x03,
}

impl TryFrom<u8> for ShuffleMode {
    type Error = u8;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        match raw {
            0x01 => Ok(Self::Off),
            0x02 => Ok(Self::AllTracks),
            0x03 => Ok(Self::Group),
            other => Err(other),
        }
    }
}

/// Pass-through operation identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OperationId {
    /// Skip
    Skip,
    /// Volume up
    VolumeUp,
    /// Volume down
    VolumeDown,
    /// Mute
    Mute,
    /// Play
    Play,
    /// Stop
    Stop,
    /// Pause
    Pause,
    /// Rewind
    Rewind,
    /// Fast forward
    FastForward,
    /// Next track
    Forward,
    /// Previous track
    Backward,
    /// Any other operation id
    Other(u8),
}

impl OperationId {
    /// Decode a raw operation id
    #[must_use]
    pub const fn from_raw(raw: u8) -> Self {
        match raw {
            0x3C => Self::Skip,
            0x41 => Self::VolumeUp,
            0x42 => Self::VolumeDown,
            0x43 => Self::Mute,
            0x44 => Self::Play,
            0x45 => Self::Stop,
            0x46 => Self::Pause,
            0x48 => Self::Rewind,
            0x49 => Self::FastForward,
            0x4B => Self::Forward,
            0x4C => Self::Backward,
            other => Self::Other(other),
        }
    }

    /// Raw operation id
    #[must_use]
    pub const fn raw(self) -> u8 {
        match self {
            Self::Skip => 0x3C,
            Self::VolumeUp => 0x41,
            Self::VolumeDown => 0x42,
            Self::Mute => 0x43,
            Self::Play => 0x44,
            Self::Stop => 0x45,
            Self::Pause => 0x46,
            Self::Rewind => 0x48,
            Self::FastForward => 0x49,
            Self::Forward => 0x4B,
            Self::Backward => 0x4C,
            Self::Other(raw) => raw,
        }
    }
}

/// Errors from connect and disconnect requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SessionError {
    /// A session is already connecting or established
    AlreadyConnected,
    /// There is no session to act on
    NoActiveSession,
    /// The transport refused the request
    TransportFailed,
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyConnected => write!(f, "AVRCP session already connecting or established"),
            Self::NoActiveSession => write!(f, "No active AVRCP session"),
            Self::TransportFailed => write!(f, "Transport refused the session request"),
        }
    }
}

impl core::error::Error for SessionError {}

/// Errors from command dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DispatchError {
    /// Session is not established
    SessionNotReady,
    /// A previous command has not reached its final response
    CommandInFlight,
    /// A command argument is out of range
    InvalidArgument,
    /// The transport refused to send the command
    TransportFailed,
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SessionNotReady => write!(f, "AVRCP session is not established"),
            Self::CommandInFlight => write!(f, "Previous command still awaiting its final response"),
            Self::InvalidArgument => write!(f, "Command argument out of range"),
            Self::TransportFailed => write!(f, "Transport refused to send the command"),
        }
    }
}

impl core::error::Error for DispatchError {}
