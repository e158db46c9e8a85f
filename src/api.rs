//! AVRCP Controller API Functions
//!
//! Async request/response functions for talking to a controller that runs in
//! [`crate::processor::run`]. Requests and responses travel over the
//! `embassy-sync` channels bundled in [`ControlChannels`], so the functions can
//! be called from any task: a UI, a button handler, a CLI.
//!
//! Requests are answered in order; callers sharing one [`ControlChannels`]
//! should not issue requests concurrently.
//!
//! # Usage
//!
//! ```rust,ignore
//! use avrcp_controller::api::{self, ControlChannels};
//! use avrcp_controller::avrcp::Command;
//!
//! static CHANNELS: ControlChannels<CriticalSectionRawMutex, 8> = ControlChannels::new();
//!
//! api::connect(&CHANNELS, "00:1B:DC:08:0A:A5".parse()?).await?;
//! let outcome = api::next_outcome(&CHANNELS).await;
//! api::send_command(&CHANNELS, Command::Play).await?;
//! ```

use core::fmt;

use embassy_sync::{
    blocking_mutex::raw::RawMutex,
    channel::{Channel, Sender},
};

use crate::avrcp::{
    AvrcpEvent, Command, ControllerOutcome, DispatchError, NotificationSet, SessionError,
    SessionPhase,
};
use crate::{BluetoothAddress, constants::DEFAULT_CHANNEL_DEPTH};

/// Channels between application tasks and the processor
pub struct ControlChannels<M: RawMutex, const N: usize> {
    pub(crate) events: Channel<M, AvrcpEvent, N>,
    pub(crate) requests: Channel<M, ControlRequest, N>,
    pub(crate) responses: Channel<M, ControlResponse, N>,
    pub(crate) outcomes: Channel<M, ControllerOutcome, N>,
}

impl<M: RawMutex, const N: usize> ControlChannels<M, N> {
    /// Create empty channels
    #[must_use]
    pub const fn new() -> Self {
        Self {
            events: Channel::new(),
            requests: Channel::new(),
            responses: Channel::new(),
            outcomes: Channel::new(),
        }
    }

    /// Sender to hand to [`crate::avrcp::AvrcpController::new`]
    pub fn outcome_sender(&self) -> Sender<'_, M, ControllerOutcome, N> {
        self.outcomes.sender()
    }
}

impl<M: RawMutex, const N: usize> Default for ControlChannels<M, N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Channels with the default depth
pub type DefaultControlChannels<M> = ControlChannels<M, DEFAULT_CHANNEL_DEPTH>;

/// Request handled by the processor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ControlRequest {
    /// Connect to a target
    Connect(BluetoothAddress),
    /// Disconnect the session
    Disconnect,
    /// Issue a command
    Command(Command),
    /// Read the session phase
    GetPhase,
    /// Read the confirmed subscriptions
    GetSubscriptions,
    /// Check the Pending Command deadline
    PollTimeout,
}

/// Processor answer to a [`ControlRequest`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ControlResponse {
    /// Result of `Connect` or `Disconnect`
    Session(Result<(), SessionError>),
    /// Result of `Command`
    Dispatch(Result<(), DispatchError>),
    /// Current phase
    Phase(SessionPhase),
    /// Confirmed subscriptions
    Subscriptions(NotificationSet),
    /// Command abandoned by `PollTimeout`, if any
    TimedOut(Option<Command>),
}

/// Errors returned by the API functions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ControlError {
    /// Connect or disconnect failed
    Session(SessionError),
    /// Command dispatch failed
    Dispatch(DispatchError),
    /// The processor answered a different request
    UnexpectedResponse,
}

impl fmt::Display for ControlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Session(e) => write!(f, "{e}"),
            Self::Dispatch(e) => write!(f, "{e}"),
            Self::UnexpectedResponse => write!(f, "Unexpected response from processor"),
        }
    }
}

impl core::error::Error for ControlError {}

impl From<SessionError> for ControlError {
    fn from(e: SessionError) -> Self {
        Self::Session(e)
    }
}

impl From<DispatchError> for ControlError {
    fn from(e: DispatchError) -> Self {
        Self::Dispatch(e)
    }
}

async fn request<M: RawMutex, const N: usize>(
    channels: &ControlChannels<M, N>,
    request: ControlRequest,
) -> ControlResponse {
    channels.requests.send(request).await;
    channels.responses.receive().await
}

/// Start connecting to `address`.
///
/// Completion is reported as a connection outcome.
///
/// # Errors
///
/// Returns an error if a session already exists or the transport refused.
pub async fn connect<M: RawMutex, const N: usize>(
    channels: &ControlChannels<M, N>,
    address: BluetoothAddress,
) -> Result<(), ControlError> {
    match request(channels, ControlRequest::Connect(address)).await {
        ControlResponse::Session(result) => Ok(result?),
        _ => Err(ControlError::UnexpectedResponse),
    }
}

/// Ask the transport to close the session.
///
/// # Errors
///
/// Returns an error if there is no session or the transport refused.
pub async fn disconnect<M: RawMutex, const N: usize>(
    channels: &ControlChannels<M, N>,
) -> Result<(), ControlError> {
    match request(channels, ControlRequest::Disconnect).await {
        ControlResponse::Session(result) => Ok(result?),
        _ => Err(ControlError::UnexpectedResponse),
    }
}

/// Issue a command.
///
/// The response arrives later as a command-completed outcome.
///
/// # Errors
///
/// Returns the dispatch error if the command could not be issued.
pub async fn send_command<M: RawMutex, const N: usize>(
    channels: &ControlChannels<M, N>,
    command: Command,
) -> Result<(), ControlError> {
    match request(channels, ControlRequest::Command(command)).await {
        ControlResponse::Dispatch(result) => Ok(result?),
        _ => Err(ControlError::UnexpectedResponse),
    }
}

/// Get the current session phase.
///
/// # Errors
///
/// Returns an error if the response is unexpected.
pub async fn get_phase<M: RawMutex, const N: usize>(
    channels: &ControlChannels<M, N>,
) -> Result<SessionPhase, ControlError> {
    match request(channels, ControlRequest::GetPhase).await {
        ControlResponse::Phase(phase) => Ok(phase),
        _ => Err(ControlError::UnexpectedResponse),
    }
}

/// Get the notification classes confirmed subscribed.
///
/// # Errors
///
/// Returns an error if the response is unexpected.
pub async fn get_subscriptions<M: RawMutex, const N: usize>(
    channels: &ControlChannels<M, N>,
) -> Result<NotificationSet, ControlError> {
    match request(channels, ControlRequest::GetSubscriptions).await {
        ControlResponse::Subscriptions(set) => Ok(set),
        _ => Err(ControlError::UnexpectedResponse),
    }
}

/// Check the Pending Command deadline now.
///
/// The processor already checks after every event and request; call this
/// from a timer when the target may go silent.
///
/// # Errors
///
/// Returns an error if the response is unexpected.
pub async fn poll_timeout<M: RawMutex, const N: usize>(
    channels: &ControlChannels<M, N>,
) -> Result<Option<Command>, ControlError> {
    match request(channels, ControlRequest::PollTimeout).await {
        ControlResponse::TimedOut(command) => Ok(command),
        _ => Err(ControlError::UnexpectedResponse),
    }
}

/// Hand a decoded event to the processor.
pub async fn submit_event<M: RawMutex, const N: usize>(
    channels: &ControlChannels<M, N>,
    event: AvrcpEvent,
) {
    channels.events.send(event).await;
}

/// Wait for the next controller outcome.
pub async fn next_outcome<M: RawMutex, const N: usize>(
    channels: &ControlChannels<M, N>,
) -> ControllerOutcome {
    channels.outcomes.receive().await
}
