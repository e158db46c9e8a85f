//! Response/Notification Router
//!
//! Correlates each decoded [`AvrcpEvent`] with the [`SessionState`]:
//!
//! 1. Connection lifecycle events go straight to the session state.
//! 2. Command-status events whose handle is not the session's are dropped.
//! 3. Interim responses only mark the Pending Command as acknowledged.
//! 4. A final response completes the Pending Command if there is one, and is
//!    an unsolicited notification otherwise.
//!
//! Dropped events surface as [`RouteError`] so the caller can log them; they
//! never change state.

use core::fmt;

use super::{AvrcpEvent, Command, ControllerOutcome, Payload, SessionPhase, SessionState};
use crate::BluetoothAddress;

/// Reason an event was discarded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RouteError {
    /// Event belongs to a session or handle other than the tracked one
    ForeignSession,
    /// Establishment repeated for the already established session
    DuplicateEstablishment,
    /// Release for a session that is not tracked
    StrayRelease,
}

impl fmt::Display for RouteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ForeignSession => write!(f, "Event for a foreign session"),
            Self::DuplicateEstablishment => write!(f, "Duplicate establishment"),
            Self::StrayRelease => write!(f, "Release for an untracked session"),
        }
    }
}

impl core::error::Error for RouteError {}

/// Routes decoded events into outcomes
#[derive(Debug, Clone, Copy, Default)]
pub struct Router {
    restore_subscriptions: bool,
}

impl Router {
    /// Create a router
    ///
    /// With `restore_subscriptions` set, the classes subscribed when a session
    /// is released are queued for re-registration when the same peer reconnects.
    #[must_use]
    pub const fn new(restore_subscriptions: bool) -> Self {
        Self {
            restore_subscriptions,
        }
    }

    /// Apply `event` to `state`
    ///
    /// Returns the outcome to publish, if any.
    ///
    /// # Errors
    /// Returns the reason the event was discarded. `state` is unchanged then.
    pub fn route(
        &self,
        state: &mut SessionState,
        event: AvrcpEvent,
        now_ms: u64,
    ) -> Result<Option<ControllerOutcome>, RouteError> {
        match event {
            AvrcpEvent::ConnectionEstablished {
                session,
                status,
                handle,
                address,
            } => {
                let address = BluetoothAddress::from(address);
                match state.phase() {
                    SessionPhase::Idle => {
                        // remote side opened the channel before any local connect
                        if state.adopt(session, address).is_err() {
                            return Err(RouteError::ForeignSession);
                        }
                    }
                    SessionPhase::Connecting => match state.session_id() {
                        Some(id) if id != session => {
                            debug!(
                                "[ROUTER] Establishment for session {} while connecting {}",
                                session, id
                            );
                            return Err(RouteError::ForeignSession);
                        }
                        Some(_) => {}
                        None => state.assign_id(session),
                    },
                    SessionPhase::Established => {
                        return if state.session_id() == Some(session) {
                            debug!("[ROUTER] Duplicate establishment for {}", session);
                            Err(RouteError::DuplicateEstablishment)
                        } else {
                            debug!("[ROUTER] Establishment for foreign session {}", session);
                            Err(RouteError::ForeignSession)
                        };
                    }
                }

                if state.on_established(handle, status) {
                    Ok(Some(ControllerOutcome::ConnectionEstablished {
                        session,
                        handle,
                        address,
                    }))
                } else {
                    Ok(Some(ControllerOutcome::ConnectionFailed { address, status }))
                }
            }

            AvrcpEvent::ConnectionReleased { session } => {
                if state.phase() == SessionPhase::Idle || state.session_id() != Some(session) {
                    debug!("[ROUTER] Release for untracked session {}", session);
                    return Err(RouteError::StrayRelease);
                }
                let peer = state.session().and_then(|tracked| tracked.address);
                let abandoned = state.pending().map(|pending| pending.command);
                let mut previous = state.on_released();
                if let (true, Some(peer)) = (self.restore_subscriptions, peer) {
                    // an abandoned registration counts as confirmed
                    match abandoned {
                        Some(Command::EnableNotification(class)) => previous.insert(class),
                        Some(Command::DisableNotification(class)) => previous.remove(class),
                        _ => {}
                    }
                    state.queue_restore(peer, previous);
                }
                Ok(Some(ControllerOutcome::ConnectionReleased { session }))
            }

            AvrcpEvent::CommandStatus {
                handle,
                status,
                payload,
            } => {
                match state.current_handle() {
                    Ok(current) if current.raw() == handle.raw() => {}
                    _ => {
                        trace!("[ROUTER] Dropping event for handle {:#x}", handle.raw());
                        return Err(RouteError::ForeignSession);
                    }
                }

                if status.is_interim() {
                    if let Some(command) = state.note_interim(now_ms) {
                        trace!("[ROUTER] Interim for {}", command);
                    }
                    return Ok(None);
                }

                if let Payload::Unhandled(raw_kind) = payload {
                    if let Some(pending) = state.take_pending() {
                        debug!(
                            "[ROUTER] {} ended by unhandled subevent {:#x}",
                            pending.command, raw_kind
                        );
                    }
                    return Ok(Some(ControllerOutcome::Unhandled { raw_kind }));
                }

                match state.take_pending() {
                    Some(pending) => {
                        let command = pending.command;
                        if !status.is_error() {
                            confirm_registration(state, command);
                        }
                        debug!("[ROUTER] {} completed with {}", command, status);
                        Ok(Some(ControllerOutcome::CommandCompleted {
                            command,
                            status,
                            payload,
                        }))
                    }
                    None => Ok(Some(ControllerOutcome::Notification { status, payload })),
                }
            }
        }
    }
}

fn confirm_registration(state: &mut SessionState, command: Command) {
    match command {
        Command::EnableNotification(class) => state.ledger_mut().mark_subscribed(class),
        Command::DisableNotification(class) => state.ledger_mut().mark_unsubscribed(class),
        _ => {}
    }
}
