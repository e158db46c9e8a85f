//! AVRCP Session State
//!
//! Owns everything scoped to the single control session: its phase and
//! identity, the one Pending Command, and the notification ledger.
//!
//! ```text
//! Idle --begin_connect--> Connecting --on_established(ok)--> Established
//!   ^                        |                                   |
//!   +-----on_established(failure)                                |
//!   +-----------------------on_released--------------------------+
//! ```

use bt_hci::param::ConnHandle;

use super::{
    Command, NotificationClass, NotificationLedger, NotificationSet, SessionError, SessionId,
};
use crate::{BluetoothAddress, constants::HCI_SUCCESS};

/// Session lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SessionPhase {
    /// No session
    #[default]
    Idle,
    /// Connect requested, waiting for the establishment event
    Connecting,
    /// Control channel open
    Established,
}

/// Identity of the tracked session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    /// Locally assigned session id, known once the transport accepted the connect
    pub id: Option<SessionId>,
    /// Peer address
    pub address: Option<BluetoothAddress>,
    /// ACL connection handle, set on establishment
    pub handle: Option<ConnHandle>,
}

/// The one command awaiting its final response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingCommand {
    /// Command that was sent
    pub command: Command,
    /// Time the command was handed to the transport
    pub issued_at_ms: u64,
    /// Time of the last sign of life (issue or interim acknowledgement)
    pub last_activity_ms: u64,
    /// Whether the target is expected to acknowledge with an interim response
    pub expects_interim: bool,
    /// Whether an interim acknowledgement has arrived
    pub interim_received: bool,
}

impl PendingCommand {
    /// Record a newly issued command
    #[must_use]
    pub const fn new(command: Command, now_ms: u64) -> Self {
        Self {
            command,
            issued_at_ms: now_ms,
            last_activity_ms: now_ms,
            expects_interim: command.expects_interim(),
            interim_received: false,
        }
    }

    /// Whether `timeout_ms` elapsed since the last sign of life
    #[must_use]
    pub const fn is_expired(&self, now_ms: u64, timeout_ms: u32) -> bool {
        now_ms.saturating_sub(self.last_activity_ms) >= timeout_ms as u64
    }
}

/// Session-scoped state shared by the dispatcher and the router
#[derive(Debug, Default)]
pub struct SessionState {
    phase: SessionPhase,
    session: Option<Session>,
    pending: Option<PendingCommand>,
    ledger: NotificationLedger,
    restore: NotificationSet,
    restore_peer: Option<BluetoothAddress>,
}

impl SessionState {
    /// Create an idle session state
    #[must_use]
    pub const fn new() -> Self {
        Self {
            phase: SessionPhase::Idle,
            session: None,
            pending: None,
            ledger: NotificationLedger::new(),
            restore: NotificationSet::new(),
            restore_peer: None,
        }
    }

    /// Current phase
    #[must_use]
    pub const fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Tracked session, if any
    #[must_use]
    pub const fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Id of the tracked session
    #[must_use]
    pub fn session_id(&self) -> Option<SessionId> {
        self.session.and_then(|session| session.id)
    }

    /// Start a locally initiated connection
    ///
    /// # Errors
    /// Returns `AlreadyConnected` while a session is connecting or established.
    pub fn begin_connect(&mut self, address: BluetoothAddress) -> Result<(), SessionError> {
        if self.phase != SessionPhase::Idle {
            return Err(SessionError::AlreadyConnected);
        }
        self.session = Some(Session {
            id: None,
            address: Some(address),
            handle: None,
        });
        self.phase = SessionPhase::Connecting;
        debug!("[SESSION] Connecting to {}", address);
        Ok(())
    }

    /// Attach the id the transport assigned to a connecting session
    pub fn assign_id(&mut self, id: SessionId) {
        if let Some(session) = self.session.as_mut() {
            session.id = Some(id);
        }
    }

    /// Track a session the remote side opened while idle
    ///
    /// # Errors
    /// Returns `AlreadyConnected` if a session is already tracked.
    pub fn adopt(&mut self, id: SessionId, address: BluetoothAddress) -> Result<(), SessionError> {
        if self.phase != SessionPhase::Idle {
            return Err(SessionError::AlreadyConnected);
        }
        self.session = Some(Session {
            id: Some(id),
            address: Some(address),
            handle: None,
        });
        self.phase = SessionPhase::Connecting;
        debug!("[SESSION] Adopting incoming session {}", id);
        Ok(())
    }

    /// Abandon a connecting session the transport never accepted
    pub fn abandon(&mut self) {
        if self.phase == SessionPhase::Connecting {
            self.session = None;
            self.phase = SessionPhase::Idle;
        }
    }

    /// Apply the establishment result; returns whether the session is now established
    pub fn on_established(&mut self, handle: ConnHandle, status: u8) -> bool {
        if status == HCI_SUCCESS {
            if let Some(session) = self.session.as_mut() {
                session.handle = Some(handle);
                self.phase = SessionPhase::Established;
                info!("[SESSION] Established, handle {:#x}", handle.raw());
                return true;
            }
        }
        warn!("[SESSION] Connection failed, status {:#x}", status);
        self.session = None;
        self.phase = SessionPhase::Idle;
        false
    }

    /// Tear down the session
    ///
    /// Clears the handle, cancels the Pending Command without completing it and
    /// resets the ledger. Returns the classes that were subscribed.
    pub fn on_released(&mut self) -> NotificationSet {
        if let Some(pending) = self.pending.take() {
            debug!("[SESSION] Abandoning pending {}", pending.command);
        }
        self.session = None;
        self.phase = SessionPhase::Idle;
        self.ledger.reset()
    }

    /// Handle of the established session
    ///
    /// # Errors
    /// Returns `NoActiveSession` unless a handle is assigned.
    pub fn current_handle(&self) -> Result<ConnHandle, SessionError> {
        self.session
            .and_then(|session| session.handle)
            .ok_or(SessionError::NoActiveSession)
    }

    /// Whether commands may be issued
    #[must_use]
    pub fn is_established(&self) -> bool {
        self.phase == SessionPhase::Established
    }

    /// The outstanding command, if any
    #[must_use]
    pub const fn pending(&self) -> Option<&PendingCommand> {
        self.pending.as_ref()
    }

    /// Record a newly issued command
    pub fn set_pending(&mut self, pending: PendingCommand) {
        self.pending = Some(pending);
    }

    /// Record an interim acknowledgement for the outstanding command
    pub fn note_interim(&mut self, now_ms: u64) -> Option<Command> {
        let pending = self.pending.as_mut()?;
        pending.interim_received = true;
        pending.last_activity_ms = now_ms;
        Some(pending.command)
    }

    /// Clear and return the outstanding command
    pub fn take_pending(&mut self) -> Option<PendingCommand> {
        self.pending.take()
    }

    /// Notification ledger
    #[must_use]
    pub const fn ledger(&self) -> &NotificationLedger {
        &self.ledger
    }

    /// Mutable notification ledger
    pub fn ledger_mut(&mut self) -> &mut NotificationLedger {
        &mut self.ledger
    }

    /// Classes still to be re-registered after a reconnection
    #[must_use]
    pub const fn restore_queue(&self) -> NotificationSet {
        self.restore
    }

    /// Peer the restore queue belongs to
    #[must_use]
    pub const fn restore_peer(&self) -> Option<BluetoothAddress> {
        self.restore_peer
    }

    /// Add classes to re-register when `peer` reconnects
    ///
    /// Classes queued for a different peer are dropped. An empty set leaves
    /// the queue untouched.
    pub fn queue_restore(&mut self, peer: BluetoothAddress, classes: NotificationSet) {
        if classes.is_empty() {
            return;
        }
        if self.restore_peer != Some(peer) {
            self.restore = NotificationSet::new();
            self.restore_peer = Some(peer);
        }
        self.restore = self.restore.union(classes);
    }

    /// Pop the next class to re-register on the current session
    ///
    /// Returns `None` unless the session is with the peer the queue belongs to.
    pub fn next_restore(&mut self) -> Option<NotificationClass> {
        let peer = self.session.and_then(|session| session.address)?;
        if self.restore_peer != Some(peer) {
            return None;
        }
        let class = self.restore.first()?;
        self.restore.remove(class);
        Some(class)
    }
}
