//! AVRCP Controller
//!
//! [`AvrcpController`] owns the session state, the transport and the clock,
//! and publishes every [`ControllerOutcome`] on an `embassy-sync` channel.
//! Each decoded event is processed to completion before the next one.

use bt_hci::param::ConnHandle;
use embassy_sync::{blocking_mutex::raw::RawMutex, channel::Sender};

use super::{
    AvrcpEvent, Clock, Command, ControlTransport, DispatchError, NotificationClass,
    NotificationSet, Payload, PendingCommand, RepeatMode, ResponseCode, SessionError, SessionId,
    SessionPhase, SessionState, ShuffleMode, dispatcher::Dispatcher, router::Router,
};
use crate::{BluetoothAddress, constants::DEFAULT_COMMAND_TIMEOUT_MS};

/// Controller configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ControllerOptions {
    /// Time without a final response after which the Pending Command is
    /// abandoned with a [`ControllerOutcome::Timeout`]; `None` waits forever
    pub command_timeout_ms: Option<u32>,
    /// Re-register the notifications that were subscribed when the previous
    /// session was released
    pub restore_subscriptions: bool,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            command_timeout_ms: Some(DEFAULT_COMMAND_TIMEOUT_MS),
            restore_subscriptions: false,
        }
    }
}

/// Application visible result of event processing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerOutcome {
    /// Control channel open
    ConnectionEstablished {
        /// Session id
        session: SessionId,
        /// ACL connection handle
        handle: ConnHandle,
        /// Peer address
        address: BluetoothAddress,
    },
    /// Control channel could not be opened
    ConnectionFailed {
        /// Peer address
        address: BluetoothAddress,
        /// HCI status
        status: u8,
    },
    /// Control channel closed; any Pending Command was abandoned
    ConnectionReleased {
        /// Session id
        session: SessionId,
    },
    /// Final response to the Pending Command
    CommandCompleted {
        /// Command that completed
        command: Command,
        /// Response code, which may report a failure
        status: ResponseCode,
        /// Decoded response
        payload: Payload,
    },
    /// Final response with no Pending Command
    Notification {
        /// Response code
        status: ResponseCode,
        /// Decoded notification
        payload: Payload,
    },
    /// Subevent kind the decoder did not recognise
    Unhandled {
        /// Raw subevent tag
        raw_kind: u8,
    },
    /// No final response arrived in time
    Timeout {
        /// Command that was abandoned
        command: Command,
    },
}

/// Coordinator for one AVRCP control session
pub struct AvrcpController<'a, T, C, M, const N: usize>
where
    T: ControlTransport,
    C: Clock,
    M: RawMutex,
{
    state: SessionState,
    router: Router,
    transport: T,
    clock: C,
    outcomes: Sender<'a, M, ControllerOutcome, N>,
    options: ControllerOptions,
}

impl<'a, T, C, M, const N: usize> AvrcpController<'a, T, C, M, N>
where
    T: ControlTransport,
    C: Clock,
    M: RawMutex,
{
    /// Create a controller with default options
    pub fn new(transport: T, clock: C, outcomes: Sender<'a, M, ControllerOutcome, N>) -> Self {
        Self::with_options(transport, clock, outcomes, ControllerOptions::default())
    }

    /// Create a controller with the given options
    pub fn with_options(
        transport: T,
        clock: C,
        outcomes: Sender<'a, M, ControllerOutcome, N>,
        options: ControllerOptions,
    ) -> Self {
        Self {
            state: SessionState::new(),
            router: Router::new(options.restore_subscriptions),
            transport,
            clock,
            outcomes,
            options,
        }
    }

    /// Start connecting to `address`
    ///
    /// The session becomes established once the establishment event arrives.
    ///
    /// # Errors
    /// - `AlreadyConnected` while a session is connecting or established
    /// - `TransportFailed` if the transport refused to start the connection
    pub fn connect(&mut self, address: BluetoothAddress) -> Result<(), SessionError> {
        self.state.begin_connect(address)?;
        match self.transport.connect(address.into()) {
            Ok(session) => {
                self.state.assign_id(session);
                info!("[SESSION] Connecting to {} as session {}", address, session);
                Ok(())
            }
            Err(e) => {
                warn!(
                    "[SESSION] Transport refused connect to {}: {:?}",
                    address,
                    debug2format!(e)
                );
                self.state.abandon();
                Err(SessionError::TransportFailed)
            }
        }
    }

    /// Ask the transport to close the session
    ///
    /// Session state is reset when the release event arrives.
    ///
    /// # Errors
    /// - `NoActiveSession` if no session id is known
    /// - `TransportFailed` if the transport refused
    pub fn disconnect(&mut self) -> Result<(), SessionError> {
        let session = self
            .state
            .session_id()
            .ok_or(SessionError::NoActiveSession)?;
        self.transport.disconnect(session).map_err(|e| {
            warn!(
                "[SESSION] Transport refused disconnect of {}: {:?}",
                session,
                debug2format!(e)
            );
            SessionError::TransportFailed
        })
    }

    /// Process one decoded event and publish its outcome
    pub fn handle_event(&mut self, event: AvrcpEvent) {
        let now_ms = self.clock.now_ms();
        match self.router.route(&mut self.state, event, now_ms) {
            Ok(Some(outcome)) => {
                let settled = matches!(
                    outcome,
                    ControllerOutcome::ConnectionEstablished { .. }
                        | ControllerOutcome::CommandCompleted { .. }
                        | ControllerOutcome::Unhandled { .. }
                );
                self.publish(outcome);
                if settled {
                    self.restore_next();
                }
            }
            Ok(None) => {}
            Err(e) => debug!("[ROUTER] Event discarded: {}", e),
        }
    }

    /// Abandon the Pending Command if its deadline passed
    ///
    /// Publishes [`ControllerOutcome::Timeout`] and returns the abandoned command.
    pub fn poll_timeout(&mut self) -> Option<Command> {
        let timeout_ms = self.options.command_timeout_ms?;
        let now_ms = self.clock.now_ms();
        if !self.state.pending()?.is_expired(now_ms, timeout_ms) {
            return None;
        }
        let command = self.state.take_pending()?.command;
        warn!("[DISPATCH] {} timed out after {} ms", command, timeout_ms);
        self.publish(ControllerOutcome::Timeout { command });
        self.restore_next();
        Some(command)
    }

    /// Issue `command` through the operation of the same name
    ///
    /// # Errors
    /// See [`Dispatcher::issue`].
    pub fn dispatch(&mut self, command: Command) -> Result<(), DispatchError> {
        match command {
            Command::Play => self.play(),
            Command::Stop => self.stop(),
            Command::Pause => self.pause(),
            Command::FastForward => self.fast_forward(),
            Command::Rewind => self.rewind(),
            Command::StepForward => self.step_forward(),
            Command::StepBackward => self.step_backward(),
            Command::VolumeUp => self.volume_up(),
            Command::VolumeDown => self.volume_down(),
            Command::Mute => self.mute(),
            Command::SetAbsoluteVolume { percent } => self.set_absolute_volume(percent),
            Command::Skip => self.skip(),
            Command::QueryShuffleRepeat => self.query_shuffle_repeat(),
            Command::SetRepeatMode(mode) => self.set_repeat_mode(mode),
            Command::SetShuffleMode(mode) => self.set_shuffle_mode(mode),
            Command::GetCapabilities => self.get_capabilities(),
            Command::GetUnitInfo => self.get_unit_info(),
            Command::GetPlayStatus => self.get_play_status(),
            Command::GetNowPlayingInfo => self.get_now_playing_info(),
            Command::EnableNotification(class) => self.enable_notification(class),
            Command::DisableNotification(class) => self.disable_notification(class),
        }
    }

    /// Start playback
    ///
    /// # Errors
    /// See [`Dispatcher::issue`].
    pub fn play(&mut self) -> Result<(), DispatchError> {
        self.issue(Command::Play)
    }

    /// Stop playback
    ///
    /// # Errors
    /// See [`Dispatcher::issue`].
    pub fn stop(&mut self) -> Result<(), DispatchError> {
        self.issue(Command::Stop)
    }

    /// Pause playback
    ///
    /// # Errors
    /// See [`Dispatcher::issue`].
    pub fn pause(&mut self) -> Result<(), DispatchError> {
        self.issue(Command::Pause)
    }

    /// Fast forward
    ///
    /// # Errors
    /// See [`Dispatcher::issue`].
    pub fn fast_forward(&mut self) -> Result<(), DispatchError> {
        self.issue(Command::FastForward)
    }

    /// Rewind
    ///
    /// # Errors
    /// See [`Dispatcher::issue`].
    pub fn rewind(&mut self) -> Result<(), DispatchError> {
        self.issue(Command::Rewind)
    }

    /// Skip to the next track
    ///
    /// # Errors
    /// See [`Dispatcher::issue`].
    pub fn step_forward(&mut self) -> Result<(), DispatchError> {
        self.issue(Command::StepForward)
    }

    /// Skip to the previous track
    ///
    /// # Errors
    /// See [`Dispatcher::issue`].
    pub fn step_backward(&mut self) -> Result<(), DispatchError> {
        self.issue(Command::StepBackward)
    }

    /// Raise the volume one step
    ///
    /// # Errors
    /// See [`Dispatcher::issue`].
    pub fn volume_up(&mut self) -> Result<(), DispatchError> {
        self.issue(Command::VolumeUp)
    }

    /// Lower the volume one step
    ///
    /// # Errors
    /// See [`Dispatcher::issue`].
    pub fn volume_down(&mut self) -> Result<(), DispatchError> {
        self.issue(Command::VolumeDown)
    }

    /// Toggle mute
    ///
    /// # Errors
    /// See [`Dispatcher::issue`].
    pub fn mute(&mut self) -> Result<(), DispatchError> {
        self.issue(Command::Mute)
    }

    /// Set the absolute volume in percent (`0..=100`)
    ///
    /// # Errors
    /// `InvalidArgument` above 100, otherwise see [`Dispatcher::issue`].
    pub fn set_absolute_volume(&mut self, percent: u8) -> Result<(), DispatchError> {
        self.issue(Command::SetAbsoluteVolume { percent })
    }

    /// Skip
    ///
    /// # Errors
    /// See [`Dispatcher::issue`].
    pub fn skip(&mut self) -> Result<(), DispatchError> {
        self.issue(Command::Skip)
    }

    /// Read the current shuffle and repeat settings
    ///
    /// # Errors
    /// See [`Dispatcher::issue`].
    pub fn query_shuffle_repeat(&mut self) -> Result<(), DispatchError> {
        self.issue(Command::QueryShuffleRepeat)
    }

    /// Set the repeat mode
    ///
    /// # Errors
    /// See [`Dispatcher::issue`].
    pub fn set_repeat_mode(&mut self, mode: RepeatMode) -> Result<(), DispatchError> {
        self.issue(Command::SetRepeatMode(mode))
    }

    /// Set the shuffle mode
    ///
    /// # Errors
    /// See [`Dispatcher::issue`].
    pub fn set_shuffle_mode(&mut self, mode: ShuffleMode) -> Result<(), DispatchError> {
        self.issue(Command::SetShuffleMode(mode))
    }

    /// Ask which notifications the target supports
    ///
    /// # Errors
    /// See [`Dispatcher::issue`].
    pub fn get_capabilities(&mut self) -> Result<(), DispatchError> {
        self.issue(Command::GetCapabilities)
    }

    /// Request unit info
    ///
    /// # Errors
    /// See [`Dispatcher::issue`].
    pub fn get_unit_info(&mut self) -> Result<(), DispatchError> {
        self.issue(Command::GetUnitInfo)
    }

    /// Request the play status
    ///
    /// # Errors
    /// See [`Dispatcher::issue`].
    pub fn get_play_status(&mut self) -> Result<(), DispatchError> {
        self.issue(Command::GetPlayStatus)
    }

    /// Request now playing metadata
    ///
    /// # Errors
    /// See [`Dispatcher::issue`].
    pub fn get_now_playing_info(&mut self) -> Result<(), DispatchError> {
        self.issue(Command::GetNowPlayingInfo)
    }

    /// Register for `class` notifications
    ///
    /// Succeeds without a send if the class is already subscribed.
    ///
    /// # Errors
    /// See [`Dispatcher::issue`].
    pub fn enable_notification(&mut self, class: NotificationClass) -> Result<(), DispatchError> {
        self.issue(Command::EnableNotification(class))
    }

    /// Deregister `class` notifications
    ///
    /// Succeeds without a send if the class is not subscribed.
    ///
    /// # Errors
    /// See [`Dispatcher::issue`].
    pub fn disable_notification(&mut self, class: NotificationClass) -> Result<(), DispatchError> {
        self.issue(Command::DisableNotification(class))
    }

    /// Current session phase
    pub fn phase(&self) -> SessionPhase {
        self.state.phase()
    }

    /// Id of the tracked session
    pub fn session_id(&self) -> Option<SessionId> {
        self.state.session_id()
    }

    /// Handle of the established session
    ///
    /// # Errors
    /// Returns `NoActiveSession` unless a session is established.
    pub fn current_handle(&self) -> Result<ConnHandle, SessionError> {
        self.state.current_handle()
    }

    /// The command awaiting its final response
    pub fn pending_command(&self) -> Option<&PendingCommand> {
        self.state.pending()
    }

    /// Notification classes confirmed subscribed
    pub fn subscriptions(&self) -> NotificationSet {
        self.state.ledger().subscribed()
    }

    /// Whether `class` is confirmed subscribed
    pub fn is_subscribed(&self, class: NotificationClass) -> bool {
        self.state.ledger().is_subscribed(class)
    }

    /// Controller options
    pub fn options(&self) -> &ControllerOptions {
        &self.options
    }

    /// Transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Mutable transport
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Clock
    pub fn clock(&self) -> &C {
        &self.clock
    }

    fn issue(&mut self, command: Command) -> Result<(), DispatchError> {
        let now_ms = self.clock.now_ms();
        Dispatcher::new(&mut self.state, &mut self.transport, now_ms).issue(command)
    }

    fn publish(&self, outcome: ControllerOutcome) {
        if self.outcomes.try_send(outcome).is_err() {
            warn!("[ROUTER] Outcome channel full, outcome dropped");
        }
    }

    /// Re-register the next queued class once the session is idle
    fn restore_next(&mut self) {
        while self.state.is_established() && self.state.pending().is_none() {
            let Some(class) = self.state.next_restore() else {
                return;
            };
            match self.issue(Command::EnableNotification(class)) {
                Ok(()) => debug!("[SESSION] Restoring {}", class),
                Err(e) => warn!("[SESSION] Could not restore {}: {}", class, e),
            }
        }
    }
}
