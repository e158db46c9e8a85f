//! Command Dispatcher
//!
//! Validates that a command may be issued and forwards it to the transport.
//! Only one command may be outstanding per session; a second one is refused
//! with [`DispatchError::CommandInFlight`] instead of being queued.

use super::{Command, ControlTransport, DispatchError, PendingCommand, SessionState};

/// Borrowed view used to issue one command
pub struct Dispatcher<'a, T: ControlTransport> {
    state: &'a mut SessionState,
    transport: &'a mut T,
    now_ms: u64,
}

impl<'a, T: ControlTransport> Dispatcher<'a, T> {
    /// Create a dispatcher over the session state and transport
    pub fn new(state: &'a mut SessionState, transport: &'a mut T, now_ms: u64) -> Self {
        Self {
            state,
            transport,
            now_ms,
        }
    }

    /// Validate and forward `command`
    ///
    /// Registration changes the ledger already reflects succeed without a send.
    ///
    /// # Errors
    /// - `SessionNotReady` unless the session is established
    /// - `CommandInFlight` while a previous command awaits its final response
    /// - `InvalidArgument` for out of range arguments
    /// - `TransportFailed` if the transport refused the command
    pub fn issue(self, command: Command) -> Result<(), DispatchError> {
        if !self.state.is_established() {
            debug!("[DISPATCH] {} refused, session not ready", command);
            return Err(DispatchError::SessionNotReady);
        }
        let session = self
            .state
            .session_id()
            .ok_or(DispatchError::SessionNotReady)?;

        if let Some(pending) = self.state.pending() {
            debug!(
                "[DISPATCH] {} refused, {} still in flight",
                command, pending.command
            );
            return Err(DispatchError::CommandInFlight);
        }

        if !command.is_valid() {
            return Err(DispatchError::InvalidArgument);
        }

        if self.ledger_already_matches(command) {
            debug!("[DISPATCH] {} already reflected by ledger", command);
            return Ok(());
        }

        self.transport.send(session, command).map_err(|e| {
            warn!(
                "[DISPATCH] Transport refused {}: {:?}",
                command,
                debug2format!(e)
            );
            DispatchError::TransportFailed
        })?;

        trace!("[DISPATCH] {} sent on session {}", command, session);
        self.state
            .set_pending(PendingCommand::new(command, self.now_ms));
        Ok(())
    }

    fn ledger_already_matches(&self, command: Command) -> bool {
        match command {
            Command::EnableNotification(class) => self.state.ledger().is_subscribed(class),
            Command::DisableNotification(class) => !self.state.ledger().is_subscribed(class),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use bt_hci::param::ConnHandle;

    use super::*;
    use crate::avrcp::router::Router;
    use crate::avrcp::testing::{HANDLE, PEER, RecordingTransport, SESSION, status};
    use crate::avrcp::{
        NotificationClass, OperationId, Payload, RepeatMode, ResponseCode, ShuffleMode,
    };
    use crate::constants::HCI_SUCCESS;

    const EVERY_COMMAND: [Command; 21] = [
        Command::Play,
        Command::Stop,
        Command::Pause,
        Command::FastForward,
        Command::Rewind,
        Command::StepForward,
        Command::StepBackward,
        Command::VolumeUp,
        Command::VolumeDown,
        Command::Mute,
        Command::SetAbsoluteVolume { percent: 50 },
        Command::Skip,
        Command::QueryShuffleRepeat,
        Command::SetRepeatMode(RepeatMode::AllTracks),
        Command::SetShuffleMode(ShuffleMode::Off),
        Command::GetCapabilities,
        Command::GetUnitInfo,
        Command::GetPlayStatus,
        Command::GetNowPlayingInfo,
        Command::EnableNotification(NotificationClass::TrackChanged),
        Command::DisableNotification(NotificationClass::TrackChanged),
    ];

    fn established_state() -> SessionState {
        let mut state = SessionState::new();
        state.begin_connect(PEER).unwrap();
        state.assign_id(SESSION);
        state.on_established(ConnHandle::new(HANDLE), HCI_SUCCESS);
        state
    }

    #[test]
    fn test_refused_unless_established() {
        let mut transport = RecordingTransport::new();
        let mut idle = SessionState::new();
        let mut connecting = SessionState::new();
        connecting.begin_connect(PEER).unwrap();
        connecting.assign_id(SESSION);

        for command in EVERY_COMMAND {
            for state in [&mut idle, &mut connecting] {
                assert_eq!(
                    Dispatcher::new(state, &mut transport, 0).issue(command),
                    Err(DispatchError::SessionNotReady)
                );
                assert!(state.pending().is_none());
            }
        }
        assert!(transport.sent.is_empty());
    }

    #[test]
    fn test_second_command_refused_while_in_flight() {
        for command in EVERY_COMMAND {
            let mut transport = RecordingTransport::new();
            let mut state = established_state();
            // DisableNotification needs a subscribed class to produce a send
            state
                .ledger_mut()
                .mark_subscribed(NotificationClass::TrackChanged);
            if let Command::EnableNotification(class) = command {
                state.ledger_mut().mark_unsubscribed(class);
            }

            Dispatcher::new(&mut state, &mut transport, 5)
                .issue(command)
                .unwrap();
            assert_eq!(state.pending().unwrap().command, command);
            assert_eq!(state.pending().unwrap().issued_at_ms, 5);

            for next in EVERY_COMMAND {
                assert_eq!(
                    Dispatcher::new(&mut state, &mut transport, 6).issue(next),
                    Err(DispatchError::CommandInFlight)
                );
            }
            assert_eq!(transport.sent.len(), 1);
            assert_eq!(transport.sent[0], (SESSION, command));

            Router::default()
                .route(
                    &mut state,
                    status(
                        HANDLE,
                        ResponseCode::Accepted,
                        Payload::OperationComplete(OperationId::Play),
                    ),
                    7,
                )
                .unwrap();
            assert!(state.pending().is_none());

            assert_eq!(
                Dispatcher::new(&mut state, &mut transport, 8).issue(command),
                Ok(())
            );
            // a confirmed registration leaves nothing to send the second time
            let expected = match command {
                Command::EnableNotification(_) | Command::DisableNotification(_) => 1,
                _ => 2,
            };
            assert_eq!(transport.sent.len(), expected);
        }
    }

    #[test]
    fn test_absolute_volume_range() {
        let mut transport = RecordingTransport::new();
        let mut state = established_state();

        assert_eq!(
            Dispatcher::new(&mut state, &mut transport, 0)
                .issue(Command::SetAbsoluteVolume { percent: 101 }),
            Err(DispatchError::InvalidArgument)
        );
        assert!(state.pending().is_none());
        assert!(transport.sent.is_empty());

        Dispatcher::new(&mut state, &mut transport, 0)
            .issue(Command::SetAbsoluteVolume { percent: 50 })
            .unwrap();
        assert_eq!(
            transport.last_sent(),
            Some(Command::SetAbsoluteVolume { percent: 50 })
        );
    }

    #[test]
    fn test_registration_noop_when_ledger_matches() {
        let mut transport = RecordingTransport::new();
        let mut state = established_state();

        // not subscribed yet, so disabling is already satisfied
        Dispatcher::new(&mut state, &mut transport, 0)
            .issue(Command::DisableNotification(NotificationClass::Uids))
            .unwrap();
        assert!(transport.sent.is_empty());
        assert!(state.pending().is_none());

        state
            .ledger_mut()
            .mark_subscribed(NotificationClass::Uids);
        Dispatcher::new(&mut state, &mut transport, 0)
            .issue(Command::EnableNotification(NotificationClass::Uids))
            .unwrap();
        assert!(transport.sent.is_empty());
        assert!(state.pending().is_none());
    }

    #[test]
    fn test_transport_refusal_leaves_no_pending() {
        let mut transport = RecordingTransport::new();
        transport.refuse = true;
        let mut state = established_state();

        assert_eq!(
            Dispatcher::new(&mut state, &mut transport, 0).issue(Command::Play),
            Err(DispatchError::TransportFailed)
        );
        assert!(state.pending().is_none());
    }
}
