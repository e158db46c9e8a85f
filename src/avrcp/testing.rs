//! Test doubles for the collaborator traits

use core::cell::Cell;

use bt_hci::param::{BdAddr, ConnHandle};
use heapless::Vec;

use super::{AvrcpEvent, Clock, Command, ControlTransport, Payload, ResponseCode, SessionId};
use crate::{BluetoothAddress, constants::HCI_SUCCESS};

pub(crate) const PEER: BluetoothAddress =
    BluetoothAddress::new([0x00, 0x1B, 0xDC, 0x08, 0x0A, 0xA5]);
pub(crate) const SESSION: SessionId = 0x41;
pub(crate) const HANDLE: u16 = 7;

/// Transport that records what it was asked to do
#[derive(Debug, Default)]
pub(crate) struct RecordingTransport {
    pub connects: Vec<BdAddr, 4>,
    pub disconnects: Vec<SessionId, 4>,
    pub sent: Vec<(SessionId, Command), 32>,
    pub refuse: bool,
    pub next_session: SessionId,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self {
            next_session: SESSION,
            ..Self::default()
        }
    }

    pub fn last_sent(&self) -> Option<Command> {
        self.sent.last().map(|(_, command)| *command)
    }
}

impl ControlTransport for RecordingTransport {
    type Error = ();

    fn connect(&mut self, address: BdAddr) -> Result<SessionId, Self::Error> {
        if self.refuse {
            return Err(());
        }
        self.connects.push(address).map_err(|_| ())?;
        Ok(self.next_session)
    }

    fn disconnect(&mut self, session: SessionId) -> Result<(), Self::Error> {
        if self.refuse {
            return Err(());
        }
        self.disconnects.push(session).map_err(|_| ())
    }

    fn send(&mut self, session: SessionId, command: Command) -> Result<(), Self::Error> {
        if self.refuse {
            return Err(());
        }
        self.sent.push((session, command)).map_err(|_| ())
    }
}

/// Clock advanced by hand
#[derive(Debug, Default)]
pub(crate) struct ManualClock(Cell<u64>);

impl ManualClock {
    pub fn set(&self, now_ms: u64) {
        self.0.set(now_ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.0.get()
    }
}

pub(crate) fn established(session: SessionId, handle: u16) -> AvrcpEvent {
    AvrcpEvent::ConnectionEstablished {
        session,
        status: HCI_SUCCESS,
        handle: ConnHandle::new(handle),
        address: PEER.into(),
    }
}

pub(crate) fn connection_failed(session: SessionId, status: u8) -> AvrcpEvent {
    AvrcpEvent::ConnectionEstablished {
        session,
        status,
        handle: ConnHandle::new(0),
        address: PEER.into(),
    }
}

pub(crate) fn released(session: SessionId) -> AvrcpEvent {
    AvrcpEvent::ConnectionReleased { session }
}

pub(crate) fn status(handle: u16, status: ResponseCode, payload: Payload) -> AvrcpEvent {
    AvrcpEvent::CommandStatus {
        handle: ConnHandle::new(handle),
        status,
        payload,
    }
}
