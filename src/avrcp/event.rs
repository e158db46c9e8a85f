//! Decoded AVRCP event records
//!
//! The event decoder turns raw transport events into [`AvrcpEvent`] values.
//! Each command-status event carries one [`Payload`] variant per subevent
//! kind, with [`Payload::Unhandled`] holding the raw tag of kinds the decoder
//! does not recognise.

use bt_hci::param::{BdAddr, ConnHandle};
use heapless::String;

use super::{
    NotificationClass, NotificationSet, OperationId, PlayStatus, RepeatMode, ResponseCode,
    SessionId, ShuffleMode,
};
use crate::constants::MAX_MEDIA_ATTRIBUTE_LENGTH;

/// Text attribute of the now playing track
pub type MediaText = String<MAX_MEDIA_ATTRIBUTE_LENGTH>;

/// A decoded event handed to the controller
#[derive(Debug, Clone)]
pub enum AvrcpEvent {
    /// The control channel was opened, or failed to open
    ConnectionEstablished {
        /// Session the event belongs to
        session: SessionId,
        /// HCI status, `0x00` on success
        status: u8,
        /// ACL connection handle
        handle: ConnHandle,
        /// Peer address
        address: BdAddr,
    },
    /// The control channel was closed
    ConnectionReleased {
        /// Session the event belongs to
        session: SessionId,
    },
    /// A command response or a notification
    CommandStatus {
        /// ACL connection handle the response arrived on
        handle: ConnHandle,
        /// AV/C response type
        status: ResponseCode,
        /// Decoded subevent
        payload: Payload,
    },
}

/// Metadata of the now playing track
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NowPlayingInfo {
    /// Title
    pub title: Option<MediaText>,
    /// Album
    pub album: Option<MediaText>,
    /// Artist
    pub artist: Option<MediaText>,
    /// Genre
    pub genre: Option<MediaText>,
    /// Track number
    pub track: u32,
    /// Total number of tracks
    pub total_tracks: u32,
    /// Song length in milliseconds
    pub song_length_ms: u32,
}

impl NowPlayingInfo {
    /// Convert an attribute value to text, truncating at a character boundary
    ///
    /// Returns `None` for empty or non UTF-8 values.
    #[must_use]
    pub fn text_from_bytes(bytes: &[u8]) -> Option<MediaText> {
        let value = match core::str::from_utf8(bytes) {
            Ok(value) => value,
            // keep the longest valid prefix of a value cut mid character
            Err(e) if e.error_len().is_none() => {
                core::str::from_utf8(&bytes[..e.valid_up_to()]).ok()?
            }
            Err(_) => return None,
        };

        let mut end = value.len().min(MAX_MEDIA_ATTRIBUTE_LENGTH);
        while !value.is_char_boundary(end) {
            end -= 1;
        }
        if end == 0 {
            return None;
        }
        String::try_from(&value[..end]).ok()
    }
}

/// Decoded payload of a command-status event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// Playback status changed
    PlaybackStatusChanged(PlayStatus),
    /// Track changed
    TrackChanged,
    /// Track reached end
    TrackReachedEnd,
    /// Track reached start
    TrackReachedStart,
    /// Playback position changed
    PlaybackPositionChanged {
        /// Position in milliseconds
        position_ms: u32,
    },
    /// Battery status changed
    BatteryStatusChanged(u8),
    /// System status changed
    SystemStatusChanged(u8),
    /// Player application setting changed
    PlayerApplicationSettingChanged,
    /// Now playing content changed
    NowPlayingContentChanged,
    /// Available players changed
    AvailablePlayersChanged,
    /// Addressed player changed
    AddressedPlayerChanged {
        /// New addressed player
        player_id: u16,
        /// UID counter of the new player
        uid_counter: u16,
    },
    /// UIDs changed
    UidsChanged {
        /// New UID counter
        uid_counter: u16,
    },
    /// Absolute volume changed
    VolumeChanged {
        /// Volume on the 7-bit profile scale
        absolute_volume: u8,
    },
    /// Current shuffle and repeat modes
    ShuffleAndRepeatMode {
        /// Shuffle mode, `None` if the target reported an undefined value
        shuffle: Option<ShuffleMode>,
        /// Repeat mode, `None` if the target reported an undefined value
        repeat: Option<RepeatMode>,
    },
    /// Now playing track metadata
    NowPlayingInfo(NowPlayingInfo),
    /// Play status
    PlayStatus {
        /// Song length in milliseconds
        song_length_ms: u32,
        /// Song position in milliseconds
        song_position_ms: u32,
        /// Play status
        status: PlayStatus,
    },
    /// Pass-through operation started
    OperationStart(OperationId),
    /// Pass-through operation completed
    OperationComplete(OperationId),
    /// Response to a player application setting change
    PlayerApplicationValueResponse,
    /// Notification events supported by the target
    SupportedEvents(NotificationSet),
    /// Unit info response
    UnitInfo {
        /// Unit type
        unit_type: u8,
        /// Unit number
        unit: u8,
        /// Company id
        company_id: u32,
    },
    /// Subevent kind the decoder does not recognise
    Unhandled(u8),
}

impl Payload {
    /// Notification class this payload reports, for notification subevents
    #[must_use]
    pub const fn notification_class(&self) -> Option<NotificationClass> {
        match self {
            Self::PlaybackStatusChanged(_) => Some(NotificationClass::PlaybackStatus),
            Self::TrackChanged => Some(NotificationClass::TrackChanged),
            Self::TrackReachedEnd => Some(NotificationClass::TrackReachedEnd),
            Self::TrackReachedStart => Some(NotificationClass::TrackReachedStart),
            Self::PlaybackPositionChanged { .. } => Some(NotificationClass::PlaybackPosition),
            Self::BatteryStatusChanged(_) => Some(NotificationClass::BatteryStatus),
            Self::SystemStatusChanged(_) => Some(NotificationClass::SystemStatus),
            Self::PlayerApplicationSettingChanged => {
                Some(NotificationClass::PlayerApplicationSetting)
            }
            Self::NowPlayingContentChanged => Some(NotificationClass::NowPlayingContent),
            Self::AvailablePlayersChanged => Some(NotificationClass::AvailablePlayers),
            Self::AddressedPlayerChanged { .. } => Some(NotificationClass::AddressedPlayer),
            Self::UidsChanged { .. } => Some(NotificationClass::Uids),
            Self::VolumeChanged { .. } => Some(NotificationClass::AbsoluteVolume),
            Self::ShuffleAndRepeatMode { .. }
            | Self::NowPlayingInfo(_)
            | Self::PlayStatus { .. }
            | Self::OperationStart(_)
            | Self::OperationComplete(_)
            | Self::PlayerApplicationValueResponse
            | Self::SupportedEvents(_)
            | Self::UnitInfo { .. }
            | Self::Unhandled(_) => None,
        }
    }

    /// Short name for diagnostics
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::PlaybackStatusChanged(_) => "playback-status-changed",
            Self::TrackChanged => "track-changed",
            Self::TrackReachedEnd => "track-reached-end",
            Self::TrackReachedStart => "track-reached-start",
            Self::PlaybackPositionChanged { .. } => "playback-position-changed",
            Self::BatteryStatusChanged(_) => "battery-status-changed",
            Self::SystemStatusChanged(_) => "system-status-changed",
            Self::PlayerApplicationSettingChanged => "player-application-setting-changed",
            Self::NowPlayingContentChanged => "now-playing-content-changed",
            Self::AvailablePlayersChanged => "available-players-changed",
            Self::AddressedPlayerChanged { .. } => "addressed-player-changed",
            Self::UidsChanged { .. } => "uids-changed",
            Self::VolumeChanged { .. } => "volume-changed",
            Self::ShuffleAndRepeatMode { .. } => "shuffle-and-repeat-mode",
            Self::NowPlayingInfo(_) => "now-playing-info",
            Self::PlayStatus { .. } => "play-status",
            Self::OperationStart(_) => "operation-start",
            Self::OperationComplete(_) => "operation-complete",
            Self::PlayerApplicationValueResponse => "player-application-value-response",
            Self::SupportedEvents(_) => "supported-events",
            Self::UnitInfo { .. } => "unit-info",
            Self::Unhandled(_) => "unhandled",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_from_bytes() {
        assert_eq!(
            NowPlayingInfo::text_from_bytes(b"Blue in Green").as_deref(),
            Some("Blue in Green")
        );
        assert_eq!(NowPlayingInfo::text_from_bytes(b""), None);
        assert_eq!(NowPlayingInfo::text_from_bytes(&[0xFF, 0xFE]), None);
    }

    #[test]
    fn test_text_from_bytes_truncates_on_char_boundary() {
        // 63 ASCII bytes followed by a two byte character straddling the limit
        let mut bytes: heapless::Vec<u8, 80> = heapless::Vec::new();
        bytes.extend_from_slice(&[b'a'; 63]).unwrap();
        bytes.extend_from_slice("é".as_bytes()).unwrap();

        let text = NowPlayingInfo::text_from_bytes(&bytes).unwrap();
        assert_eq!(text.len(), 63);
    }

    #[test]
    fn test_text_from_bytes_keeps_prefix_of_cut_character() {
        let bytes = [b'A', b'B', 0xC3];
        assert_eq!(
            NowPlayingInfo::text_from_bytes(&bytes).as_deref(),
            Some("AB")
        );
    }

    #[test]
    fn test_notification_payload_classes() {
        assert_eq!(
            Payload::PlaybackStatusChanged(PlayStatus::Paused).notification_class(),
            Some(NotificationClass::PlaybackStatus)
        );
        assert_eq!(
            Payload::VolumeChanged { absolute_volume: 0x40 }.notification_class(),
            Some(NotificationClass::AbsoluteVolume)
        );
        assert_eq!(
            Payload::OperationComplete(OperationId::Play).notification_class(),
            None
        );
        assert_eq!(Payload::Unhandled(0x7A).notification_class(), None);
    }
}
