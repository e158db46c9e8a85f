//! Controller commands
//!
//! One [`Command`] value per command kind the controller can issue. The
//! transport maps each value onto the corresponding AVRCP PDU.

use super::{NotificationClass, OperationId, RepeatMode, ShuffleMode};
use crate::constants::{MAX_ABSOLUTE_VOLUME, MAX_VOLUME_PERCENT};

/// A control command issued to the remote target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// Pass-through play
    Play,
    /// Pass-through stop
    Stop,
    /// Pass-through pause
    Pause,
    /// Pass-through fast forward
    FastForward,
    /// Pass-through rewind
    Rewind,
    /// Pass-through forward (next track)
    StepForward,
    /// Pass-through backward (previous track)
    StepBackward,
    /// Pass-through volume up
    VolumeUp,
    /// Pass-through volume down
    VolumeDown,
    /// Pass-through mute
    Mute,
    /// Set absolute volume, in percent
    SetAbsoluteVolume {
        /// Requested volume, `0..=100`
        percent: u8,
    },
    /// Pass-through skip
    Skip,
    /// Query current shuffle and repeat modes
    QueryShuffleRepeat,
    /// Set the repeat mode
    SetRepeatMode(RepeatMode),
    /// Set the shuffle mode
    SetShuffleMode(ShuffleMode),
    /// Query the notification events the target supports
    GetCapabilities,
    /// Query unit info
    GetUnitInfo,
    /// Query play status
    GetPlayStatus,
    /// Query now playing element attributes
    GetNowPlayingInfo,
    /// Register for a notification class
    EnableNotification(NotificationClass),
    /// Deregister a notification class
    DisableNotification(NotificationClass),
}

impl Command {
    /// Pass-through operation carried by this command, if it is one
    #[must_use]
    pub const fn operation_id(self) -> Option<OperationId> {
        match self {
            Self::Play => Some(OperationId::Play),
            Self::Stop => Some(OperationId::Stop),
            Self::Pause => Some(OperationId::Pause),
            Self::FastForward => Some(OperationId::FastForward),
            Self::Rewind => Some(OperationId::Rewind),
            Self::StepForward => Some(OperationId::Forward),
            Self::StepBackward => Some(OperationId::Backward),
            Self::VolumeUp => Some(OperationId::VolumeUp),
            Self::VolumeDown => Some(OperationId::VolumeDown),
            Self::Mute => Some(OperationId::Mute),
            Self::Skip => Some(OperationId::Skip),
            _ => None,
        }
    }

    /// Whether the target answers this command with an interim response first
    #[must_use]
    pub const fn expects_interim(self) -> bool {
        matches!(self, Self::EnableNotification(_))
    }

    /// Whether the command arguments are within range
    #[must_use]
    pub const fn is_valid(self) -> bool {
        match self {
            Self::SetAbsoluteVolume { percent } => percent <= MAX_VOLUME_PERCENT,
            _ => true,
        }
    }

    /// Absolute volume on the profile's 7-bit scale, for `SetAbsoluteVolume`
    #[must_use]
    pub const fn absolute_volume(self) -> Option<u8> {
        match self {
            Self::SetAbsoluteVolume { percent } if percent <= MAX_VOLUME_PERCENT => {
                let scaled = (percent as u16 * MAX_ABSOLUTE_VOLUME as u16
                    + MAX_VOLUME_PERCENT as u16 / 2)
                    / MAX_VOLUME_PERCENT as u16;
                #[allow(clippy::cast_possible_truncation)]
                let volume = scaled as u8;
                Some(volume)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pass_through_operations() {
        assert_eq!(Command::Play.operation_id(), Some(OperationId::Play));
        assert_eq!(Command::StepForward.operation_id(), Some(OperationId::Forward));
        assert_eq!(Command::StepBackward.operation_id(), Some(OperationId::Backward));
        assert_eq!(Command::Skip.operation_id(), Some(OperationId::Skip));
        assert_eq!(Command::GetPlayStatus.operation_id(), None);
        assert_eq!(
            Command::SetAbsoluteVolume { percent: 10 }.operation_id(),
            None
        );
    }

    #[test]
    fn test_absolute_volume_scaling() {
        assert_eq!(
            Command::SetAbsoluteVolume { percent: 0 }.absolute_volume(),
            Some(0)
        );
        assert_eq!(
            Command::SetAbsoluteVolume { percent: 50 }.absolute_volume(),
            Some(64)
        );
        assert_eq!(
            Command::SetAbsoluteVolume { percent: 100 }.absolute_volume(),
            Some(MAX_ABSOLUTE_VOLUME)
        );
        assert_eq!(
            Command::SetAbsoluteVolume { percent: 101 }.absolute_volume(),
            None
        );
        assert_eq!(Command::Mute.absolute_volume(), None);
    }

    #[test]
    fn test_argument_validation() {
        assert!(Command::SetAbsoluteVolume { percent: 100 }.is_valid());
        assert!(!Command::SetAbsoluteVolume { percent: 101 }.is_valid());
        assert!(Command::SetRepeatMode(RepeatMode::Group).is_valid());
    }

    #[test]
    fn test_only_registrations_expect_interim() {
        assert!(Command::EnableNotification(NotificationClass::TrackChanged).expects_interim());
        assert!(!Command::DisableNotification(NotificationClass::TrackChanged).expects_interim());
        assert!(!Command::Play.expects_interim());
    }
}
