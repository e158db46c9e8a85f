#![no_std]
#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

#[macro_use]
mod fmt;

mod address;
pub mod api;
pub mod avrcp;
pub mod constants;
pub mod processor;

pub use address::{BluetoothAddress, ParseAddressError};
pub use avrcp::{
    AvrcpController, AvrcpEvent, Clock, Command, ControlTransport, ControllerOptions,
    ControllerOutcome,
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{DEFAULT_COMMAND_TIMEOUT_MS, MAX_VOLUME_PERCENT};

    #[test]
    fn test_controller_options() {
        let default_options = ControllerOptions::default();
        assert_eq!(
            default_options.command_timeout_ms,
            Some(DEFAULT_COMMAND_TIMEOUT_MS)
        );
        assert!(!default_options.restore_subscriptions);

        let custom_options = ControllerOptions {
            command_timeout_ms: None,
            restore_subscriptions: true,
        };
        assert_eq!(custom_options.command_timeout_ms, None);
        assert!(custom_options.restore_subscriptions);
    }

    #[test]
    fn test_volume_commands_validate_percent() {
        assert!(
            Command::SetAbsoluteVolume {
                percent: MAX_VOLUME_PERCENT
            }
            .is_valid()
        );
        assert!(
            !Command::SetAbsoluteVolume {
                percent: MAX_VOLUME_PERCENT + 1
            }
            .is_valid()
        );
    }
}
