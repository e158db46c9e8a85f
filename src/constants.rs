//! AVRCP Controller Constants
//!
//! Protocol values, default timings and fixed capacities used throughout the
//! crate. Capacities are compile-time constants because every collection is a
//! `heapless` container.

/// HCI status code reported for a successful connection
pub const HCI_SUCCESS: u8 = 0x00;

/// Largest absolute volume value defined by the profile (7 bits)
pub const MAX_ABSOLUTE_VOLUME: u8 = 0x7F;

/// Upper bound accepted by `set_absolute_volume`
pub const MAX_VOLUME_PERCENT: u8 = 100;

/// Number of notification classes defined by the profile
pub const NOTIFICATION_CLASS_COUNT: usize = 13;

/// Maximum length of a single now-playing text attribute in bytes
pub const MAX_MEDIA_ATTRIBUTE_LENGTH: usize = 64;

/// Default bound on how long a Pending Command may wait for its final response
pub const DEFAULT_COMMAND_TIMEOUT_MS: u32 = 2000;

/// Depth of each channel in [`crate::api::ControlChannels`]
pub const DEFAULT_CHANNEL_DEPTH: usize = 8;

