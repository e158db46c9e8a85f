//! Notification Subscription Ledger
//!
//! Records which notification classes the controller believes are registered
//! on the remote target. The ledger is only updated once a registration or
//! deregistration is confirmed by a final, non-error response; it is never
//! re-queried from the device.

use crate::constants::NOTIFICATION_CLASS_COUNT;

/// Player and device state changes a controller can subscribe to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum NotificationClass {
    /// Playback status changed
    PlaybackStatus = 0x01,
    /// Track changed
    TrackChanged = 0x02,
    /// Track reached end
    TrackReachedEnd = 0x03,
    /// Track reached start
    TrackReachedStart = 0x04,
    /// Playback position changed
    PlaybackPosition = 0x05,
    /// Battery status changed
    BatteryStatus = 0x06,
    /// System status changed
    SystemStatus = 0x07,
    /// Player application setting changed
    PlayerApplicationSetting = 0x08,
    /// Now playing content changed
    NowPlayingContent = 0x09,
    /// Available players changed
    AvailablePlayers = 0x0A,
    /// Addressed player changed
    AddressedPlayer = 0x0B,
    /// UIDs changed
    Uids = 0x0C,
    /// Absolute volume changed
    AbsoluteVolume = 0x0D,
}

impl NotificationClass {
    /// Every notification class, in event id order
    pub const ALL: [Self; NOTIFICATION_CLASS_COUNT] = [
        Self::PlaybackStatus,
        Self::TrackChanged,
        Self::TrackReachedEnd,
        Self::TrackReachedStart,
        Self::PlaybackPosition,
        Self::BatteryStatus,
        Self::SystemStatus,
        Self::PlayerApplicationSetting,
        Self::NowPlayingContent,
        Self::AvailablePlayers,
        Self::AddressedPlayer,
        Self::Uids,
        Self::AbsoluteVolume,
    ];

    /// Profile event id
    #[must_use]
    pub const fn event_id(self) -> u8 {
        self as u8
    }

    const fn bit(self) -> u16 {
        1 << (self as u8)
    }
}

impl TryFrom<u8> for NotificationClass {
    type Error = u8;

    fn try_from(event_id: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .iter()
            .copied()
            .find(|class| class.event_id() == event_id)
            .ok_or(event_id)
    }
}

/// Set of notification classes, one bit per profile event id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NotificationSet(u16);

impl NotificationSet {
    /// Empty set
    #[must_use]
    pub const fn new() -> Self {
        Self(0)
    }

    /// Build a set from a capability bit mask (bit N = event id N); unknown bits are dropped
    #[must_use]
    pub fn from_bits(bits: u16) -> Self {
        NotificationClass::ALL
            .iter()
            .filter(|class| bits & class.bit() != 0)
            .fold(Self::new(), |set, &class| set.with(class))
    }

    /// Raw bit mask
    #[must_use]
    pub const fn bits(self) -> u16 {
        self.0
    }

    /// Copy of the set with `class` added
    #[must_use]
    pub const fn with(self, class: NotificationClass) -> Self {
        Self(self.0 | class.bit())
    }

    /// Classes in either set
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Add a class
    pub fn insert(&mut self, class: NotificationClass) {
        self.0 |= class.bit();
    }

    /// Remove a class
    pub fn remove(&mut self, class: NotificationClass) {
        self.0 &= !class.bit();
    }

    /// Whether the set contains `class`
    #[must_use]
    pub const fn contains(self, class: NotificationClass) -> bool {
        self.0 & class.bit() != 0
    }

    /// Whether the set is empty
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Number of classes in the set
    #[must_use]
    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Lowest event id class in the set
    #[must_use]
    pub fn first(self) -> Option<NotificationClass> {
        self.iter().next()
    }

    /// Iterate the classes in event id order
    pub fn iter(self) -> impl Iterator<Item = NotificationClass> {
        NotificationClass::ALL
            .into_iter()
            .filter(move |class| self.contains(*class))
    }
}

/// The controller's record of subscribed notification classes
#[derive(Debug, Clone, Default)]
pub struct NotificationLedger {
    subscribed: NotificationSet,
}

impl NotificationLedger {
    /// Create a ledger with nothing subscribed
    #[must_use]
    pub const fn new() -> Self {
        Self {
            subscribed: NotificationSet::new(),
        }
    }

    /// Record a confirmed registration
    pub fn mark_subscribed(&mut self, class: NotificationClass) {
        self.subscribed.insert(class);
    }

    /// Record a confirmed deregistration
    pub fn mark_unsubscribed(&mut self, class: NotificationClass) {
        self.subscribed.remove(class);
    }

    /// Whether `class` is believed to be registered
    #[must_use]
    pub const fn is_subscribed(&self, class: NotificationClass) -> bool {
        self.subscribed.contains(class)
    }

    /// All subscribed classes
    #[must_use]
    pub const fn subscribed(&self) -> NotificationSet {
        self.subscribed
    }

    /// Clear every subscription, returning what was subscribed
    pub fn reset(&mut self) -> NotificationSet {
        core::mem::take(&mut self.subscribed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_ids_follow_profile_numbering() {
        assert_eq!(NotificationClass::PlaybackStatus.event_id(), 0x01);
        assert_eq!(NotificationClass::PlaybackPosition.event_id(), 0x05);
        assert_eq!(NotificationClass::AbsoluteVolume.event_id(), 0x0D);
        assert_eq!(
            NotificationClass::try_from(0x0C),
            Ok(NotificationClass::Uids)
        );
        assert_eq!(NotificationClass::try_from(0x00), Err(0x00));
        assert_eq!(NotificationClass::try_from(0x0E), Err(0x0E));
    }

    #[test]
    fn test_set_membership() {
        let mut set = NotificationSet::new();
        assert!(set.is_empty());

        set.insert(NotificationClass::TrackChanged);
        set.insert(NotificationClass::AbsoluteVolume);
        set.insert(NotificationClass::TrackChanged);
        assert_eq!(set.len(), 2);
        assert!(set.contains(NotificationClass::TrackChanged));
        assert!(!set.contains(NotificationClass::PlaybackStatus));

        set.remove(NotificationClass::TrackChanged);
        assert_eq!(set.first(), Some(NotificationClass::AbsoluteVolume));
    }

    #[test]
    fn test_set_from_capability_bits() {
        // bit 0 is not an event id and is dropped
        let set = NotificationSet::from_bits(0b0000_0000_0000_0111);
        assert_eq!(set.len(), 2);
        assert!(set.contains(NotificationClass::PlaybackStatus));
        assert!(set.contains(NotificationClass::TrackChanged));

        let all = NotificationSet::from_bits(u16::MAX);
        assert_eq!(all.len(), NotificationClass::ALL.len());
    }

    #[test]
    fn test_set_iterates_in_event_id_order() {
        let set = NotificationSet::new()
            .with(NotificationClass::Uids)
            .with(NotificationClass::PlaybackStatus)
            .with(NotificationClass::BatteryStatus);

        let mut order: heapless::Vec<NotificationClass, 13> = heapless::Vec::new();
        for class in set.iter() {
            order.push(class).unwrap();
        }
        assert_eq!(
            order.as_slice(),
            &[
                NotificationClass::PlaybackStatus,
                NotificationClass::BatteryStatus,
                NotificationClass::Uids,
            ]
        );
    }

    #[test]
    fn test_ledger_reset_returns_previous() {
        let mut ledger = NotificationLedger::new();
        ledger.mark_subscribed(NotificationClass::PlaybackStatus);
        ledger.mark_subscribed(NotificationClass::TrackChanged);
        ledger.mark_unsubscribed(NotificationClass::PlaybackStatus);

        let previous = ledger.reset();
        assert_eq!(previous, NotificationSet::new().with(NotificationClass::TrackChanged));
        for class in NotificationClass::ALL {
            assert!(!ledger.is_subscribed(class));
        }
    }
}
