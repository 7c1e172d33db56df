//! # Pending Change Tracking
//!
//! The radio protocol layer reports, per device address, which attribute
//! categories changed since they were last published. Repeated changes of the
//! same kind coalesce into a single pending flag; the publication scheduler
//! retires a flag once it has walked the corresponding data.
//!
//! The flags pack into one `u32` per address: bit 0 for the frequent attribute
//! group and bits 1..=8 for timer days 0..=7.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::RawMutex;

/// Number of timer days tracked per device.
pub const TIMER_DAYS: u8 = 8;

const FREQUENT_BIT: u32 = 1;
const TIMER_SHIFT: u32 = 1;
const TIMER_BITS: u32 = 0xFF << TIMER_SHIFT;

/// A single kind of pending change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Change {
    /// One of the frequently changing attributes (temperatures, battery, mode...).
    Frequent,
    /// Timer schedule data for the given day (0..=7).
    TimerDay(u8),
}

impl Change {
    fn bits(self) -> u32 {
        match self {
            Change::Frequent => FREQUENT_BIT,
            Change::TimerDay(day) if day < TIMER_DAYS => 1 << (TIMER_SHIFT + day as u32),
            Change::TimerDay(_) => 0,
        }
    }
}

/// A set of pending [`Change`] kinds for one device.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChangeSet(u32);

impl ChangeSet {
    /// Nothing pending.
    pub const EMPTY: ChangeSet = ChangeSet(0);
    /// Just the frequent-values kind.
    pub const FREQUENT: ChangeSet = ChangeSet(FREQUENT_BIT);
    /// Every timer day.
    pub const ALL_TIMERS: ChangeSet = ChangeSet(TIMER_BITS);

    /// Builds a set from its packed form. Unknown bits are dropped.
    pub const fn from_bits(bits: u32) -> Self {
        ChangeSet(bits & (FREQUENT_BIT | TIMER_BITS))
    }

    /// Packed form: bit 0 frequent, bits 1..=8 timer days.
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Set holding just the timer kind for `day`.
    pub fn timer_day(day: u8) -> Self {
        ChangeSet(Change::TimerDay(day).bits())
    }

    /// True when nothing is pending.
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// True if `change` is pending. Out-of-range timer days never are.
    pub fn contains(self, change: Change) -> bool {
        let bits = change.bits();
        bits != 0 && self.0 & bits == bits
    }

    /// Marks `change` pending. Raising it twice is the same as once.
    pub fn insert(&mut self, change: Change) {
        self.0 |= change.bits();
    }

    /// Retires `change`.
    pub fn remove(&mut self, change: Change) {
        self.0 &= !change.bits();
    }

    /// Every kind pending in either set.
    pub fn union(self, other: ChangeSet) -> Self {
        ChangeSet(self.0 | other.0)
    }

    /// Removes every kind present in `other`.
    pub fn difference(self, other: ChangeSet) -> Self {
        ChangeSet(self.0 & !other.0)
    }

    /// True if any timer day is pending.
    pub fn has_timers(self) -> bool {
        self.0 & TIMER_BITS != 0
    }

    /// Pending timer days as a bitmask, bit `d` standing for day `d`.
    pub fn timer_days(self) -> u8 {
        ((self.0 & TIMER_BITS) >> TIMER_SHIFT) as u8
    }
}

impl From<Change> for ChangeSet {
    fn from(change: Change) -> Self {
        ChangeSet(change.bits())
    }
}

/// Pending changes for every address of the fleet.
#[derive(Debug, Clone)]
pub struct ChangeMasks<const N: usize> {
    masks: [ChangeSet; N],
}

impl<const N: usize> ChangeMasks<N> {
    /// Masks with nothing pending.
    pub const fn new() -> Self {
        Self {
            masks: [ChangeSet::EMPTY; N],
        }
    }

    /// Marks `changes` pending for `address`.
    ///
    /// Returns `false` if the address is outside the fleet.
    pub fn raise(&mut self, address: u8, changes: ChangeSet) -> bool {
        match self.masks.get_mut(address as usize) {
            Some(mask) => {
                *mask = mask.union(changes);
                true
            }
            None => false,
        }
    }

    /// Pending changes for `address`. Empty for addresses outside the fleet.
    pub fn get(&self, address: u8) -> ChangeSet {
        self.masks
            .get(address as usize)
            .copied()
            .unwrap_or(ChangeSet::EMPTY)
    }

    /// Retires `changes` for `address`.
    pub fn clear(&mut self, address: u8, changes: ChangeSet) {
        if let Some(mask) = self.masks.get_mut(address as usize) {
            *mask = mask.difference(changes);
        }
    }

    /// Merges every pending change of `other` into `self` and empties `other`.
    pub fn absorb(&mut self, other: &mut ChangeMasks<N>) {
        for (mine, theirs) in self.masks.iter_mut().zip(other.masks.iter_mut()) {
            *mine = mine.union(*theirs);
            *theirs = ChangeSet::EMPTY;
        }
    }

    /// True when no address has anything pending.
    pub fn is_empty(&self) -> bool {
        self.masks.iter().all(|m| m.is_empty())
    }
}

impl<const N: usize> Default for ChangeMasks<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Change masks shared with a protocol task running on the same executor or in
/// an interrupt context.
///
/// The protocol side calls [`ChangeInbox::raise`] through a shared reference;
/// the bridge drains the inbox into its own masks at the start of each tick.
///
/// ```ignore
/// static CHANGES: ChangeInbox<CriticalSectionRawMutex, 32> = ChangeInbox::new();
///
/// // radio task
/// CHANGES.raise(addr, Change::Frequent.into());
///
/// // bridge task
/// bridge.absorb(&CHANGES);
/// ```
pub struct ChangeInbox<M: RawMutex, const N: usize> {
    inner: Mutex<M, RefCell<ChangeMasks<N>>>,
}

impl<M: RawMutex, const N: usize> ChangeInbox<M, N> {
    /// An empty inbox. `const` so it can live in a `static`.
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(ChangeMasks::new())),
        }
    }

    /// Marks `changes` pending for `address`. Returns `false` for addresses
    /// outside the fleet.
    pub fn raise(&self, address: u8, changes: ChangeSet) -> bool {
        self.inner
            .lock(|masks| masks.borrow_mut().raise(address, changes))
    }

    /// Moves every pending change into `target`.
    pub fn drain_into(&self, target: &mut ChangeMasks<N>) {
        self.inner
            .lock(|masks| target.absorb(&mut masks.borrow_mut()));
    }
}

impl<M: RawMutex, const N: usize> Default for ChangeInbox<M, N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;

    #[test]
    fn bit_layout() {
        assert_eq!(ChangeSet::FREQUENT.bits(), 0b1);
        assert_eq!(ChangeSet::timer_day(0).bits(), 0b10);
        assert_eq!(ChangeSet::timer_day(7).bits(), 0b1_0000_0000);
        assert_eq!(ChangeSet::timer_day(8), ChangeSet::EMPTY);
        assert_eq!(ChangeSet::from_bits(u32::MAX).bits(), 0x1FF);
    }

    #[test]
    fn changes_coalesce() {
        let mut set = ChangeSet::EMPTY;
        set.insert(Change::Frequent);
        set.insert(Change::Frequent);
        set.insert(Change::TimerDay(3));
        assert!(set.contains(Change::Frequent));
        assert!(set.contains(Change::TimerDay(3)));
        assert!(!set.contains(Change::TimerDay(2)));
        assert_eq!(set.timer_days(), 0b1000);

        set.remove(Change::Frequent);
        assert!(!set.contains(Change::Frequent));
        assert!(set.has_timers());
        set.remove(Change::TimerDay(3));
        assert!(set.is_empty());
    }

    #[test]
    fn masks_ignore_addresses_outside_fleet() {
        let mut masks = ChangeMasks::<4>::new();
        assert!(masks.raise(3, ChangeSet::FREQUENT));
        assert!(!masks.raise(4, ChangeSet::FREQUENT));
        assert_eq!(masks.get(4), ChangeSet::EMPTY);
        masks.clear(3, ChangeSet::FREQUENT);
        assert!(masks.is_empty());
    }

    #[test]
    fn inbox_drains_and_merges() {
        let inbox = ChangeInbox::<NoopRawMutex, 4>::new();
        let mut masks = ChangeMasks::<4>::new();
        masks.raise(1, ChangeSet::timer_day(2));

        assert!(inbox.raise(1, ChangeSet::FREQUENT));
        assert!(inbox.raise(2, ChangeSet::timer_day(5)));
        inbox.drain_into(&mut masks);

        assert_eq!(masks.get(1), ChangeSet::FREQUENT.union(ChangeSet::timer_day(2)));
        assert_eq!(masks.get(2), ChangeSet::timer_day(5));

        let mut again = ChangeMasks::<4>::new();
        inbox.drain_into(&mut again);
        assert!(again.is_empty());
    }
}
