//! Publication scheduler.
//!
//! A cursor walks the fleet round-robin. For each address with pending changes
//! it first steps through the frequent readings, then through the 64 timer
//! day/slot pairs, one unit of work per call to [`Scheduler::advance`]. The
//! scheduler only decides what to do; the event loop carries the returned
//! [`Step`] out against the session and the valve model.

use crate::changes::{Change, ChangeMasks, ChangeSet, TIMER_DAYS};
use crate::model::Reading;

/// Frequent readings walked when the state document is disabled.
pub const FREQUENT_SLOTS: usize = 9;

/// Timer slots per day walked by the timer phase.
const SLOTS_PER_DAY: u8 = 8;

/// Which category of an address the cursor is walking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    /// Walking the frequently changing readings.
    Frequent,
    /// Walking the timer slots of pending days.
    Timer,
}

/// Position of the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Cursor {
    /// Address being walked.
    pub address: u8,
    /// Category being walked at `address`.
    pub phase: Phase,
    /// Reading index in the frequent phase, `day << 3 | slot` in the timer phase.
    pub minor: u8,
}

impl Cursor {
    const START: Cursor = Cursor {
        address: 0,
        phase: Phase::Frequent,
        minor: 0,
    };
}

/// One unit of work decided by [`Scheduler::advance`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Step {
    /// Nothing (more) to do for `from`; the cursor moved on to the next address.
    NextAddress {
        /// Address the cursor left.
        from: u8,
    },
    /// No frequent change pending; the cursor moved to the timer phase.
    FrequentSkipped {
        /// Address being walked.
        address: u8,
    },
    /// Publish `reading` of `address` if it is unpublished.
    Reading {
        /// Address being walked.
        address: u8,
        /// Reading due this tick.
        reading: Reading,
    },
    /// All readings walked; the frequent change was retired.
    FrequentDone {
        /// Address being walked.
        address: u8,
    },
    /// Publish timer slot `slot` of day `day`.
    TimerSlot {
        /// Address being walked.
        address: u8,
        /// Pending timer day.
        day: u8,
        /// Slot within the day.
        slot: u8,
    },
    /// Day `day` has no pending change; nothing to publish for this slot.
    TimerSkipped {
        /// Address being walked.
        address: u8,
        /// Timer day without pending change.
        day: u8,
        /// Slot within the day.
        slot: u8,
    },
}

impl Step {
    /// Upper bound on publish calls needed to carry out the step.
    pub fn max_publishes(&self) -> usize {
        match self {
            Step::Reading { .. } => 1,
            Step::TimerSlot { .. } => 2,
            _ => 0,
        }
    }
}

/// Round-robin walk over the pending changes of `N` addresses.
#[derive(Debug, Clone)]
pub struct Scheduler<const N: usize> {
    cursor: Cursor,
    readings: &'static [Reading],
    changes: ChangeMasks<N>,
}

impl<const N: usize> Scheduler<N> {
    /// Creates a scheduler. `with_state` adds the state document to the
    /// frequent walk.
    pub fn new(with_state: bool) -> Self {
        let readings = if with_state {
            &Reading::ORDER[..]
        } else {
            &Reading::ORDER[..FREQUENT_SLOTS]
        };
        Self {
            cursor: Cursor::START,
            readings,
            changes: ChangeMasks::new(),
        }
    }

    /// Where the next [`Scheduler::advance`] continues.
    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Pending changes per address.
    pub fn changes(&self) -> &ChangeMasks<N> {
        &self.changes
    }

    /// Mutable pending changes, used to merge a [`ChangeInbox`](crate::ChangeInbox).
    pub fn changes_mut(&mut self) -> &mut ChangeMasks<N> {
        &mut self.changes
    }

    /// Number of readings in the frequent walk.
    pub fn frequent_len(&self) -> usize {
        self.readings.len()
    }

    /// Marks `changes` pending for `address`.
    pub fn raise(&mut self, address: u8, changes: ChangeSet) -> bool {
        self.changes.raise(address, changes)
    }

    /// Retires everything pending for `address` and, if the cursor sits on it,
    /// moves on to the next address.
    pub fn drop_address(&mut self, address: u8) {
        self.changes.clear(address, ChangeSet::from_bits(u32::MAX));
        if self.cursor.address == address {
            self.next_address();
        }
    }

    /// Decides the next unit of work and moves the cursor past it.
    ///
    /// Pending changes are retired here, before the work is carried out, so a
    /// failed publish never keeps a change pending.
    pub fn advance(&mut self) -> Step {
        let address = self.cursor.address;
        let pending = self.changes.get(address);

        if pending.is_empty() {
            self.next_address();
            return Step::NextAddress { from: address };
        }

        match self.cursor.phase {
            Phase::Frequent => self.frequent_step(address, pending),
            Phase::Timer => self.timer_step(address, pending),
        }
    }

    fn frequent_step(&mut self, address: u8, pending: ChangeSet) -> Step {
        if !pending.contains(Change::Frequent) {
            self.next_phase();
            return Step::FrequentSkipped { address };
        }

        match self.readings.get(self.cursor.minor as usize) {
            Some(&reading) => {
                self.cursor.minor += 1;
                Step::Reading { address, reading }
            }
            None => {
                self.changes.clear(address, ChangeSet::FREQUENT);
                self.next_phase();
                Step::FrequentDone { address }
            }
        }
    }

    fn timer_step(&mut self, address: u8, pending: ChangeSet) -> Step {
        if !pending.has_timers() {
            self.next_phase();
            return Step::NextAddress { from: address };
        }

        let day = self.cursor.minor >> 3;
        let slot = self.cursor.minor & 0x7;
        self.cursor.minor = self.cursor.minor.saturating_add(1);

        if day >= TIMER_DAYS {
            self.next_phase();
            return Step::NextAddress { from: address };
        }

        if pending.timer_days() & (1 << day) == 0 {
            return Step::TimerSkipped { address, day, slot };
        }

        if slot == SLOTS_PER_DAY - 1 {
            self.changes.clear(address, Change::TimerDay(day).into());
        }

        Step::TimerSlot { address, day, slot }
    }

    fn next_phase(&mut self) {
        match self.cursor.phase {
            Phase::Frequent => {
                self.cursor.phase = Phase::Timer;
                self.cursor.minor = 0;
            }
            Phase::Timer => self.next_address(),
        }
    }

    fn next_address(&mut self) {
        let next = self.cursor.address as usize + 1;
        self.cursor = Cursor {
            address: if next >= N { 0 } else { next as u8 },
            ..Cursor::START
        };
    }
}
