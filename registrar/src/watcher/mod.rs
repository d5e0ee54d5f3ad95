//! Seat availability watching
//!
//! One polling loop per CRN. Each loop reads the section's enrollment info
//! every few seconds and, as soon as a seat (or a waitlist slot) frees up,
//! hands a [`SeatTrigger`] to the enrollment callback and stops.

pub mod seat_watcher;

pub use seat_watcher::{SeatTrigger, SeatWatcher, WatchOutcome};

/// Live seat counts of one section
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SectionSnapshot {
    pub enrollment_seats_available: u32,
    pub waitlist_capacity: u32,
    pub waitlist_actual: u32,
    pub waitlist_seats_available: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeatDecision {
    /// An enrollment seat is open
    Enroll,
    /// No seat, but the waitlist has room
    Waitlist,
    WaitlistOpeningSoon,
    NotAvailable,
}

impl SeatDecision {
    pub fn triggers_enrollment(&self) -> bool {
        matches!(self, SeatDecision::Enroll | SeatDecision::Waitlist)
    }
}

impl SectionSnapshot {
    /// Enrollment seats take priority over waitlist state
    pub fn decide(&self) -> SeatDecision {
        if self.enrollment_seats_available > 0 {
            SeatDecision::Enroll
        } else if self.waitlist_capacity > self.waitlist_actual && self.waitlist_seats_available > 0 {
            SeatDecision::Waitlist
        } else if self.enrollment_seats_available >= 1 && self.waitlist_seats_available == 0 {
            SeatDecision::WaitlistOpeningSoon
        } else {
            SeatDecision::NotAvailable
        }
    }
}
