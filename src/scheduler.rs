use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::error::{Result, SimError};
use crate::events::{Event, SimEvent};
use crate::types::Day;

/// Virtual clock plus the queue of pending wake-ups.
///
/// A process suspends by asking to be woken after a whole number of days;
/// `next_due` hands wake-ups back in (day, submission) order and moves the
/// clock forward. Wake-ups on or after the horizon are never returned.
pub struct Scheduler {
    queue: BinaryHeap<Reverse<SimEvent>>,
    now: Day,
    horizon: Day,
    next_seq: u64,
}

impl Scheduler {
    pub fn new(horizon: Day) -> Self {
        Scheduler { queue: BinaryHeap::new(), now: Day(0), horizon, next_seq: 0 }
    }

    pub fn now(&self) -> Day {
        self.now
    }

    pub fn horizon(&self) -> Day {
        self.horizon
    }

    /// Number of wake-ups still queued (including ones past the horizon).
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Schedule an event at an absolute day. Used to bootstrap processes.
    pub fn schedule_at(&mut self, day: Day, event: Event) -> Result<()> {
        if day < self.now {
            return Err(SimError::ScheduleInPast { day, now: self.now });
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(Reverse(SimEvent { day, seq, event }));
        Ok(())
    }

    /// Wake the caller again after exactly `delay` days (`delay >= 1`).
    pub fn schedule_after(&mut self, delay: u64, event: Event) -> Result<()> {
        if delay == 0 {
            return Err(SimError::NonPositiveDelay);
        }
        self.schedule_at(self.now.offset(delay), event)
    }

    /// Pop the earliest wake-up before the horizon, advancing the clock to it.
    /// Once nothing is due before the horizon the clock is parked on it.
    pub fn next_due(&mut self) -> Option<SimEvent> {
        let due = matches!(self.queue.peek(), Some(Reverse(ev)) if ev.day < self.horizon);
        if !due {
            self.now = self.horizon;
            return None;
        }
        let Reverse(ev) = self.queue.pop()?;
        self.now = ev.day;
        Some(ev)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LoanId;

    fn matured(id: u64) -> Event {
        Event::LoanMatured { loan_id: LoanId(id) }
    }

    #[test]
    fn zero_delay_fails_fast() {
        let mut s = Scheduler::new(Day(10));
        assert!(matches!(s.schedule_after(0, Event::AllocatorWake), Err(SimError::NonPositiveDelay)));
        assert_eq!(s.pending(), 0);
    }

    #[test]
    fn clock_advances_to_each_wake_up() {
        let mut s = Scheduler::new(Day(100));
        s.schedule_at(Day(0), Event::AllocatorWake).unwrap();
        s.schedule_after(30, matured(0)).unwrap();
        s.schedule_after(5, matured(1)).unwrap();

        let ev = s.next_due().unwrap();
        assert_eq!((ev.day, s.now()), (Day(0), Day(0)));
        let ev = s.next_due().unwrap();
        assert_eq!(ev.event, matured(1));
        assert_eq!(s.now(), Day(5));

        // Relative delays count from the current clock.
        s.schedule_after(1, matured(2)).unwrap();
        assert_eq!(s.next_due().unwrap().day, Day(6));
        assert_eq!(s.next_due().unwrap().day, Day(30));
        assert!(s.next_due().is_none());
        assert_eq!(s.now(), Day(100));
    }

    #[test]
    fn same_day_wake_ups_keep_submission_order() {
        let mut s = Scheduler::new(Day(10));
        for id in 0..5 {
            s.schedule_at(Day(3), matured(id)).unwrap();
        }
        let ids: Vec<Event> = std::iter::from_fn(|| s.next_due()).map(|e| e.event).collect();
        assert_eq!(ids, (0..5).map(matured).collect::<Vec<_>>());
    }

    #[test]
    fn wake_ups_at_or_past_horizon_are_abandoned() {
        let mut s = Scheduler::new(Day(10));
        s.schedule_at(Day(9), matured(0)).unwrap();
        s.schedule_at(Day(10), matured(1)).unwrap();
        s.schedule_at(Day(40), matured(2)).unwrap();

        assert_eq!(s.next_due().unwrap().event, matured(0));
        assert!(s.next_due().is_none());
        assert_eq!(s.now(), Day(10));
        assert_eq!(s.pending(), 2, "abandoned wake-ups stay queued, never resumed");
    }

    #[test]
    fn scheduling_in_the_past_is_rejected() {
        let mut s = Scheduler::new(Day(10));
        s.schedule_at(Day(4), Event::AllocatorWake).unwrap();
        s.next_due().unwrap();
        let err = s.schedule_at(Day(3), Event::AllocatorWake).unwrap_err();
        assert!(matches!(err, SimError::ScheduleInPast { day: Day(3), now: Day(4) }));
    }
}
