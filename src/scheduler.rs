//! Daily wall-clock job list polled by the main loop.
//!
//! Times are local naive datetimes. A job that comes due fires once, and is
//! then moved to its next occurrence strictly after the poll time, so a
//! missed day is skipped rather than caught up.

use chrono::{Days, NaiveDateTime, NaiveTime};

/// A job that fires once a day at a fixed local time.
#[derive(Debug, Clone)]
struct DailyJob<T> {
    at: NaiveTime,
    next_run: NaiveDateTime,
    payload: T,
}

impl<T> DailyJob<T> {
    fn is_due(&self, now: NaiveDateTime) -> bool {
        now >= self.next_run
    }
}

/// Owned list of pending daily jobs.
#[derive(Debug, Clone)]
pub struct Scheduler<T> {
    jobs: Vec<DailyJob<T>>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self { jobs: Vec::new() }
    }
}

impl<T: Clone> Scheduler<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `payload` to fire every day at `at`, first at the next
    /// occurrence after `now`.
    pub fn every_day_at(&mut self, at: NaiveTime, now: NaiveDateTime, payload: T) {
        self.jobs.push(DailyJob {
            at,
            next_run: next_occurrence(at, now),
            payload,
        });
    }

    /// Return the payloads of all due jobs and reschedule them.
    pub fn run_pending(&mut self, now: NaiveDateTime) -> Vec<T> {
        let mut due = Vec::new();
        for job in self.jobs.iter_mut().filter(|job| job.is_due(now)) {
            job.next_run = next_occurrence(job.at, now);
            due.push(job.payload.clone());
        }
        due
    }

    /// Earliest upcoming fire time.
    pub fn next_run(&self) -> Option<NaiveDateTime> {
        self.jobs.iter().map(|job| job.next_run).min()
    }
}

/// First datetime strictly after `after` whose time of day is `at`.
pub fn next_occurrence(at: NaiveTime, after: NaiveDateTime) -> NaiveDateTime {
    let today = after.date().and_time(at);
    if today > after {
        today
    } else {
        today
            .checked_add_days(Days::new(1))
            .unwrap_or(NaiveDateTime::MAX)
    }
}
