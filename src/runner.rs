//! Immediate run followed by the daily poll loop.

use crate::config::ScheduleConfig;
use crate::scan::ScanCycle;
use crate::scheduler::Scheduler;
use chrono::{NaiveDateTime, NaiveTime};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info};

/// Timing of the scan loop.
#[derive(Debug, Clone, Copy)]
pub struct DailyRun {
    pub daily_at: NaiveTime,
    pub poll_interval: Duration,
    pub run_on_start: bool,
}

impl DailyRun {
    pub fn from_config(schedule: &ScheduleConfig) -> anyhow::Result<Self> {
        Ok(Self {
            daily_at: schedule.daily_time()?,
            poll_interval: Duration::from_secs(schedule.poll_interval_seconds),
            run_on_start: schedule.run_on_start,
        })
    }
}

/// Run `cycle` once (if configured), then every day at `daily_at`, until
/// `shutdown` resolves.
///
/// `shutdown` is polled for the whole lifetime of the loop, including while
/// a cycle is in flight; a cycle interrupted that way is dropped. `clock`
/// supplies local wall-clock time. Returns the number of completed cycles.
pub async fn run_daily<C, S>(
    cycle: &ScanCycle,
    run: DailyRun,
    mut clock: C,
    shutdown: S,
) -> usize
where
    C: FnMut() -> NaiveDateTime,
    S: Future<Output = ()>,
{
    tokio::pin!(shutdown);
    let mut completed = 0;

    if run.run_on_start {
        println!("\n--- Immediate execution ---");
        tokio::select! {
            _ = &mut shutdown => {
                info!("Interrupted during immediate scan");
                return completed;
            }
            _ = cycle.run() => completed += 1,
        }
    }

    let mut scheduler = Scheduler::new();
    scheduler.every_day_at(run.daily_at, clock(), ());
    println!(
        "\nScript scheduled to run once a day at {}. Press Ctrl+C to stop.",
        run.daily_at.format("%H:%M")
    );
    info!(next_run = ?scheduler.next_run(), "Scheduler started");

    loop {
        for _job in scheduler.run_pending(clock()) {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Interrupted during scheduled scan");
                    return completed;
                }
                _ = cycle.run() => completed += 1,
            }
            debug!(next_run = ?scheduler.next_run(), "Next scan scheduled");
        }

        tokio::select! {
            _ = &mut shutdown => {
                info!("Interrupted, stopping scheduler");
                return completed;
            }
            _ = tokio::time::sleep(run.poll_interval) => {}
        }
    }
}
