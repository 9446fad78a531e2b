//! Interval scheduling for host heartbeats and abandoned-room sweeps.
//!
//! A host signals liveness every `heartbeat_interval`; a room whose last
//! heartbeat is older than `abandon_after` is eligible for the sweep, which
//! runs every `sweep_interval`. [`PulseScheduler`] drives either loop.
//!
//! # Disabled mode
//!
//! A zero period disables the scheduler: [`PulseScheduler::wait_for_pulse`]
//! pends forever, so a `tokio::select!` loop keeps serving its other
//! branches.
//!
//! # Integration
//!
//! ```ignore
//! let mut pulse = PulseScheduler::heartbeat(&config);
//! loop {
//!     tokio::select! {
//!         _ = &mut shutdown => break,
//!         _ = pulse.wait_for_pulse() => coordinator.heartbeat(&code).await?,
//!     }
//! }
//! ```

use std::time::Duration;

use rand::Rng;
use tokio::time::{self, Instant};
use tracing::{debug, trace, warn};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Liveness timing shared by hosts and the sweeper.
#[derive(Debug, Clone)]
pub struct PulseConfig {
    /// How often a host stamps its room. Default: 10 s.
    pub heartbeat_interval: Duration,
    /// How often the sweeper scans for abandoned rooms. Default: 15 s.
    pub sweep_interval: Duration,
    /// Heartbeat age after which a room counts as abandoned. Default: 30 s.
    pub abandon_after: Duration,
    /// Random delay (0..max) added to the *first* pulse so hosts that
    /// started together do not beat in lockstep. Default: 500 ms.
    pub initial_jitter: Duration,
}

impl Default for PulseConfig {
    fn default() -> Self {
        Self {
            heartbeat_interval: Duration::from_secs(10),
            sweep_interval: Duration::from_secs(15),
            abandon_after: Duration::from_secs(30),
            initial_jitter: Duration::from_millis(500),
        }
    }
}

impl PulseConfig {
    /// A live room must be able to miss one heartbeat without being swept.
    pub const MIN_HEARTBEATS_PER_WINDOW: u32 = 2;

    /// Clamp out-of-range values so the config is safe to use.
    ///
    /// - `abandon_after` is raised to at least
    ///   [`Self::MIN_HEARTBEATS_PER_WINDOW`] heartbeat intervals.
    /// - `initial_jitter` is capped to one heartbeat interval.
    ///
    /// Zero intervals are left alone: they disable the matching loop.
    pub fn validated(mut self) -> Self {
        let floor = self.heartbeat_interval * Self::MIN_HEARTBEATS_PER_WINDOW;
        if !self.heartbeat_interval.is_zero() && self.abandon_after < floor {
            warn!(
                abandon_after_ms = self.abandon_after.as_millis() as u64,
                floor_ms = floor.as_millis() as u64,
                "abandon_after shorter than two heartbeats, raising"
            );
            self.abandon_after = floor;
        }
        if !self.heartbeat_interval.is_zero() && self.initial_jitter > self.heartbeat_interval {
            self.initial_jitter = self.heartbeat_interval;
        }
        self
    }
}

// ---------------------------------------------------------------------------
// Pulse info
// ---------------------------------------------------------------------------

/// Returned by [`PulseScheduler::wait_for_pulse`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PulseInfo {
    /// Starts at 1.
    pub pulse: u64,
    /// How late the pulse fired relative to its deadline.
    pub late_by: Duration,
    /// Whole periods missed because the caller was busy. Missed pulses are
    /// never replayed; one late stamp is as good as several.
    pub missed: u64,
}

// ---------------------------------------------------------------------------
// Scheduler
// ---------------------------------------------------------------------------

/// Fixed-period scheduler for one liveness loop.
pub struct PulseScheduler {
    period: Option<Duration>,
    next: Option<Instant>,
    count: u64,
    total_missed: u64,
    paused: bool,
}

impl PulseScheduler {
    /// A scheduler firing every `period` (disabled when zero). The first
    /// pulse is delayed by a random `0..jitter` on top of `period`.
    pub fn new(period: Duration, jitter: Duration) -> Self {
        let period = (!period.is_zero()).then_some(period);
        let next = period.map(|p| {
            // Sub-microsecond jitter rounds down to none.
            let jitter_us = u64::try_from(jitter.as_micros()).unwrap_or(u64::MAX);
            let offset = if jitter_us > 0 {
                Duration::from_micros(rand::rng().random_range(0..jitter_us))
            } else {
                Duration::ZERO
            };
            Instant::now() + p + offset
        });

        match period {
            Some(p) => debug!(period_ms = p.as_millis() as u64, "pulse scheduler created"),
            None => debug!("pulse scheduler created disabled"),
        }

        Self {
            period,
            next,
            count: 0,
            total_missed: 0,
            paused: false,
        }
    }

    /// Paced at the host heartbeat interval.
    pub fn heartbeat(config: &PulseConfig) -> Self {
        Self::new(config.heartbeat_interval, config.initial_jitter)
    }

    /// Paced at the sweep interval.
    pub fn sweep(config: &PulseConfig) -> Self {
        Self::new(config.sweep_interval, config.initial_jitter)
    }

    /// Waits until the next pulse is due.
    ///
    /// Pends forever while paused or disabled.
    pub async fn wait_for_pulse(&mut self) -> PulseInfo {
        let (deadline, period) = match (self.next, self.period) {
            (Some(next), Some(period)) if !self.paused => (next, period),
            _ => {
                std::future::pending::<()>().await;
                unreachable!()
            }
        };

        time::sleep_until(deadline).await;

        let now = Instant::now();
        let late_by = now.saturating_duration_since(deadline);
        let missed = (late_by.as_nanos() / period.as_nanos()) as u64;
        if missed > 0 {
            warn!(pulse = self.count + 1, missed, "pulse overrun, skipping ahead");
        }

        self.count += 1;
        self.total_missed += missed;
        // Always reschedule from now so a stall never causes a burst.
        self.next = Some(now + period);

        trace!(pulse = self.count, "pulse fired");
        PulseInfo {
            pulse: self.count,
            late_by,
            missed,
        }
    }

    /// Stops pulses until [`resume`](Self::resume). Idempotent.
    pub fn pause(&mut self) {
        if !self.paused {
            self.paused = true;
            debug!(pulse = self.count, "pulse scheduler paused");
        }
    }

    /// Restarts pulses one full period from now.
    pub fn resume(&mut self) {
        if self.paused {
            self.paused = false;
            if let Some(period) = self.period {
                self.next = Some(Instant::now() + period);
            }
            debug!(pulse = self.count, "pulse scheduler resumed");
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_disabled(&self) -> bool {
        self.period.is_none()
    }

    pub fn pulse_count(&self) -> u64 {
        self.count
    }

    /// Total pulses skipped because the caller fell behind.
    pub fn total_missed(&self) -> u64 {
        self.total_missed
    }

    pub fn period(&self) -> Option<Duration> {
        self.period
    }
}
