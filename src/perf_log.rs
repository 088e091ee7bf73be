//! Lightweight named-event performance logging.
//!
//! A [`PerfLog`] accumulates the number of calls and the total wall time of named events.
//! Events may nest, but must be stopped in the reverse order in which they were started.
//! Logs are plain values: every thread or partition keeps its own log, and logs are combined with
//! [`PerfLog::merge`] at points the caller chooses.
//!
//! ```
//! use femasm::perf_log::PerfLog;
//!
//! let mut log = PerfLog::new("example");
//! let sum = log.measure("sum", || (0..100).sum::<u64>()).unwrap();
//! assert_eq!(sum, 4950);
//! let report = log.finish().unwrap();
//! assert_eq!(report.event("sum").unwrap().calls, 1);
//! ```
use log::{info, warn};
use std::collections::BTreeMap;
use std::fmt;
use std::fmt::{Display, Formatter};
use std::time::{Duration, Instant};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PerfLogError {
    #[error("event \"{0}\" is already active")]
    AlreadyActive(String),
    #[error("event \"{0}\" is not active")]
    NotActive(String),
    #[error("event \"{stopped}\" was stopped while the nested event \"{innermost}\" is still active")]
    OutOfOrder { stopped: String, innermost: String },
    #[error("events still active when the log was finished: {0:?}")]
    Unfinished(Vec<String>),
}

/// Accumulated statistics of a single event.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct EventStats {
    pub calls: usize,
    pub total: Duration,
}

impl EventStats {
    pub fn average(&self) -> Duration {
        if self.calls == 0 {
            Duration::ZERO
        } else {
            self.total.div_f64(self.calls as f64)
        }
    }
}

#[derive(Debug)]
pub struct PerfLog {
    label: String,
    enabled: bool,
    created: Instant,
    events: BTreeMap<String, EventStats>,
    active: Vec<(String, Instant)>,
    active_time: Duration,
    active_since: Option<Instant>,
    finished: bool,
}

impl PerfLog {
    pub fn new(label: impl Into<String>) -> Self {
        Self::with_enabled(label.into(), true)
    }

    /// A log that records nothing. Starting and stopping events always succeeds.
    pub fn disabled() -> Self {
        Self::with_enabled(String::new(), false)
    }

    fn with_enabled(label: String, enabled: bool) -> Self {
        Self {
            label,
            enabled,
            created: Instant::now(),
            events: BTreeMap::new(),
            active: Vec::new(),
            active_time: Duration::ZERO,
            active_since: None,
            finished: false,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn start_event(&mut self, name: &str) -> Result<(), PerfLogError> {
        if !self.enabled {
            return Ok(());
        }
        if self.active.iter().any(|(active, _)| active == name) {
            return Err(PerfLogError::AlreadyActive(name.to_string()));
        }
        let now = Instant::now();
        if self.active.is_empty() {
            self.active_since = Some(now);
        }
        self.active.push((name.to_string(), now));
        Ok(())
    }

    pub fn stop_event(&mut self, name: &str) -> Result<(), PerfLogError> {
        if !self.enabled {
            return Ok(());
        }
        match self.active.last() {
            Some((innermost, _)) if innermost != name => {
                return if self.active.iter().any(|(active, _)| active == name) {
                    Err(PerfLogError::OutOfOrder {
                        stopped: name.to_string(),
                        innermost: innermost.clone(),
                    })
                } else {
                    Err(PerfLogError::NotActive(name.to_string()))
                };
            }
            None => return Err(PerfLogError::NotActive(name.to_string())),
            Some(_) => {}
        }

        let now = Instant::now();
        if let Some((name, started)) = self.active.pop() {
            let stats = self.events.entry(name).or_default();
            stats.calls += 1;
            stats.total += now - started;
        }
        if self.active.is_empty() {
            if let Some(since) = self.active_since.take() {
                self.active_time += now - since;
            }
        }
        Ok(())
    }

    /// Runs `f` inside the event `name`.
    ///
    /// The event is stopped even if it turns out that `f` failed, so `f` returning an error
    /// leaves the log balanced.
    pub fn measure<R>(&mut self, name: &str, f: impl FnOnce() -> R) -> Result<R, PerfLogError> {
        self.start_event(name)?;
        let result = f();
        self.stop_event(name)?;
        Ok(result)
    }

    /// Adds the completed events of `other` to this log.
    ///
    /// `other` is consumed without reporting its own summary.
    pub fn merge(&mut self, mut other: PerfLog) {
        other.finished = true;
        if !self.enabled {
            return;
        }
        for (name, stats) in &other.events {
            let entry = self.events.entry(name.clone()).or_default();
            entry.calls += stats.calls;
            entry.total += stats.total;
        }
        self.active_time += other.active_time;
    }

    pub fn is_balanced(&self) -> bool {
        self.active.is_empty()
    }

    pub fn event(&self, name: &str) -> Option<&EventStats> {
        self.events.get(name)
    }

    /// Number of completed calls of the given event.
    pub fn n_calls(&self, name: &str) -> usize {
        self.event(name).map(|stats| stats.calls).unwrap_or(0)
    }

    /// Wall time during which at least one event was active.
    pub fn active_time(&self) -> Duration {
        self.active_time
    }

    /// A snapshot of the completed events.
    pub fn report(&self) -> PerfReport {
        PerfReport {
            label: self.label.clone(),
            events: self
                .events
                .iter()
                .map(|(name, stats)| (name.clone(), *stats))
                .collect(),
            alive_time: self.created.elapsed(),
            active_time: self.active_time,
        }
    }

    /// Consumes the log and returns its report. Fails if any event is still active.
    pub fn finish(mut self) -> Result<PerfReport, PerfLogError> {
        self.finished = true;
        if !self.active.is_empty() {
            let active = self.active.iter().map(|(name, _)| name.clone()).collect();
            return Err(PerfLogError::Unfinished(active));
        }
        Ok(self.report())
    }
}

impl Drop for PerfLog {
    fn drop(&mut self) {
        if !self.enabled || self.finished || (self.events.is_empty() && self.active.is_empty()) {
            return;
        }
        if !self.active.is_empty() {
            let active: Vec<_> = self.active.iter().map(|(name, _)| name.as_str()).collect();
            warn!("Performance log \"{}\" dropped with active events {:?}", self.label, active);
        }
        info!("\n{}", self.report());
    }
}

/// Summary of a performance log.
#[derive(Debug, Clone, PartialEq)]
pub struct PerfReport {
    label: String,
    events: Vec<(String, EventStats)>,
    alive_time: Duration,
    active_time: Duration,
}

impl PerfReport {
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Events sorted by name.
    pub fn events(&self) -> &[(String, EventStats)] {
        &self.events
    }

    pub fn event(&self, name: &str) -> Option<&EventStats> {
        self.events
            .iter()
            .find(|(event, _)| event == name)
            .map(|(_, stats)| stats)
    }

    pub fn active_time(&self) -> Duration {
        self.active_time
    }

    /// Wall time since the log was created.
    pub fn alive_time(&self) -> Duration {
        self.alive_time
    }

    fn percent_of_active(&self, time: Duration) -> f64 {
        if self.active_time.is_zero() {
            0.0
        } else {
            100.0 * time.as_secs_f64() / self.active_time.as_secs_f64()
        }
    }
}

impl Display for PerfReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let rule = "-".repeat(78);
        writeln!(f, " {rule}")?;
        writeln!(
            f,
            "| {} Performance: Alive time={:.6}, Active time={:.6}",
            self.label,
            self.alive_time.as_secs_f64(),
            self.active_time.as_secs_f64()
        )?;
        writeln!(f, " {rule}")?;
        writeln!(
            f,
            "| {:<24} {:>8} {:>12} {:>12} {:>14} |",
            "Event", "nCalls", "Total Time", "Avg Time", "% of Active"
        )?;
        writeln!(f, "|{rule}|")?;

        let mut total_calls = 0;
        let mut total_time = Duration::ZERO;
        for (name, stats) in &self.events {
            total_calls += stats.calls;
            total_time += stats.total;
            writeln!(
                f,
                "| {:<24} {:>8} {:>12.6} {:>12.6} {:>14.2} |",
                name,
                stats.calls,
                stats.total.as_secs_f64(),
                stats.average().as_secs_f64(),
                self.percent_of_active(stats.total)
            )?;
        }

        writeln!(f, " {rule}")?;
        writeln!(
            f,
            "| {:<24} {:>8} {:>12.6} {:>12} {:>14.2} |",
            "Totals:",
            total_calls,
            total_time.as_secs_f64(),
            "",
            self.percent_of_active(total_time)
        )?;
        write!(f, " {rule}")
    }
}
