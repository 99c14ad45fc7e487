use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Mutex, OnceLock};
use std::time::{Duration, Instant};

use crate::TimerError;

/// Accumulating wall-clock timer.
///
/// Each `tic`/`toc` pair records one sample; the timer keeps the count, sum,
/// minimum and maximum of the samples.
#[derive(Debug, Clone, Default)]
pub struct Timer {
    name: String,
    started: Option<Instant>,
    count: usize,
    total: Duration,
    min: Option<Duration>,
    max: Duration,
}

impl Timer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Start a sample. Calling `tic` twice restarts the running sample.
    pub fn tic(&mut self) {
        self.started = Some(Instant::now());
    }

    /// Stop the running sample and return its duration.
    pub fn toc(&mut self) -> Result<Duration, TimerError> {
        let started = self
            .started
            .take()
            .ok_or_else(|| TimerError::NotStarted(self.name.clone()))?;
        let elapsed = started.elapsed();
        self.record(elapsed);
        Ok(elapsed)
    }

    fn record(&mut self, elapsed: Duration) {
        self.count += 1;
        self.total += elapsed;
        self.min = Some(self.min.map_or(elapsed, |m| m.min(elapsed)));
        self.max = self.max.max(elapsed);
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn total(&self) -> Duration {
        self.total
    }

    pub fn mean(&self) -> Duration {
        if self.count == 0 {
            return Duration::ZERO;
        }
        self.total.div_f64(self.count as f64)
    }

    pub fn min(&self) -> Duration {
        self.min.unwrap_or_default()
    }

    pub fn max(&self) -> Duration {
        self.max
    }
}

impl fmt::Display for Timer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: count = {}, total = {:.6}s, mean = {:.6}s, min = {:.6}s, max = {:.6}s",
            self.name,
            self.count,
            self.total.as_secs_f64(),
            self.mean().as_secs_f64(),
            self.min().as_secs_f64(),
            self.max.as_secs_f64(),
        )
    }
}

fn registry() -> std::sync::MutexGuard<'static, BTreeMap<String, Timer>> {
    static TIMERS: OnceLock<Mutex<BTreeMap<String, Timer>>> = OnceLock::new();
    TIMERS
        .get_or_init(|| Mutex::new(BTreeMap::new()))
        .lock()
        // timers hold plain counters, a poisoned lock leaves them usable
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Start the process-wide timer `name`, creating it on first use.
pub fn global_tic(name: &str) {
    registry()
        .entry(name.to_string())
        .or_insert_with(|| Timer::new(name))
        .tic();
}

/// Stop the process-wide timer `name`.
pub fn global_toc(name: &str) -> Result<Duration, TimerError> {
    registry()
        .get_mut(name)
        .ok_or_else(|| TimerError::NotStarted(name.to_string()))?
        .toc()
}

/// Snapshot of the process-wide timer `name`.
pub fn global_timer(name: &str) -> Option<Timer> {
    registry().get(name).cloned()
}

/// One line per process-wide timer, sorted by name.
pub fn timing_report() -> String {
    let timers = registry();
    let mut report = String::from("Timing report:\n");
    for timer in timers.values() {
        report.push_str(&format!("  {timer}\n"));
    }
    report
}

pub fn reset_timers() {
    registry().clear();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timer_accumulates() -> Result<(), TimerError> {
        let mut timer = Timer::new("solve");
        assert_eq!(timer.count(), 0);
        assert_eq!(timer.mean(), Duration::ZERO);
        assert_eq!(timer.min(), Duration::ZERO);

        for _ in 0..3 {
            timer.tic();
            std::thread::sleep(Duration::from_millis(1));
            timer.toc()?;
        }

        assert_eq!(timer.count(), 3);
        assert!(timer.total() >= Duration::from_millis(3));
        assert!(timer.min() <= timer.mean());
        assert!(timer.mean() <= timer.max());
        Ok(())
    }

    #[test]
    fn test_mean_beyond_u32_count() {
        let mut timer = Timer::new("busy");
        timer.count = u32::MAX as usize + 1;
        timer.total = Duration::from_secs(1 << 32);
        assert_eq!(timer.mean(), Duration::from_secs(1));
    }

    #[test]
    fn test_toc_without_tic() {
        let mut timer = Timer::new("lonely");
        assert_eq!(
            timer.toc(),
            Err(TimerError::NotStarted("lonely".to_string()))
        );
    }

    #[test]
    fn test_global_registry() -> Result<(), TimerError> {
        // names are unique to this test, other tests may share the registry
        global_tic("test_global_registry_b");
        global_toc("test_global_registry_b")?;
        global_tic("test_global_registry_a");
        global_toc("test_global_registry_a")?;
        global_tic("test_global_registry_a");
        global_toc("test_global_registry_a")?;

        let a = global_timer("test_global_registry_a").map(|t| t.count());
        assert_eq!(a, Some(2));

        let report = timing_report();
        let pos_a = report.find("test_global_registry_a");
        let pos_b = report.find("test_global_registry_b");
        assert!(pos_a.is_some() && pos_b.is_some());
        assert!(pos_a < pos_b);

        assert!(global_toc("test_global_registry_missing").is_err());
        Ok(())
    }
}
