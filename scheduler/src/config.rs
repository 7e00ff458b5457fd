use std::num::{NonZeroU32, NonZeroUsize};
use std::time::Duration;

use crate::common_types::{INPUT_QUEUE_CAPACITY, PROBE_ADDRESS};

/// Parameters of a `ConsoleScheduler`
#[derive(Clone, Debug)]
pub struct SchedulerConfig {
    /// Time units a process runs before it is preempted
    pub quantum: NonZeroU32,
    /// Wall clock length of one time unit
    pub time_unit: Duration,
    pub total_pages: usize,
    pub page_size: NonZeroUsize,
    /// Number of iterations of each worker per quantum
    pub worker_iterations: usize,
    pub input_queue_capacity: usize,
    /// Address translated every time a process is dispatched
    pub probe_address: usize,
    /// Seed of the input generator, `None` seeds from the OS
    pub seed: Option<u64>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        SchedulerConfig {
            quantum: NonZeroU32::new(2).unwrap(),
            time_unit: Duration::from_secs(1),
            total_pages: 16,
            page_size: NonZeroUsize::new(1024).unwrap(),
            worker_iterations: 2,
            input_queue_capacity: INPUT_QUEUE_CAPACITY,
            probe_address: PROBE_ADDRESS,
            seed: None,
        }
    }
}

impl SchedulerConfig {
    /// How long the scheduler holds a dispatched process
    pub fn quantum_duration(&self) -> Duration {
        self.time_unit.saturating_mul(self.quantum.get())
    }

    pub fn worker_settings(&self) -> WorkerSettings {
        WorkerSettings::from_time_unit(self.worker_iterations, self.time_unit)
    }
}

/// Timings of a `WorkerPair`
#[derive(Clone, Copy, Debug)]
pub struct WorkerSettings {
    pub iterations: usize,
    /// Pause of the producer after every emitted input
    pub emit_delay: Duration,
    /// Bounded wait of the consumer for the next input
    pub poll_timeout: Duration,
    /// Bounded wait of `stop` for both workers to finish
    ///
    /// Must be larger than `emit_delay` and `poll_timeout`, otherwise a worker
    /// can still be inside a wait when `stop` returns.
    pub stop_timeout: Duration,
}

impl WorkerSettings {
    pub fn from_time_unit(iterations: usize, time_unit: Duration) -> WorkerSettings {
        WorkerSettings {
            iterations,
            emit_delay: time_unit / 2,
            poll_timeout: time_unit / 2,
            stop_timeout: time_unit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantum_duration() {
        let config = SchedulerConfig::default();
        assert_eq!(config.quantum_duration(), Duration::from_secs(2));

        let config = SchedulerConfig {
            quantum: NonZeroU32::new(u32::MAX).unwrap(),
            ..SchedulerConfig::default()
        };
        assert_eq!(config.quantum_duration(), Duration::from_secs(u32::MAX as u64));

        let config = SchedulerConfig {
            quantum: NonZeroU32::new(3).unwrap(),
            time_unit: Duration::MAX,
            ..SchedulerConfig::default()
        };
        assert_eq!(config.quantum_duration(), Duration::MAX);
    }

    #[test]
    fn test_stop_timeout_covers_worker_waits() {
        let settings = SchedulerConfig::default().worker_settings();

        assert_eq!(settings.iterations, 2);
        assert!(settings.stop_timeout > settings.emit_delay);
        assert!(settings.stop_timeout > settings.poll_timeout);
    }
}
