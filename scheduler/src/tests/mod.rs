use std::num::NonZeroUsize;
use std::time::Duration;

use crate::{ConsoleScheduler, MemoryGameStore, SchedulerConfig};

mod storage;

pub(crate) const SEED: u64 = 5446535461589659585;

pub(crate) fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub(crate) fn burst(time: usize) -> NonZeroUsize {
    NonZeroUsize::new(time).unwrap()
}

/// Default pool and quantum, with a time unit short enough for tests
pub(crate) fn test_config() -> SchedulerConfig {
    SchedulerConfig {
        time_unit: Duration::from_millis(20),
        seed: Some(SEED),
        ..SchedulerConfig::default()
    }
}

pub(crate) fn get_test_scheduler() -> ConsoleScheduler<MemoryGameStore> {
    init_logger();
    ConsoleScheduler::new(test_config(), MemoryGameStore::new())
}
