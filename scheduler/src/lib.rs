//! A game console scheduler library.
//!
//! This library simulates an operating system scheduler layered over a paged
//! memory manager. Every process is a game session driven by a pair of worker
//! threads: a producer of simulated inputs and a consumer that turns them
//! into score.
//!

use std::num::NonZeroUsize;

mod common_types;
pub use crate::common_types::{InputKey, Pid, Runtime};
pub use crate::common_types::{DEFAULT_PAGES_NEEDED, INPUT_QUEUE_CAPACITY, PROBE_ADDRESS};

mod error;
pub use crate::error::{MemoryError, SchedulerError, StoreError, TranslationError};

mod config;
pub use crate::config::{SchedulerConfig, WorkerSettings};

mod events;
pub use crate::events::{EventSink, SchedulerEvent};

mod scheduler;
pub use crate::scheduler::{Process, ProcessState, Scheduler};

mod memory_manager;
pub use crate::memory_manager::{MemoryManager, MemoryUsage, Translation};

mod process_control_block;
pub use crate::process_control_block::{GameContext, GameProcess, ProcessControlBlock};

mod worker_pair;
pub use crate::worker_pair::WorkerPair;

mod collector;
pub use crate::collector::{format_queue, queue_snapshot, Collector};

pub mod storage;
pub use crate::storage::{FileGameStore, GameStore, MemoryGameStore};

mod schedulers;
pub use schedulers::ConsoleScheduler;

#[cfg(test)]
mod tests;

/// Returns a scheduler with the default configuration backed by `store`
///
/// * `store` - where per-process records and high scores are kept
/// * `time_unit_ms` - wall clock length of one simulated time unit, in
///                    milliseconds
pub fn game_console<S: GameStore>(store: S, time_unit_ms: NonZeroUsize) -> ConsoleScheduler<S> {
    let config = SchedulerConfig {
        time_unit: std::time::Duration::from_millis(time_unit_ms.get() as u64),
        ..SchedulerConfig::default()
    };

    ConsoleScheduler::new(config, store)
}
