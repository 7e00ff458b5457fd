use std::collections::{BTreeMap, HashMap};
use std::num::NonZeroUsize;
use std::thread;

use log::{debug, info, warn};
use rand::rngs::SmallRng;
use rand::{RngCore, SeedableRng};

use crate::storage::{record_key, GameStore};
use crate::{Collector, EventSink, GameProcess, MemoryManager, MemoryUsage, Pid, Process, ProcessControlBlock};
use crate::{Runtime, Scheduler, SchedulerConfig, SchedulerError, SchedulerEvent, StoreError};
use crate::{Translation, TranslationError, WorkerPair};

/// Scheduler that always dispatches the ready process with the smallest
/// total runtime, ties going to the lowest pid
pub struct ConsoleScheduler<S: GameStore> {
    /// Ready processes, in admission / requeue order
    ready: Vec<GameProcess>,
    /// Worker pair of every resident process
    workers: HashMap<Pid, WorkerPair>,
    memory: MemoryManager,
    store: S,
    config: SchedulerConfig,
    /// The pid of the next process that will be admitted
    next_pid: Pid,
    /// Seeds the worker pairs
    rng: SmallRng,
    events: EventSink,
}

impl<S: GameStore> ConsoleScheduler<S> {
    pub fn new(config: SchedulerConfig, store: S) -> ConsoleScheduler<S> {
        ConsoleScheduler::with_events(config, store, EventSink::disabled())
    }

    /// Creates a scheduler that reports its transitions to `events`
    pub fn with_events(config: SchedulerConfig, store: S, events: EventSink) -> ConsoleScheduler<S> {
        let rng = match config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };

        ConsoleScheduler {
            ready: Vec::new(),
            workers: HashMap::new(),
            memory: MemoryManager::new(config.total_pages, config.page_size),
            store,
            config,
            next_pid: Pid::new(1),
            rng,
            events,
        }
    }

    pub fn memory(&self) -> &MemoryManager {
        &self.memory
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn process(&self, pid: Pid) -> Option<&GameProcess> {
        self.ready.iter().find(|item| item.get_pid() == pid)
    }

    pub fn has_workers(&self, pid: Pid) -> bool {
        self.workers.contains_key(&pid)
    }

    pub fn queue_snapshot(&self) -> Vec<String> {
        crate::queue_snapshot(self)
    }

    pub fn memory_usage(&self) -> MemoryUsage {
        self.collect_memory()
    }

    pub fn high_scores(&self) -> BTreeMap<String, u64> {
        self.store.load_high_scores()
    }

    pub fn translate(&self, pid: Pid, virtual_address: usize) -> Result<Translation, TranslationError> {
        self.memory.translate(pid, virtual_address)
    }

    fn inc_pid(&mut self) {
        self.next_pid = self.next_pid + 1;
    }

    fn spawn_process(&mut self, name: &str, burst_time: isize, pages_needed: usize) -> GameProcess {
        let new_proc = GameProcess::new(
            self.next_pid,
            name,
            burst_time,
            pages_needed,
            self.config.input_queue_capacity,
        );
        self.inc_pid();

        new_proc
    }

    fn enqueue_process(&mut self, mut proc: GameProcess) {
        proc.set_ready();

        self.ready.push(proc);
    }

    fn get_next_process(&mut self) -> Option<GameProcess> {
        let mut position: Option<usize> = None;
        let mut min_runtime = Runtime::new(usize::MAX);
        let mut min_pid = Pid::new(usize::MAX);

        for (index, item) in self.ready.iter().enumerate() {
            let runtime = item.get_runtime();

            if runtime < min_runtime || (runtime == min_runtime && item.get_pid() < min_pid) {
                position = Some(index);
                min_runtime = runtime;
                min_pid = item.get_pid();
            }
        }

        position.map(|index| self.ready.remove(index))
    }

    fn report_store_failure(&self, key: &str, err: StoreError) {
        warn!("Persisting {} failed: {}", key, err);
        self.events.emit(SchedulerEvent::PersistFailed {
            key: key.to_string(),
            reason: err.to_string(),
        });
    }

    /// Releases a process taken out of the ready queue
    ///
    /// Stops its workers, deletes its record and frees its pages.
    fn release_process(&mut self, mut proc: GameProcess) -> Pid {
        let pid = proc.get_pid();

        if let Some(mut workers) = self.workers.remove(&pid) {
            workers.stop();
        }

        let key = record_key(proc.name());
        if let Err(err) = self.store.delete_record(&key) {
            self.report_store_failure(&key, err);
        }

        let pages = proc.unload_pages();
        self.memory.deallocate(pid, &pages);
        proc.terminate();

        info!("Removed {} (PID {})", proc.name(), pid);
        self.events.emit(SchedulerEvent::Removed {
            pid,
            name: proc.name().to_string(),
        });

        pid
    }

    fn terminate_process(&mut self, mut proc: GameProcess) {
        let pid = proc.get_pid();
        let score = proc.score();

        proc.terminate();
        info!("{} terminated", proc.name());

        match self.store.save_high_score_if_better(proc.name(), score) {
            Ok(true) => info!("New high score for {}: {}", proc.name(), score),
            Ok(false) => (),
            Err(err) => self.report_store_failure(proc.name(), err),
        }

        let pages = proc.unload_pages();
        self.memory.deallocate(pid, &pages);

        self.workers.remove(&pid);

        let key = record_key(proc.name());
        if let Err(err) = self.store.delete_record(&key) {
            self.report_store_failure(&key, err);
        }

        self.events.emit(SchedulerEvent::Terminated {
            pid,
            name: proc.name().to_string(),
            score,
        });
    }
}

impl<S: GameStore> Collector for ConsoleScheduler<S> {
    fn collect_ready(&self) -> Vec<&dyn Process> {
        let mut procs: Vec<&dyn Process> = Vec::new();

        for item in self.ready.iter() {
            procs.push(item);
        }

        procs
    }

    fn collect_memory(&self) -> MemoryUsage {
        self.memory.usage()
    }
}

impl<S: GameStore> Scheduler for ConsoleScheduler<S> {
    fn admit(&mut self, name: &str, burst_time: NonZeroUsize, pages_needed: usize) -> Result<Pid, SchedulerError> {
        let burst_time = match isize::try_from(burst_time.get()) {
            Ok(burst_time) => burst_time,
            Err(_) => {
                let err = SchedulerError::BurstTimeOutOfRange(burst_time.get());
                warn!("Failed to add {}: {}", name, err);
                self.events.emit(SchedulerEvent::AdmissionFailed {
                    name: name.to_string(),
                    reason: err.to_string(),
                });

                return Err(err);
            }
        };

        let mut proc = self.spawn_process(name, burst_time, pages_needed);
        let pid = proc.get_pid();

        match self.memory.allocate(pid, proc.get_pages_needed()) {
            Ok(pages) => proc.load_pages(pages),
            Err(err) => {
                warn!("Failed to add {} due to insufficient memory", name);
                self.events.emit(SchedulerEvent::AdmissionFailed {
                    name: name.to_string(),
                    reason: err.to_string(),
                });

                return Err(err.into());
            }
        }

        let workers = WorkerPair::new(
            pid,
            name,
            proc.get_context(),
            self.config.worker_settings(),
            self.rng.next_u64(),
            self.events.clone(),
        );
        self.workers.insert(pid, workers);

        let key = record_key(name);
        if let Err(err) = self.store.create_record(&key, &format!("Initial score: {}", proc.score())) {
            self.report_store_failure(&key, err);
        }

        info!("Added {} (PID {}) to ready queue", name, pid);
        self.events.emit(SchedulerEvent::Admitted {
            pid,
            name: name.to_string(),
            pages: proc.pages().to_vec(),
        });

        self.enqueue_process(proc);

        Ok(pid)
    }

    fn remove_by_name(&mut self, name: &str) -> Result<Pid, SchedulerError> {
        let position = self.ready.iter().position(|item| item.name() == name);

        return if let Some(index) = position {
            let proc = self.ready.remove(index);
            Ok(self.release_process(proc))
        } else {
            debug!("No process named {} to remove", name);
            Err(SchedulerError::RemovalNotFound(name.to_string()))
        };
    }

    fn remove_last(&mut self) -> Option<Pid> {
        let position = self
            .ready
            .iter()
            .enumerate()
            .max_by_key(|(_, item)| item.get_pid())
            .map(|(index, _)| index)?;

        let proc = self.ready.remove(position);
        Some(self.release_process(proc))
    }

    fn clear(&mut self) -> usize {
        let procs: Vec<GameProcess> = self.ready.drain(..).collect();
        let count = procs.len();

        for proc in procs {
            self.release_process(proc);
        }

        count
    }

    fn run_quantum(&mut self) -> Option<Pid> {
        let mut proc = self.get_next_process()?;
        let pid = proc.get_pid();

        proc.set_running();
        info!(
            "Running: {} (PID: {}, State: {}, Score: {})",
            proc.name(),
            pid,
            proc.state(),
            proc.score()
        );
        self.events.emit(SchedulerEvent::Started {
            pid,
            name: proc.name().to_string(),
        });

        let message = match self.memory.translate(pid, self.config.probe_address) {
            Ok(translation) => translation.to_string(),
            Err(err) => err.to_string(),
        };
        debug!("Address Translation: {}", message);
        self.events.emit(SchedulerEvent::Translated { pid, message });

        if let Some(workers) = self.workers.get_mut(&pid) {
            workers.start();
        }

        thread::sleep(self.config.quantum_duration());

        if let Some(workers) = self.workers.get_mut(&pid) {
            workers.stop();
        }
        self.events.emit(SchedulerEvent::Stopped {
            pid,
            name: proc.name().to_string(),
        });

        let remaining = proc.execute(self.config.quantum.get() as usize);

        /* workers are joined, the score is stable from here on */
        let key = record_key(proc.name());
        if let Err(err) = self.store.write_record(&key, &format!("Score: {}", proc.score())) {
            self.report_store_failure(&key, err);
        }

        if remaining > 0 {
            info!("{} moved back to ready queue", proc.name());
            self.events.emit(SchedulerEvent::Requeued {
                pid,
                name: proc.name().to_string(),
                burst_time: remaining,
            });

            self.enqueue_process(proc);
        } else {
            self.terminate_process(proc);
        }

        Some(pid)
    }

    fn list(&self) -> Vec<&dyn Process> {
        self.collect_ready()
    }
}
