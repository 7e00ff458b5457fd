use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use log::{debug, error, trace, warn};
use rand::rngs::SmallRng;
use rand::{Rng, RngCore, SeedableRng};

use crate::{EventSink, GameContext, InputKey, Pid, SchedulerEvent, WorkerSettings};

/// A spawned worker thread together with its completion signal
struct Worker {
    role: &'static str,
    handle: JoinHandle<()>,
    /// Disconnects once the thread is done, even if it panicked
    done: Receiver<()>,
}

/// The two cooperating threads that simulate a game session
///
/// The producer feeds random inputs into the process input channel, the
/// consumer drains it and increments the score. Both observe the `running`
/// flag at every iteration, so `stop` is honoured at an iteration boundary.
pub struct WorkerPair {
    pid: Pid,
    name: String,
    context: Arc<GameContext>,
    /// Flag of the current start, every start gets a new one
    running: Arc<AtomicBool>,
    settings: WorkerSettings,
    /// Source of the per start producer seeds
    rng: SmallRng,
    workers: Vec<Worker>,
    events: EventSink,
}

impl WorkerPair {
    /// Creates a stopped pair
    ///
    /// * `pid` - process the pair belongs to
    /// * `name` - name of that process, used in logs
    /// * `context` - shared state of the process
    /// * `settings` - iteration bound and timeouts
    /// * `seed` - seed of the input generator
    /// * `events` - sink the produced and processed inputs are reported to
    pub fn new(
        pid: Pid,
        name: &str,
        context: Arc<GameContext>,
        settings: WorkerSettings,
        seed: u64,
        events: EventSink,
    ) -> WorkerPair {
        WorkerPair {
            pid,
            name: name.to_string(),
            context,
            running: Arc::new(AtomicBool::new(false)),
            settings,
            rng: SmallRng::seed_from_u64(seed),
            workers: Vec::new(),
            events,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Spawns the producer and the consumer
    pub fn start(&mut self) {
        if !self.workers.is_empty() {
            warn!("{} (PID {}): workers already started", self.name, self.pid);
            return;
        }

        /* detached workers of an earlier start keep their own, cleared flag */
        self.running = Arc::new(AtomicBool::new(true));

        let seed = self.rng.next_u64();
        let producer = self.spawn_producer(SmallRng::seed_from_u64(seed));
        let consumer = self.spawn_consumer();

        self.workers.push(producer);
        self.workers.push(consumer);

        debug!("{} (PID {}): workers started", self.name, self.pid);
    }

    /// Signals both workers to stop and waits for them
    ///
    /// The wait is bounded by `stop_timeout` in total; a worker that has not
    /// finished by then is detached. Calling `stop` on a stopped pair does
    /// nothing.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);

        if self.workers.is_empty() {
            return;
        }

        let deadline = Instant::now() + self.settings.stop_timeout;

        for worker in self.workers.drain(..) {
            let remaining = deadline.saturating_duration_since(Instant::now());

            match worker.done.recv_timeout(remaining) {
                Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                    if worker.handle.join().is_err() {
                        error!("{} (PID {}): {} panicked", self.name, self.pid, worker.role);
                    }
                }
                Err(RecvTimeoutError::Timeout) => {
                    warn!(
                        "{} (PID {}): {} did not stop within {:?}, detaching it",
                        self.name, self.pid, worker.role, self.settings.stop_timeout
                    );
                }
            }
        }

        debug!("{} (PID {}): workers stopped", self.name, self.pid);
    }

    fn spawn_producer(&self, mut rng: SmallRng) -> Worker {
        let (done_tx, done) = mpsc::channel();
        let running = self.running.clone();
        let context = self.context.clone();
        let events = self.events.clone();
        let settings = self.settings;
        let pid = self.pid;
        let name = self.name.clone();

        let handle = thread::spawn(move || {
            for _ in 0..settings.iterations {
                if !running.load(Ordering::SeqCst) || context.is_terminated() {
                    break;
                }

                let key = InputKey::ALL[rng.gen_range(0..InputKey::ALL.len())];

                if context.push_input(key) {
                    trace!("{} Producer: Added '{}'", name, key);
                    events.emit(SchedulerEvent::InputProduced { pid, key });
                } else {
                    warn!("{} Producer: input queue full, dropped '{}'", name, key);
                }

                thread::sleep(settings.emit_delay);
            }

            let _ = done_tx.send(());
        });

        Worker { role: "producer", handle, done }
    }

    fn spawn_consumer(&self) -> Worker {
        let (done_tx, done) = mpsc::channel();
        let running = self.running.clone();
        let context = self.context.clone();
        let events = self.events.clone();
        let settings = self.settings;
        let pid = self.pid;
        let name = self.name.clone();

        let handle = thread::spawn(move || {
            for _ in 0..settings.iterations {
                if !running.load(Ordering::SeqCst) || context.is_terminated() {
                    break;
                }

                if let Some(key) = context.pop_input(settings.poll_timeout) {
                    let score = context.increment_score();
                    debug!("{} Consumer: Processed '{}', Score: {}", name, key, score);
                    events.emit(SchedulerEvent::InputProcessed { pid, key, score });
                }
            }

            let _ = done_tx.send(());
        });

        Worker { role: "consumer", handle, done }
    }
}

impl Drop for WorkerPair {
    fn drop(&mut self) {
        self.stop();
    }
}
