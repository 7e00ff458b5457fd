use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, SyncSender, TrySendError};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use crate::{InputKey, Pid, Process, ProcessState, Runtime};

/// State of a process shared with its worker pair
///
/// The score is only ever changed under its own lock, the input channel is
/// bounded so a stalled consumer cannot make the producer block forever.
pub struct GameContext {
    score: Mutex<u64>,
    inputs: SyncSender<InputKey>,
    pending: Mutex<Receiver<InputKey>>,
    terminated: AtomicBool,
}

impl GameContext {
    /// Creates an empty context
    ///
    /// * `capacity` - bound of the input channel
    pub fn new(capacity: usize) -> GameContext {
        let (inputs, pending) = mpsc::sync_channel(capacity);

        GameContext {
            score: Mutex::new(0),
            inputs,
            pending: Mutex::new(pending),
            terminated: AtomicBool::new(false),
        }
    }

    /// Queues `key` without blocking, returns false if the channel is full
    pub fn push_input(&self, key: InputKey) -> bool {
        match self.inputs.try_send(key) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => false,
            /* the receiver lives as long as `self` */
            Err(TrySendError::Disconnected(_)) => false,
        }
    }

    /// Waits at most `timeout` for the next queued input
    pub fn pop_input(&self, timeout: Duration) -> Option<InputKey> {
        let pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);

        match pending.recv_timeout(timeout) {
            Ok(key) => Some(key),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Adds one point and returns the new score
    pub fn increment_score(&self) -> u64 {
        let mut score = self.score.lock().unwrap_or_else(PoisonError::into_inner);
        *score = match score.checked_add(1) {
            Some(next) => next,
            None => panic!("Fatal error: score overflow"),
        };
        *score
    }

    /// Context of a session resumed at `score`
    #[cfg(test)]
    pub(crate) fn with_score(capacity: usize, score: u64) -> GameContext {
        let context = GameContext::new(capacity);
        *context.score.lock().unwrap_or_else(PoisonError::into_inner) = score;
        context
    }

    pub fn score(&self) -> u64 {
        *self.score.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_terminated(&self) -> bool {
        self.terminated.load(Ordering::SeqCst)
    }

    pub fn mark_terminated(&self) {
        self.terminated.store(true, Ordering::SeqCst);
    }
}

pub trait ProcessControlBlock {
    fn get_pid(&self) -> Pid;

    fn set_state(&mut self, state: ProcessState);
    fn set_running(&mut self);
    fn set_ready(&mut self);
    fn terminate(&mut self);

    fn get_runtime(&self) -> Runtime;

    /// Accounts `time` units of execution, returns the remaining burst time
    fn execute(&mut self, time: usize) -> isize;

    fn get_pages_needed(&self) -> usize;
    fn load_pages(&mut self, pages: Vec<usize>);
    fn unload_pages(&mut self) -> Vec<usize>;

    fn get_context(&self) -> Arc<GameContext>;
}

/// The process control block of a game session
pub struct GameProcess {
    pid: Pid,
    name: String,
    state: ProcessState,
    /// Remaining simulated work, may drop below zero on the last quantum
    burst_time: isize,
    total_runtime: Runtime,
    /// Fixed at admission
    pages_needed: usize,
    pages: Vec<usize>,
    context: Arc<GameContext>,
}

impl GameProcess {
    /// Creates a new, not yet resident, Process Control Block
    ///
    /// * `pid` - pid of the new process
    /// * `name` - display name of the game
    /// * `burst_time` - simulated work needed before termination, positive
    /// * `pages_needed` - number of pages requested at admission
    /// * `queue_capacity` - bound of the input channel
    pub fn new(
        pid: Pid,
        name: &str,
        burst_time: isize,
        pages_needed: usize,
        queue_capacity: usize,
    ) -> GameProcess {
        debug_assert!(burst_time > 0);

        GameProcess {
            pid,
            name: name.to_string(),
            state: ProcessState::Ready,
            burst_time,
            total_runtime: Runtime::new(0),
            pages_needed,
            pages: Vec::new(),
            context: Arc::new(GameContext::new(queue_capacity)),
        }
    }
}

impl Process for GameProcess {
    fn pid(&self) -> Pid {
        self.pid
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn state(&self) -> ProcessState {
        self.state
    }

    fn timings(&self) -> (isize, Runtime) {
        (self.burst_time, self.total_runtime)
    }

    fn score(&self) -> u64 {
        self.context.score()
    }

    fn pages(&self) -> &[usize] {
        &self.pages
    }
}

impl ProcessControlBlock for GameProcess {
    fn get_pid(&self) -> Pid {
        self.pid
    }

    fn set_state(&mut self, state: ProcessState) {
        self.state = state;
    }

    fn set_running(&mut self) {
        self.set_state(ProcessState::Running);
    }

    fn set_ready(&mut self) {
        self.set_state(ProcessState::Ready);
    }

    fn terminate(&mut self) {
        self.context.mark_terminated();
        self.set_state(ProcessState::Terminated);
    }

    fn get_runtime(&self) -> Runtime {
        self.total_runtime
    }

    fn execute(&mut self, time: usize) -> isize {
        self.burst_time = self
            .burst_time
            .saturating_sub(isize::try_from(time).unwrap_or(isize::MAX));
        self.total_runtime = self.total_runtime + time;

        self.burst_time
    }

    fn get_pages_needed(&self) -> usize {
        self.pages_needed
    }

    fn load_pages(&mut self, pages: Vec<usize>) {
        debug_assert_eq!(pages.len(), self.pages_needed);
        self.pages = pages;
    }

    fn unload_pages(&mut self) -> Vec<usize> {
        std::mem::take(&mut self.pages)
    }

    fn get_context(&self) -> Arc<GameContext> {
        self.context.clone()
    }
}
