use std::fmt;
use std::num::NonZeroUsize;

use crate::{Pid, Runtime, SchedulerError};

/// The state of a process
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProcessState {
    Ready,
    Running,
    Terminated,
}

impl fmt::Display for ProcessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self {
            ProcessState::Ready => "ready",
            ProcessState::Running => "running",
            ProcessState::Terminated => "terminated",
        };

        write!(f, "{}", state)
    }
}

/// Read only view of a process, as exposed to the presentation layer
pub trait Process {
    fn pid(&self) -> Pid;

    /// Display name, not required to be unique
    fn name(&self) -> &str;

    fn state(&self) -> ProcessState;

    /// Returns the remaining burst time and the total runtime
    fn timings(&self) -> (isize, Runtime);

    fn score(&self) -> u64;

    /// Pages currently held, empty when not resident
    fn pages(&self) -> &[usize];
}

/// A scheduler of game sessions
pub trait Scheduler {
    /// Admits a new process and places it in the ready queue
    ///
    /// * `name` - display name of the game
    /// * `burst_time` - simulated work needed before the process terminates
    /// * `pages_needed` - number of memory pages the process requires
    fn admit(&mut self, name: &str, burst_time: NonZeroUsize, pages_needed: usize) -> Result<Pid, SchedulerError>;

    /// Releases the first process in the ready queue named `name`
    fn remove_by_name(&mut self, name: &str) -> Result<Pid, SchedulerError>;

    /// Releases the process with the highest pid
    fn remove_last(&mut self) -> Option<Pid>;

    /// Releases every process and returns how many were released
    fn clear(&mut self) -> usize;

    /// Runs the process selected by the scheduling policy for one quantum
    ///
    /// Returns `None` if the ready queue is empty.
    fn run_quantum(&mut self) -> Option<Pid>;

    /// Runs quanta until the ready queue is drained
    ///
    /// Returns the number of quanta that were executed.
    fn run_cycle(&mut self) -> usize {
        let mut quanta = 0;

        while self.run_quantum().is_some() {
            quanta += 1;
        }

        quanta
    }

    /// Returns every process known to the scheduler
    fn list(&self) -> Vec<&dyn Process>;
}
