use std::fmt;
use std::ops::Add;

/// Page requirement used when the caller does not ask for a specific one
pub const DEFAULT_PAGES_NEEDED: usize = 4;

/// Virtual address translated every time a process is dispatched
pub const PROBE_ADDRESS: usize = 1500;

/// Bound of the per-process input channel
pub const INPUT_QUEUE_CAPACITY: usize = 16;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Pid(usize);

impl Pid {
    /// Creates a new Pid object
    ///
    /// * `pid` - the process identifier as usize
    pub fn new(pid: usize) -> Pid {
        Pid(pid)
    }

    pub fn get(&self) -> usize {
        self.0
    }
}

impl Add<usize> for Pid {
    type Output = Pid;

    fn add(self, rhs: usize) -> Self::Output {
        Pid::new(self.0 + rhs)
    }
}

impl fmt::Display for Pid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Total time units a process spent in `running` state
///
/// Used as the selection key of the scheduler: the process with the
/// smallest runtime is the most starved one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Runtime(usize);

impl Runtime {
    pub fn new(runtime: usize) -> Runtime {
        Runtime(runtime)
    }

    pub fn get(&self) -> usize {
        self.0
    }
}

impl Add<usize> for Runtime {
    type Output = Runtime;

    fn add(self, rhs: usize) -> Self::Output {
        Runtime::new(self.0 + rhs)
    }
}

/// A simulated input event produced for a game session
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InputKey {
    Up,
    Down,
    Left,
    Right,
}

impl InputKey {
    /// The fixed symbol set the producer picks from
    pub const ALL: [InputKey; 4] = [InputKey::Up, InputKey::Down, InputKey::Left, InputKey::Right];
}

impl fmt::Display for InputKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InputKey::Up => "up",
            InputKey::Down => "down",
            InputKey::Left => "left",
            InputKey::Right => "right",
        };

        write!(f, "{}", name)
    }
}
