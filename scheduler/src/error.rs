use std::{error, fmt, io};

use crate::Pid;

/// Failure of a page allocation request
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MemoryError {
    /// The request asked for more pages than are currently free
    InsufficientMemory { requested: usize, available: usize },
}

impl fmt::Display for MemoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemoryError::InsufficientMemory { requested, available } => write!(
                f,
                "not enough memory: {} pages requested, {} free",
                requested, available
            ),
        }
    }
}

impl error::Error for MemoryError {}

/// Failure of a virtual to physical address translation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TranslationError {
    /// The process holds no pages
    NoPageTable(Pid),
    /// The page index is past the end of the page table
    InvalidPage { page_index: usize, page_count: usize },
}

impl fmt::Display for TranslationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TranslationError::NoPageTable(pid) => write!(f, "no page table for PID {}", pid),
            TranslationError::InvalidPage { page_index, page_count } => write!(
                f,
                "invalid page number {} (process owns {} pages)",
                page_index, page_count
            ),
        }
    }
}

impl error::Error for TranslationError {}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SchedulerError {
    /// Admission did not proceed, nothing was enqueued
    Admission(MemoryError),
    /// The burst time does not fit the remaining work counter
    BurstTimeOutOfRange(usize),
    /// No resident process carries the given name
    RemovalNotFound(String),
}

impl From<MemoryError> for SchedulerError {
    fn from(err: MemoryError) -> Self {
        SchedulerError::Admission(err)
    }
}

impl fmt::Display for SchedulerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchedulerError::Admission(err) => write!(f, "admission failed: {}", err),
            SchedulerError::BurstTimeOutOfRange(burst) => write!(f, "burst time {} is out of range", burst),
            SchedulerError::RemovalNotFound(name) => write!(f, "no process named {}", name),
        }
    }
}

impl error::Error for SchedulerError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            SchedulerError::Admission(err) => Some(err),
            SchedulerError::BurstTimeOutOfRange(_) | SchedulerError::RemovalNotFound(_) => None,
        }
    }
}

/// Failure reported by a `GameStore`
#[derive(Debug)]
pub enum StoreError {
    RecordNotFound(String),
    Io(io::Error),
}

impl From<io::Error> for StoreError {
    fn from(err: io::Error) -> Self {
        StoreError::Io(err)
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::RecordNotFound(key) => write!(f, "record {} does not exist", key),
            StoreError::Io(err) => write!(f, "storage i/o error: {}", err),
        }
    }
}

impl error::Error for StoreError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            StoreError::RecordNotFound(_) => None,
            StoreError::Io(err) => Some(err),
        }
    }
}
