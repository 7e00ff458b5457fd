use std::sync::mpsc::Sender;

use crate::{InputKey, Pid};

/// Transitions reported to the presentation layer
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SchedulerEvent {
    Admitted { pid: Pid, name: String, pages: Vec<usize> },
    AdmissionFailed { name: String, reason: String },
    Started { pid: Pid, name: String },
    Translated { pid: Pid, message: String },
    InputProduced { pid: Pid, key: InputKey },
    InputProcessed { pid: Pid, key: InputKey, score: u64 },
    Stopped { pid: Pid, name: String },
    Requeued { pid: Pid, name: String, burst_time: isize },
    Terminated { pid: Pid, name: String, score: u64 },
    Removed { pid: Pid, name: String },
    PersistFailed { key: String, reason: String },
}

/// Fire and forget sender of `SchedulerEvent`s
///
/// A sink without a receiver, or whose receiver has been dropped, silently
/// discards everything.
#[derive(Clone, Default)]
pub struct EventSink {
    sender: Option<Sender<SchedulerEvent>>,
}

impl EventSink {
    pub fn new(sender: Sender<SchedulerEvent>) -> EventSink {
        EventSink { sender: Some(sender) }
    }

    pub fn disabled() -> EventSink {
        EventSink { sender: None }
    }

    pub fn emit(&self, event: SchedulerEvent) {
        if let Some(sender) = &self.sender {
            let _ = sender.send(event);
        }
    }
}
