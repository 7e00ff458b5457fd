use crate::scheduler::Process;
use crate::MemoryUsage;

pub trait Collector {
    // Returns the ready processes, in ready queue order
    fn collect_ready(&self) -> Vec<&dyn Process>;

    // Returns the occupancy of the memory pool
    fn collect_memory(&self) -> MemoryUsage;
}

/// Returns the names of the ready processes, in ready queue order
pub fn queue_snapshot(scheduler: &dyn Collector) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();

    for item in scheduler.collect_ready() {
        names.push(item.name().to_string());
    }

    names
}

/// Formats the ready queue as `Ready Queue: [ A | B ]`
pub fn format_queue(names: &[String]) -> String {
    if names.is_empty() {
        return String::from("Ready Queue: Empty");
    }

    let inner: Vec<String> = names.iter().map(|name| format!(" {} ", name)).collect();
    format!("Ready Queue: [{}]", inner.join("|"))
}
