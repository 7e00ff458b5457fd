use std::io::{self, BufRead, Write};
use std::num::{NonZeroU32, NonZeroUsize};
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use clap::Parser;
use env_logger::{Builder, Env};
use log::error;

use scheduler::{format_queue, ConsoleScheduler, EventSink, FileGameStore, GameStore, MemoryGameStore};
use scheduler::{Scheduler, SchedulerConfig, SchedulerEvent, DEFAULT_PAGES_NEEDED};

/// Games that can be launched from the console
pub const GAMES: [&str; 3] = ["Snake", "Tetris", "Pong"];

#[derive(Parser, Debug)]
#[command(name = "console_runner")]
#[command(about = "Mini game console running on a simulated scheduler", long_about = None)]
pub struct Cli {
    /// Directory holding the game records and the high score table
    #[arg(long, value_name = "DIR", default_value = "games")]
    pub games_dir: PathBuf,

    /// Keep records and high scores in memory only
    #[arg(long)]
    pub in_memory: bool,

    /// Length of one time unit, in milliseconds
    #[arg(long, value_name = "MS")]
    pub unit_ms: Option<u64>,

    /// Time units granted per scheduling step
    #[arg(long)]
    pub quantum: Option<NonZeroU32>,

    /// Number of pages in the memory pool
    #[arg(long)]
    pub pages: Option<usize>,

    #[arg(long)]
    pub page_size: Option<NonZeroUsize>,

    /// Seed of the input generator
    #[arg(long)]
    pub seed: Option<u64>,
}

impl Cli {
    /// The default configuration with every given flag applied
    pub fn config(&self) -> SchedulerConfig {
        let mut config = SchedulerConfig::default();

        if let Some(unit_ms) = self.unit_ms {
            config.time_unit = Duration::from_millis(unit_ms);
        }
        if let Some(quantum) = self.quantum {
            config.quantum = quantum;
        }
        if let Some(pages) = self.pages {
            config.total_pages = pages;
        }
        if let Some(page_size) = self.page_size {
            config.page_size = page_size;
        }
        config.seed = self.seed;

        config
    }
}

/// Turns `sNaKe` into `Snake`
pub fn normalize_game_name(input: &str) -> String {
    let lower = input.trim().to_lowercase();
    let mut chars = lower.chars();

    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Returns the game of the catalog matching `input`
pub fn find_game(input: &str) -> Option<&'static str> {
    let name = normalize_game_name(input);
    GAMES.iter().copied().find(|game| *game == name)
}

/// Burst times must be positive integers
pub fn parse_burst_time(input: &str) -> Option<NonZeroUsize> {
    input.trim().parse::<NonZeroUsize>().ok()
}

/// Pages default to `DEFAULT_PAGES_NEEDED` when nothing is entered
pub fn parse_pages_needed(input: &str) -> Option<usize> {
    let input = input.trim();

    if input.is_empty() {
        return Some(DEFAULT_PAGES_NEEDED);
    }

    input.parse::<usize>().ok()
}

pub fn format_event(event: &SchedulerEvent) -> String {
    match event {
        SchedulerEvent::Admitted { pid, name, pages } => {
            format!("Game '{}' added as PID {} with pages {:?}", name, pid, pages)
        }
        SchedulerEvent::AdmissionFailed { name, reason } => format!("Failed to add {}: {}", name, reason),
        SchedulerEvent::Started { pid, name } => format!("Running: {} (PID: {})", name, pid),
        SchedulerEvent::Translated { message, .. } => format!("Address Translation: {}", message),
        SchedulerEvent::InputProduced { key, .. } => format!("  Producer: Added '{}'", key),
        SchedulerEvent::InputProcessed { key, score, .. } => {
            format!("  Consumer: Processed '{}', Score: {}", key, score)
        }
        SchedulerEvent::Stopped { name, .. } => format!("{} preempted", name),
        SchedulerEvent::Requeued { name, burst_time, .. } => {
            format!("{} moved back to ready queue ({} left)", name, burst_time)
        }
        SchedulerEvent::Terminated { name, score, .. } => format!("{} terminated with score {}", name, score),
        SchedulerEvent::Removed { pid, name } => format!("{} (PID {}) removed", name, pid),
        SchedulerEvent::PersistFailed { key, reason } => format!("Could not persist {}: {}", key, reason),
    }
}

/// Renders `used` out of `total` as a bar of `length` cells
pub fn progress_bar(used: usize, total: usize, length: usize) -> String {
    let (percent, filled) = if total == 0 {
        (0, 0)
    } else {
        (100 * used / total, length * used / total)
    };

    format!("|{}{}| {}%", "#".repeat(filled), "-".repeat(length - filled), percent)
}

fn prompt(input: &mut impl BufRead, text: &str) -> Option<String> {
    print!("{}", text);
    let _ = io::stdout().flush();

    let mut line = String::new();
    match input.read_line(&mut line) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(line.trim().to_string()),
    }
}

fn launch_game<S: GameStore>(scheduler: &mut ConsoleScheduler<S>, input: &mut impl BufRead) -> Option<()> {
    println!("Available games: {}", GAMES.join(", "));

    let game = match find_game(&prompt(input, "Enter game name: ")?) {
        Some(game) => game,
        None => {
            println!("Invalid game name");
            return Some(());
        }
    };

    let burst_time = match parse_burst_time(&prompt(input, "Enter burst time (seconds): ")?) {
        Some(burst_time) => burst_time,
        None => {
            println!("Invalid burst time");
            return Some(());
        }
    };

    let pages_needed = match parse_pages_needed(&prompt(input, "Enter pages needed [4]: ")?) {
        Some(pages) => pages,
        None => {
            println!("Invalid page count");
            return Some(());
        }
    };

    match scheduler.admit(game, burst_time, pages_needed) {
        Ok(pid) => println!("Game '{}' added with burst time {} (PID {})", game, burst_time, pid),
        Err(err) => println!("{}", err),
    }

    Some(())
}

fn show_memory_map<S: GameStore>(scheduler: &ConsoleScheduler<S>) {
    let usage = scheduler.memory_usage();

    println!("Used Memory: {} pages", progress_bar(usage.used_pages, usage.total_pages, 30));
    println!("Page Size: {}", scheduler.memory().page_size());
    println!("Free Pages: {:?}", usage.free_pages);
}

fn run_console<S: GameStore>(mut scheduler: ConsoleScheduler<S>) {
    let stdin = io::stdin();
    let mut input = stdin.lock();

    loop {
        println!();
        println!("Mini Game Console OS");
        println!("1. Launch Game");
        println!("2. View Queue");
        println!("3. View High Scores");
        println!("4. Run Scheduler");
        println!("5. View Memory Map");
        println!("6. Remove Game");
        println!("7. Remove Last Game");
        println!("8. Clear Queue");
        println!("9. Exit");

        let choice = match prompt(&mut input, "Enter choice (1-9): ") {
            Some(choice) => choice,
            None => break,
        };

        match choice.as_str() {
            "1" => {
                if launch_game(&mut scheduler, &mut input).is_none() {
                    break;
                }
            }
            "2" => println!("{}", format_queue(&scheduler.queue_snapshot())),
            "3" => {
                println!("HIGH SCORES");
                for (game, score) in scheduler.high_scores() {
                    println!("{}: {}", game, score);
                }
            }
            "4" => {
                println!("Running scheduler...");
                let quanta = scheduler.run_cycle();
                println!("Scheduler finished after {} quanta", quanta);
            }
            "5" => show_memory_map(&scheduler),
            "6" => {
                let name = match prompt(&mut input, "Enter game name: ") {
                    Some(name) => normalize_game_name(&name),
                    None => break,
                };

                match scheduler.remove_by_name(&name) {
                    Ok(pid) => println!("Removed {} (PID {})", name, pid),
                    Err(err) => println!("{}", err),
                }
            }
            "7" => match scheduler.remove_last() {
                Some(pid) => println!("Removed PID {}", pid),
                None => println!("Ready Queue: Empty"),
            },
            "8" => println!("Removed {} games", scheduler.clear()),
            "9" => break,
            _ => println!("Invalid choice"),
        }
    }

    println!("Exiting Mini Game Console OS...");
    scheduler.clear();
}

fn main() {
    Builder::from_env(Env::default())
        .filter_level(log::LevelFilter::Warn)
        .format_module_path(false)
        .init();

    let cli = Cli::parse();
    let config = cli.config();

    let (sender, receiver) = mpsc::channel();
    let printer = thread::spawn(move || {
        for event in receiver {
            println!("{}", format_event(&event));
        }
    });

    if cli.in_memory {
        run_console(ConsoleScheduler::with_events(
            config,
            MemoryGameStore::new(),
            EventSink::new(sender),
        ));
    } else {
        match FileGameStore::open(&cli.games_dir) {
            Ok(store) => {
                println!("Saving games to {}", store.dir().display());
                run_console(ConsoleScheduler::with_events(config, store, EventSink::new(sender)));
            }
            Err(err) => {
                error!("Cannot open {}: {}", cli.games_dir.display(), err);
                drop(sender);
            }
        }
    }

    let _ = printer.join();
}

#[cfg(test)]
mod tests;
