use std::num::NonZeroUsize;
use std::time::Duration;

use clap::Parser;
use scheduler::{Pid, SchedulerEvent};

use crate::{find_game, format_event, normalize_game_name, parse_burst_time, parse_pages_needed, progress_bar, Cli};

fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
    Cli::try_parse_from(std::iter::once("console_runner").chain(args.iter().copied()))
}

#[test]
fn test_game_names_are_normalized() {
    assert_eq!(normalize_game_name("sNAKE"), "Snake");
    assert_eq!(normalize_game_name("  tetris \n"), "Tetris");
    assert_eq!(normalize_game_name(""), "");

    assert_eq!(find_game("PONG"), Some("Pong"));
    assert_eq!(find_game("Chess"), None);
}

#[test]
fn test_burst_time_must_be_positive() {
    assert_eq!(parse_burst_time("5"), NonZeroUsize::new(5));
    assert_eq!(parse_burst_time(" 12 "), NonZeroUsize::new(12));
    assert_eq!(parse_burst_time("0"), None);
    assert_eq!(parse_burst_time("-3"), None);
    assert_eq!(parse_burst_time("five"), None);
}

#[test]
fn test_pages_default_to_four() {
    assert_eq!(parse_pages_needed(""), Some(4));
    assert_eq!(parse_pages_needed("8"), Some(8));
    assert_eq!(parse_pages_needed("x"), None);
}

#[test]
fn test_parse_args() {
    let cli = parse(&[]).unwrap();
    assert_eq!(cli.games_dir.to_str(), Some("games"));
    assert!(!cli.in_memory);
    assert_eq!(cli.config().quantum.get(), 2);
    assert_eq!(cli.config().seed, None);

    let cli = parse(&[
        "--in-memory",
        "--unit-ms",
        "50",
        "--quantum",
        "3",
        "--pages",
        "32",
        "--page-size",
        "512",
        "--seed",
        "7",
    ])
    .unwrap();
    assert!(cli.in_memory);

    let config = cli.config();
    assert_eq!(config.time_unit, Duration::from_millis(50));
    assert_eq!(config.quantum.get(), 3);
    assert_eq!(config.total_pages, 32);
    assert_eq!(config.page_size.get(), 512);
    assert_eq!(config.seed, Some(7));

    assert!(parse(&["--quantum", "0"]).is_err());
    assert!(parse(&["--page-size", "0"]).is_err());
    assert!(parse(&["--pages"]).is_err());
    assert!(parse(&["--verbose"]).is_err());
}

#[test]
fn test_quantum_must_fit() {
    assert_eq!(parse(&["--quantum", "4294967295"]).unwrap().config().quantum.get(), u32::MAX);
    assert!(parse(&["--quantum", "4294967296"]).is_err());
}

#[test]
fn test_format_event() {
    let event = SchedulerEvent::Terminated {
        pid: Pid::new(3),
        name: String::from("Pong"),
        score: 4,
    };

    assert_eq!(format_event(&event), "Pong terminated with score 4");
}

#[test]
fn test_progress_bar() {
    assert_eq!(progress_bar(8, 16, 10), "|#####-----| 50%");
    assert_eq!(progress_bar(0, 0, 4), "|----| 0%");
}
