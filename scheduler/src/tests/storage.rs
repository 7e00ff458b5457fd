use std::fs;
use std::path::PathBuf;

use crate::storage::{parse_high_scores, record_key};
use crate::{FileGameStore, GameStore, MemoryGameStore, StoreError};

/// Fresh directory under the system temp dir, removed on drop
struct TestDir(PathBuf);

impl TestDir {
    fn new(test_name: &str) -> TestDir {
        let path = std::env::temp_dir().join(format!("console_scheduler_{}_{}", test_name, std::process::id()));
        let _ = fs::remove_dir_all(&path);

        TestDir(path)
    }
}

impl Drop for TestDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.0);
    }
}

/// Checks the record contract shared by every store
fn check_record_contract(store: &mut dyn GameStore) {
    let key = record_key("Snake");
    assert_eq!(key, "snake.txt");

    assert!(matches!(
        store.write_record(&key, "Score: 1"),
        Err(StoreError::RecordNotFound(_))
    ));
    assert_eq!(store.read_record(&key).unwrap(), None);

    store.create_record(&key, "Initial score: 0").unwrap();
    assert_eq!(store.read_record(&key).unwrap().as_deref(), Some("Initial score: 0"));

    store.write_record(&key, "Score: 3").unwrap();
    assert_eq!(store.read_record(&key).unwrap().as_deref(), Some("Score: 3"));

    store.delete_record(&key).unwrap();
    assert_eq!(store.read_record(&key).unwrap(), None);
    assert!(matches!(store.delete_record(&key), Err(StoreError::RecordNotFound(_))));
}

fn check_high_score_contract(store: &mut dyn GameStore) {
    assert!(store.save_high_score_if_better("Tetris", 4).unwrap());
    assert!(!store.save_high_score_if_better("Tetris", 4).unwrap());
    assert!(!store.save_high_score_if_better("Tetris", 2).unwrap());
    assert!(store.save_high_score_if_better("Tetris", 7).unwrap());
    assert!(store.save_high_score_if_better("Pong", 0).unwrap());

    let scores = store.load_high_scores();
    assert_eq!(scores.get("Tetris"), Some(&7));
    assert_eq!(scores.get("Pong"), Some(&0));
}

#[test]
fn test_memory_store_contract() {
    let mut store = MemoryGameStore::new();

    check_record_contract(&mut store);
    check_high_score_contract(&mut store);
    assert_eq!(store.record_count(), 0);
}

#[test]
fn test_file_store_contract() {
    let dir = TestDir::new("contract");
    let mut store = FileGameStore::open(&dir.0).unwrap();
    assert_eq!(store.dir(), dir.0.as_path());
    assert!(store.load_high_scores().is_empty());

    check_record_contract(&mut store);
    check_high_score_contract(&mut store);
}

#[test]
fn test_file_store_high_scores_survive_reopen() {
    let dir = TestDir::new("reopen");

    {
        let mut store = FileGameStore::open(&dir.0).unwrap();
        store.save_high_score_if_better("Snake", 12).unwrap();
        store.save_high_score_if_better("Pong", 3).unwrap();
    }

    let content = fs::read_to_string(dir.0.join("high_scores.txt")).unwrap();
    assert_eq!(content, "Pong:3\nSnake:12\n");

    let store = FileGameStore::open(&dir.0).unwrap();
    let scores = store.load_high_scores();
    assert_eq!(scores.len(), 2);
    assert_eq!(scores["Snake"], 12);
}

#[test]
fn test_parse_high_scores_skips_malformed_lines() {
    let scores = parse_high_scores("Snake:5\nno separator\nPong:abc\n  Tetris : 9 \n\n");

    assert_eq!(scores.len(), 2);
    assert_eq!(scores["Snake"], 5);
    assert_eq!(scores["Tetris"], 9);
}
