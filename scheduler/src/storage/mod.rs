use std::collections::BTreeMap;

use crate::StoreError;

mod file_store;
pub use file_store::FileGameStore;

mod memory_store;
pub use memory_store::MemoryGameStore;

/// Key of the per-process record of the game `name`
pub fn record_key(name: &str) -> String {
    format!("{}.txt", name.to_lowercase())
}

/// Persistence of per-process records and high scores
pub trait GameStore {
    /// Creates the record `key`, replacing it if it already exists
    fn create_record(&mut self, key: &str, content: &str) -> Result<(), StoreError>;

    /// Overwrites an existing record
    ///
    /// Fails with `StoreError::RecordNotFound` and changes nothing if `key`
    /// does not exist.
    fn write_record(&mut self, key: &str, content: &str) -> Result<(), StoreError>;

    /// Returns the content of the record, `None` if it does not exist
    fn read_record(&self, key: &str) -> Result<Option<String>, StoreError>;

    fn delete_record(&mut self, key: &str) -> Result<(), StoreError>;

    /// Returns the best score of every game
    fn load_high_scores(&self) -> BTreeMap<String, u64>;

    /// Records `score` for `name` if it beats the stored one
    ///
    /// Returns true if the stored high score changed.
    fn save_high_score_if_better(&mut self, name: &str, score: u64) -> Result<bool, StoreError>;
}

/// Parses `name:score` lines, skipping the malformed ones
pub(crate) fn parse_high_scores(content: &str) -> BTreeMap<String, u64> {
    let mut scores = BTreeMap::new();

    for line in content.lines() {
        if let Some((name, score)) = line.trim().split_once(':') {
            if let Ok(score) = score.trim().parse::<u64>() {
                scores.insert(name.trim().to_string(), score);
            }
        }
    }

    scores
}

pub(crate) fn format_high_scores(scores: &BTreeMap<String, u64>) -> String {
    let mut content = String::new();

    for (name, score) in scores.iter() {
        content.push_str(&format!("{}:{}\n", name, score));
    }

    content
}

/// Returns true if `score` should replace the stored score of `name`
pub(crate) fn is_better(scores: &BTreeMap<String, u64>, name: &str, score: u64) -> bool {
    match scores.get(name) {
        Some(best) => score > *best,
        None => true,
    }
}
