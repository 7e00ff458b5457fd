use std::collections::{BTreeMap, HashMap};

use super::{is_better, GameStore};
use crate::StoreError;

/// Volatile `GameStore`, nothing survives the process
#[derive(Default)]
pub struct MemoryGameStore {
    records: HashMap<String, String>,
    high_scores: BTreeMap<String, u64>,
}

impl MemoryGameStore {
    pub fn new() -> MemoryGameStore {
        MemoryGameStore::default()
    }

    /// Creates a store that already knows some high scores
    pub fn with_high_scores(high_scores: BTreeMap<String, u64>) -> MemoryGameStore {
        MemoryGameStore {
            records: HashMap::new(),
            high_scores,
        }
    }

    pub fn record_count(&self) -> usize {
        self.records.len()
    }
}

impl GameStore for MemoryGameStore {
    fn create_record(&mut self, key: &str, content: &str) -> Result<(), StoreError> {
        self.records.insert(key.to_string(), content.to_string());
        Ok(())
    }

    fn write_record(&mut self, key: &str, content: &str) -> Result<(), StoreError> {
        match self.records.get_mut(key) {
            Some(record) => {
                *record = content.to_string();
                Ok(())
            }
            None => Err(StoreError::RecordNotFound(key.to_string())),
        }
    }

    fn read_record(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.records.get(key).cloned())
    }

    fn delete_record(&mut self, key: &str) -> Result<(), StoreError> {
        match self.records.remove(key) {
            Some(_) => Ok(()),
            None => Err(StoreError::RecordNotFound(key.to_string())),
        }
    }

    fn load_high_scores(&self) -> BTreeMap<String, u64> {
        self.high_scores.clone()
    }

    fn save_high_score_if_better(&mut self, name: &str, score: u64) -> Result<bool, StoreError> {
        if !is_better(&self.high_scores, name, score) {
            return Ok(false);
        }

        self.high_scores.insert(name.to_string(), score);
        Ok(true)
    }
}
