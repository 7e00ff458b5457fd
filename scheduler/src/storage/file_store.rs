use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use super::{format_high_scores, is_better, parse_high_scores, GameStore};
use crate::StoreError;

const HIGH_SCORES_FILE: &str = "high_scores.txt";

/// `GameStore` keeping one file per record inside a directory
///
/// High scores live in `high_scores.txt` next to the records, one `name:score`
/// line per game.
pub struct FileGameStore {
    /// directory holding every file of the store
    dir: PathBuf,

    /// cached content of the high score file
    high_scores: BTreeMap<String, u64>,
}

impl FileGameStore {
    /// Opens the store at `dir`, creating the directory if needed
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<FileGameStore, StoreError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;

        let high_scores = match fs::read_to_string(dir.join(HIGH_SCORES_FILE)) {
            Ok(content) => parse_high_scores(&content),
            Err(err) if err.kind() == ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => return Err(err.into()),
        };

        debug!("Opened store at {} with {} high scores", dir.display(), high_scores.len());

        Ok(FileGameStore { dir, high_scores })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn record_path(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }
}

impl GameStore for FileGameStore {
    fn create_record(&mut self, key: &str, content: &str) -> Result<(), StoreError> {
        let path = self.record_path(key);
        fs::write(&path, content)?;

        debug!("Created file {}", path.display());
        Ok(())
    }

    fn write_record(&mut self, key: &str, content: &str) -> Result<(), StoreError> {
        let path = self.record_path(key);

        if !path.exists() {
            warn!("File {} does not exist", path.display());
            return Err(StoreError::RecordNotFound(key.to_string()));
        }

        fs::write(&path, content)?;

        debug!("Wrote to file {}: {}", path.display(), content);
        Ok(())
    }

    fn read_record(&self, key: &str) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(self.record_path(key)) {
            Ok(content) => Ok(Some(content)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn delete_record(&mut self, key: &str) -> Result<(), StoreError> {
        let path = self.record_path(key);

        match fs::remove_file(&path) {
            Ok(()) => {
                debug!("Deleted file {}", path.display());
                Ok(())
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Err(StoreError::RecordNotFound(key.to_string())),
            Err(err) => Err(err.into()),
        }
    }

    fn load_high_scores(&self) -> BTreeMap<String, u64> {
        self.high_scores.clone()
    }

    fn save_high_score_if_better(&mut self, name: &str, score: u64) -> Result<bool, StoreError> {
        if !is_better(&self.high_scores, name, score) {
            return Ok(false);
        }

        let mut updated = self.high_scores.clone();
        updated.insert(name.to_string(), score);
        fs::write(self.dir.join(HIGH_SCORES_FILE), format_high_scores(&updated))?;

        /* only update the cache once the file holds the new score */
        self.high_scores = updated;

        info!("Updated high score for {}: {}", name, score);
        Ok(true)
    }
}
