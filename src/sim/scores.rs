/// High-score table: the ten best final scores, one per line in a text file.
///
/// Held as an explicit service created once in `main` and handed to the
/// engine through `ScoreRecorder`.

use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::sim::save::PersistError;

pub const MAX_SCORES: usize = 10;
const SCORES_FILE: &str = "highscores.txt";

/// Sink for final scores reported by the engine.
pub trait ScoreRecorder {
    fn record_score(&mut self, score: u32);
}

#[derive(Clone, Debug, Default)]
pub struct HighScores {
    path: Option<PathBuf>,
    scores: Vec<u32>,
}

impl HighScores {
    /// Load from `dir`. A missing or unreadable file is an empty table;
    /// malformed lines are skipped.
    pub fn load(dir: &Path) -> Self {
        let path = dir.join(SCORES_FILE);
        let scores = match std::fs::read_to_string(&path) {
            Ok(text) => parse(&text),
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    warn!("could not read {}: {e}", path.display());
                }
                vec![]
            }
        };
        HighScores { path: Some(path), scores }
    }

    /// Table that is never written to disk.
    #[cfg(test)]
    pub fn in_memory() -> Self {
        HighScores::default()
    }

    /// Best first.
    pub fn scores(&self) -> &[u32] {
        &self.scores
    }

    pub fn best(&self) -> Option<u32> {
        self.scores.first().copied()
    }

    /// Insert `score`, keep the top ten, and persist.
    pub fn record(&mut self, score: u32) -> Result<(), PersistError> {
        let at = self.scores.partition_point(|&s| s >= score);
        self.scores.insert(at, score);
        self.scores.truncate(MAX_SCORES);
        self.write()
    }

    fn write(&self) -> Result<(), PersistError> {
        let Some(path) = &self.path else { return Ok(()) };
        let mut text = String::new();
        for s in &self.scores {
            text.push_str(&s.to_string());
            text.push('\n');
        }
        std::fs::write(path, text).map_err(|source| PersistError::Io { path: path.clone(), source })
    }
}

impl ScoreRecorder for HighScores {
    fn record_score(&mut self, score: u32) {
        match self.record(score) {
            Ok(()) => info!("recorded score {score}"),
            Err(e) => warn!("could not save high scores: {e}"),
        }
    }
}

fn parse(text: &str) -> Vec<u32> {
    let mut scores: Vec<u32> = text
        .lines()
        .filter_map(|line| line.trim().parse().ok())
        .collect();
    scores.sort_unstable_by(|a, b| b.cmp(a));
    scores.truncate(MAX_SCORES);
    scores
}
