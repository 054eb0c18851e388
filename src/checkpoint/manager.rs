use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::ai::QTable;
use crate::checkpoint::metadata::RunMetadata;
use crate::checkpoint::npy;
use crate::error::CheckpointError;

pub const TABLE_FILE: &str = "q_table.npy";
pub const TABLE_TEXT_FILE: &str = "q_table.txt";
pub const METADATA_FILE: &str = "metadata.json";

/// Configuration for the run store.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RunStoreConfig {
    pub runs_dir: PathBuf,
    pub env_id: String,
    pub exp_name: String,
}

impl Default for RunStoreConfig {
    fn default() -> Self {
        RunStoreConfig {
            runs_dir: PathBuf::from("runs"),
            env_id: "StoneGame".to_string(),
            exp_name: "train".to_string(),
        }
    }
}

/// Seconds since the Unix epoch, 0 if the clock is before it.
pub fn unix_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Saves runs as `{env_id}__{exp_name}__{seed}__{timestamp}` directories and finds them again.
pub struct RunStore {
    config: RunStoreConfig,
}

impl RunStore {
    pub fn new(config: RunStoreConfig) -> Self {
        RunStore { config }
    }

    pub fn config(&self) -> &RunStoreConfig {
        &self.config
    }

    pub fn run_name(&self, seed: u64, timestamp: u64) -> String {
        format!(
            "{}__{}__{}__{}",
            self.config.env_id, self.config.exp_name, seed, timestamp
        )
    }

    fn prefix(&self) -> String {
        format!("{}__", self.config.env_id)
    }

    /// Write the table, its text dump and the metadata into `metadata.run_name`.
    ///
    /// Files are written to a `.tmp` sibling first and renamed into place.
    pub fn save_run(&self, table: &QTable, metadata: &RunMetadata) -> Result<PathBuf, CheckpointError> {
        let tmp_dir = self
            .config
            .runs_dir
            .join(format!("{}.tmp", metadata.run_name));
        let final_dir = self.config.runs_dir.join(&metadata.run_name);

        fs::create_dir_all(&tmp_dir)?;

        let table_path = tmp_dir.join(TABLE_FILE);
        let mut writer = BufWriter::new(File::create(&table_path)?);
        npy::write_npy(&mut writer, table).map_err(|source| CheckpointError::Table {
            path: table_path.clone(),
            source,
        })?;
        writer.flush()?;

        let mut text = BufWriter::new(File::create(tmp_dir.join(TABLE_TEXT_FILE))?);
        npy::write_text(&mut text, table)?;
        text.flush()?;

        let meta_json = serde_json::to_string_pretty(metadata)?;
        fs::write(tmp_dir.join(METADATA_FILE), meta_json)?;

        if final_dir.exists() {
            fs::remove_dir_all(&final_dir)?;
        }
        fs::rename(&tmp_dir, &final_dir)?;
        log::info!("saved run to {}", final_dir.display());

        Ok(final_dir)
    }

    /// Load the binary table from a run directory.
    pub fn load_table(&self, dir: &Path) -> Result<QTable, CheckpointError> {
        load_table_file(&dir.join(TABLE_FILE))
    }

    pub fn load_metadata(&self, dir: &Path) -> Result<RunMetadata, CheckpointError> {
        let meta_path = dir.join(METADATA_FILE);
        let meta_json = fs::read_to_string(&meta_path).map_err(|e| CheckpointError::MetadataRead {
            path: meta_path.clone(),
            source: e,
        })?;
        serde_json::from_str(&meta_json).map_err(|e| CheckpointError::MetadataParse {
            path: meta_path,
            source: e,
        })
    }

    /// Finished run directories whose name starts with `{env_id}__`.
    pub fn list_runs(&self) -> Result<Vec<PathBuf>, CheckpointError> {
        if !self.config.runs_dir.is_dir() {
            return Err(CheckpointError::DirNotFound(self.config.runs_dir.clone()));
        }
        let prefix = self.prefix();
        let mut runs = Vec::new();
        for entry in fs::read_dir(&self.config.runs_dir)? {
            let entry = entry?;
            let path = entry.path();
            if !path.is_dir() {
                continue;
            }
            let name = entry.file_name();
            let name_str = name.to_string_lossy();
            if !name_str.starts_with(&prefix) || name_str.ends_with(".tmp") {
                continue;
            }
            runs.push(path);
        }
        runs.sort();
        Ok(runs)
    }

    /// The matching run directory with the greatest modification time.
    pub fn latest_run(&self) -> Result<PathBuf, CheckpointError> {
        let mut latest: Option<(SystemTime, PathBuf)> = None;
        for path in self.list_runs()? {
            let modified = fs::metadata(&path)?.modified()?;
            if latest.as_ref().map_or(true, |(t, _)| modified > *t) {
                latest = Some((modified, path));
            }
        }
        latest.map(|(_, path)| path).ok_or_else(|| CheckpointError::NoRuns {
            dir: self.config.runs_dir.clone(),
            prefix: self.prefix(),
        })
    }

    /// Load the table of the latest run.
    pub fn load_latest_table(&self) -> Result<(PathBuf, QTable), CheckpointError> {
        let dir = self.latest_run()?;
        let table = self.load_table(&dir)?;
        log::info!("loaded value table from {}", dir.display());
        Ok((dir, table))
    }
}

/// Load a binary table from an explicit `.npy` path.
pub fn load_table_file(path: &Path) -> Result<QTable, CheckpointError> {
    if !path.is_file() {
        return Err(CheckpointError::ArtifactMissing(path.to_path_buf()));
    }
    let mut reader = BufReader::new(File::open(path)?);
    npy::read_npy(&mut reader).map_err(|source| CheckpointError::Table {
        path: path.to_path_buf(),
        source,
    })
}

/// Table for the play screen: `explicit` if given, else the latest run's.
///
/// Any failure is logged and yields `None`, leaving the AI on the heuristic.
pub fn load_play_table(
    explicit: Option<&Path>,
    run: &RunStoreConfig,
    initial_stones: u32,
) -> Option<QTable> {
    let result = match explicit {
        Some(path) => load_table_file(path).map(|t| (path.to_path_buf(), t)),
        None => RunStore::new(run.clone()).load_latest_table(),
    };
    match result {
        Ok((path, table)) => {
            log::info!("playing against {}", path.display());
            if table.max_stones() < initial_stones {
                log::warn!(
                    "table covers piles up to {} but the game starts at {}; larger piles use the heuristic",
                    table.max_stones(),
                    initial_stones
                );
            }
            Some(table)
        }
        Err(e) => {
            log::warn!("{e}; the AI will play the heuristic strategy");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkpoint::metadata::{RunHyperparameters, RunMetrics};
    use crate::training::{Trainer, TrainerConfig};

    fn store(dir: &Path) -> RunStore {
        RunStore::new(RunStoreConfig {
            runs_dir: dir.to_path_buf(),
            ..Default::default()
        })
    }

    fn metadata(store: &RunStore, seed: u64, timestamp: u64) -> RunMetadata {
        let config = TrainerConfig::default();
        RunMetadata {
            run_name: store.run_name(seed, timestamp),
            env_id: store.config().env_id.clone(),
            exp_name: store.config().exp_name.clone(),
            seed,
            timestamp,
            hyperparameters: RunHyperparameters::from_config(&config, 21),
            metrics: RunMetrics {
                episodes: 10_000,
                window: 100,
                win_rate: 0.9,
                loss_rate: 0.05,
                illegal_rate: 0.05,
                average_return: 0.4,
                final_epsilon: 0.05,
                eval_win_rate: Some(1.0),
                baselines: [("Heuristic".to_string(), 1.0), ("Random".to_string(), 0.1)]
                    .into_iter()
                    .collect(),
            },
        }
    }

    fn trained_table(episodes: usize) -> QTable {
        let config = TrainerConfig {
            total_episodes: episodes,
            eval_episodes: 0,
            ..Default::default()
        };
        Trainer::new(config, 21).unwrap().train().unwrap().table
    }

    #[test]
    fn test_run_name_layout() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        assert_eq!(store.run_name(1, 1700000000), "StoneGame__train__1__1700000000");
    }

    #[test]
    fn test_save_writes_all_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        let table = trained_table(200);
        let meta = metadata(&store, 1, 1700000000);

        let path = store.save_run(&table, &meta).unwrap();
        assert_eq!(path, dir.path().join("StoneGame__train__1__1700000000"));
        assert!(path.join(TABLE_FILE).exists());
        assert!(path.join(TABLE_TEXT_FILE).exists());
        assert!(path.join(METADATA_FILE).exists());
        assert!(!dir.path().join("StoneGame__train__1__1700000000.tmp").exists());

        let text = fs::read_to_string(path.join(TABLE_TEXT_FILE)).unwrap();
        assert_eq!(text.lines().count(), 22);

        let loaded_meta = store.load_metadata(&path).unwrap();
        assert_eq!(loaded_meta.seed, 1);
        assert_eq!(loaded_meta.hyperparameters.initial_stones, 21);
        assert_eq!(loaded_meta.metrics.eval_win_rate, Some(1.0));
        assert_eq!(loaded_meta.metrics.baselines.get("Heuristic"), Some(&1.0));
    }

    #[test]
    fn test_reload_reproduces_greedy_actions() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        let table = trained_table(2000);
        let path = store.save_run(&table, &metadata(&store, 7, 1)).unwrap();

        let loaded = store.load_table(&path).unwrap();
        for stones in 0..=21 {
            assert_eq!(loaded.best_action(stones), table.best_action(stones));
            assert_eq!(loaded.best_legal_action(stones), table.best_legal_action(stones));
        }
    }

    #[test]
    fn test_latest_run_by_modification_time() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        let table = trained_table(10);

        // Higher timestamp in the name but written first.
        store.save_run(&table, &metadata(&store, 1, 2000)).unwrap();
        std::thread::sleep(std::time::Duration::from_millis(20));
        let newest = store.save_run(&table, &metadata(&store, 2, 1000)).unwrap();

        // Ignored: other env id, unfinished run, plain file.
        fs::create_dir_all(dir.path().join("OtherGame__train__1__3000")).unwrap();
        fs::create_dir_all(dir.path().join("StoneGame__train__3__3000.tmp")).unwrap();
        fs::write(dir.path().join("StoneGame__notes"), "x").unwrap();

        assert_eq!(store.list_runs().unwrap().len(), 2);
        assert_eq!(store.latest_run().unwrap(), newest);
        let (path, _) = store.load_latest_table().unwrap();
        assert_eq!(path, newest);
    }

    #[test]
    fn test_missing_runs_are_reported() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        assert!(matches!(
            store.latest_run().unwrap_err(),
            CheckpointError::NoRuns { .. }
        ));

        let gone = store_with_missing_dir(dir.path());
        assert!(matches!(
            gone.latest_run().unwrap_err(),
            CheckpointError::DirNotFound(_)
        ));

        let empty_run = dir.path().join("StoneGame__train__1__1");
        fs::create_dir_all(&empty_run).unwrap();
        assert!(matches!(
            store.load_table(&empty_run).unwrap_err(),
            CheckpointError::ArtifactMissing(_)
        ));
    }

    fn store_with_missing_dir(root: &Path) -> RunStore {
        store(&root.join("does-not-exist"))
    }

    #[test]
    fn test_corrupt_table_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(TABLE_FILE);
        fs::write(&path, b"garbage").unwrap();
        assert!(matches!(
            load_table_file(&path).unwrap_err(),
            CheckpointError::Table { .. }
        ));
    }

    #[test]
    fn test_metadata_serde() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        let meta = metadata(&store, 5, 1700000000);
        let json = serde_json::to_string_pretty(&meta).unwrap();
        let back: RunMetadata = serde_json::from_str(&json).unwrap();
        assert_eq!(back.run_name, "StoneGame__train__5__1700000000");
        assert!((back.hyperparameters.gamma - 0.9).abs() < 1e-12);
        assert!((back.metrics.win_rate - 0.9).abs() < 1e-6);
    }

    #[test]
    fn test_metadata_without_eval() {
        let json = r#"{
            "run_name": "StoneGame__train__1__1",
            "env_id": "StoneGame",
            "exp_name": "train",
            "seed": 1,
            "timestamp": 1,
            "hyperparameters": {
                "initial_stones": 21,
                "total_episodes": 100,
                "learning_rate": 0.5,
                "gamma": 0.9,
                "start_epsilon": 1.0,
                "end_epsilon": 0.05,
                "exploration_fraction": 0.8
            },
            "metrics": {
                "episodes": 100,
                "window": 100,
                "win_rate": 0.5,
                "loss_rate": 0.4,
                "illegal_rate": 0.1,
                "average_return": -0.9,
                "final_epsilon": 0.05
            }
        }"#;
        let meta: RunMetadata = serde_json::from_str(json).unwrap();
        assert!(meta.metrics.eval_win_rate.is_none());
        assert!(meta.metrics.baselines.is_empty());
    }

    #[test]
    fn test_play_table_falls_back_when_unusable() {
        let dir = tempfile::tempdir().unwrap();
        let run = RunStoreConfig {
            runs_dir: dir.path().to_path_buf(),
            ..Default::default()
        };

        // Empty runs directory, missing runs directory, missing explicit file.
        assert!(load_play_table(None, &run, 21).is_none());
        let missing_dir = RunStoreConfig {
            runs_dir: dir.path().join("nope"),
            ..Default::default()
        };
        assert!(load_play_table(None, &missing_dir, 21).is_none());
        assert!(load_play_table(Some(dir.path().join("missing.npy").as_path()), &run, 21).is_none());

        // Corrupt explicit file and a header declaring far more rows than present.
        let corrupt = dir.path().join("corrupt.npy");
        fs::write(&corrupt, b"\x93NUMPY garbage").unwrap();
        assert!(load_play_table(Some(corrupt.as_path()), &run, 21).is_none());

        let table = trained_table(10);
        let mut bytes = Vec::new();
        npy::write_npy(&mut bytes, &table).unwrap();
        let pos = bytes.windows(7).position(|w| w == b"(22, 3)").unwrap();
        bytes[pos..pos + 7].copy_from_slice(b"(99, 3)");
        let lying = dir.path().join("lying.npy");
        fs::write(&lying, &bytes).unwrap();
        assert!(load_play_table(Some(lying.as_path()), &run, 21).is_none());
    }

    #[test]
    fn test_play_table_loads_explicit_and_latest() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        let table = trained_table(100);
        let path = store.save_run(&table, &metadata(&store, 1, 1)).unwrap();

        let latest = load_play_table(None, store.config(), 21).unwrap();
        assert_eq!(latest, table);
        let explicit = load_play_table(Some(path.join(TABLE_FILE).as_path()), store.config(), 21).unwrap();
        assert_eq!(explicit, table);
        // A smaller table still loads; larger piles fall back at decision time.
        assert_eq!(load_play_table(None, store.config(), 30).unwrap().max_stones(), 21);
    }
}
