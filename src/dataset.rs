use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("cannot read dataset {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("dataset {path} is not a valid shipment document: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Synthetic shipment data as stored on disk.
///
/// Only `data.shipments` and `data.sustainability_scores` are read; any other
/// keys in the document are ignored. Individual shipments and scores are kept
/// as raw JSON and passed through untouched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Dataset {
    pub data: DatasetBody,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DatasetBody {
    pub shipments: Vec<Value>,
    pub sustainability_scores: Vec<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatasetSummary {
    pub shipments: usize,
    pub scores: usize,
}

impl DatasetSummary {
    /// Scores are expected to line up index-for-index with shipments
    pub fn is_parallel(&self) -> bool {
        self.shipments == self.scores
    }
}

impl Dataset {
    pub fn load(path: &Path) -> Result<Self, DatasetError> {
        debug!(target: "dataset", "Reading dataset from {}", path.display());

        let contents = fs::read_to_string(path).map_err(|source| DatasetError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let dataset = Self::from_json(&contents).map_err(|source| DatasetError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        let summary = dataset.summary();
        info!(
            target: "dataset",
            "Loaded {} shipments and {} sustainability scores from {}",
            summary.shipments,
            summary.scores,
            path.display()
        );
        Ok(dataset)
    }

    pub fn from_json(contents: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(contents)
    }

    pub fn shipments(&self) -> &[Value] {
        &self.data.shipments
    }

    pub fn scores(&self) -> &[Value] {
        &self.data.sustainability_scores
    }

    pub fn summary(&self) -> DatasetSummary {
        DatasetSummary {
            shipments: self.data.shipments.len(),
            scores: self.data.sustainability_scores.len(),
        }
    }
}
