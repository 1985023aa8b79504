use anyhow::{Context, Result};
use serde_json::Value;
use std::io::Write;
use std::path::Path;
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::api_client::{ApiResponse, SustainabilityApi};
use crate::config::config::Config;
use crate::dataset::Dataset;
use crate::output::{write_json_pretty, write_response_header};
use crate::payload::{BatchAnalyzeRequest, ShipmentSummary, TrainRequest};

/// How to decide that training has finished once the fixed delay is over.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReadinessPolling {
    pub interval: Duration,
    pub max_polls: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DriverOptions {
    pub train_delay: Duration,
    pub readiness: Option<ReadinessPolling>,
    pub analyze_single: bool,
    pub indent: usize,
}

impl Default for DriverOptions {
    fn default() -> Self {
        Self {
            train_delay: Duration::from_secs(5),
            readiness: None,
            analyze_single: false,
            indent: 1,
        }
    }
}

impl DriverOptions {
    /// Fails when `training.delay_secs` cannot be represented as a `Duration`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let readiness = config.api.status_path.as_ref().map(|_| ReadinessPolling {
            interval: Duration::from_millis(config.training.poll_interval_ms),
            max_polls: config.training.max_polls,
        });

        Ok(Self {
            train_delay: config.training.delay()?,
            readiness,
            analyze_single: false,
            indent: config.output.indent,
        })
    }
}

/// A decoded analysis response.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub status: u16,
    pub body: Value,
}

impl Analysis {
    /// Print the status header, then decode and print the body. A body that
    /// is not JSON fails after the header is out.
    fn report<W: Write>(response: &ApiResponse, out: &mut W, indent: usize) -> Result<Self> {
        write_response_header(out, response.status)?;
        let body = response.json()?;
        write_json_pretty(out, &body, indent)?;
        out.flush()?;

        Ok(Self {
            status: response.status,
            body,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub train_status: u16,
    pub training_ready: Option<bool>,
    pub single: Option<Analysis>,
    pub batch: Analysis,
}

/// Runs one train-then-analyze pass against a sustainability service.
pub struct Driver<A: SustainabilityApi> {
    api: A,
    options: DriverOptions,
}

impl<A: SustainabilityApi> Driver<A> {
    pub fn new(api: A, options: DriverOptions) -> Self {
        Self { api, options }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Load the dataset at `dataset_path` and run the full sequence, writing
    /// the analysis output to `out`.
    ///
    /// Nothing is sent if the dataset cannot be loaded. The training response
    /// is not inspected. A non-success status from batch analysis is printed,
    /// not treated as an error, but its body must be JSON.
    pub fn run<W: Write>(&self, dataset_path: &Path, out: &mut W) -> Result<RunReport> {
        let dataset = Dataset::load(dataset_path)?;
        self.run_with(&dataset, out)
    }

    pub fn run_with<W: Write>(&self, dataset: &Dataset, out: &mut W) -> Result<RunReport> {
        let summary = dataset.summary();
        if !summary.is_parallel() {
            warn!(
                target: "driver",
                "{} shipments but {} sustainability scores; sending as-is",
                summary.shipments,
                summary.scores
            );
        }

        info!(target: "driver", "Training on {} historical shipments", summary.shipments);
        let train = self
            .api
            .train(&TrainRequest::from_dataset(dataset))
            .context("training request failed")?;
        debug!(target: "driver", "Training call returned {}", train.status);

        let training_ready = self.wait_for_training();

        let single = if self.options.analyze_single {
            self.analyze_first(dataset, out)?
        } else {
            None
        };

        info!(target: "driver", "Batch-analyzing {} shipments", summary.shipments);
        let response = self
            .api
            .batch_analyze(&BatchAnalyzeRequest::from_dataset(dataset))
            .context("batch analysis request failed")?;
        let batch = Analysis::report(&response, out, self.options.indent)
            .context("batch analysis returned malformed JSON")?;

        Ok(RunReport {
            train_status: train.status,
            training_ready,
            single,
            batch,
        })
    }

    /// Sleep for the fixed delay, then poll for readiness if enabled.
    /// Returns `None` when only the delay applies.
    fn wait_for_training(&self) -> Option<bool> {
        debug!(target: "driver", "Waiting {:?} for training", self.options.train_delay);
        thread::sleep(self.options.train_delay);

        let polling = self.options.readiness?;
        for attempt in 1..=polling.max_polls {
            match self.api.training_status() {
                Ok(response) => match response.json() {
                    Ok(body) if is_training_ready(&body) => {
                        info!(target: "driver", "Training ready after {} status checks", attempt);
                        return Some(true);
                    }
                    Ok(body) => {
                        debug!(
                            target: "driver",
                            "Training not ready (check {}): {}",
                            attempt,
                            body
                        )
                    }
                    Err(e) => warn!(target: "driver", "Unreadable training status: {:#}", e),
                },
                Err(e) => warn!(target: "driver", "Training status check failed: {:#}", e),
            }

            if attempt < polling.max_polls {
                thread::sleep(polling.interval);
            }
        }

        warn!(
            target: "driver",
            "Training not confirmed after {} status checks; analyzing anyway",
            polling.max_polls
        );
        Some(false)
    }

    fn analyze_first<W: Write>(&self, dataset: &Dataset, out: &mut W) -> Result<Option<Analysis>> {
        let Some(first) = dataset.shipments().first() else {
            warn!(target: "driver", "Dataset has no shipments; skipping single analysis");
            return Ok(None);
        };

        let summary = ShipmentSummary::from_shipment(first);
        info!(target: "driver", "Analyzing single shipment {}", summary.shipment_id);

        let response = self
            .api
            .analyze(&summary)
            .context("single shipment analysis request failed")?;
        writeln!(out, "Single Shipment")?;
        let analysis = Analysis::report(&response, out, self.options.indent)
            .context("single shipment analysis returned malformed JSON")?;
        writeln!(out)?;
        writeln!(out, "Batch Analysis")?;

        Ok(Some(analysis))
    }
}

/// Accepts `{"ready": true}` or a `status` of "ready", "trained" or "completed".
pub fn is_training_ready(body: &Value) -> bool {
    if body.get("ready").and_then(Value::as_bool) == Some(true) {
        return true;
    }
    matches!(
        body.get("status").and_then(Value::as_str).map(str::to_ascii_lowercase).as_deref(),
        Some("ready" | "trained" | "completed")
    )
}
