#![allow(dead_code)]

use anyhow::Result;
use serde_json::Value;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;
use tempfile::TempDir;

use sustain_cli::api_client::{ApiResponse, SustainabilityApi};
use sustain_cli::payload::{BatchAnalyzeRequest, ShipmentSummary, TrainRequest};

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub endpoint: &'static str,
    pub body: Value,
    pub at: Instant,
}

/// In-memory stand-in for the sustainability service that records every
/// call with its payload and time.
pub struct RecordingApi {
    calls: RefCell<Vec<RecordedCall>>,
    pub train_response: ApiResponse,
    pub batch_response: ApiResponse,
    pub analyze_response: ApiResponse,
    status_responses: RefCell<VecDeque<ApiResponse>>,
    pub fail_train: bool,
}

impl RecordingApi {
    pub fn new(batch_response: ApiResponse) -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            train_response: ApiResponse::new(200, r#"{"message": "training started"}"#),
            batch_response,
            analyze_response: ApiResponse::new(200, r#"{"score": 0.5}"#),
            status_responses: RefCell::new(VecDeque::new()),
            fail_train: false,
        }
    }

    pub fn with_status_responses(self, responses: Vec<ApiResponse>) -> Self {
        *self.status_responses.borrow_mut() = responses.into();
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.borrow().clone()
    }

    pub fn endpoints(&self) -> Vec<&'static str> {
        self.calls.borrow().iter().map(|c| c.endpoint).collect()
    }

    pub fn call(&self, endpoint: &str) -> RecordedCall {
        self.calls
            .borrow()
            .iter()
            .find(|c| c.endpoint == endpoint)
            .cloned()
            .unwrap_or_else(|| panic!("no {} call recorded", endpoint))
    }

    fn record(&self, endpoint: &'static str, body: Value) {
        self.calls.borrow_mut().push(RecordedCall {
            endpoint,
            body,
            at: Instant::now(),
        });
    }
}

impl SustainabilityApi for RecordingApi {
    fn train(&self, request: &TrainRequest<'_>) -> Result<ApiResponse> {
        self.record("train", serde_json::to_value(request)?);
        if self.fail_train {
            anyhow::bail!("connection refused");
        }
        Ok(self.train_response.clone())
    }

    fn batch_analyze(&self, request: &BatchAnalyzeRequest<'_>) -> Result<ApiResponse> {
        self.record("batch-analyze", serde_json::to_value(request)?);
        Ok(self.batch_response.clone())
    }

    fn analyze(&self, shipment: &ShipmentSummary) -> Result<ApiResponse> {
        self.record("analyze", serde_json::to_value(shipment)?);
        Ok(self.analyze_response.clone())
    }

    fn training_status(&self) -> Result<ApiResponse> {
        self.record("status", Value::Null);
        self.status_responses
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| anyhow::anyhow!("status endpoint unavailable"))
    }
}

/// Dataset file inside a temp dir that lives as long as the fixture.
pub struct DatasetFixture {
    _tmp: TempDir,
    pub path: PathBuf,
}

impl DatasetFixture {
    pub fn new(contents: &str) -> Self {
        let tmp = TempDir::new().expect("create temp dir");
        let path = tmp.path().join("synthetic_data_1.json");
        let mut file = std::fs::File::create(&path).expect("create dataset");
        file.write_all(contents.as_bytes()).expect("write dataset");
        Self { _tmp: tmp, path }
    }

    pub fn missing() -> Self {
        let tmp = TempDir::new().expect("create temp dir");
        let path = tmp.path().join("does_not_exist.json");
        Self { _tmp: tmp, path }
    }
}

pub fn sample_dataset() -> Value {
    serde_json::json!({
        "metadata": {"generator": "synthetic", "version": 1},
        "data": {
            "shipments": [
                {
                    "shipment_id": "SHP-001",
                    "origin": "Hamburg",
                    "destination": "Prague",
                    "transport_mode": "rail",
                    "packages": [{"weight": 120.5, "dimensions": "120x80x100"}]
                },
                {
                    "shipment_id": "SHP-002",
                    "origin": "Madrid",
                    "destination": "Lisbon",
                    "transport_mode": "truck",
                    "packages": [{"weight": 14, "dimensions": "40x30x30"}, {"weight": 3}]
                },
                {
                    "shipment_id": "SHP-003",
                    "origin": "Oslo",
                    "packages": []
                }
            ],
            "sustainability_scores": [
                0.82,
                {"overall": 0.41, "emissions_kg": 310.2},
                0.67
            ]
        }
    })
}

/// Split driver output into its status line and the parsed JSON body.
pub fn parse_printed(output: &str) -> (String, Value) {
    let mut parts = output.splitn(3, '\n');
    let status_line = parts.next().expect("status line").to_string();
    assert_eq!(parts.next(), Some("Response JSON:"));
    let body = serde_json::from_str(parts.next().expect("json body")).expect("printed JSON parses");
    (status_line, body)
}
