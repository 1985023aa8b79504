use serde::Serialize;
use serde_json::{json, Value};

use crate::dataset::Dataset;

/// Body of the training call: the full history, scores aligned by index.
#[derive(Debug, Serialize)]
pub struct TrainRequest<'a> {
    pub historical_data: &'a [Value],
    pub historical_scores: &'a [Value],
}

impl<'a> TrainRequest<'a> {
    pub fn from_dataset(dataset: &'a Dataset) -> Self {
        Self {
            historical_data: dataset.shipments(),
            historical_scores: dataset.scores(),
        }
    }
}

/// Body of the batch-analysis call. Carries shipments only, never scores.
#[derive(Debug, Serialize)]
pub struct BatchAnalyzeRequest<'a> {
    pub data: BatchData<'a>,
}

#[derive(Debug, Serialize)]
pub struct BatchData<'a> {
    pub shipments: &'a [Value],
}

impl<'a> BatchAnalyzeRequest<'a> {
    pub fn from_dataset(dataset: &'a Dataset) -> Self {
        Self {
            data: BatchData {
                shipments: dataset.shipments(),
            },
        }
    }
}

/// Fields the single-shipment endpoint requires, with placeholders for any
/// the source record lacks.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ShipmentSummary {
    pub shipment_id: Value,
    pub origin: Value,
    pub destination: Value,
    pub transport_mode: Value,
    pub packages: Value,
}

impl ShipmentSummary {
    pub fn from_shipment(shipment: &Value) -> Self {
        let field = |name: &str, fallback: Value| shipment.get(name).cloned().unwrap_or(fallback);

        Self {
            shipment_id: field("shipment_id", json!("SAMPLE_ID")),
            origin: field("origin", json!("Sample Origin")),
            destination: field("destination", json!("Sample Destination")),
            transport_mode: field("transport_mode", json!("truck")),
            packages: field("packages", json!([{"weight": 10, "dimensions": "10x10x10"}])),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset() -> Dataset {
        Dataset::from_json(
            r#"{"data": {
                "shipments": [{"shipment_id": "A"}, {"shipment_id": "B", "weight": 4}],
                "sustainability_scores": [0.5, 0.9]
            }}"#,
        )
        .unwrap()
    }

    #[test]
    fn test_train_request_shape() {
        let dataset = dataset();
        let body = serde_json::to_value(TrainRequest::from_dataset(&dataset)).unwrap();

        assert_eq!(
            body,
            json!({
                "historical_data": [{"shipment_id": "A"}, {"shipment_id": "B", "weight": 4}],
                "historical_scores": [0.5, 0.9]
            })
        );
    }

    #[test]
    fn test_batch_request_has_no_scores() {
        let dataset = dataset();
        let body = serde_json::to_value(BatchAnalyzeRequest::from_dataset(&dataset)).unwrap();

        assert_eq!(
            body,
            json!({"data": {"shipments": [{"shipment_id": "A"}, {"shipment_id": "B", "weight": 4}]}})
        );
    }

    #[test]
    fn test_summary_fills_placeholders() {
        let summary = ShipmentSummary::from_shipment(&json!({"origin": "Rotterdam"}));

        assert_eq!(summary.shipment_id, json!("SAMPLE_ID"));
        assert_eq!(summary.origin, json!("Rotterdam"));
        assert_eq!(summary.destination, json!("Sample Destination"));
        assert_eq!(summary.transport_mode, json!("truck"));
        assert_eq!(
            summary.packages,
            json!([{"weight": 10, "dimensions": "10x10x10"}])
        );
    }

    #[test]
    fn test_summary_drops_unknown_fields() {
        let summary = ShipmentSummary::from_shipment(&json!({
            "shipment_id": "X-9",
            "origin": "Lyon",
            "destination": "Milan",
            "transport_mode": "ship",
            "packages": [],
            "carrier": "acme"
        }));
        let body = serde_json::to_value(&summary).unwrap();

        assert_eq!(body.as_object().unwrap().len(), 5);
        assert_eq!(body["packages"], json!([]));
        assert!(body.get("carrier").is_none());
    }

    #[test]
    fn test_summary_of_non_object_is_all_placeholders() {
        let summary = ShipmentSummary::from_shipment(&json!("not a record"));
        assert_eq!(summary.shipment_id, json!("SAMPLE_ID"));
        assert_eq!(summary.transport_mode, json!("truck"));
    }
}
