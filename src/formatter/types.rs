use std::collections::BTreeSet;

use serde::Serialize;
use serde_json::{Map, Value};

use super::BuildError;

/// Ordered JSON object attached to every envelope.
pub type Metadata = Map<String, Value>;

/// One table row, column name to scalar.
pub type TableRow = Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseType {
    Chart,
    Table,
    Text,
    Error,
}

impl ResponseType {
    pub fn as_str(self) -> &'static str {
        match self {
            ResponseType::Chart => "chart",
            ResponseType::Table => "table",
            ResponseType::Text => "text",
            ResponseType::Error => "error",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Pie,
    Bar,
    Line,
    Doughnut,
}

impl ChartKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ChartKind::Pie => "pie",
            ChartKind::Bar => "bar",
            ChartKind::Line => "line",
            ChartKind::Doughnut => "doughnut",
        }
    }
}

/// Display styling, passed through to the client untouched.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Styling {
    Single(String),
    PerPoint(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    pub label: String,
    pub data: Vec<f64>,
    pub background_color: Styling,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_color: Option<Styling>,
    pub border_width: u32,
}

/// Chart data in the shape chart.js consumes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPayload {
    #[serde(rename = "type")]
    pub kind: ChartKind,
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
}

impl ChartPayload {
    /// Every dataset must carry one value per label.
    ///
    /// # Errors
    ///
    /// Returns an error if there are no datasets or any dataset length differs
    /// from the label count.
    pub fn validate(&self) -> Result<(), BuildError> {
        if self.datasets.is_empty() {
            return Err(BuildError::NoDatasets);
        }
        for dataset in &self.datasets {
            if dataset.data.len() != self.labels.len() {
                return Err(BuildError::SeriesLength {
                    dataset: dataset.label.clone(),
                    values: dataset.data.len(),
                    labels: self.labels.len(),
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct TablePayload {
    pub rows: Vec<TableRow>,
}

impl TablePayload {
    /// Rows must be present and share one column set.
    ///
    /// # Errors
    ///
    /// Returns an error if the table is empty or a row's columns differ from
    /// the first row's.
    pub fn validate(&self) -> Result<(), BuildError> {
        let Some(first) = self.rows.first() else {
            return Err(BuildError::EmptyTable);
        };
        let columns: BTreeSet<&String> = first.keys().collect();
        for (row, values) in self.rows.iter().enumerate().skip(1) {
            if values.keys().collect::<BTreeSet<_>>() != columns {
                return Err(BuildError::ColumnMismatch { row });
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResponseData {
    Chart(ChartPayload),
    Table(TablePayload),
    Text(String),
}

/// The unit returned for every query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseEnvelope {
    #[serde(rename = "type")]
    pub kind: ResponseType,
    pub data: ResponseData,
    pub metadata: Metadata,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn dataset(values: &[f64]) -> Dataset {
        Dataset {
            label: "Clients".to_string(),
            data: values.to_vec(),
            background_color: Styling::Single("blue".to_string()),
            border_color: None,
            border_width: 2,
        }
    }

    #[test]
    fn chart_serializes_for_chart_js() {
        let chart = ChartPayload {
            kind: ChartKind::Doughnut,
            labels: vec!["A".to_string(), "B".to_string()],
            datasets: vec![dataset(&[1.0, 2.5])],
        };
        assert_eq!(
            serde_json::to_value(&chart).unwrap(),
            json!({
                "type": "doughnut",
                "labels": ["A", "B"],
                "datasets": [{
                    "label": "Clients",
                    "data": [1.0, 2.5],
                    "backgroundColor": "blue",
                    "borderWidth": 2
                }]
            })
        );
    }

    #[test]
    fn chart_length_mismatch_is_rejected() {
        let chart = ChartPayload {
            kind: ChartKind::Bar,
            labels: vec!["A".to_string(), "B".to_string(), "C".to_string()],
            datasets: vec![dataset(&[1.0, 2.0])],
        };
        assert_eq!(
            chart.validate(),
            Err(BuildError::SeriesLength {
                dataset: "Clients".to_string(),
                values: 2,
                labels: 3,
            })
        );

        let empty = ChartPayload {
            datasets: vec![],
            ..chart
        };
        assert_eq!(empty.validate(), Err(BuildError::NoDatasets));
    }

    fn row(value: Value) -> TableRow {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn table_columns_must_match() {
        let table = TablePayload {
            rows: vec![
                row(json!({"metric": "AUM", "value": "1"})),
                row(json!({"value": "2", "metric": "Clients"})),
            ],
        };
        assert_eq!(table.validate(), Ok(()));

        let table = TablePayload {
            rows: vec![
                row(json!({"metric": "AUM", "value": "1"})),
                row(json!({"metric": "Clients", "growth": "2"})),
            ],
        };
        assert_eq!(table.validate(), Err(BuildError::ColumnMismatch { row: 1 }));

        assert_eq!(
            TablePayload { rows: vec![] }.validate(),
            Err(BuildError::EmptyTable)
        );
    }

    #[test]
    fn envelope_serializes_type_tag() {
        let envelope = ResponseEnvelope {
            kind: ResponseType::Error,
            data: ResponseData::Text("db down".to_string()),
            metadata: row(json!({"error": true})),
        };
        assert_eq!(
            serde_json::to_value(&envelope).unwrap(),
            json!({"type": "error", "data": "db down", "metadata": {"error": true}})
        );
    }
}
