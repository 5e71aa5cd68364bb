pub mod chart;
pub mod table;
pub mod text;
pub mod types;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, warn};

pub use self::{
    chart::ChartCatalog,
    table::TableCatalog,
    text::{NarrativeCatalog, TextCatalog},
    types::{Metadata, ResponseData, ResponseEnvelope, ResponseType},
};
use crate::classifier::{Classifier, QueryClassifier, Shape};

const UNKNOWN_ERROR: &str = "Unknown error occurred";

/// A fault while assembling a chart or table. Always recovered as text.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum BuildError {
    #[error("Dataset `{dataset}` has {values} values for {labels} labels")]
    SeriesLength {
        dataset: String,
        values: usize,
        labels: usize,
    },

    #[error("Chart has no datasets")]
    NoDatasets,

    #[error("Table has no rows")]
    EmptyTable,

    #[error("Row {row} has different columns from the first row")]
    ColumnMismatch { row: usize },
}

/// A result computed before formatting, e.g. by an agent or a data service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Upstream {
    #[serde(default = "default_success")]
    pub success: bool,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub extra: Metadata,
}

fn default_success() -> bool {
    true
}

impl Upstream {
    pub fn succeeded(text: &str) -> Self {
        Self {
            success: true,
            text: Some(text.to_string()),
            extra: Metadata::new(),
        }
    }

    pub fn failed(text: &str) -> Self {
        Self {
            success: false,
            text: Some(text.to_string()),
            extra: Metadata::new(),
        }
    }

    /// The narrative, if one was supplied and is not blank.
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref().filter(|text| !text.trim().is_empty())
    }

    /// The failure message exactly as supplied, if not empty.
    fn message(&self) -> Option<&str> {
        self.text.as_deref().filter(|text| !text.is_empty())
    }

    fn has_intermediate_steps(&self) -> bool {
        self.extra.get("intermediate_steps").is_some_and(truthy)
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// Canned data and templates the builder selects from.
#[derive(Debug, Clone, Default)]
pub struct Catalogs {
    pub charts: ChartCatalog,
    pub tables: TableCatalog,
    pub texts: TextCatalog,
    pub narratives: NarrativeCatalog,
}

/// Turns a query into a chart, table or text envelope.
///
/// Holds no mutable state; one instance can serve any number of concurrent
/// requests.
pub struct PayloadBuilder<C = Classifier> {
    classifier: C,
    catalogs: Catalogs,
    source: String,
}

impl<C: QueryClassifier> PayloadBuilder<C> {
    pub fn new(classifier: C, catalogs: Catalogs, source: &str) -> Self {
        Self {
            classifier,
            catalogs,
            source: source.to_string(),
        }
    }

    /// Formats a query that has no upstream result.
    pub fn process(&self, query: &str) -> ResponseEnvelope {
        self.build(query, None)
    }

    /// Formats a query, optionally around an upstream result.
    ///
    /// Never fails: a declared upstream failure becomes an error envelope, and
    /// a chart or table that cannot be built is rendered as text instead.
    pub fn build(&self, query: &str, upstream: Option<&Upstream>) -> ResponseEnvelope {
        if let Some(upstream) = upstream.filter(|upstream| !upstream.success) {
            return error_envelope(upstream.message().unwrap_or(UNKNOWN_ERROR));
        }

        let upstream_text = upstream.and_then(Upstream::text);
        let classification = self.classifier.classify_request(query, upstream_text);
        debug!(
            shape = %classification.shape,
            subcategory = %classification.subcategory,
            "Dispatching to sub-builder"
        );

        let built = match classification.shape {
            Shape::Chart => self.chart_envelope(query, &classification.subcategory),
            Shape::Table => self.table_envelope(&classification.subcategory),
            Shape::Text => {
                return self.text_envelope(query, &classification.subcategory, upstream);
            }
        };

        match built {
            Ok(envelope) => envelope,
            Err(error) => {
                warn!(
                    shape = %classification.shape,
                    subcategory = %classification.subcategory,
                    %error,
                    "Payload construction failed, degrading to text"
                );
                let subcategory = self.classifier.subcategory_for(Shape::Text, query);
                let mut envelope = self.text_envelope(query, &subcategory, upstream);
                envelope.metadata.insert(
                    "degraded_from".to_string(),
                    json!(classification.shape.as_str()),
                );
                envelope
            }
        }
    }

    fn chart_envelope(
        &self,
        query: &str,
        subcategory: &str,
    ) -> Result<ResponseEnvelope, BuildError> {
        let entry = self.catalogs.charts.build(subcategory)?;

        let mut metadata = self.metadata("visualization");
        metadata.insert("chart_type".to_string(), json!(entry.payload.kind.as_str()));
        metadata.insert("subcategory".to_string(), json!(subcategory));
        metadata.insert(
            "description".to_string(),
            json!(format!("Visual representation of {query}")),
        );
        for (key, value) in &entry.extra {
            metadata.insert(key.clone(), value.clone());
        }

        Ok(ResponseEnvelope {
            kind: ResponseType::Chart,
            data: ResponseData::Chart(entry.payload.clone()),
            metadata,
        })
    }

    fn table_envelope(&self, subcategory: &str) -> Result<ResponseEnvelope, BuildError> {
        let table = self.catalogs.tables.build(subcategory)?;

        let mut metadata = self.metadata("structured_data");
        metadata.insert("record_count".to_string(), json!(table.len()));
        metadata.insert("table_category".to_string(), json!(subcategory));

        Ok(ResponseEnvelope {
            kind: ResponseType::Table,
            data: ResponseData::Table(table.clone()),
            metadata,
        })
    }

    fn text_envelope(
        &self,
        query: &str,
        subcategory: &str,
        upstream: Option<&Upstream>,
    ) -> ResponseEnvelope {
        let narrative = upstream
            .and_then(Upstream::text)
            .unwrap_or_else(|| self.catalogs.narratives.select(query));
        let text = self.catalogs.texts.render(subcategory, narrative);

        let mut metadata = self.metadata("analytical_text");
        metadata.insert(
            "has_intermediate_steps".to_string(),
            json!(upstream.is_some_and(Upstream::has_intermediate_steps)),
        );
        metadata.insert(
            "query_category".to_string(),
            json!(self.classifier.categorize(query)),
        );
        metadata.insert("subcategory".to_string(), json!(subcategory));

        ResponseEnvelope {
            kind: ResponseType::Text,
            data: ResponseData::Text(text),
            metadata,
        }
    }

    fn metadata(&self, query_type: &str) -> Metadata {
        let mut metadata = Metadata::new();
        metadata.insert("source".to_string(), json!(self.source));
        metadata.insert("query_type".to_string(), json!(query_type));
        metadata
    }
}

fn error_envelope(message: &str) -> ResponseEnvelope {
    let mut metadata = Metadata::new();
    metadata.insert("error".to_string(), json!(true));
    ResponseEnvelope {
        kind: ResponseType::Error,
        data: ResponseData::Text(message.to_string()),
        metadata,
    }
}
