use std::collections::HashMap;

use serde_json::json;

use super::{
    types::{ChartKind, ChartPayload, Dataset, Metadata, Styling},
    BuildError,
};

const BLUE: &str = "rgba(59, 130, 246, 0.8)";
const GREEN: &str = "rgba(16, 185, 129, 0.8)";
const AMBER: &str = "rgba(245, 158, 11, 0.8)";
const VIOLET: &str = "rgba(139, 92, 246, 0.8)";
const RED: &str = "rgba(239, 68, 68, 0.8)";

const BLUE_BORDER: &str = "rgba(59, 130, 246, 1)";
const GREEN_BORDER: &str = "rgba(16, 185, 129, 1)";
const AMBER_BORDER: &str = "rgba(245, 158, 11, 1)";
const VIOLET_BORDER: &str = "rgba(139, 92, 246, 1)";
const RED_BORDER: &str = "rgba(239, 68, 68, 1)";

const RELATIONSHIP_MANAGERS: [&str; 3] = ["Amit Sharma", "Priya Patel", "Rohit Singh"];

/// A canned chart plus the metadata it contributes to the envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartEntry {
    pub payload: ChartPayload,
    pub extra: Metadata,
}

impl ChartEntry {
    pub fn new(payload: ChartPayload) -> Self {
        Self {
            payload,
            extra: Metadata::new(),
        }
    }
}

/// Sub-category to chart lookup. Unknown tags resolve to the fallback entry.
#[derive(Debug, Clone)]
pub struct ChartCatalog {
    entries: HashMap<String, ChartEntry>,
    fallback: ChartEntry,
}

impl ChartCatalog {
    pub fn new(fallback: ChartEntry) -> Self {
        Self {
            entries: HashMap::new(),
            fallback,
        }
    }

    #[must_use]
    pub fn with_entry(mut self, subcategory: &str, entry: ChartEntry) -> Self {
        self.entries.insert(subcategory.to_string(), entry);
        self
    }

    pub fn lookup(&self, subcategory: &str) -> &ChartEntry {
        self.entries.get(subcategory).unwrap_or(&self.fallback)
    }

    /// Looks up the chart for `subcategory` and checks its invariants.
    ///
    /// # Errors
    ///
    /// Returns an error if the selected chart is malformed.
    pub fn build(&self, subcategory: &str) -> Result<&ChartEntry, BuildError> {
        let entry = self.lookup(subcategory);
        entry.payload.validate()?;
        Ok(entry)
    }
}

impl Default for ChartCatalog {
    fn default() -> Self {
        Self::new(ChartEntry::new(performance_metrics()))
            .with_entry("asset_allocation", asset_allocation())
            .with_entry("rm_distribution", ChartEntry::new(rm_distribution()))
            .with_entry("geographic", ChartEntry::new(clients_by_city()))
            .with_entry("risk_distribution", ChartEntry::new(risk_appetite()))
            .with_entry("rm_performance", ChartEntry::new(rm_performance()))
    }
}

fn labels(values: &[&str]) -> Vec<String> {
    values.iter().map(ToString::to_string).collect()
}

fn per_point(colors: &[&str]) -> Styling {
    Styling::PerPoint(labels(colors))
}

fn single(color: &str) -> Styling {
    Styling::Single(color.to_string())
}

fn asset_allocation() -> ChartEntry {
    let payload = ChartPayload {
        kind: ChartKind::Pie,
        labels: labels(&[
            "Stocks & Equity",
            "Real Estate",
            "Mutual Funds",
            "Bonds & Fixed Income",
            "Alternative Investments",
        ]),
        datasets: vec![Dataset {
            label: "Asset Allocation (₹ Crores)".to_string(),
            data: vec![425.0, 280.0, 195.0, 125.0, 85.0],
            background_color: per_point(&[BLUE, GREEN, AMBER, VIOLET, RED]),
            border_color: Some(per_point(&[
                BLUE_BORDER,
                GREEN_BORDER,
                AMBER_BORDER,
                VIOLET_BORDER,
                RED_BORDER,
            ])),
            border_width: 2,
        }],
    };
    let mut extra = Metadata::new();
    extra.insert("total_aum".to_string(), json!("₹1,110 Crores"));
    ChartEntry { payload, extra }
}

fn rm_distribution() -> ChartPayload {
    ChartPayload {
        kind: ChartKind::Pie,
        labels: labels(&RELATIONSHIP_MANAGERS),
        datasets: vec![Dataset {
            label: "Portfolio Distribution by RM (₹ Crores)".to_string(),
            data: vec![450.0, 320.0, 280.0],
            background_color: per_point(&[BLUE, GREEN, AMBER]),
            border_color: Some(per_point(&[BLUE_BORDER, GREEN_BORDER, AMBER_BORDER])),
            border_width: 2,
        }],
    }
}

fn clients_by_city() -> ChartPayload {
    ChartPayload {
        kind: ChartKind::Bar,
        labels: labels(&["Mumbai", "Delhi", "Chennai", "Bangalore", "Ahmedabad"]),
        datasets: vec![Dataset {
            label: "Clients by City".to_string(),
            data: vec![4.0, 1.0, 1.0, 1.0, 1.0],
            background_color: per_point(&[BLUE, GREEN, AMBER, VIOLET, RED]),
            border_color: None,
            border_width: 2,
        }],
    }
}

fn risk_appetite() -> ChartPayload {
    ChartPayload {
        kind: ChartKind::Doughnut,
        labels: labels(&["High Risk", "Moderate Risk", "Conservative"]),
        datasets: vec![Dataset {
            label: "Risk Appetite Distribution (%)".to_string(),
            data: vec![45.0, 35.0, 20.0],
            background_color: per_point(&[RED, AMBER, GREEN]),
            border_color: None,
            border_width: 2,
        }],
    }
}

fn rm_performance() -> ChartPayload {
    ChartPayload {
        kind: ChartKind::Bar,
        labels: labels(&RELATIONSHIP_MANAGERS),
        datasets: vec![
            Dataset {
                label: "Client Count".to_string(),
                data: vec![25.0, 18.0, 12.0],
                background_color: single(BLUE),
                border_color: Some(single(BLUE_BORDER)),
                border_width: 2,
            },
            Dataset {
                label: "Avg Portfolio Value (₹ Crores)".to_string(),
                data: vec![18.0, 17.8, 23.3],
                background_color: single(GREEN),
                border_color: Some(single(GREEN_BORDER)),
                border_width: 2,
            },
        ],
    }
}

fn performance_metrics() -> ChartPayload {
    ChartPayload {
        kind: ChartKind::Bar,
        labels: labels(&[
            "Portfolio Value",
            "Transaction Volume",
            "Client Satisfaction",
            "Growth Rate",
        ]),
        datasets: vec![Dataset {
            label: "Performance Metrics".to_string(),
            data: vec![85.0, 92.0, 88.0, 76.0],
            background_color: single(BLUE),
            border_color: Some(single(BLUE_BORDER)),
            border_width: 2,
        }],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SUBCATEGORIES: [&str; 6] = [
        "asset_allocation",
        "rm_distribution",
        "geographic",
        "risk_distribution",
        "rm_performance",
        "default",
    ];

    #[test]
    fn every_canned_chart_is_well_formed() {
        let catalog = ChartCatalog::default();
        for subcategory in SUBCATEGORIES {
            let entry = catalog.build(subcategory).unwrap();
            for dataset in &entry.payload.datasets {
                assert_eq!(
                    dataset.data.len(),
                    entry.payload.labels.len(),
                    "{subcategory}"
                );
            }
        }
    }

    #[test]
    fn unknown_subcategory_uses_fallback() {
        let catalog = ChartCatalog::default();
        assert_eq!(catalog.lookup("no_such_chart"), catalog.lookup("default"));
        assert_eq!(
            catalog.lookup("no_such_chart").payload.labels[0],
            "Portfolio Value"
        );
    }

    #[test]
    fn rm_distribution_is_pie_per_manager() {
        let catalog = ChartCatalog::default();
        let chart = &catalog.lookup("rm_distribution").payload;
        assert_eq!(chart.kind, ChartKind::Pie);
        assert_eq!(chart.labels, RELATIONSHIP_MANAGERS);
        assert_eq!(chart.datasets.len(), 1);
        assert_eq!(chart.datasets[0].data, vec![450.0, 320.0, 280.0]);
    }

    #[test]
    fn asset_allocation_reports_total_aum() {
        let catalog = ChartCatalog::default();
        assert_eq!(
            catalog.lookup("asset_allocation").extra["total_aum"],
            "₹1,110 Crores"
        );
    }

    #[test]
    fn malformed_entry_fails_to_build() {
        let mut broken = rm_distribution();
        broken.labels.pop();
        let catalog = ChartCatalog::default().with_entry("broken", ChartEntry::new(broken));
        assert!(matches!(
            catalog.build("broken"),
            Err(BuildError::SeriesLength { .. })
        ));
    }
}
