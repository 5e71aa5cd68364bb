use std::collections::HashMap;

use serde_json::{json, Value};

use super::{types::TablePayload, BuildError};

/// Sub-category to table lookup. Unknown tags resolve to the fallback table.
#[derive(Debug, Clone)]
pub struct TableCatalog {
    entries: HashMap<String, TablePayload>,
    fallback: TablePayload,
}

impl TableCatalog {
    pub fn new(fallback: TablePayload) -> Self {
        Self {
            entries: HashMap::new(),
            fallback,
        }
    }

    #[must_use]
    pub fn with_entry(mut self, subcategory: &str, table: TablePayload) -> Self {
        self.entries.insert(subcategory.to_string(), table);
        self
    }

    pub fn lookup(&self, subcategory: &str) -> &TablePayload {
        self.entries.get(subcategory).unwrap_or(&self.fallback)
    }

    /// Looks up the table for `subcategory` and checks its invariants.
    ///
    /// # Errors
    ///
    /// Returns an error if the selected table is empty or its rows disagree on
    /// columns.
    pub fn build(&self, subcategory: &str) -> Result<&TablePayload, BuildError> {
        let table = self.lookup(subcategory);
        table.validate()?;
        Ok(table)
    }
}

impl Default for TableCatalog {
    fn default() -> Self {
        Self::new(general_metrics())
            .with_entry("top_portfolios", top_portfolios())
            .with_entry("rm_performance", rm_performance())
            .with_entry("stock_holdings", stock_holdings())
            .with_entry("client_profiles", client_profiles())
    }
}

/// Converts a JSON array of objects into rows; anything else is dropped.
pub(crate) fn rows(value: Value) -> TablePayload {
    let rows = match value {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::Object(row) => Some(row),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    };
    TablePayload { rows }
}

fn top_portfolios() -> TablePayload {
    rows(json!([
        {"rank": 1, "client_name": "MS Dhoni", "portfolio_value": "₹156 Cr", "primary_asset": "Real Estate", "rm": "Rohit Singh", "growth": "+18.5%"},
        {"rank": 2, "client_name": "Shah Rukh Khan", "portfolio_value": "₹125 Cr", "primary_asset": "Stocks", "rm": "Amit Sharma", "growth": "+15.2%"},
        {"rank": 3, "client_name": "Virat Kohli", "portfolio_value": "₹98 Cr", "primary_asset": "Stocks", "rm": "Priya Patel", "growth": "+22.1%"},
        {"rank": 4, "client_name": "Deepika Padukone", "portfolio_value": "₹87 Cr", "primary_asset": "Mutual Funds", "rm": "Amit Sharma", "growth": "+12.8%"},
        {"rank": 5, "client_name": "Priyanka Chopra", "portfolio_value": "₹76 Cr", "primary_asset": "International Stocks", "rm": "Priya Patel", "growth": "+19.7%"}
    ]))
}

fn rm_performance() -> TablePayload {
    rows(json!([
        {"rank": 1, "rm_name": "Amit Sharma", "client_count": 25, "total_aum": "₹450 Cr", "avg_portfolio": "₹18 Cr", "performance_rating": "Excellent"},
        {"rank": 2, "rm_name": "Priya Patel", "client_count": 18, "total_aum": "₹320 Cr", "avg_portfolio": "₹17.8 Cr", "performance_rating": "Very Good"},
        {"rank": 3, "rm_name": "Rohit Singh", "client_count": 12, "total_aum": "₹280 Cr", "avg_portfolio": "₹23.3 Cr", "performance_rating": "Good"}
    ]))
}

fn stock_holdings() -> TablePayload {
    rows(json!([
        {"client_name": "Shah Rukh Khan", "stock_symbol": "RELIANCE", "holding_value": "₹50 Cr", "percentage_of_portfolio": "40%"},
        {"client_name": "Virat Kohli", "stock_symbol": "TCS", "holding_value": "₹45 Cr", "percentage_of_portfolio": "46%"},
        {"client_name": "Priyanka Chopra", "stock_symbol": "US_TECH", "holding_value": "₹40 Cr", "percentage_of_portfolio": "53%"},
        {"client_name": "Hardik Pandya", "stock_symbol": "TECH_STOCKS", "holding_value": "₹25 Cr", "percentage_of_portfolio": "42%"}
    ]))
}

fn client_profiles() -> TablePayload {
    rows(json!([
        {"name": "Shah Rukh Khan", "age": 58, "city": "Mumbai", "profession": "Film Actor", "risk_appetite": "Moderate", "portfolio_value": "₹125 Cr"},
        {"name": "Deepika Padukone", "age": 38, "city": "Mumbai", "profession": "Film Actress", "risk_appetite": "Conservative", "portfolio_value": "₹87 Cr"},
        {"name": "Rohit Sharma", "age": 36, "city": "Mumbai", "profession": "Cricket Player", "risk_appetite": "Moderate", "portfolio_value": "₹65 Cr"},
        {"name": "Alia Bhatt", "age": 30, "city": "Mumbai", "profession": "Film Actress", "risk_appetite": "High", "portfolio_value": "₹45 Cr"}
    ]))
}

fn general_metrics() -> TablePayload {
    rows(json!([
        {"metric": "Total AUM", "value": "₹1,050 Cr", "growth": "+12.5%", "status": "Strong"},
        {"metric": "Active Clients", "value": "55", "growth": "+8.2%", "status": "Growing"},
        {"metric": "Avg Portfolio Size", "value": "₹19.1 Cr", "growth": "+15.3%", "status": "Excellent"},
        {"metric": "Client Satisfaction", "value": "94%", "growth": "+2.1%", "status": "Outstanding"}
    ]))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SUBCATEGORIES: [&str; 5] = [
        "top_portfolios",
        "rm_performance",
        "stock_holdings",
        "client_profiles",
        "general_metrics",
    ];

    #[test]
    fn every_canned_table_is_well_formed() {
        let catalog = TableCatalog::default();
        for subcategory in SUBCATEGORIES {
            let table = catalog.build(subcategory).unwrap();
            assert!(!table.is_empty(), "{subcategory}");
        }
    }

    #[test]
    fn top_portfolios_has_five_ranked_rows() {
        let catalog = TableCatalog::default();
        let table = catalog.lookup("top_portfolios");
        assert_eq!(table.len(), 5);
        for (i, row) in table.rows.iter().enumerate() {
            for column in ["rank", "client_name", "portfolio_value", "primary_asset", "rm"] {
                assert!(row.contains_key(column), "row {i} lacks {column}");
            }
            assert_eq!(row["rank"], i + 1);
        }
    }

    #[test]
    fn unknown_subcategory_uses_fallback() {
        let catalog = TableCatalog::default();
        assert_eq!(catalog.lookup("nope"), catalog.lookup("general_metrics"));
        assert_eq!(catalog.lookup("nope").rows[0]["metric"], "Total AUM");
    }

    #[test]
    fn non_object_rows_are_dropped() {
        let table = rows(json!([{"a": 1}, 2, "three"]));
        assert_eq!(table.len(), 1);
        assert!(rows(json!({"a": 1})).is_empty());
    }

    #[test]
    fn empty_table_fails_to_build() {
        let catalog = TableCatalog::default().with_entry("empty", rows(json!([])));
        assert_eq!(catalog.build("empty"), Err(BuildError::EmptyTable));
    }
}
