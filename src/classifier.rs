use std::fmt;

use regex::Regex;
use tracing::debug;

use crate::rules::{
    contains_any, first_match, ClassifierRules, RulesError, CHART_FALLBACK,
    QUERY_CATEGORY_FALLBACK, TABLE_FALLBACK, TEXT_FALLBACK,
};

/// Upstream narratives that look like listings or tables.
const STRUCTURED_DATA_PATTERNS: [&str; 3] = [
    r"\d+\.\s+\w+.*:\s*[\d,]+",
    r"\w+:\s*[\d,]+.*\w+:\s*[\d,]+",
    r"\|\s*\w+\s*\|\s*\w+\s*\|",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    Chart,
    Table,
    Text,
}

impl Shape {
    pub fn as_str(self) -> &'static str {
        match self {
            Shape::Chart => "chart",
            Shape::Table => "table",
            Shape::Text => "text",
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationResult {
    pub shape: Shape,
    pub subcategory: String,
}

/// The seam through which the payload builder reaches classification.
pub trait QueryClassifier: Send + Sync {
    /// Decides shape and sub-category for one request.
    fn classify_request(&self, query: &str, upstream_text: Option<&str>) -> ClassificationResult;

    /// Sub-category pass alone, for a shape decided elsewhere.
    fn subcategory_for(&self, shape: Shape, query: &str) -> String;

    /// The `query_category` tag attached to text responses.
    fn categorize(&self, query: &str) -> String;
}

/// Keyword classifier over one canonical rule table.
#[derive(Debug, Clone)]
pub struct Classifier {
    rules: ClassifierRules,
    structured: Vec<Regex>,
}

impl Classifier {
    /// # Errors
    ///
    /// Returns an error if the rule table fails validation.
    pub fn new(rules: ClassifierRules) -> Result<Self, RulesError> {
        rules.validate()?;
        let structured = STRUCTURED_DATA_PATTERNS
            .iter()
            .map(|pattern| Regex::new(pattern))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| RulesError::Pattern(e.to_string()))?;
        Ok(Self { rules, structured })
    }

    pub fn rules(&self) -> &ClassifierRules {
        &self.rules
    }

    pub fn classify(&self, query: &str) -> ClassificationResult {
        self.classify_with_upstream(query, None)
    }

    pub fn classify_with_upstream(
        &self,
        query: &str,
        upstream_text: Option<&str>,
    ) -> ClassificationResult {
        let query = query.to_lowercase();
        let shape = if self.is_chart(&query) {
            Shape::Chart
        } else if self.is_table(&query, upstream_text) {
            Shape::Table
        } else {
            Shape::Text
        };
        let subcategory = self.subcategory_in(shape, &query).to_string();
        debug!(%shape, %subcategory, "Classified query");

        ClassificationResult { shape, subcategory }
    }

    pub fn subcategory_for(&self, shape: Shape, query: &str) -> String {
        self.subcategory_in(shape, &query.to_lowercase())
            .to_string()
    }

    pub fn categorize(&self, query: &str) -> String {
        first_match(&self.rules.query_categories, &query.to_lowercase())
            .unwrap_or(QUERY_CATEGORY_FALLBACK)
            .to_string()
    }

    /// Whether `text` carries a numbered listing, repeated `key: number`
    /// pairs or a pipe table.
    pub fn contains_structured_data(&self, text: &str) -> bool {
        self.structured.iter().any(|re| re.is_match(text))
    }

    fn is_chart(&self, query: &str) -> bool {
        if contains_any(query, &self.rules.strong_chart) {
            return true;
        }
        let score = self
            .rules
            .weak_chart
            .iter()
            .filter(|kw| query.contains(kw.as_str()))
            .count();
        score >= self.rules.weak_chart_threshold
    }

    fn is_table(&self, query: &str, upstream_text: Option<&str>) -> bool {
        if contains_any(query, &self.rules.avoid_table) {
            return false;
        }
        contains_any(query, &self.rules.table)
            || (self.rules.promote_structured_upstream
                && upstream_text.is_some_and(|text| self.contains_structured_data(text)))
    }

    fn subcategory_in(&self, shape: Shape, query: &str) -> &str {
        let (rules, fallback) = match shape {
            Shape::Chart => (&self.rules.chart_subcategories, CHART_FALLBACK),
            Shape::Table => (&self.rules.table_subcategories, TABLE_FALLBACK),
            Shape::Text => (&self.rules.text_subcategories, TEXT_FALLBACK),
        };
        first_match(rules, query).unwrap_or(fallback)
    }
}

impl QueryClassifier for Classifier {
    fn classify_request(&self, query: &str, upstream_text: Option<&str>) -> ClassificationResult {
        self.classify_with_upstream(query, upstream_text)
    }

    fn subcategory_for(&self, shape: Shape, query: &str) -> String {
        Classifier::subcategory_for(self, shape, query)
    }

    fn categorize(&self, query: &str) -> String {
        Classifier::categorize(self, query)
    }
}
