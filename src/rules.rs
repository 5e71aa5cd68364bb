use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Sub-category used when no chart rule matches.
pub(crate) const CHART_FALLBACK: &str = "default";
/// Sub-category used when no table rule matches.
pub(crate) const TABLE_FALLBACK: &str = "general_metrics";
/// Sub-category used when no text rule matches.
pub(crate) const TEXT_FALLBACK: &str = "general_inquiry";
/// Query category used when no category rule matches.
pub(crate) const QUERY_CATEGORY_FALLBACK: &str = "general_inquiry";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum RulesError {
    #[error("Empty keyword in `{0}`")]
    EmptyKeyword(&'static str),

    #[error("Rule `{tag}` in `{list}` has an empty term group")]
    EmptyGroup { list: &'static str, tag: String },

    #[error("Rule in `{0}` has no tag")]
    MissingTag(&'static str),

    #[error("Weak chart threshold must be at least 1")]
    ZeroThreshold,

    #[error("Invalid structured data pattern: {0}")]
    Pattern(String),
}

/// One ordered sub-category rule.
///
/// The rule matches when every group in `all_of` has at least one of its terms
/// present in the lower-cased query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubcategoryRule {
    pub tag: String,
    pub all_of: Vec<Vec<String>>,
}

impl SubcategoryRule {
    pub(crate) fn new(tag: &str, all_of: &[&[&str]]) -> Self {
        Self {
            tag: tag.to_string(),
            all_of: all_of
                .iter()
                .map(|group| group.iter().map(ToString::to_string).collect())
                .collect(),
        }
    }

    pub fn matches(&self, query: &str) -> bool {
        self.all_of.iter().all(|group| contains_any(query, group))
    }
}

/// The canonical keyword table shared by every classification decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierRules {
    /// Any one of these makes the query a chart.
    pub strong_chart: Vec<String>,
    /// Scored; `weak_chart_threshold` distinct matches make the query a chart.
    pub weak_chart: Vec<String>,
    pub weak_chart_threshold: usize,
    /// Terms reserved for charts. A query containing one is never a table.
    pub avoid_table: Vec<String>,
    pub table: Vec<String>,
    pub chart_subcategories: Vec<SubcategoryRule>,
    pub table_subcategories: Vec<SubcategoryRule>,
    pub text_subcategories: Vec<SubcategoryRule>,
    pub query_categories: Vec<SubcategoryRule>,
    /// Promote text-bound queries to tables when the upstream narrative
    /// already contains structured data.
    pub promote_structured_upstream: bool,
}

impl Default for ClassifierRules {
    fn default() -> Self {
        Self {
            strong_chart: strings(&[
                "breakup of portfolio values",
                "distribution",
                "allocation across",
                "breakdown",
                "percentage",
                "share of",
            ]),
            weak_chart: strings(&[
                "trend",
                "growth",
                "comparison",
                "analysis",
                "proportion",
                "share",
                "split",
                "pie",
                "chart",
                "graph",
                "visual",
                "show me",
                "compare",
                "across",
                "between",
                "among",
                "portfolio values per",
                "breakup",
                "allocation",
            ]),
            weak_chart_threshold: 2,
            avoid_table: strings(&["breakup", "distribution", "allocation", "percentage"]),
            table: strings(&[
                "top",
                "list",
                "show me all",
                "which clients",
                "ranking",
                "performance",
                "highest",
                "lowest",
                "managers",
                "clients",
                "portfolios",
                "compare managers",
                "relationship managers",
            ]),
            chart_subcategories: vec![
                SubcategoryRule::new(
                    "asset_allocation",
                    &[&["asset allocation", "allocation distribution"]],
                ),
                SubcategoryRule::new("rm_distribution", &[&["breakup"], &["relationship manager"]]),
                SubcategoryRule::new("geographic", &[&["geographic", "city"]]),
                SubcategoryRule::new("risk_distribution", &[&["risk appetite"]]),
                SubcategoryRule::new(
                    "risk_distribution",
                    &[&["risk"], &["distribution", "breakdown"]],
                ),
                SubcategoryRule::new("rm_performance", &[&["performance"], &["manager"]]),
            ],
            table_subcategories: vec![
                SubcategoryRule::new("top_portfolios", &[&["top"], &["portfolio"]]),
                SubcategoryRule::new("rm_performance", &[&["relationship manager"], &["top"]]),
                SubcategoryRule::new("stock_holdings", &[&["highest"], &["stock"]]),
                SubcategoryRule::new("client_profiles", &[&["client"], &["mumbai", "profile"]]),
            ],
            text_subcategories: vec![
                SubcategoryRule::new("explanatory_analysis", &[&["why", "explain"]]),
                SubcategoryRule::new("trend_analysis", &[&["trend", "pattern"]]),
                SubcategoryRule::new("strategic_recommendation", &[&["strategy", "approach"]]),
            ],
            query_categories: vec![
                SubcategoryRule::new(
                    "ranking_analysis",
                    &[&["top", "highest", "best", "ranking"]],
                ),
                SubcategoryRule::new(
                    "comparative_analysis",
                    &[&["compare", "comparison", "vs", "versus"]],
                ),
                SubcategoryRule::new("trend_analysis", &[&["trend", "growth", "pattern"]]),
                SubcategoryRule::new("explanatory_analysis", &[&["why", "explain", "reason"]]),
                SubcategoryRule::new(
                    "strategic_recommendation",
                    &[&["strategy", "recommend", "suggest"]],
                ),
            ],
            promote_structured_upstream: false,
        }
    }
}

impl ClassifierRules {
    /// Rejects tables that would match everything or nothing by accident.
    ///
    /// # Errors
    ///
    /// Returns an error if any keyword is blank, any rule has an empty term
    /// group or no tag, or the weak chart threshold is zero.
    pub fn validate(&self) -> Result<(), RulesError> {
        check_keywords("strong_chart", &self.strong_chart)?;
        check_keywords("weak_chart", &self.weak_chart)?;
        check_keywords("avoid_table", &self.avoid_table)?;
        check_keywords("table", &self.table)?;
        check_rules("chart_subcategories", &self.chart_subcategories)?;
        check_rules("table_subcategories", &self.table_subcategories)?;
        check_rules("text_subcategories", &self.text_subcategories)?;
        check_rules("query_categories", &self.query_categories)?;
        if self.weak_chart_threshold == 0 {
            return Err(RulesError::ZeroThreshold);
        }
        Ok(())
    }
}

pub(crate) fn contains_any(text: &str, keywords: &[String]) -> bool {
    keywords.iter().any(|kw| text.contains(kw.as_str()))
}

/// First matching rule wins; earlier rules win ties.
pub(crate) fn first_match<'a>(rules: &'a [SubcategoryRule], query: &str) -> Option<&'a str> {
    rules
        .iter()
        .find(|rule| rule.matches(query))
        .map(|rule| rule.tag.as_str())
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(ToString::to_string).collect()
}

fn check_keywords(list: &'static str, keywords: &[String]) -> Result<(), RulesError> {
    if keywords.iter().any(|kw| kw.trim().is_empty()) {
        return Err(RulesError::EmptyKeyword(list));
    }
    Ok(())
}

fn check_rules(list: &'static str, rules: &[SubcategoryRule]) -> Result<(), RulesError> {
    for rule in rules {
        if rule.tag.trim().is_empty() {
            return Err(RulesError::MissingTag(list));
        }
        if rule.all_of.is_empty() || rule.all_of.iter().any(Vec::is_empty) {
            return Err(RulesError::EmptyGroup {
                list,
                tag: rule.tag.clone(),
            });
        }
        for group in &rule.all_of {
            check_keywords(list, group)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_rules_are_valid() {
        assert_eq!(ClassifierRules::default().validate(), Ok(()));
    }

    #[test]
    fn blank_keyword_is_rejected() {
        let mut rules = ClassifierRules::default();
        rules.table.push("  ".to_string());
        assert_eq!(rules.validate(), Err(RulesError::EmptyKeyword("table")));

        let mut rules = ClassifierRules::default();
        rules.strong_chart.push(String::new());
        assert_eq!(
            rules.validate(),
            Err(RulesError::EmptyKeyword("strong_chart"))
        );
    }

    #[test]
    fn empty_group_is_rejected() {
        let mut rules = ClassifierRules::default();
        rules.text_subcategories.push(SubcategoryRule {
            tag: "anything".to_string(),
            all_of: vec![vec![]],
        });
        assert_eq!(
            rules.validate(),
            Err(RulesError::EmptyGroup {
                list: "text_subcategories",
                tag: "anything".to_string(),
            })
        );

        let mut rules = ClassifierRules::default();
        rules.chart_subcategories.push(SubcategoryRule {
            tag: "everything".to_string(),
            all_of: vec![],
        });
        assert!(matches!(
            rules.validate(),
            Err(RulesError::EmptyGroup { .. })
        ));
    }

    #[test]
    fn blank_term_inside_rule_is_rejected() {
        let mut rules = ClassifierRules::default();
        rules.query_categories[0].all_of[0].push(String::new());
        assert_eq!(
            rules.validate(),
            Err(RulesError::EmptyKeyword("query_categories"))
        );
    }

    #[test]
    fn zero_threshold_is_rejected() {
        let rules = ClassifierRules {
            weak_chart_threshold: 0,
            ..ClassifierRules::default()
        };
        assert_eq!(rules.validate(), Err(RulesError::ZeroThreshold));
    }

    #[test]
    fn rule_needs_every_group() {
        let rule = SubcategoryRule::new("client_profiles", &[&["client"], &["mumbai", "profile"]]);
        assert!(rule.matches("client profiles in mumbai"));
        assert!(rule.matches("list client profile"));
        assert!(!rule.matches("clients in delhi"));
        assert!(!rule.matches("mumbai portfolios"));
    }

    #[test]
    fn earlier_rule_wins() {
        let rules = vec![
            SubcategoryRule::new("first", &[&["top"]]),
            SubcategoryRule::new("second", &[&["top"], &["portfolio"]]),
        ];
        assert_eq!(first_match(&rules, "top portfolio"), Some("first"));
        assert_eq!(first_match(&rules, "bottom"), None);
    }

    #[test]
    fn partial_override_keeps_defaults() {
        let rules: ClassifierRules =
            serde_json::from_str(r#"{ "weak_chart_threshold": 3 }"#).unwrap();
        assert_eq!(rules.weak_chart_threshold, 3);
        assert_eq!(rules.table, ClassifierRules::default().table);
    }
}
