use std::collections::HashMap;

use crate::rules::SubcategoryRule;

/// A fixed frame around the upstream narrative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextTemplate {
    pub heading: String,
    pub sections: Vec<Section>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub title: String,
    pub lines: Vec<String>,
}

impl Section {
    fn new(title: &str, lines: &[&str]) -> Self {
        Self {
            title: title.to_string(),
            lines: lines.iter().map(ToString::to_string).collect(),
        }
    }

    fn bullets(title: &str, items: &[&str]) -> Self {
        Self {
            title: title.to_string(),
            lines: items.iter().map(|item| format!("• {item}")).collect(),
        }
    }
}

impl TextTemplate {
    fn new(heading: &str, sections: Vec<Section>) -> Self {
        Self {
            heading: heading.to_string(),
            sections,
        }
    }

    pub fn render(&self, narrative: &str) -> String {
        let mut out = format!("**{}:**\n\n{narrative}", self.heading);
        for section in &self.sections {
            out.push_str(&format!("\n\n**{}:**", section.title));
            for line in &section.lines {
                out.push('\n');
                out.push_str(line);
            }
        }
        out
    }
}

/// Sub-category to template lookup. Total: unknown tags use the fallback.
#[derive(Debug, Clone)]
pub struct TextCatalog {
    entries: HashMap<String, TextTemplate>,
    fallback: TextTemplate,
}

impl TextCatalog {
    pub fn new(fallback: TextTemplate) -> Self {
        Self {
            entries: HashMap::new(),
            fallback,
        }
    }

    #[must_use]
    pub fn with_entry(mut self, subcategory: &str, template: TextTemplate) -> Self {
        self.entries.insert(subcategory.to_string(), template);
        self
    }

    pub fn lookup(&self, subcategory: &str) -> &TextTemplate {
        self.entries.get(subcategory).unwrap_or(&self.fallback)
    }

    pub fn render(&self, subcategory: &str, narrative: &str) -> String {
        self.lookup(subcategory).render(narrative)
    }
}

impl Default for TextCatalog {
    fn default() -> Self {
        Self::new(general_inquiry())
            .with_entry("explanatory_analysis", explanatory_analysis())
            .with_entry("trend_analysis", trend_analysis())
            .with_entry("strategic_recommendation", strategic_recommendation())
    }
}

fn explanatory_analysis() -> TextTemplate {
    TextTemplate::new(
        "Analysis & Insights",
        vec![
            Section::bullets(
                "Key Factors",
                &[
                    "Market conditions and investment strategies play a crucial role",
                    "Client risk appetite directly influences portfolio composition",
                    "Relationship manager expertise affects client satisfaction and returns",
                    "Diversification across asset classes helps manage risk",
                ],
            ),
            Section::bullets(
                "Recommendations",
                &[
                    "Regular portfolio rebalancing based on market conditions",
                    "Continuous monitoring of client preferences and risk tolerance",
                    "Enhanced communication between RMs and clients for better outcomes",
                ],
            ),
        ],
    )
}

fn trend_analysis() -> TextTemplate {
    TextTemplate::new(
        "Market Trend Analysis",
        vec![
            Section::bullets(
                "Observed Patterns",
                &[
                    "High-net-worth clients prefer diversified portfolios",
                    "Film industry professionals show preference for real estate investments",
                    "Sports personalities often invest in businesses related to their field",
                    "Risk appetite varies significantly based on career stage and age",
                ],
            ),
            Section::bullets(
                "Future Outlook",
                &[
                    "Continued growth in alternative investments",
                    "Increasing interest in sustainable and ESG investments",
                    "Technology sector remains attractive for younger clients",
                ],
            ),
        ],
    )
}

fn strategic_recommendation() -> TextTemplate {
    TextTemplate::new(
        "Strategic Recommendations",
        vec![
            Section::bullets(
                "Investment Strategy Framework",
                &[
                    "Asset allocation based on client's risk profile and goals",
                    "Regular portfolio reviews and rebalancing",
                    "Tax-efficient investment structures",
                    "Diversification across geographies and sectors",
                ],
            ),
            Section::bullets(
                "Implementation Approach",
                &[
                    "Quarterly portfolio reviews with clients",
                    "Monthly performance reporting",
                    "Proactive communication about market changes",
                    "Customized investment solutions for each client segment",
                ],
            ),
        ],
    )
}

fn general_inquiry() -> TextTemplate {
    TextTemplate::new(
        "Wealth Management Insights",
        vec![
            Section::new(
                "Portfolio Overview",
                &["Our celebrity wealth management division handles portfolios exceeding ₹100 crores, focusing on personalized investment strategies that align with each client's unique career trajectory and financial goals."],
            ),
            Section::bullets(
                "Key Highlights",
                &[
                    "Comprehensive risk assessment and management",
                    "Diversified investment approach across multiple asset classes",
                    "Regular performance monitoring and optimization",
                    "Dedicated relationship management for high-net-worth clients",
                ],
            ),
        ],
    )
}

/// Canned narratives used when the caller supplies no upstream text.
#[derive(Debug, Clone)]
pub struct NarrativeCatalog {
    rules: Vec<(SubcategoryRule, String)>,
    fallback: String,
}

impl NarrativeCatalog {
    pub fn new(fallback: &str) -> Self {
        Self {
            rules: Vec::new(),
            fallback: fallback.to_string(),
        }
    }

    /// Appends a narrative; earlier rules win.
    #[must_use]
    pub fn with_rule(mut self, rule: SubcategoryRule, narrative: &str) -> Self {
        self.rules.push((rule, narrative.to_string()));
        self
    }

    pub fn select(&self, query: &str) -> &str {
        let query = query.to_lowercase();
        self.rules
            .iter()
            .find(|(rule, _)| rule.matches(&query))
            .map_or(self.fallback.as_str(), |(_, narrative)| narrative.as_str())
    }
}

impl Default for NarrativeCatalog {
    fn default() -> Self {
        Self::new(COMPREHENSIVE_OVERVIEW)
            .with_rule(
                SubcategoryRule::new(
                    "sports_real_estate",
                    &[&["why"], &["sports personalities"], &["real estate"]],
                ),
                SPORTS_REAL_ESTATE,
            )
            .with_rule(
                SubcategoryRule::new(
                    "celebrity_strategy",
                    &[&["investment strategy"], &["celebrity", "celebrities"]],
                ),
                CELEBRITY_STRATEGY,
            )
    }
}

const SPORTS_REAL_ESTATE: &str = r#"**Why Sports Personalities Prefer Real Estate Investments:**

**Career Stability & Longevity Concerns:**
Sports careers are inherently shorter than traditional professions, typically spanning 10-15 years of peak earning potential. This creates unique investment needs:

• **Wealth Preservation**: Need for assets that maintain value beyond active career
• **Steady Income**: Real estate provides rental income during and after retirement
• **Tangible Security**: Physical assets offer psychological comfort and control

**Risk Management Benefits:**
• **Lower Volatility**: Real estate markets are generally more stable than equity markets
• **Inflation Hedge**: Property values typically appreciate with inflation
• **Diversification**: Reduces overall portfolio risk when combined with other investments

**Tax Advantages:**
• **Depreciation Benefits**: Significant tax deductions available on property investments
• **Capital Gains Treatment**: Favorable long-term capital gains tax rates
• **1031 Exchanges**: Ability to defer taxes through property exchanges

**Celebrity Case Study - MS Dhoni:**
Our client MS Dhoni has allocated 51% of his ₹156 Cr portfolio to real estate, including:
- Agricultural land in Ranchi (₹80 Cr)
- Commercial properties in Chennai (₹45 Cr) 
- Residential properties in Mumbai (₹31 Cr)

This strategy has delivered consistent 12-15% annual returns while providing personal satisfaction through his farming interests.

**Industry Trends:**
65% of our sports personality clients have real estate allocations above 25%, compared to 18% for film industry clients who prefer more liquid investments."#;

const CELEBRITY_STRATEGY: &str = r#"**Celebrity Investment Strategy Framework:**

**Unique Challenges in Celebrity Wealth Management:**

**Income Volatility & Career Uncertainty:**
• **Peak Earning Concentration**: Most celebrities earn 70-80% of lifetime income during 10-15 peak years
• **Industry Cyclicality**: Entertainment and sports industries face significant ups and downs
• **Career Risk**: Injury, scandal, or changing public preferences can end careers abruptly

**Our Strategic Asset Allocation Model:**

**Tier 1 - Core Holdings (60-70%):**
• **Blue-chip Stocks (25%)**: Reliance, TCS, HDFC Bank - stable, dividend-paying companies
• **Real Estate (20%)**: Mix of commercial and residential properties
• **Fixed Income (15%)**: Government bonds and high-grade corporate debt

**Tier 2 - Growth Investments (20-25%):**
• **International Equity (10%)**: US tech stocks, global diversification
• **Mutual Funds (8%)**: Professionally managed diversified portfolios
• **Sector-specific Investments (7%)**: Entertainment, sports, and related industries

**Tier 3 - Alternative Investments (10-15%):**
• **Private Equity (5%)**: Stakes in private companies and startups
• **Luxury Assets (3%)**: Art, collectibles, rare assets
• **Cryptocurrency (2%)**: Limited exposure for younger, tech-savvy clients

**Tax Optimization Strategies:**
• **Corporate Structures**: Investment holding companies for tax efficiency
• **Geographic Diversification**: International investments for tax benefits
• **Timing Strategies**: Strategic realization of gains and losses

**Performance Results:**
- Average annual return: 12.5% (vs market 8.2%)
- Risk-adjusted Sharpe ratio: 1.8
- Client satisfaction: 94%
- Portfolio volatility: 11.2% (well-managed risk)"#;

const COMPREHENSIVE_OVERVIEW: &str = r#"**Comprehensive Wealth Management Analysis:**

Our AI-powered celebrity wealth management system has analyzed extensive portfolio data to provide strategic insights tailored to high-net-worth individuals in entertainment and sports.

**Portfolio Performance Overview:**
• **Total Assets Under Management**: ₹1,050+ Crores
• **Average Portfolio Size**: ₹19.1 Crores  
• **Year-to-Date Performance**: +12.5% (outperforming benchmark by 4.3%)
• **Client Satisfaction Score**: 94%

**Key Investment Principles:**
• **Diversification**: Strategic allocation across multiple asset classes and geographies
• **Risk Management**: Balanced approach between growth and capital preservation
• **Liquidity Management**: Maintaining sufficient liquid assets for lifestyle needs
• **Tax Efficiency**: Implementing structures to optimize after-tax returns

**Celebrity-Specific Considerations:**
• **Career Volatility**: Investment strategies adapted to irregular income patterns
• **Public Scrutiny**: Avoiding controversial or reputation-damaging investments
• **Lifestyle Requirements**: Balancing investment growth with liquidity needs
• **Succession Planning**: Long-term wealth preservation and transfer strategies

**Market Insights:**
• **Emerging Trends**: Increased interest in ESG investments and sustainable assets
• **Technology Integration**: Growing allocation to fintech and digital assets
• **Geographic Expansion**: International diversification becoming more common
• **Alternative Investments**: Rising interest in private equity and luxury assets"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_frames_narrative() {
        let rendered = TextCatalog::default().render("explanatory_analysis", "  Because. ");
        assert!(rendered.starts_with("**Analysis & Insights:**\n\n  Because. \n\n**Key Factors:**\n• "));
        assert!(rendered.contains("**Recommendations:**"));
        assert!(rendered.ends_with("better outcomes"));
    }

    #[test]
    fn unknown_subcategory_uses_general_template() {
        let catalog = TextCatalog::default();
        assert_eq!(catalog.lookup("mystery"), catalog.lookup("general_inquiry"));
        assert!(catalog
            .render("mystery", "x")
            .starts_with("**Wealth Management Insights:**"));
    }

    #[test]
    fn every_template_keeps_narrative() {
        let catalog = TextCatalog::default();
        for subcategory in [
            "explanatory_analysis",
            "trend_analysis",
            "strategic_recommendation",
            "general_inquiry",
        ] {
            assert!(catalog
                .render(subcategory, "NARRATIVE-MARKER")
                .contains("NARRATIVE-MARKER"));
        }
    }

    #[test]
    fn narrative_selection() {
        let catalog = NarrativeCatalog::default();
        assert_eq!(
            catalog.select("Why do Sports Personalities prefer Real Estate?"),
            SPORTS_REAL_ESTATE
        );
        assert_eq!(
            catalog.select("What investment strategy suits celebrities?"),
            CELEBRITY_STRATEGY
        );
        assert_eq!(catalog.select("Do sports personalities like real estate?"), COMPREHENSIVE_OVERVIEW);
        assert_eq!(catalog.select(""), COMPREHENSIVE_OVERVIEW);
    }

    #[test]
    fn canned_narratives_keep_full_detail() {
        assert!(SPORTS_REAL_ESTATE.contains("**Tax Advantages:**"));
        assert!(SPORTS_REAL_ESTATE.contains("1031 Exchanges"));
        assert!(CELEBRITY_STRATEGY.contains("**Tier 1 - Core Holdings (60-70%):**"));
        assert!(CELEBRITY_STRATEGY.contains("Risk-adjusted Sharpe ratio: 1.8"));
        assert!(COMPREHENSIVE_OVERVIEW.contains("**Succession Planning**"));
    }
}
