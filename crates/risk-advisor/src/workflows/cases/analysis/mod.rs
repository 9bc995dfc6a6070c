mod config;
mod occupation;
mod rules;

pub use config::AnalysisConfig;
pub use occupation::OwnershipKeywords;

use super::domain::CustomerProfile;
use rules::{RuleInput, RULE_CATALOG};
use serde::{Deserialize, Serialize};

/// Ordinal rank of a finding. Critical outranks High, High outranks Medium.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
}

impl Severity {
    pub const ALL: [Severity; 4] = [
        Severity::Critical,
        Severity::High,
        Severity::Medium,
        Severity::Low,
    ];

    /// Sort key: 1 for Critical through 4 for Low.
    pub fn rank(self) -> u8 {
        match self {
            Severity::Critical => 1,
            Severity::High => 2,
            Severity::Medium => 3,
            Severity::Low => 4,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }
}

/// The fixed catalog of risk categories the engine can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskCategory {
    ExcessiveDebt,
    PremiumLiquidity,
    ExcessCash,
    ConservativePortfolio,
    KeyPerson,
    DelayedRetirement,
    ChildEducation,
}

impl RiskCategory {
    pub fn severity(self) -> Severity {
        match self {
            RiskCategory::ExcessiveDebt | RiskCategory::KeyPerson => Severity::Critical,
            RiskCategory::PremiumLiquidity
            | RiskCategory::ExcessCash
            | RiskCategory::DelayedRetirement => Severity::High,
            RiskCategory::ConservativePortfolio | RiskCategory::ChildEducation => {
                Severity::Medium
            }
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RiskCategory::ExcessiveDebt => "Excessive Debt",
            RiskCategory::PremiumLiquidity => "Liquidity Risk (premium burden)",
            RiskCategory::ExcessCash => "Inflation Risk (excess cash)",
            RiskCategory::ConservativePortfolio => "Conservative Portfolio Risk",
            RiskCategory::KeyPerson => "Key-Person Business Risk",
            RiskCategory::DelayedRetirement => "Delayed Retirement Planning",
            RiskCategory::ChildEducation => "Child Education Funding Risk",
        }
    }

    pub fn recommended_products(self) -> &'static [&'static str] {
        match self {
            RiskCategory::ExcessiveDebt => {
                &["Debt consolidation loan", "Credit protection insurance"]
            }
            RiskCategory::PremiumLiquidity => &[
                "Unit-linked plan (lower premium, builds cash value)",
                "Tax-deductible health insurance",
            ],
            RiskCategory::ExcessCash => &[
                "Low-to-moderate risk mutual funds",
                "Unit-linked insurance",
            ],
            RiskCategory::ConservativePortfolio => &[
                "Balanced or equity funds for growth",
                "Investment-focused unit-linked plan",
            ],
            RiskCategory::KeyPerson => &["Key-person insurance", "Estate planning life insurance"],
            RiskCategory::DelayedRetirement => {
                &["Retirement mutual fund (RMF)", "Annuity insurance"]
            }
            RiskCategory::ChildEducation => &[
                "Child education fund",
                "Endowment policy for education",
            ],
        }
    }
}

/// One fired rule, with the figures that triggered it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskFinding {
    pub severity: Severity,
    pub category: RiskCategory,
    pub name: String,
    pub rationale: String,
    pub recommended_products: Vec<String>,
}

impl RiskFinding {
    fn new(category: RiskCategory, rationale: String) -> Self {
        Self {
            severity: category.severity(),
            category,
            name: category.label().to_string(),
            rationale,
            recommended_products: category
                .recommended_products()
                .iter()
                .map(|product| product.to_string())
                .collect(),
        }
    }
}

/// Totals derived once per evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FinancialAggregates {
    pub annual_income: f64,
    pub total_debt: f64,
    pub total_liquid_assets: f64,
    pub total_invested_assets: f64,
    pub total_portfolio: f64,
    pub total_annual_premium: f64,
}

impl FinancialAggregates {
    pub fn from_profile(profile: &CustomerProfile) -> Self {
        let finances = &profile.finances;
        let total_liquid_assets = finances.savings + finances.time_deposits;
        let total_invested_assets = finances.funds;

        Self {
            annual_income: profile.customer.monthly_income * 12.0,
            total_debt: finances.home_loan + finances.car_loan + finances.personal_loan,
            total_liquid_assets,
            total_invested_assets,
            total_portfolio: total_liquid_assets + total_invested_assets,
            total_annual_premium: profile.total_annual_premium(),
        }
    }
}

/// Stateless evaluator that applies the rule catalog to a profile.
#[derive(Debug, Clone, Default)]
pub struct RiskEngine {
    config: AnalysisConfig,
}

impl RiskEngine {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Evaluates every rule once and returns the fired findings, Critical first.
    ///
    /// Findings of equal severity keep catalog order. An empty list means the
    /// customer is a stable client.
    pub fn evaluate(&self, profile: &CustomerProfile) -> Vec<RiskFinding> {
        let aggregates = FinancialAggregates::from_profile(profile);
        self.evaluate_with(profile, &aggregates)
    }

    pub fn analyze(&self, profile: &CustomerProfile) -> AnalysisReport {
        let aggregates = FinancialAggregates::from_profile(profile);
        let findings = self.evaluate_with(profile, &aggregates);
        AnalysisReport {
            aggregates,
            findings,
        }
    }

    fn evaluate_with(
        &self,
        profile: &CustomerProfile,
        aggregates: &FinancialAggregates,
    ) -> Vec<RiskFinding> {
        let input = RuleInput {
            profile,
            aggregates,
            config: &self.config,
        };

        let mut findings: Vec<RiskFinding> = RULE_CATALOG
            .iter()
            .filter_map(|rule| {
                rule.check(&input)
                    .map(|rationale| RiskFinding::new(rule.category, rationale))
            })
            .collect();

        // `sort_by_key` is stable, so equal severities keep catalog order.
        findings.sort_by_key(|finding| finding.severity.rank());
        findings
    }
}

/// Evaluation output with the aggregates that fed the rules.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub aggregates: FinancialAggregates,
    pub findings: Vec<RiskFinding>,
}

impl AnalysisReport {
    pub fn stable_client(&self) -> bool {
        self.findings.is_empty()
    }

    pub fn summary(&self) -> String {
        match self.findings.len() {
            0 => "no significant risk detected; stable client".to_string(),
            count => format!(
                "{count} risk(s) detected, highest severity {}",
                self.findings[0].severity.label()
            ),
        }
    }
}
