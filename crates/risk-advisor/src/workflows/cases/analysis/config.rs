use serde::{Deserialize, Serialize};

use super::occupation::OwnershipKeywords;

/// Thresholds applied by the rule catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Debt above this multiple of annual income is critical.
    pub max_debt_to_income_multiple: f64,
    pub max_premium_to_income_ratio: f64,
    /// Liquid assets above this multiple of annual income lose to inflation.
    pub max_liquid_to_income_multiple: f64,
    pub max_liquid_portfolio_share: f64,
    pub retirement_planning_age: u32,
    pub education_age_min: u32,
    pub education_age_max: u32,
    pub controlling_share_percent: f64,
    pub ownership_keywords: OwnershipKeywords,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            max_debt_to_income_multiple: 3.0,
            max_premium_to_income_ratio: 0.15,
            max_liquid_to_income_multiple: 5.0,
            max_liquid_portfolio_share: 0.70,
            retirement_planning_age: 45,
            education_age_min: 1,
            education_age_max: 18,
            controlling_share_percent: 50.0,
            ownership_keywords: OwnershipKeywords::default(),
        }
    }
}
