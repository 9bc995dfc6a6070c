use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::analysis::RiskFinding;

/// Identifier wrapper for stored cases.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CaseId(pub String);

impl std::fmt::Display for CaseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Consultant who owns the case. `id` is also the access-control key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeInfo {
    pub id: String,
    pub name: String,
    pub region: String,
    pub zone: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerInfo {
    pub name: String,
    pub age: u32,
    pub occupation: String,
    pub monthly_income: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FamilyInfo {
    pub has_children: bool,
    pub child_ages: Vec<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessInfo {
    pub ownership_share_percent: f64,
}

/// Balances declared on the intake form, all non-negative.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Finances {
    pub savings: f64,
    pub time_deposits: f64,
    pub funds: f64,
    pub home_loan: f64,
    pub car_loan: f64,
    pub personal_loan: f64,
}

/// Annual premium of one held policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyPremium {
    pub name: String,
    pub premium: f64,
}

/// Validated customer profile consumed by the risk engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerProfile {
    #[serde(rename = "emp")]
    pub employee: EmployeeInfo,
    #[serde(rename = "cust")]
    pub customer: CustomerInfo,
    #[serde(rename = "fam")]
    pub family: FamilyInfo,
    #[serde(rename = "biz")]
    pub business: BusinessInfo,
    #[serde(rename = "fin")]
    pub finances: Finances,
    #[serde(default)]
    pub policies: Vec<PolicyPremium>,
}

impl CustomerProfile {
    /// Annual premium summed across every declared policy.
    pub fn total_annual_premium(&self) -> f64 {
        self.policies.iter().map(|policy| policy.premium).sum()
    }
}

/// Reviewer guidance attached to a case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseComment {
    pub author: String,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

/// Stored snapshot of one completed evaluation plus its comment thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseRecord {
    pub id: CaseId,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub profile: CustomerProfile,
    #[serde(rename = "analysis")]
    pub findings: Vec<RiskFinding>,
    #[serde(default)]
    pub comments: Vec<CaseComment>,
}

impl CaseRecord {
    pub fn owner_id(&self) -> &str {
        &self.profile.employee.id
    }

    pub fn top_finding(&self) -> Option<&RiskFinding> {
        self.findings.first()
    }

    pub fn summary_view(&self) -> CaseSummaryView {
        CaseSummaryView {
            id: self.id.clone(),
            created_at: self.created_at,
            customer_name: self.profile.customer.name.clone(),
            employee_id: self.profile.employee.id.clone(),
            employee_name: self.profile.employee.name.clone(),
            finding_count: self.findings.len(),
            top_risk: self.top_finding().map(|finding| finding.name.clone()),
            comment_count: self.comments.len(),
        }
    }
}

/// Listing row returned by case searches.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaseSummaryView {
    pub id: CaseId,
    pub created_at: DateTime<Utc>,
    pub customer_name: String,
    pub employee_id: String,
    pub employee_name: String,
    pub finding_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_risk: Option<String>,
    pub comment_count: usize,
}
