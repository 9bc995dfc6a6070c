//! Ingestion boundary between the loosely typed intake form and the engine.
//!
//! Form fields arrive as strings or numbers and may be blank. Numbers that are
//! missing or malformed become zero here so the engine only ever sees a fully
//! numeric `CustomerProfile`.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::domain::{
    BusinessInfo, CustomerInfo, CustomerProfile, EmployeeInfo, FamilyInfo, Finances,
    PolicyPremium,
};

const AGGREGATE_POLICY_NAME: &str = "Total Premium";

/// Raw intake form as submitted by the consultant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfileSubmission {
    pub employee: EmployeeSubmission,
    pub customer: CustomerSubmission,
    pub family: FamilySubmission,
    pub business: BusinessSubmission,
    pub finances: FinancesSubmission,
    /// Single aggregate premium figure entered on the form.
    #[serde(deserialize_with = "lenient_amount")]
    pub total_annual_premium: Option<f64>,
    /// Itemized policies; when present they replace the aggregate figure.
    pub policies: Vec<PolicySubmission>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmployeeSubmission {
    pub id: String,
    pub name: String,
    pub region: String,
    pub zone: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomerSubmission {
    pub name: String,
    #[serde(deserialize_with = "lenient_amount")]
    pub age: Option<f64>,
    pub occupation: String,
    #[serde(deserialize_with = "lenient_amount")]
    pub monthly_income: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FamilySubmission {
    pub has_children: bool,
    #[serde(deserialize_with = "lenient_child_ages")]
    pub child_ages: Vec<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BusinessSubmission {
    #[serde(deserialize_with = "lenient_amount")]
    pub ownership_share_percent: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FinancesSubmission {
    #[serde(deserialize_with = "lenient_amount")]
    pub savings: Option<f64>,
    #[serde(deserialize_with = "lenient_amount")]
    pub time_deposits: Option<f64>,
    #[serde(deserialize_with = "lenient_amount")]
    pub funds: Option<f64>,
    #[serde(deserialize_with = "lenient_amount")]
    pub home_loan: Option<f64>,
    #[serde(deserialize_with = "lenient_amount")]
    pub car_loan: Option<f64>,
    #[serde(deserialize_with = "lenient_amount")]
    pub personal_loan: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicySubmission {
    pub name: String,
    #[serde(deserialize_with = "lenient_amount")]
    pub premium: Option<f64>,
}

/// Validation errors raised while building a profile from a submission.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum IntakeError {
    #[error("employee id is required")]
    MissingEmployeeId,
    #[error("employee name is required")]
    MissingEmployeeName,
    #[error("{field} must not be negative (found {value})")]
    NegativeAmount { field: &'static str, value: f64 },
    #[error("ownership share must be between 0 and 100 percent (found {0})")]
    OwnershipShareOutOfRange(f64),
}

/// Builds the engine input from a raw submission.
pub fn profile_from_submission(
    submission: ProfileSubmission,
) -> Result<CustomerProfile, IntakeError> {
    let ProfileSubmission {
        employee,
        customer,
        family,
        business,
        finances,
        total_annual_premium,
        policies,
    } = submission;

    let employee = EmployeeInfo {
        id: employee.id.trim().to_string(),
        name: employee.name.trim().to_string(),
        region: employee.region.trim().to_string(),
        zone: employee.zone.trim().to_string(),
    };
    if employee.id.is_empty() {
        return Err(IntakeError::MissingEmployeeId);
    }
    if employee.name.is_empty() {
        return Err(IntakeError::MissingEmployeeName);
    }

    let age = non_negative("customer age", customer.age)?.trunc() as u32;
    let customer = CustomerInfo {
        name: customer.name.trim().to_string(),
        age,
        occupation: customer.occupation.trim().to_string(),
        monthly_income: non_negative("monthly income", customer.monthly_income)?,
    };

    let share = non_negative("ownership share", business.ownership_share_percent)?;
    if share > 100.0 {
        return Err(IntakeError::OwnershipShareOutOfRange(share));
    }

    let finances = Finances {
        savings: non_negative("savings", finances.savings)?,
        time_deposits: non_negative("time deposits", finances.time_deposits)?,
        funds: non_negative("funds", finances.funds)?,
        home_loan: non_negative("home loan", finances.home_loan)?,
        car_loan: non_negative("car loan", finances.car_loan)?,
        personal_loan: non_negative("personal loan", finances.personal_loan)?,
    };

    let policies = if policies.is_empty() {
        vec![PolicyPremium {
            name: AGGREGATE_POLICY_NAME.to_string(),
            premium: non_negative("annual premium", total_annual_premium)?,
        }]
    } else {
        policies
            .into_iter()
            .map(|policy| {
                Ok(PolicyPremium {
                    name: policy.name.trim().to_string(),
                    premium: non_negative("policy premium", policy.premium)?,
                })
            })
            .collect::<Result<Vec<_>, IntakeError>>()?
    };

    Ok(CustomerProfile {
        employee,
        customer,
        family: FamilyInfo {
            has_children: family.has_children,
            child_ages: family.child_ages,
        },
        business: BusinessInfo {
            ownership_share_percent: share,
        },
        finances,
        policies,
    })
}

fn non_negative(field: &'static str, value: Option<f64>) -> Result<f64, IntakeError> {
    let value = value.unwrap_or(0.0);
    if value < 0.0 {
        return Err(IntakeError::NegativeAmount { field, value });
    }
    Ok(value)
}

/// Parses a comma separated list such as `"5, 20"`, keeping positive whole ages.
pub fn parse_child_ages(raw: &str) -> Vec<u32> {
    raw.split(',')
        .filter_map(|part| parse_number(part.trim()))
        .filter_map(positive_age)
        .collect()
}

fn positive_age(value: f64) -> Option<u32> {
    let age = value.trunc();
    if age >= 1.0 && age <= u32::MAX as f64 {
        Some(age as u32)
    } else {
        None
    }
}

fn parse_number(raw: &str) -> Option<f64> {
    raw.parse::<f64>().ok().filter(|value| value.is_finite())
}

fn number_from_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64().filter(|value| value.is_finite()),
        Value::String(raw) => parse_number(raw.trim()),
        _ => None,
    }
}

fn lenient_amount<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(number_from_value))
}

fn lenient_child_ages<'de, D>(deserializer: D) -> Result<Vec<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let ages = match value {
        Some(Value::String(raw)) => parse_child_ages(&raw),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(number_from_value)
            .filter_map(positive_age)
            .collect(),
        Some(other) => number_from_value(&other)
            .and_then(positive_age)
            .into_iter()
            .collect(),
        None => Vec::new(),
    };
    Ok(ages)
}
