use std::collections::BTreeMap;

use chrono::Datelike;
use serde::Serialize;

use super::analysis::Severity;
use super::domain::CaseRecord;

const UNKNOWN_EMPLOYEE: &str = "Unknown";
const NOT_AVAILABLE: &str = "N/A";

/// Aggregate view over every stored case, for admins only.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaseDashboard {
    pub total_cases: usize,
    pub total_findings: usize,
    pub top_employee: TopEmployee,
    pub monthly_activity: Vec<MonthlyActivityEntry>,
    pub severity_distribution: Vec<SeverityCount>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopEmployee {
    pub name: String,
    pub case_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyActivityEntry {
    /// `YYYY-MM`
    pub month: String,
    pub case_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeverityCount {
    pub severity: Severity,
    pub severity_label: &'static str,
    pub count: usize,
}

impl CaseDashboard {
    pub fn from_cases(cases: &[CaseRecord]) -> Self {
        let mut monthly: BTreeMap<String, usize> = BTreeMap::new();
        for record in cases {
            let key = format!(
                "{:04}-{:02}",
                record.created_at.year(),
                record.created_at.month()
            );
            *monthly.entry(key).or_default() += 1;
        }

        let severity_distribution = Severity::ALL
            .into_iter()
            .map(|severity| SeverityCount {
                severity,
                severity_label: severity.label(),
                count: cases
                    .iter()
                    .flat_map(|record| record.findings.iter())
                    .filter(|finding| finding.severity == severity)
                    .count(),
            })
            .collect();

        Self {
            total_cases: cases.len(),
            total_findings: cases.iter().map(|record| record.findings.len()).sum(),
            top_employee: top_employee(cases),
            monthly_activity: monthly
                .into_iter()
                .map(|(month, case_count)| MonthlyActivityEntry { month, case_count })
                .collect(),
            severity_distribution,
        }
    }
}

/// Employee with the most cases. On a tie the first name to reach the
/// maximum, walking newest to oldest, keeps the title.
fn top_employee(cases: &[CaseRecord]) -> TopEmployee {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    let mut top = TopEmployee {
        name: NOT_AVAILABLE.to_string(),
        case_count: 0,
    };

    for record in cases {
        let name = record.profile.employee.name.trim();
        let name = if name.is_empty() { UNKNOWN_EMPLOYEE } else { name };
        let count = counts.entry(name).or_default();
        *count += 1;
        if *count > top.case_count {
            top = TopEmployee {
                name: name.to_string(),
                case_count: *count,
            };
        }
    }

    top
}

/// One line of the case export.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaseExportRow {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "Customer_Name")]
    pub customer_name: String,
    #[serde(rename = "Employee_ID")]
    pub employee_id: String,
    #[serde(rename = "Employee_Name")]
    pub employee_name: String,
    #[serde(rename = "Region")]
    pub region: String,
    #[serde(rename = "Zone")]
    pub zone: String,
    #[serde(rename = "Monthly_Income")]
    pub monthly_income: f64,
    #[serde(rename = "Total_Risks_Found")]
    pub total_risks_found: usize,
    #[serde(rename = "Top_Risk")]
    pub top_risk: String,
    #[serde(rename = "Date")]
    pub date: String,
}

impl From<&CaseRecord> for CaseExportRow {
    fn from(record: &CaseRecord) -> Self {
        let profile = &record.profile;
        Self {
            id: record.id.0.clone(),
            customer_name: profile.customer.name.clone(),
            employee_id: profile.employee.id.clone(),
            employee_name: profile.employee.name.clone(),
            region: profile.employee.region.clone(),
            zone: profile.employee.zone.clone(),
            monthly_income: profile.customer.monthly_income,
            total_risks_found: record.findings.len(),
            top_risk: record
                .top_finding()
                .map(|finding| finding.name.clone())
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            date: record.created_at.date_naive().format("%Y-%m-%d").to_string(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("csv export failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("csv export produced invalid utf-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
}

/// Renders every case as CSV, header row included.
pub fn export_csv(cases: &[CaseRecord]) -> Result<String, ReportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    if cases.is_empty() {
        writer.write_record(CSV_HEADERS)?;
    }
    for record in cases {
        writer.serialize(CaseExportRow::from(record))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|err| ReportError::Csv(err.into_error().into()))?;
    Ok(String::from_utf8(bytes)?)
}

const CSV_HEADERS: [&str; 10] = [
    "ID",
    "Customer_Name",
    "Employee_ID",
    "Employee_Name",
    "Region",
    "Zone",
    "Monthly_Income",
    "Total_Risks_Found",
    "Top_Risk",
    "Date",
];
