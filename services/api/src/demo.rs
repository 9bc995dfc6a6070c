use crate::infra::{build_advisory_service, InMemoryCommentNotifier};
use clap::Args;
use risk_advisor::config::AdvisorConfig;
use risk_advisor::error::AppError;
use risk_advisor::workflows::cases::{
    profile_from_submission, AnalysisReport, CaseRecord, ProfileSubmission, RiskEngine,
};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct AnalyzeArgs {
    /// Path to an intake form saved as JSON
    #[arg(long)]
    pub(crate) profile: PathBuf,
    /// Print the full report as JSON instead of text
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Persist demo cases to this JSON snapshot instead of memory.
    #[arg(long)]
    pub(crate) store: Option<PathBuf>,
    /// Skip the CSV export at the end of the demo.
    #[arg(long)]
    pub(crate) skip_export: bool,
}

pub(crate) fn run_analyze(args: AnalyzeArgs) -> Result<(), AppError> {
    let raw = std::fs::read_to_string(&args.profile)?;
    let submission: ProfileSubmission = serde_json::from_str(&raw)?;
    let profile = profile_from_submission(submission)?;
    let report = RiskEngine::default().analyze(&profile);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!(
            "Risk analysis for {} (employee {})",
            profile.customer.name, profile.employee.id
        );
        render_report(&report);
    }
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let config = AdvisorConfig {
        case_store: args.store,
        ..AdvisorConfig::default()
    };
    let notifier = InMemoryCommentNotifier::default();
    let service = build_advisory_service(&config, Arc::new(notifier.clone()))?;

    println!("Risk advisor demo");
    let mut stored = Vec::new();
    for submission in sample_submissions()? {
        let record = service.submit(submission)?;
        println!(
            "\nCase {} | customer {} | consultant {} ({})",
            record.id,
            record.profile.customer.name,
            record.profile.employee.name,
            record.profile.employee.id
        );
        render_report(&service.analyze(&record.profile));
        stored.push(record);
    }

    println!("\nCase visibility");
    let owner_view = service.search("", "E1001")?;
    let reviewer_view = service.search("", &config.reviewer_code)?;
    println!("- consultant E1001 sees {} case(s)", owner_view.len());
    println!("- reviewer sees {} case(s)", reviewer_view.len());

    if let Some(record) = stored.iter().find(|record| !record.findings.is_empty()) {
        let guidance = top_risk_guidance(record);
        service.add_comment(&record.id, &config.reviewer_code, &guidance)?;
        println!("\nReviewer comment on {}: {guidance}", record.id);
        for notice in notifier.notices() {
            println!("  notify {}: {}", notice.employee_id, notice.message());
        }
    }

    let dashboard = service.dashboard(&config.admin_passcode)?;
    println!("\nAdmin dashboard");
    println!(
        "- {} case(s), {} finding(s)",
        dashboard.total_cases, dashboard.total_findings
    );
    println!(
        "- top consultant: {} ({} case(s))",
        dashboard.top_employee.name, dashboard.top_employee.case_count
    );
    for entry in &dashboard.severity_distribution {
        println!("  - {}: {}", entry.severity_label, entry.count);
    }

    if !args.skip_export {
        println!("\nCSV export");
        print!("{}", service.export_csv(&config.admin_passcode)?);
    }

    Ok(())
}

fn render_report(report: &AnalysisReport) {
    println!("  {}", report.summary());
    for finding in &report.findings {
        println!("  [{}] {}", finding.severity.label(), finding.name);
        println!("      {}", finding.rationale);
        println!(
            "      suggested: {}",
            finding.recommended_products.join(", ")
        );
    }
}

fn top_risk_guidance(record: &CaseRecord) -> String {
    match record.top_finding() {
        Some(finding) => format!(
            "Lead with {} for the {} finding",
            finding
                .recommended_products
                .first()
                .map(String::as_str)
                .unwrap_or("a product review"),
            finding.name
        ),
        None => "Stable client; schedule an annual review".to_string(),
    }
}

fn sample_submissions() -> Result<Vec<ProfileSubmission>, AppError> {
    let forms = [
        json!({
            "employee": { "id": "E1001", "name": "Anong Srisuk", "region": "RH-North", "zone": "Z3" },
            "customer": { "name": "Kittipong Wong", "age": 35, "occupation": "Software engineer", "monthlyIncome": 50000 },
            "finances": { "savings": 200000, "timeDeposits": 100000, "funds": 300000, "homeLoan": 1000000 },
            "totalAnnualPremium": 60000
        }),
        json!({
            "employee": { "id": "E1001", "name": "Anong Srisuk", "region": "RH-North", "zone": "Z3" },
            "customer": { "name": "Prasert Chaiyo", "age": 48, "occupation": "เจ้าของกิจการ ร้านอาหาร", "monthlyIncome": 80000 },
            "family": { "hasChildren": true, "childAges": "12, 24" },
            "business": { "ownershipSharePercent": 70 },
            "finances": { "savings": 150000, "homeLoan": 2500000, "carLoan": 600000 },
            "policies": [
                { "name": "Whole life", "premium": 96000 },
                { "name": "Health", "premium": 48000 }
            ]
        }),
        json!({
            "employee": { "id": "E2002", "name": "Boonmee Kaew", "region": "RH-South", "zone": "Z1" },
            "customer": { "name": "Malee Chai", "age": 29, "occupation": "Teacher", "monthlyIncome": 30000 },
            "finances": { "savings": 2000000, "timeDeposits": 100000 },
            "totalAnnualPremium": 12000
        }),
    ];

    forms
        .into_iter()
        .map(|form| serde_json::from_value(form).map_err(AppError::from))
        .collect()
}
