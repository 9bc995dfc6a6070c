use super::super::domain::CustomerProfile;
use super::config::AnalysisConfig;
use super::{FinancialAggregates, RiskCategory};

pub(crate) struct RuleInput<'a> {
    pub profile: &'a CustomerProfile,
    pub aggregates: &'a FinancialAggregates,
    pub config: &'a AnalysisConfig,
}

/// A catalog entry: the category it reports and the check that produces a rationale.
pub(crate) struct RiskRule {
    pub category: RiskCategory,
    check: fn(&RuleInput<'_>) -> Option<String>,
}

impl RiskRule {
    pub fn check(&self, input: &RuleInput<'_>) -> Option<String> {
        (self.check)(input)
    }
}

/// Evaluation order doubles as the tie-break order within a severity.
pub(crate) const RULE_CATALOG: [RiskRule; 7] = [
    RiskRule {
        category: RiskCategory::ExcessiveDebt,
        check: excessive_debt,
    },
    RiskRule {
        category: RiskCategory::PremiumLiquidity,
        check: premium_liquidity,
    },
    RiskRule {
        category: RiskCategory::ExcessCash,
        check: excess_cash,
    },
    RiskRule {
        category: RiskCategory::ConservativePortfolio,
        check: conservative_portfolio,
    },
    RiskRule {
        category: RiskCategory::KeyPerson,
        check: key_person,
    },
    RiskRule {
        category: RiskCategory::DelayedRetirement,
        check: delayed_retirement,
    },
    RiskRule {
        category: RiskCategory::ChildEducation,
        check: child_education,
    },
];

fn excessive_debt(input: &RuleInput<'_>) -> Option<String> {
    let RuleInput {
        aggregates, config, ..
    } = input;
    let income = aggregates.annual_income;
    if income <= 0.0 || aggregates.total_debt <= income * config.max_debt_to_income_multiple {
        return None;
    }

    Some(format!(
        "total debt {} is {:.2}x annual income {}, above the {}x ceiling",
        format_amount(aggregates.total_debt),
        aggregates.total_debt / income,
        format_amount(income),
        config.max_debt_to_income_multiple
    ))
}

fn premium_liquidity(input: &RuleInput<'_>) -> Option<String> {
    let RuleInput {
        aggregates, config, ..
    } = input;
    let income = aggregates.annual_income;
    if income <= 0.0 {
        return None;
    }

    let ratio = aggregates.total_annual_premium / income;
    if ratio <= config.max_premium_to_income_ratio {
        return None;
    }

    Some(format!(
        "annual premium {} is {:.1}% of annual income {} (guideline at most {:.0}%)",
        format_amount(aggregates.total_annual_premium),
        ratio * 100.0,
        format_amount(income),
        config.max_premium_to_income_ratio * 100.0
    ))
}

fn excess_cash(input: &RuleInput<'_>) -> Option<String> {
    let RuleInput {
        aggregates, config, ..
    } = input;
    let ceiling = aggregates.annual_income * config.max_liquid_to_income_multiple;
    if aggregates.total_liquid_assets <= ceiling {
        return None;
    }

    Some(format!(
        "liquid assets {} exceed {}x annual income {}; cash beyond a 3-6 month reserve loses ground to inflation",
        format_amount(aggregates.total_liquid_assets),
        config.max_liquid_to_income_multiple,
        format_amount(aggregates.annual_income)
    ))
}

fn conservative_portfolio(input: &RuleInput<'_>) -> Option<String> {
    let RuleInput {
        aggregates, config, ..
    } = input;
    let portfolio = aggregates.total_portfolio;
    if portfolio <= 0.0 || aggregates.total_invested_assets <= 0.0 {
        return None;
    }

    let liquid_share = aggregates.total_liquid_assets / portfolio;
    if liquid_share <= config.max_liquid_portfolio_share {
        return None;
    }

    Some(format!(
        "liquid assets {} make up {:.1}% of a {} portfolio (above {:.0}%), with only {} invested for growth",
        format_amount(aggregates.total_liquid_assets),
        liquid_share * 100.0,
        format_amount(portfolio),
        config.max_liquid_portfolio_share * 100.0,
        format_amount(aggregates.total_invested_assets)
    ))
}

fn key_person(input: &RuleInput<'_>) -> Option<String> {
    let RuleInput {
        profile, config, ..
    } = input;
    let occupation = &profile.customer.occupation;
    let keyword = config.ownership_keywords.matching(occupation)?;
    let share = profile.business.ownership_share_percent;
    if share <= config.controlling_share_percent {
        return None;
    }

    Some(format!(
        "occupation '{}' marks a business owner ('{}') holding {:.1}% of the company (above {:.0}%); losing the owner would hit both business and family",
        occupation.trim(),
        keyword,
        share,
        config.controlling_share_percent
    ))
}

fn delayed_retirement(input: &RuleInput<'_>) -> Option<String> {
    let RuleInput {
        profile,
        aggregates,
        config,
    } = input;
    let age = profile.customer.age;
    if age < config.retirement_planning_age || aggregates.total_invested_assets != 0.0 {
        return None;
    }

    Some(format!(
        "age {age} is at or past {} with no invested assets set aside for retirement",
        config.retirement_planning_age
    ))
}

fn child_education(input: &RuleInput<'_>) -> Option<String> {
    let RuleInput {
        profile, config, ..
    } = input;
    let family = &profile.family;
    if !family.has_children {
        return None;
    }

    let school_age = config.education_age_min..=config.education_age_max;
    let in_window = family
        .child_ages
        .iter()
        .filter(|age| school_age.contains(*age))
        .count();
    if in_window == 0 {
        return None;
    }

    let ages = family
        .child_ages
        .iter()
        .map(|age| age.to_string())
        .collect::<Vec<_>>()
        .join(", ");

    Some(format!(
        "children aged {ages}; {in_window} within the {}-{} education window will need funding",
        config.education_age_min, config.education_age_max
    ))
}

/// Formats an amount with thousands separators and at most two decimals.
pub(crate) fn format_amount(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    let magnitude = rounded.abs();
    let whole = magnitude.trunc() as u64;
    let cents = ((magnitude - magnitude.trunc()) * 100.0).round() as u64;

    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 4);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    if cents > 0 {
        grouped.push_str(&format!(".{cents:02}"));
    }

    if rounded < 0.0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}
