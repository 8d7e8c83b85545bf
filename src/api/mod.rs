use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::core::{
    CostBreakdown, Policy, PolicyConfig, PolicyError, ScenarioKind, ServiceUsage, allocate,
    compare_scenarios,
};

mod report;

pub use report::{format_currency, render_breakdown, render_comparison, render_summary_table};

const CUSTOM_USAGE_TITLE: &str = "Custom Usage";

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliScenario {
    PreventiveOnly,
    ModerateUse,
    HighUse,
    MaxOutOfPocket,
}

impl From<CliScenario> for ScenarioKind {
    fn from(value: CliScenario) -> Self {
        match value {
            CliScenario::PreventiveOnly => ScenarioKind::PreventiveOnly,
            CliScenario::ModerateUse => ScenarioKind::ModerateUse,
            CliScenario::HighUse => ScenarioKind::HighUse,
            CliScenario::MaxOutOfPocket => ScenarioKind::MaxOutOfPocket,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum OutputFormat {
    Text,
    Table,
    Json,
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error("failed to read policy file {path}: {source}")]
    ReadPolicyFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid policy file {path}: {source}")]
    ParsePolicyFile {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("--copay expects CATEGORY=AMOUNT, got '{0}'")]
    InvalidCopay(String),

    #[error("--service expects CATEGORY:COUNT:UNIT_COST, got '{0}'")]
    InvalidService(String),

    #[error(transparent)]
    Policy(#[from] PolicyError),

    #[error("failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(
    name = "carecost",
    about = "Annual healthcare cost estimator (premium + copays + deductible + coinsurance, capped at the out-of-pocket maximum)"
)]
struct Cli {
    #[arg(
        long,
        help = "JSON policy file; fields it omits take the built-in defaults (coinsurance 0.20, everything else 0)"
    )]
    policy_file: Option<PathBuf>,
    #[arg(long, help = "Annual premium, overrides the policy file")]
    annual_premium: Option<Decimal>,
    #[arg(long, help = "Annual deductible, overrides the policy file")]
    deductible: Option<Decimal>,
    #[arg(long, help = "Out-of-pocket maximum, overrides the policy file")]
    out_of_pocket_max: Option<Decimal>,
    #[arg(long, help = "Coinsurance as a fraction, e.g. 0.2 for 20%")]
    coinsurance_rate: Option<Decimal>,
    #[arg(
        long = "copay",
        value_name = "CATEGORY=AMOUNT",
        help = "Add or replace a copay schedule entry (repeatable)"
    )]
    copays: Vec<String>,
    #[arg(
        long = "service",
        value_name = "CATEGORY:COUNT:UNIT_COST",
        help = "Price a custom service list instead of the preset scenarios (repeatable)"
    )]
    services: Vec<String>,
    #[arg(
        long = "scenario",
        value_enum,
        help = "Restrict the comparison to these presets (repeatable); defaults to all four"
    )]
    scenarios: Vec<CliScenario>,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CustomUsageResponse<'a> {
    policy: &'a Policy,
    services: &'a [ServiceUsage],
    costs: CostBreakdown,
}

/// The illustrative policy used when no policy file is given:
/// $400/month premium, $2,000 deductible, $6,000 out-of-pocket maximum.
pub fn example_policy_config() -> PolicyConfig {
    PolicyConfig {
        annual_premium: dec!(4800),
        deductible: dec!(2000),
        out_of_pocket_max: dec!(6000),
        copay_schedule: [
            ("primary_care", dec!(25)),
            ("specialist", dec!(50)),
            ("urgent_care", dec!(75)),
            ("emergency_room", dec!(300)),
        ]
        .into_iter()
        .map(|(category, copay)| (category.to_string(), copay))
        .collect(),
        coinsurance_rate: dec!(0.20),
    }
}

pub fn load_policy_config(path: &Path) -> Result<PolicyConfig, CliError> {
    let raw = fs::read_to_string(path).map_err(|source| CliError::ReadPolicyFile {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| CliError::ParsePolicyFile {
        path: path.to_path_buf(),
        source,
    })
}

pub fn run_cli() -> Result<(), CliError> {
    let cli = Cli::parse();
    let output = run(&cli)?;
    print!("{output}");
    Ok(())
}

fn run(cli: &Cli) -> Result<String, CliError> {
    let policy = build_policy(cli)?;
    debug!(?policy, "policy ready");

    if !cli.services.is_empty() {
        let services = cli
            .services
            .iter()
            .map(|raw| parse_service(raw))
            .collect::<Result<Vec<_>, _>>()?;
        return render_custom_usage(cli.format, &policy, &services);
    }

    let kinds = if cli.scenarios.is_empty() {
        ScenarioKind::ALL.to_vec()
    } else {
        cli.scenarios.iter().map(|&s| s.into()).collect()
    };
    let comparison = compare_scenarios(&policy, &kinds);

    Ok(match cli.format {
        OutputFormat::Text => render_comparison(&comparison),
        OutputFormat::Table => render_summary_table(
            comparison
                .scenarios
                .iter()
                .map(|s| (s.title.as_str(), &s.costs)),
        ),
        OutputFormat::Json => format!("{}\n", serde_json::to_string_pretty(&comparison)?),
    })
}

fn build_policy(cli: &Cli) -> Result<Policy, CliError> {
    let mut config = match &cli.policy_file {
        Some(path) => {
            info!(path = %path.display(), "loading policy file");
            load_policy_config(path)?
        }
        None => example_policy_config(),
    };

    if let Some(v) = cli.annual_premium {
        config.annual_premium = v;
    }
    if let Some(v) = cli.deductible {
        config.deductible = v;
    }
    if let Some(v) = cli.out_of_pocket_max {
        config.out_of_pocket_max = v;
    }
    if let Some(v) = cli.coinsurance_rate {
        config.coinsurance_rate = v;
    }
    for raw in &cli.copays {
        let (category, copay) = parse_copay(raw)?;
        config.copay_schedule.insert(category, copay);
    }

    Ok(config.build()?)
}

fn parse_copay(raw: &str) -> Result<(String, Decimal), CliError> {
    let invalid = || CliError::InvalidCopay(raw.to_string());
    let (category, amount) = raw.split_once('=').ok_or_else(invalid)?;
    let category = category.trim();
    if category.is_empty() {
        return Err(invalid());
    }
    let amount = amount.trim().parse::<Decimal>().map_err(|_| invalid())?;
    Ok((category.to_string(), amount))
}

fn parse_service(raw: &str) -> Result<ServiceUsage, CliError> {
    let invalid = || CliError::InvalidService(raw.to_string());
    let mut parts = raw.splitn(3, ':');
    let (Some(category), Some(count), Some(unit_cost)) = (parts.next(), parts.next(), parts.next())
    else {
        return Err(invalid());
    };
    let count = count.trim().parse::<u32>().map_err(|_| invalid())?;
    let unit_cost = unit_cost.trim().parse::<Decimal>().map_err(|_| invalid())?;
    Ok(ServiceUsage::new(category.trim(), count, unit_cost)?)
}

fn describe_services(services: &[ServiceUsage]) -> String {
    if services.is_empty() {
        return "none".to_string();
    }
    services
        .iter()
        .map(|s| {
            format!(
                "{} x{} @ {} ({} billed)",
                s.category(),
                s.count(),
                format_currency(s.unit_cost()),
                format_currency(s.billed_total())
            )
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn render_custom_usage(
    format: OutputFormat,
    policy: &Policy,
    services: &[ServiceUsage],
) -> Result<String, CliError> {
    let costs = allocate(policy, services);
    Ok(match format {
        OutputFormat::Text => {
            render_breakdown(CUSTOM_USAGE_TITLE, &describe_services(services), &costs)
        }
        OutputFormat::Table => render_summary_table([(CUSTOM_USAGE_TITLE, &costs)]),
        OutputFormat::Json => {
            let response = CustomUsageResponse {
                policy,
                services,
                costs,
            };
            format!("{}\n", serde_json::to_string_pretty(&response)?)
        }
    })
}
