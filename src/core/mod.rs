mod engine;
mod error;
mod scenarios;
mod types;

pub use engine::allocate;
pub use error::PolicyError;
pub use scenarios::{
    Scenario, ScenarioComparison, ScenarioKind, compare_all_scenarios, compare_scenarios,
    max_out_of_pocket_breakdown, run_scenario,
};
pub use types::{
    CostBreakdown, DEFAULT_COINSURANCE_RATE, MAX_AMOUNT, Policy, PolicyConfig, ServiceUsage,
};
