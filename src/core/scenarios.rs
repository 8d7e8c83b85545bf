use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

use super::engine::allocate;
use super::types::{CostBreakdown, Policy, ServiceUsage};

const MODERATE_USE: [(&str, u32, Decimal); 4] = [
    ("primary_care", 4, dec!(200)),
    ("specialist", 2, dec!(300)),
    ("urgent_care", 1, dec!(400)),
    ("lab_work", 3, dec!(150)),
];

const HIGH_USE: [(&str, u32, Decimal); 6] = [
    ("primary_care", 6, dec!(200)),
    ("specialist", 4, dec!(300)),
    ("emergency_room", 1, dec!(2000)),
    ("outpatient_surgery", 1, dec!(8000)),
    ("imaging", 2, dec!(1500)),
    ("lab_work", 8, dec!(150)),
];

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ScenarioKind {
    PreventiveOnly,
    ModerateUse,
    HighUse,
    MaxOutOfPocket,
}

impl ScenarioKind {
    pub const ALL: [ScenarioKind; 4] = [
        ScenarioKind::PreventiveOnly,
        ScenarioKind::ModerateUse,
        ScenarioKind::HighUse,
        ScenarioKind::MaxOutOfPocket,
    ];

    pub fn title(self) -> &'static str {
        match self {
            ScenarioKind::PreventiveOnly => "Preventive Care Only",
            ScenarioKind::ModerateUse => "Moderate Use",
            ScenarioKind::HighUse => "High Use (Outpatient Surgery)",
            ScenarioKind::MaxOutOfPocket => "Maximum Out-of-Pocket",
        }
    }

    pub fn services_description(self) -> &'static str {
        match self {
            ScenarioKind::PreventiveOnly => "Annual physical, routine screenings",
            ScenarioKind::ModerateUse => {
                "4 PCP visits, 2 specialist visits, 1 urgent care, 3 lab tests"
            }
            ScenarioKind::HighUse => "6 PCP, 4 specialist, 1 ER, outpatient surgery, imaging, labs",
            ScenarioKind::MaxOutOfPocket => "Major medical event (hospitalization, surgery, etc.)",
        }
    }

    /// Billed services behind the preset. Preventive care is assumed free and
    /// the maximum scenario is built directly, so both are empty.
    pub fn services(self) -> Vec<ServiceUsage> {
        let rows: &[(&str, u32, Decimal)] = match self {
            ScenarioKind::PreventiveOnly | ScenarioKind::MaxOutOfPocket => &[],
            ScenarioKind::ModerateUse => &MODERATE_USE,
            ScenarioKind::HighUse => &HIGH_USE,
        };

        rows.iter()
            .filter_map(|&(category, count, unit_cost)| {
                ServiceUsage::new(category, count, unit_cost).ok()
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    pub key: ScenarioKind,
    pub title: String,
    pub services: String,
    pub costs: CostBreakdown,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioComparison {
    pub policy: Policy,
    pub scenarios: Vec<Scenario>,
}

pub fn run_scenario(policy: &Policy, kind: ScenarioKind) -> Scenario {
    let costs = match kind {
        ScenarioKind::MaxOutOfPocket => max_out_of_pocket_breakdown(policy),
        _ => allocate(policy, &kind.services()),
    };

    Scenario {
        key: kind,
        title: kind.title().to_string(),
        services: kind.services_description().to_string(),
        costs,
    }
}

/// Worst case: the deductible is fully paid and coinsurance fills the rest of
/// the out-of-pocket maximum.
pub fn max_out_of_pocket_breakdown(policy: &Policy) -> CostBreakdown {
    CostBreakdown {
        premium: policy.annual_premium(),
        copays_total: Decimal::ZERO,
        deductible_paid: policy.deductible(),
        coinsurance_total: policy.out_of_pocket_max() - policy.deductible(),
        total_out_of_pocket: policy.out_of_pocket_max(),
        total_annual_cost: policy.annual_premium() + policy.out_of_pocket_max(),
        oop_max_reached: true,
    }
}

pub fn compare_scenarios(policy: &Policy, kinds: &[ScenarioKind]) -> ScenarioComparison {
    ScenarioComparison {
        policy: policy.clone(),
        scenarios: kinds.iter().map(|&kind| run_scenario(policy, kind)).collect(),
    }
}

pub fn compare_all_scenarios(policy: &Policy) -> ScenarioComparison {
    compare_scenarios(policy, &ScenarioKind::ALL)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::PolicyConfig;
    use std::collections::BTreeMap;

    fn example_policy() -> Policy {
        PolicyConfig {
            annual_premium: dec!(4800),
            deductible: dec!(2000),
            out_of_pocket_max: dec!(6000),
            copay_schedule: BTreeMap::from([
                ("primary_care".to_string(), dec!(25)),
                ("specialist".to_string(), dec!(50)),
                ("urgent_care".to_string(), dec!(75)),
                ("emergency_room".to_string(), dec!(300)),
            ]),
            coinsurance_rate: dec!(0.20),
        }
        .build()
        .expect("valid policy")
    }

    fn assert_consistent(costs: &CostBreakdown, policy: &Policy) {
        assert!(costs.total_out_of_pocket <= policy.out_of_pocket_max());
        assert_eq!(
            costs.total_annual_cost,
            costs.premium + costs.total_out_of_pocket
        );
        assert_eq!(costs.premium, policy.annual_premium());
    }

    #[test]
    fn preset_service_lists_are_complete() {
        assert!(ScenarioKind::PreventiveOnly.services().is_empty());
        assert!(ScenarioKind::MaxOutOfPocket.services().is_empty());
        assert_eq!(ScenarioKind::ModerateUse.services().len(), 4);
        assert_eq!(ScenarioKind::HighUse.services().len(), 6);
    }

    #[test]
    fn preventive_costs_only_premium() {
        let policy = example_policy();
        let scenario = run_scenario(&policy, ScenarioKind::PreventiveOnly);

        assert_eq!(scenario.costs.total_out_of_pocket, dec!(0));
        assert_eq!(scenario.costs.total_annual_cost, dec!(4800));
        assert!(!scenario.costs.oop_max_reached);
        assert_consistent(&scenario.costs, &policy);
    }

    #[test]
    fn moderate_use_matches_hand_calculation() {
        let policy = example_policy();
        let scenario = run_scenario(&policy, ScenarioKind::ModerateUse);

        assert_eq!(scenario.costs.copays_total, dec!(275));
        assert_eq!(scenario.costs.deductible_paid, dec!(450));
        assert_eq!(scenario.costs.coinsurance_total, dec!(0));
        assert_eq!(scenario.costs.total_out_of_pocket, dec!(725));
        assert_eq!(scenario.costs.total_annual_cost, dec!(5525));
        assert_consistent(&scenario.costs, &policy);
    }

    #[test]
    fn high_use_matches_hand_calculation() {
        let policy = example_policy();
        let scenario = run_scenario(&policy, ScenarioKind::HighUse);

        assert_eq!(scenario.costs.copays_total, dec!(650));
        assert_eq!(scenario.costs.deductible_paid, dec!(2000));
        assert_eq!(scenario.costs.coinsurance_total, dec!(2040));
        assert_eq!(scenario.costs.total_out_of_pocket, dec!(4690));
        assert_eq!(scenario.costs.total_annual_cost, dec!(9490));
        assert!(!scenario.costs.oop_max_reached);
        assert_consistent(&scenario.costs, &policy);
    }

    #[test]
    fn max_out_of_pocket_is_built_from_policy_limits() {
        let policy = example_policy();
        let scenario = run_scenario(&policy, ScenarioKind::MaxOutOfPocket);

        assert_eq!(scenario.costs.deductible_paid, dec!(2000));
        assert_eq!(scenario.costs.coinsurance_total, dec!(4000));
        assert_eq!(scenario.costs.total_out_of_pocket, dec!(6000));
        assert_eq!(scenario.costs.total_annual_cost, dec!(10800));
        assert_eq!(scenario.costs.raw_out_of_pocket(), dec!(6000));
        assert!(scenario.costs.oop_max_reached);
        assert_consistent(&scenario.costs, &policy);
    }

    #[test]
    fn compare_all_keeps_preset_order() {
        let comparison = compare_all_scenarios(&example_policy());
        let keys = comparison
            .scenarios
            .iter()
            .map(|s| s.key)
            .collect::<Vec<_>>();

        assert_eq!(keys, ScenarioKind::ALL.to_vec());
        assert_eq!(comparison.scenarios[2].title, "High Use (Outpatient Surgery)");
    }

    #[test]
    fn compare_scenarios_runs_only_requested_presets() {
        let comparison = compare_scenarios(
            &example_policy(),
            &[ScenarioKind::MaxOutOfPocket, ScenarioKind::ModerateUse],
        );

        assert_eq!(comparison.scenarios.len(), 2);
        assert_eq!(comparison.scenarios[0].key, ScenarioKind::MaxOutOfPocket);
        assert_eq!(comparison.scenarios[1].key, ScenarioKind::ModerateUse);
    }
}
