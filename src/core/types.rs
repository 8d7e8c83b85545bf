use std::collections::BTreeMap;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::error::PolicyError;

pub const DEFAULT_COINSURANCE_RATE: Decimal = dec!(0.20);

/// Largest premium, deductible, cap, copay or unit cost accepted. With counts
/// bounded by `u32` this keeps every allocation sum well inside `Decimal` range.
pub const MAX_AMOUNT: Decimal = dec!(1000000000);

fn check_amount(field: impl Into<String>, value: Decimal) -> Result<(), PolicyError> {
    if value > MAX_AMOUNT {
        return Err(PolicyError::AmountTooLarge {
            field: field.into(),
            value,
            max: MAX_AMOUNT,
        });
    }
    Ok(())
}

/// Raw policy parameters as they arrive from a config file or request body.
///
/// Every field is optional on the wire; missing ones take the values from
/// [`PolicyConfig::default`]. Nothing is checked until [`PolicyConfig::build`].
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PolicyConfig {
    #[serde(alias = "annual_premium")]
    pub annual_premium: Decimal,
    pub deductible: Decimal,
    #[serde(alias = "out_of_pocket_max", alias = "oopMax", alias = "oop_max")]
    pub out_of_pocket_max: Decimal,
    #[serde(alias = "copay_schedule", alias = "copays")]
    pub copay_schedule: BTreeMap<String, Decimal>,
    #[serde(alias = "coinsurance_rate", alias = "coinsurance")]
    pub coinsurance_rate: Decimal,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            annual_premium: Decimal::ZERO,
            deductible: Decimal::ZERO,
            out_of_pocket_max: Decimal::ZERO,
            copay_schedule: BTreeMap::new(),
            coinsurance_rate: DEFAULT_COINSURANCE_RATE,
        }
    }
}

impl PolicyConfig {
    pub fn build(self) -> Result<Policy, PolicyError> {
        Policy::new(self)
    }
}

/// A validated, immutable insurance policy.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Policy {
    annual_premium: Decimal,
    deductible: Decimal,
    out_of_pocket_max: Decimal,
    copay_schedule: BTreeMap<String, Decimal>,
    coinsurance_rate: Decimal,
}

impl Policy {
    pub fn new(config: PolicyConfig) -> Result<Self, PolicyError> {
        for (field, value) in [
            ("annual premium", config.annual_premium),
            ("deductible", config.deductible),
            ("out-of-pocket maximum", config.out_of_pocket_max),
        ] {
            if value < Decimal::ZERO {
                return Err(PolicyError::NegativeAmount { field, value });
            }
            check_amount(field, value)?;
        }
        if config.coinsurance_rate < Decimal::ZERO || config.coinsurance_rate > Decimal::ONE {
            return Err(PolicyError::CoinsuranceOutOfRange(config.coinsurance_rate));
        }
        if config.out_of_pocket_max < config.deductible {
            return Err(PolicyError::OutOfPocketBelowDeductible {
                out_of_pocket_max: config.out_of_pocket_max,
                deductible: config.deductible,
            });
        }
        if let Some((category, value)) = config
            .copay_schedule
            .iter()
            .find(|(_, copay)| **copay < Decimal::ZERO)
        {
            return Err(PolicyError::NegativeCopay {
                category: category.clone(),
                value: *value,
            });
        }
        for (category, copay) in &config.copay_schedule {
            check_amount(format!("copay for '{category}'"), *copay)?;
        }

        Ok(Self {
            annual_premium: config.annual_premium,
            deductible: config.deductible,
            out_of_pocket_max: config.out_of_pocket_max,
            copay_schedule: config.copay_schedule,
            coinsurance_rate: config.coinsurance_rate,
        })
    }

    pub fn annual_premium(&self) -> Decimal {
        self.annual_premium
    }

    pub fn deductible(&self) -> Decimal {
        self.deductible
    }

    pub fn out_of_pocket_max(&self) -> Decimal {
        self.out_of_pocket_max
    }

    pub fn coinsurance_rate(&self) -> Decimal {
        self.coinsurance_rate
    }

    pub fn copay_schedule(&self) -> &BTreeMap<String, Decimal> {
        &self.copay_schedule
    }

    /// Fixed copay for `category`, or `None` when the category is billed
    /// through deductible and coinsurance.
    pub fn copay_for(&self, category: &str) -> Option<Decimal> {
        self.copay_schedule.get(category).copied()
    }
}

/// One line of consumed care: `count` occurrences of `category`, each billed
/// at `unit_cost` before insurance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceUsage {
    category: String,
    count: u32,
    unit_cost: Decimal,
}

impl ServiceUsage {
    pub fn new(
        category: impl Into<String>,
        count: u32,
        unit_cost: Decimal,
    ) -> Result<Self, PolicyError> {
        let category = category.into();
        if category.trim().is_empty() {
            return Err(PolicyError::EmptyCategory);
        }
        if unit_cost < Decimal::ZERO {
            return Err(PolicyError::NegativeUnitCost {
                category,
                value: unit_cost,
            });
        }
        check_amount(format!("unit cost for '{category}'"), unit_cost)?;
        Ok(Self {
            category,
            count,
            unit_cost,
        })
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn unit_cost(&self) -> Decimal {
        self.unit_cost
    }

    pub fn billed_total(&self) -> Decimal {
        self.unit_cost * Decimal::from(self.count)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CostBreakdown {
    pub premium: Decimal,
    pub copays_total: Decimal,
    pub deductible_paid: Decimal,
    pub coinsurance_total: Decimal,
    pub total_out_of_pocket: Decimal,
    pub total_annual_cost: Decimal,
    pub oop_max_reached: bool,
}

impl CostBreakdown {
    /// Sum of the individual lanes before the out-of-pocket cap is applied.
    pub fn raw_out_of_pocket(&self) -> Decimal {
        self.copays_total + self.deductible_paid + self.coinsurance_total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_policy_amounts_are_rejected_by_field() {
        let cases = [
            (
                PolicyConfig {
                    annual_premium: dec!(-1),
                    ..PolicyConfig::default()
                },
                "annual premium",
            ),
            (
                PolicyConfig {
                    deductible: dec!(-0.01),
                    ..PolicyConfig::default()
                },
                "deductible",
            ),
            (
                PolicyConfig {
                    out_of_pocket_max: dec!(-500),
                    ..PolicyConfig::default()
                },
                "out-of-pocket maximum",
            ),
        ];

        for (config, expected_field) in cases {
            match config.build() {
                Err(PolicyError::NegativeAmount { field, value }) => {
                    assert_eq!(field, expected_field);
                    assert!(value < Decimal::ZERO);
                }
                other => panic!("expected NegativeAmount for {expected_field}, got {other:?}"),
            }
        }
    }

    #[test]
    fn blank_category_is_rejected() {
        assert_eq!(
            ServiceUsage::new("  ", 1, dec!(1)),
            Err(PolicyError::EmptyCategory)
        );
        assert_eq!(
            ServiceUsage::new("", 0, dec!(0)),
            Err(PolicyError::EmptyCategory)
        );
    }

    #[test]
    fn amounts_above_limit_are_rejected() {
        let err = ServiceUsage::new("lab_work", 4_000_000_000, Decimal::MAX / dec!(2))
            .expect_err("unit cost above limit");
        assert!(matches!(err, PolicyError::AmountTooLarge { .. }));
        assert!(err.to_string().contains("unit cost for 'lab_work'"));

        let err = PolicyConfig {
            copay_schedule: BTreeMap::from([("imaging".to_string(), MAX_AMOUNT + dec!(0.01))]),
            out_of_pocket_max: dec!(100),
            ..PolicyConfig::default()
        }
        .build()
        .expect_err("copay above limit");
        assert!(matches!(err, PolicyError::AmountTooLarge { .. }));

        let err = PolicyConfig {
            out_of_pocket_max: Decimal::MAX,
            ..PolicyConfig::default()
        }
        .build()
        .expect_err("cap above limit");
        assert_eq!(
            err,
            PolicyError::AmountTooLarge {
                field: "out-of-pocket maximum".to_string(),
                value: Decimal::MAX,
                max: MAX_AMOUNT,
            }
        );
    }

    #[test]
    fn amounts_at_limit_are_accepted() {
        let policy = PolicyConfig {
            annual_premium: MAX_AMOUNT,
            deductible: MAX_AMOUNT,
            out_of_pocket_max: MAX_AMOUNT,
            copay_schedule: BTreeMap::from([("primary_care".to_string(), MAX_AMOUNT)]),
            coinsurance_rate: Decimal::ONE,
        }
        .build();
        assert!(policy.is_ok());
        assert!(ServiceUsage::new("imaging", u32::MAX, MAX_AMOUNT).is_ok());
    }
}
