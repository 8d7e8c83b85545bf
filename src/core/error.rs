use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PolicyError {
    #[error("{field} must be >= 0, got {value}")]
    NegativeAmount { field: &'static str, value: Decimal },

    #[error("coinsurance rate must be between 0 and 1, got {0}")]
    CoinsuranceOutOfRange(Decimal),

    #[error(
        "out-of-pocket maximum ({out_of_pocket_max}) must be >= deductible ({deductible})"
    )]
    OutOfPocketBelowDeductible {
        out_of_pocket_max: Decimal,
        deductible: Decimal,
    },

    #[error("copay for '{category}' must be >= 0, got {value}")]
    NegativeCopay { category: String, value: Decimal },

    #[error("unit cost for '{category}' must be >= 0, got {value}")]
    NegativeUnitCost { category: String, value: Decimal },

    #[error("{field} must be <= {max}, got {value}")]
    AmountTooLarge {
        field: String,
        value: Decimal,
        max: Decimal,
    },

    #[error("service category must not be empty")]
    EmptyCategory,
}
