use rust_decimal::Decimal;
use tracing::{debug, instrument, trace};

use super::types::{CostBreakdown, Policy, ServiceUsage};

#[derive(Debug)]
struct AllocationState {
    copays_total: Decimal,
    deductible_paid: Decimal,
    coinsurance_total: Decimal,
    deductible_remaining: Decimal,
}

impl AllocationState {
    fn new(policy: &Policy) -> Self {
        Self {
            copays_total: Decimal::ZERO,
            deductible_paid: Decimal::ZERO,
            coinsurance_total: Decimal::ZERO,
            deductible_remaining: policy.deductible(),
        }
    }

    fn raw_out_of_pocket(&self) -> Decimal {
        self.copays_total + self.deductible_paid + self.coinsurance_total
    }
}

/// Splits a year of billed services into what the insured pays.
///
/// Copay-scheduled categories are charged their flat copay per occurrence and
/// never touch the deductible. Everything else is adjudicated occurrence by
/// occurrence in list order: the deductible absorbs billed cost first, and the
/// rest of each occurrence is charged at the coinsurance rate. The reported
/// total is capped at the policy's out-of-pocket maximum; the lane totals are not.
#[instrument(level = "debug", skip_all, fields(services = services.len()))]
pub fn allocate(policy: &Policy, services: &[ServiceUsage]) -> CostBreakdown {
    let mut state = AllocationState::new(policy);

    for service in services {
        match policy.copay_for(service.category()) {
            Some(copay) => apply_copay(&mut state, copay, service),
            None => apply_cost_sharing(&mut state, policy.coinsurance_rate(), service),
        }
    }

    let raw_out_of_pocket = state.raw_out_of_pocket();
    let cap = policy.out_of_pocket_max();
    let oop_max_reached = raw_out_of_pocket >= cap;
    let total_out_of_pocket = raw_out_of_pocket.min(cap);
    if oop_max_reached {
        debug!(%raw_out_of_pocket, %cap, "out-of-pocket maximum reached");
    }

    CostBreakdown {
        premium: policy.annual_premium(),
        copays_total: state.copays_total,
        deductible_paid: state.deductible_paid.min(policy.deductible()),
        coinsurance_total: state.coinsurance_total,
        total_out_of_pocket,
        total_annual_cost: policy.annual_premium() + total_out_of_pocket,
        oop_max_reached,
    }
}

fn apply_copay(state: &mut AllocationState, copay: Decimal, service: &ServiceUsage) {
    let charged = copay * Decimal::from(service.count());
    state.copays_total += charged;
    trace!(
        category = service.category(),
        count = service.count(),
        %charged,
        "charged copay"
    );
}

fn apply_cost_sharing(state: &mut AllocationState, rate: Decimal, service: &ServiceUsage) {
    let unit_cost = service.unit_cost();
    if unit_cost.is_zero() {
        return;
    }

    let mut occurrences_left = service.count();
    while occurrences_left > 0 && state.deductible_remaining > Decimal::ZERO {
        let applied = unit_cost.min(state.deductible_remaining);
        state.deductible_paid += applied;
        state.deductible_remaining -= applied;
        if unit_cost > applied {
            state.coinsurance_total += (unit_cost - applied) * rate;
        }
        occurrences_left -= 1;

        if state.deductible_remaining.is_zero() {
            debug!(category = service.category(), "deductible met");
        }
    }

    // Deductible exhausted: every remaining occurrence is pure coinsurance.
    if occurrences_left > 0 {
        state.coinsurance_total += unit_cost * Decimal::from(occurrences_left) * rate;
    }

    trace!(
        category = service.category(),
        count = service.count(),
        deductible_remaining = %state.deductible_remaining,
        "applied deductible and coinsurance"
    );
}
