pub mod affordability;
pub mod amortization;
pub mod consolidation;
pub mod offers;
pub mod payoff;
