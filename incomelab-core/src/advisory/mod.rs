//! Advisories shown next to the signal table. None of them feeds the
//! final signal.

pub mod payout_risk;
pub mod reinvest;

pub use payout_risk::{assess_payout_risk, PayoutRisk, PayoutRiskLevel};
pub use reinvest::{pick_reinvestment, score_candidate, ReinvestCandidate, ReinvestPick};
