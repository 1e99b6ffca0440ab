use std::fmt;

use krabmaga::engine::{agent::Agent, state::State};

use crate::state::EconomyState;

// ─────────────────────────────────────────────────────────────────────────────
// krabmaga Agent proxy
// ─────────────────────────────────────────────────────────────────────────────

/// Proxy agent that advances the economy by one time index.
///
/// Runs between `EconomyState::before_step` (labor-market rates) and
/// `EconomyState::after_step` (validation), so the rate draws always precede
/// the growth-noise draw.
#[derive(Clone)]
pub struct PeriodAgent;

impl fmt::Display for PeriodAgent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PeriodAgent")
    }
}

impl Agent for PeriodAgent {
    /// Labor force, unemployment, AS-DS and growth for the current index.
    fn step(&mut self, state: &mut dyn State) {
        let state = state
            .as_any_mut()
            .downcast_mut::<EconomyState>()
            .expect("state should be EconomyState");
        state.advance_period();
    }
}
