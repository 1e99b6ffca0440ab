use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::regime::Regime;
use crate::rng::RandomSource;

/// Separation shock at recession onset, `Normal(0.05, 0.01)`.
const RECESSION_SEPARATION_SHOCK: (f64, f64) = (0.05, 0.01);
/// Finding-rate drop at recession onset, `Normal(0.05, 0.01)`.
const RECESSION_FINDING_SHOCK: (f64, f64) = (0.05, 0.01);
/// Finding-rate recovery noise after onset, `Normal(0.02, 0.005)`.
const RECESSION_RECOVERY: (f64, f64) = (0.02, 0.005);
/// Periods from onset before the shock starts to decay.
const RECESSION_SHOCK_PERIODS: usize = 2;
const RECESSION_DECAY: f64 = 0.9;

const BOOM_SEPARATION_DROP: (f64, f64) = (0.02, 0.005);
const BOOM_FINDING_GAIN: (f64, f64) = (0.03, 0.008);

/// Effective job-flow rates for one step.
///
/// Rates are not clamped: noise can push separation below zero, most easily
/// during a boom with a small base rate.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LaborRates {
    pub separation: f64,
    pub finding: f64,
}

impl LaborRates {
    /// Steady-state unemployment for a labor force of `total_labor`.
    pub fn steady_state_unemployment(&self, total_labor: f64) -> f64 {
        total_labor * (self.separation / (self.separation + self.finding))
    }
}

/// Resolve the job-flow rates for a step in the given regime.
///
/// Draw order is fixed (separation before finding) so runs replay exactly.
/// With no active regime nothing is drawn.
pub fn rates_at(
    regime: Regime,
    base_separation: f64,
    base_finding: f64,
    rng: &mut RandomSource,
) -> Result<LaborRates> {
    let mut separation = base_separation;
    let mut finding = base_finding;

    match regime {
        Regime::None => {}
        Regime::Recession { periods, .. } if periods < RECESSION_SHOCK_PERIODS => {
            separation += rng.normal(RECESSION_SEPARATION_SHOCK.0, RECESSION_SEPARATION_SHOCK.1)?;
            finding -= rng.normal(RECESSION_FINDING_SHOCK.0, RECESSION_FINDING_SHOCK.1)?;
        }
        Regime::Recession { periods, .. } => {
            let decay = RECESSION_DECAY.powi((periods - RECESSION_SHOCK_PERIODS) as i32);
            separation +=
                decay * rng.normal(RECESSION_SEPARATION_SHOCK.0, RECESSION_SEPARATION_SHOCK.1)?;
            finding += decay * (base_finding - finding)
                + rng.normal(RECESSION_RECOVERY.0, RECESSION_RECOVERY.1)?;
        }
        Regime::Boom { .. } => {
            separation -= rng.normal(BOOM_SEPARATION_DROP.0, BOOM_SEPARATION_DROP.1)?;
            finding += rng.normal(BOOM_FINDING_GAIN.0, BOOM_FINDING_GAIN.1)?;
        }
    }

    Ok(LaborRates {
        separation,
        finding,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEP: f64 = 0.015;
    const FIND: f64 = 0.40;

    #[test]
    fn no_regime_returns_base_rates_without_drawing() {
        let mut rng = RandomSource::new(5);
        let rates = rates_at(Regime::None, SEP, FIND, &mut rng).unwrap();
        assert_eq!(rates, LaborRates { separation: SEP, finding: FIND });
        assert_eq!(rng.draws(), 0);
    }

    #[test]
    fn recession_onset_deteriorates_both_rates() {
        let mut rng = RandomSource::new(5);
        for periods in 0..2 {
            let rates =
                rates_at(Regime::Recession { start: 30, periods }, SEP, FIND, &mut rng).unwrap();
            assert!(rates.separation > SEP);
            assert!(rates.finding < FIND);
        }
        assert_eq!(rng.draws(), 4);
    }

    #[test]
    fn recession_shock_decays_after_onset() {
        let mut rng = RandomSource::new(9);
        let late =
            rates_at(Regime::Recession { start: 0, periods: 40 }, SEP, FIND, &mut rng).unwrap();
        // 0.9^38 ≈ 0.018, so the separation shock is nearly gone.
        assert!(late.separation > SEP);
        assert!(late.separation - SEP < 0.01);
        // Finding rate sits above base by the recovery noise.
        assert!(late.finding > FIND);
        assert!(late.finding - FIND < 0.05);
    }

    #[test]
    fn decay_starts_at_one_two_periods_after_onset() {
        for (periods, decay) in [(2usize, 1.0), (3, 0.9), (5, 0.9 * 0.9 * 0.9)] {
            let mut rng = RandomSource::new(21);
            let mut twin = RandomSource::new(21);
            let rates =
                rates_at(Regime::Recession { start: 10, periods }, SEP, FIND, &mut rng).unwrap();
            let separation_draw = twin.normal(0.05, 0.01).unwrap();
            let recovery_draw = twin.normal(0.02, 0.005).unwrap();
            assert!((rates.separation - (SEP + decay * separation_draw)).abs() < 1e-15);
            assert!((rates.finding - (FIND + recovery_draw)).abs() < 1e-15);
        }
    }

    #[test]
    fn boom_tightens_labor_market() {
        let mut rng = RandomSource::new(13);
        let rates = rates_at(Regime::Boom { start: 4 }, SEP, FIND, &mut rng).unwrap();
        assert!(rates.separation < SEP);
        assert!(rates.finding > FIND);
    }

    #[test]
    fn boom_can_push_separation_negative() {
        // Known unclamped behaviour: with a zero base rate the boom drop wins.
        let mut rng = RandomSource::new(13);
        let rates = rates_at(Regime::Boom { start: 4 }, 0.0, FIND, &mut rng).unwrap();
        assert!(rates.separation < 0.0);
    }

    #[test]
    fn steady_state_formula() {
        let rates = LaborRates { separation: 0.1, finding: 0.4 };
        assert!((rates.steady_state_unemployment(2.0) - 0.4).abs() < 1e-12);
    }
}
