use crate::config::SimulationConfig;

/// Output gap and inflation for one period.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AggregateOutcome {
    pub output_gap: f64,
    pub inflation: f64,
}

/// Advance the AS-DS system by one period.
///
/// Both equations read the previous period's pair: the demand side uses
/// last period's inflation, the supply side last period's output gap.
/// Requires `propensity_to_consume < 1`, which `SimulationConfig::validate`
/// guarantees.
pub fn as_ds_step(
    prev_output_gap: f64,
    prev_inflation: f64,
    cfg: &SimulationConfig,
) -> AggregateOutcome {
    let multiplier = 1.0 - cfg.propensity_to_consume;
    let output_gap = cfg.demand_shock / multiplier
        - (cfg.b_bar * cfg.monetary_policy / multiplier) * (prev_inflation - cfg.inflation_target);
    let inflation = prev_inflation + cfg.inflation_sensitivity * prev_output_gap + cfg.cost_shock;

    AggregateOutcome {
        output_gap,
        inflation,
    }
}
