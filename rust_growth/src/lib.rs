/*!
# `romer_cycles` — growth and business-cycle path simulator

Generates synthetic macro time series (output, inflation, unemployment,
knowledge stock) from an idea-driven Romer growth engine coupled to an AS-DS
inflation / output-gap process and a regime-conditioned labor market.
Recessions and booms are drawn once per run as non-overlapping step
intervals; the time loop is scheduled with
[krABMaga](https://github.com/krABMaga/krABMaga).

## Quick start

```no_run
use romer_cycles::{run, SimulationConfig};

let config = SimulationConfig::default();
let sim = run(&config, 42).expect("baseline configuration is valid");
println!("final output: {}", sim.series.last().output);
```

Parameter studies go through [`batch::run_batch`], which fans independent,
separately seeded runs out over rayon. With the `python` feature the same
entry points are exported to Python via [PyO3](https://pyo3.rs).
*/

pub mod agents;
pub mod batch;
pub mod config;
pub mod error;
pub mod growth;
pub mod markets;
pub mod regime;
pub mod rng;
pub mod state;

#[cfg(feature = "python")]
mod python;

use krabmaga::engine::schedule::Schedule;
use krabmaga::engine::state::State;
use serde::{Deserialize, Serialize};
use tracing::info;

pub use batch::{run_batch, BatchReport, ParameterSampler, RunRecord};
pub use config::SimulationConfig;
pub use error::{ConfigError, Result, SimulationError};
pub use regime::{Interval, Regime, RegimeSchedule};
pub use rng::RandomSource;
pub use state::{EconomyState, PeriodSnapshot, StateSeries};

// ─────────────────────────────────────────────────────────────────────────────
// Run artifact
// ─────────────────────────────────────────────────────────────────────────────

/// A completed run, handed to persistence or plotting collaborators.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimulationRun {
    pub seed: u64,
    pub config: SimulationConfig,
    pub regimes: RegimeSchedule,
    pub series: StateSeries,
    /// First step whose output or knowledge stock rose above
    /// [`state::INSTABILITY_THRESHOLD`] or fell below
    /// [`state::COLLAPSE_THRESHOLD`] in magnitude.
    pub first_instability: Option<usize>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Main simulation entry points
// ─────────────────────────────────────────────────────────────────────────────

/// Validate `config` and run one simulation seeded with `seed`.
pub fn run(config: &SimulationConfig, seed: u64) -> Result<SimulationRun> {
    config.validate()?;
    let (outcome, _) = simulate(config.clone(), RandomSource::new(seed));
    outcome
}

/// Like [`run`], drawing from a caller-owned source.
///
/// The configuration is validated before the source is touched, so a
/// rejected configuration leaves it exactly where it was.
pub fn run_with_source(
    config: &SimulationConfig,
    rng: &mut RandomSource,
) -> Result<SimulationRun> {
    config.validate()?;
    let placeholder = RandomSource::new(rng.seed());
    let source = std::mem::replace(rng, placeholder);
    let (outcome, source) = simulate(config.clone(), source);
    *rng = source;
    outcome
}

/// Drive the krabmaga schedule for `t = 1..N`, stopping at the first failure.
fn simulate(
    config: SimulationConfig,
    source: RandomSource,
) -> (Result<SimulationRun>, RandomSource) {
    let seed = source.seed();
    let mut state = EconomyState::new(config, source);
    let mut schedule = Schedule::new();

    info!(
        seed,
        steps = state.steps(),
        recessions = state.regimes.recessions.len(),
        booms = state.regimes.booms.len(),
        "simulation starting"
    );

    // Initialise the period proxy (calls EconomyState::init)
    state.init(&mut schedule);

    for _ in 1..state.steps() {
        schedule.step(&mut state);
        if state.halted() {
            break;
        }
    }

    let source = std::mem::replace(&mut state.rng, RandomSource::new(seed));
    let config = state.config.clone();
    let outcome = state.into_outcome().map(|(series, regimes, first_instability)| {
        info!(
            seed,
            final_output = series.last().output,
            ?first_instability,
            "simulation complete"
        );
        SimulationRun {
            seed,
            config,
            regimes,
            series,
            first_instability,
        }
    });
    (outcome, source)
}
