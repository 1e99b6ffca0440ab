//! Monte Carlo parameter studies.
//!
//! Every sample owns its own [`RandomSource`], seeded from the master seed
//! and the sample index, so a batch is reproducible no matter how rayon
//! schedules the work.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::SimulationConfig;
use crate::error::{ConfigError, Result, SimulationError};
use crate::rng::{derive_seed, RandomSource};
use crate::{run, SimulationRun};

/// Sampling ranges for the randomized subset of parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParameterSampler {
    pub research_productivity: (f64, f64),
    pub population_growth: (f64, f64),
    pub labor_allocation: (f64, f64),
    pub propensity_to_consume: (f64, f64),
}

impl Default for ParameterSampler {
    fn default() -> Self {
        ParameterSampler {
            research_productivity: (0.05, 0.15),
            population_growth: (0.0, 0.03),
            labor_allocation: (0.6, 0.9),
            propensity_to_consume: (0.1, 0.3),
        }
    }
}

impl ParameterSampler {
    /// Copy `base`, re-drawing the randomized fields uniformly.
    pub fn sample(&self, base: &SimulationConfig, rng: &mut RandomSource) -> SimulationConfig {
        let (rp, pg, la, pc) = (
            self.research_productivity,
            self.population_growth,
            self.labor_allocation,
            self.propensity_to_consume,
        );
        SimulationConfig {
            research_productivity: rng.uniform(rp.0, rp.1),
            population_growth: rng.uniform(pg.0, pg.1),
            labor_allocation: rng.uniform(la.0, la.1),
            propensity_to_consume: rng.uniform(pc.0, pc.1),
            ..base.clone()
        }
    }

    /// Check every range is ordered and that `base` stays valid with all
    /// randomized fields at their lower and at their upper ends.
    pub fn validate(&self, base: &SimulationConfig) -> std::result::Result<(), ConfigError> {
        for (field, (low, high)) in self.ranges() {
            if !(low <= high) {
                return Err(ConfigError::OutOfDomain {
                    field,
                    value: high,
                    reason: "sampling range ends below its start",
                });
            }
        }
        self.at_ends(base, |range| range.0).validate()?;
        self.at_ends(base, |range| range.1).validate()
    }

    fn ranges(&self) -> [(&'static str, (f64, f64)); 4] {
        [
            ("research_productivity", self.research_productivity),
            ("population_growth", self.population_growth),
            ("labor_allocation", self.labor_allocation),
            ("propensity_to_consume", self.propensity_to_consume),
        ]
    }

    fn at_ends(
        &self,
        base: &SimulationConfig,
        end: impl Fn((f64, f64)) -> f64,
    ) -> SimulationConfig {
        SimulationConfig {
            research_productivity: end(self.research_productivity),
            population_growth: end(self.population_growth),
            labor_allocation: end(self.labor_allocation),
            propensity_to_consume: end(self.propensity_to_consume),
            ..base.clone()
        }
    }
}

/// One row of a parameter study, ready for a tabular store.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    pub run_index: usize,
    pub seed: u64,
    pub config: SimulationConfig,
    pub final_output: f64,
    pub final_inflation: f64,
    pub final_unemployment: f64,
    pub final_knowledge_stock: f64,
    pub recessions: usize,
    pub booms: usize,
    pub first_instability: Option<usize>,
}

impl RunRecord {
    pub fn from_run(run_index: usize, run: &SimulationRun) -> Self {
        let last = run.series.last();
        RunRecord {
            run_index,
            seed: run.seed,
            config: run.config.clone(),
            final_output: last.output,
            final_inflation: last.inflation,
            final_unemployment: last.unemployment,
            final_knowledge_stock: last.knowledge_stock,
            recessions: run.regimes.recessions.len(),
            booms: run.regimes.booms.len(),
            first_instability: run.first_instability,
        }
    }
}

/// A sample that was skipped because the model diverged.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BatchFailure {
    pub run_index: usize,
    pub seed: u64,
    pub step: usize,
    pub quantity: String,
}

/// Completed rows and skipped samples, both ordered by run index.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    pub records: Vec<RunRecord>,
    pub failures: Vec<BatchFailure>,
}

enum SampleOutcome {
    Completed(RunRecord),
    Diverged(BatchFailure),
}

/// Run `n_runs` re-sampled simulations in parallel.
///
/// `base` and the sampler ranges are validated up front, so no sample can
/// draw an invalid configuration. Divergent samples are logged and reported
/// in [`BatchReport::failures`]; any other error aborts the batch.
pub fn run_batch(
    base: &SimulationConfig,
    sampler: &ParameterSampler,
    n_runs: usize,
    master_seed: u64,
) -> Result<BatchReport> {
    base.validate()?;
    sampler.validate(base)?;
    info!(n_runs, master_seed, "parameter study starting");

    let outcomes: Vec<SampleOutcome> = (0..n_runs)
        .into_par_iter()
        .map(|run_index| run_sample(base, sampler, run_index, master_seed))
        .collect::<Result<_>>()?;

    let mut report = BatchReport::default();
    for outcome in outcomes {
        match outcome {
            SampleOutcome::Completed(record) => report.records.push(record),
            SampleOutcome::Diverged(failure) => report.failures.push(failure),
        }
    }

    info!(
        completed = report.records.len(),
        skipped = report.failures.len(),
        "parameter study complete"
    );
    Ok(report)
}

fn run_sample(
    base: &SimulationConfig,
    sampler: &ParameterSampler,
    run_index: usize,
    master_seed: u64,
) -> Result<SampleOutcome> {
    let mut sample_rng = RandomSource::new(derive_seed(master_seed, run_index as u64));
    let config = sampler.sample(base, &mut sample_rng);
    let seed = sample_rng.next_seed();

    match run(&config, seed) {
        Ok(sim) => Ok(SampleOutcome::Completed(RunRecord::from_run(run_index, &sim))),
        Err(SimulationError::ModelDivergence { step, quantity, .. }) => {
            warn!(run_index, seed, step, quantity, "sample diverged, skipping");
            Ok(SampleOutcome::Diverged(BatchFailure {
                run_index,
                seed,
                step,
                quantity: quantity.to_string(),
            }))
        }
        Err(err) => Err(err),
    }
}
