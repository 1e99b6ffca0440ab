use std::any::Any;

use krabmaga::engine::{schedule::Schedule, state::State};
use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

use crate::agents::PeriodAgent;
use crate::config::SimulationConfig;
use crate::error::SimulationError;
use crate::growth::growth_step;
use crate::markets::{as_ds_step, rates_at, LaborRates};
use crate::regime::RegimeSchedule;
use crate::rng::RandomSource;

/// Magnitude above which output or knowledge stock is reported as unstable.
pub const INSTABILITY_THRESHOLD: f64 = 1e12;

/// Magnitude below which output or knowledge stock is reported as collapsed.
pub const COLLAPSE_THRESHOLD: f64 = 1e-12;

/// Output value read by the recursion at `t = 1`. It is a seed, not an
/// observation; see [`StateSeries::observed_output`].
pub const OUTPUT_SEED: f64 = 0.0;

// ─────────────────────────────────────────────────────────────────────────────
// Time-indexed series
// ─────────────────────────────────────────────────────────────────────────────

/// All state variables at one time index.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PeriodSnapshot {
    pub knowledge_stock: f64,
    pub total_labor: f64,
    pub output: f64,
    pub output_gap: f64,
    pub inflation: f64,
    pub unemployment: f64,
}

impl PeriodSnapshot {
    /// First non-finite quantity, if any.
    fn non_finite(&self) -> Option<(&'static str, f64)> {
        [
            ("knowledge_stock", self.knowledge_stock),
            ("total_labor", self.total_labor),
            ("unemployment", self.unemployment),
            ("output_gap", self.output_gap),
            ("inflation", self.inflation),
            ("output", self.output),
        ]
        .into_iter()
        .find(|(_, value)| !value.is_finite())
    }
}

/// Parallel series over the time grid.
///
/// Index 0 is seeded from the configuration; later indices are appended once,
/// in order, by the orchestrator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StateSeries {
    time: Vec<f64>,
    knowledge_stock: Vec<f64>,
    total_labor: Vec<f64>,
    output: Vec<f64>,
    output_gap: Vec<f64>,
    inflation: Vec<f64>,
    unemployment: Vec<f64>,
}

impl StateSeries {
    pub fn seeded(cfg: &SimulationConfig) -> Self {
        let steps = cfg.steps();
        let with_seed = |value: f64| {
            let mut v = Vec::with_capacity(steps);
            v.push(value);
            v
        };
        StateSeries {
            time: (0..steps).map(|i| i as f64 * cfg.time_step).collect(),
            knowledge_stock: with_seed(cfg.initial_knowledge),
            total_labor: with_seed(cfg.initial_labor),
            output: with_seed(OUTPUT_SEED),
            output_gap: with_seed(cfg.initial_output_gap),
            inflation: with_seed(cfg.initial_inflation),
            unemployment: with_seed(cfg.initial_unemployment_rate * cfg.initial_labor),
        }
    }

    /// Number of indices written so far.
    pub fn len(&self) -> usize {
        self.knowledge_stock.len()
    }

    pub fn is_empty(&self) -> bool {
        self.knowledge_stock.is_empty()
    }

    /// True once every point of the time grid has a value.
    pub fn is_complete(&self) -> bool {
        self.len() == self.time.len()
    }

    /// The full time grid, independent of how far the run got.
    pub fn time(&self) -> &[f64] {
        &self.time
    }

    pub fn knowledge_stock(&self) -> &[f64] {
        &self.knowledge_stock
    }

    pub fn total_labor(&self) -> &[f64] {
        &self.total_labor
    }

    /// Output including the index-0 seed.
    pub fn output(&self) -> &[f64] {
        &self.output
    }

    /// Output the model computed, i.e. indices `1..`.
    pub fn observed_output(&self) -> &[f64] {
        self.output.get(1..).unwrap_or(&[])
    }

    pub fn output_gap(&self) -> &[f64] {
        &self.output_gap
    }

    pub fn inflation(&self) -> &[f64] {
        &self.inflation
    }

    pub fn unemployment(&self) -> &[f64] {
        &self.unemployment
    }

    pub fn snapshot(&self, t: usize) -> Option<PeriodSnapshot> {
        Some(PeriodSnapshot {
            knowledge_stock: *self.knowledge_stock.get(t)?,
            total_labor: *self.total_labor.get(t)?,
            output: *self.output.get(t)?,
            output_gap: *self.output_gap.get(t)?,
            inflation: *self.inflation.get(t)?,
            unemployment: *self.unemployment.get(t)?,
        })
    }

    /// Latest written index. Index 0 is always present.
    pub fn last(&self) -> PeriodSnapshot {
        let t = self.len() - 1;
        PeriodSnapshot {
            knowledge_stock: self.knowledge_stock[t],
            total_labor: self.total_labor[t],
            output: self.output[t],
            output_gap: self.output_gap[t],
            inflation: self.inflation[t],
            unemployment: self.unemployment[t],
        }
    }

    fn push(&mut self, period: PeriodSnapshot) {
        debug_assert!(self.len() < self.time.len());
        self.knowledge_stock.push(period.knowledge_stock);
        self.total_labor.push(period.total_labor);
        self.output.push(period.output);
        self.output_gap.push(period.output_gap);
        self.inflation.push(period.inflation);
        self.unemployment.push(period.unemployment);
    }

    /// Copy of indices `0..len`.
    fn truncated(&self, len: usize) -> Self {
        StateSeries {
            time: self.time.clone(),
            knowledge_stock: self.knowledge_stock[..len].to_vec(),
            total_labor: self.total_labor[..len].to_vec(),
            output: self.output[..len].to_vec(),
            output_gap: self.output_gap[..len].to_vec(),
            inflation: self.inflation[..len].to_vec(),
            unemployment: self.unemployment[..len].to_vec(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Economy state (implements krabmaga State)
// ─────────────────────────────────────────────────────────────────────────────

/// Orchestrator state for one run.
///
/// Each krabmaga step computes one time index `t`:
///   before_step → labor-market rates for `t` (regime-conditioned draws)
///   PeriodAgent → labor force, unemployment, AS-DS, growth
///   after_step  → finiteness check, instability warning, advance `t`
pub struct EconomyState {
    pub config: SimulationConfig,
    pub regimes: RegimeSchedule,
    pub series: StateSeries,
    pub rng: RandomSource,

    seed: u64,
    // Next index to compute.
    cursor: usize,
    pending_rates: Option<LaborRates>,
    failure: Option<SimulationError>,
    first_instability: Option<usize>,
}

impl EconomyState {
    /// Create the state and draw the regime schedule.
    ///
    /// `config` must already be validated.
    pub fn new(config: SimulationConfig, mut rng: RandomSource) -> Self {
        let regimes = RegimeSchedule::generate(config.steps(), &mut rng);
        let series = StateSeries::seeded(&config);
        EconomyState {
            seed: rng.seed(),
            config,
            regimes,
            series,
            rng,
            cursor: 1,
            pending_rates: None,
            failure: None,
            first_instability: None,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Number of points on the time grid.
    pub fn steps(&self) -> usize {
        self.series.time().len()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// True once the run failed and stepping has stopped.
    pub fn halted(&self) -> bool {
        self.failure.is_some()
    }

    pub fn is_complete(&self) -> bool {
        self.series.is_complete()
    }

    pub fn first_instability(&self) -> Option<usize> {
        self.first_instability
    }

    fn idle(&self) -> bool {
        self.halted() || self.cursor >= self.steps()
    }

    /// Consume the state, handing back the failure if the run diverged.
    pub fn into_outcome(
        self,
    ) -> Result<(StateSeries, RegimeSchedule, Option<usize>), SimulationError> {
        match self.failure {
            Some(err) => Err(err),
            None => Ok((self.series, self.regimes, self.first_instability)),
        }
    }

    // ─── Per-step helpers ───────────────────────────────────────────────────

    /// Resolve regime and job-flow rates for the current index.
    pub fn resolve_labor_rates(&mut self) {
        if self.idle() {
            return;
        }
        let regime = self.regimes.regime_at(self.cursor);
        match rates_at(
            regime,
            self.config.base_separation_rate,
            self.config.base_finding_rate,
            &mut self.rng,
        ) {
            Ok(rates) => self.pending_rates = Some(rates),
            Err(err) => self.failure = Some(err),
        }
    }

    /// Compute and append the current index from the previous one.
    pub fn advance_period(&mut self) {
        if self.idle() {
            return;
        }
        let Some(rates) = self.pending_rates.take() else {
            return;
        };
        let t = self.cursor;
        let Some(prev) = self.series.snapshot(t - 1) else {
            return;
        };
        let cfg = &self.config;

        let total_labor = (cfg.population_growth * self.series.time()[t]).exp() - prev.unemployment;
        let unemployment = rates.steady_state_unemployment(total_labor);
        let aggregate = as_ds_step(prev.output_gap, prev.inflation, cfg);

        match growth_step(
            prev.knowledge_stock,
            prev.output,
            total_labor,
            aggregate.output_gap,
            cfg,
            &mut self.rng,
        ) {
            Ok(growth) => self.series.push(PeriodSnapshot {
                knowledge_stock: growth.knowledge_stock,
                total_labor,
                output: growth.output,
                output_gap: aggregate.output_gap,
                inflation: aggregate.inflation,
                unemployment,
            }),
            Err(err) => self.failure = Some(err),
        }
    }

    /// Validate the freshly written index and move to the next one.
    pub fn finish_period(&mut self) {
        if self.idle() {
            return;
        }
        let t = self.cursor;
        let Some(period) = self.series.snapshot(t) else {
            return;
        };

        if let Some((quantity, value)) = period.non_finite() {
            // Index t - 1 exists: the cursor starts at 1.
            let last_finite = self.series.snapshot(t - 1).unwrap_or(period);
            self.failure = Some(SimulationError::ModelDivergence {
                step: t,
                quantity,
                value,
                last_finite,
                partial: Box::new(self.series.truncated(t)),
            });
            return;
        }

        if self.first_instability.is_none()
            && (out_of_bounds(period.output) || out_of_bounds(period.knowledge_stock))
        {
            warn!(
                step = t,
                output = period.output,
                knowledge_stock = period.knowledge_stock,
                "numeric instability: series magnitude outside bounds"
            );
            self.first_instability = Some(t);
        }

        self.cursor += 1;
    }
}

fn out_of_bounds(value: f64) -> bool {
    let magnitude = value.abs();
    magnitude > INSTABILITY_THRESHOLD || magnitude < COLLAPSE_THRESHOLD
}

// ─────────────────────────────────────────────────────────────────────────────
// krabmaga State implementation
// ─────────────────────────────────────────────────────────────────────────────

impl State for EconomyState {
    /// Schedule the single period proxy; all per-step ordering lives in the
    /// before/after hooks around it.
    fn init(&mut self, schedule: &mut Schedule) {
        schedule.schedule_repeating(Box::new(PeriodAgent), 0.0, 0);
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_state_mut(&mut self) -> &mut dyn State {
        self
    }

    fn as_state(&self) -> &dyn State {
        self
    }

    /// Replay the run from its seed.
    fn reset(&mut self) {
        let mut rng = RandomSource::new(self.seed);
        self.regimes = RegimeSchedule::generate(self.config.steps(), &mut rng);
        self.series = StateSeries::seeded(&self.config);
        self.rng = rng;
        self.cursor = 1;
        self.pending_rates = None;
        self.failure = None;
        self.first_instability = None;
    }

    fn before_step(&mut self, _schedule: &mut Schedule) {
        self.resolve_labor_rates();
    }

    fn after_step(&mut self, _schedule: &mut Schedule) {
        self.finish_period();
    }

    fn update(&mut self, step: u64) {
        if step > 0 {
            trace!(step, cursor = self.cursor, "period complete");
        }
    }
}
