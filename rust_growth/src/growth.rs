//! Romer idea-driven growth block.

use crate::config::SimulationConfig;
use crate::error::Result;
use crate::rng::RandomSource;

/// Knowledge stock and output for one period.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GrowthOutcome {
    pub knowledge_stock: f64,
    pub output: f64,
}

/// Accumulate ideas from research labor, then produce output.
///
/// Draws exactly one `Normal(noise_mean, noise_std)` sample. The previous
/// period's output is carried forward through the output-gap term.
pub fn growth_step(
    prev_knowledge: f64,
    prev_output: f64,
    total_labor: f64,
    output_gap: f64,
    cfg: &SimulationConfig,
    rng: &mut RandomSource,
) -> Result<GrowthOutcome> {
    let output_labor = cfg.labor_allocation * total_labor;
    let research_labor = cfg.research_allocation() * total_labor;

    let d_knowledge = cfg.research_productivity * prev_knowledge * research_labor;
    let knowledge_stock = prev_knowledge + d_knowledge * cfg.time_step;

    let noise = rng.normal(cfg.noise_mean, cfg.noise_std)?;
    let output =
        knowledge_stock.powf(cfg.gamma) * output_labor * (1.0 + noise) + output_gap * prev_output;

    Ok(GrowthOutcome {
        knowledge_stock,
        output,
    })
}
