use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Largest time grid a run may allocate.
pub const MAX_STEPS: usize = 1_000_000;

/// Configuration parameters for one growth / business-cycle run.
///
/// Serialized keys match the flat JSON parameter file the Python tooling
/// writes. Parsing never fills in defaults: every key is required.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SimulationConfig {
    // Growth (Romer) block
    #[serde(rename = "A0")]
    pub initial_knowledge: f64,
    #[serde(rename = "L0")]
    pub initial_labor: f64,
    pub gamma: f64,
    pub research_productivity: f64,
    pub population_growth: f64,
    /// Share of labor allocated to output; the rest does research.
    pub labor_allocation: f64,

    // Time grid
    pub time_step: f64,
    pub simulation_time: f64,

    // Output noise
    #[serde(rename = "random_mean")]
    pub noise_mean: f64,
    #[serde(rename = "random_std")]
    pub noise_std: f64,

    // AS-DS block
    pub propensity_to_consume: f64,
    #[serde(rename = "aggregate_demand")]
    pub demand_shock: f64,
    pub b_bar: f64,
    pub inflation_sensitivity: f64,
    pub cost_shock: f64,
    #[serde(rename = "m_policy")]
    pub monetary_policy: f64,
    pub inflation_target: f64,
    pub initial_output_gap: f64,
    pub initial_inflation: f64,

    // Labour market
    #[serde(rename = "job_separation_rate")]
    pub base_separation_rate: f64,
    #[serde(rename = "job_finding_rate")]
    pub base_finding_rate: f64,
    pub initial_unemployment_rate: f64,
}

impl Default for SimulationConfig {
    /// Baseline run: quarterly steps over 100 years, randomized parameters
    /// at the midpoints of their sampling ranges.
    fn default() -> Self {
        SimulationConfig {
            initial_knowledge: 1.0,
            initial_labor: 1.0,
            gamma: 1.0,
            research_productivity: 0.1,
            population_growth: 0.015,
            labor_allocation: 0.8,

            time_step: 0.25,
            simulation_time: 100.0,

            noise_mean: 0.0,
            noise_std: 0.025,

            propensity_to_consume: 0.2,
            demand_shock: 0.0,
            b_bar: 0.1,
            inflation_sensitivity: 0.5,
            cost_shock: 0.0,
            monetary_policy: 0.1,
            inflation_target: 0.02,
            initial_output_gap: 0.0,
            initial_inflation: 0.02,

            base_separation_rate: 0.015,
            base_finding_rate: 0.40,
            initial_unemployment_rate: 0.04,
        }
    }
}

impl SimulationConfig {
    /// Parse and validate a JSON parameter document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: SimulationConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Build and validate a configuration from a flat name → value mapping.
    pub fn from_map(params: &HashMap<String, f64>) -> Result<Self, ConfigError> {
        let value = serde_json::to_value(params)?;
        let config: SimulationConfig = serde_json::from_value(value)?;
        config.validate()?;
        Ok(config)
    }

    /// Flatten back into the name → value mapping `from_map` accepts.
    pub fn to_map(&self) -> Result<HashMap<String, f64>, ConfigError> {
        let value = serde_json::to_value(self)?;
        Ok(serde_json::from_value(value)?)
    }

    /// Number of points on the time grid, `ceil(simulation_time / time_step)`.
    pub fn steps(&self) -> usize {
        // Tolerance keeps exact ratios like 100 / 0.25 from rounding up.
        (self.simulation_time / self.time_step - 1e-9).ceil().max(0.0) as usize
    }

    pub fn research_allocation(&self) -> f64 {
        1.0 - self.labor_allocation
    }

    /// Check every parameter against its domain.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in self.fields() {
            if !value.is_finite() {
                return Err(out_of_domain(field, value, "must be finite"));
            }
        }

        positive("A0", self.initial_knowledge)?;
        positive("L0", self.initial_labor)?;
        positive("time_step", self.time_step)?;
        if self.simulation_time < self.time_step {
            return Err(out_of_domain(
                "simulation_time",
                self.simulation_time,
                "must cover at least one time step",
            ));
        }
        let ratio = self.simulation_time / self.time_step;
        if !ratio.is_finite() || ratio > MAX_STEPS as f64 {
            return Err(out_of_domain(
                "time_step",
                self.time_step,
                "time grid would exceed MAX_STEPS points",
            ));
        }
        if self.research_productivity < 0.0 {
            return Err(out_of_domain(
                "research_productivity",
                self.research_productivity,
                "must be non-negative",
            ));
        }
        if self.noise_std < 0.0 {
            return Err(out_of_domain("random_std", self.noise_std, "must be non-negative"));
        }
        if !(0.0..1.0).contains(&self.propensity_to_consume) {
            return Err(out_of_domain(
                "propensity_to_consume",
                self.propensity_to_consume,
                "must lie in [0, 1)",
            ));
        }
        unit_interval("labor_allocation", self.labor_allocation)?;
        unit_interval("job_separation_rate", self.base_separation_rate)?;
        unit_interval("job_finding_rate", self.base_finding_rate)?;
        unit_interval("initial_unemployment_rate", self.initial_unemployment_rate)?;
        if self.base_separation_rate + self.base_finding_rate <= 0.0 {
            return Err(out_of_domain(
                "job_finding_rate",
                self.base_finding_rate,
                "separation and finding rates cannot both be zero",
            ));
        }
        Ok(())
    }

    fn fields(&self) -> [(&'static str, f64); 22] {
        [
            ("A0", self.initial_knowledge),
            ("L0", self.initial_labor),
            ("gamma", self.gamma),
            ("research_productivity", self.research_productivity),
            ("population_growth", self.population_growth),
            ("labor_allocation", self.labor_allocation),
            ("time_step", self.time_step),
            ("simulation_time", self.simulation_time),
            ("random_mean", self.noise_mean),
            ("random_std", self.noise_std),
            ("propensity_to_consume", self.propensity_to_consume),
            ("aggregate_demand", self.demand_shock),
            ("b_bar", self.b_bar),
            ("inflation_sensitivity", self.inflation_sensitivity),
            ("cost_shock", self.cost_shock),
            ("m_policy", self.monetary_policy),
            ("inflation_target", self.inflation_target),
            ("initial_output_gap", self.initial_output_gap),
            ("initial_inflation", self.initial_inflation),
            ("job_separation_rate", self.base_separation_rate),
            ("job_finding_rate", self.base_finding_rate),
            ("initial_unemployment_rate", self.initial_unemployment_rate),
        ]
    }
}

fn out_of_domain(field: &'static str, value: f64, reason: &'static str) -> ConfigError {
    ConfigError::OutOfDomain { field, value, reason }
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(out_of_domain(field, value, "must be positive"))
    }
}

fn unit_interval(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(out_of_domain(field, value, "must lie in [0, 1]"))
    }
}
