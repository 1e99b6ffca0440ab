use std::collections::HashMap;

use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;

use crate::batch::{run_batch as run_batch_core, ParameterSampler, RunRecord};
use crate::config::SimulationConfig;
use crate::error::{ConfigError, SimulationError};

// ─────────────────────────────────────────────────────────────────────────────
// Python-visible results
// ─────────────────────────────────────────────────────────────────────────────

/// Time series of one run.
///
/// `output[0]` is the recursion seed, not an observation; plot
/// `output[1:]` against `time[1:]`.
#[pyclass(get_all)]
#[derive(Clone, Debug)]
pub struct PySeries {
    pub seed: u64,
    pub time: Vec<f64>,
    pub knowledge_stock: Vec<f64>,
    pub total_labor: Vec<f64>,
    pub output: Vec<f64>,
    pub output_gap: Vec<f64>,
    pub inflation: Vec<f64>,
    pub unemployment: Vec<f64>,
    pub recessions: Vec<(usize, usize)>,
    pub booms: Vec<(usize, usize)>,
}

#[pymethods]
impl PySeries {
    fn __repr__(&self) -> String {
        format!(
            "PySeries(seed={}, steps={}, recessions={}, booms={})",
            self.seed,
            self.time.len(),
            self.recessions.len(),
            self.booms.len()
        )
    }
}

/// One row of a parameter study.
#[pyclass(get_all)]
#[derive(Clone, Debug)]
pub struct PyRunRecord {
    pub run_index: usize,
    pub seed: u64,
    pub final_output: f64,
    pub final_inflation: f64,
    pub final_unemployment: f64,
    pub final_knowledge_stock: f64,
    pub recessions: usize,
    pub booms: usize,
    pub parameters: HashMap<String, f64>,
}

#[pymethods]
impl PyRunRecord {
    fn __repr__(&self) -> String {
        format!(
            "PyRunRecord(run_index={}, final_output={:.4}, final_inflation={:.4})",
            self.run_index, self.final_output, self.final_inflation
        )
    }
}

impl PyRunRecord {
    fn from_record(record: RunRecord) -> PyResult<Self> {
        let parameters = record.config.to_map().map_err(to_py_err_config)?;
        Ok(PyRunRecord {
            run_index: record.run_index,
            seed: record.seed,
            final_output: record.final_output,
            final_inflation: record.final_inflation,
            final_unemployment: record.final_unemployment,
            final_knowledge_stock: record.final_knowledge_stock,
            recessions: record.recessions,
            booms: record.booms,
            parameters,
        })
    }
}

fn to_py_err(err: SimulationError) -> PyErr {
    match err {
        SimulationError::Configuration(_) => PyValueError::new_err(err.to_string()),
        _ => PyRuntimeError::new_err(err.to_string()),
    }
}

fn to_py_err_config(err: ConfigError) -> PyErr {
    PyValueError::new_err(err.to_string())
}

// ─────────────────────────────────────────────────────────────────────────────
// Entry points
// ─────────────────────────────────────────────────────────────────────────────

/// Run one simulation.
///
/// Args:
///     config: Flat mapping of every model parameter.
///     seed: Random seed for reproducibility.
#[pyfunction]
#[pyo3(signature = (config, seed=42))]
fn run_simulation(config: HashMap<String, f64>, seed: u64) -> PyResult<PySeries> {
    let config = SimulationConfig::from_map(&config).map_err(to_py_err_config)?;
    let sim = crate::run(&config, seed).map_err(to_py_err)?;
    let series = sim.series;
    Ok(PySeries {
        seed: sim.seed,
        time: series.time().to_vec(),
        knowledge_stock: series.knowledge_stock().to_vec(),
        total_labor: series.total_labor().to_vec(),
        output: series.output().to_vec(),
        output_gap: series.output_gap().to_vec(),
        inflation: series.inflation().to_vec(),
        unemployment: series.unemployment().to_vec(),
        recessions: sim.regimes.recessions.iter().map(|r| (r.start, r.end)).collect(),
        booms: sim.regimes.booms.iter().map(|b| (b.start, b.end)).collect(),
    })
}

/// Run a parameter study; divergent samples are skipped.
#[pyfunction]
#[pyo3(signature = (base, n_runs=1000, seed=42))]
fn run_batch(
    py: Python<'_>,
    base: HashMap<String, f64>,
    n_runs: usize,
    seed: u64,
) -> PyResult<Vec<PyRunRecord>> {
    let base = SimulationConfig::from_map(&base).map_err(to_py_err_config)?;
    let report = py
        .allow_threads(|| run_batch_core(&base, &ParameterSampler::default(), n_runs, seed))
        .map_err(to_py_err)?;
    report.records.into_iter().map(PyRunRecord::from_record).collect()
}

/// Romer growth / business-cycle simulator.
#[pymodule]
#[pyo3(name = "romer_cycles")]
fn romer_cycles_module(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PySeries>()?;
    m.add_class::<PyRunRecord>()?;
    m.add_function(wrap_pyfunction!(run_simulation, m)?)?;
    m.add_function(wrap_pyfunction!(run_batch, m)?)?;
    Ok(())
}
