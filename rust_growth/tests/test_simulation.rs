//! End-to-end runs through the krabmaga-scheduled orchestrator.

use romer_cycles::{
    run, run_with_source, EconomyState, RandomSource, SimulationConfig, SimulationError,
};

/// No growth, no noise, four unit steps: every value follows by hand.
fn closed_form_config() -> SimulationConfig {
    SimulationConfig {
        initial_knowledge: 1.0,
        initial_labor: 1.0,
        gamma: 1.0,
        research_productivity: 0.0,
        population_growth: 0.0,
        labor_allocation: 1.0,
        time_step: 1.0,
        simulation_time: 4.0,
        noise_mean: 0.0,
        noise_std: 0.0,
        ..SimulationConfig::default()
    }
}

#[test]
fn closed_form_path() {
    let cfg = closed_form_config();
    let sim = run(&cfg, 99).unwrap();
    let series = &sim.series;

    assert!(sim.regimes.recessions.is_empty());
    assert!(sim.regimes.booms.is_empty());
    assert!(series.is_complete());
    assert_eq!(series.len(), 4);
    assert_eq!(series.time(), &[0.0, 1.0, 2.0, 3.0]);
    assert!(series.knowledge_stock().iter().all(|&a| a == 1.0));

    let (sep, find) = (cfg.base_separation_rate, cfg.base_finding_rate);
    let mut unemployment = cfg.initial_unemployment_rate;
    let mut gap = cfg.initial_output_gap;
    let mut inflation = cfg.initial_inflation;
    let mut output = 0.0;
    for t in 1..4 {
        let labor = 1.0 - unemployment;
        unemployment = labor * (sep / (sep + find));
        let next_gap = -(cfg.b_bar * cfg.monetary_policy / (1.0 - cfg.propensity_to_consume))
            * (inflation - cfg.inflation_target);
        let next_inflation = inflation + cfg.inflation_sensitivity * gap;
        gap = next_gap;
        inflation = next_inflation;
        output = labor + gap * output;

        assert!((series.total_labor()[t] - labor).abs() < 1e-12);
        assert!((series.unemployment()[t] - unemployment).abs() < 1e-12);
        assert!((series.output_gap()[t] - gap).abs() < 1e-12);
        assert!((series.inflation()[t] - inflation).abs() < 1e-12);
        assert!((series.output()[t] - output).abs() < 1e-12);
    }
    assert_eq!(series.observed_output().len(), 3);
}

#[test]
fn same_seed_is_bit_identical() {
    let cfg = SimulationConfig::default();
    let a = run(&cfg, 2024).unwrap();
    let b = run(&cfg, 2024).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.series.len(), 400);
}

#[test]
fn different_seeds_differ() {
    let cfg = SimulationConfig::default();
    let a = run(&cfg, 1).unwrap();
    let b = run(&cfg, 2).unwrap();
    assert_ne!(a.series.output(), b.series.output());
}

#[test]
fn scheduled_run_matches_manual_stepping() {
    let cfg = SimulationConfig::default();
    let scheduled = run(&cfg, 17).unwrap();

    let mut state = EconomyState::new(cfg, RandomSource::new(17));
    for _ in 1..state.steps() {
        state.resolve_labor_rates();
        state.advance_period();
        state.finish_period();
    }
    assert_eq!(state.regimes, scheduled.regimes);
    assert_eq!(state.series, scheduled.series);
}

#[test]
fn unit_propensity_fails_before_any_draw() {
    let cfg = SimulationConfig {
        propensity_to_consume: 1.0,
        ..SimulationConfig::default()
    };
    let mut rng = RandomSource::new(5);
    let err = run_with_source(&cfg, &mut rng).unwrap_err();
    assert!(err.is_configuration());
    assert_eq!(rng.draws(), 0);

    // The source still replays from its seed.
    let mut fresh = RandomSource::new(5);
    assert_eq!(rng.normal(0.0, 1.0).unwrap(), fresh.normal(0.0, 1.0).unwrap());
}

#[test]
fn oversized_time_grid_is_rejected_before_any_draw() {
    let cfg = SimulationConfig {
        time_step: 1e-300,
        ..SimulationConfig::default()
    };
    let mut rng = RandomSource::new(8);
    let err = run_with_source(&cfg, &mut rng).unwrap_err();
    assert!(err.is_configuration());
    assert!(err.to_string().contains("time_step"));
    assert_eq!(rng.draws(), 0);
}

#[test]
fn run_with_source_advances_the_source() {
    let cfg = SimulationConfig::default();
    let mut rng = RandomSource::new(5);
    let sim = run_with_source(&cfg, &mut rng).unwrap();
    assert!(rng.draws() >= 399);
    assert_eq!(sim, run(&cfg, 5).unwrap());
}

#[test]
fn overflow_aborts_with_partial_series() {
    let cfg = SimulationConfig {
        gamma: 1e6,
        labor_allocation: 0.5,
        noise_std: 0.0,
        ..SimulationConfig::default()
    };
    match run(&cfg, 3) {
        Err(SimulationError::ModelDivergence {
            step,
            quantity,
            value,
            last_finite,
            partial,
        }) => {
            assert_eq!(step, 1);
            assert_eq!(quantity, "output");
            assert!(value.is_infinite());
            assert_eq!(partial.len(), 1);
            assert_eq!(last_finite.knowledge_stock, 1.0);
            assert_eq!(Some(last_finite), partial.snapshot(0));
        }
        other => panic!("expected divergence, got {other:?}"),
    }
}

#[test]
fn large_finite_values_only_warn() {
    let cfg = SimulationConfig {
        demand_shock: 8.0,
        simulation_time: 5.0,
        noise_std: 0.0,
        ..SimulationConfig::default()
    };
    let sim = run(&cfg, 4).unwrap();
    assert!(sim.series.is_complete());
    let first = sim.first_instability.expect("output should pass the threshold");
    assert!(first < 20);
    assert!(sim.series.output().iter().all(|y| y.is_finite()));
}

#[test]
fn collapse_toward_zero_only_warns() {
    // Strongly negative returns to ideas drive output toward zero while the
    // AS-DS block sits on target with a zero gap.
    let cfg = SimulationConfig {
        gamma: -20_000.0,
        simulation_time: 5.0,
        noise_std: 0.0,
        ..SimulationConfig::default()
    };
    let sim = run(&cfg, 4).unwrap();
    assert!(sim.series.is_complete());
    assert_eq!(sim.first_instability, Some(1));
    assert!(sim.series.observed_output().iter().all(|y| y.is_finite() && y.abs() < 1e-12));
}
