use approx::assert_relative_eq;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};

use rusty_neuron::error::SimError;
use rusty_neuron::input::InputSpec;
use rusty_neuron::neuron::lif::{LifNeuron, ResetPolicy};
use rusty_neuron::neuron::rate::RateNeuron;
use rusty_neuron::noise::OuParameters;
use rusty_neuron::simulation::{run_sweep, Models, Simulation, SimulationConfig};
use rusty_neuron::stepper::integrate;
use rusty_neuron::stimulus::StimulusWindow;

const SEED: u64 = 42;

fn lif() -> LifNeuron {
    LifNeuron::build(10.0, -70.0, -50.0).unwrap()
}

#[test]
fn test_initial_value_is_kept() {
    for initial_state in [-3.0, 0.0, 12.5] {
        let config = SimulationConfig::build(0.1, 0.0, 10.0)
            .unwrap()
            .with_initial_state(initial_state)
            .unwrap();
        let models = Models::RateAndLif {
            rate: RateNeuron::build(5.0).unwrap(),
            lif: lif(),
        };
        let input = InputSpec::Stimulus(StimulusWindow::build(0.0, 10.0, 1.0).unwrap());
        let result = Simulation::build(config, models, input).unwrap().run().unwrap();

        assert_eq!(result.rate().unwrap()[0], initial_state);
        assert_eq!(result.potential().unwrap()[0], initial_state);
    }
}

#[test]
fn test_euler_converges_at_first_order() {
    let error = |dt: f64| {
        let trajectory = integrate(|r, _| 2.0 * r, |_, _| 0.0, dt, 2.0, 0.0, 1.0).unwrap();
        (trajectory.last().unwrap() - 2.0 * 2_f64.exp()).abs()
    };

    let ratio = error(0.001) / error(0.0005);
    assert_relative_eq!(ratio, 2.0, epsilon = 0.05);
}

#[test]
fn test_invalid_parameters_fail_before_stepping() {
    assert!(matches!(
        SimulationConfig::build(-0.1, 0.0, 10.0),
        Err(SimError::InvalidParameter(_))
    ));
    assert!(matches!(
        SimulationConfig::build(0.1, 10.0, 10.0),
        Err(SimError::InvalidParameter(_))
    ));
    assert!(matches!(
        StimulusWindow::build(50.0, 10.0, 1.0),
        Err(SimError::InvalidParameter(_))
    ));
    assert!(matches!(RateNeuron::build(0.0), Err(SimError::DomainError(_))));
    assert!(matches!(
        LifNeuron::build(-1.0, -70.0, -50.0),
        Err(SimError::DomainError(_))
    ));
    assert!(matches!(
        OuParameters::build(0.0, 0.0, 1.0),
        Err(SimError::DomainError(_))
    ));
}

#[test]
fn test_lif_first_spike_regression() {
    let config = SimulationConfig::build(0.1, 0.0, 100.0).unwrap();
    let input = InputSpec::Stimulus(StimulusWindow::build(10.0, 100.0, 50.0).unwrap());

    for reset in [ResetPolicy::Reference, ResetPolicy::Clamp] {
        let models = Models::Lif(lif().with_reset(reset));
        let result = Simulation::build(config, models, input.clone())
            .unwrap()
            .run()
            .unwrap();

        // the reset policy has no effect before the first spike
        assert_eq!(result.spikes().first(), Some(&151));
        assert!(result.potential().unwrap()[151] >= -50.0);
        assert!(result.potential().unwrap()[150] < -50.0);
    }
}

#[test]
fn test_reset_policies_diverge_after_first_spike() {
    let config = SimulationConfig::build(0.1, 0.0, 100.0).unwrap();
    let input = InputSpec::Stimulus(StimulusWindow::build(10.0, 100.0, 50.0).unwrap());

    let reference = Simulation::build(config, Models::Lif(lif()), input.clone())
        .unwrap()
        .run()
        .unwrap();
    let clamp = Simulation::build(
        config,
        Models::Lif(lif().with_reset(ResetPolicy::Clamp)),
        input,
    )
    .unwrap()
    .run()
    .unwrap();

    // the approximate reset stops short of the resting potential, hence fires more often
    assert_ne!(reference.spikes(), clamp.spikes());
    assert!(reference.spikes().len() > clamp.spikes().len());
}

#[test]
fn test_noise_input_statistics() {
    let config = SimulationConfig::build(0.1, 0.0, 50_000.0).unwrap();
    let params = OuParameters::build(10.0, 3.0, 2.0).unwrap();

    let run = |seed| {
        let input = InputSpec::Noise { params, seed };
        Simulation::build(config, Models::Rate(RateNeuron::build(1.0).unwrap()), input)
            .unwrap()
            .run()
            .unwrap()
    };
    let result_1 = run(SEED);
    let result_2 = run(SEED);
    let result_3 = run(SEED + 1);

    assert_eq!(result_1.input(), result_2.input());
    assert_ne!(result_1.input(), result_3.input());

    for result in [&result_1, &result_3] {
        let values = &result.input()[1_000..];
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1.0);
        assert!((mean - 3.0).abs() < 0.25, "mean {} is not ~3", mean);
        assert!((variance - 4.0).abs() < 0.5, "variance {} is not ~4", variance);
    }
}

#[test]
fn test_sweep_over_input_amplitude() {
    let config = SimulationConfig::build(0.1, 0.0, 200.0).unwrap();
    let simulations: Vec<Simulation> = [10.0, 30.0, 50.0, 80.0]
        .iter()
        .map(|&amplitude| {
            let input = InputSpec::Stimulus(StimulusWindow::build(0.0, 200.0, amplitude).unwrap());
            Simulation::build(config, Models::Lif(lif()), input).unwrap()
        })
        .collect();

    let rates: Vec<f64> = run_sweep(&simulations)
        .into_iter()
        .map(|result| result.unwrap().firing_rate())
        .collect();

    // subthreshold input never fires
    assert_eq!(rates[0], 0.0);
    assert!(rates.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn test_simulation_from_json_file() {
    let json = r#"{
        "config": {"dt": 0.1, "start": 0.0, "end": 100.0},
        "models": {"kind": "lif", "tau": 10.0, "e_l": -70.0, "theta_s": -50.0},
        "input": {"kind": "stimulus", "onset": 10.0, "offset": 100.0, "amplitude": 50.0}
    }"#;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("simulation.json");
    let mut file = File::create(&path).unwrap();
    file.write_all(json.as_bytes()).unwrap();

    let simulation: Simulation =
        serde_json::from_reader(BufReader::new(File::open(&path).unwrap())).unwrap();
    simulation.validate().unwrap();

    let expected = Simulation::build(
        SimulationConfig::build(0.1, 0.0, 100.0).unwrap(),
        Models::Lif(lif()),
        InputSpec::Stimulus(StimulusWindow::build(10.0, 100.0, 50.0).unwrap()),
    )
    .unwrap();
    assert_eq!(simulation, expected);
    assert_eq!(simulation.run().unwrap().spikes()[0], 151);

    // round trip through a file
    let path = dir.path().join("copy.json");
    let mut writer = BufWriter::new(File::create(&path).unwrap());
    serde_json::to_writer_pretty(&mut writer, &simulation).unwrap();
    writer.flush().unwrap();
    let copy: Simulation =
        serde_json::from_reader(BufReader::new(File::open(&path).unwrap())).unwrap();
    assert_eq!(copy, simulation);
}

#[test]
fn test_invalid_json_simulation_is_rejected() {
    let json = r#"{
        "config": {"dt": 0.1, "start": 0.0, "end": 100.0},
        "models": {"kind": "rate", "tau": 0.0},
        "input": {"kind": "stimulus", "onset": 10.0, "offset": 100.0, "amplitude": 50.0}
    }"#;
    let simulation: Simulation = serde_json::from_str(json).unwrap();
    assert!(matches!(simulation.validate(), Err(SimError::DomainError(_))));
    assert!(matches!(simulation.run(), Err(SimError::DomainError(_))));
}
