use clap::{Parser, ValueEnum};
use log::LevelFilter;
use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;
use std::error::Error;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::PathBuf;

use rusty_neuron::error::SimError;
use rusty_neuron::input::InputSpec;
use rusty_neuron::neuron::lif::{LifNeuron, ResetPolicy};
use rusty_neuron::neuron::rate::RateNeuron;
use rusty_neuron::noise::OuParameters;
use rusty_neuron::simulation::{Models, Simulation, SimulationConfig};
use rusty_neuron::stimulus::StimulusWindow;

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ModelArg {
    Rate,
    Lif,
    Both,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum InputArg {
    Stimulus,
    Noise,
    NoisyStimulus,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ResetArg {
    Reference,
    Clamp,
}

#[derive(Parser, Debug)]
#[command(about = "Simulate a rate and/or LIF neuron and print the recorded series as JSON")]
struct Args {
    /// A JSON file describing the whole simulation; all other simulation flags are ignored
    #[arg(long)]
    config: Option<PathBuf>,
    /// Where to write the result (defaults to stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// The log level, one of: off, error, warn, info, debug, trace
    #[arg(long, default_value = "info")]
    log_level: String,
    /// The simulated model(s)
    #[arg(long, value_enum, default_value = "lif")]
    model: ModelArg,
    /// The step size
    #[arg(long, default_value = "0.1")]
    dt: f64,
    /// The start of the simulation
    #[arg(long, default_value = "0.0")]
    start: f64,
    /// The end of the simulation
    #[arg(long, default_value = "100.0")]
    end: f64,
    /// The initial state of every model (defaults to each model's resting state)
    #[arg(long)]
    initial_state: Option<f64>,
    /// The time constant of the rate neuron
    #[arg(long, default_value = "20.0")]
    tau_rate: f64,
    /// The membrane time constant of the LIF neuron
    #[arg(long, default_value = "10.0")]
    tau_lif: f64,
    /// The resting potential of the LIF neuron
    #[arg(long, default_value = "-70.0")]
    e_l: f64,
    /// The firing threshold of the LIF neuron
    #[arg(long, default_value = "-50.0")]
    theta_s: f64,
    /// The reset policy of the LIF neuron
    #[arg(long, value_enum, default_value = "reference")]
    reset: ResetArg,
    /// The input current
    #[arg(long, value_enum, default_value = "stimulus")]
    input: InputArg,
    /// The stimulus onset, relative to the start
    #[arg(long, default_value = "10.0")]
    onset: f64,
    /// The stimulus offset, relative to the start (defaults to the end of the simulation)
    #[arg(long)]
    offset: Option<f64>,
    /// The stimulus amplitude
    #[arg(long, default_value = "50.0")]
    amplitude: f64,
    /// The time constant of the noise
    #[arg(long, default_value = "10.0")]
    tau_noise: f64,
    /// The mean of the noise
    #[arg(long, default_value = "0.0")]
    mu: f64,
    /// The fluctuation scale of the noise
    #[arg(long, default_value = "1.0")]
    sigma: f64,
    /// The mean-reversion rate of the noise
    #[arg(long, default_value = "1.0")]
    theta: f64,
    /// The seed of the noise
    #[arg(long, default_value = "0")]
    seed: u64,
}

impl Args {
    fn simulation(&self) -> Result<Simulation, Box<dyn Error>> {
        if let Some(path) = &self.config {
            let reader = BufReader::new(File::open(path)?);
            let simulation: Simulation = serde_json::from_reader(reader)?;
            simulation.validate()?;
            return Ok(simulation);
        }

        let mut config = SimulationConfig::build(self.dt, self.start, self.end)?;
        if let Some(initial_state) = self.initial_state {
            config = config.with_initial_state(initial_state)?;
        }

        let reset = match self.reset {
            ResetArg::Reference => ResetPolicy::Reference,
            ResetArg::Clamp => ResetPolicy::Clamp,
        };
        let lif = || -> Result<LifNeuron, Box<dyn Error>> {
            Ok(LifNeuron::build(self.tau_lif, self.e_l, self.theta_s)?.with_reset(reset))
        };
        let models = match self.model {
            ModelArg::Rate => Models::Rate(RateNeuron::build(self.tau_rate)?),
            ModelArg::Lif => Models::Lif(lif()?),
            ModelArg::Both => Models::RateAndLif {
                rate: RateNeuron::build(self.tau_rate)?,
                lif: lif()?,
            },
        };

        let stimulus = || {
            StimulusWindow::build(
                self.onset,
                self.offset.unwrap_or(config.duration()),
                self.amplitude,
            )
        };
        let params = || -> Result<OuParameters, SimError> {
            OuParameters::build(self.tau_noise, self.mu, self.sigma)?.with_theta(self.theta)
        };
        let input = match self.input {
            InputArg::Stimulus => InputSpec::Stimulus(stimulus()?),
            InputArg::Noise => InputSpec::Noise {
                params: params()?,
                seed: self.seed,
            },
            InputArg::NoisyStimulus => InputSpec::NoisyStimulus {
                stimulus: stimulus()?,
                params: params()?,
                seed: self.seed,
            },
        };

        Ok(Simulation::build(config, models, input)?)
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let level: LevelFilter = args
        .log_level
        .parse()
        .map_err(|_| format!("invalid log level: {}", args.log_level))?;

    let stderr = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new("{l} - {m}\n")))
        .build();
    let config = Config::builder()
        .appender(Appender::builder().build("stderr", Box::new(stderr)))
        .build(Root::builder().appender("stderr").build(level))?;
    log4rs::init_config(config)?;

    log::debug!("{:?}", args);

    let simulation = args.simulation()?;
    log::info!(
        "Simulating {:?} over [{}, {}) with dt = {}",
        simulation.models(),
        simulation.config().start(),
        simulation.config().end(),
        simulation.config().dt()
    );

    let result = simulation.run()?;
    log::info!(
        "Simulation: done! {} steps, {} spikes",
        result.num_steps(),
        result.spikes().len()
    );

    match &args.output {
        Some(path) => {
            let mut writer = BufWriter::new(File::create(path)?);
            serde_json::to_writer_pretty(&mut writer, &result)?;
            writer.flush()?;
            log::info!("Result saved to {}", path.display());
        }
        None => {
            let mut writer = BufWriter::new(std::io::stdout().lock());
            serde_json::to_writer_pretty(&mut writer, &result)?;
            writeln!(writer)?;
        }
    }
    Ok(())
}
