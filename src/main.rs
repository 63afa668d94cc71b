use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use tinsel::config::{DeviceProfile, SceneConfig};
use tinsel::error::ConfigError;

#[derive(Parser)]
#[command(name = "tinsel")]
#[command(about = "Particle Christmas tree", long_about = None)]
#[command(version)]
struct Cli {
    /// JSON scene config
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Use the reduced particle counts for small devices
    #[arg(long)]
    mobile: bool,

    /// Number of tree particles
    #[arg(short, long)]
    particles: Option<usize>,

    /// RNG seed for a reproducible scene
    #[arg(long)]
    seed: Option<u64>,

    /// Print the resolved config as JSON and exit
    #[arg(long)]
    dump_config: bool,
}

impl Cli {
    fn scene_config(&self) -> Result<SceneConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => SceneConfig::load(path)?,
            None => SceneConfig::default(),
        };
        if self.mobile {
            config.profile = DeviceProfile::Mobile;
        }
        if let Some(count) = self.particles {
            config.particle_count = Some(count);
        }
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        config.validate()?;
        Ok(config)
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let config = match cli.scene_config() {
        Ok(config) => config,
        Err(err) => {
            log::error!("{}", err);
            return ExitCode::FAILURE;
        }
    };

    if cli.dump_config {
        return match config.to_json() {
            Ok(json) => {
                println!("{}", json);
                ExitCode::SUCCESS
            }
            Err(err) => {
                log::error!("{}", err);
                ExitCode::FAILURE
            }
        };
    }

    match tinsel::run(config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{}", err);
            ExitCode::FAILURE
        }
    }
}
