extern crate crossbeam_channel;
extern crate csv;
extern crate image;
extern crate serde;
extern crate serde_json;
extern crate thiserror;

#[macro_use]
extern crate log;
#[macro_use]
extern crate serde_derive;

pub mod canvas;
pub mod error;
pub mod motion;
pub mod results;
pub mod scene;
pub mod search;
pub mod series;
pub mod svg;

pub use error::{ConfigError, Error, SearchError};
pub use motion::{MotionStepper, Point2D, SimulationConfig, StepOutcome};
pub use search::{
    sweep, sweep_parallel, ConvergenceResult, ConvergenceSearch, SearchMachine, SearchState,
};

/// Reads a JSON configuration file. Missing fields keep their default values.
pub fn load_config<P: AsRef<std::path::Path>>(path: P) -> Result<SimulationConfig, Error> {
    let f = std::fs::File::open(path)?;
    let config: SimulationConfig = serde_json::from_reader(std::io::BufReader::new(f))?;
    Ok(config)
}
