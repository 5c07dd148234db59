extern crate argparse;
#[macro_use]
extern crate log;
extern crate pretty_env_logger;
extern crate serde_json;

extern crate taylormotion;

use std::env::{set_var, var};
use std::io::{self, BufWriter, Write};

use argparse::{ArgumentParser, Store, StoreOption, StoreTrue};

use taylormotion::error::{Error, SearchError};
use taylormotion::scene::{Scene, DEFAULT_SCALE};
use taylormotion::search::{SearchMachine, SearchState, DEFAULT_MAX_ATTEMPTS};
use taylormotion::{canvas, load_config, MotionStepper, Point2D, SimulationConfig, StepOutcome};

const LOG_VAR: &str = "TAYLORMOTION_LOG";

struct Overrides {
    term_count: Option<u32>,
    tolerance_radius: Option<f64>,
    step_size: Option<f64>,
    start_x: Option<f64>,
    start_y: Option<f64>,
    end_x: Option<f64>,
    end_y: Option<f64>,
}

impl Overrides {
    fn apply(&self, mut config: SimulationConfig) -> SimulationConfig {
        if let Some(t) = self.term_count {
            config.term_count = t;
        }
        if let Some(r) = self.tolerance_radius {
            config.tolerance_radius = r;
        }
        if let Some(s) = self.step_size {
            config.step_size = s;
        }
        config.start = Point2D::new(
            self.start_x.unwrap_or(config.start.x),
            self.start_y.unwrap_or(config.start.y),
        );
        config.end = Point2D::new(
            self.end_x.unwrap_or(config.end.x),
            self.end_y.unwrap_or(config.end.y),
        );
        config
    }
}

fn main() -> Result<(), Error> {
    let mut search = false;
    let mut emit_json = false;
    let mut max_attempts: u32 = DEFAULT_MAX_ATTEMPTS;
    let mut scale: f64 = DEFAULT_SCALE;
    let mut config_path = String::new();
    let mut output_fname: String = "motion.png".to_string();
    let mut overrides = Overrides {
        term_count: None,
        tolerance_radius: None,
        step_size: None,
        start_x: None,
        start_y: None,
        end_x: None,
        end_y: None,
    };
    {
        let mut argparse = ArgumentParser::new();
        argparse.set_description("Draw a point stepping toward its target along a series heading.");
        argparse.refer(&mut search).add_option(
            &["-s", "--search"],
            StoreTrue,
            "Start at one term and add terms until the point converges, drawing every attempt",
        );
        argparse.refer(&mut emit_json).add_option(
            &["--json"],
            StoreTrue,
            "Print every visited position to stdout as one JSON object per line",
        );
        argparse.refer(&mut max_attempts).add_option(
            &["--max-attempts"],
            Store,
            "Highest term count tried by --search (default 64)",
        );
        argparse.refer(&mut config_path).add_option(
            &["-c", "--config"],
            Store,
            "JSON configuration file; flags below override its values",
        );
        argparse.refer(&mut overrides.term_count).add_option(
            &["-n", "--terms"],
            StoreOption,
            "Number of series terms (default 1)",
        );
        argparse.refer(&mut overrides.tolerance_radius).add_option(
            &["-r", "--radius"],
            StoreOption,
            "Tolerance radius around the end point (default 10)",
        );
        argparse.refer(&mut overrides.step_size).add_option(
            &["--step"],
            StoreOption,
            "Distance covered per step (default 1.2)",
        );
        argparse
            .refer(&mut overrides.start_x)
            .add_option(&["--start-x"], StoreOption, "Start x (default 120)");
        argparse
            .refer(&mut overrides.start_y)
            .add_option(&["--start-y"], StoreOption, "Start y (default 120)");
        argparse
            .refer(&mut overrides.end_x)
            .add_option(&["--end-x"], StoreOption, "End x (default 620)");
        argparse
            .refer(&mut overrides.end_y)
            .add_option(&["--end-y"], StoreOption, "End y (default 1820)");
        argparse.refer(&mut scale).add_option(
            &["--scale"],
            Store,
            "Pixels per world unit (default 0.5)",
        );
        argparse.refer(&mut output_fname).add_option(
            &["-o", "--output"],
            Store,
            "Path of the output image, .png or .ppm (default 'motion.png')",
        );
        argparse.parse_args_or_exit();
    }
    init_logging();

    let base = if config_path.is_empty() {
        SimulationConfig::default()
    } else {
        load_config(&config_path)?
    };
    let config = overrides.apply(base);
    config.validate()?;
    info!("{}", config);

    let mut scene = Scene::with_scale(&config, scale)?;
    scene.draw_track();
    scene.draw_markers();

    let stdout = io::stdout();
    let mut json_out = BufWriter::new(stdout.lock());
    let mut write_err: Option<Error> = None;
    let mut record = |scene: &mut Scene, p: Point2D| {
        scene.draw_trace_point(p);
        if emit_json && write_err.is_none() {
            let written = serde_json::to_string(&p)
                .map_err(Error::from)
                .and_then(|line| writeln!(json_out, "{}", line).map_err(Error::from));
            if let Err(e) = written {
                write_err = Some(e);
            }
        }
    };

    if search {
        let mut machine = SearchMachine::new(config).max_attempts(max_attempts);
        loop {
            let state = *machine.advance_with(|p| record(&mut scene, p));
            match state {
                SearchState::Searching(n) if n > 1 => {
                    info!("{} terms: out of bounds, trying {}", n - 1, n);
                }
                SearchState::Converged(n) => {
                    info!("Converged with {} terms", n);
                    break;
                }
                SearchState::Failed { attempts } => {
                    error!("No convergence after {} term counts", attempts);
                    canvas::write_image(scene.canvas(), &output_fname)?;
                    return Err(Error::from(SearchError::Exhausted {
                        tolerance_radius: config.tolerance_radius,
                        attempts,
                    }));
                }
                SearchState::Idle | SearchState::Searching(_) => (),
            }
        }
    } else {
        let mut stepper = MotionStepper::from_config(&config);
        info!(
            "{} terms: heading {:.6} rad",
            stepper.term_count(),
            stepper.heading()
        );
        for p in stepper.by_ref() {
            record(&mut scene, p);
        }
        match stepper.outcome() {
            Some(StepOutcome::Converged(p)) => {
                info!("Converged at {} after {} steps", p, stepper.steps())
            }
            _ => warn!(
                "Went out of bounds at {} after {} steps",
                stepper.position(),
                stepper.steps()
            ),
        }
    }

    if let Some(e) = write_err {
        return Err(e);
    }
    json_out.flush()?;
    let image = scene.into_canvas();
    canvas::write_image(&image, &output_fname)?;
    info!("Wrote {}", output_fname);
    Ok(())
}

fn init_logging() {
    if var(LOG_VAR).is_err() {
        set_var(LOG_VAR, "info");
    }
    if pretty_env_logger::try_init_custom_env(LOG_VAR).is_err() {
        println!("could not init logger");
    }
}
