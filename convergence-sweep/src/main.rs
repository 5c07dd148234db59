extern crate argparse;
#[macro_use]
extern crate log;
extern crate pretty_env_logger;

extern crate taylormotion;

use std::env::{set_var, var};
use std::fs;
use std::path::Path;

use argparse::{ArgumentParser, Store};

use taylormotion::error::{ConfigError, Error};
use taylormotion::search::{sweep_parallel, DEFAULT_MAX_ATTEMPTS, REFERENCE_RADII};
use taylormotion::{canvas, load_config, results, scene, svg, SimulationConfig};

const LOG_VAR: &str = "TAYLORMOTION_LOG";

fn main() -> Result<(), Error> {
    let mut thread_count: usize = 1;
    let mut max_attempts: u32 = DEFAULT_MAX_ATTEMPTS;
    let mut config_path = String::new();
    let mut radii_arg = String::new();
    let mut data_fname = "output/data.txt".to_string();
    let mut plot_fname = "output/plot.png".to_string();
    let mut svg_fname = "output/plot.svg".to_string();
    let mut width: i64 = 1200;
    let mut height: i64 = 800;
    {
        let mut argparse = ArgumentParser::new();
        argparse.set_description(
            "Find the minimal number of series terms needed to reach the target for each \
             tolerance radius, then write the results and a chart of them.",
        );
        argparse.refer(&mut thread_count).add_option(
            &["-t", "--threads"],
            Store,
            "Number of threads to use (default 1)",
        );
        argparse.refer(&mut max_attempts).add_option(
            &["--max-attempts"],
            Store,
            "Highest term count tried before a radius is reported as not converging (default 64)",
        );
        argparse.refer(&mut config_path).add_option(
            &["-c", "--config"],
            Store,
            "JSON file with start, end, step_size and bounds_factor overrides",
        );
        argparse.refer(&mut radii_arg).add_option(
            &["--radii"],
            Store,
            "Comma separated tolerance radii (default 2,4,6,8,10,12,14,16,18,20,25,30,35,40)",
        );
        argparse.refer(&mut data_fname).add_option(
            &["-d", "--data"],
            Store,
            "Path of the tab separated results (default 'output/data.txt')",
        );
        argparse.refer(&mut plot_fname).add_option(
            &["-p", "--plot"],
            Store,
            "Path of the PNG chart (default 'output/plot.png')",
        );
        argparse.refer(&mut svg_fname).add_option(
            &["--svg"],
            Store,
            "Path of the labelled SVG chart (default 'output/plot.svg')",
        );
        argparse.refer(&mut width).add_option(&["--width"], Store, "Chart width (default 1200)");
        argparse.refer(&mut height).add_option(&["--height"], Store, "Chart height (default 800)");
        argparse.parse_args_or_exit();
    }
    init_logging();

    let config = if config_path.is_empty() {
        SimulationConfig::default()
    } else {
        load_config(&config_path)?
    };
    config.validate()?;
    scene::check_image_size(width, height)?;
    let radii = if radii_arg.is_empty() {
        REFERENCE_RADII.to_vec()
    } else {
        parse_radii(&radii_arg)?
    };
    info!("{}", config);
    info!("Sweeping {} tolerance radii on {} threads", radii.len(), thread_count);

    let sweep = sweep_parallel(&config, &radii, max_attempts, thread_count)?;

    ensure_parent(&data_fname)?;
    results::write_results_file(&data_fname, &sweep)?;
    info!("Wrote results to {}", data_fname);

    // The charts are drawn from what landed on disk, not from the in-memory sweep.
    let stored = results::read_results_file(&data_fname)?;
    ensure_parent(&plot_fname)?;
    let chart = scene::render_chart(&stored, width, height)?;
    canvas::write_png(&chart, &plot_fname)?;
    info!("Wrote chart to {}", plot_fname);

    ensure_parent(&svg_fname)?;
    let labelled = scene::render_chart_svg(&stored, width, height)?;
    svg::write_svg(&labelled, &svg_fname)?;
    info!("Wrote labelled chart to {}", svg_fname);
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

fn parse_radii(arg: &str) -> Result<Vec<f64>, ConfigError> {
    let mut radii = vec![];
    for token in arg.split(',') {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }
        match token.parse::<f64>() {
            Ok(r) if r > 0.0 => radii.push(r),
            Ok(r) => return Err(ConfigError::ToleranceRadius(r)),
            Err(_) => return Err(ConfigError::Radius(token.to_string())),
        }
    }
    Ok(radii)
}

fn ensure_parent(fname: &str) -> Result<(), Error> {
    if let Some(parent) = Path::new(fname).parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
