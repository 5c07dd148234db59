extern crate taylormotion;

use std::env;
use std::fs;
use std::path::PathBuf;

use taylormotion::search::{sweep, ConvergenceSearch, DEFAULT_MAX_ATTEMPTS, REFERENCE_RADII};
use taylormotion::{canvas, results, scene, svg};
use taylormotion::{MotionStepper, SimulationConfig, StepOutcome};

fn scratch_dir(name: &str) -> PathBuf {
    let dir = env::temp_dir().join(format!("taylormotion-{}-{}", name, std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn reference_sweep_needs_fewer_terms_for_looser_tolerance() {
    let config = SimulationConfig::default();
    let sweep = sweep(&config, &REFERENCE_RADII, DEFAULT_MAX_ATTEMPTS).unwrap();

    let radii: Vec<f64> = sweep.iter().map(|r| r.tolerance_radius).collect();
    assert_eq!(radii, REFERENCE_RADII.to_vec());

    let terms: Vec<u32> = sweep.iter().map(|r| r.term_count).collect();
    for pair in terms.windows(2) {
        assert!(pair[1] <= pair[0], "term counts went up: {:?}", terms);
    }
    assert_eq!(terms, vec![4, 4, 4, 4, 3, 3, 3, 3, 3, 3, 3, 3, 3, 3]);
}

#[test]
fn minimal_term_count_is_the_boundary() {
    let config = SimulationConfig::default();
    let minimal = ConvergenceSearch::new(config).minimal_terms().unwrap();
    assert_eq!(minimal.term_count, 3);
    for terms in 1..minimal.term_count {
        assert_eq!(
            MotionStepper::new(&config, terms).run(),
            StepOutcome::OutOfBounds
        );
    }
    match MotionStepper::new(&config, minimal.term_count).run() {
        StepOutcome::Converged(p) => assert!(p.distance(config.end) <= config.tolerance_radius),
        StepOutcome::OutOfBounds => panic!("minimal term count did not converge"),
    }
}

#[test]
fn results_survive_the_round_trip_through_disk() {
    let dir = scratch_dir("results");
    let data = dir.join("data.txt");
    let config = SimulationConfig::default();
    let sweep = sweep(&config, &[2.0, 10.0, 40.0], DEFAULT_MAX_ATTEMPTS).unwrap();

    results::write_results_file(&data, &sweep).unwrap();
    let text = fs::read_to_string(&data).unwrap();
    assert_eq!(text, "tolerance radius\tterm count\n2\t4\n10\t3\n40\t3\n");
    assert_eq!(results::read_results_file(&data).unwrap(), sweep);

    let plot = dir.join("plot.png");
    let chart = scene::render_chart(&sweep, 1200, 800).unwrap();
    canvas::write_png(&chart, &plot).unwrap();
    assert!(fs::metadata(&plot).unwrap().len() > 0);

    let labelled = dir.join("plot.svg");
    let doc = scene::render_chart_svg(&sweep, 1200, 800).unwrap();
    svg::write_svg(&doc, &labelled).unwrap();
    let text = fs::read_to_string(&labelled).unwrap();
    assert!(text.contains(scene::CHART_TITLE));
    assert!(text.contains(">tolerance radius</text>"));
    assert!(text.contains(">40</text>"));

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn scene_writes_ppm() {
    let dir = scratch_dir("scene");
    let config = SimulationConfig::default().with_term_count(3);
    let mut scene = scene::Scene::new(&config).unwrap();
    scene.draw_track();
    scene.draw_markers();
    let outcome = MotionStepper::from_config(&config).run_with(|p| scene.draw_trace_point(p));
    assert!(outcome.is_converged());

    let ppm = dir.join("motion.ppm");
    canvas::write_image(scene.canvas(), &ppm).unwrap();
    let text = fs::read_to_string(&ppm).unwrap();
    assert!(text.starts_with("P3\n# Created by taylormotion\n340 940\n255\n"));
    assert_eq!(text.lines().count(), 4 + 340 * 940);

    fs::remove_dir_all(&dir).unwrap();
}
