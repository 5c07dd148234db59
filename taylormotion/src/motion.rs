use std::fmt;
use std::ops::{Add, Sub};

use crate::error::ConfigError;
use crate::series;

/// A position on the plane, in the same units as the configured start and end points.
#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Add<Point2D> for Point2D {
    type Output = Point2D;
    #[inline]
    fn add(self, _rhs: Point2D) -> Point2D {
        Point2D {
            x: self.x + _rhs.x,
            y: self.y + _rhs.y,
        }
    }
}

impl Sub<Point2D> for Point2D {
    type Output = Point2D;
    #[inline]
    fn sub(self, _rhs: Point2D) -> Point2D {
        Point2D {
            x: self.x - _rhs.x,
            y: self.y - _rhs.y,
        }
    }
}

impl fmt::Display for Point2D {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({:7.2}, {:7.2})", self.x, self.y)
    }
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Point2D {
        Point2D { x, y }
    }
    /// Euclidean distance, computed from scratch each call.
    pub fn distance(&self, other: Point2D) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

/// Everything a single run needs. The caller owns it and hands out copies; nothing in the core
/// keeps a reference to it between runs.
#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct SimulationConfig {
    pub start: Point2D,
    pub end: Point2D,
    pub step_size: f64,
    pub term_count: u32,
    pub tolerance_radius: f64,
    /// The bounds guard sits `bounds_factor * tolerance_radius` past the end point's x.
    pub bounds_factor: f64,
}

impl Default for SimulationConfig {
    fn default() -> SimulationConfig {
        SimulationConfig {
            start: Point2D::new(120.0, 120.0),
            end: Point2D::new(620.0, 1820.0),
            step_size: 1.2,
            term_count: 1,
            tolerance_radius: 10.0,
            bounds_factor: 2.0,
        }
    }
}

impl fmt::Display for SimulationConfig {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "SimulationConfig{{
    start: {},
    end: {},
    step_size: {},
    term_count: {},
    tolerance_radius: {},
    bounds_factor: {}
}}",
            self.start,
            self.end,
            self.step_size,
            self.term_count,
            self.tolerance_radius,
            self.bounds_factor
        )
    }
}

impl SimulationConfig {
    pub fn with_term_count(mut self, term_count: u32) -> SimulationConfig {
        self.term_count = term_count;
        self
    }
    pub fn with_tolerance_radius(mut self, tolerance_radius: f64) -> SimulationConfig {
        self.tolerance_radius = tolerance_radius;
        self
    }
    pub fn with_points(mut self, start: Point2D, end: Point2D) -> SimulationConfig {
        self.start = start;
        self.end = end;
        self
    }

    pub fn bounds_margin(&self) -> f64 {
        self.bounds_factor * self.tolerance_radius
    }

    /// Maximum number of steps a run may take before it is abandoned as out of bounds. This is
    /// eight times the straight-line step count to the far edge of the bounds guard, so an
    /// accurate heading never comes near it. It only matters when a low-order cosine turns
    /// negative and x stops advancing toward the bounds guard.
    pub fn step_limit(&self) -> usize {
        let reach = self.start.distance(self.end) + self.bounds_margin();
        let steps = (8.0 * reach / self.step_size).ceil() as usize;
        steps.max(1)
    }

    /// True when the end point lies toward increasing x, the only direction the stepper moves.
    pub fn heads_forward(&self) -> bool {
        self.end.x > self.start.x
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.step_size > 0.0) {
            return Err(ConfigError::StepSize(self.step_size));
        }
        if !(self.tolerance_radius > 0.0) {
            return Err(ConfigError::ToleranceRadius(self.tolerance_radius));
        }
        if self.term_count == 0 {
            return Err(ConfigError::TermCount);
        }
        if !(self.bounds_factor > 0.0) {
            return Err(ConfigError::BoundsFactor(self.bounds_factor));
        }
        if self.start.x == self.end.x {
            return Err(ConfigError::VerticalTrack(self.start.x));
        }
        if !self.heads_forward() {
            warn!(
                "end point {} lies behind start point {} in x, the run will go out of bounds",
                self.end, self.start
            );
        }
        Ok(())
    }
}

/// How a run ended.
#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq)]
pub enum StepOutcome {
    /// The point entered the tolerance circle; carries the first position inside it.
    Converged(Point2D),
    /// The point passed the bounds guard (or ran out of steps) before reaching the circle.
    OutOfBounds,
}

impl StepOutcome {
    pub fn is_converged(&self) -> bool {
        match *self {
            StepOutcome::Converged(_) => true,
            StepOutcome::OutOfBounds => false,
        }
    }
}

/// Walks a point from `start` toward `end` along a heading taken from the series arctangent. The
/// stepper is an iterator over the positions it visits; once it is exhausted `outcome` says how
/// the run ended.
///
/// The heading always comes from |dy| / |dx| and x always increases, so an end point to the
/// left of the start never converges.
#[derive(Clone, Debug)]
pub struct MotionStepper {
    end: Point2D,
    tolerance_radius: f64,
    bound_x: f64,
    step_limit: usize,
    term_count: u32,
    heading: f64,
    displacement: Point2D,
    position: Point2D,
    steps: usize,
    outcome: Option<StepOutcome>,
}

impl MotionStepper {
    pub fn new(config: &SimulationConfig, term_count: u32) -> MotionStepper {
        let span = config.end - config.start;
        let heading = series::arctan(span.y.abs() / span.x.abs(), term_count);
        let displacement = Point2D::new(
            series::cos(heading, term_count) * config.step_size,
            series::sin(heading, term_count) * config.step_size,
        );
        debug!(
            "{} terms: heading {:.6} rad, step {}",
            term_count, heading, displacement
        );

        let outcome = if config.start.distance(config.end) <= config.tolerance_radius {
            Some(StepOutcome::Converged(config.start))
        } else {
            None
        };
        MotionStepper {
            end: config.end,
            tolerance_radius: config.tolerance_radius,
            bound_x: config.end.x + config.bounds_margin(),
            step_limit: config.step_limit(),
            term_count,
            heading,
            displacement,
            position: config.start,
            steps: 0,
            outcome,
        }
    }

    /// A stepper using the term count stored in the configuration.
    pub fn from_config(config: &SimulationConfig) -> MotionStepper {
        MotionStepper::new(config, config.term_count)
    }

    pub fn heading(&self) -> f64 {
        self.heading
    }

    pub fn term_count(&self) -> u32 {
        self.term_count
    }

    pub fn position(&self) -> Point2D {
        self.position
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    /// `None` while the run is still in progress.
    pub fn outcome(&self) -> Option<StepOutcome> {
        self.outcome
    }

    /// Drives the run to its end, handing every visited position to `sink`.
    pub fn run_with<F>(mut self, mut sink: F) -> StepOutcome
    where
        F: FnMut(Point2D),
    {
        while let Some(p) = self.next() {
            sink(p);
        }
        self.finish()
    }

    pub fn run(self) -> StepOutcome {
        self.run_with(|_| ())
    }

    /// Runs to the end and keeps every visited position.
    pub fn trace(self) -> (Vec<Point2D>, StepOutcome) {
        let mut points = Vec::new();
        let outcome = self.run_with(|p| points.push(p));
        (points, outcome)
    }

    fn finish(&self) -> StepOutcome {
        self.outcome.unwrap_or(StepOutcome::OutOfBounds)
    }
}

impl Iterator for MotionStepper {
    type Item = Point2D;

    fn next(&mut self) -> Option<Point2D> {
        if self.outcome.is_some() {
            return None;
        }
        self.position = self.position + self.displacement;
        self.steps += 1;

        let dist = self.position.distance(self.end);
        if self.position.x > self.bound_x {
            self.outcome = Some(StepOutcome::OutOfBounds);
        } else if dist <= self.tolerance_radius {
            self.outcome = Some(StepOutcome::Converged(self.position));
        } else if self.steps >= self.step_limit {
            debug!(
                "{} terms: gave up after {} steps at {}",
                self.term_count, self.steps, self.position
            );
            self.outcome = Some(StepOutcome::OutOfBounds);
        }
        Some(self.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn reference() -> SimulationConfig {
        SimulationConfig::default()
    }

    #[test]
    fn converges_with_many_terms() {
        let config = reference();
        match MotionStepper::new(&config, 20).run() {
            StepOutcome::Converged(p) => {
                assert!(p.distance(config.end) <= config.tolerance_radius);
            }
            StepOutcome::OutOfBounds => panic!("20 terms should reach the target"),
        }
    }

    #[test]
    fn one_term_goes_out_of_bounds() {
        let config = reference();
        let stepper = MotionStepper::new(&config, 1);
        // With one term cos is exactly 1, so every step moves x by exactly the step size.
        assert_abs_diff_eq!(stepper.displacement.x, config.step_size, epsilon = 1e-12);
        let (points, outcome) = stepper.trace();
        assert_eq!(outcome, StepOutcome::OutOfBounds);
        let last = points.last().unwrap();
        assert!(last.x > config.end.x + config.bounds_margin());
        assert_eq!(points.len(), 434);
    }

    #[test]
    fn heading_is_fixed_for_the_run() {
        let config = reference();
        let mut stepper = MotionStepper::new(&config, 4);
        let heading = stepper.heading();
        let a = stepper.next().unwrap();
        let b = stepper.next().unwrap();
        let c = stepper.next().unwrap();
        assert_eq!(stepper.heading(), heading);
        assert_abs_diff_eq!((b - a).x, (c - b).x, epsilon = 1e-9);
        assert_abs_diff_eq!((b - a).y, (c - b).y, epsilon = 1e-9);
    }

    #[test]
    fn runs_are_deterministic_and_restartable() {
        let config = reference().with_term_count(5);
        let first: Vec<Point2D> = MotionStepper::from_config(&config).collect();
        let second: Vec<Point2D> = MotionStepper::from_config(&config).collect();
        assert_eq!(first, second);

        let stepper = MotionStepper::from_config(&config);
        let cloned: Vec<Point2D> = stepper.clone().collect();
        assert_eq!(cloned, first);
    }

    #[test]
    fn exhausted_stepper_stays_exhausted() {
        let config = reference();
        let mut stepper = MotionStepper::new(&config, 1);
        assert_eq!(stepper.steps(), 0);
        assert_eq!(stepper.position(), config.start);
        let mut last = config.start;
        for p in stepper.by_ref() {
            last = p;
        }
        assert_eq!(stepper.outcome(), Some(StepOutcome::OutOfBounds));
        assert_eq!(stepper.steps(), 434);
        assert_eq!(stepper.position(), last);
        assert_eq!(stepper.next(), None);
        assert_eq!(stepper.outcome(), Some(StepOutcome::OutOfBounds));
        assert_eq!(stepper.steps(), 434);
    }

    #[test]
    fn start_inside_tolerance_converges_without_moving() {
        let config = reference().with_points(Point2D::new(0.0, 0.0), Point2D::new(3.0, 4.0));
        let mut stepper = MotionStepper::from_config(&config);
        assert_eq!(
            stepper.outcome(),
            Some(StepOutcome::Converged(Point2D::new(0.0, 0.0)))
        );
        assert_eq!(stepper.next(), None);
    }

    #[test]
    fn reversed_direction_goes_out_of_bounds_at_once() {
        let config = reference().with_points(Point2D::new(620.0, 120.0), Point2D::new(120.0, 1820.0));
        let (points, outcome) = MotionStepper::new(&config, 20).trace();
        assert_eq!(outcome, StepOutcome::OutOfBounds);
        assert_eq!(points.len(), 1);
    }

    #[test]
    fn negative_cosine_hits_the_step_limit() {
        // A steep track makes the two-term cosine negative, so x walks away from the guard.
        let config = reference().with_points(Point2D::new(0.0, 0.0), Point2D::new(1.0, 2000.0));
        let stepper = MotionStepper::new(&config, 2);
        assert!(stepper.displacement.x < 0.0);
        let (points, outcome) = stepper.trace();
        assert_eq!(outcome, StepOutcome::OutOfBounds);
        assert_eq!(points.len(), config.step_limit());
    }

    #[test]
    fn validation() {
        assert_eq!(reference().validate(), Ok(()));
        let mut config = reference();
        config.step_size = 0.0;
        assert_eq!(config.validate(), Err(ConfigError::StepSize(0.0)));
        let config = reference().with_tolerance_radius(-1.0);
        assert_eq!(config.validate(), Err(ConfigError::ToleranceRadius(-1.0)));
        let config = reference().with_term_count(0);
        assert_eq!(config.validate(), Err(ConfigError::TermCount));
        let config = reference().with_points(Point2D::new(5.0, 0.0), Point2D::new(5.0, 100.0));
        assert_eq!(config.validate(), Err(ConfigError::VerticalTrack(5.0)));
        // Going backwards is allowed, it just diverges.
        let config = reference().with_points(Point2D::new(10.0, 0.0), Point2D::new(0.0, 100.0));
        assert_eq!(config.validate(), Ok(()));
        assert!(!config.heads_forward());
    }

    #[test]
    fn bounds_margin_scales_with_radius() {
        assert_eq!(reference().bounds_margin(), 20.0);
        assert_eq!(reference().with_tolerance_radius(35.0).bounds_margin(), 70.0);
    }

    #[test]
    fn config_reads_partial_json() {
        let config: SimulationConfig =
            serde_json::from_str(r#"{"term_count": 7, "end": {"x": 500.0, "y": 900.0}}"#).unwrap();
        assert_eq!(config.term_count, 7);
        assert_eq!(config.end, Point2D::new(500.0, 900.0));
        assert_eq!(config.start, Point2D::new(120.0, 120.0));
        assert_eq!(config.step_size, 1.2);
    }
}
