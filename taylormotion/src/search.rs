//! `search` finds how many series terms the stepper needs before its heading is good enough to
//! land inside the tolerance circle, either all at once (`ConvergenceSearch`, `sweep`) or one term
//! count at a time (`SearchMachine`) for callers that want to show every attempt.

use std::thread;

use crossbeam_channel::{unbounded, Receiver, Sender};

use crate::error::SearchError;
use crate::motion::{MotionStepper, Point2D, SimulationConfig, StepOutcome};

/// Term counts tried before a search gives up. The reference scene needs at most four.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 64;

/// Tolerance radii swept by the analysis mode.
pub const REFERENCE_RADII: [f64; 14] = [
    2.0, 4.0, 6.0, 8.0, 10.0, 12.0, 14.0, 16.0, 18.0, 20.0, 25.0, 30.0, 35.0, 40.0,
];

#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq)]
pub struct ConvergenceResult {
    pub tolerance_radius: f64,
    pub term_count: u32,
}

/// Minimal term count search for a single configuration. The term count stored in the
/// configuration is ignored; the search always starts from one.
#[derive(Clone, Debug)]
pub struct ConvergenceSearch {
    config: SimulationConfig,
    max_attempts: u32,
}

impl ConvergenceSearch {
    pub fn new(config: SimulationConfig) -> ConvergenceSearch {
        ConvergenceSearch {
            config,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    pub fn max_attempts(mut self, max_attempts: u32) -> ConvergenceSearch {
        self.max_attempts = max_attempts;
        self
    }

    pub fn minimal_terms(&self) -> Result<ConvergenceResult, SearchError> {
        let mut machine = SearchMachine::new(self.config).max_attempts(self.max_attempts);
        loop {
            match *machine.advance() {
                SearchState::Converged(term_count) => {
                    return Ok(ConvergenceResult {
                        tolerance_radius: self.config.tolerance_radius,
                        term_count,
                    });
                }
                SearchState::Failed { attempts } => {
                    return Err(SearchError::Exhausted {
                        tolerance_radius: self.config.tolerance_radius,
                        attempts,
                    });
                }
                SearchState::Idle | SearchState::Searching(_) => (),
            }
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum SearchState {
    Idle,
    /// The next `advance` runs the stepper with this many terms.
    Searching(u32),
    Converged(u32),
    Failed { attempts: u32 },
}

impl SearchState {
    pub fn is_finished(&self) -> bool {
        match *self {
            SearchState::Converged(_) | SearchState::Failed { .. } => true,
            SearchState::Idle | SearchState::Searching(_) => false,
        }
    }
}

/// Step-through search: each `advance` performs at most one stepper run, so a caller can draw
/// the attempt for every term count as it goes.
///
/// Idle -> Searching(1) -> Searching(2) -> ... -> Converged(n) | Failed. Leaving Idle does not
/// run anything; advancing a finished machine is a no-op until `reset`.
#[derive(Clone, Debug)]
pub struct SearchMachine {
    config: SimulationConfig,
    max_attempts: u32,
    state: SearchState,
    last_outcome: Option<StepOutcome>,
}

impl SearchMachine {
    pub fn new(config: SimulationConfig) -> SearchMachine {
        SearchMachine {
            config,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            state: SearchState::Idle,
            last_outcome: None,
        }
    }

    pub fn max_attempts(mut self, max_attempts: u32) -> SearchMachine {
        self.max_attempts = max_attempts;
        self
    }

    pub fn state(&self) -> SearchState {
        self.state
    }

    /// Outcome of the most recent stepper run, if any has happened since the last reset.
    pub fn last_outcome(&self) -> Option<StepOutcome> {
        self.last_outcome
    }

    pub fn reset(&mut self) {
        self.state = SearchState::Idle;
        self.last_outcome = None;
    }

    pub fn advance(&mut self) -> &SearchState {
        self.advance_with(|_| ())
    }

    /// Like `advance`, but every position visited by this step's run is passed to `sink`.
    pub fn advance_with<F>(&mut self, sink: F) -> &SearchState
    where
        F: FnMut(Point2D),
    {
        self.state = match self.state {
            SearchState::Idle => {
                if self.max_attempts == 0 {
                    SearchState::Failed { attempts: 0 }
                } else {
                    SearchState::Searching(1)
                }
            }
            SearchState::Searching(term_count) => {
                let outcome = MotionStepper::new(&self.config, term_count).run_with(sink);
                self.last_outcome = Some(outcome);
                match outcome {
                    StepOutcome::Converged(p) => {
                        debug!(
                            "radius {}: converged with {} terms at {}",
                            self.config.tolerance_radius, term_count, p
                        );
                        SearchState::Converged(term_count)
                    }
                    StepOutcome::OutOfBounds if term_count >= self.max_attempts => {
                        warn!(
                            "radius {}: still out of bounds after {} terms, giving up",
                            self.config.tolerance_radius, term_count
                        );
                        SearchState::Failed {
                            attempts: term_count,
                        }
                    }
                    StepOutcome::OutOfBounds => {
                        debug!(
                            "radius {}: out of bounds with {} terms",
                            self.config.tolerance_radius, term_count
                        );
                        SearchState::Searching(term_count + 1)
                    }
                }
            }
            finished => finished,
        };
        &self.state
    }
}

/// Runs a search for each radius, keeping every other field of `config`. Results come back in
/// the order of `radii`; the first radius that exhausts its attempts aborts the sweep.
pub fn sweep(
    config: &SimulationConfig,
    radii: &[f64],
    max_attempts: u32,
) -> Result<Vec<ConvergenceResult>, SearchError> {
    let mut results = Vec::with_capacity(radii.len());
    for &radius in radii {
        let result = ConvergenceSearch::new(config.with_tolerance_radius(radius))
            .max_attempts(max_attempts)
            .minimal_terms()?;
        info!(
            "tolerance radius {}: {} terms",
            result.tolerance_radius, result.term_count
        );
        results.push(result);
    }
    Ok(results)
}

type Slot = Option<Result<ConvergenceResult, SearchError>>;

/// Same answer as `sweep`, with the radii shared out among `thread_count` workers. Results are
/// put back in the order of `radii`, and the error reported is the one the sequential sweep
/// would have hit first.
pub fn sweep_parallel(
    config: &SimulationConfig,
    radii: &[f64],
    max_attempts: u32,
    thread_count: usize,
) -> Result<Vec<ConvergenceResult>, SearchError> {
    let (job_sender, job_receiver) = unbounded();
    for (idx, radius) in radii.iter().enumerate() {
        let _ = job_sender.send((idx, *radius));
    }
    drop(job_sender);

    let (result_sender, result_receiver) = unbounded();
    let mut children = vec![];
    for _ in 0..thread_count.max(1) {
        let jobs = job_receiver.clone();
        let results = result_sender.clone();
        let base = *config;
        children.push(thread::spawn(move || {
            search_and_transmit(base, max_attempts, jobs, results);
        }));
    }
    drop(result_sender);

    let mut slots: Vec<Slot> = vec![None; radii.len()];
    for (idx, outcome) in result_receiver.iter() {
        if let Ok(ref result) = outcome {
            info!(
                "tolerance radius {}: {} terms",
                result.tolerance_radius, result.term_count
            );
        }
        slots[idx] = Some(outcome);
    }
    for child in children {
        if child.join().is_err() {
            error!("a sweep worker panicked");
        }
    }
    assemble(slots)
}

fn search_and_transmit(
    config: SimulationConfig,
    max_attempts: u32,
    jobs: Receiver<(usize, f64)>,
    results: Sender<(usize, Result<ConvergenceResult, SearchError>)>,
) {
    for (idx, radius) in jobs.iter() {
        let outcome = ConvergenceSearch::new(config.with_tolerance_radius(radius))
            .max_attempts(max_attempts)
            .minimal_terms();
        if results.send((idx, outcome)).is_err() {
            break;
        }
    }
}

// Every radius must have been answered; otherwise a worker died part way.
fn assemble(slots: Vec<Slot>) -> Result<Vec<ConvergenceResult>, SearchError> {
    let missing = slots.iter().filter(|s| s.is_none()).count();
    if missing > 0 {
        return Err(SearchError::Incomplete { missing });
    }
    slots.into_iter().flatten().collect()
}
