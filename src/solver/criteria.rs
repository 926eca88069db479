/// Snapshot of the iteration state the stop criteria evaluate against.
#[derive(Clone, Copy, Debug)]
pub struct SolverStatus {
    pub iteration: usize,
    pub residual_norm: f64,
    pub time: f64,
}

impl SolverStatus {
    pub fn start() -> SolverStatus {
        SolverStatus {
            iteration: 0,
            residual_norm: f64::MAX,
            time: 0.0,
        }
    }
}

/// One stopping condition; a solver stops as soon as any registered
/// criterion fires (logical OR).
pub trait StopCriterion {
    fn name(&self) -> &'static str;
    fn stop(&self, status: &SolverStatus) -> bool;
}

pub struct MaxIterations {
    pub maxiter: usize,
}

impl StopCriterion for MaxIterations {
    fn name(&self) -> &'static str {
        "max_iterations"
    }
    fn stop(&self, status: &SolverStatus) -> bool {
        status.iteration >= self.maxiter
    }
}

pub struct ResidualThreshold {
    pub tolerance: f64,
}

impl StopCriterion for ResidualThreshold {
    fn name(&self) -> &'static str {
        "residual_threshold"
    }
    fn stop(&self, status: &SolverStatus) -> bool {
        status.iteration > 0 && status.residual_norm < self.tolerance
    }
}

pub struct TimeLimit {
    pub time_end: f64,
}

impl StopCriterion for TimeLimit {
    fn name(&self) -> &'static str {
        "time_limit"
    }
    fn stop(&self, status: &SolverStatus) -> bool {
        status.time >= self.time_end
    }
}
