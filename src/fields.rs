use ndarray::{Array1, Array2};

/// Nodal field storage shared by every term of the discretization.
///
/// `residual` and `wave_speed` are accumulators: zeroed once per outer
/// iteration by `reset`, then incremented by every cell/face term that
/// touches a node, and finally consumed by the explicit update. The
/// element loop is strictly sequential, so plain `+=` accumulation into
/// nodes shared between elements is race-free; any parallel element
/// loop must either color elements into disjoint node sets or use
/// atomic accumulation.
pub struct Fields {
    pub solution: Array2<f64>,      // (node_num, neq)
    pub residual: Array2<f64>,      // (node_num, neq)
    pub wave_speed: Array1<f64>,    // (node_num)
    pub past_solution: Array2<f64>, // (node_num, neq), unsteady snapshot
    pub neq: usize,
}

impl Fields {
    pub fn new(node_num: usize, neq: usize) -> Fields {
        Fields {
            solution: Array2::zeros((node_num, neq)),
            residual: Array2::zeros((node_num, neq)),
            wave_speed: Array1::zeros(node_num),
            past_solution: Array2::zeros((node_num, neq)),
            neq,
        }
    }

    pub fn node_num(&self) -> usize {
        self.solution.nrows()
    }

    /// Zero the accumulators. The solution is left untouched.
    pub fn reset(&mut self) {
        self.residual.fill(0.0);
        self.wave_speed.fill(0.0);
    }

    /// Snapshot the current solution for the unsteady outer loop.
    pub fn store_past_solution(&mut self) {
        self.past_solution.assign(&self.solution);
    }
}

/// Cross-partition synchronization service. Both operations are
/// blocking collectives over all partitions; a failing backend is fatal
/// and not retried here.
pub trait SyncService {
    /// Exchange and merge shared-node values after the update step.
    fn synchronize(&self, fields: &mut Fields);
    /// Global sum for norm computation.
    fn all_reduce_sum(&self, value: f64) -> f64;
}

/// Single-partition runs: nothing to exchange.
pub struct SerialSync;

impl SyncService for SerialSync {
    fn synchronize(&self, _fields: &mut Fields) {}
    fn all_reduce_sum(&self, value: f64) -> f64 {
        value
    }
}
