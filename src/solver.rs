pub mod criteria;
pub mod iterative;
pub mod time_stepping;
pub mod update;

pub use criteria::{MaxIterations, ResidualThreshold, SolverStatus, StopCriterion, TimeLimit};
pub use iterative::IterativeSolver;
pub use time_stepping::TimeStepping;
pub use update::{ExplicitUpdate, ForwardEuler, RungeKutta};
