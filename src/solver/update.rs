use log::warn;
use ndarray::Array2;

use crate::error::SolverError;
use crate::fields::Fields;

const SMALL_WAVE_SPEED: f64 = 1e-300;

/// Forward Euler pseudo-time update:
/// solution[n] += -(CFL / wave_speed[n]) * residual[n].
/// A node with vanishing wave speed but nonzero residual is in an
/// inconsistent state; it is skipped with a warning rather than
/// dividing by zero.
pub struct ForwardEuler;

impl ForwardEuler {
    pub fn apply(&self, fields: &mut Fields, cfl: f64) {
        let neq = fields.neq;
        for inode in 0..fields.node_num() {
            let ws = fields.wave_speed[inode];
            if ws <= SMALL_WAVE_SPEED {
                let residual_norm: f64 =
                    fields.residual.row(inode).iter().map(|r| r.abs()).sum();
                if residual_norm > 0.0 {
                    warn!(
                        "node {inode}: zero wave speed with nonzero residual, update skipped"
                    );
                }
                continue;
            }
            let factor = -cfl / ws;
            for ieq in 0..neq {
                fields.solution[[inode, ieq]] += factor * fields.residual[[inode, ieq]];
            }
        }
    }
}

/// Strong-stability-preserving Runge-Kutta stage tables, orders 1-3:
/// u^{s+1} = a0 u^0 + a1 u^s + b (-CFL / wave_speed) residual(u^s).
const RK_ALPHA0: [&[f64]; 3] = [&[1.0], &[1.0, 0.5], &[1.0, 0.75, 1.0 / 3.0]];
const RK_ALPHA1: [&[f64]; 3] = [&[0.0], &[0.0, 0.5], &[0.0, 0.25, 2.0 / 3.0]];
const RK_BETA: [&[f64]; 3] = [&[1.0], &[1.0, 0.5], &[1.0, 0.25, 2.0 / 3.0]];

/// Multi-stage explicit update. Each stage expects the discretization
/// to have been re-run against the previous stage's solution; the
/// initial solution snapshot is kept internally.
pub struct RungeKutta {
    pub order: usize,
    u0: Array2<f64>,
}

impl RungeKutta {
    pub fn new(order: usize) -> Result<RungeKutta, SolverError> {
        if !(1..=3).contains(&order) {
            return Err(SolverError::SetupError(format!(
                "rkorder must be 1..=3, got {order}"
            )));
        }
        Ok(RungeKutta {
            order,
            u0: Array2::zeros((0, 0)),
        })
    }

    pub fn stages(&self) -> usize {
        self.order
    }

    /// Snapshot u^0 at the beginning of an outer iteration.
    pub fn begin_iteration(&mut self, fields: &Fields) {
        if self.u0.dim() != fields.solution.dim() {
            self.u0 = fields.solution.clone();
        } else {
            self.u0.assign(&fields.solution);
        }
    }

    pub fn apply_stage(&self, fields: &mut Fields, cfl: f64, stage: usize) {
        let a0 = RK_ALPHA0[self.order - 1][stage];
        let a1 = RK_ALPHA1[self.order - 1][stage];
        let b = RK_BETA[self.order - 1][stage];
        let neq = fields.neq;
        for inode in 0..fields.node_num() {
            let ws = fields.wave_speed[inode];
            if ws <= SMALL_WAVE_SPEED {
                let residual_norm: f64 =
                    fields.residual.row(inode).iter().map(|r| r.abs()).sum();
                if residual_norm > 0.0 {
                    warn!(
                        "node {inode}: zero wave speed with nonzero residual, update skipped"
                    );
                }
                continue;
            }
            let dt = -cfl / ws;
            for ieq in 0..neq {
                fields.solution[[inode, ieq]] = a0 * self.u0[[inode, ieq]]
                    + a1 * fields.solution[[inode, ieq]]
                    + b * dt * fields.residual[[inode, ieq]];
            }
        }
    }
}

/// The update rule of the iterative solver, selected by `rkorder`:
/// order 1 is the plain forward Euler step.
pub enum ExplicitUpdate {
    ForwardEuler(ForwardEuler),
    RungeKutta(RungeKutta),
}

impl ExplicitUpdate {
    pub fn from_order(rkorder: usize) -> Result<ExplicitUpdate, SolverError> {
        if rkorder == 1 {
            Ok(ExplicitUpdate::ForwardEuler(ForwardEuler))
        } else {
            Ok(ExplicitUpdate::RungeKutta(RungeKutta::new(rkorder)?))
        }
    }
}
