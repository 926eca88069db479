use crate::disc::boundary::BoundaryCondition;
use crate::disc::domain::DomainDiscretization;
use crate::error::SolverError;
use crate::fields::{Fields, SyncService};
use crate::mesh::Mesh2d;
use crate::solver::criteria::{SolverStatus, StopCriterion};
use crate::solver::iterative::IterativeSolver;

/// Unsteady outer loop wrapping the pseudo-time solver: per physical
/// time step, snapshot the solution, drive the inner solver to its own
/// stop condition, run the post-step hooks and advance time by `dt`.
pub struct TimeStepping {
    pub dt: f64,
    pub time: f64,
    pub step: usize,
    criteria: Vec<Box<dyn StopCriterion>>,
    post_step: Vec<Box<dyn FnMut(usize, f64, &Fields)>>,
}

impl TimeStepping {
    pub fn new(dt: f64) -> TimeStepping {
        TimeStepping {
            dt,
            time: 0.0,
            step: 0,
            criteria: Vec::new(),
            post_step: Vec::new(),
        }
    }

    pub fn add_criterion(&mut self, criterion: Box<dyn StopCriterion>) {
        self.criteria.push(criterion);
    }

    /// Hook called after each converged step with (step, time, fields);
    /// periodic output actions plug in here.
    pub fn add_post_step(&mut self, hook: Box<dyn FnMut(usize, f64, &Fields)>) {
        self.post_step.push(hook);
    }

    pub fn execute(
        &mut self,
        inner: &mut IterativeSolver,
        domain: &mut DomainDiscretization,
        bcs: &mut [Box<dyn BoundaryCondition>],
        mesh: &Mesh2d,
        fields: &mut Fields,
        sync: &dyn SyncService,
    ) -> Result<(), SolverError> {
        if self.criteria.is_empty() {
            return Err(SolverError::SetupError(
                "time stepping has no stop criterion".to_string(),
            ));
        }
        loop {
            let status = SolverStatus {
                iteration: self.step,
                residual_norm: inner.residual_norm,
                time: self.time,
            };
            if self.criteria.iter().any(|c| c.stop(&status)) {
                return Ok(());
            }
            fields.store_past_solution();
            inner.reset();
            inner.execute(domain, bcs, mesh, fields, sync)?;
            for hook in self.post_step.iter_mut() {
                hook(self.step + 1, self.time, fields);
            }
            self.time += self.dt;
            self.step += 1;
        }
    }
}
