use crate::disc::boundary::BoundaryCondition;
use crate::disc::domain::DomainDiscretization;
use crate::error::SolverError;
use crate::fields::{Fields, SyncService};
use crate::mesh::Mesh2d;
use crate::solver::criteria::{SolverStatus, StopCriterion};
use crate::solver::update::ExplicitUpdate;

/// Explicit pseudo-time iteration driver. One pass runs
/// PreActions (field reset) -> Discretization -> BoundaryConditions ->
/// Update -> Synchronize -> PostActions (norm, print, divergence
/// check), repeated until any registered stop criterion fires.
pub struct IterativeSolver {
    pub cfl: f64,
    /// print one summary line every `print_rate` iterations, 0 disables
    pub print_rate: usize,
    pub check_convergence: bool,
    update: ExplicitUpdate,
    criteria: Vec<Box<dyn StopCriterion>>,
    observers: Vec<Box<dyn FnMut(usize, f64)>>,
    /// 1-based during iteration
    pub iteration: usize,
    pub residual_norm: f64,
}

impl IterativeSolver {
    pub fn new(cfl: f64, update: ExplicitUpdate) -> IterativeSolver {
        IterativeSolver {
            cfl,
            print_rate: 1,
            check_convergence: true,
            update,
            criteria: Vec::new(),
            observers: Vec::new(),
            iteration: 0,
            residual_norm: f64::MAX,
        }
    }

    pub fn add_criterion(&mut self, criterion: Box<dyn StopCriterion>) {
        self.criteria.push(criterion);
    }

    /// Register an iteration-done observer, called with the 1-based
    /// iteration count and the residual norm.
    pub fn add_observer(&mut self, observer: Box<dyn FnMut(usize, f64)>) {
        self.observers.push(observer);
    }

    /// Restart the iteration count, e.g. between physical time steps.
    pub fn reset(&mut self) {
        self.iteration = 0;
        self.residual_norm = f64::MAX;
    }

    fn stop_condition(&self, status: &SolverStatus) -> bool {
        match self.criteria.iter().find(|c| c.stop(status)) {
            Some(criterion) => {
                log::debug!("stop criterion '{}' satisfied", criterion.name());
                true
            }
            None => false,
        }
    }

    pub fn execute(
        &mut self,
        domain: &mut DomainDiscretization,
        bcs: &mut [Box<dyn BoundaryCondition>],
        mesh: &Mesh2d,
        fields: &mut Fields,
        sync: &dyn SyncService,
    ) -> Result<(), SolverError> {
        if self.criteria.is_empty() {
            return Err(SolverError::SetupError(
                "iterative solver has no stop criterion".to_string(),
            ));
        }
        let mut status = SolverStatus {
            iteration: self.iteration,
            residual_norm: self.residual_norm,
            time: 0.0,
        };
        while !self.stop_condition(&status) {
            self.iteration += 1;

            match &mut self.update {
                ExplicitUpdate::ForwardEuler(euler) => {
                    fields.reset();
                    domain.execute(mesh, fields)?;
                    for bc in bcs.iter_mut() {
                        log::debug!("applying boundary condition '{}'", bc.name());
                        bc.apply(mesh, fields)?;
                    }
                    euler.apply(fields, self.cfl);
                }
                ExplicitUpdate::RungeKutta(rk) => {
                    rk.begin_iteration(fields);
                    for stage in 0..rk.stages() {
                        fields.reset();
                        domain.execute(mesh, fields)?;
                        for bc in bcs.iter_mut() {
                            bc.apply(mesh, fields)?;
                        }
                        rk.apply_stage(fields, self.cfl, stage);
                    }
                }
            }

            sync.synchronize(fields);
            let norm = self.post_actions(fields, sync)?;

            status.iteration = self.iteration;
            status.residual_norm = norm;
        }
        Ok(())
    }

    /// Norm computation, iteration summary and divergence check; also
    /// raises the iteration-done event. Public so tests can exercise
    /// the divergence path directly.
    pub fn post_actions(
        &mut self,
        fields: &Fields,
        sync: &dyn SyncService,
    ) -> Result<f64, SolverError> {
        let local_sq: f64 = fields.residual.iter().map(|r| r * r).sum();
        let global_sq = sync.all_reduce_sum(local_sq);
        let global_count = sync.all_reduce_sum(fields.residual.len() as f64);
        let norm = (global_sq / global_count).sqrt();
        self.residual_norm = norm;

        if self.print_rate > 0 && self.iteration % self.print_rate == 0 {
            println!(
                "iter [{:5}] L2(rhs) [ {}]",
                self.iteration,
                scientific(norm, 12)
            );
        }
        if self.check_convergence && !norm.is_finite() {
            return Err(SolverError::FailedToConverge {
                iteration: self.iteration,
            });
        }
        for observer in self.observers.iter_mut() {
            observer(self.iteration, norm);
        }
        Ok(norm)
    }
}

/// Fixed-width scientific notation with an explicitly signed two-digit
/// exponent, e.g. 1.234567890123e+02.
fn scientific(value: f64, precision: usize) -> String {
    if !value.is_finite() {
        return format!("{value}");
    }
    let formatted = format!("{:.*e}", precision, value);
    let (mantissa, exponent) = formatted
        .split_once('e')
        .expect("float formatting always yields an exponent");
    let exp: i32 = exponent.parse().expect("exponent is an integer");
    let sign = if exp < 0 { '-' } else { '+' };
    format!("{}e{}{:02}", mantissa, sign, exp.abs())
}
