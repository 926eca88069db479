use std::rc::Rc;

use ndarray::{Array1, array};

use crate::disc::boundary::{BoundaryCondition, StrongDirichlet, WeakBoundaryTerm};
use crate::disc::domain::DomainDiscretization;
use crate::error::SolverError;
use crate::fields::{Fields, SerialSync};
use crate::io::SolverConfig;
use crate::mesh::Mesh2d;
use crate::physics::euler2d::Euler2D;
use crate::physics::linear_adv2d::LinearAdv2D;
use crate::solver::{
    ExplicitUpdate, IterativeSolver, MaxIterations, ResidualThreshold, TimeLimit, TimeStepping,
};

pub fn initialize_solver(config: &SolverConfig) -> Result<IterativeSolver, SolverError> {
    let update = ExplicitUpdate::from_order(config.rkorder)?;
    let mut solver = IterativeSolver::new(config.cfl, update);
    solver.print_rate = config.print_rate;
    solver.check_convergence = config.check_convergence;
    solver.add_criterion(Box::new(MaxIterations {
        maxiter: config.maxiter,
    }));
    if let Some(tolerance) = config.residual_tolerance {
        solver.add_criterion(Box::new(ResidualThreshold { tolerance }));
    }
    Ok(solver)
}

pub fn initialize_fields(
    mesh: &Mesh2d,
    neq: usize,
    init: &dyn Fn(f64, f64) -> Array1<f64>,
) -> Fields {
    let mut fields = Fields::new(mesh.node_num, neq);
    for inode in 0..mesh.node_num {
        let x = mesh.coords[[inode, 0]];
        let y = mesh.coords[[inode, 1]];
        fields.solution.row_mut(inode).assign(&init(x, y));
    }
    fields
}

fn run(
    config: &SolverConfig,
    mesh: &Mesh2d,
    domain: &mut DomainDiscretization,
    bcs: &mut [Box<dyn BoundaryCondition>],
    fields: &mut Fields,
) -> Result<f64, SolverError> {
    let mut solver = initialize_solver(config)?;
    if let (Some(time_end), Some(dt)) = (config.time_limit, config.dt) {
        let mut stepping = TimeStepping::new(dt);
        stepping.add_criterion(Box::new(TimeLimit { time_end }));
        stepping.execute(&mut solver, domain, bcs, mesh, fields, &SerialSync)?;
    } else {
        solver.execute(domain, bcs, mesh, fields, &SerialSync)?;
    }
    Ok(solver.residual_norm)
}

/// Demo case: steady linear advection of a Gaussian inlet profile
/// across the unit square, a = (1, 0.5).
pub fn run_linear_advection(config: &SolverConfig) -> Result<f64, SolverError> {
    let mesh = Mesh2d::create_tri_mesh(24, 24, 0.0, 1.0, 0.0, 1.0);
    let model = Rc::new(LinearAdv2D::constant(1.0, 0.5));
    let mut fields = initialize_fields(&mesh, 1, &|_x, _y| array![0.0]);

    let mut domain = DomainDiscretization::new();
    domain.create_cell_term(&config.scheme, &["interior"], model)?;

    let mut bcs: Vec<Box<dyn BoundaryCondition>> = vec![
        Box::new(StrongDirichlet::new(
            "inlet",
            &["bottom"],
            Box::new(|x, _y| array![(-80.0 * (x - 0.3) * (x - 0.3)).exp()]),
        )),
        Box::new(StrongDirichlet::new(
            "left",
            &["left"],
            Box::new(|_x, _y| array![0.0]),
        )),
    ];
    run(config, &mesh, &mut domain, &mut bcs, &mut fields)
}

/// Demo case: subsonic free stream over the unit square with weak
/// far-field boundaries on every side.
pub fn run_euler(config: &SolverConfig) -> Result<f64, SolverError> {
    let mesh = Mesh2d::create_quad_mesh(16, 16, 0.0, 1.0, 0.0, 1.0);
    let model = Rc::new(Euler2D::new());
    let free_stream = model.conservative(1.0, 0.45, 0.0, 1.0);

    let init_state = free_stream.clone();
    let mut fields = initialize_fields(&mesh, 4, &move |_x, _y| init_state.clone());

    let mut domain = DomainDiscretization::new();
    domain.create_cell_term(&config.scheme, &["interior"], model.clone())?;
    let exterior = free_stream.clone();
    domain.push_face_term(Box::new(WeakBoundaryTerm::new(
        "farfield",
        &["bottom", "right", "top", "left"],
        model,
        Box::new(move |_x, _y| exterior.clone()),
    )));

    let mut bcs: Vec<Box<dyn BoundaryCondition>> = Vec::new();
    run(config, &mesh, &mut domain, &mut bcs, &mut fields)
}
