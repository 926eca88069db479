mod disc;
mod error;
mod fields;
mod initialization;
mod io;
mod mesh;
mod physics;
mod solver;

use crate::io::SolverConfig;
use crate::physics::{PhysicsKind, physics_by_name};

fn main() {
    env_logger::init();
    let config = if std::path::Path::new("inputs/solverparam.json").exists() {
        SolverConfig::parse("inputs/solverparam.json").expect("invalid solver configuration")
    } else {
        SolverConfig::default()
    };
    let kind = physics_by_name(&config.physics).expect("unknown physics model");
    let result = match kind {
        PhysicsKind::LinearAdv2D => initialization::run_linear_advection(&config),
        PhysicsKind::Euler2D => initialization::run_euler(&config),
    };
    match result {
        Ok(norm) => println!("final L2(rhs): {norm:.6e}"),
        Err(error) => {
            eprintln!("solver failed: {error}");
            std::process::exit(1);
        }
    }
}
