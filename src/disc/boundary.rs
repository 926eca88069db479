use std::rc::Rc;

use ndarray::Array1;

use crate::disc::dispatcher::Term;
use crate::disc::quadrature::segment_rule;
use crate::error::SolverError;
use crate::fields::Fields;
use crate::mesh::{ElementKind, Mesh2d};
use crate::physics::PhysicsModel;
use crate::physics::riemann::{RiemannScratch, rusanov};

/// Boundary-condition actions applied after the discretization pass,
/// overwriting or augmenting boundary-node residuals.
pub trait BoundaryCondition {
    fn name(&self) -> &str;
    fn apply(&self, mesh: &Mesh2d, fields: &mut Fields) -> Result<(), SolverError>;
}

/// Strong Dirichlet condition: pins the boundary nodes to a prescribed
/// state and clears whatever residual the cell terms accumulated there,
/// so the update leaves those nodes untouched.
pub struct StrongDirichlet {
    name: String,
    regions: Vec<String>,
    value: Box<dyn Fn(f64, f64) -> Array1<f64>>,
}

impl StrongDirichlet {
    pub fn new(
        name: &str,
        regions: &[&str],
        value: Box<dyn Fn(f64, f64) -> Array1<f64>>,
    ) -> StrongDirichlet {
        StrongDirichlet {
            name: name.to_string(),
            regions: regions.iter().map(|r| r.to_string()).collect(),
            value,
        }
    }
}

impl BoundaryCondition for StrongDirichlet {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, mesh: &Mesh2d, fields: &mut Fields) -> Result<(), SolverError> {
        for region_name in &self.regions {
            for inode in mesh.region_nodes(region_name)? {
                let x = mesh.coords[[inode, 0]];
                let y = mesh.coords[[inode, 1]];
                fields.solution.row_mut(inode).assign(&(self.value)(x, y));
                fields.residual.row_mut(inode).fill(0.0);
            }
        }
        Ok(())
    }
}

/// Weak boundary face term: integrates the defect between the Rusanov
/// flux against a prescribed exterior state and the interior analytic
/// flux,
/// Phi_n += int phi_n (F*(u, u_bc, n) - F(u) . n) dGamma,
/// over every segment of its regions. Runs with the face terms of the
/// domain discretization.
pub struct WeakBoundaryTerm<P: PhysicsModel> {
    name: String,
    regions: Vec<String>,
    model: Rc<P>,
    exterior: Box<dyn Fn(f64, f64) -> Array1<f64>>,
    scratch: RiemannScratch<P>,
    u_in: Array1<f64>,
    flux_star: Array1<f64>,
}

impl<P: PhysicsModel> WeakBoundaryTerm<P> {
    pub fn new(
        name: &str,
        regions: &[&str],
        model: Rc<P>,
        exterior: Box<dyn Fn(f64, f64) -> Array1<f64>>,
    ) -> WeakBoundaryTerm<P> {
        WeakBoundaryTerm {
            name: name.to_string(),
            regions: regions.iter().map(|r| r.to_string()).collect(),
            model,
            exterior,
            scratch: RiemannScratch::new(),
            u_in: Array1::zeros(P::NEQS),
            flux_star: Array1::zeros(P::NEQS),
        }
    }
}

impl<P: PhysicsModel> Term for WeakBoundaryTerm<P> {
    fn name(&self) -> &str {
        &self.name
    }

    fn execute(&mut self, mesh: &Mesh2d, fields: &mut Fields) -> Result<(), SolverError> {
        let (xi, weights) = segment_rule(2);
        for region_name in &self.regions {
            let region = mesh.region(region_name)?;
            if region.kind != ElementKind::Segment {
                return Err(SolverError::SetupError(format!(
                    "weak boundary term attached to cell region '{region_name}'"
                )));
            }
            debug_assert_eq!(region.kind.node_count(), 2);
            for iface in 0..region.elem_num() {
                let inodes = region.element(iface);
                let (normal, length) = mesh.segment_normal(inodes);
                // d(Gamma)/d(xi) on the reference segment [-1,1]
                let jacob = 0.5 * length;
                for iq in 0..xi.len() {
                    let phi = [0.5 * (1.0 - xi[iq]), 0.5 * (1.0 + xi[iq])];
                    let mut x = 0.0;
                    let mut y = 0.0;
                    self.u_in.fill(0.0);
                    for local in 0..2 {
                        let inode = inodes[local];
                        x += phi[local] * mesh.coords[[inode, 0]];
                        y += phi[local] * mesh.coords[[inode, 1]];
                        self.u_in
                            .scaled_add(phi[local], &fields.solution.row(inode));
                    }
                    let u_bc = (self.exterior)(x, y);
                    rusanov(
                        self.model.as_ref(),
                        self.u_in.view(),
                        u_bc.view(),
                        normal,
                        &mut self.scratch,
                        self.flux_star.view_mut(),
                    );
                    // rusanov leaves F(u_in).n and the interior
                    // properties in the scratch
                    let wave = self
                        .model
                        .max_eigen_value(self.scratch.interior_properties(), normal);
                    let wq = weights[iq] * jacob;
                    for local in 0..2 {
                        let inode = inodes[local];
                        for ieq in 0..P::NEQS {
                            fields.residual[[inode, ieq]] += phi[local]
                                * (self.flux_star[ieq] - self.scratch.interior_flux()[ieq])
                                * wq;
                        }
                        fields.wave_speed[inode] += phi[local] * wave * wq;
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::euler2d::Euler2D;
    use crate::physics::linear_adv2d::LinearAdv2D;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn strong_dirichlet_pins_solution_and_clears_residual() {
        let mesh = Mesh2d::create_tri_mesh(2, 2, 0.0, 1.0, 0.0, 1.0);
        let mut fields = Fields::new(mesh.node_num, 1);
        fields.residual.fill(3.0);
        let bc = StrongDirichlet::new(
            "inlet",
            &["bottom"],
            Box::new(|x, _y| array![2.0 * x]),
        );
        bc.apply(&mesh, &mut fields).unwrap();
        for inode in mesh.region_nodes("bottom").unwrap() {
            assert_relative_eq!(
                fields.solution[[inode, 0]],
                2.0 * mesh.coords[[inode, 0]],
                epsilon = 1e-14
            );
            assert_eq!(fields.residual[[inode, 0]], 0.0);
        }
        // interior nodes untouched
        let touched = mesh.region_nodes("bottom").unwrap();
        for inode in 0..mesh.node_num {
            if !touched.contains(&inode) {
                assert_eq!(fields.residual[[inode, 0]], 3.0);
            }
        }
    }

    #[test]
    fn weak_term_vanishes_when_state_matches_exterior() {
        let mesh = Mesh2d::create_quad_mesh(2, 2, 0.0, 1.0, 0.0, 1.0);
        let model = Rc::new(Euler2D::new());
        let free_stream = model.conservative(1.0, 0.5, 0.0, 1.0);
        let mut fields = Fields::new(mesh.node_num, 4);
        for inode in 0..mesh.node_num {
            fields.solution.row_mut(inode).assign(&free_stream);
        }
        let exterior = free_stream.clone();
        let mut term = WeakBoundaryTerm::new(
            "farfield",
            &["bottom", "right", "top", "left"],
            model,
            Box::new(move |_x, _y| exterior.clone()),
        );
        term.execute(&mesh, &mut fields).unwrap();
        for inode in 0..mesh.node_num {
            for ieq in 0..4 {
                assert_relative_eq!(fields.residual[[inode, ieq]], 0.0, epsilon = 1e-12);
            }
        }
        // wave speed still accumulates on the boundary
        let boundary = mesh.region_nodes("bottom").unwrap();
        assert!(boundary.iter().all(|&n| fields.wave_speed[n] > 0.0));
    }

    #[test]
    fn weak_term_on_cell_region_is_setup_error() {
        let mesh = Mesh2d::create_tri_mesh(2, 2, 0.0, 1.0, 0.0, 1.0);
        let model = Rc::new(LinearAdv2D::constant(1.0, 0.0));
        let mut fields = Fields::new(mesh.node_num, 1);
        let mut term = WeakBoundaryTerm::new(
            "wrong",
            &["interior"],
            model,
            Box::new(|_x, _y| array![0.0]),
        );
        assert!(matches!(
            term.execute(&mesh, &mut fields),
            Err(SolverError::SetupError(_))
        ));
    }

    #[test]
    fn inflow_defect_pushes_residual() {
        // scalar advection a = (0,-1) entering through the top: an
        // exterior value different from the interior produces a
        // nonzero defect on top nodes only
        let mesh = Mesh2d::create_quad_mesh(2, 2, 0.0, 1.0, 0.0, 1.0);
        let model = Rc::new(LinearAdv2D::constant(0.0, -1.0));
        let mut fields = Fields::new(mesh.node_num, 1);
        // interior solution 0, exterior 1
        let mut term = WeakBoundaryTerm::new(
            "inlet",
            &["top"],
            model,
            Box::new(|_x, _y| array![1.0]),
        );
        term.execute(&mesh, &mut fields).unwrap();
        let top = mesh.region_nodes("top").unwrap();
        for &inode in &top {
            assert!(fields.residual[[inode, 0]].abs() > 0.0);
        }
        let bottom = mesh.region_nodes("bottom").unwrap();
        for &inode in &bottom {
            assert_eq!(fields.residual[[inode, 0]], 0.0);
        }
    }
}
