use ndarray::{Array1, Array2};

use crate::disc::kernel::ElementKernel;
use crate::disc::scheme::{Distribution, KSplit};
use crate::error::SolverError;
use crate::physics::PhysicsModel;

/// SUPG distribution: Galerkin weighting plus a streamline-upwind
/// correction scaled by the stabilization parameter
/// tau = h / (2 lambda_ref), h = sqrt(elemental area),
/// Phi_n = (phi_n I + tau K_n) Lu.
/// sum phi_n = 1 and sum K_n = 0 keep the distribution conservative.
/// tau falls back to zero (plain Galerkin) when the reference wave
/// speed at the point vanishes.
pub struct Supg<P: PhysicsModel> {
    split: KSplit<P>,
    k_full: Array2<f64>,
    phi: Array1<f64>,
    nnodes: usize,
    neq: usize,
}

impl<P: PhysicsModel> Supg<P> {
    pub fn new(nnodes: usize) -> Supg<P> {
        let neq = P::NEQS;
        Supg {
            split: KSplit::new(nnodes),
            k_full: Array2::zeros((neq, neq)),
            phi: Array1::zeros(neq),
            nnodes,
            neq,
        }
    }
}

impl<P: PhysicsModel> Distribution<P> for Supg<P> {
    fn distribute(
        &mut self,
        model: &P,
        kernel: &mut ElementKernel,
        iq: usize,
    ) -> Result<(), SolverError> {
        self.split.prepare(model, kernel, iq)?;
        let wj = kernel.wj[iq];

        let mut lambda_ref: f64 = 0.0;
        for n in 0..self.nnodes {
            lambda_ref = lambda_ref.max(self.split.lambda_max[n]);
        }
        let h = kernel.volume.sqrt();
        let tau = if lambda_ref > 1e-12 {
            h / (2.0 * lambda_ref)
        } else {
            0.0
        };

        for n in 0..self.nnodes {
            self.k_full.assign(&self.split.k_plus[n]);
            self.k_full += &self.split.k_min[n];
            self.phi.assign(&self.k_full.dot(&self.split.lu));
            self.phi *= tau;
            let galerkin = kernel.phi[[iq, n]];
            for ieq in 0..self.neq {
                self.phi[ieq] += galerkin * self.split.lu[ieq];
            }
            kernel.nodal_res.row_mut(n).scaled_add(wj, &self.phi);
            kernel.nodal_wave[n] += self.split.lambda_max[n] * wj;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disc::shape::Triag;
    use crate::physics::linear_adv2d::LinearAdv2D;
    use approx::assert_relative_eq;
    use ndarray::array;

    fn run_triangle(model: &LinearAdv2D, nodal: Array2<f64>) -> ElementKernel {
        let mut kernel = ElementKernel::new::<Triag>(1);
        let coords = array![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]];
        let inodes = array![0usize, 1, 2];
        kernel.bind(inodes.view(), &coords, nodal.view());
        kernel.interpolate().unwrap();
        let mut scheme = Supg::<LinearAdv2D>::new(3);
        for iq in 0..kernel.nqp {
            scheme.distribute(model, &mut kernel, iq).unwrap();
        }
        kernel
    }

    #[test]
    fn uniform_solution_gives_zero_contributions() {
        let model = LinearAdv2D::constant(1.0, 1.0);
        let kernel = run_triangle(&model, array![[0.5], [0.5], [0.5]]);
        for n in 0..3 {
            assert_relative_eq!(kernel.nodal_res[[n, 0]], 0.0, epsilon = 1e-13);
        }
    }

    #[test]
    fn contributions_sum_to_elemental_residual() {
        let model = LinearAdv2D::constant(1.5, 0.5);
        // u = x + y: Lu = 2.0
        let kernel = run_triangle(&model, array![[0.0], [1.0], [1.0]]);
        let total: f64 = kernel.nodal_res.column(0).sum();
        assert_relative_eq!(total, 2.0 * 0.5, epsilon = 1e-12);
    }

    #[test]
    fn upwind_correction_biases_downstream() {
        // pure x-advection of u = x: the downstream node 1 receives
        // more than the Galerkin third
        let model = LinearAdv2D::constant(1.0, 0.0);
        let kernel = run_triangle(&model, array![[0.0], [1.0], [0.0]]);
        assert!(kernel.nodal_res[[1, 0]] > kernel.nodal_res[[2, 0]]);
        assert!(kernel.nodal_res[[1, 0]] > kernel.nodal_res[[0, 0]]);
    }
}
