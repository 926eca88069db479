use ndarray::{Array1, Array2};

use crate::disc::kernel::ElementKernel;
use crate::disc::scheme::{Distribution, KSplit, invert_into};
use crate::error::SolverError;
use crate::physics::PhysicsModel;

/// N (narrow) scheme: monotone, first-order distribution through the
/// inflow state u_in = (sum K-)^-1 sum K_j- u_j,
/// Phi_n = K_n+ (u_n - u_in). The pairwise K_j- (u_i - u_j) coupling is
/// the same operator rearranged; this form keeps conservation exact:
/// sum_n Phi_n = sum_n K_n u_n = Lu.
pub struct NScheme<P: PhysicsModel> {
    split: KSplit<P>,
    sum_kmin: Array2<f64>,
    sum_kmin_inv: Array2<f64>,
    sum_kmin_u: Array1<f64>,
    u_in: Array1<f64>,
    du: Array1<f64>,
    phi: Array1<f64>,
    nnodes: usize,
}

impl<P: PhysicsModel> NScheme<P> {
    pub fn new(nnodes: usize) -> NScheme<P> {
        let neq = P::NEQS;
        NScheme {
            split: KSplit::new(nnodes),
            sum_kmin: Array2::zeros((neq, neq)),
            sum_kmin_inv: Array2::zeros((neq, neq)),
            sum_kmin_u: Array1::zeros(neq),
            u_in: Array1::zeros(neq),
            du: Array1::zeros(neq),
            phi: Array1::zeros(neq),
            nnodes,
        }
    }
}

impl<P: PhysicsModel> Distribution<P> for NScheme<P> {
    fn distribute(
        &mut self,
        model: &P,
        kernel: &mut ElementKernel,
        iq: usize,
    ) -> Result<(), SolverError> {
        self.split.prepare(model, kernel, iq)?;
        let wj = kernel.wj[iq];

        self.sum_kmin.fill(0.0);
        self.sum_kmin_u.fill(0.0);
        for n in 0..self.nnodes {
            self.sum_kmin += &self.split.k_min[n];
            self.sum_kmin_u += &self.split.k_min[n].dot(&kernel.sol.row(n));
        }
        invert_into(&self.sum_kmin, &mut self.sum_kmin_inv);
        self.u_in.assign(&self.sum_kmin_inv.dot(&self.sum_kmin_u));

        for n in 0..self.nnodes {
            self.du.assign(&kernel.sol.row(n));
            self.du -= &self.u_in;
            self.phi.assign(&self.split.k_plus[n].dot(&self.du));
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
        let mut scheme = NScheme::<LinearAdv2D>::new(3);
        for iq in 0..kernel.nqp {
            scheme.distribute(model, &mut kernel, iq).unwrap();
        }
        kernel
    }

    #[test]
    fn uniform_solution_gives_zero_contributions() {
        let model = LinearAdv2D::constant(0.6, 0.9);
        let kernel = run_triangle(&model, array![[-1.0], [-1.0], [-1.0]]);
        for n in 0..3 {
            assert_relative_eq!(kernel.nodal_res[[n, 0]], 0.0, epsilon = 1e-13);
        }
    }

    #[test]
    fn contributions_sum_to_elemental_residual() {
        let model = LinearAdv2D::constant(0.8, 0.3);
        // u = 2x - y: Lu = 2*0.8 - 0.3 = 1.3
        let kernel = run_triangle(&model, array![[0.0], [2.0], [-1.0]]);
        let total: f64 = kernel.nodal_res.column(0).sum();
        assert_relative_eq!(total, 1.3 * 0.5, epsilon = 1e-13);
    }

    #[test]
    fn scalar_inflow_state_is_upwind_value() {
        // pure x-advection: the inflow state is the value carried by
        // the single negative projection, node 0
        let model = LinearAdv2D::constant(1.0, 0.0);
        let kernel = run_triangle(&model, array![[3.0], [5.0], [3.0]]);
        // only node 1 has k+ > 0: phi_1 = k1+ (u1 - u0) integrated
        assert_relative_eq!(kernel.nodal_res[[1, 0]], 0.5 * (5.0 - 3.0), epsilon = 1e-13);
        assert_relative_eq!(kernel.nodal_res[[0, 0]], 0.0, epsilon = 1e-13);
        assert_relative_eq!(kernel.nodal_res[[2, 0]], 0.0, epsilon = 1e-13);
    }
}
