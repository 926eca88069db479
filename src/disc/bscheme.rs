use ndarray::{Array1, Array2};

use crate::disc::kernel::ElementKernel;
use crate::disc::scheme::{Distribution, KSplit, invert_into};
use crate::error::SolverError;
use crate::physics::PhysicsModel;

/// Blended B scheme: Phi = Phi_LDA + theta (Phi_N - Phi_LDA) with the
/// per-equation shock detector
/// theta = |sum_n Phi_LDA| / sum_n |Phi_N|, in [0,1].
/// Smooth flow keeps theta near 0 (second-order LDA); at a
/// discontinuity the detector pushes the distribution toward the
/// monotone N scheme.
pub struct Blended<P: PhysicsModel> {
    split: KSplit<P>,
    s_mat: Array2<f64>,
    s_inv: Array2<f64>,
    sum_kmin: Array2<f64>,
    sum_kmin_inv: Array2<f64>,
    sum_kmin_u: Array1<f64>,
    u_in: Array1<f64>,
    du: Array1<f64>,
    phi_lda: Array2<f64>, // (nnodes, neq), unscaled by wj
    phi_n: Array2<f64>,
    theta: Array1<f64>, // (neq)
    nnodes: usize,
    neq: usize,
}

impl<P: PhysicsModel> Blended<P> {
    pub fn new(nnodes: usize) -> Blended<P> {
        let neq = P::NEQS;
        Blended {
            split: KSplit::new(nnodes),
            s_mat: Array2::zeros((neq, neq)),
            s_inv: Array2::zeros((neq, neq)),
            sum_kmin: Array2::zeros((neq, neq)),
            sum_kmin_inv: Array2::zeros((neq, neq)),
            sum_kmin_u: Array1::zeros(neq),
            u_in: Array1::zeros(neq),
            du: Array1::zeros(neq),
            phi_lda: Array2::zeros((nnodes, neq)),
            phi_n: Array2::zeros((nnodes, neq)),
            theta: Array1::zeros(neq),
            nnodes,
            neq,
        }
    }
}

/// The blending parameter for one point, exposed for the property
/// tests: per equation |sum phi_lda| / sum |phi_n|, zero when the
/// denominator is numerically zero.
pub fn blend_theta(phi_lda: &Array2<f64>, phi_n: &Array2<f64>, theta: &mut Array1<f64>) {
    for ieq in 0..theta.len() {
        let numerator = phi_lda.column(ieq).sum().abs();
        let denominator: f64 = phi_n.column(ieq).iter().map(|p| p.abs()).sum();
        theta[ieq] = if denominator > 1e-300 {
            (numerator / denominator).min(1.0)
        } else {
            0.0
        };
    }
}

impl<P: PhysicsModel> Distribution<P> for Blended<P> {
    fn distribute(
        &mut self,
        model: &P,
        kernel: &mut ElementKernel,
        iq: usize,
    ) -> Result<(), SolverError> {
        self.split.prepare(model, kernel, iq)?;
        let wj = kernel.wj[iq];

        // LDA part
        self.s_mat.fill(0.0);
        for n in 0..self.nnodes {
            self.s_mat += &self.split.k_plus[n];
        }
        invert_into(&self.s_mat, &mut self.s_inv);
        for n in 0..self.nnodes {
            let beta = self.split.k_plus[n].dot(&self.s_inv);
            self.phi_lda.row_mut(n).assign(&beta.dot(&self.split.lu));
        }

        // N part
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
            self.phi_n
                .row_mut(n)
                .assign(&self.split.k_plus[n].dot(&self.du));
        }

        blend_theta(&self.phi_lda, &self.phi_n, &mut self.theta);

        for n in 0..self.nnodes {
            for ieq in 0..self.neq {
                let blended = self.phi_lda[[n, ieq]]
                    + self.theta[ieq] * (self.phi_n[[n, ieq]] - self.phi_lda[[n, ieq]]);
                kernel.nodal_res[[n, ieq]] += blended * wj;
            }
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
        let mut scheme = Blended::<LinearAdv2D>::new(3);
        for iq in 0..kernel.nqp {
            scheme.distribute(model, &mut kernel, iq).unwrap();
        }
        kernel
    }

    #[test]
    fn theta_stays_in_unit_interval() {
        let phi_lda = array![[0.4, -1.0], [-0.1, 2.0], [0.3, 0.5]];
        let phi_n = array![[0.6, -1.5], [0.0, 2.5], [0.0, 0.5]];
        let mut theta = Array1::zeros(2);
        blend_theta(&phi_lda, &phi_n, &mut theta);
        for ieq in 0..2 {
            assert!(theta[ieq] >= 0.0 && theta[ieq] <= 1.0, "theta = {}", theta[ieq]);
        }
    }

    #[test]
    fn theta_is_zero_for_zero_denominator() {
        let phi_lda = Array2::zeros((3, 1));
        let phi_n = Array2::zeros((3, 1));
        let mut theta = Array1::zeros(1);
        blend_theta(&phi_lda, &phi_n, &mut theta);
        assert_eq!(theta[0], 0.0);
    }

    #[test]
    fn uniform_solution_gives_zero_contributions() {
        let model = LinearAdv2D::constant(1.0, 0.4);
        let kernel = run_triangle(&model, array![[1.0], [1.0], [1.0]]);
        for n in 0..3 {
            assert_relative_eq!(kernel.nodal_res[[n, 0]], 0.0, epsilon = 1e-13);
        }
    }

    #[test]
    fn contributions_sum_to_elemental_residual() {
        // conservation holds for any theta because both parts sum to Lu
        let model = LinearAdv2D::constant(0.5, 1.0);
        // u = -x + 3y: Lu = -0.5 + 3.0 = 2.5
        let kernel = run_triangle(&model, array![[0.0], [-1.0], [3.0]]);
        let total: f64 = kernel.nodal_res.column(0).sum();
        assert_relative_eq!(total, 2.5 * 0.5, epsilon = 1e-13);
    }
}
