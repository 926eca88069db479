use ndarray::{Array1, Array2};

use crate::disc::kernel::ElementKernel;
use crate::disc::scheme::{Distribution, KSplit, invert_into};
use crate::error::SolverError;
use crate::physics::PhysicsModel;

/// LDA scheme: distributes the elemental residual with the positive
/// coefficients beta_n = K_n+ S^-1, S = sum K_n+. Linearity-preserving
/// and conservative: sum_n beta_n = I.
pub struct Lda<P: PhysicsModel> {
    split: KSplit<P>,
    s_mat: Array2<f64>,
    s_inv: Array2<f64>,
    beta: Array2<f64>,
    phi: Array1<f64>,
    nnodes: usize,
}

impl<P: PhysicsModel> Lda<P> {
    pub fn new(nnodes: usize) -> Lda<P> {
        let neq = P::NEQS;
        Lda {
            split: KSplit::new(nnodes),
            s_mat: Array2::zeros((neq, neq)),
            s_inv: Array2::zeros((neq, neq)),
            beta: Array2::zeros((neq, neq)),
            phi: Array1::zeros(neq),
            nnodes,
        }
    }
}

impl<P: PhysicsModel> Distribution<P> for Lda<P> {
    fn distribute(
        &mut self,
        model: &P,
        kernel: &mut ElementKernel,
        iq: usize,
    ) -> Result<(), SolverError> {
        self.split.prepare(model, kernel, iq)?;
        let wj = kernel.wj[iq];

        self.s_mat.fill(0.0);
        for n in 0..self.nnodes {
            self.s_mat += &self.split.k_plus[n];
        }
        invert_into(&self.s_mat, &mut self.s_inv);

        for n in 0..self.nnodes {
            self.beta.assign(&self.split.k_plus[n].dot(&self.s_inv));
            self.phi.assign(&self.beta.dot(&self.split.lu));
            kernel.nodal_res.row_mut(n).scaled_add(wj, &self.phi);
            kernel.nodal_wave[n] += self.split.lambda_max[n] * wj;
        }
        Ok(())
    }
}
