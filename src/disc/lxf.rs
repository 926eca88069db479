use ndarray::Array1;

use crate::disc::kernel::ElementKernel;
use crate::error::SolverError;
use crate::physics::PhysicsModel;
use crate::disc::scheme::Distribution;

/// Lax-Friedrichs distribution: the residual is shared equally and a
/// scalar dissipation proportional to the largest nodal eigenvalue
/// couples the node values,
/// Phi_i = Lu/k + (alpha/k) sum_{j/=i} (u_i - u_j).
/// No eigendecomposition and no matrix inverse; cheapest and most
/// dissipative of the family.
pub struct LaxFriedrichs<P: PhysicsModel> {
    props: P::Properties,
    lu: Array1<f64>,
    lambda: Array1<f64>,
    sum_u: Array1<f64>,
    phi: Array1<f64>,
    nnodes: usize,
}

impl<P: PhysicsModel> LaxFriedrichs<P> {
    pub fn new(nnodes: usize) -> LaxFriedrichs<P> {
        let neq = P::NEQS;
        LaxFriedrichs {
            props: P::Properties::default(),
            lu: Array1::zeros(neq),
            lambda: Array1::zeros(neq),
            sum_u: Array1::zeros(neq),
            phi: Array1::zeros(neq),
            nnodes,
        }
    }
}

impl<P: PhysicsModel> Distribution<P> for LaxFriedrichs<P> {
    fn distribute(
        &mut self,
        model: &P,
        kernel: &mut ElementKernel,
        iq: usize,
    ) -> Result<(), SolverError> {
        model.compute_properties(
            kernel.qp_x.row(iq),
            kernel.qp_u.row(iq),
            kernel.qp_grad.slice(ndarray::s![iq, .., ..]),
            &mut self.props,
        );
        model.residual(&self.props, self.lu.view_mut())?;
        let wj = kernel.wj[iq];
        let k = self.nnodes as f64;

        let mut alpha: f64 = 0.0;
        for n in 0..self.nnodes {
            let direction = kernel.node_gradient(iq, n);
            model.flux_jacobian_eigen_values(&self.props, direction, self.lambda.view_mut());
            for m in 0..self.lambda.len() {
                alpha = alpha.max(self.lambda[m].abs());
            }
        }

        self.sum_u.fill(0.0);
        for n in 0..self.nnodes {
            self.sum_u += &kernel.sol.row(n);
        }
        for n in 0..self.nnodes {
            // sum_{j/=i} (u_i - u_j) = k u_i - sum_j u_j
            self.phi.assign(&self.lu);
            self.phi /= k;
            for ieq in 0..self.phi.len() {
                self.phi[ieq] +=
                    alpha / k * (k * kernel.sol[[n, ieq]] - self.sum_u[ieq]);
            }
            kernel.nodal_res.row_mut(n).scaled_add(wj, &self.phi);
            kernel.nodal_wave[n] += alpha * wj;
        }
        Ok(())
    }
}
