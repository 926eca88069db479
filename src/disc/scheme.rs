use faer::linalg::solvers::DenseSolveCore;
use faer_ext::{IntoFaer, IntoNdarray};
use ndarray::{Array1, Array2, s};

use crate::disc::kernel::ElementKernel;
use crate::error::SolverError;
use crate::physics::PhysicsModel;

/// A residual-distribution rule: turns the elemental PDE residual at
/// one quadrature point into nodal contributions and wave-speed
/// updates, accumulated into the kernel.
pub trait Distribution<P: PhysicsModel> {
    fn distribute(
        &mut self,
        model: &P,
        kernel: &mut ElementKernel,
        iq: usize,
    ) -> Result<(), SolverError>;
}

/// Dense inverse through an LU factorization. The upwind matrices are
/// NEQS x NEQS, so this stays cheap.
pub fn invert_into(mat: &Array2<f64>, out: &mut Array2<f64>) {
    let inv = mat.view().into_faer().partial_piv_lu().inverse();
    out.assign(&inv.as_ref().into_ndarray());
}

/// Shared per-quadrature-point setup of the eigendecomposition-based
/// schemes: physics properties, PDE residual, and for every node the
/// split upwind matrices K+ = R L+ L, K- = R L- L of the flux Jacobian
/// projected onto that node's physical shape-function gradient.
pub struct KSplit<P: PhysicsModel> {
    pub props: P::Properties,
    pub lu: Array1<f64>,          // (neq), PDE residual at the point
    pub k_plus: Vec<Array2<f64>>, // per node, (neq, neq)
    pub k_min: Vec<Array2<f64>>,
    pub lambda_max: Vec<f64>, // per node, max |lambda|
    right: Array2<f64>,
    left: Array2<f64>,
    lambda: Array1<f64>,
    nnodes: usize,
    neq: usize,
}

impl<P: PhysicsModel> KSplit<P> {
    pub fn new(nnodes: usize) -> KSplit<P> {
        let neq = P::NEQS;
        KSplit {
            props: P::Properties::default(),
            lu: Array1::zeros(neq),
            k_plus: (0..nnodes).map(|_| Array2::zeros((neq, neq))).collect(),
            k_min: (0..nnodes).map(|_| Array2::zeros((neq, neq))).collect(),
            lambda_max: vec![0.0; nnodes],
            right: Array2::zeros((neq, neq)),
            left: Array2::zeros((neq, neq)),
            lambda: Array1::zeros(neq),
            nnodes,
            neq,
        }
    }

    pub fn prepare(
        &mut self,
        model: &P,
        kernel: &ElementKernel,
        iq: usize,
    ) -> Result<(), SolverError> {
        model.compute_properties(
            kernel.qp_x.row(iq),
            kernel.qp_u.row(iq),
            kernel.qp_grad.slice(s![iq, .., ..]),
            &mut self.props,
        );
        model.residual(&self.props, self.lu.view_mut())?;
        for n in 0..self.nnodes {
            let direction = kernel.node_gradient(iq, n);
            model.flux_jacobian_eigen_structure(
                &self.props,
                direction,
                self.right.view_mut(),
                self.left.view_mut(),
                self.lambda.view_mut(),
            )?;
            let mut wave = 0.0f64;
            for m in 0..self.neq {
                wave = wave.max(self.lambda[m].abs());
            }
            self.lambda_max[n] = wave;
            let kp = &mut self.k_plus[n];
            let km = &mut self.k_min[n];
            for i in 0..self.neq {
                for j in 0..self.neq {
                    let mut plus = 0.0;
                    let mut minus = 0.0;
                    for m in 0..self.neq {
                        let rl = self.right[[i, m]] * self.left[[m, j]];
                        plus += rl * self.lambda[m].max(0.0);
                        minus += rl * self.lambda[m].min(0.0);
                    }
                    kp[[i, j]] = plus;
                    km[[i, j]] = minus;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disc::shape::Triag;
    use crate::physics::euler2d::Euler2D;
    use crate::physics::linear_adv2d::LinearAdv2D;
    use approx::assert_relative_eq;
    use ndarray::array;

    fn bound_kernel(neq: usize, sol: Array2<f64>) -> ElementKernel {
        let mut kernel = ElementKernel::new::<Triag>(neq);
        let coords = array![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]];
        let inodes = array![0usize, 1, 2];
        kernel.bind(inodes.view(), &coords, sol.view());
        kernel.interpolate().unwrap();
        kernel
    }

    #[test]
    fn invert_into_recovers_identity() {
        let mat = array![[2.0, 1.0], [1.0, 3.0]];
        let mut inv = Array2::zeros((2, 2));
        invert_into(&mat, &mut inv);
        let identity = mat.dot(&inv);
        for i in 0..2 {
            for j in 0..2 {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert_relative_eq!(identity[[i, j]], expected, epsilon = 1e-13);
            }
        }
    }

    #[test]
    fn split_matrices_sum_to_projected_jacobian() {
        let model = Euler2D::new();
        let sol = model.conservative(1.1, 0.4, 0.2, 1.2);
        let mut nodal = Array2::zeros((3, 4));
        for n in 0..3 {
            nodal.row_mut(n).assign(&sol);
        }
        let kernel = bound_kernel(4, nodal);
        let mut split = KSplit::<Euler2D>::new(3);
        split.prepare(&model, &kernel, 0).unwrap();

        for n in 0..3 {
            let direction = kernel.node_gradient(0, n);
            let mut k_analytic = Array2::zeros((4, 4));
            model.flux_jacobian(&split.props, direction, k_analytic.view_mut());
            let k_sum = &split.k_plus[n] + &split.k_min[n];
            for i in 0..4 {
                for j in 0..4 {
                    assert_relative_eq!(k_sum[[i, j]], k_analytic[[i, j]], epsilon = 1e-10);
                }
            }
        }
    }

    struct NoEigenModel;
    impl crate::physics::PhysicsModel for NoEigenModel {
        const NEQS: usize = 1;
        const NDIM: usize = 2;
        type Properties = ();
        fn type_name(&self) -> &'static str {
            "NoEigen"
        }
        fn compute_properties(
            &self,
            _coord: ndarray::ArrayView1<f64>,
            _solution: ndarray::ArrayView1<f64>,
            _gradient: ndarray::ArrayView2<f64>,
            _props: &mut (),
        ) {
        }
        fn residual(
            &self,
            _props: &(),
            mut lu: ndarray::ArrayViewMut1<f64>,
        ) -> Result<(), SolverError> {
            lu[0] = 0.0;
            Ok(())
        }
        fn flux_jacobian_eigen_values(
            &self,
            _props: &(),
            _direction: [f64; 2],
            _eigen_values: ndarray::ArrayViewMut1<f64>,
        ) {
        }
        fn flux_jacobian_eigen_structure(
            &self,
            _props: &(),
            _direction: [f64; 2],
            _right: ndarray::ArrayViewMut2<f64>,
            _left: ndarray::ArrayViewMut2<f64>,
            _eigen_values: ndarray::ArrayViewMut1<f64>,
        ) -> Result<(), SolverError> {
            Err(SolverError::NotImplemented(
                "variable set has no eigen decomposition",
            ))
        }
        fn analytic_flux(
            &self,
            _props: &(),
            _direction: [f64; 2],
            _flux: ndarray::ArrayViewMut1<f64>,
        ) {
        }
        fn max_eigen_value(&self, _props: &(), _direction: [f64; 2]) -> f64 {
            0.0
        }
    }

    #[test]
    fn missing_eigen_structure_propagates() {
        let model = NoEigenModel;
        let kernel = bound_kernel(1, array![[0.0], [0.0], [0.0]]);
        let mut split = KSplit::<NoEigenModel>::new(3);
        assert!(matches!(
            split.prepare(&model, &kernel, 0),
            Err(SolverError::NotImplemented(_))
        ));
    }

    #[test]
    fn scalar_split_is_positive_negative_part() {
        let model = LinearAdv2D::constant(1.0, 0.0);
        let nodal = array![[0.0], [1.0], [2.0]];
        let kernel = bound_kernel(1, nodal);
        let mut split = KSplit::<LinearAdv2D>::new(3);
        split.prepare(&model, &kernel, 0).unwrap();

        // node gradients of the unit triangle are (-1,-1), (1,0), (0,1)
        // so projections on a = (1,0) are -1, 1, 0
        assert_relative_eq!(split.k_plus[0][[0, 0]], 0.0, epsilon = 1e-14);
        assert_relative_eq!(split.k_min[0][[0, 0]], -1.0, epsilon = 1e-14);
        assert_relative_eq!(split.k_plus[1][[0, 0]], 1.0, epsilon = 1e-14);
        assert_relative_eq!(split.k_min[1][[0, 0]], 0.0, epsilon = 1e-14);
        assert_relative_eq!(split.lambda_max[2], 0.0, epsilon = 1e-14);
    }
}
