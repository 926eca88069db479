use ndarray::{Array1, Array2, Array3, ArrayView1, ArrayView2, s};

use crate::disc::shape::ElementShape;
use crate::error::SolverError;
use crate::mesh::ElementKind;

/// Per-element scratch shared by every distribution scheme: gathered
/// nodal data, quadrature-point interpolants, physical shape-function
/// gradients and the elemental accumulators. Allocated once per term
/// instance and reused across all elements of the same shape.
pub struct ElementKernel {
    pub kind: ElementKind,
    pub nnodes: usize,
    pub nqp: usize,
    pub neq: usize,

    // reference-space tables, fixed at construction
    pub phi: Array2<f64>,      // (nqp, nnodes)
    dphi_ref: Array3<f64>,     // (nqp, ndim, nnodes)
    ref_weights: Array1<f64>,  // (nqp)

    // per-element data, overwritten by bind/interpolate
    pub coords: Array2<f64>,    // (nnodes, ndim)
    pub sol: Array2<f64>,       // (nnodes, neq)
    pub qp_x: Array2<f64>,      // (nqp, ndim)
    pub qp_u: Array2<f64>,      // (nqp, neq)
    pub qp_grad: Array3<f64>,   // (nqp, ndim, neq)
    pub dphi_phys: Array3<f64>, // (nqp, ndim, nnodes)
    pub wj: Array1<f64>,        // (nqp), jacobian determinant * weight
    pub volume: f64,

    // elemental accumulators, zeroed by interpolate
    pub nodal_res: Array2<f64>,  // (nnodes, neq)
    pub nodal_wave: Array1<f64>, // (nnodes)
}

impl ElementKernel {
    pub fn new<S: ElementShape>(neq: usize) -> ElementKernel {
        let rule = S::quadrature();
        let nqp = rule.len();
        let nnodes = S::NNODES;
        let ndim = S::NDIM;
        let mut phi = Array2::zeros((nqp, nnodes));
        let mut dphi_ref = Array3::zeros((nqp, ndim, nnodes));
        for iq in 0..nqp {
            let xi = rule.points[[iq, 0]];
            let eta = rule.points[[iq, 1]];
            phi.slice_mut(s![iq, ..]).assign(&S::values(xi, eta));
            dphi_ref
                .slice_mut(s![iq, .., ..])
                .assign(&S::gradients(xi, eta));
        }
        ElementKernel {
            kind: S::KIND,
            nnodes,
            nqp,
            neq,
            phi,
            dphi_ref,
            ref_weights: rule.weights,
            coords: Array2::zeros((nnodes, ndim)),
            sol: Array2::zeros((nnodes, neq)),
            qp_x: Array2::zeros((nqp, ndim)),
            qp_u: Array2::zeros((nqp, neq)),
            qp_grad: Array3::zeros((nqp, ndim, neq)),
            dphi_phys: Array3::zeros((nqp, ndim, nnodes)),
            wj: Array1::zeros(nqp),
            volume: 0.0,
            nodal_res: Array2::zeros((nnodes, neq)),
            nodal_wave: Array1::zeros(nnodes),
        }
    }

    /// Gather node coordinates and solution values of one element into
    /// the local matrices.
    pub fn bind(
        &mut self,
        inodes: ArrayView1<usize>,
        coords: &Array2<f64>,
        solution: ArrayView2<f64>,
    ) {
        for (local, &inode) in inodes.iter().enumerate() {
            self.coords.row_mut(local).assign(&coords.row(inode));
            self.sol.row_mut(local).assign(&solution.row(inode));
        }
    }

    /// Map the bound element to physical space: quadrature-point
    /// coordinates, interpolated solution and gradient, physical
    /// shape-function gradients and integration weights. Zeroes the
    /// elemental accumulators. A non-positive Jacobian determinant
    /// means the element is inverted and aborts the computation.
    pub fn interpolate(&mut self) -> Result<(), SolverError> {
        self.qp_x.assign(&self.phi.dot(&self.coords));
        self.qp_u.assign(&self.phi.dot(&self.sol));
        self.volume = 0.0;
        for iq in 0..self.nqp {
            let mut dx_dxi = 0.0;
            let mut dx_deta = 0.0;
            let mut dy_dxi = 0.0;
            let mut dy_deta = 0.0;
            for k in 0..self.nnodes {
                dx_dxi += self.dphi_ref[[iq, 0, k]] * self.coords[[k, 0]];
                dx_deta += self.dphi_ref[[iq, 1, k]] * self.coords[[k, 0]];
                dy_dxi += self.dphi_ref[[iq, 0, k]] * self.coords[[k, 1]];
                dy_deta += self.dphi_ref[[iq, 1, k]] * self.coords[[k, 1]];
            }
            let jacob_det = dx_dxi * dy_deta - dx_deta * dy_dxi;
            if jacob_det <= 0.0 {
                return Err(SolverError::DegenerateElement { det: jacob_det });
            }
            let dxi_dx = dy_deta / jacob_det;
            let dxi_dy = -dx_deta / jacob_det;
            let deta_dx = -dy_dxi / jacob_det;
            let deta_dy = dx_dxi / jacob_det;
            for k in 0..self.nnodes {
                self.dphi_phys[[iq, 0, k]] =
                    self.dphi_ref[[iq, 0, k]] * dxi_dx + self.dphi_ref[[iq, 1, k]] * deta_dx;
                self.dphi_phys[[iq, 1, k]] =
                    self.dphi_ref[[iq, 0, k]] * dxi_dy + self.dphi_ref[[iq, 1, k]] * deta_dy;
            }
            self.wj[iq] = jacob_det * self.ref_weights[iq];
            self.volume += self.wj[iq];

            let grad = self.dphi_phys.slice(s![iq, .., ..]).dot(&self.sol);
            self.qp_grad.slice_mut(s![iq, .., ..]).assign(&grad);
        }
        self.nodal_res.fill(0.0);
        self.nodal_wave.fill(0.0);
        Ok(())
    }

    /// Physical shape-function gradient of node `n` at point `iq`,
    /// the projection direction of the schemes.
    pub fn node_gradient(&self, iq: usize, n: usize) -> [f64; 2] {
        [self.dphi_phys[[iq, 0, n]], self.dphi_phys[[iq, 1, n]]]
    }
}
