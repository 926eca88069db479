use ndarray::{Array1, Array2, ArrayView1, ArrayView2, ArrayViewMut1, ArrayViewMut2};

use crate::error::SolverError;
use crate::physics::PhysicsModel;

/// Compressible Euler equations in 2D, conservative variables
/// (rho, rho*u, rho*v, rho*E), ideal gas.
pub struct Euler2D {
    pub gamma: f64,
}

impl Euler2D {
    pub fn new() -> Euler2D {
        Euler2D { gamma: 1.4 }
    }

    /// Conservative state from primitive variables, for tests and
    /// boundary prescriptions.
    pub fn conservative(&self, rho: f64, u: f64, v: f64, p: f64) -> Array1<f64> {
        let rho_e = p / (self.gamma - 1.0) + 0.5 * rho * (u * u + v * v);
        ndarray::array![rho, rho * u, rho * v, rho_e]
    }

    /// Projected flux Jacobian K = nx*A + ny*B. Used by the SUPG scheme
    /// tests and eigenstructure verification.
    pub fn flux_jacobian(
        &self,
        props: &EulerProperties,
        direction: [f64; 2],
        mut k: ArrayViewMut2<f64>,
    ) {
        let gm1 = self.gamma - 1.0;
        let (nx, ny) = (direction[0], direction[1]);
        let (u, v, h) = (props.u, props.v, props.h);
        let q2 = props.vel2;
        let un = u * nx + v * ny;

        k[[0, 0]] = 0.0;
        k[[0, 1]] = nx;
        k[[0, 2]] = ny;
        k[[0, 3]] = 0.0;

        k[[1, 0]] = gm1 * 0.5 * q2 * nx - u * un;
        k[[1, 1]] = un + (1.0 - gm1) * u * nx;
        k[[1, 2]] = u * ny - gm1 * v * nx;
        k[[1, 3]] = gm1 * nx;

        k[[2, 0]] = gm1 * 0.5 * q2 * ny - v * un;
        k[[2, 1]] = v * nx - gm1 * u * ny;
        k[[2, 2]] = un + (1.0 - gm1) * v * ny;
        k[[2, 3]] = gm1 * ny;

        k[[3, 0]] = (gm1 * 0.5 * q2 - h) * un;
        k[[3, 1]] = h * nx - gm1 * u * un;
        k[[3, 2]] = h * ny - gm1 * v * un;
        k[[3, 3]] = self.gamma * un;
    }
}

impl Default for Euler2D {
    fn default() -> Euler2D {
        Euler2D::new()
    }
}

/// Per-quadrature-point derived quantities. Overwritten in place at
/// every point, never persisted.
pub struct EulerProperties {
    pub rho: f64,
    pub u: f64,
    pub v: f64,
    pub p: f64,
    pub c: f64,
    /// total specific enthalpy H = (rho*E + p) / rho
    pub h: f64,
    pub vel2: f64,
    pub sol: Array1<f64>,   // (4)
    pub grad: Array2<f64>,  // (2, 4)
}

impl Default for EulerProperties {
    fn default() -> EulerProperties {
        EulerProperties {
            rho: 0.0,
            u: 0.0,
            v: 0.0,
            p: 0.0,
            c: 0.0,
            h: 0.0,
            vel2: 0.0,
            sol: Array1::zeros(4),
            grad: Array2::zeros((2, 4)),
        }
    }
}

impl PhysicsModel for Euler2D {
    const NEQS: usize = 4;
    const NDIM: usize = 2;
    type Properties = EulerProperties;

    fn type_name(&self) -> &'static str {
        "Euler2D"
    }

    fn compute_properties(
        &self,
        _coord: ArrayView1<f64>,
        solution: ArrayView1<f64>,
        gradient: ArrayView2<f64>,
        props: &mut EulerProperties,
    ) {
        let rho = solution[0];
        let inv_rho = 1.0 / rho;
        let u = solution[1] * inv_rho;
        let v = solution[2] * inv_rho;
        let rho_e = solution[3];
        let vel2 = u * u + v * v;
        let p = (self.gamma - 1.0) * (rho_e - 0.5 * rho * vel2);
        props.rho = rho;
        props.u = u;
        props.v = v;
        props.p = p;
        props.c = (self.gamma * p * inv_rho).sqrt();
        props.h = (rho_e + p) * inv_rho;
        props.vel2 = vel2;
        props.sol.assign(&solution);
        props.grad.assign(&gradient);
    }

    fn residual(
        &self,
        props: &EulerProperties,
        mut lu: ArrayViewMut1<f64>,
    ) -> Result<(), SolverError> {
        let gm1 = self.gamma - 1.0;
        let (u, v, h) = (props.u, props.v, props.h);
        let q2 = props.vel2;
        let gx = props.grad.row(0);
        let gy = props.grad.row(1);

        // A . du/dx
        lu[0] = gx[1];
        lu[1] = (gm1 * 0.5 * q2 - u * u) * gx[0] + (3.0 - self.gamma) * u * gx[1]
            - gm1 * v * gx[2]
            + gm1 * gx[3];
        lu[2] = -u * v * gx[0] + v * gx[1] + u * gx[2];
        lu[3] = (gm1 * 0.5 * q2 - h) * u * gx[0] + (h - gm1 * u * u) * gx[1]
            - gm1 * u * v * gx[2]
            + self.gamma * u * gx[3];

        // + B . du/dy
        lu[0] += gy[2];
        lu[1] += -u * v * gy[0] + v * gy[1] + u * gy[2];
        lu[2] += (gm1 * 0.5 * q2 - v * v) * gy[0] - gm1 * u * gy[1]
            + (3.0 - self.gamma) * v * gy[2]
            + gm1 * gy[3];
        lu[3] += (gm1 * 0.5 * q2 - h) * v * gy[0] - gm1 * u * v * gy[1]
            + (h - gm1 * v * v) * gy[2]
            + self.gamma * v * gy[3];
        Ok(())
    }

    fn flux_jacobian_eigen_values(
        &self,
        props: &EulerProperties,
        direction: [f64; 2],
        mut eigen_values: ArrayViewMut1<f64>,
    ) {
        let un = props.u * direction[0] + props.v * direction[1];
        let area = (direction[0].powi(2) + direction[1].powi(2)).sqrt();
        eigen_values[0] = un;
        eigen_values[1] = un;
        eigen_values[2] = un + props.c * area;
        eigen_values[3] = un - props.c * area;
    }

    fn flux_jacobian_eigen_structure(
        &self,
        props: &EulerProperties,
        direction: [f64; 2],
        mut right: ArrayViewMut2<f64>,
        mut left: ArrayViewMut2<f64>,
        mut eigen_values: ArrayViewMut1<f64>,
    ) -> Result<(), SolverError> {
        let area = (direction[0].powi(2) + direction[1].powi(2)).sqrt();
        if area < 1e-300 {
            // zero direction projects everything to zero
            right.fill(0.0);
            left.fill(0.0);
            for i in 0..4 {
                right[[i, i]] = 1.0;
                left[[i, i]] = 1.0;
            }
            eigen_values.fill(0.0);
            return Ok(());
        }
        let nx = direction[0] / area;
        let ny = direction[1] / area;
        let (u, v, c, h) = (props.u, props.v, props.c, props.h);
        let q2 = props.vel2;
        let un = u * nx + v * ny;
        let ut = -u * ny + v * nx;
        let gm1 = self.gamma - 1.0;
        let beta = gm1 / (c * c);

        eigen_values[0] = un * area;
        eigen_values[1] = un * area;
        eigen_values[2] = (un + c) * area;
        eigen_values[3] = (un - c) * area;

        // right eigenvectors, one per column
        right[[0, 0]] = 1.0;
        right[[1, 0]] = u;
        right[[2, 0]] = v;
        right[[3, 0]] = 0.5 * q2;

        right[[0, 1]] = 0.0;
        right[[1, 1]] = -ny;
        right[[2, 1]] = nx;
        right[[3, 1]] = ut;

        right[[0, 2]] = 1.0;
        right[[1, 2]] = u + c * nx;
        right[[2, 2]] = v + c * ny;
        right[[3, 2]] = h + c * un;

        right[[0, 3]] = 1.0;
        right[[1, 3]] = u - c * nx;
        right[[2, 3]] = v - c * ny;
        right[[3, 3]] = h - c * un;

        // left eigenvectors, one per row
        left[[0, 0]] = 1.0 - 0.5 * beta * q2;
        left[[0, 1]] = beta * u;
        left[[0, 2]] = beta * v;
        left[[0, 3]] = -beta;

        left[[1, 0]] = -ut;
        left[[1, 1]] = -ny;
        left[[1, 2]] = nx;
        left[[1, 3]] = 0.0;

        left[[2, 0]] = 0.5 * (0.5 * beta * q2 - un / c);
        left[[2, 1]] = 0.5 * (nx / c - beta * u);
        left[[2, 2]] = 0.5 * (ny / c - beta * v);
        left[[2, 3]] = 0.5 * beta;

        left[[3, 0]] = 0.5 * (0.5 * beta * q2 + un / c);
        left[[3, 1]] = 0.5 * (-nx / c - beta * u);
        left[[3, 2]] = 0.5 * (-ny / c - beta * v);
        left[[3, 3]] = 0.5 * beta;

        Ok(())
    }

    fn analytic_flux(
        &self,
        props: &EulerProperties,
        direction: [f64; 2],
        mut flux: ArrayViewMut1<f64>,
    ) {
        let un = props.u * direction[0] + props.v * direction[1];
        flux[0] = props.rho * un;
        flux[1] = props.rho * props.u * un + props.p * direction[0];
        flux[2] = props.rho * props.v * un + props.p * direction[1];
        flux[3] = (props.sol[3] + props.p) * un;
    }

    fn max_eigen_value(&self, props: &EulerProperties, direction: [f64; 2]) -> f64 {
        let un = props.u * direction[0] + props.v * direction[1];
        let area = (direction[0].powi(2) + direction[1].powi(2)).sqrt();
        un.abs() + props.c * area
    }
}
