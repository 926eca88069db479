use ndarray::{Array1, Array2};

use crate::disc::quadrature::{Quadrature, quad_rule, triangle_rule};
use crate::mesh::ElementKind;

/// Compile-time description of an element geometry: node count,
/// reference shape functions and the quadrature rule the cell terms
/// integrate with.
pub trait ElementShape {
    const NNODES: usize;
    const NDIM: usize;
    const KIND: ElementKind;

    /// Shape-function values at a reference point, length NNODES.
    fn values(xi: f64, eta: f64) -> Array1<f64>;
    /// Reference-space gradients, (NDIM, NNODES).
    fn gradients(xi: f64, eta: f64) -> Array2<f64>;
    fn quadrature() -> Quadrature;
}

/// Linear triangle on the unit reference triangle (0,0)-(1,0)-(0,1).
/// N0 = 1 - xi - eta, N1 = xi, N2 = eta.
pub struct Triag;

impl ElementShape for Triag {
    const NNODES: usize = 3;
    const NDIM: usize = 2;
    const KIND: ElementKind = ElementKind::Triag;

    fn values(xi: f64, eta: f64) -> Array1<f64> {
        ndarray::array![1.0 - xi - eta, xi, eta]
    }
    fn gradients(_xi: f64, _eta: f64) -> Array2<f64> {
        ndarray::array![[-1.0, 1.0, 0.0], [-1.0, 0.0, 1.0]]
    }
    fn quadrature() -> Quadrature {
        triangle_rule(3)
    }
}

/// Bilinear quadrilateral on [-1,1]^2, nodes counter-clockwise from
/// (-1,-1).
pub struct Quad;

impl ElementShape for Quad {
    const NNODES: usize = 4;
    const NDIM: usize = 2;
    const KIND: ElementKind = ElementKind::Quad;

    fn values(xi: f64, eta: f64) -> Array1<f64> {
        ndarray::array![
            0.25 * (1.0 - xi) * (1.0 - eta),
            0.25 * (1.0 + xi) * (1.0 - eta),
            0.25 * (1.0 + xi) * (1.0 + eta),
            0.25 * (1.0 - xi) * (1.0 + eta),
        ]
    }
    fn gradients(xi: f64, eta: f64) -> Array2<f64> {
        ndarray::array![
            [
                -0.25 * (1.0 - eta), // dN1/dxi
                0.25 * (1.0 - eta),  // dN2/dxi
                0.25 * (1.0 + eta),  // dN3/dxi
                -0.25 * (1.0 + eta), // dN4/dxi
            ],
            [
                -0.25 * (1.0 - xi), // dN1/deta
                -0.25 * (1.0 + xi), // dN2/deta
                0.25 * (1.0 + xi),  // dN3/deta
                0.25 * (1.0 - xi),  // dN4/deta
            ]
        ]
    }
    fn quadrature() -> Quadrature {
        quad_rule(4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn check_partition_of_unity<S: ElementShape>(points: &[(f64, f64)]) {
        for &(xi, eta) in points {
            let phi = S::values(xi, eta);
            assert_relative_eq!(phi.sum(), 1.0, epsilon = 1e-14);
            let dphi = S::gradients(xi, eta);
            for d in 0..S::NDIM {
                assert_relative_eq!(dphi.row(d).sum(), 0.0, epsilon = 1e-14);
            }
        }
    }

    #[test]
    fn test_partition_of_unity() {
        check_partition_of_unity::<Triag>(&[(0.0, 0.0), (0.25, 0.5), (1.0 / 3.0, 1.0 / 3.0)]);
        check_partition_of_unity::<Quad>(&[(0.0, 0.0), (-0.7, 0.3), (1.0, -1.0)]);
    }

    #[test]
    fn test_kronecker_delta_at_nodes() {
        let tri_nodes = [(0.0, 0.0), (1.0, 0.0), (0.0, 1.0)];
        for (i, &(xi, eta)) in tri_nodes.iter().enumerate() {
            let phi = Triag::values(xi, eta);
            for j in 0..3 {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert_relative_eq!(phi[j], expected, epsilon = 1e-14);
            }
        }
        let quad_nodes = [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)];
        for (i, &(xi, eta)) in quad_nodes.iter().enumerate() {
            let phi = Quad::values(xi, eta);
            for j in 0..4 {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert_relative_eq!(phi[j], expected, epsilon = 1e-14);
            }
        }
    }

    #[test]
    fn test_gradient_consistency() {
        // gradients against central finite differences
        let eps = 1e-6;
        let (xi, eta) = (0.3, -0.2);
        let dphi = Quad::gradients(xi, eta);
        let phi_xp = Quad::values(xi + eps, eta);
        let phi_xm = Quad::values(xi - eps, eta);
        let phi_yp = Quad::values(xi, eta + eps);
        let phi_ym = Quad::values(xi, eta - eps);
        for j in 0..4 {
            assert_relative_eq!(
                dphi[[0, j]],
                (phi_xp[j] - phi_xm[j]) / (2.0 * eps),
                epsilon = 1e-8
            );
            assert_relative_eq!(
                dphi[[1, j]],
                (phi_yp[j] - phi_ym[j]) / (2.0 * eps),
                epsilon = 1e-8
            );
        }
    }
}
