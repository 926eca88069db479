pub mod euler2d;
pub mod linear_adv2d;
pub mod riemann;

use hashbrown::HashMap;
use ndarray::{ArrayView1, ArrayView2, ArrayViewMut1, ArrayViewMut2};
use once_cell::sync::Lazy;

use crate::error::SolverError;

/// Contract every physics model exposes to the schemes.
///
/// A model is queried once per quadrature point: `compute_properties`
/// fills the per-point snapshot, and every other operation reads only
/// that snapshot. The snapshot is scratch owned by the caller and is
/// never persisted across points.
pub trait PhysicsModel {
    const NEQS: usize;
    const NDIM: usize;
    type Properties: Default;

    fn type_name(&self) -> &'static str;

    fn compute_properties(
        &self,
        coord: ArrayView1<f64>,
        solution: ArrayView1<f64>,
        gradient: ArrayView2<f64>, // (NDIM, NEQS)
        props: &mut Self::Properties,
    );

    /// Quasi-linear PDE operator L(u) = sum_d A_d du/dx_d.
    fn residual(
        &self,
        props: &Self::Properties,
        lu: ArrayViewMut1<f64>,
    ) -> Result<(), SolverError>;

    /// Eigenvalues of the flux Jacobian projected onto `direction`
    /// (an arbitrary, not necessarily unit, vector).
    fn flux_jacobian_eigen_values(
        &self,
        props: &Self::Properties,
        direction: [f64; 2],
        eigen_values: ArrayViewMut1<f64>,
    );

    /// Right eigenvectors, left eigenvectors and eigenvalues of the
    /// projected flux Jacobian, K = R diag(lambda) L.
    fn flux_jacobian_eigen_structure(
        &self,
        props: &Self::Properties,
        direction: [f64; 2],
        right: ArrayViewMut2<f64>,
        left: ArrayViewMut2<f64>,
        eigen_values: ArrayViewMut1<f64>,
    ) -> Result<(), SolverError>;

    /// Physical flux projected onto `direction`, F(u) . n.
    fn analytic_flux(
        &self,
        props: &Self::Properties,
        direction: [f64; 2],
        flux: ArrayViewMut1<f64>,
    );

    /// Largest characteristic speed magnitude along `direction`.
    fn max_eigen_value(&self, props: &Self::Properties, direction: [f64; 2]) -> f64;
}

/// Physics model tags resolvable by type-name string.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PhysicsKind {
    LinearAdv2D,
    Euler2D,
}

static PHYSICS_REGISTRY: Lazy<HashMap<&'static str, PhysicsKind>> = Lazy::new(|| {
    let mut map = HashMap::new();
    map.insert("LinearAdv2D", PhysicsKind::LinearAdv2D);
    map.insert("Euler2D", PhysicsKind::Euler2D);
    map
});

pub fn physics_by_name(name: &str) -> Result<PhysicsKind, SolverError> {
    PHYSICS_REGISTRY
        .get(name)
        .copied()
        .ok_or_else(|| SolverError::ValueNotFound(format!("physics model '{name}'")))
}
