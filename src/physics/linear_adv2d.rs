use ndarray::{ArrayView1, ArrayView2, ArrayViewMut1, ArrayViewMut2};

use crate::error::SolverError;
use crate::physics::PhysicsModel;

/// Advection velocity field of the scalar transport equation.
#[derive(Clone, Copy, Debug)]
pub enum AdvectionField {
    Constant([f64; 2]),
    /// a(x, y) = (y - yc, xc - x), solid-body rotation around `center`.
    Rotation { center: [f64; 2] },
}

/// Scalar linear advection, u_t + a(x) . grad(u) = 0.
pub struct LinearAdv2D {
    pub field: AdvectionField,
}

impl LinearAdv2D {
    pub fn constant(ax: f64, ay: f64) -> LinearAdv2D {
        LinearAdv2D {
            field: AdvectionField::Constant([ax, ay]),
        }
    }
    pub fn rotation(xc: f64, yc: f64) -> LinearAdv2D {
        LinearAdv2D {
            field: AdvectionField::Rotation { center: [xc, yc] },
        }
    }
}

#[derive(Default)]
pub struct AdvProperties {
    pub a: [f64; 2],
    pub u: f64,
    pub grad_u: [f64; 2],
}

impl PhysicsModel for LinearAdv2D {
    const NEQS: usize = 1;
    const NDIM: usize = 2;
    type Properties = AdvProperties;

    fn type_name(&self) -> &'static str {
        "LinearAdv2D"
    }

    fn compute_properties(
        &self,
        coord: ArrayView1<f64>,
        solution: ArrayView1<f64>,
        gradient: ArrayView2<f64>,
        props: &mut AdvProperties,
    ) {
        props.a = match self.field {
            AdvectionField::Constant(a) => a,
            AdvectionField::Rotation { center } => {
                [coord[1] - center[1], center[0] - coord[0]]
            }
        };
        props.u = solution[0];
        props.grad_u = [gradient[[0, 0]], gradient[[1, 0]]];
    }

    fn residual(
        &self,
        props: &AdvProperties,
        mut lu: ArrayViewMut1<f64>,
    ) -> Result<(), SolverError> {
        lu[0] = props.a[0] * props.grad_u[0] + props.a[1] * props.grad_u[1];
        Ok(())
    }

    fn flux_jacobian_eigen_values(
        &self,
        props: &AdvProperties,
        direction: [f64; 2],
        mut eigen_values: ArrayViewMut1<f64>,
    ) {
        eigen_values[0] = props.a[0] * direction[0] + props.a[1] * direction[1];
    }

    fn flux_jacobian_eigen_structure(
        &self,
        props: &AdvProperties,
        direction: [f64; 2],
        mut right: ArrayViewMut2<f64>,
        mut left: ArrayViewMut2<f64>,
        mut eigen_values: ArrayViewMut1<f64>,
    ) -> Result<(), SolverError> {
        right[[0, 0]] = 1.0;
        left[[0, 0]] = 1.0;
        eigen_values[0] = props.a[0] * direction[0] + props.a[1] * direction[1];
        Ok(())
    }

    fn analytic_flux(
        &self,
        props: &AdvProperties,
        direction: [f64; 2],
        mut flux: ArrayViewMut1<f64>,
    ) {
        flux[0] = (props.a[0] * direction[0] + props.a[1] * direction[1]) * props.u;
    }

    fn max_eigen_value(&self, props: &AdvProperties, direction: [f64; 2]) -> f64 {
        (props.a[0] * direction[0] + props.a[1] * direction[1]).abs()
    }
}
