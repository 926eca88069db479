use ndarray::{Array1, Array2, ArrayView1, ArrayViewMut1};

use crate::error::SolverError;
use crate::physics::PhysicsModel;
use crate::physics::euler2d::{Euler2D, EulerProperties};

/// Scratch buffers for the model-generic Rusanov flux. One instance per
/// face term, reused across faces.
pub struct RiemannScratch<P: PhysicsModel> {
    props_left: P::Properties,
    props_right: P::Properties,
    flux_left: Array1<f64>,
    flux_right: Array1<f64>,
    zero_grad: Array2<f64>,
    coord: Array1<f64>,
}

impl<P: PhysicsModel> RiemannScratch<P> {
    pub fn new() -> RiemannScratch<P> {
        RiemannScratch {
            props_left: P::Properties::default(),
            props_right: P::Properties::default(),
            flux_left: Array1::zeros(P::NEQS),
            flux_right: Array1::zeros(P::NEQS),
            zero_grad: Array2::zeros((P::NDIM, P::NEQS)),
            coord: Array1::zeros(P::NDIM),
        }
    }

    /// Properties of the interior (left) state of the last `rusanov`
    /// call. Face terms reuse these for wave-speed estimates.
    pub fn interior_properties(&self) -> &P::Properties {
        &self.props_left
    }

    /// Projected analytic flux F(u_left) . n of the last `rusanov`
    /// call.
    pub fn interior_flux(&self) -> &Array1<f64> {
        &self.flux_left
    }
}

/// Rusanov (local Lax-Friedrichs) flux, valid for any model exposing
/// the physics contract:
/// F* = 1/2 (F(ul) + F(ur)) . n - 1/2 s_max (ur - ul).
pub fn rusanov<P: PhysicsModel>(
    model: &P,
    left: ArrayView1<f64>,
    right: ArrayView1<f64>,
    normal: [f64; 2],
    scratch: &mut RiemannScratch<P>,
    mut flux: ArrayViewMut1<f64>,
) {
    model.compute_properties(
        scratch.coord.view(),
        left,
        scratch.zero_grad.view(),
        &mut scratch.props_left,
    );
    model.compute_properties(
        scratch.coord.view(),
        right,
        scratch.zero_grad.view(),
        &mut scratch.props_right,
    );
    model.analytic_flux(&scratch.props_left, normal, scratch.flux_left.view_mut());
    model.analytic_flux(&scratch.props_right, normal, scratch.flux_right.view_mut());
    let s_max = model
        .max_eigen_value(&scratch.props_left, normal)
        .max(model.max_eigen_value(&scratch.props_right, normal));
    for ieq in 0..P::NEQS {
        flux[ieq] = 0.5 * (scratch.flux_left[ieq] + scratch.flux_right[ieq])
            - 0.5 * s_max * (right[ieq] - left[ieq]);
    }
}

fn admissible(state: ArrayView1<f64>, gamma: f64) -> Result<(f64, f64, f64, f64), SolverError> {
    let rho = state[0];
    if rho <= 0.0 {
        return Err(SolverError::NumericalInput("negative density in Riemann input"));
    }
    let u = state[1] / rho;
    let v = state[2] / rho;
    let p = (gamma - 1.0) * (state[3] - 0.5 * rho * (u * u + v * v));
    if p <= 0.0 {
        return Err(SolverError::NumericalInput("negative pressure in Riemann input"));
    }
    Ok((rho, u, v, p))
}

/// Properties snapshot of the Roe-averaged state between `left` and
/// `right`.
fn roe_average(
    model: &Euler2D,
    left: ArrayView1<f64>,
    right: ArrayView1<f64>,
) -> Result<EulerProperties, SolverError> {
    let gamma = model.gamma;
    let (rho_l, u_l, v_l, p_l) = admissible(left, gamma)?;
    let (rho_r, u_r, v_r, p_r) = admissible(right, gamma)?;
    let h_l = (left[3] + p_l) / rho_l;
    let h_r = (right[3] + p_r) / rho_r;

    let ratio = (rho_r / rho_l).sqrt();
    let w = 1.0 / (1.0 + ratio);
    let u = (u_l + ratio * u_r) * w;
    let v = (v_l + ratio * v_r) * w;
    let h = (h_l + ratio * h_r) * w;
    let vel2 = u * u + v * v;
    let c2 = (gamma - 1.0) * (h - 0.5 * vel2);
    let rho = (rho_l * rho_r).sqrt();
    let p = rho * c2 / gamma;

    let mut props = EulerProperties::default();
    props.rho = rho;
    props.u = u;
    props.v = v;
    props.p = p;
    props.c = c2.sqrt();
    props.h = h;
    props.vel2 = vel2;
    props.sol = ndarray::array![rho, rho * u, rho * v, rho * h - p];
    Ok(props)
}

/// Roe flux: F* = 1/2 (F(ul) + F(ur)) . n - 1/2 R |Lambda| L (ur - ul),
/// eigenstructure evaluated at the Roe-averaged state.
pub fn roe(
    model: &Euler2D,
    left: ArrayView1<f64>,
    right: ArrayView1<f64>,
    normal: [f64; 2],
    mut flux: ArrayViewMut1<f64>,
) -> Result<(), SolverError> {
    let avg = roe_average(model, left, right)?;

    let mut rv = Array2::zeros((4, 4));
    let mut lv = Array2::zeros((4, 4));
    let mut lambda = Array1::zeros(4);
    model.flux_jacobian_eigen_structure(
        &avg,
        normal,
        rv.view_mut(),
        lv.view_mut(),
        lambda.view_mut(),
    )?;

    let mut scratch = RiemannScratch::<Euler2D>::new();
    model.compute_properties(
        scratch.coord.view(),
        left,
        scratch.zero_grad.view(),
        &mut scratch.props_left,
    );
    model.compute_properties(
        scratch.coord.view(),
        right,
        scratch.zero_grad.view(),
        &mut scratch.props_right,
    );
    model.analytic_flux(&scratch.props_left, normal, scratch.flux_left.view_mut());
    model.analytic_flux(&scratch.props_right, normal, scratch.flux_right.view_mut());

    // characteristic jump |Lambda| L (ur - ul)
    let mut dw = Array1::<f64>::zeros(4);
    for m in 0..4 {
        for j in 0..4 {
            dw[m] += lv[[m, j]] * (right[j] - left[j]);
        }
        dw[m] *= lambda[m].abs();
    }
    for i in 0..4 {
        let mut dissipation = 0.0;
        for m in 0..4 {
            dissipation += rv[[i, m]] * dw[m];
        }
        flux[i] = 0.5 * (scratch.flux_left[i] + scratch.flux_right[i]) - 0.5 * dissipation;
    }
    Ok(())
}

/// HLLE flux with Einfeldt wave-speed estimates from the Roe average.
pub fn hlle(
    model: &Euler2D,
    left: ArrayView1<f64>,
    right: ArrayView1<f64>,
    normal: [f64; 2],
    mut flux: ArrayViewMut1<f64>,
) -> Result<(), SolverError> {
    let gamma = model.gamma;
    let (rho_l, u_l, v_l, p_l) = admissible(left, gamma)?;
    let (rho_r, u_r, v_r, p_r) = admissible(right, gamma)?;
    let c_l = (gamma * p_l / rho_l).sqrt();
    let c_r = (gamma * p_r / rho_r).sqrt();
    let un_l = u_l * normal[0] + v_l * normal[1];
    let un_r = u_r * normal[0] + v_r * normal[1];

    let avg = roe_average(model, left, right)?;
    let un_avg = avg.u * normal[0] + avg.v * normal[1];

    let s_left = (un_l - c_l).min(un_avg - avg.c);
    let s_right = (un_r + c_r).max(un_avg + avg.c);
    let b_plus = s_right.max(0.0);
    let b_minus = s_left.min(0.0);

    let mut scratch = RiemannScratch::<Euler2D>::new();
    model.compute_properties(
        scratch.coord.view(),
        left,
        scratch.zero_grad.view(),
        &mut scratch.props_left,
    );
    model.compute_properties(
        scratch.coord.view(),
        right,
        scratch.zero_grad.view(),
        &mut scratch.props_right,
    );
    model.analytic_flux(&scratch.props_left, normal, scratch.flux_left.view_mut());
    model.analytic_flux(&scratch.props_right, normal, scratch.flux_right.view_mut());

    let span = b_plus - b_minus;
    if span <= 0.0 {
        for i in 0..4 {
            flux[i] = 0.5 * (scratch.flux_left[i] + scratch.flux_right[i]);
        }
        return Ok(());
    }
    for i in 0..4 {
        flux[i] = (b_plus * scratch.flux_left[i] - b_minus * scratch.flux_right[i]) / span
            + b_plus * b_minus / span * (right[i] - left[i]);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    fn analytic(model: &Euler2D, state: ArrayView1<f64>, normal: [f64; 2]) -> Array1<f64> {
        let mut props = EulerProperties::default();
        model.compute_properties(
            array![0.0, 0.0].view(),
            state,
            Array2::zeros((2, 4)).view(),
            &mut props,
        );
        let mut flux = Array1::zeros(4);
        model.analytic_flux(&props, normal, flux.view_mut());
        flux
    }

    #[test]
    fn identical_states_recover_analytic_flux() {
        let model = Euler2D::new();
        let state = model.conservative(1.3, 0.7, -0.2, 2.0);
        let normal = [0.6, 0.8];
        let exact = analytic(&model, state.view(), normal);

        let mut scratch = RiemannScratch::<Euler2D>::new();
        let mut f_rusanov = Array1::zeros(4);
        rusanov(
            &model,
            state.view(),
            state.view(),
            normal,
            &mut scratch,
            f_rusanov.view_mut(),
        );
        let mut f_roe = Array1::zeros(4);
        roe(&model, state.view(), state.view(), normal, f_roe.view_mut()).unwrap();
        let mut f_hlle = Array1::zeros(4);
        hlle(&model, state.view(), state.view(), normal, f_hlle.view_mut()).unwrap();

        for i in 0..4 {
            assert_relative_eq!(f_rusanov[i], exact[i], epsilon = 1e-12);
            assert_relative_eq!(f_roe[i], exact[i], epsilon = 1e-12);
            assert_relative_eq!(f_hlle[i], exact[i], epsilon = 1e-12);
        }
    }

    #[test]
    fn fluxes_are_antisymmetric_in_the_normal() {
        let model = Euler2D::new();
        let left = model.conservative(1.0, 0.3, 0.1, 1.0);
        let right = model.conservative(0.8, -0.2, 0.4, 0.9);
        let normal = [1.0, 0.0];
        let flipped = [-1.0, 0.0];

        let mut forward = Array1::zeros(4);
        let mut backward = Array1::zeros(4);
        roe(&model, left.view(), right.view(), normal, forward.view_mut()).unwrap();
        roe(&model, right.view(), left.view(), flipped, backward.view_mut()).unwrap();
        for i in 0..4 {
            assert_relative_eq!(forward[i], -backward[i], epsilon = 1e-11);
        }
    }

    #[test]
    fn negative_density_is_rejected() {
        let model = Euler2D::new();
        let bad = array![-1.0, 0.0, 0.0, 1.0];
        let good = model.conservative(1.0, 0.0, 0.0, 1.0);
        let mut flux = Array1::zeros(4);
        assert!(matches!(
            roe(&model, bad.view(), good.view(), [1.0, 0.0], flux.view_mut()),
            Err(SolverError::NumericalInput(_))
        ));
        assert!(matches!(
            hlle(&model, good.view(), bad.view(), [1.0, 0.0], flux.view_mut()),
            Err(SolverError::NumericalInput(_))
        ));
    }
}
