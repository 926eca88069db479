use ndarray::{Array, Array1, Array2, Ix1, array};

/// Quadrature points in reference coordinates with weights summing to
/// the reference-element measure.
pub struct Quadrature {
    pub points: Array2<f64>, // (nqp, ndim)
    pub weights: Array1<f64>,
}

impl Quadrature {
    pub fn len(&self) -> usize {
        self.weights.len()
    }
}

/// Rules on the unit triangle (0,0)-(1,0)-(0,1), area 1/2.
pub fn triangle_rule(points_num: usize) -> Quadrature {
    let (points, weights) = match points_num {
        1 => {
            let points = array![[1.0 / 3.0, 1.0 / 3.0]];
            let weights = array![0.5];
            (points, weights)
        }
        3 => {
            // degree-2 rule, interior points
            let points = array![
                [1.0 / 6.0, 1.0 / 6.0],
                [2.0 / 3.0, 1.0 / 6.0],
                [1.0 / 6.0, 2.0 / 3.0]
            ];
            let weights = array![1.0 / 6.0, 1.0 / 6.0, 1.0 / 6.0];
            (points, weights)
        }
        _ => panic!("Number of points not supported"),
    };
    Quadrature { points, weights }
}

/// Tensor-product Gauss rules on [-1,1]^2, area 4.
pub fn quad_rule(points_num: usize) -> Quadrature {
    let (points, weights) = match points_num {
        1 => {
            let points = array![[0.0, 0.0]];
            let weights = array![4.0];
            (points, weights)
        }
        4 => {
            let g = 1.0 / 3.0_f64.sqrt();
            let points = array![[-g, -g], [g, -g], [g, g], [-g, g]];
            let weights = array![1.0, 1.0, 1.0, 1.0];
            (points, weights)
        }
        _ => panic!("Number of points not supported"),
    };
    Quadrature { points, weights }
}

/// Gauss rules on the reference segment [-1,1], used by face terms.
pub fn segment_rule(points_num: usize) -> (Array<f64, Ix1>, Array<f64, Ix1>) {
    match points_num {
        1 => (array![0.0], array![2.0]),
        2 => {
            let g = 1.0 / 3.0_f64.sqrt();
            (array![-g, g], array![1.0, 1.0])
        }
        _ => panic!("Number of points not supported"),
    }
}
