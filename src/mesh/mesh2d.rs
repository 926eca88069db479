use ndarray::{Array1, Array2, ArrayView1, s};

use crate::error::SolverError;

/// Element shapes the discretization knows how to loop over.
/// `Segment` only appears in boundary regions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Triag,
    Quad,
    Segment,
}

impl ElementKind {
    pub fn node_count(&self) -> usize {
        match self {
            ElementKind::Triag => 3,
            ElementKind::Quad => 4,
            ElementKind::Segment => 2,
        }
    }
}

/// A named, homogeneous set of elements. Connectivity is one row per
/// element, `kind.node_count()` node indices per row, immutable during
/// a solve.
#[derive(Clone, Debug)]
pub struct Region {
    pub name: String,
    pub kind: ElementKind,
    pub connectivity: Array2<usize>,
}

impl Region {
    pub fn elem_num(&self) -> usize {
        self.connectivity.nrows()
    }
    pub fn element(&self, ielem: usize) -> ArrayView1<usize> {
        self.connectivity.row(ielem)
    }
}

#[derive(Clone, Debug)]
pub struct Mesh2d {
    pub coords: Array2<f64>, // (node_num, 2)
    pub regions: Vec<Region>,
    pub node_num: usize,
}

impl Mesh2d {
    pub fn region(&self, name: &str) -> Result<&Region, SolverError> {
        self.regions
            .iter()
            .find(|r| r.name == name)
            .ok_or_else(|| SolverError::ValueNotFound(format!("region '{name}'")))
    }

    /// Unique node indices of a region, ascending.
    pub fn region_nodes(&self, name: &str) -> Result<Vec<usize>, SolverError> {
        let region = self.region(name)?;
        let mut nodes: Vec<usize> = region.connectivity.iter().copied().collect();
        nodes.sort_unstable();
        nodes.dedup();
        Ok(nodes)
    }

    /// Outward unit normal and length of a boundary segment. Boundary
    /// connectivity is oriented counter-clockwise around the domain, so
    /// the outward normal of the segment (x0,y0)->(x1,y1) is the
    /// normalized (y1 - y0, x0 - x1).
    pub fn segment_normal(&self, inodes: ArrayView1<usize>) -> ([f64; 2], f64) {
        let x0 = self.coords[[inodes[0], 0]];
        let y0 = self.coords[[inodes[0], 1]];
        let x1 = self.coords[[inodes[1], 0]];
        let y1 = self.coords[[inodes[1], 1]];
        let normal = [y1 - y0, x0 - x1];
        let length = (normal[0].powi(2) + normal[1].powi(2)).sqrt();
        ([normal[0] / length, normal[1] / length], length)
    }

    /// Structured triangulation of the rectangle [x0,x1] x [y0,y1],
    /// `x_num` x `y_num` cells split into two triangles each. Produces
    /// one cell region "interior" and four counter-clockwise boundary
    /// regions "bottom", "right", "top", "left".
    pub fn create_tri_mesh(
        x_num: usize,
        y_num: usize,
        x0: f64,
        x1: f64,
        y0: f64,
        y1: f64,
    ) -> Mesh2d {
        let (coords, node_num) = rect_nodes(x_num, y_num, x0, x1, y0, y1);
        let nxp = x_num + 1;
        let mut connectivity = Array2::zeros((2 * x_num * y_num, 3));
        let mut ielem = 0;
        for j in 0..y_num {
            for i in 0..x_num {
                let n00 = j * nxp + i;
                let n10 = n00 + 1;
                let n01 = n00 + nxp;
                let n11 = n01 + 1;
                connectivity
                    .slice_mut(s![ielem, ..])
                    .assign(&Array1::from(vec![n00, n10, n11]));
                connectivity
                    .slice_mut(s![ielem + 1, ..])
                    .assign(&Array1::from(vec![n00, n11, n01]));
                ielem += 2;
            }
        }
        let mut regions = vec![Region {
            name: "interior".to_string(),
            kind: ElementKind::Triag,
            connectivity,
        }];
        regions.extend(rect_boundary_regions(x_num, y_num));
        Mesh2d {
            coords,
            regions,
            node_num,
        }
    }

    /// Structured quadrilateral mesh of the same rectangle, nodes ordered
    /// counter-clockwise per cell.
    pub fn create_quad_mesh(
        x_num: usize,
        y_num: usize,
        x0: f64,
        x1: f64,
        y0: f64,
        y1: f64,
    ) -> Mesh2d {
        let (coords, node_num) = rect_nodes(x_num, y_num, x0, x1, y0, y1);
        let nxp = x_num + 1;
        let mut connectivity = Array2::zeros((x_num * y_num, 4));
        let mut ielem = 0;
        for j in 0..y_num {
            for i in 0..x_num {
                let n00 = j * nxp + i;
                let n10 = n00 + 1;
                let n01 = n00 + nxp;
                let n11 = n01 + 1;
                connectivity
                    .slice_mut(s![ielem, ..])
                    .assign(&Array1::from(vec![n00, n10, n11, n01]));
                ielem += 1;
            }
        }
        let mut regions = vec![Region {
            name: "interior".to_string(),
            kind: ElementKind::Quad,
            connectivity,
        }];
        regions.extend(rect_boundary_regions(x_num, y_num));
        Mesh2d {
            coords,
            regions,
            node_num,
        }
    }

    /// Single unit right triangle (0,0)-(1,0)-(0,1). Used by tests that
    /// need elemental quantities in closed form.
    pub fn create_single_triangle() -> Mesh2d {
        let coords = ndarray::array![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]];
        let connectivity = ndarray::array![[0usize, 1, 2]];
        Mesh2d {
            coords,
            regions: vec![Region {
                name: "interior".to_string(),
                kind: ElementKind::Triag,
                connectivity,
            }],
            node_num: 3,
        }
    }
}

fn rect_nodes(
    x_num: usize,
    y_num: usize,
    x0: f64,
    x1: f64,
    y0: f64,
    y1: f64,
) -> (Array2<f64>, usize) {
    let nxp = x_num + 1;
    let nyp = y_num + 1;
    let node_num = nxp * nyp;
    let dx = (x1 - x0) / x_num as f64;
    let dy = (y1 - y0) / y_num as f64;
    let mut coords = Array2::zeros((node_num, 2));
    for j in 0..nyp {
        for i in 0..nxp {
            coords[[j * nxp + i, 0]] = x0 + i as f64 * dx;
            coords[[j * nxp + i, 1]] = y0 + j as f64 * dy;
        }
    }
    (coords, node_num)
}

/// Boundary segments of the structured rectangle, traversed
/// counter-clockwise so that `segment_normal` points outward.
fn rect_boundary_regions(x_num: usize, y_num: usize) -> Vec<Region> {
    let nxp = x_num + 1;
    let node = |i: usize, j: usize| j * nxp + i;

    let mut bottom = Array2::zeros((x_num, 2));
    for i in 0..x_num {
        bottom[[i, 0]] = node(i, 0);
        bottom[[i, 1]] = node(i + 1, 0);
    }
    let mut right = Array2::zeros((y_num, 2));
    for j in 0..y_num {
        right[[j, 0]] = node(x_num, j);
        right[[j, 1]] = node(x_num, j + 1);
    }
    let mut top = Array2::zeros((x_num, 2));
    for i in 0..x_num {
        top[[i, 0]] = node(x_num - i, y_num);
        top[[i, 1]] = node(x_num - i - 1, y_num);
    }
    let mut left = Array2::zeros((y_num, 2));
    for j in 0..y_num {
        left[[j, 0]] = node(0, y_num - j);
        left[[j, 1]] = node(0, y_num - j - 1);
    }
    vec![
        Region {
            name: "bottom".to_string(),
            kind: ElementKind::Segment,
            connectivity: bottom,
        },
        Region {
            name: "right".to_string(),
            kind: ElementKind::Segment,
            connectivity: right,
        },
        Region {
            name: "top".to_string(),
            kind: ElementKind::Segment,
            connectivity: top,
        },
        Region {
            name: "left".to_string(),
            kind: ElementKind::Segment,
            connectivity: left,
        },
    ]
}
