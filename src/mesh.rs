pub mod mesh2d;

pub use mesh2d::{ElementKind, Mesh2d, Region};
