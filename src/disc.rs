pub mod boundary;
pub mod bscheme;
pub mod dispatcher;
pub mod domain;
pub mod kernel;
pub mod lda;
pub mod lxf;
pub mod nscheme;
pub mod quadrature;
pub mod scheme;
pub mod shape;
pub mod supg;
