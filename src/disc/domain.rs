use std::rc::Rc;

use crate::disc::dispatcher::{CellTermLoop, Term};
use crate::error::SolverError;
use crate::fields::Fields;
use crate::mesh::Mesh2d;
use crate::physics::PhysicsModel;

/// The spatial discretization of one domain: an ordered list of cell
/// (volume) terms followed by an ordered list of face (surface) terms.
/// Cell terms always run first so face terms may read what they
/// produced.
pub struct DomainDiscretization {
    cell_terms: Vec<Box<dyn Term>>,
    face_terms: Vec<Box<dyn Term>>,
}

impl DomainDiscretization {
    pub fn new() -> DomainDiscretization {
        DomainDiscretization {
            cell_terms: Vec::new(),
            face_terms: Vec::new(),
        }
    }

    /// Create a cell term of the named scheme over the named regions.
    pub fn create_cell_term<P: PhysicsModel + 'static>(
        &mut self,
        scheme_name: &str,
        regions: &[&str],
        model: Rc<P>,
    ) -> Result<(), SolverError> {
        let term = CellTermLoop::new(scheme_name, regions, model)?;
        self.cell_terms.push(Box::new(term));
        Ok(())
    }

    pub fn push_face_term(&mut self, term: Box<dyn Term>) {
        self.face_terms.push(term);
    }

    pub fn term_num(&self) -> usize {
        self.cell_terms.len() + self.face_terms.len()
    }

    pub fn execute(&mut self, mesh: &Mesh2d, fields: &mut Fields) -> Result<(), SolverError> {
        for term in self.cell_terms.iter_mut() {
            log::debug!("executing cell term '{}'", term.name());
            term.execute(mesh, fields)?;
        }
        for term in self.face_terms.iter_mut() {
            log::debug!("executing face term '{}'", term.name());
            term.execute(mesh, fields)?;
        }
        Ok(())
    }
}

impl Default for DomainDiscretization {
    fn default() -> DomainDiscretization {
        DomainDiscretization::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::linear_adv2d::LinearAdv2D;

    struct RecordingTerm {
        label: &'static str,
        log: Rc<std::cell::RefCell<Vec<&'static str>>>,
    }
    impl Term for RecordingTerm {
        fn name(&self) -> &str {
            self.label
        }
        fn execute(&mut self, _mesh: &Mesh2d, _fields: &mut Fields) -> Result<(), SolverError> {
            self.log.borrow_mut().push(self.label);
            Ok(())
        }
    }

    #[test]
    fn cell_terms_run_before_face_terms() {
        let mesh = Mesh2d::create_tri_mesh(1, 1, 0.0, 1.0, 0.0, 1.0);
        let mut fields = Fields::new(mesh.node_num, 1);
        let log = Rc::new(std::cell::RefCell::new(Vec::new()));
        let mut domain = DomainDiscretization::new();
        domain.push_face_term(Box::new(RecordingTerm {
            label: "face",
            log: log.clone(),
        }));
        domain.cell_terms.push(Box::new(RecordingTerm {
            label: "cell",
            log: log.clone(),
        }));
        domain.execute(&mesh, &mut fields).unwrap();
        assert_eq!(*log.borrow(), vec!["cell", "face"]);
    }

    #[test]
    fn unknown_scheme_fails_at_creation() {
        let mut domain = DomainDiscretization::new();
        let model = Rc::new(LinearAdv2D::constant(1.0, 0.0));
        assert!(matches!(
            domain.create_cell_term("PSI", &["interior"], model),
            Err(SolverError::ValueNotFound(_))
        ));
        assert_eq!(domain.term_num(), 0);
    }
}
