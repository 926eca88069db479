use std::rc::Rc;

use hashbrown::HashMap;
use ndarray::s;
use once_cell::sync::Lazy;

use crate::disc::bscheme::Blended;
use crate::disc::kernel::ElementKernel;
use crate::disc::lda::Lda;
use crate::disc::lxf::LaxFriedrichs;
use crate::disc::nscheme::NScheme;
use crate::disc::scheme::Distribution;
use crate::disc::shape::{ElementShape, Quad, Triag};
use crate::disc::supg::Supg;
use crate::error::SolverError;
use crate::fields::Fields;
use crate::mesh::{ElementKind, Mesh2d, Region};
use crate::physics::PhysicsModel;

/// Distribution schemes resolvable by name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SchemeKind {
    Lda,
    N,
    B,
    LxF,
    Supg,
}

static SCHEME_REGISTRY: Lazy<HashMap<&'static str, SchemeKind>> = Lazy::new(|| {
    let mut map = HashMap::new();
    map.insert("LDA", SchemeKind::Lda);
    map.insert("N", SchemeKind::N);
    map.insert("B", SchemeKind::B);
    map.insert("LxF", SchemeKind::LxF);
    map.insert("SUPG", SchemeKind::Supg);
    map
});

pub fn scheme_by_name(name: &str) -> Result<SchemeKind, SolverError> {
    SCHEME_REGISTRY
        .get(name)
        .copied()
        .ok_or_else(|| SolverError::ValueNotFound(format!("scheme '{name}'")))
}

/// A discretization term of the domain: visits elements and
/// accumulates nodal residual and wave-speed contributions.
pub trait Term {
    fn name(&self) -> &str;
    fn execute(&mut self, mesh: &Mesh2d, fields: &mut Fields) -> Result<(), SolverError>;
}

/// A scheme instance specialized to one element shape, re-bindable to
/// any region holding elements of that shape.
trait RegionTerm {
    fn execute_region(
        &mut self,
        region: &Region,
        mesh: &Mesh2d,
        fields: &mut Fields,
    ) -> Result<(), SolverError>;
}

/// One (shape, quadrature, physics, scheme) instantiation. The inner
/// quadrature loop is fully static; only the per-region lookup above it
/// goes through dynamic dispatch.
struct CellTerm<P: PhysicsModel, D: Distribution<P>> {
    kernel: ElementKernel,
    dist: D,
    model: Rc<P>,
}

impl<P: PhysicsModel, D: Distribution<P>> RegionTerm for CellTerm<P, D> {
    fn execute_region(
        &mut self,
        region: &Region,
        mesh: &Mesh2d,
        fields: &mut Fields,
    ) -> Result<(), SolverError> {
        assert_eq!(region.kind, self.kernel.kind, "region bound to wrong shape");
        for ielem in 0..region.elem_num() {
            let inodes = region.element(ielem);
            self.kernel
                .bind(inodes, &mesh.coords, fields.solution.view());
            self.kernel.interpolate()?;
            for iq in 0..self.kernel.nqp {
                self.dist.distribute(&self.model, &mut self.kernel, iq)?;
            }
            // scatter into the shared accumulators
            for (local, &inode) in inodes.iter().enumerate() {
                fields
                    .residual
                    .row_mut(inode)
                    .scaled_add(1.0, &self.kernel.nodal_res.slice(s![local, ..]));
                fields.wave_speed[inode] += self.kernel.nodal_wave[local];
            }
        }
        Ok(())
    }
}

/// Element-loop dispatcher: pairs the requested scheme with every
/// element shape present in its regions, creating the concrete
/// instance lazily on first encounter and caching it per shape.
pub struct CellTermLoop<P: PhysicsModel> {
    name: String,
    scheme: SchemeKind,
    regions: Vec<String>,
    model: Rc<P>,
    instances: HashMap<ElementKind, Box<dyn RegionTerm>>,
}

impl<P: PhysicsModel + 'static> CellTermLoop<P> {
    pub fn new(
        scheme_name: &str,
        regions: &[&str],
        model: Rc<P>,
    ) -> Result<CellTermLoop<P>, SolverError> {
        let scheme = scheme_by_name(scheme_name)?;
        Ok(CellTermLoop {
            name: format!("cells.{scheme_name}"),
            scheme,
            regions: regions.iter().map(|r| r.to_string()).collect(),
            model,
            instances: HashMap::new(),
        })
    }
}

fn new_region_term<P: PhysicsModel + 'static>(
    scheme: SchemeKind,
    kind: ElementKind,
    model: Rc<P>,
) -> Result<Box<dyn RegionTerm>, SolverError> {
    // shapes supported for the model's dimensionality
    match kind {
        ElementKind::Triag => Ok(make_cell_term::<Triag, P>(scheme, model)),
        ElementKind::Quad => Ok(make_cell_term::<Quad, P>(scheme, model)),
        ElementKind::Segment => Err(SolverError::SetupError(
            "cell scheme attached to a face region".to_string(),
        )),
    }
}

fn make_cell_term<S: ElementShape, P: PhysicsModel + 'static>(
    scheme: SchemeKind,
    model: Rc<P>,
) -> Box<dyn RegionTerm> {
    let kernel = ElementKernel::new::<S>(P::NEQS);
    match scheme {
        SchemeKind::Lda => Box::new(CellTerm {
            kernel,
            dist: Lda::<P>::new(S::NNODES),
            model,
        }),
        SchemeKind::N => Box::new(CellTerm {
            kernel,
            dist: NScheme::<P>::new(S::NNODES),
            model,
        }),
        SchemeKind::B => Box::new(CellTerm {
            kernel,
            dist: Blended::<P>::new(S::NNODES),
            model,
        }),
        SchemeKind::LxF => Box::new(CellTerm {
            kernel,
            dist: LaxFriedrichs::<P>::new(S::NNODES),
            model,
        }),
        SchemeKind::Supg => Box::new(CellTerm {
            kernel,
            dist: Supg::<P>::new(S::NNODES),
            model,
        }),
    }
}

impl<P: PhysicsModel + 'static> Term for CellTermLoop<P> {
    fn name(&self) -> &str {
        &self.name
    }

    fn execute(&mut self, mesh: &Mesh2d, fields: &mut Fields) -> Result<(), SolverError> {
        for region_name in &self.regions {
            let region = mesh.region(region_name)?;
            if region.kind == ElementKind::Segment {
                return Err(SolverError::SetupError(format!(
                    "cell scheme attached to face region '{region_name}'"
                )));
            }
            if !self.instances.contains_key(&region.kind) {
                let instance = new_region_term::<P>(self.scheme, region.kind, self.model.clone())?;
                self.instances.insert(region.kind, instance);
            }
            let instance = self.instances.get_mut(&region.kind).unwrap();
            instance.execute_region(region, mesh, fields)?;
        }
        Ok(())
    }
}
