//! Component composition and linking
//!
//! A component is a module, an entry point, or a composite of both. Linking a
//! component restricts its module to the composed entry points and validates
//! the result as a self-contained program ready for code generation.

use crate::{
    diagnostics::{Diagnosed, Diagnostic, Diagnostics, Severity},
    profile::Stage,
    session::{EntryPoint, Module, Session, SessionShared, Target},
};
use std::rc::Rc;

/// A unit that can be composed and linked
#[derive(Debug, Clone)]
pub enum Component {
    /// A whole module without any selected entry point
    Module(Module),
    /// A single entry point of a module
    EntryPoint(EntryPoint),
    /// A module restricted to a set of entry points
    Composite(Composite),
}

impl From<Module> for Component {
    fn from(module: Module) -> Self {
        Component::Module(module)
    }
}

impl From<EntryPoint> for Component {
    fn from(entry_point: EntryPoint) -> Self {
        Component::EntryPoint(entry_point)
    }
}

/// The result of composing components of one module
#[derive(Debug, Clone)]
pub struct Composite {
    module: Module,
    /// Indices into the module's entry points, in composition order
    entry_points: Vec<usize>,
}

impl Composite {
    /// Module the composite was built from
    pub fn module(&self) -> &Module {
        &self.module
    }

    /// Number of entry points selected by the composite
    pub fn entry_point_count(&self) -> usize {
        self.entry_points.len()
    }
}

impl Component {
    /// The module behind this component and its selected entry points
    fn parts(&self) -> (&Module, Vec<usize>) {
        match self {
            Component::Module(module) => (module, Vec::new()),
            Component::EntryPoint(entry_point) => (&entry_point.module, vec![entry_point.index]),
            Component::Composite(composite) => (&composite.module, composite.entry_points.clone()),
        }
    }

    /// Links the component into a program
    ///
    /// Every session target must name a known profile. The module is reduced to
    /// the selected entry points and validated again; validation errors are
    /// rendered against the module source.
    pub fn link(&self) -> Diagnosed<LinkedProgram> {
        let (module, selected) = self.parts();
        let data = &module.inner;
        let path = data.path.as_str();

        let mut diagnostics = Diagnostics::new();
        for (index, target) in data.session.targets.iter().enumerate() {
            if target.profile.is_none() {
                diagnostics.push(Diagnostic::error(path, format!("target {index} ({}) has no valid profile", target.desc.format)));
            }
        }
        if diagnostics.has_errors() {
            return Diagnosed::failed(diagnostics);
        }

        let entry_points: Vec<naga::EntryPoint> = selected.iter().map(|&index| data.ir.entry_points[index].clone()).collect();
        let mut ir = data.ir.clone();
        ir.entry_points = entry_points;

        let info = match crate::validate(&ir) {
            Ok(info) => info,
            Err(error) => {
                diagnostics.push(Diagnostic::rendered(Severity::Error, error.emit_to_string_with_path(&data.source, path)));
                return Diagnosed::failed(diagnostics);
            }
        };

        let entry_points = ir
            .entry_points
            .iter()
            .filter_map(|ep| Stage::from_naga(ep.stage).map(|stage| LinkedEntryPoint { name: ep.name.clone(), stage }))
            .collect();

        tracing::debug!(module = data.name.as_str(), entry_points = selected.len(), "linked program");

        Diagnosed::ok(
            LinkedProgram {
                session: Rc::clone(&data.session),
                path: data.path.clone(),
                ir,
                info,
                entry_points,
            },
            diagnostics,
        )
    }
}

impl Session {
    /// Composes components into a single unit
    ///
    /// # Arguments
    /// * `parts` - Modules, entry points or composites to merge
    ///
    /// # Returns
    /// A composite component. Fails if `parts` is empty, mixes sessions or
    /// modules, or names the same entry point twice.
    pub fn create_composite_component(&self, parts: &[Component]) -> Diagnosed<Component> {
        let Some(first) = parts.first() else {
            return Diagnosed::error("<composite>", "cannot compose an empty list of components");
        };
        let module = first.parts().0.clone();
        let path = module.path();

        let mut entry_points: Vec<usize> = Vec::new();
        for part in parts {
            let (part_module, selected) = part.parts();

            if !Rc::ptr_eq(&part_module.inner.session, &self.shared) {
                return Diagnosed::error(path, format!("module '{}' belongs to a different session", part_module.name()));
            }
            if !Rc::ptr_eq(&part_module.inner, &module.inner) {
                return Diagnosed::error(path, format!("cannot compose components of modules '{}' and '{}'", module.name(), part_module.name()));
            }

            for index in selected {
                if entry_points.contains(&index) {
                    let name = &module.inner.ir.entry_points[index].name;
                    return Diagnosed::error(path, format!("entry point '{name}' is included more than once"));
                }
                entry_points.push(index);
            }
        }

        tracing::debug!(module = module.name(), entry_points = entry_points.len(), "composed components");

        Diagnosed::ok(Component::Composite(Composite { module, entry_points }), Diagnostics::new())
    }
}

/// Name and stage of an entry point in a linked program
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkedEntryPoint {
    /// Function name
    pub name: String,
    /// Pipeline stage
    pub stage: Stage,
}

/// A self-contained program ready for code generation
#[derive(Debug)]
pub struct LinkedProgram {
    session: Rc<SessionShared>,
    pub(crate) path: String,
    pub(crate) ir: naga::Module,
    pub(crate) info: naga::valid::ModuleInfo,
    entry_points: Vec<LinkedEntryPoint>,
}

impl LinkedProgram {
    /// Entry points of the program, addressed by index during code generation
    pub fn entry_points(&self) -> &[LinkedEntryPoint] {
        &self.entry_points
    }

    pub(crate) fn target(&self, index: usize) -> Option<&Target> {
        self.session.targets.get(index)
    }
}
