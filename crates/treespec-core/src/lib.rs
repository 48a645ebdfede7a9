//! treespec: compile a structure definition and validate application trees
//! against it.
//!
//! A structure definition is an XML-shaped document describing which
//! directories an application may contain, how many free-form siblings or
//! nested levels are allowed where, which children are mandatory, and
//! which directories hold source files. [`StructureDefinition::compile`]
//! turns it into anchored path patterns once; a [`ValidationSession`] then
//! admits and classifies concrete paths.

mod attribute;
mod compile;
mod error;
mod markup;
mod report;
mod sibling;
mod spec;
mod validate;
mod walk;

pub use attribute::{Attribute, DEFAULT_CONTINUE_LIMIT, ElementAttributes};
pub use compile::compile_events;
pub use error::Error;
pub use markup::{Attributes, MarkupEvent, read_events};
pub use report::{Diagnostic, Report, Status};
pub use sibling::{ChildRequirements, SiblingNode, SiblingTree};
pub use spec::{
    FileMeta, FilePattern, NodePattern, RestrictionRule, Settings, StructureDefinition, Tag,
};
pub use validate::{
    DiskFs, FileSystem, KnownDirectories, ValidationSession, ViewRegistry, canon_path,
};
pub use walk::{WalkOutput, walk_tree};

use std::path::Path;

/// File name looked up next to the application root when no explicit
/// definition path is given.
pub const DEFAULT_DEFINITION_FILE: &str = "structure.xml";

/// Validate the application tree under `base` in a fresh session.
pub fn check_tree(base: &Path, definition: &StructureDefinition) -> Result<Report, Error> {
    let mut session = definition.session(base);
    let walk = walk_tree(&mut session)?;
    Ok(Report::from_walk_output(&walk))
}
