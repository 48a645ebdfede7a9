//! Core data structures for treespec.
//!
//! These types represent the *meaning* of a compiled structure definition,
//! independent of the markup it was read from or the session validating
//! paths against it.
//!
//! The compiler produces these structures.
//! The validator consumes them.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use regex::Regex;
use treespec_nest::NestRule;

/// The role a directory plays in the application.
///
/// Every variant except [`Tag::Other`] is a *special* tag: a framework
/// recognized role that may not be nested inside another special subtree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Tag {
    Controller,
    View,
    Entity,
    Event,
    Handler,
    Container,
    Form,
    /// An ordinary directory, carrying its element name.
    Other(String),
}

impl Tag {
    pub const SPECIAL_NAMES: [&'static str; 7] = [
        "controller",
        "view",
        "entity",
        "event",
        "handler",
        "container",
        "form",
    ];

    /// The special tag an element name stands for, if any.
    ///
    /// Matching is case-insensitive: `<View>` and `<view>` are both views.
    pub fn special(name: &str) -> Option<Tag> {
        match name.to_ascii_lowercase().as_str() {
            "controller" => Some(Tag::Controller),
            "view" => Some(Tag::View),
            "entity" => Some(Tag::Entity),
            "event" => Some(Tag::Event),
            "handler" => Some(Tag::Handler),
            "container" => Some(Tag::Container),
            "form" => Some(Tag::Form),
            _ => None,
        }
    }

    /// Parse a tag name as typed by a user: special names map to their
    /// variant, anything else becomes [`Tag::Other`].
    pub fn from_name(name: &str) -> Tag {
        Tag::special(name).unwrap_or_else(|| Tag::Other(name.to_string()))
    }

    pub fn is_special(&self) -> bool {
        !matches!(self, Tag::Other(_))
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tag::Controller => f.write_str("controller"),
            Tag::View => f.write_str("view"),
            Tag::Entity => f.write_str("entity"),
            Tag::Event => f.write_str("event"),
            Tag::Handler => f.write_str("handler"),
            Tag::Container => f.write_str("container"),
            Tag::Form => f.write_str("form"),
            Tag::Other(name) => f.write_str(name),
        }
    }
}

/// A cardinality constraint attached to one depth key.
#[derive(Debug, Clone)]
pub enum RestrictionRule {
    /// At most `limit` distinct directory names at this position.
    Continue { limit: u32 },

    /// Per-level child limits inside a free-form sub-path.
    ///
    /// Rules are tried in order against the tree-position string of the
    /// directory being validated; the first match decides.
    Nest { rules: Vec<NestRule> },
}

/// A compiled directory matcher.
#[derive(Debug, Clone)]
pub struct NodePattern {
    /// Anchored pattern over the full `/`-joined path, root name first.
    pub pattern: Regex,
    pub special_tag: Tag,
    pub depth_key: String,
    /// Element name the pattern was compiled from.
    pub name: String,
}

/// A compiled matcher for files directly inside a leaf-bearing directory.
#[derive(Debug, Clone)]
pub struct FilePattern {
    pub pattern: Regex,
    /// Tag of the owning directory node.
    pub tag: Tag,
    pub node_name: String,
    pub depth_key: String,
}

/// What file validation tells the caller about an accepted file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMeta {
    /// Normalized `/`-joined path that was validated.
    pub path: String,
    pub tag: Tag,
    pub node_name: String,
    /// File name without its extension.
    pub file_name: String,
    pub extension: String,
}

/// Inputs to the compiler that do not come from the definition document.
#[derive(Debug, Clone)]
pub struct Settings {
    /// File extensions (without the dot) accepted in leaf directories.
    pub extensions: Vec<String>,

    /// Infrastructure directory names the root element may not take.
    /// Special tag names are always reserved on top of these.
    pub reserved_names: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            extensions: vec!["rs".to_string()],
            reserved_names: ["config", "public", "vendor", "cache", "logs", "tmp"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// The compiled form of a structure-definition document.
///
/// Built once by [`StructureDefinition::compile`] and never mutated
/// afterwards. All state that changes while paths are validated lives in a
/// [`crate::ValidationSession`].
#[derive(Debug, Clone)]
pub struct StructureDefinition {
    pub(crate) root_name: String,
    pub(crate) nodes: Vec<NodePattern>,
    pub(crate) files: Vec<FilePattern>,
    pub(crate) restrictions: HashMap<String, RestrictionRule>,
    pub(crate) requirements: BTreeMap<String, Vec<String>>,
    pub(crate) extensions: Vec<String>,
    pub(crate) views: Vec<String>,
}

impl StructureDefinition {
    /// The only directory name permitted at the top of the tree.
    pub fn root_name(&self) -> &str {
        &self.root_name
    }

    pub fn node_patterns(&self) -> &[NodePattern] {
        &self.nodes
    }

    pub fn file_patterns(&self) -> &[FilePattern] {
        &self.files
    }

    pub fn restriction(&self, depth_key: &str) -> Option<&RestrictionRule> {
        self.restrictions.get(depth_key)
    }

    /// Child names that must exist under directories at `depth_key`.
    pub fn requirements(&self, depth_key: &str) -> &[String] {
        self.requirements
            .get(depth_key)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    /// Names of the elements declared directly below a `view` element.
    pub fn views(&self) -> &[String] {
        &self.views
    }
}
