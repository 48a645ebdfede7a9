//! Per-element pattern building.
//!
//! Each grammar element turns into one regex fragment for its path segment
//! and at most one restriction. Depth keys are generated here as well: they
//! double as restriction lookup keys and as regex capture-group names, so
//! both uses go through [`depth_key`] and [`capture_name`].

use tracing::warn;
use treespec_nest::compile_nest;

use crate::error::Error;
use crate::markup::Attributes;
use crate::spec::RestrictionRule;

/// Limit used when `continue="1"`, i.e. "continue, with the default cap".
pub const DEFAULT_CONTINUE_LIMIT: u32 = 5;

/// Characters allowed in a free-form directory name.
const NAME_CHARS: &str = "[A-Za-z0-9._-]";

/// One segment of a free-form nested sub-path.
const NEST_SEGMENT: &str = "[^/]+";

/// Attributes the compiler understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attribute {
    /// Any directory name is accepted at this position, up to a limit.
    Continue,
    /// An arbitrary sub-path may follow, shaped by a nest rule.
    Nest,
    /// The parent directory must contain this element.
    Require,
    /// Files may sit directly in this directory.
    Root,
}

impl Attribute {
    pub fn from_name(name: &str) -> Option<Attribute> {
        match name {
            "continue" => Some(Attribute::Continue),
            "nest" => Some(Attribute::Nest),
            "require" => Some(Attribute::Require),
            "root" => Some(Attribute::Root),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Attribute::Continue => "continue",
            Attribute::Nest => "nest",
            Attribute::Require => "require",
            Attribute::Root => "root",
        }
    }
}

/// The recognized attributes of one element, with `"0"` values resolved
/// to "not set".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementAttributes {
    pub continue_limit: Option<u32>,
    pub nest: Option<String>,
    pub require: bool,
    pub root: bool,
}

impl ElementAttributes {
    pub fn resolve(element: &str, attributes: &Attributes) -> Result<ElementAttributes, Error> {
        let mut out = ElementAttributes::default();

        for (key, value) in attributes {
            match Attribute::from_name(key) {
                Some(Attribute::Continue) => out.continue_limit = continue_limit(element, value)?,
                Some(Attribute::Nest) => {
                    out.nest = (!is_off(value)).then(|| value.trim().to_string());
                }
                Some(Attribute::Require) => out.require = !is_off(value),
                Some(Attribute::Root) => out.root = !is_off(value),
                None => warn!(element, attribute = %key, "ignoring unknown attribute"),
            }
        }

        if out.continue_limit.is_some() && out.nest.is_some() {
            return Err(Error::invalid(format!(
                "element <{element}> sets both `{}` and `{}`",
                Attribute::Continue.name(),
                Attribute::Nest.name()
            )));
        }

        Ok(out)
    }

    pub fn is_plain(&self) -> bool {
        self == &ElementAttributes::default()
    }
}

fn is_off(value: &str) -> bool {
    matches!(value.trim(), "" | "0" | "false")
}

fn continue_limit(element: &str, value: &str) -> Result<Option<u32>, Error> {
    if is_off(value) {
        return Ok(None);
    }
    match value.trim().parse::<u32>() {
        Ok(1) => Ok(Some(DEFAULT_CONTINUE_LIMIT)),
        Ok(n) => Ok(Some(n)),
        Err(_) => Err(Error::invalid(format!(
            "element <{element}>: `continue` must be a number, got {value:?}"
        ))),
    }
}

/// Regex fragment for one path segment plus the restriction it carries.
#[derive(Debug, Clone)]
pub struct Fragment {
    pub regex: String,
    pub restriction: Option<RestrictionRule>,
}

pub fn build_fragment(
    name: &str,
    attrs: &ElementAttributes,
    depth_key: &str,
) -> Result<Fragment, Error> {
    let group = capture_name(depth_key)?;

    let (mut regex, mut restriction) = match attrs.continue_limit {
        Some(limit) => (
            format!("(?P<{group}>{NAME_CHARS}+)"),
            Some(RestrictionRule::Continue { limit }),
        ),
        None => (regex::escape(name), None),
    };

    if let Some(nest) = &attrs.nest {
        let rules = compile_nest(nest).map_err(|e| {
            Error::invalid(format!("element <{name}>: nest rule {nest:?}: {e}"))
        })?;
        regex.push_str(&format!("(?P<{group}>(?:/{NEST_SEGMENT})*)"));
        restriction = Some(RestrictionRule::Nest { rules });
    }

    Ok(Fragment { regex, restriction })
}

/// Key of the `child`-th element (0-based) at `depth` below `parent`.
pub fn depth_key(parent: &str, depth: usize, child: usize) -> String {
    format!("{parent}_D{depth}C{child}")
}

/// Check that a depth key is usable as a regex group name and return it.
pub fn capture_name(depth_key: &str) -> Result<&str, Error> {
    let mut chars = depth_key.chars();
    let valid = chars
        .next()
        .is_some_and(|c| c == '_' || c.is_ascii_alphabetic())
        && chars.all(|c| c == '_' || c.is_ascii_alphanumeric());

    if valid {
        Ok(depth_key)
    } else {
        Err(Error::invalid(format!(
            "depth key {depth_key:?} is not a valid capture name"
        )))
    }
}
