use std::fmt;

/// One dot-separated token of a nest position spec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathToken {
    /// `R`, the nest root itself.
    Root,
    /// `*`, any ordinal at this level.
    Any,
    /// A fixed ordinal, e.g. `2` for the third child.
    Index(u32),
}

impl PathToken {
    /// The regex atom this token stands for in a tree-position string.
    pub fn to_regex_atom(self) -> String {
        match self {
            PathToken::Root => "0".to_string(),
            PathToken::Any => "([0-9]+)".to_string(),
            PathToken::Index(n) => n.to_string(),
        }
    }
}

impl fmt::Display for PathToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathToken::Root => f.write_str("R"),
            PathToken::Any => f.write_str("*"),
            PathToken::Index(n) => write!(f, "{n}"),
        }
    }
}

/// A single `{path, max}` group.
///
/// `path` always starts with [`PathToken::Root`]; specs written without
/// it get it prepended while parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub path: Vec<PathToken>,
    pub max_children: u32,
}

impl Group {
    /// Anchored regex source matching the tree-position strings this
    /// group applies to.
    pub fn to_regex_source(&self) -> String {
        let atoms: Vec<String> = self.path.iter().map(|t| t.to_regex_atom()).collect();
        format!("^{}$", atoms.join(r"\."))
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path: Vec<String> = self.path.iter().map(|t| t.to_string()).collect();
        write!(f, "{{{},{}}}", path.join("."), self.max_children)
    }
}

/// A parsed nest rule string, groups in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NestSpec {
    pub groups: Vec<Group>,
}
