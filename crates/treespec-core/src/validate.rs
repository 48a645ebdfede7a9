//! Path validation against a compiled [`StructureDefinition`].
//!
//! A [`ValidationSession`] borrows the immutable definition and owns every
//! piece of state that changes while paths are checked: the sibling tree,
//! the child requirements still pending, and the index of known
//! controller/entity directories. Create one session per validation pass
//! (application bootstrap, one scaffolding command, ...); state from one
//! pass never leaks into another unless the same session is reused.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, trace};
use treespec_nest::{NestRule, limit_for};

use crate::error::Error;
use crate::sibling::{ChildRequirements, SiblingNode, SiblingTree};
use crate::spec::{FileMeta, RestrictionRule, StructureDefinition, Tag};

/// Existence check used for child requirements.
pub trait FileSystem {
    fn exists(&self, path: &Path) -> bool;
}

/// The real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiskFs;

impl FileSystem for DiskFs {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}

impl<F> FileSystem for F
where
    F: Fn(&Path) -> bool,
{
    fn exists(&self, path: &Path) -> bool {
        self(path)
    }
}

/// Receives every accepted path owned by a `view` node.
pub trait ViewRegistry {
    fn register_view(&mut self, path: &str);
}

impl ViewRegistry for Vec<String> {
    fn register_view(&mut self, path: &str) {
        self.push(path.to_string());
    }
}

/// Directories accepted so far for the tags scaffolding cares about.
#[derive(Debug, Clone, Default)]
pub struct KnownDirectories {
    by_tag: BTreeMap<Tag, Vec<String>>,
}

impl KnownDirectories {
    pub const TRACKED: [Tag; 2] = [Tag::Controller, Tag::Entity];

    fn record(&mut self, tag: &Tag, path: &str) {
        let paths = self.by_tag.entry(tag.clone()).or_default();
        if !paths.iter().any(|p| p == path) {
            paths.push(path.to_string());
        }
    }

    /// Relative paths recorded for `tag`, in acceptance order.
    pub fn paths(&self, tag: &Tag) -> &[String] {
        self.by_tag
            .get(tag)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

impl StructureDefinition {
    /// Start a fresh validation pass for an application living in `base`.
    pub fn session(&self, base: impl Into<PathBuf>) -> ValidationSession<'_> {
        ValidationSession::new(self, base)
    }
}

pub struct ValidationSession<'d, F = DiskFs, V = Vec<String>> {
    definition: &'d StructureDefinition,
    base: PathBuf,
    siblings: SiblingTree,
    requirements: ChildRequirements,
    known: KnownDirectories,
    skip_child_requirements: bool,
    fs: F,
    views: V,
}

impl<'d> ValidationSession<'d> {
    pub fn new(definition: &'d StructureDefinition, base: impl Into<PathBuf>) -> Self {
        ValidationSession {
            definition,
            base: base.into(),
            siblings: SiblingTree::default(),
            requirements: ChildRequirements::new(definition.requirements.clone()),
            known: KnownDirectories::default(),
            skip_child_requirements: false,
            fs: DiskFs,
            views: Vec::new(),
        }
    }
}

impl<'d, F: FileSystem, V: ViewRegistry> ValidationSession<'d, F, V> {
    pub fn with_filesystem<G: FileSystem>(self, fs: G) -> ValidationSession<'d, G, V> {
        ValidationSession {
            definition: self.definition,
            base: self.base,
            siblings: self.siblings,
            requirements: self.requirements,
            known: self.known,
            skip_child_requirements: self.skip_child_requirements,
            fs,
            views: self.views,
        }
    }

    pub fn with_view_registry<W: ViewRegistry>(self, views: W) -> ValidationSession<'d, F, W> {
        ValidationSession {
            definition: self.definition,
            base: self.base,
            siblings: self.siblings,
            requirements: self.requirements,
            known: self.known,
            skip_child_requirements: self.skip_child_requirements,
            fs: self.fs,
            views,
        }
    }

    /// Skip child-requirement checks, e.g. while scaffolding a directory
    /// whose required children do not exist yet.
    pub fn skip_child_requirements(mut self, skip: bool) -> Self {
        self.skip_child_requirements = skip;
        self
    }

    pub fn definition(&self) -> &'d StructureDefinition {
        self.definition
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    pub fn view_registry(&self) -> &V {
        &self.views
    }

    pub fn siblings(&self) -> &SiblingTree {
        &self.siblings
    }

    pub fn known_directories(&self) -> &KnownDirectories {
        &self.known
    }

    /// Directories of `tag` accepted in this session, resolved against the
    /// session base.
    pub fn directories_of(&self, tag: &Tag) -> Vec<PathBuf> {
        self.known
            .paths(tag)
            .iter()
            .map(|p| self.base.join(p))
            .collect()
    }

    /// Forget everything this session has seen: recorded siblings, satisfied
    /// requirements and known directories. The view registry is left alone.
    pub fn reset(&mut self) {
        self.siblings.clear();
        self.requirements = ChildRequirements::new(self.definition.requirements.clone());
        self.known = KnownDirectories::default();
    }

    /// Normalized `/`-joined key of `path`, relative to the session base.
    pub fn relative_key(&self, path: &Path) -> String {
        let rel = path.strip_prefix(&self.base).unwrap_or(path);
        canon_path(&rel.to_string_lossy())
    }

    /// Check that `path` is a directory the structure allows, and classify it.
    ///
    /// A rejected directory leaves no trace: every sibling record made while
    /// checking it is undone before the error is returned.
    pub fn validate_directory(&mut self, path: impl AsRef<Path>) -> Result<Tag, Error> {
        let rel = self.checked_key(path.as_ref())?;
        let def = self.definition;

        let matched = def.nodes.iter().find_map(|node| {
            trace!(path = %rel, pattern = node.pattern.as_str(), "trying node pattern");
            node.pattern.captures(&rel).map(|caps| (node, caps))
        });
        let Some((node, caps)) = matched else {
            return Err(Error::NotPartOfStructure { path: rel.clone() });
        };

        let captured: Vec<(&str, &str)> = node
            .pattern
            .capture_names()
            .flatten()
            .filter_map(|name| caps.name(name).map(|m| (name, m.as_str())))
            .filter(|(_, value)| !value.is_empty())
            .collect();

        let mut recorded = Vec::new();
        let checked = self.apply_restrictions(&rel, &captured, &mut recorded).and_then(|()| {
            let resolved = self.base.join(&rel);
            self.requirements.check(
                &node.depth_key,
                &rel,
                &resolved,
                self.skip_child_requirements,
                &self.fs,
            )
        });

        if let Err(e) = checked {
            for (key, segments) in recorded.iter().rev() {
                self.siblings.remove(key, segments.as_slice());
            }
            debug!(path = %rel, error = %e, undone = recorded.len(), "directory rejected");
            return Err(e);
        }

        let tag = node.special_tag.clone();
        if tag == Tag::View {
            self.views.register_view(&rel);
        }
        if KnownDirectories::TRACKED.contains(&tag) {
            self.known.record(&tag, &rel);
        }

        debug!(path = %rel, %tag, key = %node.depth_key, "directory accepted");
        Ok(tag)
    }

    /// Check that `path` is a file inside a directory that may hold files.
    ///
    /// Files carry no restrictions; the first matching file pattern wins.
    pub fn validate_file(&mut self, path: impl AsRef<Path>) -> Result<FileMeta, Error> {
        let rel = self.checked_key(path.as_ref())?;
        let def = self.definition;

        for fp in &def.files {
            let Some(caps) = fp.pattern.captures(&rel) else {
                continue;
            };

            let meta = FileMeta {
                path: rel.clone(),
                tag: fp.tag.clone(),
                node_name: fp.node_name.clone(),
                file_name: caps.name("file_name").map_or("", |m| m.as_str()).to_string(),
                extension: caps.name("file_ext").map_or("", |m| m.as_str()).to_string(),
            };

            if meta.tag == Tag::View {
                self.views.register_view(&rel);
            }
            debug!(path = %rel, tag = %meta.tag, "file accepted");
            return Ok(meta);
        }

        Err(Error::NotPartOfStructure { path: rel })
    }

    /// Relative key of `path`; a `..` component never names a place inside
    /// the structure.
    fn checked_key(&self, path: &Path) -> Result<String, Error> {
        let rel = self.relative_key(path);
        if rel.split('/').any(|c| c == "..") {
            return Err(Error::NotPartOfStructure { path: rel });
        }
        Ok(rel)
    }

    /// Apply the restriction of every captured depth key, pushing each new
    /// sibling record onto `recorded` so the caller can undo it.
    fn apply_restrictions(
        &mut self,
        path: &str,
        captured: &[(&str, &str)],
        recorded: &mut Vec<(String, Vec<String>)>,
    ) -> Result<(), Error> {
        let def = self.definition;
        for &(key, value) in captured {
            match def.restrictions.get(key) {
                None => {}
                Some(RestrictionRule::Continue { limit }) => {
                    self.apply_continue(key, value, *limit, recorded)?;
                }
                Some(RestrictionRule::Nest { rules }) => {
                    self.apply_nest(path, key, value, rules, recorded)?;
                }
            }
        }
        Ok(())
    }

    fn apply_continue(
        &mut self,
        key: &str,
        value: &str,
        limit: u32,
        recorded: &mut Vec<(String, Vec<String>)>,
    ) -> Result<(), Error> {
        let name = value.trim_matches('/');
        if self.siblings.record(key, &[name]).is_some() {
            recorded.push((key.to_string(), vec![name.to_string()]));
        }

        let Some(root) = self.siblings.node(key, &[]) else {
            return Ok(());
        };
        if root.len() <= limit as usize {
            return Ok(());
        }

        Err(Error::TooManySiblings {
            key: key.to_string(),
            limit,
            actual_names: root.names().map(String::from).collect(),
        })
    }

    fn apply_nest(
        &mut self,
        path: &str,
        key: &str,
        value: &str,
        rules: &[NestRule],
        recorded: &mut Vec<(String, Vec<String>)>,
    ) -> Result<(), Error> {
        let segments: Vec<&str> = value.split('/').filter(|s| !s.is_empty()).collect();
        let Some((_, parents)) = segments.split_last() else {
            return Ok(());
        };

        if let Some(first_new) = self.siblings.record(key, &segments) {
            let created = segments[..=first_new].iter().map(|s| s.to_string()).collect();
            recorded.push((key.to_string(), created));
        }
        self.check_nest(path, key, parents, rules)
    }

    fn check_nest(
        &self,
        path: &str,
        key: &str,
        parents: &[&str],
        rules: &[NestRule],
    ) -> Result<(), Error> {
        let position = self
            .siblings
            .position(key, parents)
            .unwrap_or_else(|| "0".to_string());

        let Some(limit) = limit_for(rules, &position) else {
            return Err(Error::ChildNotAllowed {
                path: path.to_string(),
                position,
            });
        };

        let children = self
            .siblings
            .node(key, parents)
            .map_or(0, SiblingNode::len);
        trace!(path, position, children, limit, "nest check");

        if children > limit as usize {
            return Err(Error::TooManyChildren {
                path: path.to_string(),
                limit,
            });
        }
        Ok(())
    }
}

/// Normalize a path string to a `/`-joined relative key: backslashes become
/// `/`, empty and `.` components are dropped.
pub fn canon_path(s: &str) -> String {
    s.trim()
        .replace('\\', "/")
        .split('/')
        .filter(|c| !c.is_empty() && *c != ".")
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::Settings;

    #[test]
    fn canon_path_strips_noise() {
        assert_eq!(canon_path("./app/src/"), "app/src");
        assert_eq!(canon_path("/app//src"), "app/src");
        assert_eq!(canon_path(r"app\src\models"), "app/src/models");
        assert_eq!(canon_path("."), "");
    }

    #[test]
    fn relative_key_strips_base() {
        let def = StructureDefinition::compile("<app><lib/></app>", &Settings::default()).unwrap();
        let session = def.session("/srv/site");

        assert_eq!(session.relative_key(Path::new("/srv/site/app/lib")), "app/lib");
        assert_eq!(session.relative_key(Path::new("app/lib")), "app/lib");
    }

    #[test]
    fn validates_absolute_paths_under_base() {
        let def = StructureDefinition::compile("<app><lib/></app>", &Settings::default()).unwrap();
        let mut session = def.session("/srv/site");

        let tag = session.validate_directory("/srv/site/app/lib").unwrap();
        assert_eq!(tag, Tag::Other("lib".into()));
    }

    #[test]
    fn reset_forgets_siblings() {
        let def = StructureDefinition::compile(
            r#"<app><module continue="2"/></app>"#,
            &Settings::default(),
        )
        .unwrap();
        let mut session = def.session("/srv/site");

        session.validate_directory("app/a").unwrap();
        session.validate_directory("app/b").unwrap();
        assert!(session.validate_directory("app/c").is_err());

        session.reset();
        session.validate_directory("app/c").unwrap();
        session.validate_directory("app/d").unwrap();
    }
}
