//! Sibling bookkeeping for restricted positions.
//!
//! Validation is not a pure function of one path: a `continue` position
//! caps how many *distinct* names have been seen so far, and a `nest`
//! position caps children per level of the sub-paths seen so far. The
//! [`SiblingTree`] remembers those names, one trie per depth key, in
//! insertion order.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use indexmap::IndexMap;
use tracing::debug;

use crate::error::Error;
use crate::validate::FileSystem;

#[derive(Debug, Clone, Default)]
pub struct SiblingNode {
    children: IndexMap<String, SiblingNode>,
}

impl SiblingNode {
    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Child names in the order they were first recorded.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.children.keys().map(String::as_str)
    }

    pub fn child(&self, name: &str) -> Option<&SiblingNode> {
        self.children.get(name)
    }
}

#[derive(Debug, Clone, Default)]
pub struct SiblingTree {
    roots: HashMap<String, SiblingNode>,
}

impl SiblingTree {
    /// Insert a segment chain below `key`.
    ///
    /// Returns the index of the first segment that did not exist before, or
    /// `None` when the whole chain was already known.
    pub fn record(&mut self, key: &str, segments: &[&str]) -> Option<usize> {
        let mut node = self.roots.entry(key.to_string()).or_default();
        let mut first_new = None;

        for (i, seg) in segments.iter().enumerate() {
            if first_new.is_none() && !node.children.contains_key(*seg) {
                first_new = Some(i);
            }
            node = node.children.entry(seg.to_string()).or_default();
        }

        first_new
    }

    /// Remove the last segment of `segments` (and everything below it).
    pub fn remove<S: AsRef<str>>(&mut self, key: &str, segments: &[S]) {
        let Some((last, parents)) = segments.split_last() else {
            return;
        };
        let Some(mut node) = self.roots.get_mut(key) else {
            return;
        };
        for seg in parents {
            match node.children.get_mut(seg.as_ref()) {
                Some(next) => node = next,
                None => return,
            }
        }
        node.children.shift_remove(last.as_ref());
    }

    pub fn node(&self, key: &str, segments: &[&str]) -> Option<&SiblingNode> {
        let mut node = self.roots.get(key)?;
        for seg in segments {
            node = node.child(seg)?;
        }
        Some(node)
    }

    /// Tree-position string of the node at `segments`: `"0"` for the root
    /// of `key`, then the insertion index of each segment among its
    /// siblings, joined by `.`.
    pub fn position(&self, key: &str, segments: &[&str]) -> Option<String> {
        let mut node = self.roots.get(key)?;
        let mut position = String::from("0");

        for seg in segments {
            let (idx, _, next) = node.children.get_full(*seg)?;
            position.push('.');
            position.push_str(&idx.to_string());
            node = next;
        }

        Some(position)
    }

    pub fn clear(&mut self) {
        self.roots.clear();
    }
}

/// Child names still waiting to be confirmed, per depth key.
///
/// A key's entry is dropped the first time all its children are found;
/// later directories at the same key are not checked again.
#[derive(Debug, Clone, Default)]
pub struct ChildRequirements {
    pending: BTreeMap<String, Vec<String>>,
}

impl ChildRequirements {
    pub fn new(pending: BTreeMap<String, Vec<String>>) -> ChildRequirements {
        ChildRequirements { pending }
    }

    pub fn pending(&self, key: &str) -> Option<&[String]> {
        self.pending.get(key).map(Vec::as_slice)
    }

    pub fn check<F: FileSystem + ?Sized>(
        &mut self,
        key: &str,
        path: &str,
        resolved: &Path,
        allow_skip: bool,
        fs: &F,
    ) -> Result<(), Error> {
        if allow_skip {
            return Ok(());
        }
        let Some(names) = self.pending.get(key) else {
            return Ok(());
        };

        if let Some(missing) = names.iter().find(|name| !fs.exists(&resolved.join(name))) {
            return Err(Error::MissingRequiredChild {
                path: path.to_string(),
                name: missing.clone(),
            });
        }

        debug!(key, path, "required children present");
        self.pending.remove(key);
        Ok(())
    }
}
