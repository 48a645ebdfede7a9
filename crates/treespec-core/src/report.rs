//! Per-path outcome of a tree walk.

use std::collections::BTreeMap;

use crate::error::Error;
use crate::spec::Tag;
use crate::validate::canon_path;
use crate::walk::WalkOutput;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Accepted(Tag),
    Rejected,
}

#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub code: &'static str, // e.g. "not_part_of_structure", "too_many_siblings"
    pub path: String,       // normalized relative path with '/'
    pub message: String,
}

impl Diagnostic {
    pub fn from_error(path: &str, err: &Error) -> Diagnostic {
        Diagnostic {
            code: err.code(),
            path: canon_path(path),
            message: err.to_string(),
        }
    }
}

#[derive(Debug, Default)]
pub struct Report {
    // keyed by normalized relative path ("app/src/main.rs", "app", ...)
    statuses: BTreeMap<String, Status>,
    diagnostics: Vec<Diagnostic>,
}

impl Report {
    pub fn from_walk_output(walk: &WalkOutput) -> Report {
        let mut report = Report::default();

        let accepted = walk
            .accepted_dirs
            .iter()
            .map(|(p, tag)| (p.as_str(), tag))
            .chain(walk.accepted_files.iter().map(|m| (m.path.as_str(), &m.tag)));
        for (path, tag) in accepted {
            report.set_status(path, Status::Accepted(tag.clone()));
        }

        for (path, err) in &walk.rejected {
            report.set_status(path, Status::Rejected);
            report.push_diagnostic(Diagnostic::from_error(path, err));
        }

        report
    }

    pub fn set_status(&mut self, path: impl AsRef<str>, status: Status) {
        self.statuses.insert(canon_path(path.as_ref()), status);
    }

    pub fn status_of(&self, path: impl AsRef<str>) -> Option<&Status> {
        self.statuses.get(&canon_path(path.as_ref()))
    }

    pub fn push_diagnostic(&mut self, d: Diagnostic) {
        self.diagnostics.push(d);
    }

    pub fn is_accepted(&self, path: &str) -> bool {
        matches!(self.status_of(path), Some(Status::Accepted(_)))
    }

    pub fn is_rejected(&self, path: &str) -> bool {
        matches!(self.status_of(path), Some(Status::Rejected))
    }

    pub fn tag_of(&self, path: &str) -> Option<&Tag> {
        match self.status_of(path) {
            Some(Status::Accepted(tag)) => Some(tag),
            _ => None,
        }
    }

    /// Accepted paths classified as `tag`, in path order.
    pub fn paths_tagged(&self, tag: &Tag) -> Vec<&str> {
        self.statuses
            .iter()
            .filter_map(|(p, s)| match s {
                Status::Accepted(t) if t == tag => Some(p.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn accepted_count(&self) -> usize {
        self.statuses
            .values()
            .filter(|s| matches!(s, Status::Accepted(_)))
            .count()
    }

    pub fn rejected_paths(&self) -> Vec<&str> {
        self.statuses
            .iter()
            .filter_map(|(p, s)| (*s == Status::Rejected).then_some(p.as_str()))
            .collect()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::FileMeta;

    #[test]
    fn builds_from_walk_output() {
        let walk = WalkOutput {
            accepted_dirs: vec![
                ("app".into(), Tag::Other("app".into())),
                ("app/Admin".into(), Tag::Controller),
            ],
            accepted_files: vec![FileMeta {
                path: "app/Admin/index.rs".into(),
                tag: Tag::Controller,
                node_name: "controller".into(),
                file_name: "index".into(),
                extension: "rs".into(),
            }],
            rejected: vec![(
                "app/tmp".into(),
                Error::NotPartOfStructure {
                    path: "app/tmp".into(),
                },
            )],
        };

        let report = Report::from_walk_output(&walk);
        assert_eq!(report.accepted_count(), 3);
        assert_eq!(report.rejected_paths(), vec!["app/tmp"]);
        assert_eq!(
            report.paths_tagged(&Tag::Controller),
            vec!["app/Admin", "app/Admin/index.rs"]
        );
        assert_eq!(report.diagnostics()[0].code, "not_part_of_structure");
    }

    #[test]
    fn lookups_normalize_paths() {
        let mut report = Report::default();
        report.set_status("./app/view/", Status::Accepted(Tag::View));

        assert!(report.is_accepted("app/view"));
        assert_eq!(report.tag_of(r"app\view"), Some(&Tag::View));
        assert!(!report.is_rejected("app/view"));
        assert_eq!(report.status_of("app/other"), None);
    }
}
