use std::fs;
use std::io;
use std::path::PathBuf;

use tracing::{debug, trace};

use crate::error::Error;
use crate::spec::{FileMeta, Tag};
use crate::validate::{FileSystem, ValidationSession, ViewRegistry};

#[derive(Debug, Default)]
pub struct WalkOutput {
    pub accepted_dirs: Vec<(String, Tag)>,
    pub accepted_files: Vec<FileMeta>,
    /// Rejected paths with the reason. Rejected directories are not entered.
    pub rejected: Vec<(String, Error)>,
}

/// Per-directory traversal context.
#[derive(Debug)]
struct WalkCtx {
    /// Current directory relative to the session base.
    rel: PathBuf,

    /// Depth below the application root.
    depth: usize,

    output: WalkOutput,
}

/// Validate the application tree `<base>/<root_name>` on disk.
///
/// Directories are validated before their contents and siblings are
/// visited in name order, so restriction counts are deterministic.
pub fn walk_tree<F: FileSystem, V: ViewRegistry>(
    session: &mut ValidationSession<'_, F, V>,
) -> Result<WalkOutput, Error> {
    let root_name = session.definition().root_name().to_string();
    let root_abs = session.base().join(&root_name);

    if !root_abs.is_dir() {
        return Err(Error::Io {
            path: root_abs,
            source: io::Error::new(io::ErrorKind::NotFound, "application root not found"),
        });
    }

    let mut ctx = WalkCtx {
        rel: PathBuf::from(&root_name),
        depth: 0,
        output: WalkOutput::default(),
    };

    debug!(root = %root_abs.display(), "walk: start");
    if visit_dir(&mut ctx, session)? {
        walk_dir(&mut ctx, session)?;
    }

    Ok(ctx.output)
}

/// Validate the directory at `ctx.rel`; true when it may be entered.
fn visit_dir<F: FileSystem, V: ViewRegistry>(
    ctx: &mut WalkCtx,
    session: &mut ValidationSession<'_, F, V>,
) -> Result<bool, Error> {
    let key = session.relative_key(&ctx.rel);
    match session.validate_directory(&ctx.rel) {
        Ok(tag) => {
            ctx.output.accepted_dirs.push((key, tag));
            Ok(true)
        }
        Err(e) if e.is_validation() => {
            debug!(path = %key, error = %e, "directory rejected");
            ctx.output.rejected.push((key, e));
            Ok(false)
        }
        Err(e) => Err(e),
    }
}

fn walk_dir<F: FileSystem, V: ViewRegistry>(
    ctx: &mut WalkCtx,
    session: &mut ValidationSession<'_, F, V>,
) -> Result<(), Error> {
    let abs = session.base().join(&ctx.rel);
    trace!(depth = ctx.depth, path = %ctx.rel.display(), "walk: enter");

    let rd = fs::read_dir(&abs).map_err(|e| Error::Io {
        path: abs.clone(),
        source: e,
    })?;

    let mut entries: Vec<fs::DirEntry> = Vec::new();
    for ent in rd {
        let ent = ent.map_err(|e| Error::Io {
            path: abs.clone(),
            source: e,
        })?;
        entries.push(ent);
    }
    entries.sort_by_key(|e| e.file_name());

    for ent in entries {
        let name = ent.file_name();
        let name = name.to_string_lossy();

        let ty = ent.file_type().map_err(|e| Error::Io {
            path: ent.path(),
            source: e,
        })?;

        if ty.is_dir() {
            let saved_rel = ctx.rel.clone();
            ctx.rel.push(&*name);
            ctx.depth += 1;

            if visit_dir(ctx, session)? {
                walk_dir(ctx, session)?;
            }

            ctx.rel = saved_rel;
            ctx.depth -= 1;
        } else if ty.is_file() {
            let rel_path = ctx.rel.join(&*name);
            match session.validate_file(&rel_path) {
                Ok(meta) => ctx.output.accepted_files.push(meta),
                Err(e) if e.is_validation() => {
                    let key = session.relative_key(&rel_path);
                    debug!(path = %key, error = %e, "file rejected");
                    ctx.output.rejected.push((key, e));
                }
                Err(e) => return Err(e),
            }
        } else {
            // symlink / fifo / socket
            trace!(path = %ctx.rel.join(&*name).display(), "walk: skipping special entry");
        }
    }

    trace!(depth = ctx.depth, path = %ctx.rel.display(), "walk: exit");
    Ok(())
}
