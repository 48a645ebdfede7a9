mod args;
mod render;

use crate::args::Cli;
use clap::Parser;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use treespec_core::{
    DEFAULT_DEFINITION_FILE, Error, Report, Settings, StructureDefinition, walk_tree,
};

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbosity);

    match run(&cli) {
        Ok(report) if report.rejected_paths().is_empty() => ExitCode::from(0),
        Ok(_) => ExitCode::from(1),
        Err(e) => {
            eprintln!("treespec: {e}");
            ExitCode::from(2)
        }
    }
}

fn run(cli: &Cli) -> Result<Report, Error> {
    let base = resolve_base(cli);
    let settings = settings(cli);

    let definition_path = cli
        .definition
        .clone()
        .unwrap_or_else(|| base.join(DEFAULT_DEFINITION_FILE));
    debug!(definition = %definition_path.display(), base = %base.display(), "loading");

    let definition = StructureDefinition::load(&definition_path, &settings)?;
    let mut session = definition
        .session(&base)
        .skip_child_requirements(cli.skip_requirements);

    let walk = walk_tree(&mut session)?;
    let report = Report::from_walk_output(&walk);

    let listed = cli.list.map(|tag| {
        let tag = tag.tag();
        let dirs = session.directories_of(&tag);
        (tag, dirs)
    });

    let out = render::render(&report, listed.as_ref(), cli.format, cli.verbosity, cli.quiet);
    print!("{out}");

    Ok(report)
}

/// `RUST_LOG` wins; otherwise `-v` enables debug and `-vv` trace output.
fn init_tracing(verbosity: u8) {
    let default = match verbosity {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with_writer(std::io::stderr)
        .init();
}

fn settings(cli: &Cli) -> Settings {
    let mut settings = Settings::default();
    if !cli.extensions.is_empty() {
        settings.extensions = cli.extensions.clone();
    }
    settings.reserved_names.extend(cli.reserved.iter().cloned());
    settings
}

fn resolve_base(cli: &Cli) -> PathBuf {
    // --root, then PATH, then "."
    if let Some(r) = &cli.root {
        return r.clone();
    }
    if let Some(p) = &cli.path {
        return p.clone();
    }
    Path::new(".").to_path_buf()
}
