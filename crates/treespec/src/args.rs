use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use treespec_core::Tag;

/// treespec: validate an application tree against a structure definition.
#[derive(Debug, Parser)]
#[command(name = "treespec")]
#[command(about = "Validate an application tree against a structure definition", long_about = None)]
pub struct Cli {
    /// Directory holding the application root (defaults to current directory)
    pub path: Option<PathBuf>,

    /// Explicit base directory (overrides PATH if provided)
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Structure definition file (defaults to PATH/structure.xml)
    #[arg(long)]
    pub definition: Option<PathBuf>,

    /// Supported source-file extension; repeat to allow several
    #[arg(long = "ext", value_name = "EXT")]
    pub extensions: Vec<String>,

    /// Directory name the root element may not use; repeat to add several
    #[arg(long = "reserved", value_name = "NAME")]
    pub reserved: Vec<String>,

    /// Do not check required children (scaffolding mode)
    #[arg(long)]
    pub skip_requirements: bool,

    /// After validating, list the accepted directories of this kind
    #[arg(long, value_enum, value_name = "TAG")]
    pub list: Option<ListTag>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,

    /// Quiet output (print only rejected paths)
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Verbosity (-v, -vv)
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    pub verbosity: u8,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ListTag {
    Controller,
    Entity,
}

impl ListTag {
    pub fn tag(self) -> Tag {
        match self {
            ListTag::Controller => Tag::Controller,
            ListTag::Entity => Tag::Entity,
        }
    }
}
