use std::path::PathBuf;

use crate::args::OutputFormat;
use serde::Serialize;
use treespec_core::{Report, Tag};

// The core report types stay serde-free; these mirror what the JSON output
// promises.
#[derive(Serialize)]
struct JsonOut<'a> {
    ok: bool,
    rejected: Vec<&'a str>,
    diagnostics: Vec<JsonDiag<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    listed: Option<JsonListed>,
    summary: JsonSummary,
}

#[derive(Serialize)]
struct JsonDiag<'a> {
    code: &'a str,
    path: &'a str,
    message: &'a str,
}

#[derive(Serialize)]
struct JsonListed {
    tag: String,
    directories: Vec<String>,
}

#[derive(Serialize)]
struct JsonSummary {
    accepted_count: usize,
    rejected_count: usize,
}

pub type Listed = (Tag, Vec<PathBuf>);

pub fn render_json(report: &Report, listed: Option<&Listed>) -> String {
    let rejected = report.rejected_paths();

    let out = JsonOut {
        ok: rejected.is_empty(),
        diagnostics: report
            .diagnostics()
            .iter()
            .map(|d| JsonDiag {
                code: d.code,
                path: d.path.as_str(),
                message: d.message.as_str(),
            })
            .collect(),
        listed: listed.map(|(tag, dirs)| JsonListed {
            tag: tag.to_string(),
            directories: dirs.iter().map(|d| d.display().to_string()).collect(),
        }),
        summary: JsonSummary {
            accepted_count: report.accepted_count(),
            rejected_count: rejected.len(),
        },
        rejected,
    };

    let mut s =
        serde_json::to_string_pretty(&out).unwrap_or_else(|_| "{\"ok\":false}".to_string());
    s.push('\n');
    s
}

pub fn render_human(
    report: &Report,
    listed: Option<&Listed>,
    verbosity: u8,
    quiet: bool,
) -> String {
    let mut out = String::new();
    let rejected = report.rejected_paths();

    if quiet {
        for p in rejected {
            out.push_str(p);
            out.push('\n');
        }
        return out;
    }

    if rejected.is_empty() {
        out.push_str("OK: every path is part of the structure\n");
    }
    for d in report.diagnostics() {
        out.push_str(&format!("REJECTED [{}] {}\n", d.code, d.message));
    }

    if let Some((tag, dirs)) = listed {
        out.push_str(&format!("{tag} directories:\n"));
        for d in dirs {
            out.push_str(&format!("  {}\n", d.display()));
        }
    }

    if verbosity > 0 {
        out.push_str(&format!(
            "summary: accepted={} rejected={}\n",
            report.accepted_count(),
            rejected.len()
        ));
    }

    out
}

pub fn render(
    report: &Report,
    listed: Option<&Listed>,
    format: OutputFormat,
    verbosity: u8,
    quiet: bool,
) -> String {
    match format {
        OutputFormat::Human => render_human(report, listed, verbosity, quiet),
        OutputFormat::Json => render_json(report, listed),
    }
}
