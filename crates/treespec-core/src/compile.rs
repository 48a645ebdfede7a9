//! Turns the markup event stream into a [`StructureDefinition`].

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use regex::Regex;
use tracing::debug;

use crate::attribute::{ElementAttributes, build_fragment, depth_key};
use crate::error::Error;
use crate::markup::{Attributes, MarkupEvent, read_events};
use crate::spec::{FilePattern, NodePattern, Settings, StructureDefinition, Tag};

impl StructureDefinition {
    /// Compile a structure-definition document.
    pub fn compile(src: &str, settings: &Settings) -> Result<StructureDefinition, Error> {
        let events = read_events(src)?;
        compile_events(&events, settings)
    }

    /// Read and compile a structure-definition document from disk.
    pub fn load(path: &Path, settings: &Settings) -> Result<StructureDefinition, Error> {
        let src = fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        StructureDefinition::compile(&src, settings)
    }
}

/// Where the walk currently is.
struct Frame {
    depth: usize,
    key: String,
    /// Regex source for the path up to and including this element.
    prefix: String,
    /// Nearest special tag on the way down, this element included.
    special: Option<Tag>,
    /// This element is itself a `view` element.
    is_view: bool,
}

struct Compiler<'e> {
    events: &'e [MarkupEvent],
    pos: usize,
    file_suffix: String,
    def: StructureDefinition,
}

/// Compile an already-read event stream.
///
/// The stream is consumed exactly once, depth first. The first element
/// names the application root; every element below it becomes a directory
/// pattern, and empty elements (or ones marked `root`) also accept files.
pub fn compile_events(
    events: &[MarkupEvent],
    settings: &Settings,
) -> Result<StructureDefinition, Error> {
    let file_suffix = file_suffix(&settings.extensions)?;

    let Some(MarkupEvent::Enter {
        name,
        attributes,
        is_empty,
    }) = events.first()
    else {
        return Err(Error::invalid("definition has no root element"));
    };

    check_root_name(name, settings)?;

    let mut compiler = Compiler {
        events,
        pos: 1,
        file_suffix,
        def: StructureDefinition {
            root_name: name.clone(),
            nodes: Vec::new(),
            files: Vec::new(),
            restrictions: HashMap::new(),
            requirements: BTreeMap::new(),
            extensions: settings.extensions.clone(),
            views: Vec::new(),
        },
    };

    compiler.compile_root(name, attributes, *is_empty)?;

    if compiler.pos < events.len() {
        return Err(Error::invalid("definition has more than one top-level element"));
    }

    debug!(
        root = %compiler.def.root_name,
        nodes = compiler.def.nodes.len(),
        files = compiler.def.files.len(),
        restrictions = compiler.def.restrictions.len(),
        "compiled structure definition"
    );

    Ok(compiler.def)
}

fn check_root_name(name: &str, settings: &Settings) -> Result<(), Error> {
    let reserved = Tag::special(name).is_some()
        || settings
            .reserved_names
            .iter()
            .any(|r| r.eq_ignore_ascii_case(name));

    if reserved {
        return Err(Error::invalid(format!(
            "root element <{name}> uses a reserved directory name"
        )));
    }
    Ok(())
}

fn file_suffix(extensions: &[String]) -> Result<String, Error> {
    if extensions.is_empty() {
        return Err(Error::invalid("no supported file extensions configured"));
    }

    let mut alts = Vec::with_capacity(extensions.len());
    for ext in extensions {
        let ext = ext.trim_start_matches('.');
        if ext.is_empty() || ext.contains('/') {
            return Err(Error::invalid(format!("unusable file extension {ext:?}")));
        }
        alts.push(regex::escape(ext));
    }

    Ok(format!(
        r"/(?P<file_name>[^/]+?)\.(?P<file_ext>{})",
        alts.join("|")
    ))
}

impl Compiler<'_> {
    fn compile_root(
        &mut self,
        name: &str,
        attributes: &Attributes,
        is_empty: bool,
    ) -> Result<(), Error> {
        let attrs = ElementAttributes::resolve(name, attributes)?;
        if attrs.continue_limit.is_some() || attrs.nest.is_some() || attrs.require {
            return Err(Error::invalid(format!(
                "root element <{name}> may only carry `root`"
            )));
        }

        let frame = Frame {
            depth: 0,
            key: depth_key("", 0, 0),
            prefix: regex::escape(name),
            special: None,
            is_view: false,
        };
        let tag = Tag::Other(name.to_string());

        self.push_node(&frame.prefix, &tag, &frame.key, name)?;
        if is_empty || attrs.root {
            self.push_files(&frame.prefix, &tag, &frame.key, name)?;
        }

        if !is_empty {
            self.ensure_not_blank(name)?;
            self.compile_children(&frame)?;
        }
        Ok(())
    }

    fn compile_children(&mut self, parent: &Frame) -> Result<(), Error> {
        let events = self.events;
        let mut child = 0;

        loop {
            match events.get(self.pos) {
                None => return Err(Error::invalid("element is never closed")),
                Some(MarkupEvent::Leave) => {
                    self.pos += 1;
                    return Ok(());
                }
                Some(MarkupEvent::Enter {
                    name,
                    attributes,
                    is_empty,
                }) => {
                    self.pos += 1;
                    self.compile_element(parent, child, name, attributes, *is_empty)?;
                    child += 1;
                }
            }
        }
    }

    fn compile_element(
        &mut self,
        parent: &Frame,
        child: usize,
        name: &str,
        attributes: &Attributes,
        is_empty: bool,
    ) -> Result<(), Error> {
        let depth = parent.depth + 1;
        let key = depth_key(&parent.key, depth, child);
        let own_special = Tag::special(name);

        if let (Some(inner), Some(outer)) = (&own_special, &parent.special) {
            return Err(Error::invalid(format!(
                "<{name}> ({inner}) is nested inside a {outer} directory"
            )));
        }

        if parent.is_view {
            self.def.views.push(name.to_string());
        }

        let attrs = ElementAttributes::resolve(name, attributes)?;
        let fragment = build_fragment(name, &attrs, &key)?;

        if let Some(rule) = fragment.restriction {
            debug!(key = %key, element = name, ?rule, "restriction");
            self.def.restrictions.insert(key.clone(), rule);
        }
        if attrs.require {
            self.def
                .requirements
                .entry(parent.key.clone())
                .or_default()
                .push(name.to_string());
        }

        let special = own_special.clone().or_else(|| parent.special.clone());
        let tag = special
            .clone()
            .unwrap_or_else(|| Tag::Other(name.to_string()));
        let prefix = format!("{}/{}", parent.prefix, fragment.regex);

        if !is_empty {
            self.ensure_not_blank(name)?;
        }

        self.push_node(&prefix, &tag, &key, name)?;
        if is_empty || attrs.root {
            self.push_files(&prefix, &tag, &key, name)?;
        }

        if !is_empty {
            let frame = Frame {
                depth,
                key,
                prefix,
                special,
                is_view: own_special == Some(Tag::View),
            };
            self.compile_children(&frame)?;
        }
        Ok(())
    }

    /// An element that holds files must be declared empty (`<a/>`), not
    /// written as `<a></a>`.
    fn ensure_not_blank(&self, name: &str) -> Result<(), Error> {
        if matches!(self.events.get(self.pos), Some(MarkupEvent::Leave)) {
            return Err(Error::invalid(format!(
                "element <{name}> has no children; declare it empty (<{name}/>) to hold files"
            )));
        }
        Ok(())
    }

    fn push_node(&mut self, prefix: &str, tag: &Tag, key: &str, name: &str) -> Result<(), Error> {
        let pattern = anchored(prefix, name)?;
        debug!(key, %tag, pattern = pattern.as_str(), "node pattern");

        self.def.nodes.push(NodePattern {
            pattern,
            special_tag: tag.clone(),
            depth_key: key.to_string(),
            name: name.to_string(),
        });
        Ok(())
    }

    fn push_files(&mut self, prefix: &str, tag: &Tag, key: &str, name: &str) -> Result<(), Error> {
        let pattern = anchored(&format!("{prefix}{}", self.file_suffix), name)?;
        debug!(key, %tag, pattern = pattern.as_str(), "file pattern");

        self.def.files.push(FilePattern {
            pattern,
            tag: tag.clone(),
            node_name: name.to_string(),
            depth_key: key.to_string(),
        });
        Ok(())
    }
}

fn anchored(source: &str, name: &str) -> Result<Regex, Error> {
    Regex::new(&format!("^{source}$")).map_err(|e| {
        Error::invalid(format!("element <{name}> compiled to an invalid pattern: {e}"))
    })
}
