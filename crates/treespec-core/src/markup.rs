//! The markup stream a structure definition is compiled from.
//!
//! Only the element skeleton matters: which element is entered, with which
//! attributes, whether it is declared empty, and where it ends. Text,
//! comments and declarations are dropped.

use std::collections::BTreeMap;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::error::Error;

pub type Attributes = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkupEvent {
    /// An element starts. Empty elements (`<a/>`) are never followed by a
    /// matching [`MarkupEvent::Leave`].
    Enter {
        name: String,
        attributes: Attributes,
        is_empty: bool,
    },
    Leave,
}

impl MarkupEvent {
    pub fn enter(name: &str, attributes: &[(&str, &str)], is_empty: bool) -> MarkupEvent {
        MarkupEvent::Enter {
            name: name.to_string(),
            attributes: attributes
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            is_empty,
        }
    }
}

/// Read a structure-definition document into its event sequence.
pub fn read_events(src: &str) -> Result<Vec<MarkupEvent>, Error> {
    let mut reader = Reader::from_str(src);
    reader.config_mut().trim_text(true);

    let mut events = Vec::new();
    let mut open = 0usize;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                open += 1;
                events.push(enter(&reader, &e, false)?);
            }
            Ok(Event::Empty(e)) => events.push(enter(&reader, &e, true)?),
            Ok(Event::End(_)) => {
                open = open.saturating_sub(1);
                events.push(MarkupEvent::Leave);
            }
            Ok(Event::Eof) => break,
            // text, comments, CDATA, declarations, processing instructions
            Ok(_) => {}
            Err(e) => {
                return Err(Error::Markup {
                    position: reader.error_position() as u64,
                    msg: e.to_string(),
                });
            }
        }
    }

    if open > 0 {
        return Err(Error::Markup {
            position: reader.buffer_position() as u64,
            msg: format!("{open} element(s) left unclosed"),
        });
    }

    Ok(events)
}

fn enter(reader: &Reader<&[u8]>, e: &BytesStart<'_>, is_empty: bool) -> Result<MarkupEvent, Error> {
    let markup_err = |msg: String| Error::Markup {
        position: reader.buffer_position() as u64,
        msg,
    };

    let name = std::str::from_utf8(e.name().as_ref())
        .map_err(|err| markup_err(format!("element name is not UTF-8: {err}")))?
        .to_string();

    let mut attributes = Attributes::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|err| markup_err(err.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|err| markup_err(err.to_string()))?
            .into_owned();
        attributes.insert(key, value);
    }

    Ok(MarkupEvent::Enter {
        name,
        attributes,
        is_empty,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_nested_and_empty_elements() {
        let events = read_events(
            r#"<?xml version="1.0"?>
            <!-- application layout -->
            <app>
                <view/>
                <controller continue="3">
                    <actions require="1"/>
                </controller>
            </app>"#,
        )
        .unwrap();

        assert_eq!(
            events,
            vec![
                MarkupEvent::enter("app", &[], false),
                MarkupEvent::enter("view", &[], true),
                MarkupEvent::enter("controller", &[("continue", "3")], false),
                MarkupEvent::enter("actions", &[("require", "1")], true),
                MarkupEvent::Leave,
                MarkupEvent::Leave,
            ]
        );
    }

    #[test]
    fn text_content_is_dropped() {
        let events = read_events("<app>some notes<lib/></app>").unwrap();
        assert_eq!(events.len(), 3);
    }

    #[test]
    fn attribute_values_are_unescaped() {
        let events = read_events(r#"<app><lib nest="{R,1}&amp;"/></app>"#).unwrap();
        match &events[1] {
            MarkupEvent::Enter { attributes, .. } => {
                assert_eq!(attributes["nest"], "{R,1}&");
            }
            other => panic!("expected enter, got {other:?}"),
        }
    }

    #[test]
    fn mismatched_end_tag_is_rejected() {
        let err = read_events("<app><lib></app></lib>").unwrap_err();
        assert!(matches!(err, Error::Markup { .. }));
    }

    #[test]
    fn unclosed_element_is_rejected() {
        let err = read_events("<app><lib>").unwrap_err();
        assert!(matches!(err, Error::Markup { .. }));
    }

    #[test]
    fn duplicate_attribute_is_rejected() {
        let err = read_events(r#"<app><lib root="1" root="0"/></app>"#).unwrap_err();
        assert!(matches!(err, Error::Markup { .. }));
    }
}
