//! core::rels
//!
//! OPC relationship documents (`_rels/*.rels`).
//!
//! Used for the master relationship index, which maps the `r:id` of each
//! catalog entry to its backing file, and for the optional page index used
//! to discover page documents.

use std::collections::{BTreeSet, HashSet};

use quick_xml::events::Event;
use quick_xml::reader::NsReader;
use quick_xml::Writer;

use super::xml::{attr_value, bound_namespace, into_text, is_bound_to, utf8_declaration, XmlError, PKG_REL_NS};

/// One `Relationship` element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    /// The `Id` attribute.
    pub id: String,
    /// The `Target` attribute, relative to the owning document's directory.
    pub target: String,
}

/// Parsed relationship document.
#[derive(Debug, Clone, Default)]
pub struct RelationshipIndex {
    /// Namespace of the root element, if it has one.
    pub root_namespace: Option<String>,
    /// `Relationship` elements with a non-empty `Id`, in document order.
    pub relationships: Vec<Relationship>,
}

impl RelationshipIndex {
    /// Parse relationship text. `file` names the document in errors.
    pub fn parse(text: &str, file: &str) -> Result<Self, XmlError> {
        let mut reader = NsReader::from_str(text);
        let mut index = RelationshipIndex::default();
        let mut seen_root = false;
        let mut depth = 0usize;

        loop {
            let event = reader
                .read_event()
                .map_err(|e| XmlError::malformed(file, e))?;
            match event {
                Event::Start(ref e) | Event::Empty(ref e) => {
                    let (resolved, local) = reader.resolve_element(e.name());
                    if !seen_root {
                        index.root_namespace = bound_namespace(&resolved);
                        seen_root = true;
                    }

                    if is_bound_to(&resolved, PKG_REL_NS) && local.as_ref() == b"Relationship" {
                        let mut id = String::new();
                        let mut target = String::new();
                        for attr in e.attributes() {
                            let attr = attr.map_err(|err| XmlError::malformed(file, err))?;
                            match attr.key.as_ref() {
                                b"Id" => id = attr_value(&attr, file)?,
                                b"Target" => target = attr_value(&attr, file)?,
                                _ => {}
                            }
                        }
                        if !id.is_empty() {
                            index.relationships.push(Relationship { id, target });
                        }
                    }

                    if matches!(event, Event::Start(_)) {
                        depth += 1;
                    }
                }
                Event::End(_) => depth = depth.saturating_sub(1),
                Event::Eof => break,
                _ => {}
            }
        }

        if !seen_root {
            return Err(XmlError::malformed(file, "no root element found"));
        }
        if depth != 0 {
            return Err(XmlError::malformed(file, "unexpected end of document"));
        }

        Ok(index)
    }

    /// All relationship ids.
    pub fn ids(&self) -> BTreeSet<&str> {
        self.relationships.iter().map(|r| r.id.as_str()).collect()
    }

    /// Target of a relationship id, if it resolves.
    pub fn target(&self, id: &str) -> Option<&str> {
        self.relationships
            .iter()
            .find(|r| r.id == id && !r.target.is_empty())
            .map(|r| r.target.as_str())
    }
}

/// Rewrite relationship text keeping only entries whose `Id` is in `keep`.
///
/// Only direct children of the root carrying a non-empty `Id` are
/// candidates for removal; anything else is copied through.
pub fn retain_ids(text: &str, file: &str, keep: &HashSet<&str>) -> Result<String, XmlError> {
    let mut reader = NsReader::from_str(text);
    let mut writer = Writer::new(Vec::new());
    let mut declared = false;
    let mut depth = 0usize;
    let mut drop_whitespace = false;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| XmlError::malformed(file, e))?;

        if let Event::Eof = event {
            break;
        }

        if !declared {
            declared = true;
            let original = match &event {
                Event::Decl(decl) => Some(decl),
                _ => None,
            };
            writer
                .write_event(Event::Decl(utf8_declaration(original)))
                .map_err(|e| XmlError::malformed(file, e))?;
            if original.is_some() {
                continue;
            }
            writer.get_mut().push(b'\n');
        }

        if drop_whitespace {
            drop_whitespace = false;
            if let Event::Text(ref t) = event {
                if t.iter().all(u8::is_ascii_whitespace) {
                    continue;
                }
            }
        }

        match event {
            Event::Start(ref e) | Event::Empty(ref e) => {
                let is_empty = matches!(event, Event::Empty(_));
                if depth == 1 {
                    let mut id = None;
                    for attr in e.attributes() {
                        let attr = attr.map_err(|err| XmlError::malformed(file, err))?;
                        if attr.key.as_ref() == b"Id" {
                            id = Some(attr_value(&attr, file)?);
                        }
                    }
                    if let Some(id) = id.filter(|id| !id.is_empty()) {
                        if !keep.contains(id.as_str()) {
                            if !is_empty {
                                reader
                                    .read_to_end(e.name())
                                    .map_err(|err| XmlError::malformed(file, err))?;
                            }
                            drop_whitespace = true;
                            continue;
                        }
                    }
                }
                if !is_empty {
                    depth += 1;
                }
            }
            Event::End(_) => depth = depth.saturating_sub(1),
            _ => {}
        }

        writer
            .write_event(event)
            .map_err(|e| XmlError::malformed(file, e))?;
    }

    into_text(writer.into_inner(), file)
}
