//! core::catalog
//!
//! The master catalog (`visio/masters/masters.xml`).
//!
//! # Model
//!
//! Every `Master` element in the Visio namespace becomes a [`MasterEntry`],
//! numbered by document order. A `Master` nested inside another `Master` is
//! treated as part of its parent, both when parsing and when rewriting, so
//! the numbering stays consistent between the two passes.
//!
//! Entries keep attributes as found: a missing `NameU` and an empty one are
//! different to the validator but both exclude the entry from name-based
//! reachability.

use std::collections::{BTreeMap, BTreeSet};

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::NsReader;
use quick_xml::Writer;

use super::xml::{
    attr_value, bound_namespace, into_text, is_bound_to, utf8_declaration, XmlError, REL_NS,
    VISIO_NS,
};

const MASTER_TAG: &[u8] = b"Master";
const REL_TAG: &[u8] = b"Rel";

/// Relationship reference carried by a master's `Rel` element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelRef {
    /// Value of the id attribute in the relationships namespace.
    pub qualified_id: Option<String>,
    /// Value of a literal `r:id` whose prefix is not declared.
    pub prefixed_id: Option<String>,
    /// First id-like attribute found in some other namespace, as
    /// `{namespace}id` or a bare `id`.
    pub foreign_id_attr: Option<String>,
}

impl RelRef {
    /// Whether either recognized encoding of the id is present.
    pub fn has_recognized_id(&self) -> bool {
        self.qualified_id.is_some() || self.prefixed_id.is_some()
    }

    /// The relationship id, preferring the qualified form.
    ///
    /// Empty values count as absent.
    pub fn rel_id(&self) -> Option<&str> {
        self.qualified_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .or_else(|| self.prefixed_id.as_deref().filter(|id| !id.is_empty()))
    }
}

/// One `Master` element of the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MasterEntry {
    /// Position among catalog entries, in document order.
    pub index: usize,
    /// The `ID` attribute.
    pub id: Option<String>,
    /// The `NameU` attribute.
    pub name: Option<String>,
    /// The first `Rel` descendant.
    pub rel: Option<RelRef>,
}

impl MasterEntry {
    /// The symbolic name, if present and non-empty.
    pub fn symbolic_name(&self) -> Option<&str> {
        self.name.as_deref().filter(|n| !n.is_empty())
    }

    /// The relationship id this entry points at.
    pub fn rel_id(&self) -> Option<&str> {
        self.rel.as_ref().and_then(RelRef::rel_id)
    }

    /// Label used in diagnostics: name, else id, else `unknown`.
    pub fn label(&self) -> &str {
        self.symbolic_name()
            .or(self.id.as_deref())
            .unwrap_or("unknown")
    }
}

/// Parsed master catalog.
#[derive(Debug, Clone, Default)]
pub struct MasterCatalog {
    /// Namespace of the root element, if it has one.
    pub root_namespace: Option<String>,
    /// All entries in document order.
    pub entries: Vec<MasterEntry>,
}

impl MasterCatalog {
    /// Parse catalog text. `file` names the document in errors.
    pub fn parse(text: &str, file: &str) -> Result<Self, XmlError> {
        let mut reader = NsReader::from_str(text);
        let mut catalog = MasterCatalog::default();
        let mut seen_root = false;
        let mut depth = 0usize;
        let mut open: Option<(usize, MasterEntry)> = None;

        loop {
            let event = reader
                .read_event()
                .map_err(|e| XmlError::malformed(file, e))?;
            match event {
                Event::Start(ref e) | Event::Empty(ref e) => {
                    let is_empty = matches!(event, Event::Empty(_));
                    let (resolved, local) = reader.resolve_element(e.name());
                    let in_visio = is_bound_to(&resolved, VISIO_NS);
                    let local = local.as_ref();

                    if !seen_root {
                        catalog.root_namespace = bound_namespace(&resolved);
                        seen_root = true;
                    }

                    if let Some((_, entry)) = open.as_mut() {
                        if in_visio && local == REL_TAG && entry.rel.is_none() {
                            entry.rel = Some(read_rel_ref(&reader, e, file)?);
                        }
                    } else if in_visio && local == MASTER_TAG {
                        let entry = read_master(e, catalog.entries.len(), file)?;
                        if is_empty {
                            catalog.entries.push(entry);
                        } else {
                            open = Some((depth, entry));
                        }
                    }

                    if !is_empty {
                        depth += 1;
                    }
                }
                Event::End(_) => {
                    depth = depth.saturating_sub(1);
                    if matches!(open, Some((at, _)) if at == depth) {
                        if let Some((_, entry)) = open.take() {
                            catalog.entries.push(entry);
                        }
                    }
                }
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

        Ok(catalog)
    }

    /// Entries with a non-empty symbolic name.
    pub fn named_entries(&self) -> impl Iterator<Item = &MasterEntry> {
        self.entries.iter().filter(|e| e.symbolic_name().is_some())
    }

    /// `name -> entry` for named entries. A repeated name keeps the last entry.
    pub fn by_name(&self) -> BTreeMap<&str, &MasterEntry> {
        self.named_entries()
            .filter_map(|e| e.symbolic_name().map(|n| (n, e)))
            .collect()
    }

    /// `id -> name` inverse lookup over named entries.
    pub fn id_to_name(&self) -> BTreeMap<&str, &str> {
        self.by_name()
            .into_iter()
            .filter_map(|(name, entry)| entry.id.as_deref().map(|id| (id, name)))
            .collect()
    }

    /// All distinct symbolic names.
    pub fn names(&self) -> BTreeSet<String> {
        self.named_entries()
            .filter_map(|e| e.symbolic_name().map(str::to_string))
            .collect()
    }

    /// The first entry, used as the structural sample.
    pub fn sample(&self) -> Option<&MasterEntry> {
        self.entries.first()
    }
}

/// Rewrite catalog text without the entries at `remove` indices.
///
/// Everything outside removed entries is copied event for event. The
/// declaration is replaced by a UTF-8 one, added if the source had none.
pub fn remove_entries(text: &str, file: &str, remove: &BTreeSet<usize>) -> Result<String, XmlError> {
    let mut reader = NsReader::from_str(text);
    let mut writer = Writer::new(Vec::new());
    let mut declared = false;
    let mut depth = 0usize;
    let mut open_master: Option<usize> = None;
    let mut index = 0usize;
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
                let is_master = open_master.is_none() && {
                    let (resolved, local) = reader.resolve_element(e.name());
                    is_bound_to(&resolved, VISIO_NS) && local.as_ref() == MASTER_TAG
                };

                if is_master {
                    let this = index;
                    index += 1;
                    if remove.contains(&this) {
                        if !is_empty {
                            reader
                                .read_to_end(e.name())
                                .map_err(|err| XmlError::malformed(file, err))?;
                        }
                        drop_whitespace = true;
                        continue;
                    }
                    if !is_empty {
                        open_master = Some(depth);
                    }
                }

                if !is_empty {
                    depth += 1;
                }
            }
            Event::End(_) => {
                depth = depth.saturating_sub(1);
                if open_master == Some(depth) {
                    open_master = None;
                }
            }
            _ => {}
        }

        writer
            .write_event(event)
            .map_err(|e| XmlError::malformed(file, e))?;
    }

    into_text(writer.into_inner(), file)
}

fn read_master(e: &BytesStart<'_>, index: usize, file: &str) -> Result<MasterEntry, XmlError> {
    let mut entry = MasterEntry {
        index,
        id: None,
        name: None,
        rel: None,
    };
    for attr in e.attributes() {
        let attr = attr.map_err(|err| XmlError::malformed(file, err))?;
        match attr.key.as_ref() {
            b"ID" => entry.id = Some(attr_value(&attr, file)?),
            b"NameU" => entry.name = Some(attr_value(&attr, file)?),
            _ => {}
        }
    }
    Ok(entry)
}

fn read_rel_ref(
    reader: &NsReader<&[u8]>,
    e: &BytesStart<'_>,
    file: &str,
) -> Result<RelRef, XmlError> {
    let mut rel = RelRef::default();
    for attr in e.attributes() {
        let attr = attr.map_err(|err| XmlError::malformed(file, err))?;
        let (resolved, local) = reader.resolve_attribute(attr.key);
        if local.as_ref() != b"id" {
            continue;
        }
        let value = attr_value(&attr, file)?;
        if is_bound_to(&resolved, REL_NS) {
            rel.qualified_id = Some(value);
        } else if attr.key.as_ref() == b"r:id" && bound_namespace(&resolved).is_none() {
            rel.prefixed_id = Some(value);
        } else if rel.foreign_id_attr.is_none() {
            rel.foreign_id_attr = Some(match bound_namespace(&resolved) {
                Some(ns) => format!("{{{}}}id", ns),
                None => String::from_utf8_lossy(attr.key.as_ref()).into_owned(),
            });
        }
    }
    Ok(rel)
}
