//! Shared fixtures: build small `.vsdx` containers on disk.

#![allow(dead_code)]

use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

pub const VISIO_NS: &str = "http://schemas.microsoft.com/office/visio/2012/main";
pub const REL_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
pub const PKG_REL_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";

/// One catalog entry.
#[derive(Debug, Clone)]
pub struct Master {
    pub id: u32,
    pub name: Option<String>,
    pub rel_id: String,
    pub file: String,
}

impl Master {
    pub fn new(id: u32, name: &str) -> Self {
        Self {
            id,
            name: Some(name.to_string()),
            rel_id: format!("rId{}", id),
            file: format!("master{}.xml", id),
        }
    }

    pub fn unnamed(id: u32) -> Self {
        Self {
            name: None,
            ..Self::new(id, "")
        }
    }
}

/// Builder for a drawing's file set.
#[derive(Debug, Clone, Default)]
pub struct Drawing {
    pub masters: Vec<Master>,
    pub pages: Vec<String>,
    pub with_catalog: bool,
    /// Overrides the generated catalog text.
    pub catalog_text: Option<String>,
    /// Overrides the generated relationship index text; `Some(None)` omits it.
    pub rels_text: Option<Option<String>>,
    pub with_pages_dir: bool,
}

impl Drawing {
    pub fn new() -> Self {
        Self {
            with_catalog: true,
            with_pages_dir: true,
            ..Default::default()
        }
    }

    /// The A/B/C drawing: page uses A by name and B by id.
    pub fn abc() -> Self {
        Self::new()
            .master(Master::new(1, "A"))
            .master(Master::new(2, "B"))
            .master(Master::new(3, "C"))
            .page(r#"<Shape ID="1"><Cell N="Fill" F="USE(&quot;A&quot;)"/></Shape><Shape ID="2" Master="2"/>"#)
    }

    pub fn master(mut self, master: Master) -> Self {
        self.masters.push(master);
        self
    }

    pub fn page(mut self, body: &str) -> Self {
        self.pages.push(body.to_string());
        self
    }

    pub fn without_catalog(mut self) -> Self {
        self.with_catalog = false;
        self
    }

    pub fn catalog_text(mut self, text: &str) -> Self {
        self.catalog_text = Some(text.to_string());
        self
    }

    pub fn rels_text(mut self, text: Option<&str>) -> Self {
        self.rels_text = Some(text.map(str::to_string));
        self
    }

    pub fn without_pages_dir(mut self) -> Self {
        self.with_pages_dir = false;
        self.pages.clear();
        self
    }

    pub fn catalog(&self) -> String {
        if let Some(text) = &self.catalog_text {
            return text.clone();
        }
        let mut xml = format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n\
             <Masters xmlns=\"{}\" xmlns:r=\"{}\">\n",
            VISIO_NS, REL_NS
        );
        for m in &self.masters {
            let name = m
                .name
                .as_ref()
                .map(|n| format!(" NameU=\"{}\" Name=\"{}\"", n, n))
                .unwrap_or_default();
            xml.push_str(&format!(
                "<Master ID=\"{}\"{}><PageSheet/><Rel r:id=\"{}\"/></Master>\n",
                m.id, name, m.rel_id
            ));
        }
        xml.push_str("</Masters>");
        xml
    }

    pub fn rels(&self) -> Option<String> {
        if let Some(text) = &self.rels_text {
            return text.clone();
        }
        let mut xml = format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n<Relationships xmlns=\"{}\">\n",
            PKG_REL_NS
        );
        for m in &self.masters {
            xml.push_str(&format!(
                "<Relationship Id=\"{}\" Type=\"http://schemas.microsoft.com/visio/2010/relationships/master\" Target=\"{}\"/>\n",
                m.rel_id, m.file
            ));
        }
        xml.push_str("</Relationships>");
        Some(xml)
    }

    /// Every file of the container, by entry name.
    pub fn files(&self) -> Vec<(String, String)> {
        let mut files = vec![(
            "[Content_Types].xml".to_string(),
            "<Types xmlns=\"http://schemas.openxmlformats.org/package/2006/content-types\"/>".to_string(),
        )];
        files.push(("visio/document.xml".to_string(), "<VisioDocument/>".to_string()));

        if self.with_catalog {
            files.push(("visio/masters/masters.xml".to_string(), self.catalog()));
            if let Some(rels) = self.rels() {
                files.push(("visio/masters/_rels/masters.xml.rels".to_string(), rels));
            }
            for m in &self.masters {
                // Padding so backing files have a measurable size.
                let body = format!("<MasterContents>{}</MasterContents>", "<Shape/>".repeat(200));
                files.push((format!("visio/masters/{}", m.file), body));
            }
        }

        if self.with_pages_dir {
            let mut page_rels = format!("<Relationships xmlns=\"{}\">", PKG_REL_NS);
            for (i, body) in self.pages.iter().enumerate() {
                let n = i + 1;
                files.push((
                    format!("visio/pages/page{}.xml", n),
                    format!("<PageContents xmlns=\"{}\"><Shapes>{}</Shapes></PageContents>", VISIO_NS, body),
                ));
                page_rels.push_str(&format!(
                    "<Relationship Id=\"rId{}\" Type=\"page\" Target=\"page{}.xml\"/>",
                    n, n
                ));
            }
            page_rels.push_str("</Relationships>");
            files.push(("visio/pages/pages.xml".to_string(), "<Pages/>".to_string()));
            files.push(("visio/pages/_rels/pages.xml.rels".to_string(), page_rels));
        }

        files
    }

    /// Write the container to `dir/name`.
    pub fn write(&self, dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        write_zip(&path, &self.files());
        path
    }
}

pub fn write_zip(path: &Path, files: &[(String, String)]) {
    write_zip_with(path, files, SimpleFileOptions::default());
}

/// Write entries uncompressed, so their bytes appear verbatim in the file.
pub fn write_stored_zip(path: &Path, files: &[(String, String)]) {
    write_zip_with(
        path,
        files,
        SimpleFileOptions::default().compression_method(CompressionMethod::Stored),
    );
}

fn write_zip_with(path: &Path, files: &[(String, String)], options: SimpleFileOptions) {
    let mut zip = ZipWriter::new(File::create(path).unwrap());
    for (name, body) in files {
        zip.start_file(name.as_str(), options).unwrap();
        zip.write_all(body.as_bytes()).unwrap();
    }
    zip.finish().unwrap();
}

/// Entry names of a container, sorted.
pub fn entry_names(path: &Path) -> Vec<String> {
    let zip = ZipArchive::new(File::open(path).unwrap()).unwrap();
    let mut names: Vec<String> = zip.file_names().map(str::to_string).collect();
    names.sort();
    names
}

/// Text of one entry.
pub fn read_entry(path: &Path, name: &str) -> String {
    let mut zip = ZipArchive::new(File::open(path).unwrap()).unwrap();
    let mut entry = zip.by_name(name).unwrap();
    let mut text = String::new();
    entry.read_to_string(&mut text).unwrap();
    text
}
