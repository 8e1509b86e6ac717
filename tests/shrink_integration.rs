//! Library-level analyze and shrink scenarios over generated drawings.

mod common;

use std::fs;

use tempfile::TempDir;

use common::{entry_names, read_entry, Drawing, Master};
use vsdx_shrink::core::catalog::MasterCatalog;
use vsdx_shrink::core::rels::RelationshipIndex;
use vsdx_shrink::engine::{self, Context, EngineError, ShrinkOptions};

fn ctx() -> Context {
    Context::default()
}

fn to(path: &std::path::Path) -> ShrinkOptions {
    ShrinkOptions {
        output: Some(path.to_path_buf()),
        ..ShrinkOptions::default()
    }
}

fn catalog_of(archive: &std::path::Path) -> MasterCatalog {
    MasterCatalog::parse(&read_entry(archive, "visio/masters/masters.xml"), "masters.xml").unwrap()
}

fn rels_of(archive: &std::path::Path) -> RelationshipIndex {
    RelationshipIndex::parse(
        &read_entry(archive, "visio/masters/_rels/masters.xml.rels"),
        "masters.xml.rels",
    )
    .unwrap()
}

mod analyze {
    use super::*;

    #[test]
    fn name_and_id_references_both_count() {
        let temp = TempDir::new().unwrap();
        let input = Drawing::abc().write(temp.path(), "abc.vsdx");

        let report = engine::analyze(&input, &ctx()).unwrap();

        assert_eq!(report.total_masters, 3);
        assert_eq!(report.used_masters, 2);
        assert_eq!(report.unused_masters, 1);
        assert_eq!(report.used_names, vec!["A", "B"]);
        assert_eq!(report.unused_names, vec!["C"]);
    }

    #[test]
    fn is_idempotent_and_read_only() {
        let temp = TempDir::new().unwrap();
        let input = Drawing::abc().write(temp.path(), "abc.vsdx");
        let before = fs::read(&input).unwrap();

        let first = engine::analyze(&input, &ctx()).unwrap();
        let second = engine::analyze(&input, &ctx()).unwrap();

        assert_eq!(first, second);
        assert_eq!(fs::read(&input).unwrap(), before);
    }

    #[test]
    fn counts_are_conserved() {
        let temp = TempDir::new().unwrap();
        let drawing = Drawing::new()
            .master(Master::new(1, "A"))
            .master(Master::new(2, "B"))
            .master(Master::unnamed(3))
            .page(r#"<F>USE("A")</F><F>USE("NotInCatalog")</F>"#);
        let input = drawing.write(temp.path(), "d.vsdx");

        let report = engine::analyze(&input, &ctx()).unwrap();

        assert_eq!(report.total_masters, 2);
        assert_eq!(report.used_masters + report.unused_masters, report.total_masters);
        assert_eq!(report.used_names, vec!["A"]);
    }

    #[test]
    fn small_savings_round_to_zero() {
        let temp = TempDir::new().unwrap();
        let input = Drawing::abc().write(temp.path(), "abc.vsdx");

        let report = engine::analyze(&input, &ctx()).unwrap();

        assert_eq!(report.unused_names, vec!["C"]);
        assert_eq!(report.potential_savings_mb, 0.0);
    }

    #[test]
    fn drawing_without_catalog_is_empty() {
        let temp = TempDir::new().unwrap();
        let input = Drawing::new().without_catalog().write(temp.path(), "plain.vsdx");

        let report = engine::analyze(&input, &ctx()).unwrap();

        assert_eq!(report.total_masters, 0);
        assert_eq!(report.potential_savings_mb, 0.0);
    }

    #[test]
    fn drawing_without_pages_uses_nothing() {
        let temp = TempDir::new().unwrap();
        let input = Drawing::new()
            .master(Master::new(1, "A"))
            .write(temp.path(), "d.vsdx");

        let report = engine::analyze(&input, &ctx()).unwrap();
        assert_eq!(report.unused_names, vec!["A"]);
    }
}

mod shrink {
    use super::*;

    #[test]
    fn removes_unreferenced_master_everywhere() {
        let temp = TempDir::new().unwrap();
        let input = Drawing::abc().write(temp.path(), "abc.vsdx");
        let output = temp.path().join("out.vsdx");

        let report = engine::shrink(&input, &to(&output), &ctx()).unwrap();

        assert_eq!(report.masters_removed, 1);
        assert_eq!(report.output_path, output);

        let catalog = catalog_of(&output);
        let names: Vec<_> = catalog.named_entries().filter_map(|e| e.symbolic_name()).collect();
        assert_eq!(names, vec!["A", "B"]);
        assert_eq!(rels_of(&output).ids(), ["rId1", "rId2"].into_iter().collect());

        let entries = entry_names(&output);
        assert!(entries.contains(&"visio/masters/master1.xml".to_string()));
        assert!(entries.contains(&"visio/masters/master2.xml".to_string()));
        assert!(!entries.contains(&"visio/masters/master3.xml".to_string()));
        assert!(entries.contains(&"visio/pages/page1.xml".to_string()));
        assert!(entries.contains(&"[Content_Types].xml".to_string()));
    }

    #[test]
    fn output_elsewhere_leaves_input_untouched() {
        let temp = TempDir::new().unwrap();
        let input = Drawing::abc().write(temp.path(), "abc.vsdx");
        let before = fs::read(&input).unwrap();
        let output = temp.path().join("out.vsdx");

        engine::shrink(&input, &to(&output), &ctx()).unwrap();

        assert_eq!(fs::read(&input).unwrap(), before);
        assert!(!temp.path().join("abc.vsdx.bak").exists());
    }

    #[test]
    fn in_place_writes_backup_first() {
        let temp = TempDir::new().unwrap();
        let input = Drawing::abc().write(temp.path(), "abc.vsdx");
        let before = fs::read(&input).unwrap();

        let report = engine::shrink(&input, &ShrinkOptions::default(), &ctx()).unwrap();

        assert_eq!(report.output_path, input);
        assert_eq!(fs::read(temp.path().join("abc.vsdx.bak")).unwrap(), before);
        assert_eq!(catalog_of(&input).entries.len(), 2);
    }

    #[test]
    fn output_naming_the_input_counts_as_in_place() {
        let temp = TempDir::new().unwrap();
        let input = Drawing::abc().write(temp.path(), "abc.vsdx");
        let before = fs::read(&input).unwrap();

        engine::shrink(&input, &to(&input), &ctx()).unwrap();

        assert_eq!(fs::read(temp.path().join("abc.vsdx.bak")).unwrap(), before);
        assert_eq!(catalog_of(&input).entries.len(), 2);
    }

    #[test]
    fn in_place_without_backup() {
        let temp = TempDir::new().unwrap();
        let input = Drawing::abc().write(temp.path(), "abc.vsdx");
        let options = ShrinkOptions {
            backup: false,
            ..ShrinkOptions::default()
        };

        engine::shrink(&input, &options, &ctx()).unwrap();

        assert!(!temp.path().join("abc.vsdx.bak").exists());
        assert_eq!(catalog_of(&input).entries.len(), 2);
    }

    #[test]
    fn custom_backup_suffix() {
        let temp = TempDir::new().unwrap();
        let input = Drawing::abc().write(temp.path(), "abc.vsdx");
        let options = ShrinkOptions {
            backup_suffix: ".orig".to_string(),
            ..ShrinkOptions::default()
        };

        engine::shrink(&input, &options, &ctx()).unwrap();

        assert!(temp.path().join("abc.vsdx.orig").exists());
    }

    #[test]
    fn nothing_unused_keeps_every_entry() {
        let temp = TempDir::new().unwrap();
        let input = Drawing::new()
            .master(Master::new(1, "A"))
            .master(Master::new(2, "B"))
            .page(r#"<F>USE("A")</F><Shape Master="2"/>"#)
            .write(temp.path(), "d.vsdx");
        let output = temp.path().join("out.vsdx");

        let report = engine::shrink(&input, &to(&output), &ctx()).unwrap();

        assert_eq!(report.masters_removed, 0);
        assert_eq!(catalog_of(&output).entries.len(), 2);
        assert_eq!(rels_of(&output).relationships.len(), 2);
        assert_eq!(entry_names(&output), entry_names(&input));
    }

    #[test]
    fn shrinking_twice_changes_nothing_more() {
        let temp = TempDir::new().unwrap();
        let input = Drawing::abc().write(temp.path(), "abc.vsdx");
        let once = temp.path().join("once.vsdx");
        let twice = temp.path().join("twice.vsdx");

        engine::shrink(&input, &to(&once), &ctx()).unwrap();
        let report = engine::shrink(&once, &to(&twice), &ctx()).unwrap();

        assert_eq!(report.masters_removed, 0);
        assert_eq!(entry_names(&once), entry_names(&twice));
        assert_eq!(
            read_entry(&once, "visio/masters/masters.xml"),
            read_entry(&twice, "visio/masters/masters.xml")
        );
    }

    #[test]
    fn unnamed_entries_survive_with_their_files() {
        let temp = TempDir::new().unwrap();
        let input = Drawing::new()
            .master(Master::new(1, "A"))
            .master(Master::unnamed(2))
            .page("<Shape/>")
            .write(temp.path(), "d.vsdx");
        let output = temp.path().join("out.vsdx");

        let report = engine::shrink(&input, &to(&output), &ctx()).unwrap();

        assert_eq!(report.masters_removed, 1);
        let catalog = catalog_of(&output);
        assert_eq!(catalog.entries.len(), 1);
        assert_eq!(catalog.entries[0].id.as_deref(), Some("2"));
        assert_eq!(rels_of(&output).ids(), ["rId2"].into_iter().collect());
        assert!(entry_names(&output).contains(&"visio/masters/master2.xml".to_string()));
    }

    #[test]
    fn catalog_keeps_declaration_and_content() {
        let temp = TempDir::new().unwrap();
        let input = Drawing::abc().write(temp.path(), "abc.vsdx");
        let output = temp.path().join("out.vsdx");

        engine::shrink(&input, &to(&output), &ctx()).unwrap();

        let text = read_entry(&output, "visio/masters/masters.xml");
        assert!(text.starts_with(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#));
        assert!(text.contains(r#"<Master ID="1" NameU="A" Name="A"><PageSheet/><Rel r:id="rId1"/></Master>"#));
        assert!(!text.contains(r#"NameU="C""#));
    }

    #[test]
    fn without_catalog_copies_through() {
        let temp = TempDir::new().unwrap();
        let input = Drawing::new().without_catalog().write(temp.path(), "plain.vsdx");
        let output = temp.path().join("copy.vsdx");

        let report = engine::shrink(&input, &to(&output), &ctx()).unwrap();

        assert_eq!(report.masters_removed, 0);
        assert_eq!(fs::read(&output).unwrap(), fs::read(&input).unwrap());
    }

    #[test]
    fn without_catalog_in_place_is_a_no_op() {
        let temp = TempDir::new().unwrap();
        let input = Drawing::new().without_catalog().write(temp.path(), "plain.vsdx");
        let before = fs::read(&input).unwrap();

        let report = engine::shrink(&input, &ShrinkOptions::default(), &ctx()).unwrap();

        assert_eq!(report.reduction_mb, 0.0);
        assert_eq!(fs::read(&input).unwrap(), before);
        assert!(!temp.path().join("plain.vsdx.bak").exists());
    }
}

mod rejection {
    use super::*;

    fn assert_rejected_unchanged(drawing: Drawing, needle: &str) {
        let temp = TempDir::new().unwrap();
        let input = drawing.write(temp.path(), "bad.vsdx");
        let before = fs::read(&input).unwrap();

        let err = engine::analyze(&input, &ctx()).unwrap_err();
        assert_eq!(err.exit_code(), 2, "{}", err);
        assert!(err.to_string().contains(needle), "{}", err);

        let err = engine::shrink(&input, &ShrinkOptions::default(), &ctx()).unwrap_err();
        assert_eq!(err.exit_code(), 2);

        assert_eq!(fs::read(&input).unwrap(), before);
        assert!(!temp.path().join("bad.vsdx.bak").exists());
        let leftovers: Vec<_> = fs::read_dir(temp.path()).unwrap().collect();
        assert_eq!(leftovers.len(), 1);
    }

    #[test]
    fn missing_name_attribute() {
        let catalog = format!(
            r#"<Masters xmlns="{}" xmlns:r="{}"><Master ID="1"><Rel r:id="rId1"/></Master></Masters>"#,
            common::VISIO_NS,
            common::REL_NS
        );
        let drawing = Drawing::new().master(Master::new(1, "A")).catalog_text(&catalog);

        assert_rejected_unchanged(drawing, "missing required attributes: NameU");
    }

    #[test]
    fn dangling_relationship() {
        let rels = format!(
            r#"<Relationships xmlns="{}"><Relationship Id="rId1" Target="master1.xml"/></Relationships>"#,
            common::PKG_REL_NS
        );
        let drawing = Drawing::abc().rels_text(Some(&rels));

        assert_rejected_unchanged(drawing, "Master 'B' references non-existent relationship: rId2");
    }

    #[test]
    fn missing_relationship_index_and_pages() {
        let drawing = Drawing::abc().rels_text(None).without_pages_dir();

        assert_rejected_unchanged(drawing, "Missing relationships file: masters.xml.rels");
    }

    #[test]
    fn malformed_catalog() {
        let drawing = Drawing::abc().catalog_text("<Masters><Master></Masters>");

        assert_rejected_unchanged(drawing, "Invalid XML in masters.xml");
    }

    #[test]
    fn not_a_zip() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("fake.vsdx");
        fs::write(&input, "plain text").unwrap();

        let err = engine::analyze(&input, &ctx()).unwrap_err();
        assert!(matches!(err, EngineError::Archive(_)));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn corrupt_entry_data() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("damaged.vsdx");
        common::write_stored_zip(&input, &Drawing::abc().files());

        let mut bytes = fs::read(&input).unwrap();
        let at = bytes.windows(15).position(|w| w == b"<VisioDocument/".as_slice()).unwrap();
        bytes[at + 1] = b'X';
        fs::write(&input, &bytes).unwrap();

        let err = engine::analyze(&input, &ctx()).unwrap_err();
        assert!(matches!(err, EngineError::Archive(_)), "{}", err);
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("damaged.vsdx"), "{}", err);

        let err = engine::shrink(&input, &ShrinkOptions::default(), &ctx()).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert_eq!(fs::read(&input).unwrap(), bytes);
    }

    #[test]
    fn input_errors_come_first() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("missing.vsdx");
        let wrong = temp.path().join("drawing.vsd");
        fs::write(&wrong, "").unwrap();

        assert!(matches!(
            engine::analyze(&missing, &ctx()),
            Err(EngineError::NotFound { .. })
        ));
        assert!(matches!(
            engine::shrink(&wrong, &ShrinkOptions::default(), &ctx()),
            Err(EngineError::WrongExtension { .. })
        ));
    }
}
