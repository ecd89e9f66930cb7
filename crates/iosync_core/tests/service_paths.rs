mod common;

use common::{assert_file_absent, config, insert_io, insert_raw, Workspace};
use iosync_core::{
    export_instruments, import_instruments, preview_import, read_snapshot, Category, Column,
    ErrorKind, FieldValue, InstrumentKey,
};

#[test]
fn export_summary_counts_sections_and_unclassified() {
    let workspace = Workspace::new();
    {
        let conn = workspace.conn();
        insert_io(&conn, 1, "DI-1", Some(Category::DigitalInput));
        insert_io(&conn, 2, "DI-2", Some(Category::DigitalInput));
        insert_io(&conn, 3, "AO-3", Some(Category::AnalogOutput));
        insert_raw(&conn, 4, "SPARE-4", "IO", &[None, Some(false), None, None]);
    }
    let destination = workspace.path("instruments.xlsx");

    let summary = export_instruments(&workspace.store, &destination, &config()).unwrap();

    let counts: Vec<(Category, usize)> = summary
        .sections
        .iter()
        .map(|section| (section.category, section.rows))
        .collect();
    assert_eq!(
        counts,
        vec![
            (Category::DigitalInput, 2),
            (Category::DigitalOutput, 0),
            (Category::AnalogInput, 0),
            (Category::AnalogOutput, 1),
        ]
    );
    assert_eq!(summary.rows_written, 3);
    assert_eq!(summary.unclassified, vec![InstrumentKey::new(4, "SPARE-4")]);
    assert_eq!(read_snapshot(&destination).unwrap().row_count(), 3);
}

#[test]
fn import_into_missing_store_is_unreachable_and_creates_nothing() {
    let workspace = Workspace::new();
    {
        let conn = workspace.conn();
        insert_io(&conn, 1, "DI-1", Some(Category::DigitalInput));
    }
    let snapshot = workspace.path("instruments.xlsx");
    export_instruments(&workspace.store, &snapshot, &config()).unwrap();
    let missing = workspace.path("elsewhere.db");

    let err = import_instruments(&missing, &snapshot, &config()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::StoreUnreachable);
    assert_file_absent(&missing);

    let err = preview_import(&missing, &snapshot, &config()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::StoreUnreachable);
    assert_file_absent(&missing);
}

#[test]
fn edit_preview_then_import_cycle() {
    let workspace = Workspace::new();
    {
        let conn = workspace.conn();
        insert_io(&conn, 10, "XV-10", Some(Category::DigitalOutput));
        insert_io(&conn, 11, "XV-11", Some(Category::DigitalOutput));
    }
    let exported = workspace.path("export.xlsx");
    export_instruments(&workspace.store, &exported, &config()).unwrap();

    let mut snapshot = read_snapshot(&exported).unwrap();
    snapshot.section_mut(Category::DigitalOutput).rows[1]
        .fields
        .set(Column::FullDescription, FieldValue::text("Outlet valve"));
    let edited = workspace.path("edited.xlsx");
    snapshot.write_xlsx(&edited).unwrap();

    let preview = preview_import(&workspace.store, &edited, &config()).unwrap();
    assert_eq!(preview.modified_count(), 1);
    assert_eq!(preview.rows[0].row, 3);

    let applied = import_instruments(&workspace.store, &edited, &config()).unwrap();
    assert_eq!(applied.rows, preview.rows);
    assert!(!applied.dry_run);

    let again = import_instruments(&workspace.store, &edited, &config()).unwrap();
    assert_eq!(again.modified_count(), 0);
    assert_eq!(again.rows_matched, 2);
}
