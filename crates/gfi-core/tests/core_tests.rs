use std::fs;

use gfi_core::snapshot::{self, INVENTORY_HEADER};
use gfi_core::table::{parse_delimiter, write_rows};
use gfi_core::{
    DiffRecord, EntryKind, FieldKind, FileSystemEntry, Inventory, KindFilter, ModTime, PathFilter,
    SnapshotFormat, SortSpec, Table, TableError,
};
use tempfile::TempDir;

fn entry(key: &str, kind: EntryKind, size: &str) -> FileSystemEntry {
    FileSystemEntry {
        key: key.to_string(),
        relative: key.trim_start_matches('/').to_string(),
        absolute: key.to_string(),
        name: key.rsplit('/').next().unwrap_or(key).into(),
        modified: "2023/12/31 23:59:59.999".parse().unwrap(),
        size: size.to_string(),
        mode: if kind == EntryKind::Directory { "drwxr-xr-x" } else { "-rw-r--r--" }.to_string(),
        kind,
    }
}

fn inventory() -> Inventory {
    let mut inventory = Inventory::from_entries(vec![
        entry("/srv/b.log", EntryKind::File, "2048"),
        entry("/srv", EntryKind::Directory, "4096"),
        entry("/srv/a.log", EntryKind::File, "0"),
    ]);
    inventory.sort_by_key();
    inventory
}

#[test]
fn test_tsv_snapshot_round_trip() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("nested/dir/inv.tsv");

    snapshot::write_inventory(&path, &inventory(), SnapshotFormat::Tsv).unwrap();
    let text = fs::read_to_string(&path).unwrap();
    assert!(text.starts_with(&INVENTORY_HEADER.join("\t")));

    let back = snapshot::read_inventory(&path).unwrap();
    assert_eq!(back, inventory());
    assert_eq!(back.count, 3);
}

#[test]
fn test_json_snapshot_keeps_stored_count() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("inv.json");

    let mut inv = inventory();
    snapshot::write_inventory(&path, &inv, SnapshotFormat::Json).unwrap();
    let text = fs::read_to_string(&path).unwrap();
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(value["count"], 3);
    assert_eq!(value["entries"][0]["time"], "2023/12/31 23:59:59.999");
    assert_eq!(value["entries"][0]["type"], "Directory");

    inv.count = 7;
    snapshot::write_inventory(&path, &inv, SnapshotFormat::Json).unwrap();
    assert_eq!(snapshot::read_inventory(&path).unwrap().count, 7);
}

#[test]
fn test_tabular_snapshot_columns_by_name() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("reordered.csv");
    fs::write(
        &path,
        "Type,Mode,Extra,Size,Time,Name,Abs,Rel,Full\r\n\
         File,-rw-r--r--,x,12,2020/01/02 03:04:05.006,a,/r/a,a,/r/a\r\n",
    )
    .unwrap();

    let inv = snapshot::read_inventory(&path).unwrap();
    assert_eq!(inv.count, 1);
    let a = &inv.entries[0];
    assert_eq!(a.key, "/r/a");
    assert_eq!(a.size_bytes(), 12);
    assert_eq!(a.kind, EntryKind::File);
    assert_eq!(a.modified.to_string(), "2020/01/02 03:04:05.006");
}

#[test]
fn test_tabular_snapshot_bad_type() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("bad.csv");
    fs::write(
        &path,
        "Full,Rel,Abs,Name,Time,Size,Mode,Type\r\n\
         /a,a,/a,a,2020/01/02 03:04:05.006,1,-,Link\r\n",
    )
    .unwrap();

    let err = snapshot::read_inventory(&path).unwrap_err();
    assert!(matches!(
        err,
        TableError::InvalidField { line: 2, ref column, ref value, .. }
            if column == "Type" && value == "Link"
    ));
}

#[test]
fn test_written_rows_read_back_as_table() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("out.csv");

    let mut record = DiffRecord::new("/srv/a.log", FieldKind::Size, Some(EntryKind::File), 3);
    record.set(0, "0");
    record.set(2, "5");
    let header = ["Key", "Type", "FieldKind", "one", "two", "three"];
    write_rows(&path, &header, [record.to_row()], b',').unwrap();

    let table = Table::read(&path, b',').unwrap();
    assert_eq!(table.len(), 1);
    assert_eq!(table.column("three"), Some(5));
    let row: Vec<&str> = table.rows[0].iter().collect();
    assert_eq!(row, vec!["/srv/a.log", "File", "Size", "0", "", "5"]);
}

#[test]
fn test_filter_and_sort_over_inventory() {
    let filter = PathFilter::new([r"\.log$"], [r"/b\."])
        .unwrap()
        .with_kind(KindFilter::from_flags(true, false));
    let inv = inventory();
    let kept: Vec<&str> = inv
        .iter()
        .filter(|e| filter.accepts(&e.key, e.kind))
        .map(|e| e.key.as_str())
        .collect();
    assert_eq!(kept, vec!["/srv/a.log"]);

    let spec: SortSpec = "5, 0".parse().unwrap();
    let mut rows: Vec<Vec<String>> = inventory()
        .iter()
        .map(|e| snapshot::entry_to_row(e).to_vec())
        .collect();
    spec.validate(INVENTORY_HEADER.len()).unwrap();
    spec.sort_rows(&mut rows);
    let sizes: Vec<&str> = rows.iter().map(|r| r[5].as_str()).collect();
    assert_eq!(sizes, vec!["0", "2048", "4096"]);
}

#[test]
fn test_mod_time_orders_chronologically() {
    let early: ModTime = "2019/12/31 23:59:59.999".parse().unwrap();
    let late: ModTime = "2020/01/01 00:00:00.000".parse().unwrap();
    assert!(early < late);
    assert!("2020-01-01 00:00:00".parse::<ModTime>().is_err());
}

#[test]
fn test_delimiter_argument() {
    assert_eq!(parse_delimiter(";").unwrap(), b';');
    assert_eq!(parse_delimiter("tab").unwrap(), b'\t');
    assert!(parse_delimiter("::").is_err());
}
