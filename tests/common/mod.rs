use chrono::{NaiveDate, NaiveDateTime};
use deepchat::conversation::ExportMode;
use deepchat::history::{ExportHeader, HistoryStore};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

#[allow(dead_code)]
pub fn create_temp_store() -> (HistoryStore, TempDir) {
    let tmp = TempDir::new().expect("failed to create tempdir");
    let store = HistoryStore::new(tmp.path()).expect("failed to create history store");
    (store, tmp)
}

#[allow(dead_code)]
pub fn write_file(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).expect("failed to write file");
    path
}

#[allow(dead_code)]
pub fn timestamp(day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, day)
        .expect("valid date")
        .and_hms_opt(hour, 30, 0)
        .expect("valid time")
}

#[allow(dead_code)]
pub fn header(title: &str) -> ExportHeader {
    ExportHeader {
        title: title.to_string(),
        exported_at: timestamp(15, 9),
        model: "deepseek-chat".to_string(),
        mode: ExportMode::All,
    }
}
