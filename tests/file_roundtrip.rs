// Write-then-read round trips for the file helpers, including the fixed
// datetime format and concurrent-reader tolerance.
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use time::{Date, Month, OffsetDateTime, Time, UtcOffset};

use snap_json::{ReadOutcome, read_from_file, read_from_file_or_default, write_to_file};

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
struct LaunchRecord {
    account: String,
    #[serde(with = "snap_json::datetime")]
    launched_at: OffsetDateTime,
    flags: Vec<String>,
}

fn sample_record() -> LaunchRecord {
    let date = Date::from_calendar_date(2023, Month::April, 1).expect("date");
    let time = Time::from_hms_nano(12, 30, 45, 123_456_700).expect("time");
    let offset = UtcOffset::from_hms(8, 0, 0).expect("offset");
    LaunchRecord {
        account: "traveler".to_string(),
        launched_at: OffsetDateTime::new_in_offset(date, time, offset),
        flags: vec!["beta".to_string()],
    }
}

#[test]
fn write_then_read_round_trips() {
    let temp = tempfile::tempdir().expect("tempdir");
    let path = temp.path().join("launch.json");
    let record = sample_record();

    write_to_file(&path, &record).expect("write");
    let outcome: ReadOutcome<LaunchRecord> = read_from_file(&path).expect("read");
    assert_eq!(outcome, ReadOutcome::Value(record));
}

#[test]
fn written_file_is_indented_and_uses_fixed_datetime_text() {
    let temp = tempfile::tempdir().expect("tempdir");
    let path = temp.path().join("launch.json");

    write_to_file(&path, &sample_record()).expect("write");
    let text = std::fs::read_to_string(&path).expect("read text");
    assert!(text.contains('\n'));
    assert!(text.contains("2023-04-01 12:30:45.1234567+08:00"));
}

#[test]
fn overwrite_replaces_contents_in_full() {
    let temp = tempfile::tempdir().expect("tempdir");
    let path = temp.path().join("flags.json");

    write_to_file(&path, &vec!["a"; 100]).expect("first write");
    write_to_file(&path, &vec!["b"]).expect("second write");

    let outcome: ReadOutcome<Vec<String>> = read_from_file(&path).expect("read");
    assert_eq!(outcome, ReadOutcome::Value(vec!["b".to_string()]));
}

#[test]
fn read_succeeds_while_another_handle_holds_a_shared_lock() {
    let temp = tempfile::tempdir().expect("tempdir");
    let path = temp.path().join("live.json");
    std::fs::write(&path, "{\"account\":\"x\"}").expect("seed");

    let external = std::fs::File::open(&path).expect("open");
    external.lock_shared().expect("external shared lock");

    let outcome: ReadOutcome<serde_json::Value> = read_from_file(&path).expect("read");
    assert!(matches!(outcome, ReadOutcome::Value(_)));

    external.unlock().expect("unlock");
}

#[test]
fn or_default_substitutes_for_missing_and_null() {
    let temp = tempfile::tempdir().expect("tempdir");

    let missing: Vec<String> =
        read_from_file_or_default(temp.path().join("absent.json")).expect("missing");
    assert!(missing.is_empty());

    let null_path = temp.path().join("null.json");
    std::fs::write(&null_path, "null").expect("seed");
    let nulled: Vec<String> = read_from_file_or_default(&null_path).expect("null");
    assert!(nulled.is_empty());
}
