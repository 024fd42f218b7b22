//! End-to-end merge pipeline: messy raw files in, cleaned CSV out.

use std::fs;

use parkflow::ingest::reader;
use parkflow::model::IngestError;
use parkflow::normalizer::normalize_all;

fn setup_raw_dir() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let raw = dir.path().join("raw");
    fs::create_dir_all(&raw).unwrap();

    // Well-formed, comma-delimited.
    fs::write(
        raw.join("a_2022.csv"),
        "Park,Unit Code,Park Type,Region,State,Year,Month,Recreation Visits\n\
         Acadia NP,ACAD,National Park,Northeast,ME,2022,7,\"1,234\"\n\
         Acadia NP,ACAD,National Park,Northeast,ME,2022,8,900\n",
    )
    .unwrap();

    // Semicolon-delimited with shuffled header casing and a bad row.
    fs::write(
        raw.join("b_2023.csv"),
        "park;unit code;park type;region;state;year;month;recreation visits\n\
         Zion NP;ZION;National Park;Intermountain;UT;2023;6;350000\n\
         Zion NP;ZION;National Park;Intermountain;UT;bad-year;7;100\n",
    )
    .unwrap();

    // Unlabeled columns in canonical order; positional fallback.
    fs::write(
        raw.join("c_positional.csv"),
        "h0,h1,h2,h3,h4,h5,h6,h7\n\
         Arches NP,ARCH,National Park,Intermountain,UT,2023,6,120000\n",
    )
    .unwrap();

    // Too narrow to resolve; the whole file is skipped.
    fs::write(raw.join("d_broken.csv"), "Park,State\nAcadia NP,ME\n").unwrap();

    // Later file overrides an earlier month for the same unit.
    fs::write(
        raw.join("e_restated.csv"),
        "Park,Unit Code,Park Type,Region,State,Year,Month,Recreation Visits\n\
         Acadia NP,ACAD,National Park,Northeast,ME,2022,7,2000\n",
    )
    .unwrap();

    // Non-CSV files are ignored entirely.
    fs::write(raw.join("notes.txt"), "not data").unwrap();

    dir
}

#[tokio::test]
async fn merge_normalize_and_round_trip() {
    let dir = setup_raw_dir();
    let raw_dir = dir.path().join("raw").display().to_string();
    let cleaned = dir.path().join("cleaned/all_parks.csv").display().to_string();

    let mut records = reader::merge_raw_dir(&raw_dir).await.unwrap();
    // 2 + 1 + 1 + 1 rows survive parsing; the bad-year row is dropped.
    assert_eq!(records.len(), 5);

    normalize_all(&mut records);
    // Dedupe collapses the restated ACAD 2022-07 row, keeping the later file.
    assert_eq!(records.len(), 4);
    let restated = records
        .iter()
        .find(|r| r.unit_code == "ACAD" && r.month == 7)
        .unwrap();
    assert_eq!(restated.recreation_visits, 2000);

    reader::write_cleaned_csv(&cleaned, &records).unwrap();
    let reloaded = reader::read_cleaned_csv(&cleaned).unwrap();
    assert_eq!(reloaded, records);

    // Totals survive the round trip.
    let total: i64 = records.iter().map(|r| r.recreation_visits).sum();
    let reloaded_total: i64 = reloaded.iter().map(|r| r.recreation_visits).sum();
    assert_eq!(total, reloaded_total);
    assert_eq!(total, 2000 + 900 + 350_000 + 120_000);
}

#[tokio::test]
async fn merge_fails_when_nothing_is_usable() {
    let dir = tempfile::tempdir().unwrap();
    let raw = dir.path().join("raw");
    fs::create_dir_all(&raw).unwrap();
    fs::write(raw.join("broken.csv"), "Park,State\nAcadia NP,ME\n").unwrap();

    let err = reader::merge_raw_dir(&raw.display().to_string())
        .await
        .unwrap_err();
    assert!(matches!(err, IngestError::NoUsableFiles(_)));
}

#[tokio::test]
async fn merge_of_empty_directory_fails() {
    let dir = tempfile::tempdir().unwrap();
    let err = reader::merge_raw_dir(&dir.path().display().to_string())
        .await
        .unwrap_err();
    assert!(matches!(err, IngestError::NoUsableFiles(_)));
}
