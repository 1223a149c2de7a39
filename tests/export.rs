use std::collections::HashMap;
use std::io::{Cursor, Read};

use chrono::NaiveDate;
use county_zips::{
    CsvFileProvider, RawRecord, StaticProvider, ZipRecord, build_archive, build_archive_at,
    load_reference,
};

fn read_entries(bytes: Vec<u8>) -> Vec<(String, String)> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    (0..archive.len())
        .map(|i| {
            let mut file = archive.by_index(i).unwrap();
            let mut body = String::new();
            file.read_to_string(&mut body).unwrap();
            (file.name().to_string(), body)
        })
        .collect()
}

fn provider() -> StaticProvider {
    StaticProvider::new(vec![
        RawRecord::new("90001", "Los Angeles", "California"),
        RawRecord::new("00501", "Suffolk", "New York"),
        RawRecord::new("90210", "Los Angeles", "California"),
        RawRecord::new("10001", "New York", "New York"),
        RawRecord::new("00544", "Suffolk", "New York"),
        RawRecord::new("94103", "San Francisco", "California"),
    ])
}

#[test]
fn example_selection_yields_two_entries() {
    let records = vec![
        ZipRecord::new("90001", "Los Angeles", "California"),
        ZipRecord::new("90210", "Los Angeles", "California"),
        ZipRecord::new("10001", "New York", "New York"),
    ];
    let ts = NaiveDate::from_ymd_opt(2024, 1, 2)
        .unwrap()
        .and_hms_opt(3, 4, 5)
        .unwrap();

    let entries = read_entries(build_archive_at(&records, ts).unwrap());
    assert_eq!(
        entries,
        vec![
            (
                "Los_Angeles_California_20240102_030405.csv".to_string(),
                "zipcode\n90001\n90210\n".to_string()
            ),
            (
                "New_York_New_York_20240102_030405.csv".to_string(),
                "zipcode\n10001\n".to_string()
            ),
        ]
    );
}

#[test]
fn load_filter_export_round_trip() {
    let table = load_reference(&provider()).unwrap();
    let selection = ["Suffolk, New York", "Los Angeles, California"];
    let filtered = table.filter(&selection);
    assert!(filtered.iter().all(|r| selection.contains(&r.county_state.as_str())));

    let entries = read_entries(build_archive(&filtered).unwrap());
    assert_eq!(entries.len(), 2);

    // Every entry carries the same timestamp suffix
    let suffixes: Vec<_> = entries.iter().map(|(n, _)| &n[n.len() - 19..]).collect();
    assert_eq!(suffixes[0], suffixes[1]);
    assert!(suffixes[0].ends_with(".csv"));

    let mut seen: HashMap<String, usize> = HashMap::new();
    for (name, body) in &entries {
        let mut lines = body.lines();
        assert_eq!(lines.next(), Some("zipcode"), "header missing in {}", name);
        for zip in lines {
            *seen.entry(zip.to_string()).or_default() += 1;
        }
    }

    let mut expected: HashMap<String, usize> = HashMap::new();
    for r in &filtered {
        *expected.entry(r.zipcode.clone()).or_default() += 1;
    }
    assert_eq!(seen, expected);
    assert_eq!(seen.get("00501"), Some(&1));
    assert_eq!(seen.get("00544"), Some(&1));
}

#[test]
fn entry_holds_only_its_county() {
    let table = load_reference(&provider()).unwrap();
    let filtered = table.filter(&table.counties());

    let entries = read_entries(build_archive(&filtered).unwrap());
    assert_eq!(entries.len(), table.counties().len());

    let suffolk = entries
        .iter()
        .find(|(n, _)| n.starts_with("Suffolk_New_York_"))
        .unwrap();
    assert_eq!(suffolk.1, "zipcode\n00501\n00544\n");
}

#[test]
fn empty_selection_gives_empty_archive() {
    let table = load_reference(&provider()).unwrap();
    let filtered = table.filter::<&str>(&[]);
    assert!(read_entries(build_archive(&filtered).unwrap()).is_empty());
}

#[test]
fn bundled_reference_exports_real_counties() {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("data/zip_county.csv");
    let table = load_reference(&CsvFileProvider::new(path)).unwrap();

    let counties = table.counties();
    assert!(counties.iter().all(|c| !c.starts_with(", ") && !c.ends_with(", ")));
    assert!(counties.contains(&"Suffolk County, NY".to_string()));
    assert!(counties.contains(&"Suffolk County, MA".to_string()));

    let filtered = table.filter(&["Los Angeles County, CA", "Suffolk County, NY"]);
    let entries = read_entries(build_archive(&filtered).unwrap());
    assert_eq!(entries.len(), 2);
    assert!(entries[0].0.starts_with("Los_Angeles_County_CA_"));
    assert_eq!(entries[0].1, "zipcode\n90001\n90210\n");
    assert!(entries[1].0.starts_with("Suffolk_County_NY_"));
    assert_eq!(entries[1].1, "zipcode\n00501\n00544\n");
}
