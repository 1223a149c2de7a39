use std::env;
use std::fs;

use anyhow::{Context, Result};
use county_zips::{CsvFileProvider, DEFAULT_ARCHIVE_NAME, build_archive, load_reference};

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <counties> [output]", args[0]);
        eprintln!("       {} --list [filter]", args[0]);
        eprintln!("  counties: semicolon-separated (e.g., \"Los Angeles, CA;Kings, NY\")");
        eprintln!("  output: archive path (default: {})", DEFAULT_ARCHIVE_NAME);
        eprintln!("  REFERENCE_CSV: zipcode,county,state file (default: data/zip_county.csv)");
        std::process::exit(1);
    }

    let provider = CsvFileProvider::from_env();
    let table = load_reference(&provider).with_context(|| {
        format!(
            "The application could not load the necessary geo data from {}",
            provider.path().display()
        )
    })?;

    if args[1] == "--list" {
        let filter = args.get(2).map(|s| s.to_lowercase());
        for county in table.counties() {
            if filter
                .as_deref()
                .is_none_or(|f| county.to_lowercase().contains(f))
            {
                println!("{}", county);
            }
        }
        return Ok(());
    }

    // Parse semicolon-separated counties; "County, State" contains a comma
    let selection: Vec<String> = args[1]
        .split(';')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    if selection.is_empty() {
        eprintln!("Error: Please select at least one county");
        std::process::exit(1);
    }

    let records = table.filter(&selection);
    if records.is_empty() {
        eprintln!("Error: None of the selected counties are known. Try --list.");
        std::process::exit(1);
    }

    println!("Selected Zip Codes");
    for row in table.lookup(&selection) {
        println!("  {}\t{}", row.county, row.zip_code);
    }

    let output = args
        .get(2)
        .map(|s| s.as_str())
        .unwrap_or(DEFAULT_ARCHIVE_NAME);
    let bytes = build_archive(&records).context("Failed to build archive")?;
    fs::write(output, &bytes).with_context(|| format!("Failed to write {}", output))?;

    println!(
        "\nWrote {} zip codes to {} ({} bytes)",
        records.len(),
        output,
        bytes.len()
    );

    Ok(())
}
