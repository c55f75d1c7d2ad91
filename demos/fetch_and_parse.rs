//! Fetch and parse example
//!
//! This example demonstrates the whole fetch chain:
//! - Resolve a ticker to a CIK
//! - Select the latest annual report from the submission catalog
//! - Store it with a provenance manifest
//! - Extract its Item sections
//!
//! Run with: `cargo run --example fetch_and_parse`

use edgarsum::{
    Edgar, FileTickerStore, IdentifierResolver, ParseSource, RetryPolicy, Retrying,
    SelectionOptions, fetch_filings, parse_filing, read_parsed,
};
use std::error::Error;
use std::path::Path;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let edgar = Retrying::new(
        Edgar::new("edgarsum Example user@example.com")?,
        RetryPolicy::default(),
    );
    let data_root = Path::new("data");
    let out_dir = Path::new("out");

    println!("=== edgarsum Fetch and Parse Example ===\n");

    // Example 1: Resolve a ticker
    println!("1. Resolving AAPL...");
    let resolver = IdentifierResolver::new(FileTickerStore::new(data_root.join("company_tickers.json")));
    let company = resolver.resolve(&edgar, "AAPL").await?;
    println!("✓ CIK: {}\n", company.cik10());

    // Example 2: Fetch the latest 10-K
    println!("2. Fetching the latest 10-K...");
    let options = SelectionOptions::new().with_form_type("10-K").with_limit(1);
    let manifests = fetch_filings(&edgar, &company, &options, data_root).await?;

    for manifest in &manifests {
        println!("   Form: {}", manifest.filing.form);
        println!("   Filed: {}", manifest.filing.filing_date);
        println!("   Accession: {}", manifest.filing.accession);
        for file in &manifest.files {
            println!("   {} ({} bytes, sha256 {})", file.task.destination, file.bytes, &file.sha256[..12]);
        }
        println!();
    }

    // Example 3: Extract sections
    println!("3. Extracting sections...");
    for manifest in &manifests {
        let source = ParseSource::Accession(manifest.filing.accession.clone());
        let parsed_path = parse_filing(&source, data_root, out_dir)?;
        let parsed = read_parsed(&parsed_path)?;

        println!("✓ Wrote {}", parsed_path.display());
        for (key, text) in &parsed.sections {
            println!("   {}: {} chars", key, text.chars().count());
        }
    }

    println!("\n=== Example completed successfully ===");
    Ok(())
}
