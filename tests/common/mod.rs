use std::io::{Error, Write};
use std::path::Path;
use tempfile::NamedTempFile;

pub const HEADER: &str = "op, user, password, store, items, amount, label";

/// Writes a scenario file from raw operation rows, prepending the header.
#[allow(dead_code)]
pub fn scenario(rows: &[&str]) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create scenario file");
    writeln!(file, "{}", HEADER).unwrap();
    for row in rows {
        writeln!(file, "{}", row).unwrap();
    }
    file.flush().unwrap();
    file
}

/// Generates a funding-heavy scenario: one seeded user followed by `rows`
/// fund operations with randomized amounts. Used for streaming tests.
#[allow(dead_code)]
pub fn generate_funding_ops(path: &Path, rows: usize) -> Result<(), Error> {
    use rand::Rng;

    let file = std::fs::File::create(path)?;
    let mut wtr = csv::WriterBuilder::new().from_writer(file);
    wtr.write_record(["op", "user", "password", "store", "items", "amount", "label"])?;
    wtr.write_record(["user", "alice", "pw", "", "", "0", ""])?;

    let mut rng = rand::thread_rng();
    for _ in 0..rows {
        let amount: u64 = rng.gen_range(1..1000);
        wtr.write_record(["fund", "alice", "pw", "", "", &amount.to_string(), ""])?;
    }

    wtr.flush()?;
    Ok(())
}
