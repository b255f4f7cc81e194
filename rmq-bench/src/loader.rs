use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use rmq::IntVector;

use crate::error::{BenchError, Result};

/// Read whitespace separated non-negative integers until the input is exhausted.
pub fn read_values(reader: impl BufRead) -> Result<Vec<u64>> {
    let mut values = vec![];
    for (line_idx, line) in reader.lines().enumerate() {
        let line = line?;
        for token in line.split_whitespace() {
            let v = token.parse::<u64>().map_err(|_| BenchError::Parse {
                line: line_idx + 1,
                token: token.to_string(),
            })?;
            values.push(v);
        }
    }
    if values.is_empty() {
        return Err(BenchError::EmptyInput);
    }
    Ok(values)
}

/// Load an integer file into a bit-compressed [`IntVector`].
pub fn load(path: &Path) -> Result<IntVector> {
    let values = read_values(BufReader::new(File::open(path)?))?;
    let mut a = IntVector::from_slice(&values);
    a.bit_compress();
    log::info!(
        "Loaded {} values from {} at {} bits each",
        a.len(),
        path.display(),
        a.width()
    );
    Ok(a)
}
