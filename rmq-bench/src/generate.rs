//! Random datasets and command scripts for benchmark runs.

use std::{fs, io::Write, path::Path};

use itertools::Itertools;
use rand::{seq::SliceRandom, Rng};

use crate::{command::Command, error::Result};

/// `n` values drawn uniformly from `0..=max`.
pub fn dataset(rng: &mut impl Rng, n: usize, max: u64) -> Vec<u64> {
    (0..n).map(|_| rng.gen_range(0..=max)).collect()
}

fn random_query(rng: &mut impl Rng, n: usize) -> Command {
    let l = rng.gen_range(0..n);
    let r = rng.gen_range(l..n);
    Command::Query {
        l: l as i64,
        r: r as i64,
    }
}

/// `queries` queries with `l <= r < n` and `updates` updates to values in
/// `0..=max`, shuffled together.
pub fn commands(
    rng: &mut impl Rng,
    n: usize,
    queries: usize,
    updates: usize,
    max: u64,
) -> Vec<Command> {
    assert!(n > 0, "cannot generate commands for an empty array");
    let mut commands: Vec<Command> = (0..queries).map(|_| random_query(rng, n)).collect();
    commands.extend((0..updates).map(|_| Command::Update {
        index: rng.gen_range(0..n),
        value: rng.gen_range(0..=max),
    }));
    commands.shuffle(rng);
    commands
}

/// Queries only, for the static models.
pub fn static_commands(rng: &mut impl Rng, n: usize, queries: usize) -> Vec<Command> {
    assert!(n > 0, "cannot generate commands for an empty array");
    (0..queries).map(|_| random_query(rng, n)).collect()
}

/// Write values space separated on a single line.
pub fn write_dataset(path: &Path, values: &[u64]) -> Result<()> {
    fs::write(path, format!("{}\n", values.iter().join(" ")))?;
    Ok(())
}

/// Write one command per line. With `bare`, queries are written as `l r`.
pub fn write_commands(path: &Path, commands: &[Command], bare: bool) -> Result<()> {
    let mut file = std::io::BufWriter::new(fs::File::create(path)?);
    for command in commands {
        match command {
            Command::Query { l, r } if bare => writeln!(file, "{l} {r}")?,
            command => writeln!(file, "{command}")?,
        }
    }
    file.flush()?;
    Ok(())
}
