//! Append-only CSV logs of build, query and update latencies.

use std::{
    fs::{self, File, OpenOptions},
    marker::PhantomData,
    path::Path,
};

use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::{error::Result, model::Model};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BuildRecord {
    /// Number of elements in the array.
    pub size: usize,
    /// Memory of the index structure in MiB.
    pub rmq_mb: f64,
    pub build_ns: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryRecord {
    pub size: usize,
    /// Length of the clamped query range.
    pub range: usize,
    pub query_ns: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateRecord {
    pub size: usize,
    pub index: usize,
    pub value: u64,
    pub update_ns: u64,
}

/// A CSV file that records are appended to, or nothing at all when disabled.
pub struct TimingLog<T> {
    writer: Option<csv::Writer<File>>,
    _record: PhantomData<T>,
}

impl<T: Serialize> TimingLog<T> {
    pub fn disabled() -> Self {
        Self {
            writer: None,
            _record: PhantomData,
        }
    }

    /// Open `path` for appending. The header row is only written to new or empty files.
    pub fn append(path: &Path) -> Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let fresh = file.metadata()?.len() == 0;
        let writer = csv::WriterBuilder::new()
            .has_headers(fresh)
            .from_writer(file);
        Ok(Self {
            writer: Some(writer),
            _record: PhantomData,
        })
    }

    /// Append one row and flush it to disk.
    pub fn record(&mut self, record: &T) -> Result<()> {
        if let Some(writer) = &mut self.writer {
            writer.serialize(record)?;
            writer.flush()?;
        }
        Ok(())
    }
}

/// The logs written by one run of one model.
pub struct Logs {
    pub build: TimingLog<BuildRecord>,
    pub query: TimingLog<QueryRecord>,
    pub update: TimingLog<UpdateRecord>,
}

impl Logs {
    pub fn disabled() -> Self {
        Self {
            build: TimingLog::disabled(),
            query: TimingLog::disabled(),
            update: TimingLog::disabled(),
        }
    }

    /// Open the logs of `model` inside `dir`, creating the directory if needed.
    pub fn open(dir: &Path, model: Model) -> Result<Self> {
        fs::create_dir_all(dir)?;
        let update = match model.update_log() {
            Some(name) => TimingLog::append(&dir.join(name))?,
            None => TimingLog::disabled(),
        };
        Ok(Self {
            build: TimingLog::append(&dir.join(model.build_log()))?,
            query: TimingLog::append(&dir.join(model.query_log()))?,
            update,
        })
    }
}

/// Read all well-formed records of a log. Malformed rows are skipped.
pub fn read_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut records = vec![];
    for (row, record) in reader.deserialize().enumerate() {
        match record {
            Ok(record) => records.push(record),
            Err(e) => log::warn!("{}: skipping row {}: {e}", path.display(), row + 1),
        }
    }
    Ok(records)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn header_written_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("query.csv");
        for round in 0..2 {
            let mut log = TimingLog::append(&path).unwrap();
            log.record(&QueryRecord {
                size: 10,
                range: 4,
                query_ns: 100 + round,
            })
            .unwrap();
        }
        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text, "size,range,query_ns\n10,4,100\n10,4,101\n");
        let records: Vec<QueryRecord> = read_records(&path).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].query_ns, 101);
    }

    #[test]
    fn malformed_rows_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("build.csv");
        fs::write(
            &path,
            "size,rmq_mb,build_ns\n10,0.5,300\nbroken,row,x\n20,1.5,600\n",
        )
        .unwrap();
        let records: Vec<BuildRecord> = read_records(&path).unwrap();
        assert_eq!(
            records,
            vec![
                BuildRecord {
                    size: 10,
                    rmq_mb: 0.5,
                    build_ns: 300
                },
                BuildRecord {
                    size: 20,
                    rmq_mb: 1.5,
                    build_ns: 600
                },
            ]
        );
    }

    #[test]
    fn open_model_logs() {
        let dir = tempfile::tempdir().unwrap();
        let logs_dir = dir.path().join("logs");
        Logs::open(&logs_dir, Model::SegmentStatic).unwrap();
        Logs::open(&logs_dir, Model::SparseDynamic).unwrap();
        let mut names: Vec<_> = fs::read_dir(&logs_dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        names.sort();
        assert_eq!(
            names,
            vec![
                "build-segment-tree-static.csv",
                "build-sparse-table-dynamic.csv",
                "query-segment-tree-static.csv",
                "query-sparse-table-dynamic.csv",
                "update-sparse-table-dynamic.csv",
            ]
        );
    }

    #[test]
    fn disabled_discards() {
        let mut log = TimingLog::disabled();
        log.record(&UpdateRecord {
            size: 1,
            index: 0,
            value: 3,
            update_ns: 9,
        })
        .unwrap();
    }
}
