//! The `Q`/`U` command loop that drives one engine and times every operation.

use std::{
    io::{BufRead, Write},
    ops::Bound,
    time::{Duration, Instant},
};

use rmq::{DynamicRmq, IntVector, Rmq, SegmentTree, SparseTable};

use crate::{
    command::Command,
    error::Result,
    model::Model,
    timing::{BuildRecord, Logs, QueryRecord, UpdateRecord},
};

/// Object-safe view of an engine, so one loop can drive every model.
pub trait Backend {
    fn len(&self) -> usize;
    fn get(&self, i: usize) -> u64;
    fn query(&self, range: (Bound<usize>, Bound<usize>)) -> Option<usize>;
    /// Whether [`Backend::set`] does anything.
    fn is_dynamic(&self) -> bool;
    fn set(&mut self, i: usize, v: u64);
    /// Widen the storage for `v` ahead of a timed [`Backend::set`].
    fn reserve(&mut self, v: u64);
    fn size_in_bytes(&self) -> usize;
}

/// An engine that only answers queries.
pub struct Frozen<E>(pub E);

/// An engine that also accepts updates.
pub struct Live<E>(pub E);

impl<E: Rmq> Backend for Frozen<E> {
    fn len(&self) -> usize {
        self.0.len()
    }
    fn get(&self, i: usize) -> u64 {
        self.0.get(i)
    }
    fn query(&self, range: (Bound<usize>, Bound<usize>)) -> Option<usize> {
        self.0.query(range)
    }
    fn is_dynamic(&self) -> bool {
        false
    }
    fn set(&mut self, _i: usize, _v: u64) {}
    fn reserve(&mut self, _v: u64) {}
    fn size_in_bytes(&self) -> usize {
        self.0.size_in_bytes()
    }
}

impl<E: DynamicRmq> Backend for Live<E> {
    fn len(&self) -> usize {
        self.0.len()
    }
    fn get(&self, i: usize) -> u64 {
        self.0.get(i)
    }
    fn query(&self, range: (Bound<usize>, Bound<usize>)) -> Option<usize> {
        self.0.query(range)
    }
    fn is_dynamic(&self) -> bool {
        true
    }
    fn set(&mut self, i: usize, v: u64) {
        self.0.set(i, v)
    }
    fn reserve(&mut self, v: u64) {
        self.0.reserve(v)
    }
    fn size_in_bytes(&self) -> usize {
        self.0.size_in_bytes()
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    /// Answered queries.
    pub queries: usize,
    /// Applied updates.
    pub updates: usize,
    /// Invalid, unsupported or out-of-range commands.
    pub rejected: usize,
}

fn nanos(d: Duration) -> u64 {
    u64::try_from(d.as_nanos()).unwrap_or(u64::MAX)
}

/// Build the engine of `model` over `a`, log the build, and run the command loop.
pub fn start(
    model: Model,
    a: &mut IntVector,
    input: impl BufRead,
    out: impl Write,
    logs: &mut Logs,
) -> Result<Summary> {
    let timer = Instant::now();
    match model {
        Model::SparseStatic => {
            let backend = Frozen(SparseTable::new(&*a));
            built(backend, timer.elapsed(), model, input, out, logs)
        }
        Model::SparseDynamic => {
            let backend = Live(SparseTable::new(&mut *a));
            built(backend, timer.elapsed(), model, input, out, logs)
        }
        Model::SegmentStatic => {
            let backend = Frozen(SegmentTree::new(&*a));
            built(backend, timer.elapsed(), model, input, out, logs)
        }
        Model::SegmentDynamic => {
            let backend = Live(SegmentTree::new(&mut *a));
            built(backend, timer.elapsed(), model, input, out, logs)
        }
    }
}

fn built(
    mut backend: impl Backend,
    elapsed: Duration,
    model: Model,
    input: impl BufRead,
    mut out: impl Write,
    logs: &mut Logs,
) -> Result<Summary> {
    let record = BuildRecord {
        size: backend.len(),
        rmq_mb: backend.size_in_bytes() as f64 / (1024.0 * 1024.0),
        build_ns: nanos(elapsed),
    };
    log::info!(
        "Built {model} over {} values in {} ns, ~{:.4} MB",
        record.size,
        record.build_ns,
        record.rmq_mb
    );
    logs.build.record(&record)?;
    writeln!(out, "RMQ {model}. Commands:")?;
    writeln!(out, "  Q l r   -> position of the minimum in [l, r]")?;
    if backend.is_dynamic() {
        writeln!(out, "  U i v   -> set A[i] = v")?;
    }
    writeln!(out, "  exit    -> quit")?;
    run(&mut backend, input, out, logs)
}

/// Read commands until `exit` or the end of `input`.
pub fn run(
    backend: &mut dyn Backend,
    input: impl BufRead,
    mut out: impl Write,
    logs: &mut Logs,
) -> Result<Summary> {
    let n = backend.len();
    let mut summary = Summary::default();
    let mut lines = input.lines();
    loop {
        write!(out, "> ")?;
        out.flush()?;
        let Some(line) = lines.next() else {
            break;
        };
        let command = match Command::parse(&line?) {
            None => continue,
            Some(Ok(command)) => command,
            Some(Err(e)) => {
                log::debug!("{e}");
                writeln!(out, "Invalid input. Use: Q l r, U i v or exit.")?;
                summary.rejected += 1;
                continue;
            }
        };
        match command {
            Command::Exit => break,
            Command::Query { l, r } => {
                let (l, r) = (l.min(r), l.max(r));
                // A negative start reaches back to 0; a negative end selects nothing.
                let start = usize::try_from(l).map_or(Bound::Unbounded, Bound::Included);
                let end = usize::try_from(r).map_or(Bound::Excluded(0), Bound::Included);

                let timer = Instant::now();
                let found = backend.query((start, end));
                let query_ns = nanos(timer.elapsed());

                match (found, rmq::clamp((start, end), n)) {
                    (Some(i), Some((l, r))) => {
                        writeln!(
                            out,
                            "Minimum of [{l}, {r}] is at index {i}, A[{i}] = {}",
                            backend.get(i)
                        )?;
                        writeln!(out, "Query time: {query_ns} ns")?;
                        logs.query.record(&QueryRecord {
                            size: n,
                            range: r - l + 1,
                            query_ns,
                        })?;
                        summary.queries += 1;
                    }
                    _ => {
                        writeln!(out, "No result for [{l}, {r}]: the array has size {n}.")?;
                        summary.rejected += 1;
                    }
                }
            }
            Command::Update { index, value } => {
                if !backend.is_dynamic() {
                    writeln!(out, "Updates are not supported in static mode.")?;
                    summary.rejected += 1;
                    continue;
                }
                if index >= n {
                    writeln!(out, "Index {index} out of bounds: the array has size {n}.")?;
                    summary.rejected += 1;
                    continue;
                }

                // Repacking the array is not part of the update being measured.
                backend.reserve(value);
                let timer = Instant::now();
                backend.set(index, value);
                let update_ns = nanos(timer.elapsed());

                writeln!(out, "Set A[{index}] = {value}. Update time: {update_ns} ns")?;
                logs.update.record(&UpdateRecord {
                    size: n,
                    index,
                    value,
                    update_ns,
                })?;
                summary.updates += 1;
            }
        }
    }
    writeln!(out, "Exiting.")?;
    Ok(summary)
}

#[cfg(test)]
mod test {
    use std::fs;

    use super::*;
    use crate::timing::read_records;

    const SCENARIO: [u64; 10] = [6, 7, 3, 2, 4, 2, 1, 5, 8, 2];

    fn scenario_array() -> IntVector {
        let mut a = IntVector::from_slice(&SCENARIO);
        a.bit_compress();
        a
    }

    fn session(model: Model, a: &mut IntVector, commands: &str) -> (Summary, String) {
        let mut out = vec![];
        let summary = start(
            model,
            a,
            commands.as_bytes(),
            &mut out,
            &mut Logs::disabled(),
        )
        .unwrap();
        (summary, String::from_utf8(out).unwrap())
    }

    #[test]
    fn scenario_dynamic() {
        for model in [Model::SparseDynamic, Model::SegmentDynamic] {
            let mut a = scenario_array();
            let commands = "Q 0 9\nQ 2 5\nQ 1 5\nU 3 0\nQ 2 5\nexit\nQ 0 9\n";
            let (summary, out) = session(model, &mut a, commands);
            assert_eq!(
                summary,
                Summary {
                    queries: 4,
                    updates: 1,
                    rejected: 0
                }
            );
            assert!(
                out.contains("Minimum of [0, 9] is at index 6, A[6] = 1"),
                "{out}"
            );
            assert!(
                out.contains("Minimum of [2, 5] is at index 3, A[3] = 2"),
                "{out}"
            );
            assert!(
                out.contains("Minimum of [1, 5] is at index 3, A[3] = 2"),
                "{out}"
            );
            assert!(out.contains("Set A[3] = 0."), "{out}");
            assert!(
                out.contains("Minimum of [2, 5] is at index 3, A[3] = 0"),
                "{out}"
            );
            assert!(out.ends_with("Exiting.\n"));
            assert_eq!(a.get(3), 0);
        }
    }

    #[test]
    fn static_rejects_updates() {
        for model in [Model::SparseStatic, Model::SegmentStatic] {
            let mut a = scenario_array();
            let (summary, out) = session(model, &mut a, "0 9\nU 3 0\n2 5\n");
            assert_eq!(
                summary,
                Summary {
                    queries: 2,
                    updates: 0,
                    rejected: 1
                }
            );
            assert!(out.contains("not supported in static mode"), "{out}");
            assert!(!out.contains("U i v"), "{out}");
            assert_eq!(a.get(3), 2);
        }
    }

    #[test]
    fn bounds_are_sorted_and_clamped() {
        let mut a = scenario_array();
        let (summary, out) = session(
            Model::SegmentDynamic,
            &mut a,
            "Q 5 2\nQ -4 3\nQ 7 100\nQ -5 -1\nU 10 1\nQ x\n\n",
        );
        assert!(out.contains("Minimum of [2, 5] is at index 3"), "{out}");
        assert!(out.contains("Minimum of [0, 3] is at index 3"), "{out}");
        assert!(out.contains("Minimum of [7, 9] is at index 9"), "{out}");
        assert!(out.contains("No result for [-5, -1]"), "{out}");
        assert!(out.contains("Index 10 out of bounds"), "{out}");
        assert!(out.contains("Invalid input"), "{out}");
        assert_eq!(
            summary,
            Summary {
                queries: 3,
                updates: 0,
                rejected: 3
            }
        );
    }

    #[test]
    fn wide_update_is_stored() {
        for model in [Model::SparseDynamic, Model::SegmentDynamic] {
            let mut a = scenario_array();
            assert_eq!(a.width(), 4);
            let (summary, out) = session(model, &mut a, "U 8 100000\nQ 7 9\nU 6 0\nQ 0 9\n");
            assert_eq!(summary.updates, 2);
            assert!(out.contains("Set A[8] = 100000."), "{out}");
            assert!(
                out.contains("Minimum of [7, 9] is at index 9, A[9] = 2"),
                "{out}"
            );
            assert!(
                out.contains("Minimum of [0, 9] is at index 6, A[6] = 0"),
                "{out}"
            );
            assert_eq!(a.width(), 17);
            assert_eq!(a.get(8), 100000);
        }
    }

    #[test]
    fn rows_are_logged() {
        let dir = tempfile::tempdir().unwrap();
        let model = Model::SegmentDynamic;
        let mut logs = Logs::open(dir.path(), model).unwrap();
        let mut a = scenario_array();
        start(
            model,
            &mut a,
            "Q 0 9\nQ 2 5\nU 3 0\nU 99 1\nQ 3 3\n".as_bytes(),
            std::io::sink(),
            &mut logs,
        )
        .unwrap();
        drop(logs);

        let builds: Vec<BuildRecord> = read_records(&dir.path().join(model.build_log())).unwrap();
        assert_eq!(builds.len(), 1);
        assert_eq!(builds[0].size, 10);
        assert!(builds[0].rmq_mb > 0.0);

        let queries: Vec<QueryRecord> = read_records(&dir.path().join(model.query_log())).unwrap();
        let ranges: Vec<_> = queries.iter().map(|q| (q.size, q.range)).collect();
        assert_eq!(ranges, vec![(10, 10), (10, 4), (10, 1)]);

        let update_log = dir.path().join(model.update_log().unwrap());
        let updates: Vec<UpdateRecord> = read_records(&update_log).unwrap();
        assert_eq!(updates.len(), 1);
        assert_eq!((updates[0].index, updates[0].value), (3, 0));
        let text = fs::read_to_string(&update_log).unwrap();
        assert!(text.starts_with("size,index,value,update_ns\n"), "{text}");
    }
}
