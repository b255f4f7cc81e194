//! Summaries of the timing logs, rendered as LaTeX tables and pgfplots charts.

use std::{
    collections::{BTreeMap, BTreeSet},
    path::Path,
};

use itertools::Itertools;
use serde::de::DeserializeOwned;

use crate::{
    error::Result,
    model::Model,
    timing::{read_records, BuildRecord, QueryRecord, UpdateRecord},
};

const PACKAGES: &str = "% Required packages: booktabs, float, multirow, pgfplots";

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ReportKind {
    /// Memory and build time.
    Build,
    Query,
    /// Dynamic models only.
    Update,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stats {
    pub mean: f64,
    /// Sample standard deviation; 0 for a single sample.
    pub std: f64,
    pub count: usize,
}

impl Stats {
    pub fn new(samples: &[f64]) -> Option<Stats> {
        let count = samples.len();
        if count == 0 {
            return None;
        }
        let mean = samples.iter().sum::<f64>() / count as f64;
        let std = if count > 1 {
            let squares: f64 = samples.iter().map(|x| (x - mean).powi(2)).sum();
            (squares / (count - 1) as f64).sqrt()
        } else {
            0.0
        };
        Some(Stats { mean, std, count })
    }
}

/// Stats per array size.
pub type BySize = BTreeMap<usize, Stats>;

/// Group `(size, sample)` pairs by size.
pub fn summarize(samples: impl IntoIterator<Item = (usize, f64)>) -> BySize {
    samples
        .into_iter()
        .into_group_map()
        .into_iter()
        .filter_map(|(size, xs)| Some((size, Stats::new(&xs)?)))
        .collect()
}

/// Records of every `(model, file)` log in `dir`. Missing files are skipped.
fn load<T: DeserializeOwned>(
    dir: &Path,
    logs: &[(Model, String)],
) -> Result<BTreeMap<Model, Vec<T>>> {
    let mut records = BTreeMap::new();
    for (model, name) in logs {
        let path = dir.join(name);
        if !path.exists() {
            log::warn!("{} not found, skipping {model}", path.display());
            continue;
        }
        records.insert(*model, read_records(&path)?);
    }
    Ok(records)
}

fn by_model<T>(
    records: &BTreeMap<Model, Vec<T>>,
    sample: impl Fn(&T) -> (usize, f64),
) -> BTreeMap<Model, BySize> {
    records
        .iter()
        .map(|(&model, rows)| (model, summarize(rows.iter().map(&sample))))
        .collect()
}

fn sizes(data: &BTreeMap<Model, BySize>) -> BTreeSet<usize> {
    data.values()
        .flat_map(|by_size| by_size.keys().copied())
        .collect()
}

fn cell(data: &BTreeMap<Model, BySize>, model: Model, size: usize) -> Option<&Stats> {
    data.get(&model)?.get(&size)
}

fn table_start(lines: &mut Vec<String>, caption: &str, colsep: &str, columns: &str) {
    lines.push(r"\begin{table}[H]".to_string());
    lines.push(r"\centering".to_string());
    lines.push(format!(r"\caption{{{caption}}}"));
    lines.push(r"\renewcommand{\arraystretch}{1.2}".to_string());
    lines.push(format!(r"\setlength{{\tabcolsep}}{{{colsep}}}"));
    lines.push(format!(r"\begin{{tabular}}{{{columns}}}"));
    lines.push(r"\toprule".to_string());
}

fn table_end(lines: &mut Vec<String>) {
    lines.push(r"\bottomrule".to_string());
    lines.push(r"\end{tabular}".to_string());
    lines.push(r"\end{table}".to_string());
}

/// One column per model with the mean, formatted with `precision` decimals.
pub fn mean_table(
    caption: &str,
    models: &[Model],
    data: &BTreeMap<Model, BySize>,
    precision: usize,
) -> String {
    let mut lines = vec![];
    let columns = format!("r{}", "c".repeat(models.len()));
    table_start(&mut lines, caption, "6pt", &columns);
    let mut header = vec![r"\textbf{Size}".to_string()];
    for model in models {
        let label = model.label();
        header.push(format!(r"\textbf{{{label}}}"));
    }
    lines.push(format!(r"{}\\", header.join(" & ")));
    lines.push(r"\midrule".to_string());
    for size in sizes(data) {
        let mut row = vec![size.to_string()];
        for &model in models {
            row.push(match cell(data, model, size) {
                Some(stats) => format!("{:.precision$}", stats.mean),
                None => "--".to_string(),
            });
        }
        lines.push(format!(r"{}\\", row.join(" & ")));
    }
    table_end(&mut lines);
    lines.join("\n")
}

/// Two columns per model: mean and standard deviation.
pub fn mean_std_table(caption: &str, models: &[Model], data: &BTreeMap<Model, BySize>) -> String {
    let mut lines = vec![];
    let columns = format!("r{}", "cc".repeat(models.len()));
    table_start(&mut lines, caption, "4pt", &columns);
    let mut header = vec![r"\multirow{2}{*}{\textbf{Size}}".to_string()];
    for model in models {
        let label = model.label();
        header.push(format!(r"\multicolumn{{2}}{{c}}{{\textbf{{{label}}}}}"));
    }
    lines.push(format!(r"{}\\", header.join(" & ")));
    let rules = (0..models.len())
        .map(|k| format!(r"\cmidrule(lr){{{}-{}}}", 2 * k + 2, 2 * k + 3))
        .join("");
    lines.push(rules);
    let mut header = vec![String::new()];
    for _ in models {
        header.push(r"\textbf{Mean}".to_string());
        header.push(r"\textbf{Std.}".to_string());
    }
    lines.push(format!(r"{}\\", header.join(" & ")));
    lines.push(r"\midrule".to_string());
    for size in sizes(data) {
        let mut row = vec![size.to_string()];
        for &model in models {
            match cell(data, model, size) {
                Some(stats) => {
                    row.push(format!("{:.2}", stats.mean));
                    row.push(format!("{:.2}", stats.std));
                }
                None => row.extend(["--".to_string(), "--".to_string()]),
            }
        }
        lines.push(format!(r"{}\\", row.join(" & ")));
    }
    table_end(&mut lines);
    lines.join("\n")
}

fn style(model: Model) -> (&'static str, &'static str) {
    match model {
        Model::SparseStatic => ("o", "blue"),
        Model::SparseDynamic => ("square*", "cyan!70!black"),
        Model::SegmentStatic => ("triangle*", "orange"),
        Model::SegmentDynamic => ("diamond*", "red!80!black"),
    }
}

/// A pgfplots line chart of the means, one line per model.
pub fn plot(
    ylabel: &str,
    caption: &str,
    models: &[Model],
    data: &BTreeMap<Model, BySize>,
) -> String {
    let mut lines = vec![
        r"\begin{figure}[H]".to_string(),
        r"\centering".to_string(),
        r"\begin{tikzpicture}".to_string(),
        r"\begin{axis}[".to_string(),
        r"  width=\textwidth,".to_string(),
        r"  height=7cm,".to_string(),
        r"  xlabel={Array size ($n$)},".to_string(),
        format!("  ylabel={{{ylabel}}},"),
        r"  grid=major,".to_string(),
        r"  legend style={at={(0.5,-0.15)},anchor=north,legend columns=2},".to_string(),
        r"  yticklabel style={/pgf/number format/fixed},".to_string(),
        r"  enlargelimits=0.05".to_string(),
        "]".to_string(),
    ];
    for model in models {
        let Some(by_size) = data.get(model).filter(|s| !s.is_empty()) else {
            continue;
        };
        let (mark, color) = style(*model);
        let options = format!("mark={mark}, color={color}");
        lines.push(format!(r"\addplot+[{options}] coordinates {{"));
        for (size, stats) in by_size {
            lines.push(format!("({size},{})", stats.mean));
        }
        lines.push("};".to_string());
        lines.push(format!(r"\addlegendentry{{{}}}", model.label()));
    }
    lines.push(r"\end{axis}".to_string());
    lines.push(r"\end{tikzpicture}".to_string());
    lines.push(format!(r"\caption{{{caption}}}"));
    lines.push(r"\end{figure}".to_string());
    lines.join("\n")
}

/// Render the report of `kind` from the logs in `dir`.
pub fn render(kind: ReportKind, dir: &Path) -> Result<String> {
    let mut out = vec![PACKAGES.to_string()];
    match kind {
        ReportKind::Build => {
            let logs = Model::ALL.map(|m| (m, m.build_log()));
            let builds: BTreeMap<Model, Vec<BuildRecord>> = load(dir, &logs)?;
            let memory = by_model(&builds, |r| (r.size, r.rmq_mb));
            let time = by_model(&builds, |r| (r.size, r.build_ns as f64));
            out.push(mean_table(
                "Mean memory used by each RMQ structure (MB).",
                &Model::ALL,
                &memory,
                4,
            ));
            out.push(mean_std_table(
                "Mean build time and standard deviation (ns) of each RMQ structure.",
                &Model::ALL,
                &time,
            ));
        }
        ReportKind::Query => {
            let logs = Model::ALL.map(|m| (m, m.query_log()));
            let queries: BTreeMap<Model, Vec<QueryRecord>> = load(dir, &logs)?;
            let time = by_model(&queries, |r| (r.size, r.query_ns as f64));
            out.push(mean_std_table(
                "Mean query time and standard deviation (ns) per RMQ model.",
                &Model::ALL,
                &time,
            ));
            out.push(plot(
                "Mean query time (ns)",
                "Mean query time of each RMQ structure.",
                &Model::ALL,
                &time,
            ));
        }
        ReportKind::Update => {
            let logs: Vec<(Model, String)> = Model::ALL
                .into_iter()
                .filter_map(|m| Some((m, m.update_log()?)))
                .collect();
            let models: Vec<Model> = logs.iter().map(|&(m, _)| m).collect();
            let updates: BTreeMap<Model, Vec<UpdateRecord>> = load(dir, &logs)?;
            let time = by_model(&updates, |r| (r.size, r.update_ns as f64));
            out.push(mean_std_table(
                "Mean update time and standard deviation (ns) per dynamic RMQ model.",
                &models,
                &time,
            ));
            out.push(plot(
                "Mean update time (ns)",
                "Mean update time: full rebuild against point update.",
                &models,
                &time,
            ));
        }
    }
    Ok(out.join("\n\n"))
}

#[cfg(test)]
mod test {
    use std::fs;

    use super::*;

    #[test]
    fn stats() {
        let s = Stats::new(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert_eq!(s.mean, 5.0);
        assert!((s.std - 2.138089935299395).abs() < 1e-9, "{}", s.std);
        assert_eq!(s.count, 8);
        assert_eq!(Stats::new(&[3.5]).unwrap().std, 0.0);
        assert_eq!(Stats::new(&[]), None);
    }

    #[test]
    fn grouped_by_size() {
        let by_size = summarize([(1000, 1.0), (2000, 10.0), (1000, 3.0)]);
        assert_eq!(by_size.keys().copied().collect::<Vec<_>>(), vec![1000, 2000]);
        assert_eq!(by_size[&1000].mean, 2.0);
        assert_eq!(by_size[&2000].count, 1);
    }

    #[test]
    fn missing_cells() {
        let mut data = BTreeMap::new();
        data.insert(Model::SparseStatic, summarize([(10, 1.0), (10, 3.0)]));
        data.insert(Model::SegmentDynamic, summarize([(20, 5.0)]));
        let table = mean_std_table("caption", &Model::ALL, &data);
        let first = r"10 & 2.00 & 1.41 & -- & -- & -- & -- & -- & --\\";
        let second = r"20 & -- & -- & -- & -- & -- & -- & 5.00 & 0.00\\";
        assert!(table.contains(first), "{table}");
        assert!(table.contains(second), "{table}");
        assert!(table.contains(r"\cmidrule(lr){8-9}"), "{table}");
        assert!(table.contains(r"\begin{tabular}{rcccccccc}"), "{table}");

        let table = mean_table("caption", &Model::ALL, &data, 4);
        assert!(table.contains(r"10 & 2.0000 & -- & -- & --\\"), "{table}");
    }

    #[test]
    fn render_from_logs() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(Model::SegmentDynamic.update_log().unwrap()),
            "size,index,value,update_ns\n1000,3,7,100\n1000,5,2,300\n",
        )
        .unwrap();
        fs::write(
            dir.path().join(Model::SparseDynamic.update_log().unwrap()),
            "size,index,value,update_ns\n1000,3,7,90000\n",
        )
        .unwrap();
        let report = render(ReportKind::Update, dir.path()).unwrap();
        let row = r"1000 & 90000.00 & 0.00 & 200.00 & 141.42\\";
        let legend = r"\addlegendentry{Seg-Dynamic}";
        assert!(report.contains(row), "{report}");
        assert!(report.contains(legend), "{report}");
        assert!(!report.contains("ST-Static"), "{report}");

        // No logs at all still renders empty tables.
        let empty = tempfile::tempdir().unwrap();
        let report = render(ReportKind::Query, empty.path()).unwrap();
        assert!(report.contains(r"\begin{tabular}"));
        assert!(!report.contains(r"\addplot"));
    }
}
