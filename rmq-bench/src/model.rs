use std::fmt;

/// The four benchmarked configurations: each engine, with and without updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, clap::ValueEnum)]
pub enum Model {
    SparseStatic,
    SparseDynamic,
    SegmentStatic,
    SegmentDynamic,
}

impl Model {
    pub const ALL: [Model; 4] = [
        Model::SparseStatic,
        Model::SparseDynamic,
        Model::SegmentStatic,
        Model::SegmentDynamic,
    ];

    /// Column label in reports.
    pub fn label(self) -> &'static str {
        match self {
            Model::SparseStatic => "ST-Static",
            Model::SparseDynamic => "ST-Dynamic",
            Model::SegmentStatic => "Seg-Static",
            Model::SegmentDynamic => "Seg-Dynamic",
        }
    }

    /// Whether `U` commands are accepted.
    pub fn is_dynamic(self) -> bool {
        matches!(self, Model::SparseDynamic | Model::SegmentDynamic)
    }

    fn stem(self) -> &'static str {
        match self {
            Model::SparseStatic => "sparse-table-static",
            Model::SparseDynamic => "sparse-table-dynamic",
            Model::SegmentStatic => "segment-tree-static",
            Model::SegmentDynamic => "segment-tree-dynamic",
        }
    }

    pub fn build_log(self) -> String {
        format!("build-{}.csv", self.stem())
    }

    pub fn query_log(self) -> String {
        format!("query-{}.csv", self.stem())
    }

    /// Static models never update, so they have no update log.
    pub fn update_log(self) -> Option<String> {
        self.is_dynamic()
            .then(|| format!("update-{}.csv", self.stem()))
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn log_names_are_distinct() {
        let mut names: Vec<String> = Model::ALL
            .iter()
            .flat_map(|m| [Some(m.build_log()), Some(m.query_log()), m.update_log()])
            .flatten()
            .collect();
        assert_eq!(names.len(), 10);
        names.sort();
        names.dedup();
        assert_eq!(names.len(), 10);
        assert_eq!(
            Model::SegmentDynamic.update_log().as_deref(),
            Some("update-segment-tree-dynamic.csv")
        );
        assert_eq!(Model::SparseStatic.update_log(), None);
    }
}
