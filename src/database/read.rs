//! Read plan: what to select from the source and how to split it

use crate::config::SourceConfig;
use crate::schema::quote_ident;
use std::collections::BTreeMap;
use std::fmt;

/// Option key carrying the read target
pub const OPT_DBTABLE: &str = "dbtable";
/// Option key for the partition column
pub const OPT_PARTITION_COLUMN: &str = "partitionColumn";
/// Option key for the partition lower bound
pub const OPT_LOWER_BOUND: &str = "lowerBound";
/// Option key for the partition upper bound
pub const OPT_UPPER_BOUND: &str = "upperBound";
/// Option key for the partition count
pub const OPT_NUM_PARTITIONS: &str = "numPartitions";

/// What the read selects from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadTarget {
    /// Whole table
    Table(String),
    /// Table restricted by a predicate, read as a derived subquery
    Filtered { table: String, predicate: String },
}

impl ReadTarget {
    pub fn from_config(source: &SourceConfig) -> Self {
        match &source.where_clause {
            Some(predicate) => ReadTarget::Filtered {
                table: source.table.clone(),
                predicate: predicate.clone(),
            },
            None => ReadTarget::Table(source.table.clone()),
        }
    }

    /// Relation expression inside `catalog`, usable after FROM
    pub fn to_relation(&self, catalog: &str) -> String {
        match self {
            ReadTarget::Table(table) => format!("{catalog}.{table}"),
            ReadTarget::Filtered { table, predicate } => {
                format!("(SELECT * FROM {catalog}.{table} WHERE {predicate}) AS filtered")
            }
        }
    }
}

/// `ORDERS` or `(ORDERS WHERE STATUS = 'OPEN')`
impl fmt::Display for ReadTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReadTarget::Table(table) => write!(f, "{table}"),
            ReadTarget::Filtered { table, predicate } => write!(f, "({table} WHERE {predicate})"),
        }
    }
}

/// Range partitioning of a read over one numeric column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadPartitioning {
    pub column: String,
    pub lower_bound: i64,
    pub upper_bound: i64,
    pub num_partitions: u32,
}

impl ReadPartitioning {
    /// One WHERE predicate per partition
    ///
    /// The bounds only decide the stride; they do not filter. The first
    /// partition takes everything below its upper edge plus NULLs, the
    /// last takes everything from its lower edge up. An empty result
    /// means a single unsplit read.
    pub fn predicates(&self) -> Vec<String> {
        let span = self.upper_bound.saturating_sub(self.lower_bound);
        if self.num_partitions <= 1 || span <= 0 {
            return Vec::new();
        }

        let requested = i64::from(self.num_partitions);
        let count = if span >= requested {
            requested
        } else {
            tracing::warn!(
                requested,
                span,
                "More partitions than values between bounds, using {span}"
            );
            span
        };
        if count <= 1 {
            return Vec::new();
        }

        let column = quote_ident(&self.column);
        let stride = self.upper_bound / count - self.lower_bound / count;
        let mut current = self.lower_bound;
        let mut predicates = Vec::with_capacity(count as usize);

        for i in 0..count {
            let lower = (i != 0).then_some(current);
            current = current.saturating_add(stride);
            let upper = (i != count - 1).then_some(current);

            let predicate = match (lower, upper) {
                (None, Some(u)) => format!("{column} < {u} OR {column} IS NULL"),
                (Some(l), Some(u)) => format!("{column} >= {l} AND {column} < {u}"),
                (Some(l), None) => format!("{column} >= {l}"),
                (None, None) => continue,
            };
            predicates.push(predicate);
        }

        predicates
    }
}

/// Complete description of the source read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadPlan {
    pub target: ReadTarget,
    pub partitioning: Option<ReadPartitioning>,
}

impl ReadPlan {
    pub fn from_config(source: &SourceConfig) -> Self {
        let partitioning = source
            .src_partition_column
            .as_ref()
            .map(|column| ReadPartitioning {
                column: column.clone(),
                lower_bound: source.partition_lower_bound,
                upper_bound: source.partition_upper_bound,
                num_partitions: source.num_partitions,
            });

        Self {
            target: ReadTarget::from_config(source),
            partitioning,
        }
    }

    /// Read options as handed to the engine, keyed by option name
    pub fn options(&self) -> BTreeMap<&'static str, String> {
        let mut options = BTreeMap::new();
        options.insert(OPT_DBTABLE, self.target.to_string());

        if let Some(p) = &self.partitioning {
            options.insert(OPT_PARTITION_COLUMN, p.column.clone());
            options.insert(OPT_LOWER_BOUND, p.lower_bound.to_string());
            options.insert(OPT_UPPER_BOUND, p.upper_bound.to_string());
            options.insert(OPT_NUM_PARTITIONS, p.num_partitions.to_string());
        }

        options
    }

    /// SQL for the full read; partitions become UNION ALL branches
    pub fn to_sql(&self, catalog: &str) -> String {
        let relation = self.target.to_relation(catalog);
        let predicates = self
            .partitioning
            .as_ref()
            .map(ReadPartitioning::predicates)
            .unwrap_or_default();

        if predicates.is_empty() {
            return format!("SELECT * FROM {relation}");
        }

        predicates
            .iter()
            .map(|p| format!("SELECT * FROM {relation} WHERE {p}"))
            .collect::<Vec<_>>()
            .join(" UNION ALL ")
    }
}
