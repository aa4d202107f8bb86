//! Tower grouping, aggregation and report reshaping

pub mod aggregator;
pub mod consistency;
pub mod grouper;
pub mod transformer;

pub use aggregator::{aggregate, AggregationPlan, BandwidthTotals};
pub use consistency::{check_group_consistency, Inconsistency};
pub use grouper::{group_rows, TowerGroup, TowerGroups};
pub use transformer::{transform, ReportContext, REPORT_COLUMNS};
