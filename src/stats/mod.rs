//! Group-wise aggregation: canonical category groups and index curves.

pub mod curve;
pub mod group;
pub mod summary;

pub use curve::{Curve, CurvePoint, ValueGuard, curve_summary};
pub use group::{
    CanonicalEntry, CanonicalGroup, CanonicalOrder, CategorySummary, Group, GroupKey, KeyColumn,
    KeyMatch, KeyValue, canonical_groups, group_by, group_summary, quad_label,
};
pub use summary::Summary;
