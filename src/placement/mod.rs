//! Decoration placement: safe-zone anchor points, candidate resolution and the auto-placement
//! orchestration that runs at most once per media record.

pub(crate) mod auto;
pub(crate) mod candidates;
pub(crate) mod safe_zone;
