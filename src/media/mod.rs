//! Media records and where they live.

pub(crate) mod ingest;
pub(crate) mod record;
pub(crate) mod store;
