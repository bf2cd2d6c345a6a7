//! Stylistic color filters.
//!
//! Filters are a static catalog of ordered pixel adjustments. They always run on a bitmap decoded
//! fresh from the original source, so switching filters never compounds earlier passes.

pub(crate) mod catalog;
pub(crate) mod pipeline;
pub(crate) mod preview;
