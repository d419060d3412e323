//! SQL for the consultant tables. Every read that takes a `consultant_id` is scoped to it.

pub mod candidates;
pub mod consultants;
pub mod documents;
pub mod pools;
pub mod verifications;
pub mod tx;
