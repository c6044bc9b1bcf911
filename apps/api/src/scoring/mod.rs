// Scoring core: job spec model, weights, the weighted engine and the batch ranker.
// Pure and synchronous; nothing here reads configuration or performs I/O.

pub mod engine;
pub mod job_spec;
pub mod ranker;
pub mod weights;
