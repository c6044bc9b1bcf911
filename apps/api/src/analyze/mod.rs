// Ranking API: resolves a batch from the request, extracts profiles and ranks them.
// Also fronts the scraping agent so a finished run can feed the ranker.

pub mod handlers;
pub mod source;
