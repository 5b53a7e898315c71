/// Recommendations data layer
///
/// - `state` - cache-backed list with fetch/generate/delete
/// - `hook` - the same actions paired with user-facing notices
mod hook;
mod state;

pub use hook::RecommendationsHook;
pub use state::{Recommendations, merge_views};
