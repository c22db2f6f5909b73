pub mod precision;
pub mod recall;

/// An offline ranking metric averaged over users. `add` consumes one user's
/// (estimate, true rating) pairs, ordered descending by estimate.
pub trait RankingMetric {
    fn add(&mut self, ranked_ratings: &[(f64, f64)]);
    fn result(&self) -> f64;
    fn get_name(&self) -> String;
}
