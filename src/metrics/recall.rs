use std::cmp;

use crate::metrics::RankingMetric;

pub struct Recall {
    sum_of_scores: f64,
    qty: usize,
    length: usize,
    threshold: f64,
}

impl Recall {
    /// Returns a Recall@K evaluation metric with threshold semantics: the
    /// share of relevant items (true rating >= threshold anywhere in the
    /// ranking) that are both recommended and relevant within the top
    /// `length`. A user without relevant items scores 1 by convention.
    ///
    /// # Arguments
    ///
    /// * `length` - the length aka 'k' that will be used for evaluation.
    /// * `threshold` - the rating bar for relevance and recommendation.
    ///
    pub fn new(length: usize, threshold: f64) -> Recall {
        Recall {
            sum_of_scores: 0_f64,
            qty: 0,
            length,
            threshold,
        }
    }
}

impl RankingMetric for Recall {
    fn add(&mut self, ranked_ratings: &[(f64, f64)]) {
        self.qty += 1;
        let top = &ranked_ratings[..cmp::min(ranked_ratings.len(), self.length)];

        let qty_relevant = ranked_ratings
            .iter()
            .filter(|(_, true_rating)| *true_rating >= self.threshold)
            .count();
        let qty_relevant_and_recommended = top
            .iter()
            .filter(|(estimate, true_rating)| {
                *estimate >= self.threshold && *true_rating >= self.threshold
            })
            .count();

        self.sum_of_scores += if qty_relevant == 0 {
            1.0
        } else {
            qty_relevant_and_recommended as f64 / qty_relevant as f64
        };
    }

    fn result(&self) -> f64 {
        if self.qty > 0 {
            self.sum_of_scores / self.qty as f64
        } else {
            0.0
        }
    }

    fn get_name(&self) -> String {
        format!("Recall@{}", self.length)
    }
}
