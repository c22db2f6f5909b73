use std::cmp;

use crate::metrics::RankingMetric;

pub struct Precision {
    sum_of_scores: f64,
    qty: usize,
    length: usize,
    threshold: f64,
}

impl Precision {
    /// Returns a Precision@K evaluation metric with threshold semantics:
    /// an item counts as recommended when its estimate reaches `threshold`
    /// within the top `length`, and as relevant when its true rating does.
    /// A user without recommendations scores 1 by convention.
    ///
    /// # Arguments
    ///
    /// * `length` - the length aka 'k' that will be used for evaluation.
    /// * `threshold` - the rating bar for relevance and recommendation.
    ///
    pub fn new(length: usize, threshold: f64) -> Precision {
        Precision {
            sum_of_scores: 0_f64,
            qty: 0,
            length,
            threshold,
        }
    }
}

impl RankingMetric for Precision {
    fn add(&mut self, ranked_ratings: &[(f64, f64)]) {
        self.qty += 1;
        let top = &ranked_ratings[..cmp::min(ranked_ratings.len(), self.length)];

        let qty_recommended = top
            .iter()
            .filter(|(estimate, _)| *estimate >= self.threshold)
            .count();
        let qty_relevant_and_recommended = top
            .iter()
            .filter(|(estimate, true_rating)| {
                *estimate >= self.threshold && *true_rating >= self.threshold
            })
            .count();

        self.sum_of_scores += if qty_recommended == 0 {
            1.0
        } else {
            qty_relevant_and_recommended as f64 / qty_recommended as f64
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
        format!("Precision@{}", self.length)
    }
}

#[cfg(test)]
mod precision_test {
    use super::*;

    #[test]
    fn should_calculate_precision() {
        let mut mymetric = Precision::new(3, 4.0);
        // top-3 by estimate: two recommended, one of them relevant
        let ranked_ratings = vec![(4.8, 4.5), (4.2, 2.0), (3.0, 5.0), (2.0, 4.0)];
        mymetric.add(&ranked_ratings);
        assert_eq!(0.5, mymetric.result());
        assert_eq!("Precision@3", mymetric.get_name());
    }

    #[test]
    fn should_score_one_without_recommendations() {
        let mut mymetric = Precision::new(5, 4.0);
        let ranked_ratings = vec![(3.0, 5.0), (2.0, 4.5)];
        mymetric.add(&ranked_ratings);
        assert_eq!(1.0, mymetric.result());
    }

    #[test]
    fn should_average_over_users() {
        let mut mymetric = Precision::new(2, 4.0);
        mymetric.add(&[(5.0, 5.0), (4.5, 4.5)]); // precision 1.0
        mymetric.add(&[(5.0, 1.0), (4.5, 1.0)]); // precision 0.0
        assert_eq!(0.5, mymetric.result());
    }
}
