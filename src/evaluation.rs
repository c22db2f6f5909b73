use std::cmp::Ordering;
use std::collections::BTreeMap;

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_pcg::Pcg64;

use crate::error::{PipelineError, Result};
use crate::knn::model::{KnnModel, KnnParams};
use crate::knn::trainset::Trainset;
use crate::metrics::precision::Precision;
use crate::metrics::recall::Recall;
use crate::metrics::RankingMetric;
use crate::reviews::ReviewTable;

pub const DEFAULT_FOLDS: usize = 5;
pub const DEFAULT_EVAL_K: usize = 5;
pub const DEFAULT_RELEVANCE_THRESHOLD: f64 = 4.0;

/// Seeded k-fold splitter: shuffles row indices once, then hands out
/// contiguous chunks as held-out test folds.
pub struct KFold {
    folds: usize,
    seed: u64,
}

impl KFold {
    pub fn new(folds: usize, seed: u64) -> KFold {
        KFold { folds, seed }
    }

    /// Returns (train indices, test indices) per fold. The test folds
    /// partition `0..qty_rows`; sizes differ by at most one.
    pub fn split(&self, qty_rows: usize) -> Result<Vec<(Vec<usize>, Vec<usize>)>> {
        if self.folds < 2 {
            return Err(PipelineError::InvalidParameter(
                "cross-validation needs at least 2 folds".to_string(),
            ));
        }
        if qty_rows < self.folds {
            return Err(PipelineError::InvalidParameter(format!(
                "{} rows cannot be split into {} folds",
                qty_rows, self.folds
            )));
        }

        let mut indices: Vec<usize> = (0..qty_rows).collect();
        let mut rng = Pcg64::seed_from_u64(self.seed);
        indices.shuffle(&mut rng);

        let base_size = qty_rows / self.folds;
        let remainder = qty_rows % self.folds;
        let mut splits = Vec::with_capacity(self.folds);
        let mut offset = 0;
        for fold in 0..self.folds {
            let fold_size = base_size + usize::from(fold < remainder);
            let test: Vec<usize> = indices[offset..offset + fold_size].to_vec();
            let train: Vec<usize> = indices[..offset]
                .iter()
                .chain(&indices[offset + fold_size..])
                .copied()
                .collect();
            splits.push((train, test));
            offset += fold_size;
        }
        Ok(splits)
    }
}

pub struct CrossValidationReport {
    pub fold_precisions: Vec<f64>,
    pub fold_recalls: Vec<f64>,
    pub mean_precision: f64,
    pub mean_recall: f64,
}

/// Cross-validated Precision@K / Recall@K of the neighborhood model over a
/// category corpus. Fits on F-1 folds, scores the held-out fold, averages
/// per user within a fold and then across folds. This path is independent of
/// the per-synthetic-user training loop.
pub fn cross_validate(
    corpus: &ReviewTable,
    params: &KnnParams,
    folds: usize,
    eval_k: usize,
    threshold: f64,
) -> Result<CrossValidationReport> {
    let triples: Vec<(&str, &str, f64)> = corpus
        .rows()
        .iter()
        .map(|row| (row.reviewer.as_str(), row.item_id.as_str(), row.rating))
        .collect();

    let splits = KFold::new(folds, params.seed).split(triples.len())?;

    let mut fold_precisions = Vec::with_capacity(folds);
    let mut fold_recalls = Vec::with_capacity(folds);
    for (train_indices, test_indices) in splits {
        let trainset =
            Trainset::from_triples(train_indices.iter().map(|&index| triples[index]));
        let model = KnnModel::fit(trainset, params.clone());

        // BTreeMap keeps user iteration (and thus float accumulation)
        // deterministic across runs.
        let mut per_user: BTreeMap<&str, Vec<(f64, f64)>> = BTreeMap::new();
        for &index in &test_indices {
            let (user_id, item_id, true_rating) = triples[index];
            let estimate = model.estimate(user_id, item_id);
            per_user
                .entry(user_id)
                .or_default()
                .push((estimate, true_rating));
        }

        let mut precision = Precision::new(eval_k, threshold);
        let mut recall = Recall::new(eval_k, threshold);
        for ranked_ratings in per_user.values_mut() {
            ranked_ratings.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));
            precision.add(ranked_ratings);
            recall.add(ranked_ratings);
        }
        log::debug!(
            "fold over {} test rows: {}={:.4} {}={:.4}",
            test_indices.len(),
            precision.get_name(),
            precision.result(),
            recall.get_name(),
            recall.result()
        );
        fold_precisions.push(precision.result());
        fold_recalls.push(recall.result());
    }

    let mean_precision = fold_precisions.iter().sum::<f64>() / fold_precisions.len() as f64;
    let mean_recall = fold_recalls.iter().sum::<f64>() / fold_recalls.len() as f64;
    Ok(CrossValidationReport {
        fold_precisions,
        fold_recalls,
        mean_precision,
        mean_recall,
    })
}

#[cfg(test)]
mod evaluation_test {
    use super::*;
    use crate::reviews::review;

    #[test]
    fn should_partition_rows_into_disjoint_folds() {
        let splits = KFold::new(3, 42).split(10).unwrap();
        assert_eq!(3, splits.len());

        let mut all_test_indices: Vec<usize> = splits
            .iter()
            .flat_map(|(_, test)| test.iter().copied())
            .collect();
        all_test_indices.sort_unstable();
        assert_eq!((0..10).collect::<Vec<usize>>(), all_test_indices);

        for (train, test) in &splits {
            assert_eq!(10, train.len() + test.len());
            assert!(test.iter().all(|index| !train.contains(index)));
            assert!(test.len() == 3 || test.len() == 4);
        }
    }

    #[test]
    fn should_split_deterministically_for_a_fixed_seed() {
        let first = KFold::new(5, 12345).split(23).unwrap();
        let second = KFold::new(5, 12345).split(23).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn should_reject_degenerate_fold_counts() {
        assert!(KFold::new(1, 0).split(10).is_err());
        assert!(KFold::new(5, 0).split(3).is_err());
    }

    #[test]
    fn should_cross_validate_a_small_corpus() {
        let mut rows = Vec::new();
        for reviewer in ["A", "B", "C", "D", "E"] {
            for (item, rating) in [("BeerA", 4.5), ("BeerB", 4.0), ("BeerC", 2.0)] {
                rows.push(review("IPA", item, reviewer, rating));
            }
        }
        let corpus = ReviewTable::new(rows);
        let params = KnnParams {
            min_k: 1,
            ..KnnParams::default()
        };

        let report = cross_validate(&corpus, &params, 3, 5, 4.0).unwrap();
        assert_eq!(3, report.fold_precisions.len());
        assert!((0.0..=1.0).contains(&report.mean_precision));
        assert!((0.0..=1.0).contains(&report.mean_recall));

        // identical seed, identical report
        let again = cross_validate(&corpus, &params, 3, 5, 4.0).unwrap();
        assert_eq!(report.fold_precisions, again.fold_precisions);
        assert_eq!(report.fold_recalls, again.fold_recalls);
    }
}
