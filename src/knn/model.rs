use std::cmp::Ordering;

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_pcg::Pcg64;

use crate::knn::trainset::Trainset;
use crate::knn::Prediction;

pub const DEFAULT_NEIGHBORHOOD_SIZE_K: usize = 50;
pub const DEFAULT_MIN_NEIGHBORS: usize = 5;
pub const DEFAULT_SEED: u64 = 12345;

/// Hyperparameters of the neighborhood model. The seed drives the tie-break
/// permutation among equal similarities, so it must be passed explicitly per
/// fit rather than drawn from a process-global generator.
#[derive(Debug, Clone)]
pub struct KnnParams {
    pub k: usize,
    pub min_k: usize,
    pub user_based: bool,
    pub seed: u64,
}

impl Default for KnnParams {
    fn default() -> Self {
        KnnParams {
            k: DEFAULT_NEIGHBORHOOD_SIZE_K,
            min_k: DEFAULT_MIN_NEIGHBORS,
            user_based: true,
            seed: DEFAULT_SEED,
        }
    }
}

/// A fitted k-nearest-neighbor model with cosine similarity over users or
/// items. Estimates are similarity-weighted means of neighbor ratings; when
/// fewer than `min_k` neighbors contribute, the global mean is used instead.
pub struct KnnModel {
    trainset: Trainset,
    params: KnnParams,
    similarities: Vec<Vec<f64>>,
    tie_rank: Vec<usize>,
}

impl KnnModel {
    pub fn fit(trainset: Trainset, params: KnnParams) -> KnnModel {
        let axis_size = if params.user_based {
            trainset.n_users()
        } else {
            trainset.n_items()
        };
        let similarities = cosine_similarities(&trainset, params.user_based);

        // Seeded permutation ranking inner ids, used as the secondary sort
        // key among neighbors with equal similarity.
        let mut order: Vec<usize> = (0..axis_size).collect();
        let mut rng = Pcg64::seed_from_u64(params.seed);
        order.shuffle(&mut rng);
        let mut tie_rank = vec![0; axis_size];
        for (rank, &inner) in order.iter().enumerate() {
            tie_rank[inner] = rank;
        }

        KnnModel {
            trainset,
            params,
            similarities,
            tie_rank,
        }
    }

    pub fn trainset(&self) -> &Trainset {
        &self.trainset
    }

    /// Estimates a rating for one (user, item) pair, clipped to the rating
    /// scale. Unknown users or items fall back to the global mean.
    pub fn estimate(&self, user_id: &str, item_id: &str) -> f64 {
        let estimate = match (
            self.trainset.user_inner(user_id),
            self.trainset.item_inner(item_id),
        ) {
            (Some(user_inner), Some(item_inner)) => self.estimate_inner(user_inner, item_inner),
            _ => self.trainset.global_mean(),
        };
        Trainset::clip(estimate)
    }

    fn estimate_inner(&self, user_inner: usize, item_inner: usize) -> f64 {
        // user-based: neighbors are the other raters of the item;
        // item-based: neighbors are the other items the user rated.
        let (target, candidates) = if self.params.user_based {
            (user_inner, self.trainset.ratings_of_item(item_inner))
        } else {
            (item_inner, self.trainset.ratings_by_user(user_inner))
        };

        let mut neighbors: Vec<(f64, usize, f64)> = candidates
            .iter()
            .filter(|(other, _)| *other != target)
            .map(|&(other, rating)| (self.similarities[target][other], other, rating))
            .collect();
        neighbors.sort_by(|a, b| {
            b.0.partial_cmp(&a.0)
                .unwrap_or(Ordering::Equal)
                .then_with(|| self.tie_rank[a.1].cmp(&self.tie_rank[b.1]))
        });

        let mut sum_similarity = 0.0;
        let mut sum_weighted_ratings = 0.0;
        let mut actual_k = 0;
        for &(similarity, _, rating) in neighbors.iter().take(self.params.k) {
            if similarity > 0.0 {
                sum_similarity += similarity;
                sum_weighted_ratings += similarity * rating;
                actual_k += 1;
            }
        }

        if actual_k < self.params.min_k || sum_similarity == 0.0 {
            self.trainset.global_mean()
        } else {
            sum_weighted_ratings / sum_similarity
        }
    }

    /// Scores every (user, item, true rating) triple of a test set.
    pub fn test(&self, testset: &[(String, String, f64)]) -> Vec<Prediction> {
        testset
            .iter()
            .map(|(user_id, item_id, true_rating)| Prediction {
                user_id: user_id.clone(),
                item_id: item_id.clone(),
                true_rating: *true_rating,
                estimate: self.estimate(user_id, item_id),
            })
            .collect()
    }
}

/// Pairwise cosine similarity over the co-rated entries only, like the
/// classic neighborhood formulation: sim(x, y) =
/// Σ r_x·r_y / (sqrt(Σ r_x²)·sqrt(Σ r_y²)) over the common axis entries.
/// Pairs without co-ratings get similarity 0.
fn cosine_similarities(trainset: &Trainset, user_based: bool) -> Vec<Vec<f64>> {
    let (axis_size, opposite_size) = if user_based {
        (trainset.n_users(), trainset.n_items())
    } else {
        (trainset.n_items(), trainset.n_users())
    };

    let mut products = vec![vec![0.0_f64; axis_size]; axis_size];
    let mut squares_x = vec![vec![0.0_f64; axis_size]; axis_size];
    let mut squares_y = vec![vec![0.0_f64; axis_size]; axis_size];

    for opposite in 0..opposite_size {
        let ratings = if user_based {
            trainset.ratings_of_item(opposite)
        } else {
            trainset.ratings_by_user(opposite)
        };
        for (position, &(x, rating_x)) in ratings.iter().enumerate() {
            for &(y, rating_y) in &ratings[position + 1..] {
                let (low, high, rating_low, rating_high) = if x < y {
                    (x, y, rating_x, rating_y)
                } else {
                    (y, x, rating_y, rating_x)
                };
                products[low][high] += rating_low * rating_high;
                squares_x[low][high] += rating_low * rating_low;
                squares_y[low][high] += rating_high * rating_high;
            }
        }
    }

    let mut similarities = vec![vec![0.0_f64; axis_size]; axis_size];
    for x in 0..axis_size {
        similarities[x][x] = 1.0;
        for y in (x + 1)..axis_size {
            let denominator = (squares_x[x][y] * squares_y[x][y]).sqrt();
            let similarity = if denominator > 0.0 {
                products[x][y] / denominator
            } else {
                0.0
            };
            similarities[x][y] = similarity;
            similarities[y][x] = similarity;
        }
    }
    similarities
}
