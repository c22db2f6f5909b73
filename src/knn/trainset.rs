use hashbrown::HashMap;

use crate::pipeline::profiles::PreferenceRow;
use crate::reviews::ReviewTable;

/// Implicit rating scale of the corpus; estimates are clipped to it. The
/// lower bound is 0 because synthetic profiles rate un-chosen items 0.
pub const RATING_SCALE: (f64, f64) = (0.0, 5.0);

/// An in-memory user-item-rating matrix with dense inner ids, built fresh for
/// every model fit. Raw user and item ids are mapped to consecutive indices
/// in first-seen order.
#[derive(Debug, Clone)]
pub struct Trainset {
    users: Vec<String>,
    items: Vec<String>,
    user_to_inner: HashMap<String, usize>,
    item_to_inner: HashMap<String, usize>,
    user_ratings: Vec<Vec<(usize, f64)>>,
    item_ratings: Vec<Vec<(usize, f64)>>,
    qty_ratings: usize,
    global_mean: f64,
}

impl Trainset {
    pub fn from_triples<'a, I>(triples: I) -> Trainset
    where
        I: IntoIterator<Item = (&'a str, &'a str, f64)>,
    {
        let mut users: Vec<String> = Vec::new();
        let mut items: Vec<String> = Vec::new();
        let mut user_to_inner: HashMap<String, usize> = HashMap::new();
        let mut item_to_inner: HashMap<String, usize> = HashMap::new();
        let mut user_ratings: Vec<Vec<(usize, f64)>> = Vec::new();
        let mut item_ratings: Vec<Vec<(usize, f64)>> = Vec::new();
        let mut qty_ratings = 0;
        let mut rating_sum = 0.0;

        for (user, item, rating) in triples {
            let user_inner = *user_to_inner.entry(user.to_string()).or_insert_with(|| {
                users.push(user.to_string());
                user_ratings.push(Vec::new());
                users.len() - 1
            });
            let item_inner = *item_to_inner.entry(item.to_string()).or_insert_with(|| {
                items.push(item.to_string());
                item_ratings.push(Vec::new());
                items.len() - 1
            });
            user_ratings[user_inner].push((item_inner, rating));
            item_ratings[item_inner].push((user_inner, rating));
            qty_ratings += 1;
            rating_sum += rating;
        }

        let global_mean = if qty_ratings > 0 {
            rating_sum / qty_ratings as f64
        } else {
            0.0
        };

        Trainset {
            users,
            items,
            user_to_inner,
            item_to_inner,
            user_ratings,
            item_ratings,
            qty_ratings,
            global_mean,
        }
    }

    /// Union of the real category corpus and one synthetic profile. Built
    /// once per synthetic user; never shared between users.
    pub fn from_corpus_and_profile(corpus: &ReviewTable, profile: &[PreferenceRow]) -> Trainset {
        Trainset::from_triples(
            corpus
                .rows()
                .iter()
                .map(|row| (row.reviewer.as_str(), row.item_id.as_str(), row.rating))
                .chain(
                    profile
                        .iter()
                        .map(|row| (row.user_id.as_str(), row.item_id.as_str(), row.rating)),
                ),
        )
    }

    pub fn n_users(&self) -> usize {
        self.users.len()
    }

    pub fn n_items(&self) -> usize {
        self.items.len()
    }

    pub fn n_ratings(&self) -> usize {
        self.qty_ratings
    }

    pub fn global_mean(&self) -> f64 {
        self.global_mean
    }

    pub fn user_inner(&self, raw_id: &str) -> Option<usize> {
        self.user_to_inner.get(raw_id).copied()
    }

    pub fn item_inner(&self, raw_id: &str) -> Option<usize> {
        self.item_to_inner.get(raw_id).copied()
    }

    /// (item inner id, rating) pairs of one user.
    pub fn ratings_by_user(&self, user_inner: usize) -> &[(usize, f64)] {
        &self.user_ratings[user_inner]
    }

    /// (user inner id, rating) pairs of one item.
    pub fn ratings_of_item(&self, item_inner: usize) -> &[(usize, f64)] {
        &self.item_ratings[item_inner]
    }

    pub fn clip(estimate: f64) -> f64 {
        estimate.clamp(RATING_SCALE.0, RATING_SCALE.1)
    }
}
