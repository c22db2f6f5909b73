use std::time::Instant;

use hashbrown::HashMap;
use rayon::prelude::*;
use serde_derive::Serialize;

use crate::error::{PipelineError, Result};
use crate::knn::model::{KnnModel, KnnParams};
use crate::knn::trainset::Trainset;
use crate::pipeline::combinations::create_combinations;
use crate::pipeline::popularity::top_n_popular;
use crate::pipeline::profiles::{profiles_for_combinations, PreferenceRow};
use crate::recommend::{extract_top_k, Recommendation};
use crate::reviews::ReviewTable;

pub mod combinations;
pub mod popularity;
pub mod profiles;

pub const DEFAULT_TOP_N: usize = 10;
pub const DEFAULT_GROUP_SIZE: usize = 2;
pub const DEFAULT_TOP_K: usize = 10;

/// Parameters of one batch run, one value per configuration knob.
#[derive(Debug, Clone)]
pub struct RunParams {
    pub categories: Vec<String>,
    pub top_n: usize,
    pub group_size: usize,
    pub top_k: usize,
    pub min_reviews: usize,
    pub knn: KnnParams,
}

impl Default for RunParams {
    fn default() -> Self {
        RunParams {
            categories: Vec::new(),
            top_n: DEFAULT_TOP_N,
            group_size: DEFAULT_GROUP_SIZE,
            top_k: DEFAULT_TOP_K,
            min_reviews: 0,
            knn: KnnParams::default(),
        }
    }
}

/// One row of the top-popular-items output table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopItemRecord {
    pub category: String,
    pub rank: usize,
    pub item_id: String,
    pub item_name: String,
    pub style: String,
    pub brewery: String,
    pub abv: Option<f64>,
    pub mean_rating: f64,
    pub qty_reviews: usize,
}

/// One row of the combination-definitions output table; a combination spans
/// `group_size` consecutive rows sharing a synthetic user id.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CombinationRecord {
    pub category: String,
    pub synthetic_user_id: String,
    pub item_id: String,
    pub item_name: String,
}

/// The three output tables of a batch run plus per-fit timings.
#[derive(Debug, Clone, Default)]
pub struct PipelineOutputs {
    pub top_items: Vec<TopItemRecord>,
    pub combinations: Vec<CombinationRecord>,
    pub predictions: Vec<Recommendation>,
    pub fit_durations_micros: Vec<(String, f64)>,
}

impl PipelineOutputs {
    fn extend(&mut self, other: PipelineOutputs) {
        self.top_items.extend(other.top_items);
        self.combinations.extend(other.combinations);
        self.predictions.extend(other.predictions);
        self.fit_durations_micros.extend(other.fit_durations_micros);
    }
}

/// Runs the whole pipeline: each configured category in order, output rows
/// concatenated across categories.
pub fn run_pipeline(corpus: &ReviewTable, params: &RunParams) -> Result<PipelineOutputs> {
    if params.categories.is_empty() {
        return Err(PipelineError::InvalidParameter(
            "no categories configured".to_string(),
        ));
    }
    let mut outputs = PipelineOutputs::default();
    for category in &params.categories {
        outputs.extend(run_category(corpus, category, params)?);
    }
    Ok(outputs)
}

/// Runs one category: filter, rank, combine, build synthetic profiles, then
/// train and score one isolated model per synthetic user.
///
/// The synthetic users share no mutable state, so they are scored on the
/// rayon pool; the indexed collect keeps output rows in synthetic-user order
/// regardless of completion order.
pub fn run_category(
    corpus: &ReviewTable,
    category: &str,
    params: &RunParams,
) -> Result<PipelineOutputs> {
    let category_table = corpus
        .filter_category(category)
        .retain_frequent_items(params.min_reviews);
    if category_table.is_empty() {
        return Err(PipelineError::EmptyCategory(category.to_string()));
    }

    let universe = category_table.unique_item_ids();
    let ranked = top_n_popular(&category_table, params.top_n)?;
    let shortlist_ids: Vec<String> = ranked.iter().map(|item| item.item_id.clone()).collect();

    let combinations = create_combinations(&ranked, category, params.group_size)?;
    let (profile_rows, user_ids) = profiles_for_combinations(&combinations, &universe)?;

    let mut rows_by_user: HashMap<&str, Vec<PreferenceRow>> =
        HashMap::with_capacity(user_ids.len());
    for row in &profile_rows {
        rows_by_user
            .entry(row.user_id.as_str())
            .or_default()
            .push(row.clone());
    }

    log::info!(
        "category {}: {} reviews, {} items, {} shortlisted, {} synthetic users",
        category,
        category_table.len(),
        universe.len(),
        ranked.len(),
        user_ids.len()
    );

    let per_user: Vec<Result<(Vec<Recommendation>, f64)>> = user_ids
        .par_iter()
        .map(|user_id| {
            let profile = rows_by_user.get(user_id.as_str()).ok_or_else(|| {
                PipelineError::InvalidParameter(format!("no profile rows for {}", user_id))
            })?;

            let fit_start = Instant::now();
            let trainset = Trainset::from_corpus_and_profile(&category_table, profile);
            let model = KnnModel::fit(trainset, params.knn.clone());
            let fit_micros = fit_start.elapsed().as_micros() as f64;

            // the test set is the full profile, so every item of the
            // category universe gets scored for this synthetic user
            let testset: Vec<(String, String, f64)> = profile
                .iter()
                .map(|row| (row.user_id.clone(), row.item_id.clone(), row.rating))
                .collect();
            let predictions = model.test(&testset);

            let recommendations = extract_top_k(
                &predictions,
                &shortlist_ids,
                user_id,
                params.top_k,
                &category_table,
            );
            Ok((recommendations, fit_micros))
        })
        .collect();

    let mut outputs = PipelineOutputs::default();
    for (rank, item) in ranked.iter().enumerate() {
        outputs.top_items.push(TopItemRecord {
            category: category.to_string(),
            rank: rank + 1,
            item_id: item.item_id.clone(),
            item_name: item.item_name.clone(),
            style: item.style.clone(),
            brewery: item.brewery.clone(),
            abv: item.abv,
            mean_rating: item.mean_rating,
            qty_reviews: item.qty_reviews,
        });
    }
    for combination in &combinations {
        for item in &combination.items {
            outputs.combinations.push(CombinationRecord {
                category: category.to_string(),
                synthetic_user_id: combination.synthetic_id.clone(),
                item_id: item.item_id.clone(),
                item_name: item.item_name.clone(),
            });
        }
    }
    for (user_id, result) in user_ids.iter().zip(per_user) {
        let (recommendations, fit_micros) = result?;
        outputs.predictions.extend(recommendations);
        outputs
            .fit_durations_micros
            .push((user_id.clone(), fit_micros));
    }
    Ok(outputs)
}

#[cfg(test)]
mod pipeline_test {
    use super::*;
    use crate::reviews::review;

    /// Five reviews over three items; BeerB has the highest mean.
    fn small_corpus() -> ReviewTable {
        ReviewTable::new(vec![
            review("IPA", "BeerA", "ReviewerA", 3.0),
            review("IPA", "BeerA", "ReviewerB", 3.5),
            review("IPA", "BeerB", "ReviewerC", 5.0),
            review("IPA", "BeerB", "ReviewerD", 4.5),
            review("IPA", "BeerC", "ReviewerA", 4.0),
        ])
    }

    fn small_params() -> RunParams {
        RunParams {
            categories: vec!["IPA".to_string()],
            top_n: 2,
            group_size: 2,
            top_k: 10,
            min_reviews: 0,
            knn: KnnParams {
                min_k: 1,
                ..KnnParams::default()
            },
        }
    }

    #[test]
    fn should_run_the_popularity_to_prediction_round_trip() {
        let outputs = run_pipeline(&small_corpus(), &small_params()).unwrap();

        // top-2 shortlist: BeerB (4.75) then BeerC (4.0)
        let top_ids: Vec<&str> = outputs
            .top_items
            .iter()
            .map(|record| record.item_id.as_str())
            .collect();
        assert_eq!(vec!["BeerB", "BeerC"], top_ids);
        assert_eq!(1, outputs.top_items[0].rank);

        // C(2,2) = 1 combination holding both shortlist items
        let combination_users: Vec<&str> = outputs
            .combinations
            .iter()
            .map(|record| record.synthetic_user_id.as_str())
            .collect();
        assert_eq!(vec!["IPA1", "IPA1"], combination_users);

        // only BeerA is left once the shortlist is excluded
        assert_eq!(1, outputs.predictions.len());
        assert_eq!("BeerA", outputs.predictions[0].item_id);
        assert_eq!("IPA1", outputs.predictions[0].synthetic_user_id);
        assert_eq!(1, outputs.fit_durations_micros.len());
    }

    #[test]
    fn should_be_deterministic_across_runs() {
        let first = run_pipeline(&small_corpus(), &small_params()).unwrap();
        let second = run_pipeline(&small_corpus(), &small_params()).unwrap();
        assert_eq!(first.top_items, second.top_items);
        assert_eq!(first.combinations, second.combinations);
        assert_eq!(first.predictions, second.predictions);
    }

    #[test]
    fn should_fail_on_unknown_category() {
        let params = RunParams {
            categories: vec!["Lambic".to_string()],
            ..small_params()
        };
        assert!(matches!(
            run_pipeline(&small_corpus(), &params),
            Err(PipelineError::EmptyCategory(_))
        ));
    }

    #[test]
    fn should_fail_without_categories() {
        let params = RunParams {
            categories: Vec::new(),
            ..small_params()
        };
        assert!(run_pipeline(&small_corpus(), &params).is_err());
    }

    #[test]
    fn should_isolate_synthetic_users_per_category() {
        let mut rows = small_corpus().rows().to_vec();
        rows.push(review("IPA", "BeerD", "ReviewerB", 2.0));
        let corpus = ReviewTable::new(rows);
        let params = RunParams {
            top_n: 3,
            ..small_params()
        };

        let outputs = run_pipeline(&corpus, &params).unwrap();
        // C(3,2) = 3 synthetic users, output rows grouped in user order
        let mut seen_users: Vec<&str> = outputs
            .fit_durations_micros
            .iter()
            .map(|(user_id, _)| user_id.as_str())
            .collect();
        assert_eq!(vec!["IPA1", "IPA2", "IPA3"], seen_users);
        seen_users.dedup();
        assert_eq!(3, seen_users.len());
    }
}
