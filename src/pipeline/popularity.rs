use std::cmp::Ordering;

use hashbrown::HashMap;

use crate::error::{PipelineError, Result};
use crate::reviews::ReviewTable;

/// One entry of the popularity shortlist: the representative metadata of an
/// item plus its aggregated review statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedItem {
    pub item_id: String,
    pub item_name: String,
    pub style: String,
    pub brewery: String,
    pub abv: Option<f64>,
    pub mean_rating: f64,
    pub qty_reviews: usize,
}

/// Returns the `n` most popular items of a category table, ordered by mean
/// rating descending. The mean is computed over all rows sharing an item id.
/// Equal means are broken by lexical order of the item id, which makes the
/// ranking deterministic across runs.
///
/// The result holds min(n, distinct items) entries; the representative
/// metadata of each item is taken from its first review row.
pub fn top_n_popular(table: &ReviewTable, n: usize) -> Result<Vec<RankedItem>> {
    if n == 0 {
        return Err(PipelineError::InvalidParameter(
            "popularity count n must be positive".to_string(),
        ));
    }

    struct Aggregate {
        sum: f64,
        qty: usize,
        first_row: usize,
    }

    let mut aggregates: HashMap<&str, Aggregate> = HashMap::with_capacity(table.len());
    for (row_index, row) in table.rows().iter().enumerate() {
        let aggregate = aggregates.entry(row.item_id.as_str()).or_insert(Aggregate {
            sum: 0.0,
            qty: 0,
            first_row: row_index,
        });
        aggregate.sum += row.rating;
        aggregate.qty += 1;
    }

    let mut ranked: Vec<(&str, Aggregate)> = aggregates.into_iter().collect();
    ranked.sort_by(|(id_a, agg_a), (id_b, agg_b)| {
        let mean_a = agg_a.sum / agg_a.qty as f64;
        let mean_b = agg_b.sum / agg_b.qty as f64;
        mean_b
            .partial_cmp(&mean_a)
            .unwrap_or(Ordering::Equal)
            .then_with(|| id_a.cmp(id_b))
    });

    let top = ranked
        .into_iter()
        .take(n)
        .map(|(_, aggregate)| {
            let row = &table.rows()[aggregate.first_row];
            RankedItem {
                item_id: row.item_id.clone(),
                item_name: row.item_name.clone(),
                style: row.style.clone(),
                brewery: row.brewery.clone(),
                abv: row.abv,
                mean_rating: aggregate.sum / aggregate.qty as f64,
                qty_reviews: aggregate.qty,
            }
        })
        .collect();

    Ok(top)
}

#[cfg(test)]
mod popularity_test {
    use super::*;
    use crate::reviews::review;
    use crate::reviews::ReviewTable;

    fn ipa_table() -> ReviewTable {
        ReviewTable::new(vec![
            review("IPA", "BeerA", "ReviewerA", 3.0),
            review("IPA", "BeerA", "ReviewerB", 4.0),
            review("IPA", "BeerB", "ReviewerC", 4.0),
            review("IPA", "BeerB", "ReviewerD", 4.5),
            review("IPA", "BeerC", "ReviewerA", 5.0),
        ])
    }

    #[test]
    fn should_rank_by_mean_rating_descending() {
        let top = top_n_popular(&ipa_table(), 2).unwrap();
        let ids: Vec<&str> = top.iter().map(|item| item.item_id.as_str()).collect();
        assert_eq!(vec!["BeerC", "BeerB"], ids);
        assert_eq!(5.0, top[0].mean_rating);
        assert_eq!(4.25, top[1].mean_rating);
        assert_eq!(2, top[1].qty_reviews);
    }

    #[test]
    fn should_cap_result_at_distinct_item_count() {
        let top = top_n_popular(&ipa_table(), 10).unwrap();
        assert_eq!(3, top.len());
    }

    #[test]
    fn should_break_ties_lexically_by_item_id() {
        let table = ReviewTable::new(vec![
            review("IPA", "BeerZ", "ReviewerA", 4.0),
            review("IPA", "BeerA", "ReviewerB", 4.0),
            review("IPA", "BeerM", "ReviewerC", 4.0),
        ]);
        let top = top_n_popular(&table, 3).unwrap();
        let ids: Vec<&str> = top.iter().map(|item| item.item_id.as_str()).collect();
        assert_eq!(vec!["BeerA", "BeerM", "BeerZ"], ids);
    }

    #[test]
    fn should_reject_zero_count() {
        assert!(top_n_popular(&ipa_table(), 0).is_err());
    }

    #[test]
    fn should_return_empty_for_empty_table() {
        let top = top_n_popular(&ReviewTable::default(), 5).unwrap();
        assert!(top.is_empty());
    }
}
