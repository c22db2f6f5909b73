use std::collections::BinaryHeap;

use hashbrown::HashSet;
use serde_derive::Serialize;

use crate::knn::{ItemScore, Prediction};
use crate::reviews::ReviewTable;

/// One row of the predictions output table: a recommended item joined back
/// to its metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub synthetic_user_id: String,
    pub item_id: String,
    pub score: f64,
    pub item_name: String,
    pub style: String,
    pub brewery: String,
    pub abv: Option<f64>,
}

/// Keeps the top `how_many` predictions of one user by estimated score,
/// skipping items already shown on the shortlist, and joins item metadata by
/// id. Items without a metadata row keep empty fields rather than failing.
/// Fewer than `how_many` unseen items yields exactly the available count.
pub fn extract_top_k(
    predictions: &[Prediction],
    already_shown: &[String],
    user_id: &str,
    how_many: usize,
    metadata: &ReviewTable,
) -> Vec<Recommendation> {
    let shown: HashSet<&str> = already_shown.iter().map(String::as_str).collect();

    let mut top_items: BinaryHeap<ItemScore> = BinaryHeap::with_capacity(how_many);
    for prediction in predictions.iter().filter(|p| p.user_id == user_id) {
        if shown.contains(prediction.item_id.as_str()) {
            log::debug!(
                "skipping item {} for {}: already on the shortlist",
                prediction.item_id,
                user_id
            );
            continue;
        }
        let scored = ItemScore::new(prediction.item_id.clone(), prediction.estimate);
        if top_items.len() < how_many {
            top_items.push(scored);
        } else if let Some(mut bottom) = top_items.peek_mut() {
            if scored.score > bottom.score {
                *bottom = scored;
            }
        }
    }

    let by_item = metadata.first_rows_by_item();
    top_items
        .into_sorted_vec()
        .into_iter()
        .map(|scored| {
            let row = by_item.get(scored.id.as_str());
            Recommendation {
                synthetic_user_id: user_id.to_string(),
                item_id: scored.id,
                score: scored.score,
                item_name: row.map(|r| r.item_name.clone()).unwrap_or_default(),
                style: row.map(|r| r.style.clone()).unwrap_or_default(),
                brewery: row.map(|r| r.brewery.clone()).unwrap_or_default(),
                abv: row.and_then(|r| r.abv),
            }
        })
        .collect()
}
