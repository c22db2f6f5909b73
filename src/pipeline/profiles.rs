use hashbrown::HashSet;

use crate::error::{PipelineError, Result};
use crate::pipeline::combinations::Combination;

/// Rating assigned to the items a synthetic user "chose".
pub const CHOSEN_RATING: f64 = 5.0;

/// One (user, item, rating) row of a synthetic preference profile.
#[derive(Debug, Clone, PartialEq)]
pub struct PreferenceRow {
    pub user_id: String,
    pub item_id: String,
    pub rating: f64,
}

/// Builds the dense preference profile of one synthetic user: one row per
/// item of the category's full item universe, rating 5 for chosen items and
/// 0 for everything else. Fails when no chosen id appears in the universe,
/// which would otherwise produce a silent all-zero profile.
pub fn build_profile(
    choices: &[String],
    user_id: &str,
    universe: &[String],
) -> Result<Vec<PreferenceRow>> {
    let chosen: HashSet<&str> = choices.iter().map(String::as_str).collect();
    if !universe.iter().any(|id| chosen.contains(id.as_str())) {
        return Err(PipelineError::NoChoiceOverlap {
            choices: choices.to_vec(),
        });
    }

    let profile = universe
        .iter()
        .map(|item_id| PreferenceRow {
            user_id: user_id.to_string(),
            item_id: item_id.clone(),
            rating: if chosen.contains(item_id.as_str()) {
                CHOSEN_RATING
            } else {
                0.0
            },
        })
        .collect();
    Ok(profile)
}

/// Applies `build_profile` once per combination and returns the union of all
/// profiles plus the deduplicated synthetic user ids in first-seen order.
pub fn profiles_for_combinations(
    combinations: &[Combination],
    universe: &[String],
) -> Result<(Vec<PreferenceRow>, Vec<String>)> {
    let mut rows = Vec::with_capacity(combinations.len() * universe.len());
    let mut user_ids = Vec::with_capacity(combinations.len());
    let mut seen: HashSet<String> = HashSet::with_capacity(combinations.len());

    for combination in combinations {
        let profile = build_profile(
            &combination.item_ids(),
            &combination.synthetic_id,
            universe,
        )?;
        rows.extend(profile);
        if seen.insert(combination.synthetic_id.clone()) {
            user_ids.push(combination.synthetic_id.clone());
        }
    }

    Ok((rows, user_ids))
}
