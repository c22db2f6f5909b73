use itertools::Itertools;

use crate::error::{PipelineError, Result};
use crate::pipeline::popularity::RankedItem;

/// A synthetic micro-user: a group of `group_size` shortlist items tagged
/// with a dense, 1-indexed identifier like `IPA1`, `IPA2`, ...
#[derive(Debug, Clone, PartialEq)]
pub struct Combination {
    pub synthetic_id: String,
    pub items: Vec<RankedItem>,
}

impl Combination {
    pub fn item_ids(&self) -> Vec<String> {
        self.items.iter().map(|item| item.item_id.clone()).collect()
    }
}

/// Enumerates every `group_size`-sized subset of the shortlist rows in
/// lexicographic index order, C(rows, group_size) subsets in total. Row order
/// within a subset follows the shortlist; subsets are emitted ascending by
/// their sequential id.
pub fn create_combinations(
    items: &[RankedItem],
    prefix: &str,
    group_size: usize,
) -> Result<Vec<Combination>> {
    if group_size == 0 {
        return Err(PipelineError::InvalidParameter(
            "combination group size must be positive".to_string(),
        ));
    }
    if group_size > items.len() {
        return Err(PipelineError::InvalidParameter(format!(
            "combination group size {} exceeds the {} shortlist items",
            group_size,
            items.len()
        )));
    }

    let combinations = (0..items.len())
        .combinations(group_size)
        .enumerate()
        .map(|(index, member_indices)| Combination {
            synthetic_id: format!("{}{}", prefix, index + 1),
            items: member_indices
                .into_iter()
                .map(|item_index| items[item_index].clone())
                .collect(),
        })
        .collect();

    Ok(combinations)
}

#[cfg(test)]
mod combinations_test {
    use super::*;
    use hashbrown::HashSet;

    fn ranked(id: &str) -> RankedItem {
        RankedItem {
            item_id: id.to_string(),
            item_name: format!("{} Ale", id),
            style: "American IPA".to_string(),
            brewery: "Test Brewing".to_string(),
            abv: Some(6.0),
            mean_rating: 4.0,
            qty_reviews: 3,
        }
    }

    #[test]
    fn should_enumerate_all_pairs_with_dense_ids() {
        let shortlist = vec![ranked("BeerA"), ranked("BeerB"), ranked("BeerC")];
        let combinations = create_combinations(&shortlist, "IPA", 2).unwrap();

        assert_eq!(3, combinations.len());
        let ids: Vec<&str> = combinations
            .iter()
            .map(|combination| combination.synthetic_id.as_str())
            .collect();
        assert_eq!(vec!["IPA1", "IPA2", "IPA3"], ids);
        assert_eq!(vec!["BeerA", "BeerB"], combinations[0].item_ids());
        assert_eq!(vec!["BeerA", "BeerC"], combinations[1].item_ids());
        assert_eq!(vec!["BeerB", "BeerC"], combinations[2].item_ids());
    }

    #[test]
    fn should_produce_distinct_item_sets() {
        let shortlist = vec![ranked("A"), ranked("B"), ranked("C"), ranked("D")];
        let combinations = create_combinations(&shortlist, "X", 2).unwrap();
        assert_eq!(6, combinations.len());

        let sets: HashSet<Vec<String>> = combinations
            .iter()
            .map(|combination| combination.item_ids())
            .collect();
        assert_eq!(combinations.len(), sets.len());
        assert!(combinations
            .iter()
            .all(|combination| combination.items.len() == 2));
    }

    #[test]
    fn should_reject_zero_group_size() {
        let shortlist = vec![ranked("A"), ranked("B")];
        assert!(create_combinations(&shortlist, "X", 0).is_err());
    }

    #[test]
    fn should_reject_group_size_beyond_row_count() {
        let shortlist = vec![ranked("A"), ranked("B")];
        assert!(create_combinations(&shortlist, "X", 3).is_err());
    }
}
