use hashbrown::{HashMap, HashSet};

/// One review row of the cleaned corpus. Immutable once loaded; the rating is
/// the mean of the sub-ratings, computed upstream by the data cleaning step.
#[derive(Debug, Clone, PartialEq)]
pub struct Review {
    pub category: String,
    pub item_id: String,
    pub item_name: String,
    pub abv: Option<f64>,
    pub style: String,
    pub brewery: String,
    pub reviewer: String,
    pub rating: f64,
}

/// An owned table of review rows. Filtering returns a fresh table re-indexed
/// from zero; nothing is shared or mutated across pipeline stages.
#[derive(Debug, Clone, Default)]
pub struct ReviewTable {
    rows: Vec<Review>,
}

pub struct ReviewTableStats {
    pub descriptive_name: String,
    pub qty_records: usize,
    pub qty_unique_item_ids: usize,
    pub qty_unique_reviewers: usize,
    pub qty_categories: usize,
}

impl ReviewTable {
    pub fn new(rows: Vec<Review>) -> Self {
        ReviewTable { rows }
    }

    pub fn rows(&self) -> &[Review] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Restricts the table to rows of one category value. Pure function, the
    /// result owns its rows.
    pub fn filter_category(&self, category: &str) -> ReviewTable {
        let rows = self
            .rows
            .iter()
            .filter(|row| row.category == category)
            .cloned()
            .collect();
        ReviewTable { rows }
    }

    /// Unique item ids in first-seen order.
    pub fn unique_item_ids(&self) -> Vec<String> {
        let mut seen: HashSet<&str> = HashSet::with_capacity(self.rows.len());
        let mut ids = Vec::new();
        for row in &self.rows {
            if seen.insert(row.item_id.as_str()) {
                ids.push(row.item_id.clone());
            }
        }
        ids
    }

    /// Drops items with fewer than `min_reviews` review rows. A floor of zero
    /// or one keeps everything.
    pub fn retain_frequent_items(&self, min_reviews: usize) -> ReviewTable {
        if min_reviews <= 1 {
            return self.clone();
        }
        let mut counts: HashMap<&str, usize> = HashMap::with_capacity(self.rows.len());
        for row in &self.rows {
            *counts.entry(row.item_id.as_str()).or_insert(0) += 1;
        }
        let rows = self
            .rows
            .iter()
            .filter(|row| counts[row.item_id.as_str()] >= min_reviews)
            .cloned()
            .collect();
        ReviewTable { rows }
    }

    /// First occurrence per item id, used as the representative metadata row
    /// when joining predictions back to item details.
    pub fn first_rows_by_item(&self) -> HashMap<&str, &Review> {
        let mut by_item: HashMap<&str, &Review> = HashMap::with_capacity(self.rows.len());
        for row in &self.rows {
            by_item.entry(row.item_id.as_str()).or_insert(row);
        }
        by_item
    }

    pub fn stats(&self, descriptive_name: &str) -> ReviewTableStats {
        let mut item_ids: HashSet<&str> = HashSet::new();
        let mut reviewers: HashSet<&str> = HashSet::new();
        let mut categories: HashSet<&str> = HashSet::new();
        for row in &self.rows {
            item_ids.insert(row.item_id.as_str());
            reviewers.insert(row.reviewer.as_str());
            categories.insert(row.category.as_str());
        }
        ReviewTableStats {
            descriptive_name: descriptive_name.to_string(),
            qty_records: self.rows.len(),
            qty_unique_item_ids: item_ids.len(),
            qty_unique_reviewers: reviewers.len(),
            qty_categories: categories.len(),
        }
    }
}

#[cfg(test)]
pub(crate) fn review(category: &str, item_id: &str, reviewer: &str, rating: f64) -> Review {
    Review {
        category: category.to_string(),
        item_id: item_id.to_string(),
        item_name: format!("{} Ale", item_id),
        abv: Some(5.5),
        style: "American IPA".to_string(),
        brewery: "Test Brewing".to_string(),
        reviewer: reviewer.to_string(),
        rating,
    }
}

#[cfg(test)]
mod reviews_test {
    use super::*;

    fn small_table() -> ReviewTable {
        ReviewTable::new(vec![
            review("IPA", "BeerA", "ReviewerA", 4.0),
            review("IPA", "BeerA", "ReviewerB", 4.5),
            review("IPA", "BeerB", "ReviewerC", 3.0),
            review("Stout", "BeerC", "ReviewerA", 5.0),
        ])
    }

    #[test]
    fn should_filter_one_category() {
        let filtered = small_table().filter_category("IPA");
        assert_eq!(3, filtered.len());
        assert!(filtered.rows().iter().all(|row| row.category == "IPA"));
    }

    #[test]
    fn should_return_empty_table_for_unknown_category() {
        let filtered = small_table().filter_category("Lambic");
        assert!(filtered.is_empty());
    }

    #[test]
    fn should_keep_first_seen_order_of_unique_items() {
        let ids = small_table().unique_item_ids();
        assert_eq!(vec!["BeerA", "BeerB", "BeerC"], ids);
    }

    #[test]
    fn should_drop_items_below_review_floor() {
        let refined = small_table().retain_frequent_items(2);
        assert_eq!(vec!["BeerA".to_string()], refined.unique_item_ids());
        assert_eq!(2, refined.len());
    }

    #[test]
    fn should_compute_table_stats() {
        let stats = small_table().stats("unittest");
        assert_eq!(4, stats.qty_records);
        assert_eq!(3, stats.qty_unique_item_ids);
        assert_eq!(3, stats.qty_unique_reviewers);
        assert_eq!(2, stats.qty_categories);
    }
}
