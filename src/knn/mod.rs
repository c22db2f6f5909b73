use std::cmp::Ordering;

pub mod model;
pub mod trainset;

/// A scored item for top-K selection. The ordering is reversed by score so a
/// `BinaryHeap` acts as a bounded min-heap over estimates.
#[derive(PartialEq, Debug, Clone)]
pub struct ItemScore {
    pub id: String,
    pub score: f64,
}

impl ItemScore {
    pub fn new(id: impl Into<String>, score: f64) -> Self {
        ItemScore {
            id: id.into(),
            score,
        }
    }
}

impl Eq for ItemScore {}

impl Ord for ItemScore {
    fn cmp(&self, other: &Self) -> Ordering {
        // reverse order by score
        match self.score.partial_cmp(&other.score) {
            Some(Ordering::Less) => Ordering::Greater,
            Some(Ordering::Greater) => Ordering::Less,
            _ => Ordering::Equal,
        }
    }
}

impl PartialOrd for ItemScore {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// One scored test-set entry: the true rating from the synthetic profile and
/// the model's estimate.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub user_id: String,
    pub item_id: String,
    pub true_rating: f64,
    pub estimate: f64,
}

#[cfg(test)]
mod item_score_test {
    use std::collections::BinaryHeap;

    use super::*;

    #[test]
    fn handle_reverse_ordering_itemscore() {
        let largest = ItemScore::new("BeerA", 5000.0);
        let middle = ItemScore::new("BeerB", 100.0);
        let smallest = ItemScore::new("BeerC", 1.0);
        let items = vec![largest, smallest, middle];

        let how_many = 2;
        let mut top_items: BinaryHeap<ItemScore> = BinaryHeap::with_capacity(how_many);

        for scored in items.into_iter() {
            if top_items.len() < how_many {
                top_items.push(scored);
            } else {
                let mut reverse_top = top_items.peek_mut().unwrap();
                if scored.score > reverse_top.score {
                    *reverse_top = scored;
                }
            }
        }
        // the results are the top `how_many` in reverse order
        assert_eq!("BeerB", top_items.pop().unwrap().id);
        assert_eq!("BeerA", top_items.pop().unwrap().id);
    }

    #[test]
    fn handle_vector_sort_ordering_itemscore() {
        let mut scores: BinaryHeap<ItemScore> = BinaryHeap::new();
        scores.push(ItemScore::new("BeerA", 5000.0));
        scores.push(ItemScore::new("BeerC", 1.0));
        scores.push(ItemScore::new("BeerB", 100.0));

        let sorted_ids: Vec<String> = scores
            .into_sorted_vec()
            .into_iter()
            .map(|scored| scored.id)
            .collect();
        assert_eq!(vec!["BeerA", "BeerB", "BeerC"], sorted_ids);
    }
}
