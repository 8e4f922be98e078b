use burn::data::dataset::Dataset;

use crate::domain::review::Review;

/// In-memory review collection, in load order.
pub struct ReviewDataset {
    reviews: Vec<Review>,
}

impl ReviewDataset {
    pub fn new(reviews: Vec<Review>) -> Self { Self { reviews } }
}

impl Dataset<Review> for ReviewDataset {
    fn get(&self, index: usize) -> Option<Review> {
        self.reviews.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.reviews.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_and_len() {
        let ds = ReviewDataset::new(vec![Review::new("ok", 1), Review::new("meh", 0)]);
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.get(1), Some(Review::new("meh", 0)));
        assert_eq!(ds.get(2), None);
    }
}
