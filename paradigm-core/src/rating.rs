use serde::{Deserialize, Serialize};

/// One change of the rating scale; `elapsed` is seconds since the scale was reset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatingEvent {
    pub rating: Option<f64>,
    pub elapsed: f64,
}

impl RatingEvent {
    pub const SENTINEL: RatingEvent = RatingEvent {
        rating: None,
        elapsed: 0.0,
    };

    pub fn new(rating: f64, elapsed: f64) -> Self {
        Self {
            rating: Some(rating),
            elapsed,
        }
    }
}
