use paradigm_core::{MarkerStyle, RatingEvent, Rgba, ScaleView, VideoRatingArgs};

const LEFT_KEY: &str = "left";
const RIGHT_KEY: &str = "right";

/// Keyboard-driven rating scale with integer steps.
#[derive(Debug, Clone)]
pub struct RatingScale {
    low: i32,
    high: i32,
    start: i32,
    marker: i32,
    ticks: Vec<i32>,
    description: String,
    marker_style: MarkerStyle,
    marker_color: Rgba,
    stretch: f32,
    history: Vec<RatingEvent>,
}

impl RatingScale {
    pub fn new(low: i32, high: i32, marker_start: i32) -> Self {
        let start = marker_start.clamp(low, high);
        Self {
            low,
            high,
            start,
            marker: start,
            ticks: (low..=high).collect(),
            description: String::new(),
            marker_style: MarkerStyle::default(),
            marker_color: Rgba::white(),
            stretch: 1.0,
            history: vec![RatingEvent::SENTINEL],
        }
    }

    pub fn from_args(args: &VideoRatingArgs) -> Self {
        let mut scale = Self::new(args.low, args.high, args.marker_start);
        scale.ticks = args.tick_marks.clone();
        scale.description = args.rating_description.clone();
        scale.marker_style = args.marker_style;
        scale.marker_color = args.marker_color;
        scale.stretch = args.stretch_horizontal;
        scale
    }

    /// Puts the marker back at its start and leaves only the sentinel in the history.
    pub fn reset(&mut self) {
        self.marker = self.start;
        self.history.clear();
        self.history.push(RatingEvent::SENTINEL);
    }

    /// Applies `left`/`right` presses; every actual move is recorded at `elapsed` seconds.
    pub fn handle_keys(&mut self, keys: &[String], elapsed: f64) {
        for key in keys {
            let step = match key.as_str() {
                LEFT_KEY => -1,
                RIGHT_KEY => 1,
                _ => continue,
            };
            let next = (self.marker + step).clamp(self.low, self.high);
            if next != self.marker {
                self.marker = next;
                self.history.push(RatingEvent::new(next as f64, elapsed));
            }
        }
    }

    pub fn marker(&self) -> i32 {
        self.marker
    }

    pub fn history(&self) -> &[RatingEvent] {
        &self.history
    }

    pub fn view(&self) -> ScaleView<'_> {
        ScaleView {
            low: self.low,
            high: self.high,
            ticks: &self.ticks,
            marker: self.marker,
            marker_style: self.marker_style,
            marker_color: self.marker_color,
            description: &self.description,
            pos: (0.0, -0.75),
            stretch: self.stretch,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(names: &[&str]) -> Vec<String> {
        names.iter().map(|k| k.to_string()).collect()
    }

    #[test]
    fn records_moves_after_the_sentinel() {
        let mut scale = RatingScale::new(1, 9, 5);
        scale.handle_keys(&keys(&["left", "left"]), 1.2);
        scale.handle_keys(&keys(&["space", "right"]), 2.9);
        assert_eq!(
            scale.history(),
            &[
                RatingEvent::SENTINEL,
                RatingEvent::new(4.0, 1.2),
                RatingEvent::new(3.0, 1.2),
                RatingEvent::new(4.0, 2.9),
            ]
        );
    }

    #[test]
    fn clamps_at_the_ends_without_recording() {
        let mut scale = RatingScale::new(1, 3, 3);
        scale.handle_keys(&keys(&["right", "right"]), 0.5);
        assert_eq!(scale.marker(), 3);
        assert_eq!(scale.history().len(), 1);
    }

    #[test]
    fn reset_restores_start_and_sentinel() {
        let mut scale = RatingScale::new(1, 9, 12);
        assert_eq!(scale.marker(), 9);
        scale.handle_keys(&keys(&["left"]), 0.1);
        scale.reset();
        assert_eq!(scale.marker(), 9);
        assert_eq!(scale.history(), &[RatingEvent::SENTINEL]);
    }
}
