use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub struct FrameStats {
    pub frames: usize,
    pub average_frame_time_ns: f64,
    pub jitter_ns: f64,
    pub min_frame_time_ns: f64,
    pub max_frame_time_ns: f64,
    pub effective_fps: f64,
}

/// Rolling window of frame-to-frame intervals.
#[derive(Debug, Clone)]
pub struct FrameRecorder {
    pub frame_times: Vec<Duration>,
    pub max_samples: usize,
    last: Option<Duration>,
}

impl FrameRecorder {
    pub fn new(max_samples: usize) -> Self {
        Self {
            frame_times: Vec::with_capacity(max_samples),
            max_samples,
            last: None,
        }
    }

    /// Records a flip at clock time `at`; the first flip only sets the baseline.
    pub fn mark(&mut self, at: Duration) {
        if let Some(last) = self.last.replace(at) {
            self.record_frame(at.saturating_sub(last));
        }
    }

    pub fn record_frame(&mut self, d: Duration) {
        if self.frame_times.len() >= self.max_samples {
            self.frame_times.remove(0);
        }
        self.frame_times.push(d);
    }

    pub fn stats(&self) -> FrameStats {
        let times: Vec<f64> = self
            .frame_times
            .iter()
            .map(|d| d.as_nanos() as f64)
            .collect();
        if times.is_empty() {
            return FrameStats {
                frames: 0,
                average_frame_time_ns: 0.0,
                jitter_ns: 0.0,
                min_frame_time_ns: 0.0,
                max_frame_time_ns: 0.0,
                effective_fps: 0.0,
            };
        }
        let sum: f64 = times.iter().sum();
        let avg = sum / times.len() as f64;
        let var = times.iter().map(|x| (x - avg).powi(2)).sum::<f64>() / times.len() as f64;
        let min = times.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = times.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        FrameStats {
            frames: times.len(),
            average_frame_time_ns: avg,
            jitter_ns: var.sqrt(),
            min_frame_time_ns: min,
            max_frame_time_ns: max,
            effective_fps: if avg > 0.0 { 1e9 / avg } else { 0.0 },
        }
    }
}

impl Default for FrameRecorder {
    fn default() -> Self {
        Self::new(1000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_from_marked_flips() {
        let mut rec = FrameRecorder::new(10);
        for ms in [0u64, 10, 20, 30] {
            rec.mark(Duration::from_millis(ms));
        }
        let stats = rec.stats();
        assert_eq!(stats.frames, 3);
        assert_eq!(stats.average_frame_time_ns, 10_000_000.0);
        assert_eq!(stats.jitter_ns, 0.0);
        assert!((stats.effective_fps - 100.0).abs() < 1e-9);
    }

    #[test]
    fn window_drops_oldest_sample() {
        let mut rec = FrameRecorder::new(2);
        rec.record_frame(Duration::from_millis(1));
        rec.record_frame(Duration::from_millis(2));
        rec.record_frame(Duration::from_millis(3));
        assert_eq!(
            rec.frame_times,
            vec![Duration::from_millis(2), Duration::from_millis(3)]
        );
        assert_eq!(FrameRecorder::default().stats().frames, 0);
    }
}
