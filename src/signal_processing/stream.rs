use crate::signal_processing::stats::quantile;
use std::collections::VecDeque;

/// Fixed-capacity window that displaces its oldest value
#[derive(Debug, Clone)]
struct SlidingWindow {
    values: VecDeque<f64>,
    capacity: usize,
}

impl SlidingWindow {
    fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            values: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    fn push(&mut self, value: f64) {
        if self.values.len() == self.capacity {
            self.values.pop_front();
        }
        self.values.push_back(value);
    }
}

/// Moving average over the last N values
///
/// Until N values have arrived the average covers only those seen so far.
#[derive(Debug, Clone)]
pub struct MovingAverage {
    window: SlidingWindow,
    sum: f64,
}

impl MovingAverage {
    /// Create a new moving average filter
    ///
    /// # Arguments
    /// * `window_size` - Number of samples to average (larger = smoother but slower response).
    ///   A size of 0 is treated as 1.
    pub fn new(window_size: usize) -> Self {
        Self {
            window: SlidingWindow::new(window_size),
            sum: 0.0,
        }
    }

    /// Add a new value to the moving average and return the updated average
    pub fn add(&mut self, value: f64) -> f64 {
        if self.window.values.len() == self.window.capacity {
            self.sum -= self.window.values[0];
        }
        self.window.push(value);
        self.sum += value;
        self.average()
    }

    /// Current average without adding a new value (0 when empty)
    pub fn average(&self) -> f64 {
        let count = self.window.values.len().max(1);
        self.sum / count as f64
    }
}

/// Moving median over the last N values
#[derive(Debug, Clone)]
pub struct MovingMedian {
    window: SlidingWindow,
    scratch: Vec<f64>,
}

impl MovingMedian {
    pub fn new(window_size: usize) -> Self {
        Self {
            window: SlidingWindow::new(window_size),
            scratch: Vec::with_capacity(window_size.max(1)),
        }
    }

    /// Add a value and return the median of the current window
    pub fn add(&mut self, value: f64) -> f64 {
        self.window.push(value);
        self.median()
    }

    /// Median of the current window (0 when empty)
    ///
    /// Uses the same quantile definition as [`quantile`], so an even-sized
    /// window averages its two middle values.
    pub fn median(&mut self) -> f64 {
        self.scratch.clear();
        self.scratch.extend(self.window.values.iter().copied());
        quantile(&self.scratch, 0.5).unwrap_or(0.0)
    }
}

/// Lazy moving-average adapter, see [`moving_average`]
pub struct MovingAverageIter<I> {
    source: I,
    filter: MovingAverage,
}

impl<I: Iterator<Item = f64>> Iterator for MovingAverageIter<I> {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        let sample = self.source.next()?;
        Some(self.filter.add(sample))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.source.size_hint()
    }
}

/// Lazy moving-median adapter, see [`moving_median`]
pub struct MovingMedianIter<I> {
    source: I,
    filter: MovingMedian,
}

impl<I: Iterator<Item = f64>> Iterator for MovingMedianIter<I> {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        let sample = self.source.next()?;
        Some(self.filter.add(sample))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.source.size_hint()
    }
}

/// Smooth a sample stream with a moving average, one output per input
pub fn moving_average<I>(samples: I, window_size: usize) -> MovingAverageIter<I::IntoIter>
where
    I: IntoIterator<Item = f64>,
{
    MovingAverageIter {
        source: samples.into_iter(),
        filter: MovingAverage::new(window_size),
    }
}

/// Smooth a sample stream with a moving median, one output per input
pub fn moving_median<I>(samples: I, window_size: usize) -> MovingMedianIter<I::IntoIter>
where
    I: IntoIterator<Item = f64>,
{
    MovingMedianIter {
        source: samples.into_iter(),
        filter: MovingMedian::new(window_size),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_moving_average() {
        let mut ma = MovingAverage::new(3);

        assert_abs_diff_eq!(ma.add(1.0), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(ma.add(2.0), 1.5, epsilon = 1e-12);
        assert_abs_diff_eq!(ma.add(3.0), 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(ma.add(4.0), 3.0, epsilon = 1e-12); // (2+3+4)/3
        assert_abs_diff_eq!(ma.add(5.0), 4.0, epsilon = 1e-12); // (3+4+5)/3
    }

    #[test]
    fn test_moving_average_empty_and_zero_window() {
        assert_eq!(MovingAverage::new(4).average(), 0.0);

        let mut ma = MovingAverage::new(0);
        assert_eq!(ma.add(3.0), 3.0);
        assert_eq!(ma.add(5.0), 5.0);
    }

    #[test]
    fn test_moving_median_rejects_spikes() {
        let mut mm = MovingMedian::new(3);
        assert_eq!(mm.add(1.0), 1.0);
        assert_eq!(mm.add(3.0), 2.0);
        assert_eq!(mm.add(100.0), 3.0);
        assert_eq!(mm.add(2.0), 3.0);
        assert_eq!(mm.add(1.0), 2.0);
    }

    #[test]
    fn test_moving_average_iter() {
        let smoothed: Vec<f64> = moving_average(vec![2.0, 4.0, 6.0, 8.0], 2).collect();
        assert_eq!(smoothed, vec![2.0, 3.0, 5.0, 7.0]);
    }

    #[test]
    fn test_moving_median_iter() {
        let input = vec![5.0, 5.0, -50.0, 5.0, 5.0, 60.0, 5.0];
        let smoothed: Vec<f64> = moving_median(input, 3).collect();
        assert_eq!(smoothed.len(), 7);
        assert!(smoothed[3..].iter().all(|&v| v == 5.0));
    }
}
