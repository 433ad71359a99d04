//! Window kernels shared by point computations and history projections.
//!
//! Windowed means come from prefix sums built once per series. A point value
//! reads the window ending at the last index and a projected value reads the
//! window ending at its own index, so both paths produce identical floats.

use crate::error::EngineError;

/// Arithmetic mean. Empty input yields NaN.
pub fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Running sums over a series, giving any window's mean in constant time.
#[derive(Debug, Clone)]
pub struct PrefixSums {
    /// `sums[k]` is the sum of the first `k` values.
    sums: Vec<f64>,
}

impl PrefixSums {
    pub fn new(values: &[f64]) -> Self {
        let mut sums = Vec::with_capacity(values.len() + 1);
        let mut running = 0.0;
        sums.push(running);
        for v in values {
            running += v;
            sums.push(running);
        }
        Self { sums }
    }

    /// Number of summed values.
    pub fn len(&self) -> usize {
        self.sums.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Mean of the `window` values ending at index `end`, inclusive.
    pub fn window_mean(&self, end: usize, window: usize) -> Result<f64, EngineError> {
        let available = (end + 1).min(self.len());
        if window == 0 || end >= self.len() || end + 1 < window {
            return Err(EngineError::insufficient(window, available));
        }
        Ok((self.sums[end + 1] - self.sums[end + 1 - window]) / window as f64)
    }
}

/// Rolling geometric means, summed in log space relative to the first value
/// so that a constant series returns that constant exactly.
#[derive(Debug, Clone)]
pub struct GeometricWindows {
    logs: PrefixSums,
    base: f64,
}

impl GeometricWindows {
    pub fn new(values: &[f64]) -> Self {
        let base = values.first().copied().unwrap_or(f64::NAN);
        let logs: Vec<f64> = values.iter().map(|v| (v / base).ln()).collect();
        Self {
            logs: PrefixSums::new(&logs),
            base,
        }
    }

    /// Geometric mean of the `window` values ending at index `end`, inclusive.
    pub fn window_mean(&self, end: usize, window: usize) -> Result<f64, EngineError> {
        Ok(self.logs.window_mean(end, window)?.exp() * self.base)
    }
}

/// Index of the last value when it ends a full `window`.
pub fn last_window_end(len: usize, window: usize) -> Result<usize, EngineError> {
    if window == 0 || len < window {
        return Err(EngineError::insufficient(window, len));
    }
    Ok(len - 1)
}

/// The last `window` values, or an insufficient-history error.
pub fn trailing(values: &[f64], window: usize) -> Result<&[f64], EngineError> {
    if window == 0 || values.len() < window {
        return Err(EngineError::insufficient(window, values.len()));
    }
    Ok(&values[values.len() - window..])
}

/// Simple moving average over the last `window` values.
pub fn sma(values: &[f64], window: usize) -> Result<f64, EngineError> {
    trailing(values, window).map(mean)
}

/// RSI with Wilder smoothing.
///
/// Element `k` of the output is the RSI at input index `period + k`; the
/// output is empty when fewer than `period + 1` values are given.
pub fn rsi_series(values: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || values.len() < period + 1 {
        return Vec::new();
    }

    let mut gains = Vec::with_capacity(values.len() - 1);
    let mut losses = Vec::with_capacity(values.len() - 1);
    for pair in values.windows(2) {
        let change = pair[1] - pair[0];
        gains.push(change.max(0.0));
        losses.push((-change).max(0.0));
    }

    let p = period as f64;
    let mut avg_gain = gains[..period].iter().sum::<f64>() / p;
    let mut avg_loss = losses[..period].iter().sum::<f64>() / p;

    let mut out = Vec::with_capacity(gains.len() - period + 1);
    out.push(rsi_from_averages(avg_gain, avg_loss));

    for i in period..gains.len() {
        avg_gain = (avg_gain * (p - 1.0) + gains[i]) / p;
        avg_loss = (avg_loss * (p - 1.0) + losses[i]) / p;
        out.push(rsi_from_averages(avg_gain, avg_loss));
    }

    out
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        // A flat window has no momentum either way.
        if avg_gain == 0.0 {
            return 50.0;
        }
        return 100.0;
    }
    let rs = avg_gain / avg_loss;
    100.0 - (100.0 / (1.0 + rs))
}

/// Latest RSI value.
pub fn rsi(values: &[f64], period: usize) -> Result<f64, EngineError> {
    rsi_series(values, period)
        .last()
        .copied()
        .ok_or_else(|| EngineError::insufficient(period + 1, values.len()))
}

/// Reject zero or non-finite denominators.
pub fn nonzero(value: f64, what: &str) -> Result<f64, EngineError> {
    if value.is_finite() && value != 0.0 {
        Ok(value)
    } else {
        Err(EngineError::ComputationDegenerate(format!(
            "{} is {}",
            what, value
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[1.0, 2.0, 3.0, 4.0]), 2.5);
        assert!(mean(&[]).is_nan());
    }

    #[test]
    fn test_geometric_mean_of_constant_is_exact() {
        let values = vec![50_000.0; 200];
        let windows = GeometricWindows::new(&values);
        assert_eq!(windows.window_mean(199, 200).unwrap(), 50_000.0);
        assert_eq!(windows.window_mean(150, 20).unwrap(), 50_000.0);
    }

    #[test]
    fn test_geometric_mean() {
        let windows = GeometricWindows::new(&[7.0, 1.0, 100.0]);
        let gm = windows.window_mean(2, 2).unwrap();
        assert!((gm - 10.0).abs() < 1e-9, "{}", gm);
    }

    #[test]
    fn test_window_mean_bounds() {
        let sums = PrefixSums::new(&[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(sums.len(), 4);
        assert_eq!(sums.window_mean(3, 4).unwrap(), 2.5);
        assert_eq!(sums.window_mean(2, 2).unwrap(), 2.5);
        assert_eq!(sums.window_mean(1, 3), Err(EngineError::insufficient(3, 2)));
        assert_eq!(sums.window_mean(4, 1), Err(EngineError::insufficient(1, 4)));
        assert!(sums.window_mean(3, 0).is_err());
        assert!(PrefixSums::new(&[]).is_empty());
    }

    #[test]
    fn test_rolling_means_match_direct_windows() {
        // Trending and cyclic, like a long price history.
        let values: Vec<f64> = (0..1500)
            .map(|d| {
                let d = d as f64;
                7_000.0 * 1.002f64.powf(d) * (1.0 + (d / 58.0).sin() * 0.3)
            })
            .collect();
        let sums = PrefixSums::new(&values);
        let geometric = GeometricWindows::new(&values);

        for window in [1, 111, 200, 350] {
            for end in (window - 1..values.len()).step_by(37) {
                let slice = &values[end + 1 - window..=end];

                let direct = mean(slice);
                let rolled = sums.window_mean(end, window).unwrap();
                assert!((rolled - direct).abs() <= 1e-9 * direct, "mean {} {}", window, end);

                let direct = (slice.iter().map(|v| v.ln()).sum::<f64>() / window as f64).exp();
                let rolled = geometric.window_mean(end, window).unwrap();
                assert!((rolled - direct).abs() <= 1e-9 * direct, "geo {} {}", window, end);
            }
        }
    }

    #[test]
    fn test_last_window_end() {
        assert_eq!(last_window_end(5, 5).unwrap(), 4);
        assert_eq!(last_window_end(4, 5), Err(EngineError::insufficient(5, 4)));
        assert!(last_window_end(3, 0).is_err());
    }

    #[test]
    fn test_trailing_checks_length() {
        let values = [1.0, 2.0, 3.0];
        assert_eq!(trailing(&values, 2).unwrap(), &[2.0, 3.0]);
        assert_eq!(
            trailing(&values, 4),
            Err(EngineError::insufficient(4, 3))
        );
    }

    #[test]
    fn test_rsi_uptrend_is_100() {
        let values: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
        assert_eq!(rsi(&values, 14).unwrap(), 100.0);
    }

    #[test]
    fn test_rsi_flat_is_neutral() {
        let values = vec![10.0; 20];
        assert_eq!(rsi(&values, 14).unwrap(), 50.0);
    }

    #[test]
    fn test_rsi_series_length() {
        let values: Vec<f64> = (0..30).map(|i| 100.0 + (i % 3) as f64).collect();
        assert_eq!(rsi_series(&values, 14).len(), 30 - 14);
        assert!(rsi_series(&values[..14], 14).is_empty());
        assert!(rsi(&values[..14], 14).is_err());
    }

    #[test]
    fn test_rsi_downtrend_low() {
        let values: Vec<f64> = (0..40).map(|i| 200.0 - i as f64 * 1.5).collect();
        assert!(rsi(&values, 14).unwrap() < 30.0);
    }

    #[test]
    fn test_nonzero() {
        assert!(nonzero(0.0, "sma").is_err());
        assert!(nonzero(f64::INFINITY, "sma").is_err());
        assert_eq!(nonzero(2.0, "sma").unwrap(), 2.0);
    }
}
