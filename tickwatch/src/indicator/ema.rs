use super::core::{Indicator, Series};

/// Exponential smoothing seeded with the simple average of the first
/// `window` values: `out[i] = out[i - 1] + alpha * (x[i] - out[i - 1])`.
///
/// Both the seed and the step are taken as offsets, so a run of equal
/// values reproduces that value exactly whatever the window.
pub fn smoothed_series(values: &[f64], window: usize, alpha: f64) -> Series {
    let mut out = vec![None; values.len()];
    if window == 0 || values.len() < window {
        return out;
    }

    let first = values[0];
    let seed = first + values[..window].iter().map(|x| x - first).sum::<f64>() / window as f64;
    out[window - 1] = Some(seed);

    let mut prev = seed;
    for (idx, value) in values.iter().enumerate().skip(window) {
        prev += alpha * (value - prev);
        out[idx] = Some(prev);
    }
    out
}

pub fn ema_series(values: &[f64], window: usize) -> Series {
    smoothed_series(values, window, ema_alpha(window))
}

fn ema_alpha(window: usize) -> f64 {
    2.0 / (window as f64 + 1.0)
}

#[derive(Debug, Clone)]
pub struct Ema {
    name: String,
    period: usize,
}

impl Ema {
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "period must be > 0");
        Self {
            name: format!("ema_{period}"),
            period,
        }
    }

    pub fn period(&self) -> usize {
        self.period
    }
}

impl Indicator for Ema {
    fn name(&self) -> &str {
        &self.name
    }

    fn warm_up(&self) -> usize {
        self.period
    }

    fn compute(&self, closes: &[f64]) -> Series {
        ema_series(closes, self.period)
    }
}

#[cfg(test)]
mod tests {
    use super::{Ema, ema_series, smoothed_series};
    use crate::indicator::Indicator;

    #[test]
    fn seed_is_simple_average_of_first_window() {
        let closes = [2.0, 4.0, 6.0, 8.0];
        let out = ema_series(&closes, 3);
        assert_eq!(out[0], None);
        assert_eq!(out[1], None);
        assert_eq!(out[2], Some(4.0));
        assert!((out[3].unwrap() - (0.5 * 8.0 + 0.5 * 4.0)).abs() < 1e-12);
    }

    #[test]
    fn short_input_stays_undefined() {
        let out = ema_series(&[1.0, 2.0], 5);
        assert_eq!(out, vec![None, None]);
        assert!(smoothed_series(&[1.0], 0, 0.5).iter().all(Option::is_none));
    }

    #[test]
    fn flat_input_is_reproduced_exactly_for_any_window() {
        for price in [100.043, 101.3, 22_150.35, 0.1] {
            let closes = vec![price; 80];
            for window in [3, 20, 50] {
                let out = ema_series(&closes, window);
                assert!(out[window - 1..].iter().all(|x| *x == Some(price)));
            }
        }
    }

    #[test]
    fn indicator_name_carries_period() {
        let ema = Ema::new(20);
        assert_eq!(ema.name(), "ema_20");
        assert_eq!(ema.warm_up(), 20);
    }
}
