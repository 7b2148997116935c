use serde::{Deserialize, Serialize};

use super::core::Series;
use super::ema::ema_series;
use crate::constant::Const;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MacdConfig {
    pub fast: usize,
    pub slow: usize,
    pub signal: usize,
}

impl Default for MacdConfig {
    fn default() -> Self {
        Self {
            fast: Const::MACD_FAST,
            slow: Const::MACD_SLOW,
            signal: Const::MACD_SIGNAL,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MacdSeries {
    pub macd: Series,
    pub signal: Series,
    pub histogram: Series,
}

#[derive(Debug, Clone, Copy)]
pub struct Macd {
    config: MacdConfig,
}

impl Macd {
    pub fn new(config: MacdConfig) -> Self {
        assert!(
            config.fast > 0 && config.slow > 0 && config.signal > 0,
            "macd periods must be > 0"
        );
        Self { config }
    }

    pub fn config(&self) -> MacdConfig {
        self.config
    }

    /// Number of closes needed before the histogram is defined.
    pub fn warm_up(&self) -> usize {
        self.config.fast.max(self.config.slow) + self.config.signal - 1
    }

    pub fn compute(&self, closes: &[f64]) -> MacdSeries {
        let len = closes.len();
        let fast = ema_series(closes, self.config.fast);
        let slow = ema_series(closes, self.config.slow);

        let macd = fast
            .iter()
            .zip(slow.iter())
            .map(|(f, s)| match (f, s) {
                (Some(f), Some(s)) => Some(f - s),
                _ => None,
            })
            .collect::<Series>();

        let mut signal = vec![None; len];
        if let Some(start) = macd.iter().position(Option::is_some) {
            // once defined the macd line stays defined, so the tail is contiguous
            let defined = macd[start..].iter().flatten().copied().collect::<Vec<_>>();
            for (offset, value) in ema_series(&defined, self.config.signal).into_iter().enumerate() {
                signal[start + offset] = value;
            }
        }

        let histogram = macd
            .iter()
            .zip(signal.iter())
            .map(|(m, s)| match (m, s) {
                (Some(m), Some(s)) => Some(m - s),
                _ => None,
            })
            .collect::<Series>();

        MacdSeries {
            macd,
            signal,
            histogram,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Macd, MacdConfig};

    #[test]
    fn histogram_is_macd_minus_signal() {
        let closes = (0..60).map(|x| 100.0 + x as f64 * 0.5).collect::<Vec<_>>();
        let macd = Macd::new(MacdConfig::default());
        let out = macd.compute(&closes);

        assert_eq!(macd.warm_up(), 34);
        assert!(out.macd[24].is_none());
        assert!(out.macd[25].is_some());
        assert!(out.signal[32].is_none());
        assert!(out.signal[33].is_some());

        for idx in 33..60 {
            let expected = out.macd[idx].unwrap() - out.signal[idx].unwrap();
            assert!((out.histogram[idx].unwrap() - expected).abs() < 1e-12);
        }
    }

    #[test]
    fn rising_prices_give_positive_macd() {
        let closes = (0..60).map(|x| 100.0 + x as f64).collect::<Vec<_>>();
        let out = Macd::new(MacdConfig::default()).compute(&closes);
        assert!(out.macd[59].unwrap() > 0.0);
    }
}
