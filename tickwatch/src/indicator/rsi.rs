use super::core::{Indicator, Series};
use super::ema::smoothed_series;

/// Relative strength index. Average gain and loss follow the shared
/// smoothing recurrence with Wilder's factor `1 / period`.
#[derive(Debug, Clone)]
pub struct Rsi {
    name: String,
    period: usize,
}

impl Rsi {
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "period must be > 0");
        Self {
            name: format!("rsi_{period}"),
            period,
        }
    }

    pub fn period(&self) -> usize {
        self.period
    }
}

impl Indicator for Rsi {
    fn name(&self) -> &str {
        &self.name
    }

    fn warm_up(&self) -> usize {
        self.period + 1
    }

    fn compute(&self, closes: &[f64]) -> Series {
        let mut out = vec![None; closes.len()];
        if closes.len() < self.warm_up() {
            return out;
        }

        let (gains, losses): (Vec<f64>, Vec<f64>) = closes
            .windows(2)
            .map(|pair| {
                let change = pair[1] - pair[0];
                (change.max(0.0), (-change).max(0.0))
            })
            .unzip();

        let alpha = 1.0 / self.period as f64;
        let avg_gain = smoothed_series(&gains, self.period, alpha);
        let avg_loss = smoothed_series(&losses, self.period, alpha);

        for (idx, (gain, loss)) in avg_gain.iter().zip(avg_loss.iter()).enumerate() {
            if let (Some(gain), Some(loss)) = (gain, loss) {
                out[idx + 1] = Some(rsi_value(*gain, *loss));
            }
        }
        out
    }
}

fn rsi_value(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        if avg_gain == 0.0 { 50.0 } else { 100.0 }
    } else {
        100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
    }
}
