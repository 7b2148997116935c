use super::core::Series;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BandSeries {
    pub upper: Series,
    pub middle: Series,
    pub lower: Series,
}

impl BandSeries {
    fn undefined(len: usize) -> Self {
        Self {
            upper: vec![None; len],
            middle: vec![None; len],
            lower: vec![None; len],
        }
    }
}

/// Rolling mean ± k·σ envelope, σ being the population standard deviation
/// of the trailing `window` closes.
#[derive(Debug, Clone, Copy)]
pub struct VolatilityBands {
    window: usize,
    multiplier: f64,
}

impl VolatilityBands {
    pub fn new(window: usize, multiplier: f64) -> Self {
        assert!(window > 0, "window must be > 0");
        Self { window, multiplier }
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }

    pub fn compute(&self, closes: &[f64]) -> BandSeries {
        let mut out = BandSeries::undefined(closes.len());
        if closes.len() < self.window {
            return out;
        }

        for end in (self.window - 1)..closes.len() {
            let slice = &closes[end + 1 - self.window..=end];
            let (mean, std_dev) = mean_and_std(slice);
            out.middle[end] = Some(mean);
            out.upper[end] = Some(mean + self.multiplier * std_dev);
            out.lower[end] = Some(mean - self.multiplier * std_dev);
        }
        out
    }
}

fn mean_and_std(slice: &[f64]) -> (f64, f64) {
    let first = slice[0];
    // flat window: report the exact price so both bands collapse onto it
    if slice.iter().all(|x| *x == first) {
        return (first, 0.0);
    }

    let n = slice.len() as f64;
    let mean = slice.iter().sum::<f64>() / n;
    let variance = slice.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
    (mean, variance.sqrt())
}
