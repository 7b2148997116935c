use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use polars::prelude::{DataFrame, NamedFrom, PolarsResult, Series as Column};

use crate::indicator::{BandSeries, MacdSeries, Series};

/// Derived columns aligned to the bar snapshot they were computed from.
///
/// Below the warm-up length every derived column is left empty and the
/// frame reports `is_ready() == false`.
#[derive(Debug, Clone, Default)]
pub struct IndicatorFrame {
    pub(crate) datetimes: Vec<DateTime<Utc>>,
    pub(crate) closes: Vec<f64>,
    pub(crate) warm_up: usize,
    pub(crate) ema_fast: Series,
    pub(crate) ema_slow: Series,
    pub(crate) bands: BandSeries,
    pub(crate) rsi: Series,
    pub(crate) macd: MacdSeries,
    pub(crate) extra: BTreeMap<String, Series>,
}

/// Last-row view used by the signal detector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameRow {
    pub datetime: DateTime<Utc>,
    pub close: f64,
    pub ema_fast: f64,
    pub ema_slow: f64,
    pub band_upper: f64,
    pub band_middle: f64,
    pub band_lower: f64,
    pub rsi: Option<f64>,
    pub macd: Option<f64>,
    pub macd_signal: Option<f64>,
    pub macd_histogram: Option<f64>,
}

impl IndicatorFrame {
    pub(crate) fn not_ready(datetimes: Vec<DateTime<Utc>>, closes: Vec<f64>, warm_up: usize) -> Self {
        Self {
            datetimes,
            closes,
            warm_up,
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.closes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.closes.is_empty()
    }

    pub fn warm_up(&self) -> usize {
        self.warm_up
    }

    pub fn is_ready(&self) -> bool {
        !self.closes.is_empty()
            && self.closes.len() >= self.warm_up
            && self.ema_fast.len() == self.closes.len()
    }

    pub fn datetimes(&self) -> &[DateTime<Utc>] {
        &self.datetimes
    }

    pub fn closes(&self) -> &[f64] {
        &self.closes
    }

    pub fn ema_fast(&self) -> &[Option<f64>] {
        &self.ema_fast
    }

    pub fn ema_slow(&self) -> &[Option<f64>] {
        &self.ema_slow
    }

    pub fn bands(&self) -> &BandSeries {
        &self.bands
    }

    pub fn rsi(&self) -> &[Option<f64>] {
        &self.rsi
    }

    pub fn macd(&self) -> &MacdSeries {
        &self.macd
    }

    pub fn extra(&self, name: &str) -> Option<&[Option<f64>]> {
        self.extra.get(name).map(Vec::as_slice)
    }

    pub fn last_row(&self) -> Option<FrameRow> {
        if !self.is_ready() {
            return None;
        }
        let idx = self.closes.len() - 1;
        Some(FrameRow {
            datetime: *self.datetimes.get(idx)?,
            close: self.closes[idx],
            ema_fast: self.ema_fast[idx]?,
            ema_slow: self.ema_slow[idx]?,
            band_upper: at(&self.bands.upper, idx)?,
            band_middle: at(&self.bands.middle, idx)?,
            band_lower: at(&self.bands.lower, idx)?,
            rsi: at(&self.rsi, idx),
            macd: at(&self.macd.macd, idx),
            macd_signal: at(&self.macd.signal, idx),
            macd_histogram: at(&self.macd.histogram, idx),
        })
    }

    /// Tabular view for display collaborators. Columns that were not
    /// computed are emitted as all-null.
    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let len = self.closes.len();
        let mut columns = vec![
            Column::new(
                "datetime",
                self.datetimes
                    .iter()
                    .map(|x| x.timestamp_millis())
                    .collect::<Vec<_>>(),
            ),
            Column::new("close", self.closes.clone()),
            Column::new("ema_fast", padded(&self.ema_fast, len)),
            Column::new("ema_slow", padded(&self.ema_slow, len)),
            Column::new("band_upper", padded(&self.bands.upper, len)),
            Column::new("band_middle", padded(&self.bands.middle, len)),
            Column::new("band_lower", padded(&self.bands.lower, len)),
            Column::new("rsi", padded(&self.rsi, len)),
            Column::new("macd", padded(&self.macd.macd, len)),
            Column::new("macd_signal", padded(&self.macd.signal, len)),
            Column::new("macd_hist", padded(&self.macd.histogram, len)),
        ];
        for (name, series) in &self.extra {
            columns.push(Column::new(name, padded(series, len)));
        }
        DataFrame::new(columns)
    }
}

fn at(series: &[Option<f64>], idx: usize) -> Option<f64> {
    series.get(idx).copied().flatten()
}

fn padded(series: &[Option<f64>], len: usize) -> Vec<Option<f64>> {
    let mut out = series.to_vec();
    out.resize(len, None);
    out
}
