use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Trend {
    Bullish,
    Bearish,
}

impl Trend {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bullish => "Bullish Trend",
            Self::Bearish => "Bearish Trend",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Extreme {
    Breakout,
    Breakdown,
}

impl Extreme {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Breakout => "Breakout",
            Self::Breakdown => "Breakdown",
        }
    }
}

impl Display for Trend {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Display for Extreme {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum IndicatorError {
    #[error("{0} window must be > 0")]
    ZeroWindow(&'static str),
    #[error("band multiplier must be finite and > 0, got {0}")]
    InvalidMultiplier(f64),
    #[error("fast window {fast} must be shorter than slow window {slow}")]
    WindowOrder { fast: usize, slow: usize },
}

pub struct Const;

impl Const {
    pub const BUFFER_CAPACITY: usize = 200;
    pub const EMA_FAST: usize = 20;
    pub const EMA_SLOW: usize = 50;
    pub const BAND_WINDOW: usize = 20;
    pub const BAND_K: f64 = 2.0;
    pub const RSI_WINDOW: usize = 14;
    pub const MACD_FAST: usize = 12;
    pub const MACD_SLOW: usize = 26;
    pub const MACD_SIGNAL: usize = 9;
    pub const POLL_INTERVAL_SECS: u64 = 10;
}
