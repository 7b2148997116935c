use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::constant::{Extreme, Trend};
use crate::frame::{FrameRow, IndicatorFrame};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Signal {
    pub trend: Trend,
    pub extreme: Option<Extreme>,
}

impl Signal {
    pub fn label(&self) -> String {
        match self.extreme {
            Some(extreme) => format!("{} | {}", self.trend.as_str(), extreme.as_str()),
            None => self.trend.as_str().to_string(),
        }
    }

    /// Only the breakout/breakdown half of a signal warrants a notification.
    pub fn is_alert_worthy(&self) -> bool {
        self.extreme.is_some()
    }
}

impl Display for Signal {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.label())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SignalDetector;

impl SignalDetector {
    /// `None` while the frame is still warming up.
    pub fn detect(&self, frame: &IndicatorFrame) -> Option<Signal> {
        frame.last_row().map(|row| self.classify(&row))
    }

    /// Ties resolve to `Bearish` and to no extreme.
    pub fn classify(&self, row: &FrameRow) -> Signal {
        let trend = if row.ema_fast > row.ema_slow {
            Trend::Bullish
        } else {
            Trend::Bearish
        };

        let extreme = if row.close > row.band_upper {
            Some(Extreme::Breakout)
        } else if row.close < row.band_lower {
            Some(Extreme::Breakdown)
        } else {
            None
        };

        Signal { trend, extreme }
    }
}
