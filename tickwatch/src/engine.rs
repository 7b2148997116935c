use serde::{Deserialize, Serialize};

use crate::bar::Bar;
use crate::constant::{Const, IndicatorError};
use crate::frame::IndicatorFrame;
use crate::indicator::{Ema, Indicator, Macd, MacdConfig, Rsi, VolatilityBands};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorConfig {
    pub ema_fast: usize,
    pub ema_slow: usize,
    pub band_window: usize,
    pub band_k: f64,
    pub rsi: Option<usize>,
    pub macd: Option<MacdConfig>,
    /// Extra EMA periods drawn as overlays; they never gate readiness.
    pub overlays: Vec<usize>,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            ema_fast: Const::EMA_FAST,
            ema_slow: Const::EMA_SLOW,
            band_window: Const::BAND_WINDOW,
            band_k: Const::BAND_K,
            rsi: Some(Const::RSI_WINDOW),
            macd: Some(MacdConfig::default()),
            overlays: Vec::new(),
        }
    }
}

impl IndicatorConfig {
    /// Snapshot length below which no signal may be derived.
    pub fn warm_up(&self) -> usize {
        self.ema_fast.max(self.ema_slow).max(self.band_window)
    }

    pub fn validate(&self) -> Result<(), IndicatorError> {
        if self.ema_fast == 0 {
            return Err(IndicatorError::ZeroWindow("ema_fast"));
        }
        if self.ema_slow == 0 {
            return Err(IndicatorError::ZeroWindow("ema_slow"));
        }
        if self.band_window == 0 {
            return Err(IndicatorError::ZeroWindow("band_window"));
        }
        if self.ema_fast >= self.ema_slow {
            return Err(IndicatorError::WindowOrder {
                fast: self.ema_fast,
                slow: self.ema_slow,
            });
        }
        if !self.band_k.is_finite() || self.band_k <= 0.0 {
            return Err(IndicatorError::InvalidMultiplier(self.band_k));
        }
        if self.overlays.contains(&0) {
            return Err(IndicatorError::ZeroWindow("overlay"));
        }
        if self.rsi == Some(0) {
            return Err(IndicatorError::ZeroWindow("rsi"));
        }
        if let Some(macd) = self.macd {
            if macd.fast == 0 || macd.slow == 0 || macd.signal == 0 {
                return Err(IndicatorError::ZeroWindow("macd"));
            }
            if macd.fast >= macd.slow {
                return Err(IndicatorError::WindowOrder {
                    fast: macd.fast,
                    slow: macd.slow,
                });
            }
        }
        Ok(())
    }
}

/// Recomputes every derived column over the full snapshot on each call.
pub struct IndicatorEngine {
    config: IndicatorConfig,
    fast: Ema,
    slow: Ema,
    bands: VolatilityBands,
    rsi: Option<Rsi>,
    macd: Option<Macd>,
    extras: Vec<Box<dyn Indicator>>,
}

impl Default for IndicatorEngine {
    fn default() -> Self {
        Self::build(IndicatorConfig::default())
    }
}

impl IndicatorEngine {
    pub fn new(config: IndicatorConfig) -> Result<Self, IndicatorError> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: IndicatorConfig) -> Self {
        let overlays = config.overlays.clone();
        let mut engine = Self {
            fast: Ema::new(config.ema_fast),
            slow: Ema::new(config.ema_slow),
            bands: VolatilityBands::new(config.band_window, config.band_k),
            rsi: config.rsi.map(Rsi::new),
            macd: config.macd.map(Macd::new),
            extras: Vec::new(),
            config,
        };
        for period in overlays {
            engine.register(Box::new(Ema::new(period)));
        }
        engine
    }

    pub fn config(&self) -> &IndicatorConfig {
        &self.config
    }

    pub fn warm_up(&self) -> usize {
        self.config.warm_up()
    }

    /// Adds an extra column. Indicators are keyed by name; a second
    /// registration under the same name is ignored.
    pub fn register(&mut self, indicator: Box<dyn Indicator>) {
        let taken = self.extras.iter().any(|x| x.name() == indicator.name())
            || indicator.name() == self.fast.name()
            || indicator.name() == self.slow.name();
        if taken {
            return;
        }
        self.extras.push(indicator);
    }

    pub fn compute(&self, bars: &[Bar]) -> IndicatorFrame {
        let datetimes = bars.iter().map(|x| x.datetime).collect::<Vec<_>>();
        let closes = bars.iter().map(|x| x.close_price).collect::<Vec<_>>();
        let warm_up = self.warm_up();

        if closes.len() < warm_up {
            return IndicatorFrame::not_ready(datetimes, closes, warm_up);
        }

        let ema_fast = self.fast.compute(&closes);
        let ema_slow = self.slow.compute(&closes);
        let bands = self.bands.compute(&closes);
        let rsi = self
            .rsi
            .as_ref()
            .map(|x| x.compute(&closes))
            .unwrap_or_default();
        let macd = self
            .macd
            .as_ref()
            .map(|x| x.compute(&closes))
            .unwrap_or_default();
        let extra = self
            .extras
            .iter()
            .map(|x| (x.name().to_string(), x.compute(&closes)))
            .collect();

        IndicatorFrame {
            datetimes,
            closes,
            warm_up,
            ema_fast,
            ema_slow,
            bands,
            rsi,
            macd,
            extra,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{IndicatorConfig, IndicatorEngine};
    use crate::constant::IndicatorError;
    use crate::indicator::{Ema, Rsi};

    #[test]
    fn default_warm_up_follows_slow_trend() {
        assert_eq!(IndicatorConfig::default().warm_up(), 50);
        let config = IndicatorConfig {
            ema_fast: 5,
            ema_slow: 10,
            band_window: 20,
            ..IndicatorConfig::default()
        };
        assert_eq!(config.warm_up(), 20);
    }

    #[test]
    fn validate_rejects_bad_windows() {
        let inverted = IndicatorConfig {
            ema_fast: 50,
            ema_slow: 20,
            ..IndicatorConfig::default()
        };
        assert_eq!(
            inverted.validate(),
            Err(IndicatorError::WindowOrder { fast: 50, slow: 20 })
        );

        let zero = IndicatorConfig {
            band_window: 0,
            ..IndicatorConfig::default()
        };
        assert!(matches!(IndicatorEngine::new(zero), Err(IndicatorError::ZeroWindow("band_window"))));

        let bad_k = IndicatorConfig {
            band_k: f64::NAN,
            ..IndicatorConfig::default()
        };
        assert!(matches!(bad_k.validate(), Err(IndicatorError::InvalidMultiplier(_))));
    }

    #[test]
    fn register_ignores_duplicate_names() {
        let mut engine = IndicatorEngine::default();
        engine.register(Box::new(Rsi::new(7)));
        engine.register(Box::new(Rsi::new(7)));
        engine.register(Box::new(Ema::new(20)));
        assert_eq!(engine.extras.len(), 1);
    }

    #[test]
    fn overlays_become_named_columns() {
        let engine = IndicatorEngine::new(IndicatorConfig {
            overlays: vec![9, 20, 9],
            ..IndicatorConfig::default()
        })
        .expect("valid config");
        // ema_20 is the fast trend line already, the second ema_9 is a duplicate
        assert_eq!(engine.extras.len(), 1);

        let zero = IndicatorConfig {
            overlays: vec![0],
            ..IndicatorConfig::default()
        };
        assert_eq!(zero.validate(), Err(IndicatorError::ZeroWindow("overlay")));
    }
}
