pub mod bands;
pub mod core;
pub mod ema;
pub mod macd;
pub mod rsi;

pub use bands::{BandSeries, VolatilityBands};
pub use self::core::{Indicator, Series};
pub use ema::{Ema, ema_series, smoothed_series};
pub use macd::{Macd, MacdConfig, MacdSeries};
pub use rsi::Rsi;
