pub mod bar;
pub mod constant;
pub mod engine;
pub mod frame;
pub mod indicator;
pub mod logging;
pub mod signal;

pub use bar::{Bar, QuoteEvent, Tick, bucket_start};
pub use constant::{Const, Extreme, IndicatorError, Trend};
pub use engine::{IndicatorConfig, IndicatorEngine};
pub use frame::{FrameRow, IndicatorFrame};
pub use indicator::{
    BandSeries, Ema, Indicator, Macd, MacdConfig, MacdSeries, Rsi, Series, VolatilityBands,
    ema_series, smoothed_series,
};
pub use logging::{init_logging, init_logging_with};
pub use signal::{Signal, SignalDetector};
