/// A derived column aligned to the close column; `None` where the value is
/// not yet defined.
pub type Series = Vec<Option<f64>>;

pub trait Indicator: Send + Sync {
    fn name(&self) -> &str;
    /// Minimum number of closes before the last value is defined.
    fn warm_up(&self) -> usize;
    fn compute(&self, closes: &[f64]) -> Series;
}
