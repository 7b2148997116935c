//! `runtime` crate 入口。
//!
//! - `pipeline`：单周期处理与只读视图发布。
//! - `scheduler`：按固定间隔驱动 pipeline，响应停机信号。
//! - `feed_activity`：独立线程把 adapter 报价写入 `Feed`。
//! - `live`：从配置装配全部组件，并保证停机顺序（先 feed，后 pipeline）。

mod error;
mod feed_activity;
mod live;
mod pipeline;
mod scheduler;

pub use error::RuntimeError;
pub use feed_activity::{FeedActivityReport, FeedActivitySettings, spawn_feed_activity};
pub use live::{LiveRuntime, RuntimeReport};
pub use pipeline::{CycleOutcome, Pipeline, PipelineView, PipelineViewHandle};
pub use scheduler::run_pipeline;
