/// System Monitor - 公共库
///
/// 提供采样快照、有界历史序列、错误处理和工具函数

pub mod errors;
pub mod history;
pub mod models;
pub mod utils;

// 重新导出常用类型
pub use errors::{Error, Result};
pub use history::{BoundedSeries, DEFAULT_HISTORY_CAPACITY};
pub use models::{
    CpuCounters, DiskSnapshot, MemorySnapshot, ResourceKind, ThresholdBreach, Thresholds,
};
