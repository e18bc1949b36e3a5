/// 资源指标
///
/// 读取 CPU、内存、磁盘的原始数据并维护滚动历史

pub mod collector;
pub mod mounts;
pub mod reader;

pub use collector::{
    MonitorConfig, MonitorState, MonitorStatus, ResourceMonitor, MIN_UPDATE_INTERVAL,
};
pub use reader::{MetricSource, ProcfsReader};
