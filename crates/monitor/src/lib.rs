/// System Resource Monitor - 采样与告警
///
/// 供调度程序和展示端使用的监控接口

pub mod config;
pub mod metrics;
pub mod node;
pub mod notify;
pub mod scheduler;

pub use config::Settings;
pub use metrics::{MetricSource, MonitorConfig, MonitorState, MonitorStatus, ProcfsReader, ResourceMonitor};
pub use notify::{AlertGate, LogNotifier, Notifier};
pub use scheduler::Sampler;
