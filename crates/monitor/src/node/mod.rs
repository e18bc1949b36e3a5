/// 主机信息
///
/// 启动时采集一次主机的静态信息（主机名、系统、内核、CPU 数量、内存总量），
/// 用于日志和状态输出

use serde::Serialize;
use sysinfo::{CpuRefreshKind, MemoryRefreshKind, RefreshKind, System};
use tracing::debug;

/// 主机静态信息
#[derive(Debug, Clone, Serialize)]
pub struct HostInfo {
    pub hostname: String,
    pub os_name: String,
    pub os_version: String,
    pub kernel_version: String,
    pub cpu_count: usize,
    /// 字节
    pub memory_total: u64,
    /// 秒
    pub uptime: u64,
}

impl HostInfo {
    /// 采集主机信息，取不到的字段记为 "unknown"
    pub fn collect() -> Self {
        let sys = System::new_with_specifics(
            RefreshKind::new()
                .with_cpu(CpuRefreshKind::new())
                .with_memory(MemoryRefreshKind::new().with_ram()),
        );

        let unknown = || "unknown".to_string();
        let info = Self {
            hostname: System::host_name().unwrap_or_else(unknown),
            os_name: System::name().unwrap_or_else(unknown),
            os_version: System::os_version().unwrap_or_else(unknown),
            kernel_version: System::kernel_version().unwrap_or_else(unknown),
            cpu_count: sys.cpus().len(),
            memory_total: sys.total_memory(),
            uptime: System::uptime(),
        };

        debug!("主机信息: {:?}", info);
        info
    }

    /// 一行摘要
    pub fn summary(&self) -> String {
        format!(
            "{} ({} {}, kernel {}, {} CPU, {})",
            self.hostname,
            self.os_name,
            self.os_version,
            self.kernel_version,
            self.cpu_count,
            common::utils::format_bytes(self.memory_total),
        )
    }
}
