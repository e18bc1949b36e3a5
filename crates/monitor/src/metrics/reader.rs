/// 指标读取器
///
/// 从 procfs 和挂载表读取原始计数器，转换为类型化快照。
/// 不做缓存，也不保留历史。

use common::{CpuCounters, DiskSnapshot, Error, MemorySnapshot, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::mounts::{collect_disks, parse_mount_table, statvfs_usage};

/// 指标来源 Trait
pub trait MetricSource: Send + Sync {
    /// 读取 CPU 累计计数器
    fn read_cpu_counters(&self) -> Result<CpuCounters>;

    /// 读取内存快照
    fn read_memory(&self) -> Result<MemorySnapshot>;

    /// 枚举真实磁盘挂载点
    fn enumerate_disks(&self) -> Result<Vec<DiskSnapshot>>;
}

/// 基于 procfs 的指标读取器
#[derive(Debug, Clone)]
pub struct ProcfsReader {
    stat_path: PathBuf,
    meminfo_path: PathBuf,
    mount_table_path: PathBuf,
}

impl Default for ProcfsReader {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcfsReader {
    pub fn new() -> Self {
        Self::with_paths("/proc/stat", "/proc/meminfo", "/etc/mtab")
    }

    /// 使用自定义路径（容器内挂载的 procfs 等）
    pub fn with_paths(
        stat_path: impl Into<PathBuf>,
        meminfo_path: impl Into<PathBuf>,
        mount_table_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            stat_path: stat_path.into(),
            meminfo_path: meminfo_path.into(),
            mount_table_path: mount_table_path.into(),
        }
    }
}

impl MetricSource for ProcfsReader {
    fn read_cpu_counters(&self) -> Result<CpuCounters> {
        let content = read_file(&self.stat_path)?;
        parse_cpu_counters(&content)
    }

    fn read_memory(&self) -> Result<MemorySnapshot> {
        let content = read_file(&self.meminfo_path)?;
        parse_meminfo(&content)
    }

    fn enumerate_disks(&self) -> Result<Vec<DiskSnapshot>> {
        let content = read_file(&self.mount_table_path)?;
        let entries = parse_mount_table(&content);
        let disks = collect_disks(&entries, statvfs_usage);
        debug!(
            "挂载表共 {} 项，保留 {} 个磁盘",
            entries.len(),
            disks.len()
        );
        Ok(disks)
    }
}

fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| Error::io(path.display().to_string(), e))
}

/// 解析 /proc/stat 中的汇总 `cpu` 行
///
/// 旧内核缺少的尾部字段按 0 处理，至少需要 user/nice/system/idle 四项
pub fn parse_cpu_counters(content: &str) -> Result<CpuCounters> {
    let line = content
        .lines()
        .find(|line| line.split_whitespace().next() == Some("cpu"))
        .ok_or_else(|| Error::Parse("aggregate cpu line not found in /proc/stat".to_string()))?;

    let values = line
        .split_whitespace()
        .skip(1)
        .take(10)
        .map(|field| {
            field
                .parse::<u64>()
                .map_err(|e| Error::Parse(format!("invalid cpu counter '{}': {}", field, e)))
        })
        .collect::<Result<Vec<u64>>>()?;

    if values.len() < 4 {
        return Err(Error::Parse(format!(
            "cpu line has {} counters, expected at least 4",
            values.len()
        )));
    }

    let field = |i: usize| values.get(i).copied().unwrap_or(0);

    Ok(CpuCounters {
        user: field(0),
        nice: field(1),
        system: field(2),
        idle: field(3),
        iowait: field(4),
        irq: field(5),
        softirq: field(6),
        steal: field(7),
        guest: field(8),
        guest_nice: field(9),
    })
}

/// 解析 /proc/meminfo，数值统一转换为字节
///
/// 缺少 MemAvailable 的旧内核用 free + buffers + cached 估算
pub fn parse_meminfo(content: &str) -> Result<MemorySnapshot> {
    let mut total = None;
    let mut free = 0;
    let mut available = None;
    let mut buffers = 0;
    let mut cached = 0;

    for line in content.lines() {
        let mut parts = line.split_whitespace();
        let (Some(key), Some(value)) = (parts.next(), parts.next()) else {
            continue;
        };
        let Ok(value) = value.parse::<u64>() else {
            continue;
        };
        let bytes = match parts.next() {
            Some("kB") => value.saturating_mul(1024),
            _ => value,
        };

        match key {
            "MemTotal:" => total = Some(bytes),
            "MemFree:" => free = bytes,
            "MemAvailable:" => available = Some(bytes),
            "Buffers:" => buffers = bytes,
            "Cached:" => cached = bytes,
            _ => {}
        }
    }

    let total = total.ok_or_else(|| Error::Parse("MemTotal not found in /proc/meminfo".to_string()))?;
    let available =
        available.unwrap_or_else(|| free.saturating_add(buffers).saturating_add(cached));

    MemorySnapshot::new(total, free, available, buffers, cached)
}
