/// 共享数据模型
///
/// 定义采样快照、资源类型和阈值等数据结构

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Sub;

use crate::errors::{Error, Result};
use crate::utils::percent_of;

/// 资源类型
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Cpu,
    Memory,
    Disk,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Cpu => "cpu",
            Self::Memory => "memory",
            Self::Disk => "disk",
        };
        f.write_str(s)
    }
}

// ============================================================================
// CPU
// ============================================================================

/// CPU 累计时间计数器（单位：tick，自开机起单调递增）
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CpuCounters {
    pub user: u64,
    pub nice: u64,
    pub system: u64,
    pub idle: u64,
    pub iowait: u64,
    pub irq: u64,
    pub softirq: u64,
    pub steal: u64,
    pub guest: u64,
    pub guest_nice: u64,
}

impl CpuCounters {
    /// 前八项之和
    ///
    /// guest / guest_nice 已计入 user / nice，不重复累加
    pub fn total(&self) -> u64 {
        [
            self.user,
            self.nice,
            self.system,
            self.idle,
            self.iowait,
            self.irq,
            self.softirq,
            self.steal,
        ]
        .iter()
        .fold(0u64, |acc, &v| acc.saturating_add(v))
    }

    /// 空闲 tick（idle + iowait）
    pub fn idle_total(&self) -> u64 {
        self.idle.saturating_add(self.iowait)
    }

    /// 忙碌 tick
    pub fn busy(&self) -> u64 {
        self.total().saturating_sub(self.idle_total())
    }

    /// 计算自 `previous` 以来的 CPU 使用率
    ///
    /// 区间内总 tick 为 0 时返回 `None`，调用方应跳过本次采样
    pub fn usage_since(&self, previous: &CpuCounters) -> Option<f64> {
        let delta = *self - *previous;
        let total = delta.total();
        if total == 0 {
            return None;
        }
        Some(100.0 * delta.busy() as f64 / total as f64)
    }
}

/// 逐字段求差
///
/// 计数器回绕或重置时对应字段饱和为 0
impl Sub for CpuCounters {
    type Output = CpuCounters;

    fn sub(self, other: CpuCounters) -> CpuCounters {
        CpuCounters {
            user: self.user.saturating_sub(other.user),
            nice: self.nice.saturating_sub(other.nice),
            system: self.system.saturating_sub(other.system),
            idle: self.idle.saturating_sub(other.idle),
            iowait: self.iowait.saturating_sub(other.iowait),
            irq: self.irq.saturating_sub(other.irq),
            softirq: self.softirq.saturating_sub(other.softirq),
            steal: self.steal.saturating_sub(other.steal),
            guest: self.guest.saturating_sub(other.guest),
            guest_nice: self.guest_nice.saturating_sub(other.guest_nice),
        }
    }
}

// ============================================================================
// 内存
// ============================================================================

/// 内存快照（单位：字节）
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MemorySnapshot {
    pub total: u64,
    pub free: u64,
    pub available: u64,
    pub buffers: u64,
    pub cached: u64,
    /// total - free - buffers - cached，近似值
    pub used: u64,
    /// 100 * (total - available) / total
    pub percent: f64,
}

impl MemorySnapshot {
    /// 由原始字段构造快照，total 为 0 时视为无效数据
    pub fn new(total: u64, free: u64, available: u64, buffers: u64, cached: u64) -> Result<Self> {
        if total == 0 {
            return Err(Error::Parse("memory total is zero or missing".to_string()));
        }

        let used = total
            .saturating_sub(free)
            .saturating_sub(buffers)
            .saturating_sub(cached);
        let percent = percent_of(total.saturating_sub(available), total);

        Ok(Self {
            total,
            free,
            available,
            buffers,
            cached,
            used,
            percent,
        })
    }
}

// ============================================================================
// 磁盘
// ============================================================================

/// 单个挂载点的磁盘快照（单位：字节）
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiskSnapshot {
    pub device: String,
    /// 挂载路径，唯一键
    pub mountpoint: String,
    pub fs_type: String,
    pub total: u64,
    pub used: u64,
    pub available: u64,
    /// 100 * used / total
    pub percent: f64,
}

impl DiskSnapshot {
    pub fn new(
        device: impl Into<String>,
        mountpoint: impl Into<String>,
        fs_type: impl Into<String>,
        total: u64,
        used: u64,
        available: u64,
    ) -> Self {
        Self {
            device: device.into(),
            mountpoint: mountpoint.into(),
            fs_type: fs_type.into(),
            total,
            used,
            available,
            percent: percent_of(used, total),
        }
    }
}

// ============================================================================
// 阈值
// ============================================================================

/// 告警阈值（百分比）
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Thresholds {
    pub cpu: f64,
    pub memory: f64,
    pub disk: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            cpu: 85.0,
            memory: 85.0,
            disk: 90.0,
        }
    }
}

impl Thresholds {
    /// 校验阈值范围 (0, 100]
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [("cpu", self.cpu), ("memory", self.memory), ("disk", self.disk)] {
            validate_threshold(name, value)?;
        }
        Ok(())
    }

    /// 获取指定资源的阈值
    pub fn for_kind(&self, kind: ResourceKind) -> f64 {
        match kind {
            ResourceKind::Cpu => self.cpu,
            ResourceKind::Memory => self.memory,
            ResourceKind::Disk => self.disk,
        }
    }
}

/// 校验单个阈值
pub fn validate_threshold(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 || value > 100.0 {
        return Err(Error::Config(format!(
            "{} threshold must be in (0, 100], got {}",
            name, value
        )));
    }
    Ok(())
}

/// 阈值越界信息
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ThresholdBreach {
    pub kind: ResourceKind,
    pub message: String,
    pub percent: f64,
    pub threshold: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mountpoint: Option<String>,
}
