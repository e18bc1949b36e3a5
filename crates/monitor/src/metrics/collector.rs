/// 资源监控器
///
/// 持有 CPU、内存以及每个磁盘挂载点的历史序列，周期性采样并检查阈值。
///
/// 状态流转：Uninitialized -> Initialized -> Terminated
///
/// 单次采样失败只记录日志，对应序列本周期不增长，不向调用方传播错误。

use chrono::{DateTime, Utc};
use common::{
    BoundedSeries, CpuCounters, DiskSnapshot, Error, MemorySnapshot, ResourceKind, Result,
    ThresholdBreach, Thresholds, DEFAULT_HISTORY_CAPACITY,
};
use serde::Serialize;
use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, trace, warn};

use super::reader::MetricSource;

/// 两次有效采样之间的最小间隔
pub const MIN_UPDATE_INTERVAL: Duration = Duration::from_millis(1000);

/// 监控器配置
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorConfig {
    /// 每个序列保留的样本数
    pub history_capacity: usize,
    /// 更快到达的 update 调用会被静默忽略，不得小于 `MIN_UPDATE_INTERVAL`
    pub min_update_interval: Duration,
    pub thresholds: Thresholds,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            min_update_interval: MIN_UPDATE_INTERVAL,
            thresholds: Thresholds::default(),
        }
    }
}

impl MonitorConfig {
    pub fn validate(&self) -> Result<()> {
        if self.history_capacity == 0 {
            return Err(Error::Config("history capacity must be at least 1".to_string()));
        }
        if self.min_update_interval < MIN_UPDATE_INTERVAL {
            return Err(Error::Config(format!(
                "min update interval must be at least {:?}, got {:?}",
                MIN_UPDATE_INTERVAL, self.min_update_interval
            )));
        }
        self.thresholds.validate()
    }
}

/// 监控器状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MonitorState {
    Uninitialized,
    Initialized,
    Terminated,
}

/// 单个序列的统计摘要
#[derive(Debug, Clone, Default, Serialize)]
pub struct SeriesSummary {
    pub samples: usize,
    pub latest: Option<f64>,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

impl SeriesSummary {
    fn of(series: &BoundedSeries) -> Self {
        Self {
            samples: series.size(),
            latest: series.latest(),
            mean: series.mean(),
            min: series.min(),
            max: series.max(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DiskStatus {
    #[serde(flatten)]
    pub snapshot: DiskSnapshot,
    pub history: SeriesSummary,
}

/// 监控器当前状态汇总
#[derive(Debug, Clone, Serialize)]
pub struct MonitorStatus {
    pub state: MonitorState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sampled_at: Option<DateTime<Utc>>,
    pub cpu_usage: f64,
    pub cpu_history: SeriesSummary,
    pub memory: MemorySnapshot,
    pub memory_history: SeriesSummary,
    pub disks: Vec<DiskStatus>,
}

pub struct ResourceMonitor {
    source: Box<dyn MetricSource>,
    thresholds: Thresholds,
    history_capacity: NonZeroUsize,
    min_update_interval: Duration,
    state: MonitorState,

    prev_cpu: CpuCounters,
    cpu_usage: f64,
    memory: MemorySnapshot,
    disks: Vec<DiskSnapshot>,

    cpu_history: Arc<BoundedSeries>,
    memory_history: Arc<BoundedSeries>,
    /// 挂载点 -> 历史序列，只增不减，随监控器一起释放
    disk_history: HashMap<String, Arc<BoundedSeries>>,

    last_update: Option<Instant>,
    sampled_at: Option<DateTime<Utc>>,
}

impl ResourceMonitor {
    /// 创建监控器，配置非法时返回 `Error::Config`
    pub fn new(config: MonitorConfig, source: Box<dyn MetricSource>) -> Result<Self> {
        config.validate()?;
        let history_capacity = NonZeroUsize::new(config.history_capacity)
            .ok_or_else(|| Error::Config("history capacity must be at least 1".to_string()))?;

        Ok(Self {
            source,
            thresholds: config.thresholds,
            history_capacity,
            min_update_interval: config.min_update_interval,
            state: MonitorState::Uninitialized,
            prev_cpu: CpuCounters::default(),
            cpu_usage: 0.0,
            memory: MemorySnapshot::default(),
            disks: Vec::new(),
            cpu_history: Arc::new(BoundedSeries::with_capacity(history_capacity)),
            memory_history: Arc::new(BoundedSeries::with_capacity(history_capacity)),
            disk_history: HashMap::new(),
            last_update: None,
            sampled_at: None,
        })
    }

    pub fn state(&self) -> MonitorState {
        self.state
    }

    pub fn thresholds(&self) -> Thresholds {
        self.thresholds
    }

    /// 运行中替换告警阈值，下一次 check_thresholds 即生效
    ///
    /// 非法阈值返回 `Error::Config`，原阈值保持不变
    pub fn set_thresholds(&mut self, thresholds: Thresholds) -> Result<()> {
        thresholds.validate()?;
        if thresholds != self.thresholds {
            info!(
                "告警阈值更新: CPU {}%，内存 {}%，磁盘 {}%",
                thresholds.cpu, thresholds.memory, thresholds.disk
            );
            self.thresholds = thresholds;
        }
        Ok(())
    }

    pub fn initialize(&mut self) -> Result<()> {
        self.initialize_at(Instant::now())
    }

    /// 读取 CPU 基线、内存和磁盘列表
    ///
    /// 任一读取失败则返回 `Error::Initialization`，状态保持 Uninitialized
    pub fn initialize_at(&mut self, now: Instant) -> Result<()> {
        if self.state != MonitorState::Uninitialized {
            return Err(Error::Initialization(format!(
                "monitor is {:?}, cannot initialize again",
                self.state
            )));
        }

        let cpu = self
            .source
            .read_cpu_counters()
            .map_err(|e| Error::Initialization(format!("读取初始 CPU 计数器失败: {}", e)))?;
        let memory = self
            .source
            .read_memory()
            .map_err(|e| Error::Initialization(format!("读取内存信息失败: {}", e)))?;
        let disks = self
            .source
            .enumerate_disks()
            .map_err(|e| Error::Initialization(format!("读取磁盘信息失败: {}", e)))?;

        self.prev_cpu = cpu;
        self.memory = memory;
        for disk in &disks {
            self.disk_series(&disk.mountpoint);
        }
        self.disks = disks;
        self.last_update = Some(now);
        self.state = MonitorState::Initialized;

        info!(
            "资源监控器初始化完成，发现 {} 个磁盘，历史容量 {}",
            self.disks.len(),
            self.history_capacity
        );
        Ok(())
    }

    pub fn update(&mut self) -> bool {
        self.update_at(Instant::now())
    }

    /// 执行一次采样，返回本次调用是否生效
    ///
    /// 未初始化、已终止或距上次生效不足最小间隔时不做任何改变
    pub fn update_at(&mut self, now: Instant) -> bool {
        if self.state != MonitorState::Initialized {
            trace!("监控器状态为 {:?}，忽略 update", self.state);
            return false;
        }

        if let Some(last) = self.last_update {
            if now.saturating_duration_since(last) < self.min_update_interval {
                trace!("距上次采样不足 {:?}，跳过", self.min_update_interval);
                return false;
            }
        }

        self.last_update = Some(now);
        self.sampled_at = Some(Utc::now());

        self.sample_cpu();
        self.sample_memory();
        self.sample_disks();
        true
    }

    fn sample_cpu(&mut self) {
        let current = match self.source.read_cpu_counters() {
            Ok(c) => c,
            Err(e) => {
                warn!("读取 CPU 计数器失败，本周期跳过: {}", e);
                return;
            }
        };

        match current.usage_since(&self.prev_cpu) {
            Some(usage) => {
                self.cpu_usage = usage;
                self.cpu_history.append(usage);
            }
            None => debug!("CPU 计数器无变化，跳过本次采样"),
        }
        self.prev_cpu = current;
    }

    fn sample_memory(&mut self) {
        match self.source.read_memory() {
            Ok(memory) => {
                self.memory_history.append(memory.percent);
                self.memory = memory;
            }
            Err(e) => warn!("读取内存信息失败，保留上次数据: {}", e),
        }
    }

    fn sample_disks(&mut self) {
        let disks = match self.source.enumerate_disks() {
            Ok(disks) => disks,
            Err(e) => {
                warn!("读取磁盘信息失败，保留上次数据: {}", e);
                return;
            }
        };

        for disk in &disks {
            self.disk_series(&disk.mountpoint).append(disk.percent);
        }
        self.disks = disks;
    }

    /// 获取挂载点的历史序列，首次出现时创建
    fn disk_series(&mut self, mountpoint: &str) -> Arc<BoundedSeries> {
        let capacity = self.history_capacity;
        self.disk_history
            .entry(mountpoint.to_string())
            .or_insert_with(|| {
                info!("开始跟踪磁盘挂载点: {}", mountpoint);
                Arc::new(BoundedSeries::with_capacity(capacity))
            })
            .clone()
    }

    /// 最近一次计算出的 CPU 使用率
    pub fn cpu_usage(&self) -> f64 {
        self.cpu_usage
    }

    pub fn memory_info(&self) -> &MemorySnapshot {
        &self.memory
    }

    /// 最近一次枚举到的磁盘（已消失的挂载点不在其中）
    pub fn disk_info(&self) -> &[DiskSnapshot] {
        &self.disks
    }

    pub fn cpu_history(&self) -> Arc<BoundedSeries> {
        self.cpu_history.clone()
    }

    pub fn memory_history(&self) -> Arc<BoundedSeries> {
        self.memory_history.clone()
    }

    /// 挂载点的历史序列，从未出现过的挂载点返回 None
    pub fn disk_history(&self, mountpoint: &str) -> Option<Arc<BoundedSeries>> {
        self.disk_history.get(mountpoint).cloned()
    }

    /// 所有曾经跟踪过的挂载点
    pub fn disk_mountpoints(&self) -> Vec<String> {
        let mut mountpoints: Vec<String> = self.disk_history.keys().cloned().collect();
        mountpoints.sort();
        mountpoints
    }

    /// 按优先级（CPU -> 内存 -> 按枚举顺序的磁盘）列出所有越界项
    pub fn breaches(&self) -> Vec<ThresholdBreach> {
        let t = &self.thresholds;
        let mut breaches = Vec::new();

        if self.cpu_usage >= t.cpu {
            breaches.push(ThresholdBreach {
                kind: ResourceKind::Cpu,
                message: format!("CPU 使用率过高: {}%", self.cpu_usage as i64),
                percent: self.cpu_usage,
                threshold: t.cpu,
                mountpoint: None,
            });
        }

        if self.memory.percent >= t.memory {
            breaches.push(ThresholdBreach {
                kind: ResourceKind::Memory,
                message: format!("内存使用率过高: {}%", self.memory.percent as i64),
                percent: self.memory.percent,
                threshold: t.memory,
                mountpoint: None,
            });
        }

        breaches.extend(
            self.disks
                .iter()
                .filter(|disk| disk.percent >= t.disk)
                .map(|disk| ThresholdBreach {
                    kind: ResourceKind::Disk,
                    message: format!(
                        "磁盘 {} 使用率过高: {}%",
                        disk.mountpoint, disk.percent as i64
                    ),
                    percent: disk.percent,
                    threshold: t.disk,
                    mountpoint: Some(disk.mountpoint.clone()),
                }),
        );

        breaches
    }

    /// 返回优先级最高的一个越界项
    pub fn check_thresholds(&self) -> Option<ThresholdBreach> {
        self.breaches().into_iter().next()
    }

    pub fn status(&self) -> MonitorStatus {
        let disks = self
            .disks
            .iter()
            .map(|disk| DiskStatus {
                snapshot: disk.clone(),
                history: self
                    .disk_history
                    .get(&disk.mountpoint)
                    .map(|s| SeriesSummary::of(s))
                    .unwrap_or_default(),
            })
            .collect();

        MonitorStatus {
            state: self.state,
            sampled_at: self.sampled_at,
            cpu_usage: self.cpu_usage,
            cpu_history: SeriesSummary::of(&self.cpu_history),
            memory: self.memory.clone(),
            memory_history: SeriesSummary::of(&self.memory_history),
            disks,
        }
    }

    /// 停止监控，之后的 update 调用均被忽略
    pub fn shutdown(&mut self) {
        if self.state != MonitorState::Terminated {
            info!("资源监控器已停止");
            self.state = MonitorState::Terminated;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    const MIB: u64 = 1024 * 1024;

    /// 可由测试控制的假主机，字段为 None 时对应读取失败
    #[derive(Default)]
    struct FakeHost {
        cpu: Option<CpuCounters>,
        memory: Option<MemorySnapshot>,
        disks: Option<Vec<DiskSnapshot>>,
    }

    #[derive(Clone, Default)]
    struct FakeSource(Arc<Mutex<FakeHost>>);

    impl FakeSource {
        fn set_cpu(&self, user: u64, idle: u64) {
            self.0.lock().unwrap().cpu = Some(CpuCounters {
                user,
                idle,
                ..Default::default()
            });
        }

        fn set_memory_percent(&self, used_pct: u64) {
            self.0.lock().unwrap().memory =
                Some(MemorySnapshot::new(1000, 0, 1000 - used_pct * 10, 0, 0).unwrap());
        }

        fn set_disks(&self, disks: &[(&str, u64)]) {
            self.0.lock().unwrap().disks = Some(
                disks
                    .iter()
                    .map(|(mp, used_pct)| {
                        DiskSnapshot::new("/dev/sda", *mp, "ext4", 1000 * MIB, used_pct * 10 * MIB, 0)
                    })
                    .collect(),
            );
        }

        fn fail_memory(&self) {
            self.0.lock().unwrap().memory = None;
        }

        fn fail_disks(&self) {
            self.0.lock().unwrap().disks = None;
        }
    }

    fn unavailable(what: &str) -> Error {
        Error::io(
            what,
            std::io::Error::new(std::io::ErrorKind::NotFound, "unavailable"),
        )
    }

    impl MetricSource for FakeSource {
        fn read_cpu_counters(&self) -> Result<CpuCounters> {
            self.0.lock().unwrap().cpu.ok_or_else(|| unavailable("cpu"))
        }

        fn read_memory(&self) -> Result<MemorySnapshot> {
            self.0
                .lock()
                .unwrap()
                .memory
                .clone()
                .ok_or_else(|| unavailable("memory"))
        }

        fn enumerate_disks(&self) -> Result<Vec<DiskSnapshot>> {
            self.0
                .lock()
                .unwrap()
                .disks
                .clone()
                .ok_or_else(|| unavailable("disks"))
        }
    }

    fn healthy_source() -> FakeSource {
        let source = FakeSource::default();
        source.set_cpu(0, 0);
        source.set_memory_percent(50);
        source.set_disks(&[("/", 40)]);
        source
    }

    fn monitor_with(source: &FakeSource) -> ResourceMonitor {
        ResourceMonitor::new(MonitorConfig::default(), Box::new(source.clone())).unwrap()
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = MonitorConfig {
            history_capacity: 0,
            ..Default::default()
        };
        let result = ResourceMonitor::new(config, Box::new(FakeSource::default()));
        assert!(matches!(result, Err(Error::Config(_))));

        let config = MonitorConfig {
            thresholds: Thresholds {
                memory: 150.0,
                ..Default::default()
            },
            ..Default::default()
        };
        let result = ResourceMonitor::new(config, Box::new(FakeSource::default()));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_initialize_failure_keeps_uninitialized() {
        let source = healthy_source();
        source.fail_disks();
        let mut monitor = monitor_with(&source);

        let err = monitor.initialize_at(Instant::now()).unwrap_err();
        assert!(matches!(err, Error::Initialization(_)));
        assert_eq!(monitor.state(), MonitorState::Uninitialized);
        assert!(monitor.disk_mountpoints().is_empty());

        // 未初始化时 update 无效果
        assert!(!monitor.update_at(Instant::now() + Duration::from_secs(5)));
        assert_eq!(monitor.cpu_history().size(), 0);
    }

    #[test]
    fn test_initialize_seeds_disk_series() {
        let source = healthy_source();
        source.set_disks(&[("/", 40), ("/home", 70)]);
        let mut monitor = monitor_with(&source);

        monitor.initialize_at(Instant::now()).unwrap();
        assert_eq!(monitor.state(), MonitorState::Initialized);
        assert_eq!(monitor.disk_mountpoints(), vec!["/".to_string(), "/home".to_string()]);
        assert_eq!(monitor.disk_history("/home").unwrap().size(), 0);
        assert_eq!(monitor.memory_info().percent, 50.0);
        assert!(monitor.initialize_at(Instant::now()).is_err());
    }

    #[test]
    fn test_update_computes_cpu_delta() {
        let source = healthy_source();
        let mut monitor = monitor_with(&source);
        let t0 = Instant::now();
        monitor.initialize_at(t0).unwrap();

        source.set_cpu(30, 70);
        assert!(monitor.update_at(t0 + Duration::from_secs(1)));
        assert_eq!(monitor.cpu_usage(), 30.0);

        source.set_cpu(120, 80);
        assert!(monitor.update_at(t0 + Duration::from_secs(2)));
        assert_eq!(monitor.cpu_usage(), 90.0);
        assert_eq!(monitor.cpu_history().snapshot(), vec![30.0, 90.0]);
        assert_eq!(monitor.memory_history().size(), 2);
        assert_eq!(monitor.disk_history("/").unwrap().snapshot(), vec![40.0, 40.0]);
    }

    #[test]
    fn test_zero_cpu_delta_skips_append() {
        let source = healthy_source();
        source.set_cpu(500, 500);
        let mut monitor = monitor_with(&source);
        let t0 = Instant::now();
        monitor.initialize_at(t0).unwrap();

        assert!(monitor.update_at(t0 + Duration::from_secs(1)));
        assert_eq!(monitor.cpu_history().size(), 0);
        assert_eq!(monitor.memory_history().size(), 1);
    }

    #[test]
    fn test_sub_interval_updates_ignored() {
        let source = healthy_source();
        let mut monitor = monitor_with(&source);
        let t0 = Instant::now();
        monitor.initialize_at(t0).unwrap();

        source.set_cpu(50, 50);
        assert!(!monitor.update_at(t0 + Duration::from_millis(400)));
        assert!(monitor.update_at(t0 + Duration::from_millis(1000)));
        source.set_cpu(100, 100);
        assert!(!monitor.update_at(t0 + Duration::from_millis(1500)));

        assert_eq!(monitor.cpu_history().size(), 1);
        assert_eq!(monitor.memory_history().size(), 1);
    }

    #[test]
    fn test_memory_failure_retains_snapshot() {
        let source = healthy_source();
        let mut monitor = monitor_with(&source);
        let t0 = Instant::now();
        monitor.initialize_at(t0).unwrap();

        source.set_memory_percent(60);
        source.set_cpu(10, 10);
        assert!(monitor.update_at(t0 + Duration::from_secs(1)));

        source.fail_memory();
        source.set_cpu(20, 20);
        assert!(monitor.update_at(t0 + Duration::from_secs(2)));

        assert_eq!(monitor.memory_info().percent, 60.0);
        assert_eq!(monitor.memory_history().size(), 1);
        assert_eq!(monitor.cpu_history().size(), 2);
    }

    #[test]
    fn test_disk_series_lifecycle() {
        let source = healthy_source();
        let mut monitor = monitor_with(&source);
        let t0 = Instant::now();
        monitor.initialize_at(t0).unwrap();

        source.set_disks(&[("/", 40), ("/mnt/usb", 10)]);
        monitor.update_at(t0 + Duration::from_secs(1));
        assert_eq!(monitor.disk_history("/mnt/usb").unwrap().size(), 1);

        // 挂载点消失：快照列表中移除，历史保留
        source.set_disks(&[("/", 45)]);
        monitor.update_at(t0 + Duration::from_secs(2));
        assert_eq!(monitor.disk_info().len(), 1);
        assert_eq!(monitor.disk_history("/mnt/usb").unwrap().snapshot(), vec![10.0]);
        assert_eq!(monitor.disk_history("/").unwrap().snapshot(), vec![40.0, 45.0]);

        // 枚举失败时保留上次列表
        source.fail_disks();
        monitor.update_at(t0 + Duration::from_secs(3));
        assert_eq!(monitor.disk_info().len(), 1);
        assert_eq!(monitor.disk_history("/").unwrap().size(), 2);
        assert!(monitor.disk_history("/never").is_none());
    }

    #[test]
    fn test_threshold_priority() {
        let source = healthy_source();
        let mut monitor = monitor_with(&source);
        let t0 = Instant::now();
        monitor.initialize_at(t0).unwrap();
        assert!(monitor.check_thresholds().is_none());

        source.set_cpu(90, 10);
        source.set_memory_percent(95);
        source.set_disks(&[("/", 40), ("/data", 95), ("/backup", 99)]);
        monitor.update_at(t0 + Duration::from_secs(1));

        let breach = monitor.check_thresholds().unwrap();
        assert_eq!(breach.kind, ResourceKind::Cpu);
        assert_eq!(breach.message, "CPU 使用率过高: 90%");

        let all = monitor.breaches();
        let kinds: Vec<ResourceKind> = all.iter().map(|b| b.kind).collect();
        assert_eq!(
            kinds,
            vec![ResourceKind::Cpu, ResourceKind::Memory, ResourceKind::Disk, ResourceKind::Disk]
        );
        assert_eq!(all[2].mountpoint.as_deref(), Some("/data"));
    }

    #[test]
    fn test_disk_breach_in_enumeration_order() {
        let source = healthy_source();
        let mut monitor = monitor_with(&source);
        let t0 = Instant::now();
        monitor.initialize_at(t0).unwrap();

        source.set_cpu(10, 90);
        source.set_disks(&[("/backup", 92), ("/data", 99)]);
        monitor.update_at(t0 + Duration::from_secs(1));

        let breach = monitor.check_thresholds().unwrap();
        assert_eq!(breach.kind, ResourceKind::Disk);
        assert_eq!(breach.mountpoint.as_deref(), Some("/backup"));
        assert!(breach.message.contains("/backup"));
    }

    #[test]
    fn test_guard_below_minimum_rejected() {
        let config = MonitorConfig {
            min_update_interval: Duration::ZERO,
            ..Default::default()
        };
        let result = ResourceMonitor::new(config, Box::new(FakeSource::default()));
        assert!(matches!(result, Err(Error::Config(_))));

        let config = MonitorConfig {
            min_update_interval: Duration::from_secs(5),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_thresholds_changed_at_runtime() {
        let source = healthy_source();
        let mut monitor = monitor_with(&source);
        let t0 = Instant::now();
        monitor.initialize_at(t0).unwrap();

        source.set_cpu(60, 40);
        source.set_memory_percent(70);
        monitor.update_at(t0 + Duration::from_secs(1));
        assert!(monitor.check_thresholds().is_none());

        monitor
            .set_thresholds(Thresholds {
                memory: 65.0,
                ..monitor.thresholds()
            })
            .unwrap();
        let breach = monitor.check_thresholds().unwrap();
        assert_eq!(breach.kind, ResourceKind::Memory);
        assert_eq!(breach.threshold, 65.0);

        let rejected = monitor.set_thresholds(Thresholds {
            cpu: 0.0,
            ..monitor.thresholds()
        });
        assert!(matches!(rejected, Err(Error::Config(_))));
        assert_eq!(monitor.thresholds().cpu, 85.0);
        assert_eq!(monitor.thresholds().memory, 65.0);
    }

    #[test]
    fn test_shutdown_stops_updates() {
        let source = healthy_source();
        let mut monitor = monitor_with(&source);
        let t0 = Instant::now();
        monitor.initialize_at(t0).unwrap();
        monitor.shutdown();

        source.set_cpu(50, 50);
        assert!(!monitor.update_at(t0 + Duration::from_secs(10)));
        assert_eq!(monitor.state(), MonitorState::Terminated);
    }

    #[test]
    fn test_status_serialization() {
        let source = healthy_source();
        let mut monitor = monitor_with(&source);
        let t0 = Instant::now();
        monitor.initialize_at(t0).unwrap();
        source.set_cpu(25, 75);
        monitor.update_at(t0 + Duration::from_secs(1));

        let status = monitor.status();
        assert_eq!(status.cpu_history.samples, 1);
        assert_eq!(status.disks[0].history.latest, Some(40.0));

        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["state"], "initialized");
        assert_eq!(json["cpu_usage"], 25.0);
        assert_eq!(json["disks"][0]["mountpoint"], "/");
    }
}
