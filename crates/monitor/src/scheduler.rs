/// 采样调度
///
/// 按固定周期驱动 `ResourceMonitor`：采样 -> 检查阈值 -> 经冷却门发送告警。
/// 每次采样使用计时器的计划时刻而不是实际唤醒时刻，唤醒抖动不会让采样落入最小间隔保护。

use common::Result;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::config::Settings;
use crate::metrics::{MonitorStatus, ResourceMonitor};
use crate::notify::{AlertGate, Notifier};

pub struct Sampler {
    monitor: ResourceMonitor,
    gate: AlertGate,
    notifier: Arc<dyn Notifier>,
    cooldown: Duration,
    ticks: u64,
    samples: u64,
}

impl Sampler {
    pub fn new(monitor: ResourceMonitor, notifier: Arc<dyn Notifier>, cooldown: Duration) -> Self {
        Self {
            monitor,
            gate: AlertGate::new(),
            notifier,
            cooldown,
            ticks: 0,
            samples: 0,
        }
    }

    pub fn monitor(&self) -> &ResourceMonitor {
        &self.monitor
    }

    /// 计时器触发次数
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// 实际生效的采样次数
    pub fn samples(&self) -> u64 {
        self.samples
    }

    /// 应用重新加载的配置（告警阈值与冷却时间）
    ///
    /// 采样周期在启动时确定，修改后需重启生效
    pub fn apply_settings(&mut self, settings: &Settings) -> Result<()> {
        self.monitor.set_thresholds(settings.thresholds())?;
        self.cooldown = settings.notification_cooldown();
        Ok(())
    }

    /// 处理一次计时器触发，`deadline` 为本次触发的计划时刻
    pub fn on_tick(&mut self, deadline: Instant) -> bool {
        self.ticks += 1;

        let applied = self.monitor.update_at(deadline);
        if applied {
            self.samples += 1;
            log_status(&self.monitor.status());
        }

        if let Some(breach) = self.monitor.check_thresholds() {
            self.gate
                .dispatch(&breach, self.cooldown, deadline, self.notifier.as_ref());
        }
        applied
    }

    /// 以 `period` 为周期采样，直到 `shutdown` 完成
    ///
    /// `reloads` 收到的配置在下一次触发前生效
    pub async fn run<F>(&mut self, period: Duration, mut reloads: mpsc::Receiver<Settings>, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        info!("🎯 开始采样，周期 {:?}", period);

        loop {
            tokio::select! {
                deadline = ticker.tick() => {
                    self.on_tick(deadline.into_std());
                }
                Some(settings) = reloads.recv() => {
                    match self.apply_settings(&settings) {
                        Ok(()) => info!("🔄 配置已重新加载"),
                        Err(e) => warn!("忽略无效配置: {}", e),
                    }
                }
                _ = &mut shutdown => {
                    info!("收到退出信号，停止采样");
                    break;
                }
            }
        }

        self.monitor.shutdown();
        info!("共触发 {} 次，有效采样 {} 次", self.ticks, self.samples);
    }
}

fn log_status(status: &MonitorStatus) {
    match serde_json::to_string(status) {
        Ok(json) => debug!(target: "sysmon::status", "{}", json),
        Err(e) => debug!("序列化状态失败: {}", e),
    }
}
