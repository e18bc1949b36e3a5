/// 告警通知
///
/// 按资源类型记录上次告警时间，冷却期内的重复告警被抑制。
/// 实际的桌面通知通道不在本模块范围内，默认实现写入日志。

use common::{ResourceKind, ThresholdBreach};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// 通知发送 Trait
pub trait Notifier: Send + Sync {
    fn notify(&self, title: &str, breach: &ThresholdBreach);
}

/// 写入日志的通知器
#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, title: &str, breach: &ThresholdBreach) {
        warn!(
            kind = %breach.kind,
            percent = breach.percent,
            threshold = breach.threshold,
            "🔔 [{}] {}",
            title,
            breach.message
        );
    }
}

/// 告警冷却门
#[derive(Debug, Default)]
pub struct AlertGate {
    last_sent: HashMap<ResourceKind, Instant>,
}

impl AlertGate {
    /// 默认告警标题
    pub const TITLE: &'static str = "系统资源告警";

    pub fn new() -> Self {
        Self::default()
    }

    /// 该资源类型是否在冷却期内发送过告警
    pub fn was_recently_sent(&self, kind: ResourceKind, cooldown: Duration, now: Instant) -> bool {
        self.last_sent
            .get(&kind)
            .is_some_and(|sent| now.saturating_duration_since(*sent) < cooldown)
    }

    pub fn record(&mut self, kind: ResourceKind, now: Instant) {
        self.last_sent.insert(kind, now);
    }

    /// 冷却期外则发送告警并记录时间，返回是否已发送
    pub fn dispatch(
        &mut self,
        breach: &ThresholdBreach,
        cooldown: Duration,
        now: Instant,
        notifier: &dyn Notifier,
    ) -> bool {
        if self.was_recently_sent(breach.kind, cooldown, now) {
            debug!("{} 告警处于冷却期，忽略", breach.kind);
            return false;
        }

        self.record(breach.kind, now);
        notifier.notify(Self::TITLE, breach);
        true
    }
}
