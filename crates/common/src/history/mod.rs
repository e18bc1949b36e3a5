/// 有界历史序列
///
/// 固定容量的 FIFO 采样缓冲区，满时淘汰最旧的样本。
/// 每个实例持有一把互斥锁，采集线程写入、展示端并发读取。

use std::collections::VecDeque;
use std::num::NonZeroUsize;
use std::sync::{Mutex, MutexGuard};

use crate::errors::{Error, Result};

/// 默认容量：1Hz 采样下保留 10 分钟
pub const DEFAULT_HISTORY_CAPACITY: usize = 600;

#[derive(Debug)]
pub struct BoundedSeries {
    samples: Mutex<VecDeque<f64>>,
    capacity: usize,
}

impl BoundedSeries {
    /// 创建指定容量的序列，容量必须 >= 1
    pub fn new(capacity: usize) -> Result<Self> {
        NonZeroUsize::new(capacity)
            .map(Self::with_capacity)
            .ok_or_else(|| Error::Config("history capacity must be at least 1".to_string()))
    }

    pub fn with_capacity(capacity: NonZeroUsize) -> Self {
        Self {
            samples: Mutex::new(VecDeque::with_capacity(capacity.get())),
            capacity: capacity.get(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<f64>> {
        // 锁内只有内存操作，中毒时数据仍然完整
        self.samples.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// 追加样本，满时先淘汰最旧的一个
    pub fn append(&self, value: f64) {
        let mut samples = self.lock();
        if samples.len() >= self.capacity {
            samples.pop_front();
        }
        samples.push_back(value);
    }

    /// 复制当前全部样本（最旧在前）
    pub fn snapshot(&self) -> Vec<f64> {
        self.lock().iter().copied().collect()
    }

    /// 最新样本
    pub fn latest(&self) -> Option<f64> {
        self.lock().back().copied()
    }

    /// 平均值
    ///
    /// 空序列返回 0.0，与真实的 0.0 无法区分，需要时先检查 `is_empty()`
    pub fn mean(&self) -> f64 {
        let samples = self.lock();
        if samples.is_empty() {
            return 0.0;
        }
        samples.iter().sum::<f64>() / samples.len() as f64
    }

    /// 最大值，空序列返回 0.0
    pub fn max(&self) -> f64 {
        let samples = self.lock();
        if samples.is_empty() {
            return 0.0;
        }
        samples.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    /// 最小值，空序列返回 0.0
    pub fn min(&self) -> f64 {
        let samples = self.lock();
        if samples.is_empty() {
            return 0.0;
        }
        samples.iter().copied().fold(f64::INFINITY, f64::min)
    }

    pub fn size(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// 清空样本，容量不变
    pub fn clear(&self) {
        self.lock().clear();
    }
}
