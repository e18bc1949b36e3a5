/// 配置管理
///
/// 阈值和采样参数保存在 key=value 格式的文件中，
/// 加载顺序：默认值 -> 配置文件 -> `SYSMON_*` 环境变量

use common::models::validate_threshold;
use common::{Error, Result, Thresholds, DEFAULT_HISTORY_CAPACITY};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use crate::metrics::{MonitorConfig, MIN_UPDATE_INTERVAL};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// CPU 告警阈值（百分比）
    pub cpu_threshold: f64,
    /// 内存告警阈值（百分比）
    pub memory_threshold: f64,
    /// 磁盘告警阈值（百分比）
    pub disk_threshold: f64,
    /// 采样周期（毫秒）
    pub update_interval: u64,
    /// 同类告警的最小间隔（秒）
    pub notification_cooldown: u64,
    /// 每个指标保留的样本数
    pub history_size: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            cpu_threshold: 85.0,
            memory_threshold: 85.0,
            disk_threshold: 90.0,
            update_interval: 1000,
            notification_cooldown: 300,
            history_size: DEFAULT_HISTORY_CAPACITY,
        }
    }
}

fn config_error(e: ::config::ConfigError) -> Error {
    Error::Config(e.to_string())
}

impl Settings {
    /// 默认配置文件路径：~/.config/system-monitor/settings.conf
    pub fn default_path() -> PathBuf {
        match std::env::var_os("HOME") {
            Some(home) => PathBuf::from(home)
                .join(".config")
                .join("system-monitor")
                .join("settings.conf"),
            None => PathBuf::from("settings.conf"),
        }
    }

    /// 加载配置，文件不存在时使用默认值
    pub fn load(path: &Path) -> Result<Self> {
        Self::load_with_env(path, None)
    }

    /// 加载配置，文件不存在时把加载结果（含环境变量覆盖）写入该文件
    pub fn load_or_create(path: &Path) -> Result<Self> {
        Self::load_or_create_with_env(path, None)
    }

    fn load_or_create_with_env(
        path: &Path,
        env: Option<::config::Map<String, String>>,
    ) -> Result<Self> {
        let settings = Self::load_with_env(path, env)?;
        if !path.exists() {
            settings.save(path)?;
            info!("📝 已写入配置文件: {}", path.display());
        }
        Ok(settings)
    }

    /// `env` 为 None 时读取进程环境变量
    fn load_with_env(path: &Path, env: Option<::config::Map<String, String>>) -> Result<Self> {
        let settings: Settings = ::config::Config::builder()
            .add_source(
                ::config::File::new(&path.to_string_lossy(), ::config::FileFormat::Ini)
                    .required(false),
            )
            .add_source(
                ::config::Environment::with_prefix("SYSMON")
                    .try_parsing(true)
                    .source(env),
            )
            .build()
            .map_err(config_error)?
            .try_deserialize()
            .map_err(config_error)?;

        settings.validate()?;
        Ok(settings)
    }

    /// 以 key=value 格式保存，必要时创建目录
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent.display().to_string(), e))?;
        }

        fs::write(path, self.to_key_value()).map_err(|e| Error::io(path.display().to_string(), e))
    }

    pub fn to_key_value(&self) -> String {
        format!(
            "cpu_threshold={}\nmemory_threshold={}\ndisk_threshold={}\nupdate_interval={}\nnotification_cooldown={}\nhistory_size={}\n",
            self.cpu_threshold,
            self.memory_threshold,
            self.disk_threshold,
            self.update_interval,
            self.notification_cooldown,
            self.history_size,
        )
    }

    pub fn validate(&self) -> Result<()> {
        self.thresholds().validate()?;
        if self.update_interval == 0 {
            return Err(Error::Config("update_interval must be greater than 0".to_string()));
        }
        if self.history_size == 0 {
            return Err(Error::Config("history_size must be at least 1".to_string()));
        }
        Ok(())
    }

    pub fn set_cpu_threshold(&mut self, threshold: f64) -> Result<()> {
        validate_threshold("cpu", threshold)?;
        self.cpu_threshold = threshold;
        Ok(())
    }

    pub fn set_memory_threshold(&mut self, threshold: f64) -> Result<()> {
        validate_threshold("memory", threshold)?;
        self.memory_threshold = threshold;
        Ok(())
    }

    pub fn set_disk_threshold(&mut self, threshold: f64) -> Result<()> {
        validate_threshold("disk", threshold)?;
        self.disk_threshold = threshold;
        Ok(())
    }

    pub fn set_update_interval(&mut self, interval_ms: u64) -> Result<()> {
        if interval_ms == 0 {
            return Err(Error::Config("update_interval must be greater than 0".to_string()));
        }
        self.update_interval = interval_ms;
        Ok(())
    }

    pub fn set_notification_cooldown(&mut self, cooldown_secs: u64) {
        self.notification_cooldown = cooldown_secs;
    }

    /// 恢复默认值
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn thresholds(&self) -> Thresholds {
        Thresholds {
            cpu: self.cpu_threshold,
            memory: self.memory_threshold,
            disk: self.disk_threshold,
        }
    }

    pub fn update_interval(&self) -> Duration {
        Duration::from_millis(self.update_interval)
    }

    pub fn notification_cooldown(&self) -> Duration {
        Duration::from_secs(self.notification_cooldown)
    }

    pub fn monitor_config(&self) -> MonitorConfig {
        MonitorConfig {
            history_capacity: self.history_size,
            min_update_interval: MIN_UPDATE_INTERVAL,
            thresholds: self.thresholds(),
        }
    }
}
