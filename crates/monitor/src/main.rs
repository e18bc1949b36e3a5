/// System Resource Monitor
///
/// 以固定周期采样 CPU、内存、磁盘使用率，维护滚动历史并在超过阈值时告警

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use common::BoundedSeries;
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use monitor::node::HostInfo;
use monitor::{LogNotifier, ProcfsReader, ResourceMonitor, Sampler, Settings};

/// 历史统计日志的输出周期
const REPORT_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 初始化日志
    // 可以通过环境变量 RUST_LOG 设置日志级别，例如：
    // RUST_LOG=debug cargo run
    // RUST_LOG=sysmon=trace cargo run
    tracing_subscriber::fmt()
        .with_target(false)
        .with_thread_ids(true)
        .with_line_number(true)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("🚀 启动 System Resource Monitor...");

    // 加载配置
    dotenvy::dotenv().ok();
    let settings_path = std::env::var_os("SYSMON_SETTINGS")
        .map(PathBuf::from)
        .unwrap_or_else(Settings::default_path);
    let settings = Settings::load_or_create(&settings_path)?;
    info!("✅ 配置加载成功: {}", settings_path.display());
    debug!("{:?}", settings);

    let host = HostInfo::collect();
    info!("🖥️ 主机: {}", host.summary());

    // 初始化监控器
    info!("📊 初始化资源监控器...");
    let mut monitor = ResourceMonitor::new(settings.monitor_config(), Box::new(ProcfsReader::new()))?;
    monitor.initialize()?;

    let reporter = tokio::spawn(report_history(
        monitor.cpu_history(),
        monitor.memory_history(),
        REPORT_INTERVAL,
    ));

    let (reload_tx, reload_rx) = mpsc::channel(4);
    let reloader = tokio::spawn(reload_on_hangup(settings_path, reload_tx));

    let mut sampler = Sampler::new(monitor, Arc::new(LogNotifier), settings.notification_cooldown());
    sampler
        .run(settings.update_interval(), reload_rx, async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("监听退出信号失败: {}", e);
            }
        })
        .await;

    reporter.abort();
    reloader.abort();
    info!("👋 已退出");

    Ok(())
}

/// 收到 SIGHUP 时重新读取配置文件并交给采样循环
async fn reload_on_hangup(path: PathBuf, tx: mpsc::Sender<Settings>) {
    let mut hangup = match signal(SignalKind::hangup()) {
        Ok(s) => s,
        Err(e) => {
            warn!("无法注册 SIGHUP 处理: {}", e);
            return;
        }
    };

    while hangup.recv().await.is_some() {
        info!("收到 SIGHUP，重新加载配置: {}", path.display());
        match Settings::load(&path) {
            Ok(settings) => {
                if tx.send(settings).await.is_err() {
                    break;
                }
            }
            Err(e) => warn!("重新加载配置失败，继续使用当前配置: {}", e),
        }
    }
}

/// 定期输出 CPU 与内存历史的统计值，只持有序列的共享引用
async fn report_history(cpu: Arc<BoundedSeries>, memory: Arc<BoundedSeries>, every: Duration) {
    let mut ticker = tokio::time::interval(every);
    // 第一次 tick 立即返回，此时还没有数据
    ticker.tick().await;

    loop {
        ticker.tick().await;
        if cpu.is_empty() && memory.is_empty() {
            continue;
        }
        info!(
            "📈 最近 {} 个样本 CPU 平均 {:.1}% (最低 {:.1}%, 最高 {:.1}%)，内存平均 {:.1}% (最低 {:.1}%, 最高 {:.1}%)",
            cpu.size(),
            cpu.mean(),
            cpu.min(),
            cpu.max(),
            memory.mean(),
            memory.min(),
            memory.max(),
        );
    }
}
