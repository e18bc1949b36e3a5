use thiserror::Error;

/// 统一错误类型
///
/// 错误分为三类：
/// - `Initialization`：启动时的基线读取失败，调用方决定是否中止启动
/// - `Io` / `Parse`：单次采样失败，属于瞬时错误，下一个周期自动恢复
/// - `Config`：阈值、容量等配置非法，在构造时校验
#[derive(Error, Debug)]
pub enum Error {
    #[error("初始化错误: {0}")]
    Initialization(String),

    #[error("读取 {path} 失败: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("解析错误: {0}")]
    Parse(String),

    #[error("配置错误: {0}")]
    Config(String),

    #[error("序列化错误: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("其他错误: {0}")]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// 构造带路径的 IO 错误
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// 是否为单次采样的瞬时错误（跳过本周期即可）
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Io { .. } | Self::Parse(_))
    }
}

/// 统一结果类型
pub type Result<T> = std::result::Result<T, Error>;
