use thiserror::Error;

/// 应用程序错误类型
///
/// 按层次划分：配置 → 切分 → 浏览器 → 单项抽取 → 工作进程 → 导出
#[derive(Debug, Error)]
pub enum AppError {
    /// 配置错误（启动前致命）
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 切分参数错误（编程错误，启动前致命）
    #[error("切分错误: {0}")]
    Partition(#[from] PartitionError),
    /// 浏览器启动或发现阶段错误
    #[error("浏览器错误: {0}")]
    Browser(#[from] BrowserError),
    /// 工作进程错误
    #[error("工作进程错误: {0}")]
    Worker(#[from] WorkerError),
    /// 导出错误
    #[error("导出错误: {0}")]
    Export(#[from] ExportError),
    /// 全部条目都没有抽取成功
    #[error("没有抽取到任何数据 (尝试 {attempted} 个条目)")]
    NothingExtracted { attempted: usize },
}

/// 数值规范化错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    /// 清理后的值既不是整数也不是浮点数
    #[error("字段 '{key}' 的值 '{value}' 无法解析为数字")]
    MalformedValue { key: String, value: String },
    /// 百分比字段改名后与同组已有字段重名
    #[error("字段 '{key}' 在同一徽章组中重复")]
    DuplicateKey { key: String },
}

/// 单个条目抽取错误
///
/// 所有变体都会在抽取器边界被捕获并转换为"跳过该条目"
#[derive(Debug, Error)]
pub enum ExtractError {
    /// 徽章组在限定时间内没有离开占位状态
    #[error("徽章组 '{group}' 在 {timeout_ms}ms 内未完成渲染")]
    Timeout { group: String, timeout_ms: u64 },
    /// 元素不存在
    #[error("未找到元素: {selector}")]
    ElementNotFound { selector: String },
    /// 数值规范化失败
    #[error(transparent)]
    Normalize(#[from] NormalizeError),
    /// 浏览器协议调用失败
    #[error("浏览器操作失败: {0}")]
    Browser(#[from] chromiumoxide::error::CdpError),
    /// 页面脚本返回值无法解析
    #[error("脚本结果解析失败: {0}")]
    Script(#[from] serde_json::Error),
}

/// 切分参数错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PartitionError {
    #[error("chunk_size 和 num_chunks 只能指定一个")]
    BothGiven,
    #[error("必须指定 chunk_size 或 num_chunks")]
    NeitherGiven,
    #[error("{name} 必须为正整数")]
    NotPositive { name: &'static str },
}

/// 浏览器启动/会话错误
#[derive(Debug, Error)]
pub enum BrowserError {
    /// 浏览器配置失败
    #[error("浏览器配置失败: {0}")]
    ConfigurationFailed(String),
    /// 启动失败
    #[error("启动浏览器失败: {0}")]
    LaunchFailed(#[source] chromiumoxide::error::CdpError),
    /// 创建页面或导航失败
    #[error("导航到 {url} 失败: {source}")]
    NavigationFailed {
        url: String,
        #[source]
        source: chromiumoxide::error::CdpError,
    },
    /// 关闭浏览器失败
    #[error("关闭浏览器失败: {0}")]
    CloseFailed(#[source] chromiumoxide::error::CdpError),
    /// 发现阶段失败
    #[error("获取待处理元素失败: {0}")]
    Discovery(#[from] ExtractError),
}

/// 工作进程错误（只影响该进程自身）
#[derive(Debug, Error)]
pub enum WorkerError {
    /// 子进程无法启动
    #[error("[进程 {index}] 启动失败: {source}")]
    Spawn {
        index: usize,
        #[source]
        source: std::io::Error,
    },
    /// 进程中途崩溃
    #[error("[进程 {index}] 崩溃: {reason}")]
    Crashed { index: usize, reason: String },
    /// 通信内容无法解析
    #[error("[进程 {index}] 通信失败: {reason}")]
    Protocol { index: usize, reason: String },
}

/// 结果写入错误
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("写入结果失败: {0}")]
    Io(#[from] std::io::Error),
    #[error("序列化结果失败: {0}")]
    Encode(#[from] serde_json::Error),
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
    /// 配置文件读取失败
    #[error("读取配置文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 配置文件解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    /// 配置值不合法
    #[error("配置项 {field} 不合法: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// 导出错误
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("写入 {path} 失败: {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },
    #[error("写入 {path} 失败: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

// ========== 便捷构造函数 ==========

impl ConfigError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

impl ExtractError {
    pub fn not_found(selector: impl Into<String>) -> Self {
        ExtractError::ElementNotFound {
            selector: selector.into(),
        }
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
