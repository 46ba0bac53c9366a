//! 错误类型
//!
//! `LookupError` 描述单个子域名查询的失败，只影响该标签本身；
//! `BruteError` 描述构造或运行阶段的致命错误。

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// 单次DNS查询失败的原因
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    /// 在超时时间内没有收到应答
    #[error("lookup timed out")]
    Timeout,
    /// 域名不存在 (NXDOMAIN) 或没有地址记录
    #[error("no such host")]
    NotFound,
    /// 传输层或服务器错误
    #[error("network error: {0}")]
    Network(String),
}

impl LookupError {
    /// 简短的错误类别名，用于输出
    pub fn kind_str(&self) -> &'static str {
        match self {
            LookupError::Timeout => "timeout",
            LookupError::NotFound => "not-found",
            LookupError::Network(_) => "network",
        }
    }
}

/// 构造或运行阶段的错误
#[derive(Debug, Error)]
pub enum BruteError {
    /// 目标域名不合法
    #[error("invalid domain '{domain}': {reason}")]
    InvalidDomain { domain: String, reason: String },

    /// 配置项不合法
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// DNS服务器地址无法解析
    #[error("invalid nameserver '{nameserver}': {reason}")]
    InvalidNameserver { nameserver: String, reason: String },

    /// 字典文件读取失败
    #[error("failed to read wordlist {}: {source}", .path.display())]
    Wordlist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// 内部错误
    #[error("internal error: {0}")]
    Internal(String),
}

impl BruteError {
    pub(crate) fn invalid_domain(domain: impl Into<String>, reason: impl Into<String>) -> Self {
        BruteError::InvalidDomain {
            domain: domain.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_nameserver(nameserver: impl Into<String>, reason: impl Into<String>) -> Self {
        BruteError::InvalidNameserver {
            nameserver: nameserver.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn zero_timeout(timeout: Duration) -> Self {
        BruteError::InvalidConfig(format!("timeout must be positive, got {:?}", timeout))
    }
}
