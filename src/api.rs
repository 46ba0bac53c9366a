use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use log::{info, warn};

use crate::enumerator::{EnumerationSummary, Enumerator, OutcomeKind, ResultSink, DEFAULT_CONCURRENCY};
use crate::error::BruteError;
use crate::output::CollectingSink;
use crate::resolver::{DnsResolver, HostLookup};
use crate::util::normalize_domain;
use crate::wildcard::{
    WildcardDetector, WildcardVerdict, DEFAULT_RANDOM_LABEL_LENGTH, DEFAULT_WILDCARD_TEST_COUNT,
};

/// 默认查询超时
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);
/// 默认DNS服务器
pub const DEFAULT_RESOLVER: &str = "8.8.8.8";

/// 域名暴破配置
#[derive(Debug, Clone)]
pub struct SubdomainBruteConfig {
    /// 目标根域名
    pub domain: String,
    /// DNS服务器，`host` 或 `host:port`
    pub resolver: String,
    /// 单次查询超时
    pub timeout: Duration,
    /// 同时进行的查询数上限
    pub concurrency: usize,
    /// 泛解析检测的随机探测次数
    pub wildcard_test_count: usize,
    /// 随机探测标签长度
    pub random_label_length: usize,
    /// 是否检测泛解析并标记命中的结果
    pub skip_wildcard: bool,
}

impl Default for SubdomainBruteConfig {
    fn default() -> Self {
        SubdomainBruteConfig {
            domain: String::new(),
            resolver: DEFAULT_RESOLVER.to_string(),
            timeout: DEFAULT_TIMEOUT,
            concurrency: DEFAULT_CONCURRENCY,
            wildcard_test_count: DEFAULT_WILDCARD_TEST_COUNT,
            random_label_length: DEFAULT_RANDOM_LABEL_LENGTH,
            skip_wildcard: true,
        }
    }
}

impl SubdomainBruteConfig {
    /// 检查配置，返回规范化后的域名
    pub fn validate(&self) -> Result<String, BruteError> {
        let domain = normalize_domain(&self.domain)?;
        if self.timeout.is_zero() {
            return Err(BruteError::zero_timeout(self.timeout));
        }
        if self.concurrency == 0 {
            return Err(BruteError::InvalidConfig("concurrency must be at least 1".to_string()));
        }
        if self.wildcard_test_count == 0 {
            return Err(BruteError::InvalidConfig(
                "wildcard test count must be at least 1".to_string(),
            ));
        }
        if self.random_label_length == 0 || self.random_label_length > 63 {
            return Err(BruteError::InvalidConfig(format!(
                "random label length must be between 1 and 63, got {}",
                self.random_label_length
            )));
        }
        Ok(domain)
    }
}

/// 发现的子域名
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubdomainResult {
    pub domain: String,
    pub addresses: Vec<IpAddr>,
}

/// 域名暴破引擎
pub struct SubdomainBruteEngine<R = DnsResolver> {
    config: SubdomainBruteConfig,
    domain: String,
    resolver: Arc<R>,
}

impl SubdomainBruteEngine<DnsResolver> {
    /// 创建新的暴破引擎，使用配置中的DNS服务器
    pub async fn new(config: SubdomainBruteConfig) -> Result<Self, BruteError> {
        config.validate()?;
        let resolver = DnsResolver::new(&config.resolver, config.timeout).await?;
        info!("using nameserver {}", resolver.nameserver());
        Self::with_resolver(config, Arc::new(resolver))
    }
}

impl<R: HostLookup> SubdomainBruteEngine<R> {
    /// 使用自定义的查询实现创建引擎
    pub fn with_resolver(config: SubdomainBruteConfig, resolver: Arc<R>) -> Result<Self, BruteError> {
        let domain = config.validate()?;
        Ok(SubdomainBruteEngine {
            config,
            domain,
            resolver,
        })
    }

    pub fn config(&self) -> &SubdomainBruteConfig {
        &self.config
    }

    /// 规范化后的目标域名
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// 检测泛解析，关闭检测时返回空结论
    pub async fn detect_wildcard(&self) -> WildcardVerdict {
        if !self.config.skip_wildcard {
            return WildcardVerdict::none();
        }

        let detector = WildcardDetector::new(
            Arc::clone(&self.resolver),
            self.config.wildcard_test_count,
            self.config.random_label_length,
        );
        detector.detect(&self.domain).await
    }

    /// 执行域名暴破，结果逐条交给 `sink`
    pub async fn run_brute_force(
        &self,
        words: Vec<String>,
        wildcard: WildcardVerdict,
        sink: Arc<dyn ResultSink>,
    ) -> Result<EnumerationSummary, BruteError> {
        if words.is_empty() {
            warn!("wordlist is empty, nothing to resolve");
        }

        let enumerator = Enumerator::new(
            &self.domain,
            words,
            Arc::clone(&self.resolver),
            self.config.concurrency,
        )?
        .with_wildcard(wildcard);

        info!(
            "resolving {} candidates under {} ({} concurrent)",
            enumerator.words().len(),
            enumerator.domain(),
            enumerator.concurrency()
        );
        enumerator.start(sink).await
    }

    /// 检测泛解析后暴破，返回排除泛解析命中后发现的子域名
    pub async fn discover(&self, words: Vec<String>) -> Result<Vec<SubdomainResult>, BruteError> {
        let wildcard = self.detect_wildcard().await;
        let sink = Arc::new(CollectingSink::new());
        self.run_brute_force(words, wildcard, sink.clone()).await?;

        Ok(sink
            .take_sorted()
            .into_iter()
            .filter(|outcome| outcome.kind == OutcomeKind::Found)
            .map(|outcome| SubdomainResult {
                domain: outcome.result.fqdn,
                addresses: outcome.result.addresses,
            })
            .collect())
    }
}

/// 便捷的域名暴破函数，使用默认配置
pub async fn brute_force_subdomains(
    domain: &str,
    words: Vec<String>,
) -> Result<Vec<SubdomainResult>, BruteError> {
    let config = SubdomainBruteConfig {
        domain: domain.to_string(),
        ..Default::default()
    };

    let engine = SubdomainBruteEngine::new(config).await?;
    engine.discover(words).await
}
