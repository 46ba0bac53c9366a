//! 并发子域名枚举
//!
//! 每个标签对应一个查询任务，同时运行的任务数由信号量限制。
//! 信号量许可在任务结束时释放，无论查询成功与否。

use std::net::IpAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{debug, error};
use serde::Serialize;
use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinSet};

use crate::error::{BruteError, LookupError};
use crate::output::CollectingSink;
use crate::resolver::HostLookup;
use crate::util::{join_fqdn, normalize_domain};
use crate::wildcard::WildcardVerdict;

/// 默认并发上限
pub const DEFAULT_CONCURRENCY: usize = 50;

/// 单个标签的解析结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionResult {
    pub label: String,
    pub fqdn: String,
    /// 按DNS应答顺序排列，不去重不排序
    pub addresses: Vec<IpAddr>,
    pub error: Option<LookupError>,
}

/// 结果分类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutcomeKind {
    Found,
    /// 解析成功但命中了泛解析地址
    Wildcard,
    NotFound,
    Error,
}

impl OutcomeKind {
    pub fn classify(result: &ResolutionResult, wildcard: &WildcardVerdict) -> Self {
        match &result.error {
            Some(LookupError::NotFound) => OutcomeKind::NotFound,
            Some(_) => OutcomeKind::Error,
            None if result.addresses.is_empty() => OutcomeKind::NotFound,
            None if wildcard.matches(&result.addresses) => OutcomeKind::Wildcard,
            None => OutcomeKind::Found,
        }
    }
}

/// 交给结果接收方的单条结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub result: ResolutionResult,
    pub kind: OutcomeKind,
}

/// 结果接收方
///
/// 每个标签恰好调用一次 `report`，调用可能来自不同的任务，顺序不定。
pub trait ResultSink: Send + Sync {
    fn report(&self, outcome: Outcome);
}

/// 一次枚举的统计
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnumerationSummary {
    pub total: usize,
    pub found: usize,
    pub wildcard: usize,
    pub not_found: usize,
    pub errors: usize,
    pub elapsed: Duration,
}

impl EnumerationSummary {
    fn record(&mut self, kind: OutcomeKind) {
        self.total += 1;
        match kind {
            OutcomeKind::Found => self.found += 1,
            OutcomeKind::Wildcard => self.wildcard += 1,
            OutcomeKind::NotFound => self.not_found += 1,
            OutcomeKind::Error => self.errors += 1,
        }
    }
}

/// 子域名枚举器
pub struct Enumerator<R> {
    domain: String,
    words: Vec<String>,
    resolver: Arc<R>,
    concurrency: usize,
    wildcard: Arc<WildcardVerdict>,
}

impl<R: HostLookup> Enumerator<R> {
    /// 创建枚举器，域名不合法或并发数为0时失败
    pub fn new(
        domain: &str,
        words: Vec<String>,
        resolver: Arc<R>,
        concurrency: usize,
    ) -> Result<Self, BruteError> {
        let domain = normalize_domain(domain)?;
        if concurrency == 0 {
            return Err(BruteError::InvalidConfig(
                "concurrency must be at least 1".to_string(),
            ));
        }

        Ok(Enumerator {
            domain,
            words,
            resolver,
            concurrency,
            wildcard: Arc::new(WildcardVerdict::none()),
        })
    }

    /// 设置泛解析检测结果，命中的结果会被标记为 `Wildcard`
    pub fn with_wildcard(mut self, verdict: WildcardVerdict) -> Self {
        self.wildcard = Arc::new(verdict);
        self
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// 执行枚举，所有查询完成后返回
    pub async fn start(&self, sink: Arc<dyn ResultSink>) -> Result<EnumerationSummary, BruteError> {
        let started = Instant::now();
        let mut summary = EnumerationSummary::default();
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut tasks: JoinSet<OutcomeKind> = JoinSet::new();

        for word in &self.words {
            // 达到并发上限时在这里等待
            let permit = semaphore
                .clone()
                .acquire_owned()
                .await
                .map_err(|e| BruteError::Internal(e.to_string()))?;

            let resolver = Arc::clone(&self.resolver);
            let wildcard = Arc::clone(&self.wildcard);
            let sink = Arc::clone(&sink);
            let label = word.clone();
            let fqdn = join_fqdn(word, &self.domain);

            tasks.spawn(async move {
                let lookup = resolver.lookup_host(&fqdn).await;
                drop(permit);

                let result = match lookup {
                    Ok(addresses) => ResolutionResult { label, fqdn, addresses, error: None },
                    Err(e) => ResolutionResult { label, fqdn, addresses: Vec::new(), error: Some(e) },
                };
                let kind = OutcomeKind::classify(&result, &wildcard);
                debug!("{} -> {:?}", result.fqdn, kind);
                sink.report(Outcome { result, kind });
                kind
            });

            while let Some(joined) = tasks.try_join_next() {
                summary.record(task_kind(joined));
            }
        }

        while let Some(joined) = tasks.join_next().await {
            summary.record(task_kind(joined));
        }

        summary.elapsed = started.elapsed();
        Ok(summary)
    }

    /// 执行枚举并返回按标签排序的全部结果
    pub async fn collect(&self) -> Result<Vec<Outcome>, BruteError> {
        let sink = Arc::new(CollectingSink::new());
        self.start(sink.clone()).await?;
        Ok(sink.take_sorted())
    }
}

fn task_kind(joined: Result<OutcomeKind, JoinError>) -> OutcomeKind {
    joined.unwrap_or_else(|e| {
        error!("lookup task failed: {}", e);
        OutcomeKind::Error
    })
}
