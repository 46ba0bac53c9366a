//! # rsubbrute
//!
//! 基于字典的子域名暴破库：通过指定的DNS服务器并发解析 `label.domain`，
//! 并用随机子域名探测识别泛解析，避免把泛解析结果当成真实发现。
//!
//! ## 快速开始
//!
//! ```rust,no_run
//! use rsubbrute::brute_force_subdomains;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let words = vec!["www".to_string(), "mail".to_string()];
//!     let results = brute_force_subdomains("example.com", words).await?;
//!
//!     for result in &results {
//!         println!("{} -> {:?}", result.domain, result.addresses);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## 自定义配置
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use rsubbrute::{ConsoleReporter, OutputFormat, SubdomainBruteConfig, SubdomainBruteEngine};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = SubdomainBruteConfig {
//!         domain: "example.com".to_string(),
//!         resolver: "1.1.1.1:53".to_string(),
//!         timeout: Duration::from_secs(1),
//!         concurrency: 100,
//!         ..Default::default()
//!     };
//!
//!     let engine = SubdomainBruteEngine::new(config).await?;
//!     let wildcard = engine.detect_wildcard().await;
//!     let reporter = Arc::new(ConsoleReporter::new(OutputFormat::Txt, false, false));
//!     let summary = engine
//!         .run_brute_force(vec!["www".to_string()], wildcard, reporter)
//!         .await?;
//!
//!     println!("found {} of {}", summary.found, summary.total);
//!     Ok(())
//! }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod api;
pub mod enumerator;
pub mod error;
pub mod input;
pub mod logger;
pub mod output;
pub mod resolver;
pub mod util;
pub mod wildcard;

// 重新导出主要的公共API
pub use api::{brute_force_subdomains, SubdomainBruteConfig, SubdomainBruteEngine, SubdomainResult};

pub use enumerator::{EnumerationSummary, Enumerator, Outcome, OutcomeKind, ResolutionResult, ResultSink};
pub use error::{BruteError, LookupError};
pub use input::{load_wordlist, parse_wordlist, OutputFormat};
pub use output::{print_summary, CollectingSink, ConsoleReporter, SerializableSummary};
pub use resolver::{DnsResolver, HostLookup};
pub use wildcard::{WildcardDetector, WildcardVerdict};
