use std::sync::Mutex;

use colored::*;
use serde::Serialize;

use crate::enumerator::{EnumerationSummary, Outcome, OutcomeKind, ResultSink};
use crate::input::OutputFormat;
use crate::wildcard::WildcardVerdict;

/// 可序列化的结果结构
#[derive(Debug, Clone, Serialize)]
pub struct SerializableOutcome {
    pub label: String,
    pub domain: String,
    pub status: OutcomeKind,
    pub addresses: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: String,
}

impl From<&Outcome> for SerializableOutcome {
    fn from(outcome: &Outcome) -> Self {
        SerializableOutcome {
            label: outcome.result.label.clone(),
            domain: outcome.result.fqdn.clone(),
            status: outcome.kind,
            addresses: outcome.result.addresses.iter().map(|ip| ip.to_string()).collect(),
            error: outcome.result.error.as_ref().map(|e| e.to_string()),
            timestamp: chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        }
    }
}

/// 可序列化的汇总结构
#[derive(Debug, Clone, Serialize)]
pub struct SerializableSummary {
    pub domain: String,
    pub total: usize,
    pub found: usize,
    pub wildcard: usize,
    pub not_found: usize,
    pub errors: usize,
    pub wildcard_addresses: Vec<String>,
    pub elapsed_ms: u128,
    pub timestamp: String,
}

impl SerializableSummary {
    pub fn new(domain: &str, summary: &EnumerationSummary, wildcard: &WildcardVerdict) -> Self {
        SerializableSummary {
            domain: domain.to_string(),
            total: summary.total,
            found: summary.found,
            wildcard: summary.wildcard,
            not_found: summary.not_found,
            errors: summary.errors,
            wildcard_addresses: wildcard.confirmed().iter().map(|ip| ip.to_string()).collect(),
            elapsed_ms: summary.elapsed.as_millis(),
            timestamp: chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        }
    }
}

/// 终端输出
///
/// 默认只输出真实发现的子域名；verbose 模式下同时输出泛解析命中、
/// 不存在和查询失败的结果。
pub struct ConsoleReporter {
    format: OutputFormat,
    verbose: bool,
    silent: bool,
}

impl ConsoleReporter {
    pub fn new(format: OutputFormat, verbose: bool, silent: bool) -> Self {
        ConsoleReporter { format, verbose, silent }
    }

    fn should_print(&self, kind: OutcomeKind) -> bool {
        kind == OutcomeKind::Found || self.verbose
    }

    /// 文本格式的一行输出，不需要输出时返回 `None`
    pub fn render(&self, outcome: &Outcome) -> Option<String> {
        if !self.should_print(outcome.kind) {
            return None;
        }

        match self.format {
            OutputFormat::Json => serde_json::to_string(&SerializableOutcome::from(outcome)).ok(),
            OutputFormat::Txt => Some(self.render_text(outcome)),
        }
    }

    fn render_text(&self, outcome: &Outcome) -> String {
        let result = &outcome.result;
        let ips = result
            .addresses
            .iter()
            .map(|ip| ip.to_string())
            .collect::<Vec<_>>()
            .join(", ");

        match outcome.kind {
            OutcomeKind::Found if self.silent => result.fqdn.clone(),
            OutcomeKind::Found => format!("{} {:<40} {}", "[+]".green(), result.fqdn.bold(), ips),
            OutcomeKind::Wildcard => format!(
                "{} {:<40} {} {}",
                "[*]".yellow(),
                result.fqdn,
                ips.dimmed(),
                "(wildcard)".yellow()
            ),
            OutcomeKind::NotFound => format!("{} {}", "[-]".dimmed(), result.fqdn.dimmed()),
            OutcomeKind::Error => format!(
                "{} {:<40} {}",
                "[!]".red(),
                result.fqdn,
                result
                    .error
                    .as_ref()
                    .map(|e| e.to_string())
                    .unwrap_or_default()
                    .red()
            ),
        }
    }
}

impl ResultSink for ConsoleReporter {
    fn report(&self, outcome: Outcome) {
        if let Some(line) = self.render(&outcome) {
            println!("{}", line);
        }
    }
}

/// 收集所有结果
#[derive(Default)]
pub struct CollectingSink {
    outcomes: Mutex<Vec<Outcome>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        CollectingSink::default()
    }

    pub fn len(&self) -> usize {
        match self.outcomes.lock() {
            Ok(guard) => guard.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 取出已收集的结果，按标签排序
    pub fn take_sorted(&self) -> Vec<Outcome> {
        let mut outcomes = match self.outcomes.lock() {
            Ok(mut guard) => std::mem::take(&mut *guard),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        };
        outcomes.sort_by(|a, b| a.result.label.cmp(&b.result.label));
        outcomes
    }
}

impl ResultSink for CollectingSink {
    fn report(&self, outcome: Outcome) {
        match self.outcomes.lock() {
            Ok(mut guard) => guard.push(outcome),
            Err(poisoned) => poisoned.into_inner().push(outcome),
        }
    }
}

/// 打印汇总统计
///
/// JSON 格式下输出一行 [`SerializableSummary`]，文本格式下输出表格。
pub fn print_summary(domain: &str, summary: &EnumerationSummary, wildcard: &WildcardVerdict, format: OutputFormat) {
    if format == OutputFormat::Json {
        match serde_json::to_string(&SerializableSummary::new(domain, summary, wildcard)) {
            Ok(line) => println!("{}", line),
            Err(e) => log::error!("failed to serialize summary: {}", e),
        }
        return;
    }

    println!("\n{}", "=".repeat(60));
    println!("Summary for {}", domain.bold());
    println!("{}", "-".repeat(60));
    println!("  {:<20} {}", "labels tried:", summary.total);
    println!("  {:<20} {}", "found:", summary.found.to_string().green());
    println!("  {:<20} {}", "wildcard hits:", summary.wildcard.to_string().yellow());
    println!("  {:<20} {}", "not found:", summary.not_found);
    println!("  {:<20} {}", "errors:", summary.errors.to_string().red());
    if wildcard.is_wildcard() {
        let ips = wildcard
            .confirmed()
            .iter()
            .map(|ip| ip.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        println!("  {:<20} {}", "wildcard addresses:", ips);
    }
    println!("  {:<20} {:.2?}", "elapsed:", summary.elapsed);
    println!("{}", "=".repeat(60));
}
