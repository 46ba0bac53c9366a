use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use clap::Parser;

use crate::error::BruteError;

/// 输出格式枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Txt,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "txt" | "text" => Ok(OutputFormat::Txt),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("unsupported output format: {} (expected txt or json)", s)),
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "rsubbrute")]
#[command(version)]
#[command(about = "Brute-force subdomains against a single DNS server", long_about = None, arg_required_else_help = true)]
pub struct Opts {
    /// apex domain to enumerate
    #[arg(short, long)]
    pub domain: String,

    /// wordlist path, one label per line, '#' starts a comment
    #[arg(short, long, default_value = "wordlist.txt")]
    pub file: PathBuf,

    /// nameserver to query, host or host:port
    #[arg(short, long, default_value = "8.8.8.8")]
    pub resolver: String,

    /// per-query timeout in seconds
    #[arg(short, long, default_value_t = 2.0)]
    pub timeout: f64,

    /// maximum number of lookups in flight
    #[arg(short, long, default_value_t = 50)]
    pub concurrency: usize,

    /// number of random lookups used for wildcard detection
    #[arg(long, default_value_t = 3)]
    pub wildcard_tests: usize,

    /// length of the random test labels
    #[arg(long, default_value_t = 10)]
    pub label_length: usize,

    /// skip wildcard DNS detection
    #[arg(long)]
    pub no_wildcard_check: bool,

    /// only print discovered domains
    #[arg(short, long)]
    pub silent: bool,

    /// also print wildcard hits, misses and errors
    #[arg(short, long, conflicts_with = "silent")]
    pub verbose: bool,

    /// output format (txt, json)
    #[arg(long, default_value = "txt")]
    pub format: String,

    /// show summary statistics
    #[arg(long)]
    pub summary: bool,
}

/// 从文件加载字典
pub fn load_wordlist(path: &Path) -> Result<Vec<String>, BruteError> {
    let file = File::open(path).map_err(|source| BruteError::Wordlist {
        path: path.to_path_buf(),
        source,
    })?;

    parse_wordlist(BufReader::new(file)).map_err(|source| BruteError::Wordlist {
        path: path.to_path_buf(),
        source,
    })
}

/// 逐行读取字典，去除空白行和 `#` 开头的注释行
pub fn parse_wordlist<R: BufRead>(reader: R) -> std::io::Result<Vec<String>> {
    let mut words = Vec::with_capacity(1000);

    for line in reader.lines() {
        let line = line?;
        let word = line.trim();
        if !word.is_empty() && !word.starts_with('#') {
            words.push(word.to_string());
        }
    }

    Ok(words)
}
