use lazy_static::lazy_static;
use regex::Regex;

use crate::error::BruteError;

lazy_static! {
    static ref LABEL_RE: Regex = Regex::new(r"^[a-z0-9]([a-z0-9-]{0,61}[a-z0-9])?$").unwrap();
}

/// 校验并规范化目标域名
///
/// 去除首尾空白和结尾的点并转为小写，要求每一级标签为1-63个
/// `[a-z0-9-]` 字符且不以 `-` 开头或结尾，总长度不超过253。
pub fn normalize_domain(domain: &str) -> Result<String, BruteError> {
    let normalized = domain.trim().trim_end_matches('.').to_ascii_lowercase();

    if normalized.is_empty() {
        return Err(BruteError::invalid_domain(domain, "domain is empty"));
    }
    if normalized.len() > 253 {
        return Err(BruteError::invalid_domain(domain, "domain longer than 253 characters"));
    }
    if let Some(label) = normalized.split('.').find(|label| !LABEL_RE.is_match(label)) {
        return Err(BruteError::invalid_domain(
            domain,
            format!("invalid label '{}'", label),
        ));
    }

    Ok(normalized)
}

/// 拼接子域名标签和根域名
pub fn join_fqdn(label: &str, domain: &str) -> String {
    let mut fqdn = String::with_capacity(label.len() + domain.len() + 1);
    fqdn.push_str(label);
    fqdn.push('.');
    fqdn.push_str(domain);
    fqdn
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_case_and_trailing_dot() {
        assert_eq!(normalize_domain(" Example.COM. ").unwrap(), "example.com");
    }

    #[test]
    fn accepts_single_label_and_hyphens() {
        assert_eq!(normalize_domain("localhost").unwrap(), "localhost");
        assert_eq!(normalize_domain("my-site.co.uk").unwrap(), "my-site.co.uk");
    }

    #[test]
    fn rejects_bad_domains() {
        assert!(normalize_domain("").is_err());
        assert!(normalize_domain("   ").is_err());
        assert!(normalize_domain("example..com").is_err());
        assert!(normalize_domain("-bad.com").is_err());
        assert!(normalize_domain("bad-.com").is_err());
        assert!(normalize_domain("under_score.com").is_err());
        assert!(normalize_domain(&format!("{}.com", "a".repeat(64))).is_err());
    }

    #[test]
    fn joins_label_and_domain() {
        assert_eq!(join_fqdn("www", "example.com"), "www.example.com");
    }
}
