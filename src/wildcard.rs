use std::collections::{BTreeSet, HashMap, HashSet};
use std::net::IpAddr;
use std::sync::Arc;

use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::resolver::HostLookup;
use crate::util::join_fqdn;

/// 默认随机探测次数
pub const DEFAULT_WILDCARD_TEST_COUNT: usize = 3;
/// 默认随机标签长度
pub const DEFAULT_RANDOM_LABEL_LENGTH: usize = 10;

const LABEL_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// 泛解析检测结论
///
/// 只有在每一次随机探测中都出现的地址才会被确认为泛解析地址，
/// `is_wildcard()` 当且仅当确认集合非空时为真。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WildcardVerdict {
    confirmed: BTreeSet<IpAddr>,
}

impl WildcardVerdict {
    /// 不存在泛解析
    pub fn none() -> Self {
        WildcardVerdict::default()
    }

    /// 由确认的泛解析地址构造
    pub fn from_addresses<I: IntoIterator<Item = IpAddr>>(addresses: I) -> Self {
        WildcardVerdict {
            confirmed: addresses.into_iter().collect(),
        }
    }

    pub fn is_wildcard(&self) -> bool {
        !self.confirmed.is_empty()
    }

    pub fn confirmed(&self) -> &BTreeSet<IpAddr> {
        &self.confirmed
    }

    /// 地址列表中是否有任何一个确认的泛解析地址
    pub fn matches(&self, addresses: &[IpAddr]) -> bool {
        addresses.iter().any(|ip| self.confirmed.contains(ip))
    }
}

/// 泛解析检测器
pub struct WildcardDetector<R> {
    resolver: Arc<R>,
    test_count: usize,
    label_length: usize,
    seed: Option<u64>,
}

impl<R: HostLookup> WildcardDetector<R> {
    pub fn new(resolver: Arc<R>, test_count: usize, label_length: usize) -> Self {
        WildcardDetector {
            resolver,
            test_count,
            label_length,
            seed: None,
        }
    }

    /// 使用固定种子生成随机标签，便于复现探测过程
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// 检测域名是否存在泛解析
    ///
    /// 根域名本身无法解析、所有探测都失败时都判定为不存在泛解析。
    pub async fn detect(&self, domain: &str) -> WildcardVerdict {
        match self.resolver.lookup_host(domain).await {
            Ok(ips) if !ips.is_empty() => {}
            Ok(_) => {
                debug!("{} has no addresses, skipping wildcard detection", domain);
                return WildcardVerdict::none();
            }
            Err(e) => {
                debug!("{} did not resolve ({}), skipping wildcard detection", domain, e);
                return WildcardVerdict::none();
            }
        }

        // 先生成所有探测域名，随机数生成器不跨越await
        let test_names = self.generate_test_subdomains(domain);
        let mut occurrences: HashMap<IpAddr, usize> = HashMap::new();

        for name in &test_names {
            match self.resolver.lookup_host(name).await {
                Ok(ips) => {
                    debug!("wildcard test {} -> {:?}", name, ips);
                    let distinct: HashSet<IpAddr> = ips.into_iter().collect();
                    for ip in distinct {
                        *occurrences.entry(ip).or_insert(0) += 1;
                    }
                }
                Err(e) => debug!("wildcard test {} failed: {}", name, e),
            }
        }

        let verdict = WildcardVerdict::from_addresses(
            occurrences
                .into_iter()
                .filter(|&(_, count)| count == self.test_count)
                .map(|(ip, _)| ip),
        );

        if verdict.is_wildcard() {
            info!("wildcard DNS detected for {}: {:?}", domain, verdict.confirmed());
        }
        verdict
    }

    /// 生成测试用的随机子域名
    fn generate_test_subdomains(&self, domain: &str) -> Vec<String> {
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        (0..self.test_count)
            .map(|_| join_fqdn(&random_label(&mut rng, self.label_length), domain))
            .collect()
    }
}

/// 由小写字母和数字组成的随机标签
pub fn random_label<G: Rng + ?Sized>(rng: &mut G, length: usize) -> String {
    (0..length)
        .map(|_| LABEL_CHARSET[rng.gen_range(0..LABEL_CHARSET.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_label_shape() {
        let mut rng = StdRng::seed_from_u64(7);
        for len in [1, 10, 32] {
            let label = random_label(&mut rng, len);
            assert_eq!(label.len(), len);
            assert!(label.bytes().all(|b| b.is_ascii_lowercase() || b.is_ascii_digit()));
        }
    }

    #[test]
    fn seeded_labels_are_reproducible() {
        let a = random_label(&mut StdRng::seed_from_u64(42), 10);
        let b = random_label(&mut StdRng::seed_from_u64(42), 10);
        assert_eq!(a, b);
    }

    #[test]
    fn verdict_invariant() {
        let none = WildcardVerdict::none();
        assert!(!none.is_wildcard());
        assert!(none.confirmed().is_empty());

        let ip: IpAddr = "9.9.9.9".parse().unwrap();
        let some = WildcardVerdict::from_addresses([ip]);
        assert!(some.is_wildcard());
        assert!(some.matches(&["1.1.1.1".parse().unwrap(), ip]));
        assert!(!some.matches(&["1.1.1.1".parse().unwrap()]));
        assert!(!some.matches(&[]));
    }
}
