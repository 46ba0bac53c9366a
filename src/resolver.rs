//! DNS查询封装
//!
//! [`HostLookup`] 是枚举器和泛解析检测器依赖的查询接口，
//! [`DnsResolver`] 是基于 trust-dns 的实现：所有查询都发往同一个
//! 指定的DNS服务器，每次查询都有独立的超时，不缓存也不重试。

use std::future::Future;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use log::debug;
use trust_dns_resolver::config::{NameServerConfigGroup, ResolverConfig, ResolverOpts};
use trust_dns_resolver::error::{ResolveError, ResolveErrorKind};
use trust_dns_resolver::proto::op::ResponseCode;
use trust_dns_resolver::TokioAsyncResolver;

use crate::error::{BruteError, LookupError};

/// 默认DNS端口
pub const DEFAULT_DNS_PORT: u16 = 53;

/// 主机名查询接口
///
/// 实现必须可以被多个任务同时调用。成功时返回的地址顺序即为
/// DNS应答中的顺序。
pub trait HostLookup: Send + Sync + 'static {
    /// 解析完整域名
    fn lookup_host(
        &self,
        fqdn: &str,
    ) -> impl Future<Output = Result<Vec<IpAddr>, LookupError>> + Send;
}

/// 绑定单个DNS服务器的解析器
pub struct DnsResolver {
    resolver: TokioAsyncResolver,
    nameserver: SocketAddr,
    timeout: Duration,
}

impl DnsResolver {
    /// 创建解析器
    ///
    /// `nameserver` 支持 `ip`、`ip:port`、`[v6]:port`、`host`、`host:port`，
    /// 未指定端口时使用53。主机名只在这里解析一次。
    pub async fn new(nameserver: &str, timeout: Duration) -> Result<Self, BruteError> {
        if timeout.is_zero() {
            return Err(BruteError::zero_timeout(timeout));
        }

        let addr = resolve_nameserver(nameserver).await?;

        let mut opts = ResolverOpts::default();
        opts.timeout = timeout;
        opts.attempts = 0;
        opts.cache_size = 0;
        opts.use_hosts_file = false;

        // UDP为主，应答被截断时才改用TCP
        let group = NameServerConfigGroup::from_ips_clear(&[addr.ip()], addr.port(), true);
        let config = ResolverConfig::from_parts(None, vec![], group);
        let resolver = TokioAsyncResolver::tokio(config, opts);

        debug!("resolver bound to {} (timeout {:?})", addr, timeout);

        Ok(DnsResolver {
            resolver,
            nameserver: addr,
            timeout,
        })
    }

    /// 使用的DNS服务器地址
    pub fn nameserver(&self) -> SocketAddr {
        self.nameserver
    }

    /// 单次查询超时
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl HostLookup for DnsResolver {
    async fn lookup_host(&self, fqdn: &str) -> Result<Vec<IpAddr>, LookupError> {
        let lookup = tokio::time::timeout(self.timeout, self.resolver.lookup_ip(fqdn)).await;

        let ips: Vec<IpAddr> = match lookup {
            Err(_elapsed) => return Err(LookupError::Timeout),
            Ok(Err(e)) => return Err(map_resolve_error(&e)),
            Ok(Ok(response)) => response.iter().collect(),
        };

        if ips.is_empty() {
            return Err(LookupError::NotFound);
        }
        Ok(ips)
    }
}

/// 将 trust-dns 的错误归类
pub(crate) fn map_resolve_error(err: &ResolveError) -> LookupError {
    match err.kind() {
        ResolveErrorKind::Timeout => LookupError::Timeout,
        ResolveErrorKind::NoRecordsFound { response_code, .. } => match *response_code {
            ResponseCode::NXDomain | ResponseCode::NoError => LookupError::NotFound,
            code => LookupError::Network(format!("server answered {}", code)),
        },
        _ => LookupError::Network(err.to_string()),
    }
}

/// 拆分DNS服务器地址中的主机和端口
fn split_host_port(nameserver: &str) -> Result<(String, u16), BruteError> {
    let s = nameserver.trim();
    if s.is_empty() {
        return Err(BruteError::invalid_nameserver(nameserver, "nameserver is empty"));
    }

    if let Ok(addr) = s.parse::<SocketAddr>() {
        return Ok((addr.ip().to_string(), addr.port()));
    }

    let unbracketed = s.trim_start_matches('[').trim_end_matches(']');
    if let Ok(ip) = unbracketed.parse::<IpAddr>() {
        return Ok((ip.to_string(), DEFAULT_DNS_PORT));
    }

    match s.rsplit_once(':') {
        Some((host, port)) => {
            let port = port
                .parse::<u16>()
                .map_err(|_| BruteError::invalid_nameserver(nameserver, format!("invalid port '{}'", port)))?;
            if host.is_empty() {
                return Err(BruteError::invalid_nameserver(nameserver, "missing host"));
            }
            Ok((host.to_string(), port))
        }
        None => Ok((s.to_string(), DEFAULT_DNS_PORT)),
    }
}

async fn resolve_nameserver(nameserver: &str) -> Result<SocketAddr, BruteError> {
    let (host, port) = split_host_port(nameserver)?;

    if let Ok(ip) = host.parse::<IpAddr>() {
        return Ok(SocketAddr::new(ip, port));
    }

    let mut addrs = tokio::net::lookup_host((host.as_str(), port))
        .await
        .map_err(|e| BruteError::invalid_nameserver(nameserver, e.to_string()))?;

    addrs
        .next()
        .ok_or_else(|| BruteError::invalid_nameserver(nameserver, "host has no addresses"))
}
