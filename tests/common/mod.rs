#![allow(dead_code)]

use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use rsubbrute::{HostLookup, LookupError};

pub fn ip(s: &str) -> IpAddr {
    s.parse().unwrap()
}

pub fn words(labels: &[&str]) -> Vec<String> {
    labels.iter().map(|s| s.to_string()).collect()
}

/// 按域名返回预设结果，未登记的域名返回 NotFound
#[derive(Default)]
pub struct MapResolver {
    answers: HashMap<String, Result<Vec<IpAddr>, LookupError>>,
    calls: Mutex<Vec<String>>,
}

impl MapResolver {
    pub fn new() -> Self {
        MapResolver::default()
    }

    pub fn answer(mut self, fqdn: &str, ips: &[&str]) -> Self {
        self.answers
            .insert(fqdn.to_string(), Ok(ips.iter().map(|s| ip(s)).collect()));
        self
    }

    pub fn fail(mut self, fqdn: &str, error: LookupError) -> Self {
        self.answers.insert(fqdn.to_string(), Err(error));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl HostLookup for MapResolver {
    async fn lookup_host(&self, fqdn: &str) -> Result<Vec<IpAddr>, LookupError> {
        self.calls.lock().unwrap().push(fqdn.to_string());
        self.answers
            .get(fqdn)
            .cloned()
            .unwrap_or(Err(LookupError::NotFound))
    }
}

/// 对任何域名都返回同一组地址
pub struct FixedResolver {
    ips: Vec<IpAddr>,
}

impl FixedResolver {
    pub fn new(ips: &[&str]) -> Self {
        FixedResolver {
            ips: ips.iter().map(|s| ip(s)).collect(),
        }
    }
}

impl HostLookup for FixedResolver {
    async fn lookup_host(&self, _fqdn: &str) -> Result<Vec<IpAddr>, LookupError> {
        Ok(self.ips.clone())
    }
}

/// 根域名返回固定地址，其他域名每次返回一个不同的地址
pub struct DistinctResolver {
    apex: String,
    counter: AtomicUsize,
}

impl DistinctResolver {
    pub fn new(apex: &str) -> Self {
        DistinctResolver {
            apex: apex.to_string(),
            counter: AtomicUsize::new(0),
        }
    }
}

impl HostLookup for DistinctResolver {
    async fn lookup_host(&self, fqdn: &str) -> Result<Vec<IpAddr>, LookupError> {
        if fqdn == self.apex {
            return Ok(vec![ip("93.184.216.34")]);
        }
        let n = self.counter.fetch_add(1, Ordering::SeqCst) as u32 + 1;
        Ok(vec![IpAddr::V4(Ipv4Addr::from(0x0a00_0000 + n))])
    }
}

/// 记录同时进行的查询数
pub struct CountingResolver {
    delay: Duration,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    calls: AtomicUsize,
    fail_every: Option<usize>,
}

impl CountingResolver {
    pub fn new(delay: Duration) -> Self {
        CountingResolver {
            delay,
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            calls: AtomicUsize::new(0),
            fail_every: None,
        }
    }

    /// 每第 n 次查询返回超时错误
    pub fn failing_every(mut self, n: usize) -> Self {
        self.fail_every = Some(n);
        self
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl HostLookup for CountingResolver {
    async fn lookup_host(&self, _fqdn: &str) -> Result<Vec<IpAddr>, LookupError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        tokio::time::sleep(self.delay).await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        match self.fail_every {
            Some(n) if call % n == 0 => Err(LookupError::Timeout),
            _ => Ok(vec![ip("192.0.2.1")]),
        }
    }
}
