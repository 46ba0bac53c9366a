//! DnsResolver 对真实UDP应答的错误归类
//!
//! 本地起一个最小的DNS服务：把查询原样回送，只改写头部的
//! QR 位和 RCODE，或者干脆不回应。

use std::net::SocketAddr;
use std::time::{Duration, Instant};

use rsubbrute::{DnsResolver, HostLookup, LookupError};
use tokio::net::UdpSocket;

const NXDOMAIN: u8 = 3;
const SERVFAIL: u8 = 2;
const REFUSED: u8 = 5;

/// 启动本地DNS服务，`rcode` 为 `None` 时收到查询不作应答
async fn spawn_nameserver(rcode: Option<u8>) -> SocketAddr {
    let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let addr = socket.local_addr().unwrap();

    tokio::spawn(async move {
        let mut buf = [0u8; 512];
        loop {
            let (len, peer) = match socket.recv_from(&mut buf).await {
                Ok(v) => v,
                Err(_) => return,
            };
            let Some(code) = rcode else { continue };
            if len < 12 {
                continue;
            }

            let mut reply = buf[..len].to_vec();
            reply[2] |= 0x80;
            reply[3] = 0x80 | code;
            let _ = socket.send_to(&reply, peer).await;
        }
    });

    addr
}

async fn resolver_for(addr: SocketAddr, timeout: Duration) -> DnsResolver {
    DnsResolver::new(&addr.to_string(), timeout).await.unwrap()
}

#[tokio::test]
async fn nxdomain_is_not_found() {
    let addr = spawn_nameserver(Some(NXDOMAIN)).await;
    let resolver = resolver_for(addr, Duration::from_secs(1)).await;

    let result = resolver.lookup_host("nope.example.com").await;
    assert_eq!(result, Err(LookupError::NotFound));
}

#[tokio::test]
async fn servfail_is_network_error() {
    let addr = spawn_nameserver(Some(SERVFAIL)).await;
    let resolver = resolver_for(addr, Duration::from_secs(1)).await;

    let result = resolver.lookup_host("broken.example.com").await;
    assert!(matches!(result, Err(LookupError::Network(_))), "got {:?}", result);
}

#[tokio::test]
async fn refused_is_network_error() {
    let addr = spawn_nameserver(Some(REFUSED)).await;
    let resolver = resolver_for(addr, Duration::from_secs(1)).await;

    let result = resolver.lookup_host("denied.example.com").await;
    assert!(matches!(result, Err(LookupError::Network(_))), "got {:?}", result);
}

#[tokio::test]
async fn silent_server_times_out_without_retrying() {
    let addr = spawn_nameserver(None).await;
    let resolver = resolver_for(addr, Duration::from_millis(300)).await;

    let start = Instant::now();
    let result = resolver.lookup_host("slow.example.com").await;

    assert_eq!(result, Err(LookupError::Timeout));
    assert!(start.elapsed() < Duration::from_secs(2), "took {:?}", start.elapsed());
}
