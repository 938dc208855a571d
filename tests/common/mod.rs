//! Common test utilities
#![allow(dead_code)]

use async_trait::async_trait;
use headersec::error::Result;
use headersec::http::HttpClient;
use headersec::models::{OutputMode, ScanRequest, TransportConfig};
use headersec::scanner::{HttpProber, Probe, ProbeResponse};
use reqwest::header::HeaderMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Request settings with the given output mode and every check enabled
pub fn test_request(output: OutputMode) -> ScanRequest {
    ScanRequest {
        output,
        ..ScanRequest::default()
    }
}

pub fn test_transport() -> TransportConfig {
    TransportConfig {
        timeout_secs: 5,
        ..TransportConfig::default()
    }
}

pub fn test_prober(transport: &TransportConfig) -> HttpProber {
    let client = HttpClient::from_config(transport).expect("Failed to create client");
    HttpProber::new(client)
}

/// A server that answers every non-GET request with a header-less 200.
/// GET requests get `get_response`, or the connection is dropped when it is `None`.
pub struct RawServer {
    pub url: String,
    methods: Arc<Mutex<Vec<String>>>,
}

impl RawServer {
    /// Methods received so far, in arrival order
    pub fn methods(&self) -> Vec<String> {
        self.methods.lock().expect("lock").clone()
    }
}

fn header_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|w| w == b"\r\n\r\n").map(|i| i + 4)
}

pub async fn spawn_raw_server(get_response: Option<&'static str>) -> RawServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    let methods = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&methods);

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let seen = Arc::clone(&seen);
            tokio::spawn(async move {
                let mut buf = Vec::new();
                let mut chunk = [0u8; 1024];
                loop {
                    let end = loop {
                        if let Some(end) = header_end(&buf) {
                            break end;
                        }
                        match socket.read(&mut chunk).await {
                            Ok(0) | Err(_) => return,
                            Ok(n) => buf.extend_from_slice(&chunk[..n]),
                        }
                    };
                    let head: Vec<u8> = buf.drain(..end).collect();
                    let method = String::from_utf8_lossy(&head)
                        .split_whitespace()
                        .next()
                        .unwrap_or_default()
                        .to_string();
                    seen.lock().expect("lock").push(method.clone());

                    let reply = if method == "GET" {
                        match get_response {
                            Some(reply) => reply,
                            None => return,
                        }
                    } else {
                        "HTTP/1.1 200 OK\r\n\r\n"
                    };
                    if socket.write_all(reply.as_bytes()).await.is_err() {
                        return;
                    }
                }
            });
        }
    });

    RawServer {
        url: format!("http://{addr}/"),
        methods,
    }
}

/// Probe stand-in that records how many probes run at once
pub struct CountingProber {
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    delay: Duration,
}

impl CountingProber {
    pub fn new(delay: Duration) -> Self {
        Self {
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            delay,
        }
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Probe for CountingProber {
    async fn probe(&self, target: &str, _request: &ScanRequest) -> Result<ProbeResponse> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        Ok(ProbeResponse {
            url: target.to_string(),
            effective_url: target.to_string(),
            status: 200,
            headers: HeaderMap::new(),
        })
    }
}
