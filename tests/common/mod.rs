//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;

use greeter::config::ServerConfig;
use greeter::{HttpServer, RequestCounter, Shutdown};
use tokio::net::TcpListener;

/// A server running on an ephemeral port; shut down on drop.
pub struct TestServer {
    pub addr: SocketAddr,
    pub counter: RequestCounter,
    shutdown: Shutdown,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Bind `127.0.0.1:0` and serve `config` in the background.
pub async fn start_server(config: ServerConfig) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let counter = RequestCounter::new();
    let server = HttpServer::new(config, counter.clone());
    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    TestServer {
        addr,
        counter,
        shutdown,
    }
}

/// Short task timings so tests finish quickly.
pub fn fast_config() -> ServerConfig {
    let mut config = ServerConfig::default();
    config.task.work_deadline_ms = 500;
    config.task.poll_interval_ms = 50;
    config.timeouts.request_secs = 5;
    config
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}
