//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::TcpListener;

use tenant_gateway::{GatewayConfig, GatewayServer, Shutdown};

/// A gateway running on an ephemeral local port.
pub struct TestGateway {
    pub addr: SocketAddr,
    pub client: reqwest::Client,
    // Dropping the coordinator stops the server
    _shutdown: Shutdown,
}

impl TestGateway {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// GET `path`, optionally as `tenant` via the default tenant header.
    pub async fn get(&self, path: &str, tenant: Option<&str>) -> reqwest::Response {
        let mut request = self.client.get(self.url(path));
        if let Some(tenant) = tenant {
            request = request.header("x-tenant-id", tenant);
        }
        request.send().await.expect("Gateway unreachable")
    }
}

/// Start a gateway with `config` and wait until it accepts connections.
pub async fn start_gateway(mut config: GatewayConfig) -> TestGateway {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    config.listener.bind_address = addr.to_string();

    let shutdown = Shutdown::new();
    let server = GatewayServer::new(config);
    let rx = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });

    tokio::time::sleep(Duration::from_millis(100)).await;

    let client = reqwest::Client::builder()
        .no_proxy()
        .build()
        .unwrap();

    TestGateway {
        addr,
        client,
        _shutdown: shutdown,
    }
}
