//! Local HTTP server serving canned responses to source tests.

use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// A route answers any request whose target (path and query) contains `needle`.
pub struct Route {
    pub needle: &'static str,
    pub status: u16,
    pub body: String,
}

impl Route {
    pub fn ok(needle: &'static str, body: impl Into<String>) -> Self {
        Self {
            needle,
            status: 200,
            body: body.into(),
        }
    }

    pub fn status(needle: &'static str, status: u16) -> Self {
        Self {
            needle,
            status,
            body: String::new(),
        }
    }
}

pub struct FixtureServer {
    pub base_url: String,
    requests: Arc<Mutex<Vec<String>>>,
}

impl FixtureServer {
    /// Bind an ephemeral port and serve `routes` until the test ends.
    ///
    /// Unmatched requests get a 404.
    pub async fn start(routes: Vec<Route>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let routes = Arc::new(routes);
        let requests = Arc::new(Mutex::new(Vec::new()));

        let log = requests.clone();
        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let routes = routes.clone();
                let log = log.clone();
                tokio::spawn(async move {
                    let mut buf = vec![0u8; 16 * 1024];
                    let n = socket.read(&mut buf).await.unwrap_or(0);
                    let request = String::from_utf8_lossy(&buf[..n]);
                    let target = request.split_whitespace().nth(1).unwrap_or("/").to_string();

                    let (status, body) = routes
                        .iter()
                        .find(|route| target.contains(route.needle))
                        .map(|route| (route.status, route.body.clone()))
                        .unwrap_or((404, String::new()));
                    log.lock().unwrap().push(target);

                    let response = format!(
                        "HTTP/1.1 {status} Fixture\r\ncontent-type: text/plain\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                        body.len()
                    );
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                });
            }
        });

        Self {
            base_url: format!("http://{addr}"),
            requests,
        }
    }

    /// Request targets seen so far, in arrival order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

/// Client that talks to the fixture server directly, ignoring proxy settings.
pub fn direct_client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}
