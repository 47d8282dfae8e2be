//! Local HTTP fixture standing in for the release index and download host

use std::io::{Read, Write};
use std::net::{Shutdown, TcpListener};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use tiny_http::{Header, Response, Server};

/// Canned reply for a request path
#[derive(Clone, Debug)]
pub enum Reply {
    Json(u16, String),
    Bytes(Vec<u8>),
    Redirect(String),
    Status(u16),
    Delayed(Duration, Box<Reply>),
}

impl Reply {
    fn with_base(self, base_url: &str) -> Self {
        match self {
            Reply::Json(status, body) => Reply::Json(status, body.replace("{base}", base_url)),
            Reply::Redirect(location) => Reply::Redirect(location.replace("{base}", base_url)),
            Reply::Delayed(delay, inner) => Reply::Delayed(delay, Box::new(inner.with_base(base_url))),
            other => other,
        }
    }
}

#[derive(Clone, Debug)]
pub struct RecordedRequest {
    pub path: String,
    pub user_agent: Option<String>,
}

pub struct FixtureServer {
    server: Arc<Server>,
    base_url: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl FixtureServer {
    /// Serve `routes` (exact path match); unknown paths get a 404.
    ///
    /// `{base}` in JSON bodies and redirect targets expands to the server's base URL.
    pub fn start(routes: Vec<(&str, Reply)>) -> Self {
        let server = Arc::new(Server::http("127.0.0.1:0").unwrap());
        let port = server.server_addr().to_ip().unwrap().port();
        let base_url = format!("http://127.0.0.1:{port}");
        let requests = Arc::new(Mutex::new(Vec::new()));

        let routes: Vec<(String, Reply)> = routes
            .into_iter()
            .map(|(path, reply)| (path.to_string(), reply.with_base(&base_url)))
            .collect();

        let worker = Arc::clone(&server);
        let recorded = Arc::clone(&requests);
        thread::spawn(move || {
            for request in worker.incoming_requests() {
                let path = request.url().to_string();
                let user_agent = request
                    .headers()
                    .iter()
                    .find(|h| h.field.equiv("User-Agent"))
                    .map(|h| h.value.as_str().to_string());
                recorded.lock().unwrap().push(RecordedRequest {
                    path: path.clone(),
                    user_agent,
                });

                let reply = routes
                    .iter()
                    .find(|(route, _)| *route == path)
                    .map(|(_, reply)| reply.clone())
                    .unwrap_or(Reply::Status(404));
                let _ = request.respond(render(reply));
            }
        });

        Self {
            server,
            base_url,
            requests,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn hits(&self, path: &str) -> usize {
        self.requests().iter().filter(|r| r.path == path).count()
    }
}

impl Drop for FixtureServer {
    fn drop(&mut self) {
        self.server.unblock();
    }
}

fn render(reply: Reply) -> Response<std::io::Cursor<Vec<u8>>> {
    match reply {
        Reply::Json(status, body) => Response::from_string(body)
            .with_status_code(status)
            .with_header(Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]).unwrap()),
        Reply::Bytes(data) => Response::from_data(data),
        Reply::Redirect(location) => Response::from_data(Vec::new())
            .with_status_code(302)
            .with_header(Header::from_bytes(&b"Location"[..], location.as_bytes()).unwrap()),
        Reply::Status(status) => Response::from_string(format!("status {status}")).with_status_code(status),
        Reply::Delayed(delay, inner) => {
            thread::sleep(delay);
            render(*inner)
        }
    }
}

/// Release JSON in the shape of the GitHub API
pub fn release_json(tag: &str, assets: &[(&str, &str)]) -> String {
    let assets: Vec<serde_json::Value> = assets
        .iter()
        .map(|(name, url)| {
            serde_json::json!({
                "name": name,
                "browser_download_url": url,
                "size": 1024,
            })
        })
        .collect();
    serde_json::json!({
        "tag_name": tag,
        "name": format!("Release {tag}"),
        "prerelease": false,
        "assets": assets,
    })
    .to_string()
}

/// Address on which nothing is listening
pub fn refused_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{port}/file.zip")
}

/// Answer a single request with a body shorter than its `Content-Length`,
/// then close the connection
pub fn truncated_body_url(advertised: usize, body: &[u8]) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let body = body.to_vec();

    thread::spawn(move || {
        let Ok((mut stream, _)) = listener.accept() else {
            return;
        };
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            match stream.read(&mut buf) {
                Ok(0) | Err(_) => return,
                Ok(n) => request.extend_from_slice(&buf[..n]),
            }
        }

        let head = format!(
            "HTTP/1.1 200 OK\r\nContent-Length: {advertised}\r\nConnection: close\r\n\r\n"
        );
        let _ = stream.write_all(head.as_bytes());
        let _ = stream.write_all(&body);
        let _ = stream.flush();
        let _ = stream.shutdown(Shutdown::Both);
    });

    format!("http://127.0.0.1:{port}/file.zip")
}
