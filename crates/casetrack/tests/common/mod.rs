//! Shared fixtures: a served router on an ephemeral port and a raw HTTP/1.1
//! client.

#![allow(dead_code)]

use std::net::SocketAddr;

use casetrack::auth::hash_password;
use casetrack::model::{NewUser, UserRole};
use casetrack::{router, AppState, Config, ReportStore, Storage};
use serde_json::Value;
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

pub const SERVICE_KEY: &str = "test-service-key";
pub const PASSWORD: &str = "correct-horse";

pub struct TestServer {
    pub addr: SocketAddr,
    _dir: TempDir,
}

pub struct Response {
    pub status: u16,
    pub head: String,
    pub body: String,
}

impl Response {
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).expect("response json")
    }

    pub fn header(&self, name: &str) -> Option<String> {
        let prefix = format!("{}:", name.to_ascii_lowercase());
        self.head.lines().find_map(|line| {
            line.to_ascii_lowercase()
                .starts_with(&prefix)
                .then(|| line[prefix.len()..].trim().to_string())
        })
    }
}

/// Serve a fresh database seeded with one user per role.
pub async fn spawn(service_key: Option<&str>) -> TestServer {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut config = Config::default();
    config.auth.service_key = service_key.map(str::to_string);

    let storage = Storage::open(dir.path().join("casetrack.db")).expect("open storage");
    for (email, role) in [
        ("admin@example.com", UserRole::Admin),
        ("detective@example.com", UserRole::Investigator),
        ("viewer@example.com", UserRole::Viewer),
    ] {
        let new_user = NewUser {
            email: email.to_string(),
            first_name: "Test".to_string(),
            last_name: role.label().to_string(),
            role,
        };
        storage
            .create_user(&new_user, &hash_password(PASSWORD))
            .expect("seed user");
    }
    let reports = ReportStore::open(dir.path().join("local-storage.json")).expect("report store");
    let state = AppState::new(&config, storage, reports).expect("app state");

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    let app = router(state);
    tokio::spawn(async move { axum::serve(listener, app).await.expect("serve app") });

    TestServer { addr, _dir: dir }
}

impl TestServer {
    pub async fn send(
        &self,
        method: &str,
        path: &str,
        headers: &[(&str, &str)],
        body: Option<&str>,
    ) -> Response {
        let mut stream = tokio::net::TcpStream::connect(self.addr)
            .await
            .expect("connect server");
        let mut req = format!(
            "{method} {path} HTTP/1.1\r\nHost: {}\r\nConnection: close\r\n",
            self.addr
        );
        for (k, v) in headers {
            req.push_str(&format!("{k}: {v}\r\n"));
        }
        if let Some(body) = body {
            req.push_str("Content-Type: application/json\r\n");
            req.push_str(&format!("Content-Length: {}\r\n\r\n{body}", body.len()));
        } else {
            req.push_str("\r\n");
        }
        stream
            .write_all(req.as_bytes())
            .await
            .expect("write request");

        let mut response = String::new();
        stream
            .read_to_string(&mut response)
            .await
            .expect("read response");
        let (head, body) = response
            .split_once("\r\n\r\n")
            .expect("http response must have separator");
        let status = head
            .lines()
            .next()
            .and_then(|line| line.split_whitespace().nth(1))
            .and_then(|s| s.parse::<u16>().ok())
            .expect("http status");
        Response {
            status,
            head: head.to_string(),
            body: body.to_string(),
        }
    }

    /// Sign in and return the access token.
    pub async fn token_for(&self, email: &str) -> String {
        let body = format!(r#"{{"email":"{email}","password":"{PASSWORD}"}}"#);
        let res = self.send("POST", "/auth/v1/token", &[], Some(&body)).await;
        assert_eq!(res.status, 200, "sign-in failed: {}", res.body);
        res.json()["access_token"]
            .as_str()
            .expect("access token")
            .to_string()
    }
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}
