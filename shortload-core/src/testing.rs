//! Test doubles shared by the unit tests in this crate

use async_trait::async_trait;
use mockall::mock;
use serde_json::json;
use shortload_http::{HttpClient, HttpError, HttpManager, HttpRequest, HttpResponse};

mock! {
    pub Client {}

    #[async_trait]
    impl HttpClient for Client {
        async fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpError>;
    }
}

/// The reply a well-behaved admin endpoint gives
pub fn created(token: &str) -> HttpResponse {
    HttpResponse::new(201).with_json(&json!({"token": token, "target": "http://example.com"}))
}

pub fn redirect() -> HttpResponse {
    HttpResponse::new(307).with_header("location", "http://example.com")
}

/// A genuine transport failure: a request to a loopback port nobody listens on
pub async fn connection_refused() -> HttpError {
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .and_then(|listener| listener.local_addr())
        .expect("bind loopback")
        .port();
    let client = HttpManager::new().expect("build client");
    client
        .send(HttpRequest::get(format!("http://127.0.0.1:{}/", port)))
        .await
        .expect_err("nothing listens on a released port")
}
