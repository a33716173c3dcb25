use crate::deadline::Deadline;
use log::debug;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::{Client, StatusCode};
use std::fmt;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Where a single GET gave up.
#[derive(Debug)]
pub enum HttpFailure {
    /// The deadline (or the client's own timeout) fired first.
    Deadline,
    /// Connect, DNS, TLS or request write failed.
    Send(reqwest::Error),
    /// Headers arrived but the body could not be read.
    Body(reqwest::Error),
}

impl fmt::Display for HttpFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HttpFailure::Deadline => write!(f, "deadline exceeded"),
            HttpFailure::Send(e) => write!(f, "error sending request: {}", e),
            HttpFailure::Body(e) => write!(f, "error reading response body: {}", e),
        }
    }
}

pub fn build_client(user_agent: &str, timeout: Duration) -> reqwest::Result<Client> {
    let mut default_headers = HeaderMap::new();
    if let Ok(ua) = HeaderValue::from_str(user_agent) {
        default_headers.insert(USER_AGENT, ua);
    }
    default_headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    Client::builder()
        .default_headers(default_headers)
        .timeout(timeout)
        .use_rustls_tls()
        .build()
}

/// One GET, headers and body both bounded by `deadline`. Never retried.
pub async fn get_with_deadline(
    client: &Client,
    url: &str,
    deadline: Deadline,
) -> Result<RawResponse, HttpFailure> {
    debug!("GET {} (budget {:?})", url, deadline.remaining());
    let call = async {
        let res = client.get(url).send().await.map_err(classify_send)?;
        let status = res.status();
        let body = res.bytes().await.map_err(classify_body)?;
        Ok::<_, HttpFailure>(RawResponse {
            status,
            body: body.to_vec(),
        })
    };
    match deadline.run(call).await {
        Ok(out) => out,
        Err(_) => Err(HttpFailure::Deadline),
    }
}

fn classify_send(e: reqwest::Error) -> HttpFailure {
    if e.is_timeout() {
        HttpFailure::Deadline
    } else {
        HttpFailure::Send(e)
    }
}

fn classify_body(e: reqwest::Error) -> HttpFailure {
    if e.is_timeout() {
        HttpFailure::Deadline
    } else {
        HttpFailure::Body(e)
    }
}
