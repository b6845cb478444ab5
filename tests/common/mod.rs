// Test helpers are intentionally partially used
#![allow(dead_code)]

use anyhow::{anyhow, bail, Result};
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use axum_http_metrics::{create_router, create_router_with, MetricsConfig};
use reqwest::Client;
use std::collections::BTreeMap;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::time::sleep;
use tower::ServiceExt;

// ============================================================================
// Test Server
// ============================================================================

pub struct TestServer {
    pub addr: std::net::SocketAddr,
    pub client: Client,
}

impl TestServer {
    // ---

    /// Serve the demo router configured from the environment.
    pub async fn new() -> Self {
        // ---
        let app = create_router().expect("Should be able to create router");
        Self::serve(app).await
    }

    /// Serve the demo router with an explicit metrics configuration.
    pub async fn with_config(config: MetricsConfig) -> Self {
        // ---
        let app = create_router_with(config).expect("Should be able to create router");
        Self::serve(app).await
    }

    async fn serve(app: Router) -> Self {
        // ---
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        // Spawn the server in the background
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Give the server a moment to start
        sleep(Duration::from_millis(100)).await;

        let client = Client::new();

        Self { addr, client }
    }

    pub fn url(&self, path: &str) -> String {
        // ---
        format!("http://{}{}", self.addr, path)
    }
}

// ============================================================================
// In-process requests
// ============================================================================

/// Sends one request through the router and returns status and body.
pub async fn send(app: &Router, method: &str, uri: &str) -> Result<(StatusCode, String)> {
    // ---
    send_with_headers(app, method, uri, &[]).await
}

pub async fn send_with_headers(
    app: &Router,
    method: &str,
    uri: &str,
    headers: &[(&str, &str)],
) -> Result<(StatusCode, String)> {
    // ---
    let mut builder = Request::builder().method(method).uri(uri);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    let request = builder.body(Body::empty())?;

    let response = app.clone().oneshot(request).await?;
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;

    Ok((status, String::from_utf8(bytes.to_vec())?))
}

pub async fn get(app: &Router, uri: &str) -> Result<(StatusCode, String)> {
    send(app, "GET", uri).await
}

/// Fetches the exposition text from `/metrics`.
pub async fn scrape(app: &Router) -> Result<String> {
    // ---
    let (status, body) = get(app, "/metrics").await?;
    if status != StatusCode::OK {
        bail!("metrics endpoint returned {status}");
    }
    Ok(body)
}

// ============================================================================
// Exposition text parsing
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub name: String,
    pub labels: BTreeMap<String, String>,
    pub value: f64,
}

/// Parses the sample lines of the text exposition format.
///
/// Fails on any line that is not a comment, blank, or a valid sample.
pub fn parse_exposition(text: &str) -> Result<Vec<Sample>> {
    // ---
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(parse_sample)
        .collect()
}

fn parse_sample(line: &str) -> Result<Sample> {
    // ---
    let name_end = line
        .find(|c: char| c == '{' || c.is_whitespace())
        .ok_or_else(|| anyhow!("no value on line: {line}"))?;
    let name = &line[..name_end];
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ':') {
        bail!("invalid metric name on line: {line}");
    }

    let mut labels = BTreeMap::new();
    let mut rest = &line[name_end..];
    if let Some(body) = rest.strip_prefix('{') {
        let close = find_label_end(body).ok_or_else(|| anyhow!("unterminated labels: {line}"))?;
        labels = parse_labels(&body[..close])?;
        rest = &body[close + 1..];
    }

    let value = rest
        .split_whitespace()
        .next()
        .ok_or_else(|| anyhow!("missing value on line: {line}"))?
        .parse::<f64>()
        .map_err(|_| anyhow!("invalid value on line: {line}"))?;

    Ok(Sample {
        name: name.to_string(),
        labels,
        value,
    })
}

fn find_label_end(body: &str) -> Option<usize> {
    // ---
    let mut in_quotes = false;
    let mut escaped = false;
    for (i, c) in body.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' if in_quotes => escaped = true,
            '"' => in_quotes = !in_quotes,
            '}' if !in_quotes => return Some(i),
            _ => {}
        }
    }
    None
}

fn parse_labels(body: &str) -> Result<BTreeMap<String, String>> {
    // ---
    let mut labels = BTreeMap::new();
    let mut chars = body.chars().peekable();

    loop {
        let name: String = chars.by_ref().take_while(|c| *c != '=').collect();
        let name = name.trim_start_matches(',').trim().to_string();
        if name.is_empty() {
            break;
        }
        if chars.next() != Some('"') {
            bail!("label {name} is not quoted");
        }

        let mut value = String::new();
        loop {
            match chars.next() {
                Some('\\') => match chars.next() {
                    Some('n') => value.push('\n'),
                    Some(other) => value.push(other),
                    None => bail!("dangling escape in label {name}"),
                },
                Some('"') => break,
                Some(c) => value.push(c),
                None => bail!("unterminated value for label {name}"),
            }
        }
        labels.insert(name, value);

        if chars.peek().is_none() {
            break;
        }
    }

    Ok(labels)
}

/// Value of the sample named `name` whose label set is exactly `labels`,
/// or `0.0` if there is none.
pub fn sample_value(text: &str, name: &str, labels: &[(&str, &str)]) -> f64 {
    // ---
    let wanted: BTreeMap<String, String> = labels
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    parse_exposition(text)
        .expect("exposition text should parse")
        .into_iter()
        .find(|s| s.name == name && s.labels == wanted)
        .map(|s| s.value)
        .unwrap_or(0.0)
}

/// Sum of all samples named `name` across label sets.
pub fn total(text: &str, name: &str) -> f64 {
    // ---
    parse_exposition(text)
        .expect("exposition text should parse")
        .iter()
        .filter(|s| s.name == name)
        .map(|s| s.value)
        .sum()
}
