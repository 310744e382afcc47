#![allow(dead_code)]

use std::{net::SocketAddr, path::Path};

use axum::{
    Form, Router,
    http::StatusCode,
    response::Html,
    routing::get,
};
use pcso_client::{PcsoConfig, config::OutputConfig};

pub const RESULTS_PATH: &str = "/SearchLottoResult.aspx";

const SEARCH_PAGE: &str = r#"<html><body><form method="post">
<input type="hidden" name="__VIEWSTATE" value="vs-token" />
<input type="hidden" name="__VIEWSTATEGENERATOR" value="C0D3" />
<input type="hidden" name="__EVENTVALIDATION" value="ev-token" />
</form></body></html>"#;

const RESULTS_PAGE: &str = r#"<html><body>
<table id="GridView1">
  <tr><th>LOTTO GAME</th><th>COMBINATIONS</th><th>DRAW DATE</th><th>JACKPOT (PHP)</th><th>WINNERS</th></tr>
  <tr><td>Ultra Lotto 6/58</td><td>35-37-14-01-43-12</td><td>12/16/2025</td><td>49,500,000.00</td><td>0</td></tr>
  <tr><td>Grand Lotto 6/55</td><td>06-11-22-33-44-55</td><td>12/15/2025</td><td>29,700,000.00</td><td>1</td></tr>
  <tr><td>3D Lotto 2PM</td><td>7-0-2</td><td>12/16/2025</td><td>4,500.00</td><td>312</td></tr>
  <tr><td>Lotto 6/42</td><td>4-8-15</td><td>12/16/2025</td><td>6,000,000.00</td><td>0</td></tr>
  <tr><td>Mega Lotto 6/45</td><td>TBA</td><td>12/15/2025</td><td>8,900,000.00</td><td>0</td></tr>
</table></body></html>"#;

pub fn init_logger() {
    env_logger::builder().is_test(true).try_init().ok();
}

/// Config writing into `dir`, scraping `base_url` without delays
pub fn test_config(dir: &Path, base_url: String) -> PcsoConfig {
    let mut config = PcsoConfig {
        output: OutputConfig {
            dir: dir.to_path_buf(),
            ..OutputConfig::default()
        },
        ..PcsoConfig::default()
    };
    config.scrape.base_url = base_url;
    config.scrape.request_delay_ms = 0;
    config.scrape.timeout_secs = 5;
    config.scrape.days_back = 3;
    config
}

/// Nothing listens on port 1, so connections are refused immediately
pub fn unreachable_url() -> String {
    format!("http://127.0.0.1:1{RESULTS_PATH}")
}

async fn search(Form(fields): Form<Vec<(String, String)>>) -> (StatusCode, Html<&'static str>) {
    let echoed = fields
        .iter()
        .any(|(name, value)| name == "__VIEWSTATE" && value == "vs-token");
    if echoed {
        (StatusCode::OK, Html(RESULTS_PAGE))
    } else {
        (StatusCode::BAD_REQUEST, Html("missing view state"))
    }
}

async fn serve(app: Router) -> anyhow::Result<SocketAddr> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });
    Ok(addr)
}

/// A stand-in for the results site serving the search form and one results table
pub async fn fake_results_site() -> anyhow::Result<String> {
    let app = Router::new().route(
        RESULTS_PATH,
        get(|| async { Html(SEARCH_PAGE) }).post(search),
    );
    let addr = serve(app).await?;
    Ok(format!("http://{addr}{RESULTS_PATH}"))
}

/// A results site behind bot protection
pub async fn denying_results_site() -> anyhow::Result<String> {
    let app = Router::new().route(
        RESULTS_PATH,
        get(|| async { (StatusCode::FORBIDDEN, Html("<h1>Access Denied</h1>")) }),
    );
    let addr = serve(app).await?;
    Ok(format!("http://{addr}{RESULTS_PATH}"))
}

/// Accepts connections and never answers
pub async fn silent_results_site() -> anyhow::Result<String> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((stream, _)) = listener.accept().await {
            held.push(stream);
        }
    });
    Ok(format!("http://{addr}{RESULTS_PATH}"))
}
