use anyhow::Result;
use bytes::Bytes;
use reqwest::Client;
use sigv2_core::Context;
use sigv2_http_send_reqwest::ReqwestHttpSend;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let client = Client::builder()
        .timeout(Duration::from_secs(30))
        .pool_max_idle_per_host(10)
        .user_agent("sigv2-example/1.0")
        .build()?;

    let ctx = Context::new().with_http_send(ReqwestHttpSend::new(client));

    let req = http::Request::builder()
        .method(http::Method::GET)
        .uri("https://webservices.amazon.com/onca/xml")
        .body(Bytes::new())?;

    let resp = ctx.http_send(req).await?;
    println!("Response status: {}", resp.status());
    for (name, value) in resp.headers() {
        println!("  {name}: {value:?}");
    }
    println!("{}", String::from_utf8_lossy(resp.body()));

    Ok(())
}
