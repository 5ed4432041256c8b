use anyhow::Result;
use sigv2::aws::{default_client, Config};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let config = Config::new()
        .with_param("Service", "AWSECommerceService")
        .with_param("Version", "2011-08-01");
    let client = default_client("https://webservices.amazon.com/onca/xml", config)?;

    let resp = client
        .send_decoded(
            http::Method::GET,
            &[("Operation", "ItemLookup"), ("ItemId", "0816614024")],
            None,
        )
        .await?;

    println!("Response status: {}", resp.status());
    for title in resp.body().find("Title") {
        println!("{}", title.as_str().unwrap_or_default());
    }
    Ok(())
}
