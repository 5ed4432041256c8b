use crate::{init_client, MockHttpSend, ENDPOINT};
use http::{Method, StatusCode};
use pretty_assertions::assert_eq;
use serde_json::json;
use sigv2_aws::{parse_query, Client, Config, DefaultCredentialProvider};
use sigv2_core::xml::Node;
use sigv2_core::{Context, ErrorKind, Result, StaticEnv};
use std::collections::HashMap;
use std::io::Read;

const ITEM_LOOKUP_RESPONSE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<ItemLookupResponse>
  <Items>
    <Request><IsValid>True</IsValid></Request>
    <Item>
      <ASIN>0816614024</ASIN>
      <ItemAttributes>
        <Creator Role="Translator">Robert Hurley</Creator>
        <Title>The History of Sexuality</Title>
      </ItemAttributes>
    </Item>
    <Item>
      <ASIN>0394740262</ASIN>
      <ItemAttributes>
        <Title>Discipline &amp; Punish</Title>
      </ItemAttributes>
    </Item>
  </Items>
</ItemLookupResponse>
"#;

const ERROR_RESPONSE: &str = r#"<?xml version="1.0"?>
<ItemLookupErrorResponse>
  <Error>
    <Code>SignatureDoesNotMatch</Code>
    <Message>The request signature we calculated does not match the signature you provided.</Message>
  </Error>
</ItemLookupErrorResponse>"#;

fn texts<'a>(root: &'a Node, tag: &str) -> Vec<&'a str> {
    root.find(tag).into_iter().filter_map(Node::as_str).collect()
}

#[tokio::test]
async fn test_send_decoded() -> Result<()> {
    let mock = MockHttpSend::new(StatusCode::OK, ITEM_LOOKUP_RESPONSE);
    let client = init_client(&mock);

    let resp = client
        .send_decoded(
            Method::GET,
            &[("Operation", "ItemLookup"), ("ItemId", "0816614024,0394740262")],
            None,
        )
        .await?;

    assert_eq!(resp.status(), StatusCode::OK);
    let root = resp.body();
    assert_eq!(texts(root, "ASIN"), vec!["0816614024", "0394740262"]);
    assert_eq!(
        texts(root, "Title"),
        vec!["The History of Sexuality", "Discipline & Punish"]
    );
    assert_eq!(
        serde_json::to_value(root.find("Creator")).expect("must serialize"),
        json!([{"Role": "Translator", "__content__": "Robert Hurley"}])
    );

    let requests = mock.requests();
    assert_eq!(requests.len(), 1);
    let pairs = parse_query(requests[0].uri.query().unwrap_or_default());
    let keys: Vec<_> = pairs.iter().map(|(k, _)| k.as_str()).collect();
    assert_eq!(
        keys,
        vec![
            "AWSAccessKeyId",
            "ItemId",
            "Operation",
            "Service",
            "SignatureMethod",
            "SignatureVersion",
            "Timestamp",
            "Version",
            "Signature"
        ]
    );
    Ok(())
}

#[tokio::test]
async fn test_send_decoded_without_content_length() -> Result<()> {
    let mock = MockHttpSend::new(StatusCode::OK, ITEM_LOOKUP_RESPONSE)
        .with_chunk_size(1)
        .without_content_length();
    let client = init_client(&mock);

    let resp = client
        .send_decoded(Method::GET, &[("Operation", "ItemLookup")], None)
        .await?;
    assert_eq!(texts(resp.body(), "IsValid"), vec!["True"]);
    Ok(())
}

#[tokio::test]
async fn test_error_status_is_returned() -> Result<()> {
    let mock = MockHttpSend::new(StatusCode::FORBIDDEN, ERROR_RESPONSE);
    let client = init_client(&mock);

    let resp = client
        .send_decoded(Method::GET, &[("Operation", "ItemLookup")], None)
        .await?;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert_eq!(texts(resp.body(), "Code"), vec!["SignatureDoesNotMatch"]);
    Ok(())
}

#[tokio::test]
async fn test_malformed_response() -> Result<()> {
    let mock = MockHttpSend::new(StatusCode::OK, "<ItemLookupResponse><Items>");
    let client = init_client(&mock);

    let err = client
        .send_decoded(Method::GET, &[("Operation", "ItemLookup")], None)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedInput);
    Ok(())
}

#[tokio::test]
async fn test_post_sends_form() -> Result<()> {
    let mock = MockHttpSend::new(StatusCode::OK, ITEM_LOOKUP_RESPONSE);
    let client = init_client(&mock);

    let resp = client.post(&[("Operation", "ItemLookup")], None).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.body().len(), ITEM_LOOKUP_RESPONSE.len());

    let requests = mock.requests();
    let req = &requests[0];
    assert_eq!(req.method, Method::POST);
    assert_eq!(req.uri.to_string(), ENDPOINT);
    assert_eq!(
        req.headers["content-type"],
        "application/x-www-form-urlencoded; charset=UTF-8"
    );

    let form = std::str::from_utf8(&req.body).expect("form must be utf-8");
    let pairs = parse_query(form);
    assert!(pairs.iter().any(|(k, v)| k == "Operation" && v == "ItemLookup"));
    assert_eq!(pairs.last().map(|(k, _)| k.as_str()), Some("Signature"));
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_send_streaming() -> Result<()> {
    let mock = MockHttpSend::new(StatusCode::OK, ITEM_LOOKUP_RESPONSE).with_chunk_size(3);
    let client = init_client(&mock);

    let mut reader = client
        .send_streaming(Method::GET, &[("Operation", "ItemLookup")], None)
        .await?;

    let (body, status) = tokio::task::spawn_blocking(move || -> Result<(String, StatusCode)> {
        let mut body = String::new();
        reader.read_to_string(&mut body)?;
        Ok((body, reader.status()?))
    })
    .await
    .expect("reader must not panic")?;

    assert_eq!(body, ITEM_LOOKUP_RESPONSE);
    assert_eq!(status, StatusCode::OK);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_send_streaming_cut_off() -> Result<()> {
    let mock = MockHttpSend::new(StatusCode::OK, ITEM_LOOKUP_RESPONSE)
        .with_chunk_size(16)
        .with_failure_after(2);
    let client = init_client(&mock);

    let mut reader = client
        .send_streaming(Method::GET, &[("Operation", "ItemLookup")], None)
        .await?;

    let read = tokio::task::spawn_blocking(move || {
        let mut body = Vec::new();
        reader.read_to_end(&mut body)
    })
    .await
    .expect("reader must not panic");
    assert!(read.is_err());
    Ok(())
}

#[tokio::test]
async fn test_credential_from_env() -> Result<()> {
    let mock = MockHttpSend::new(StatusCode::OK, ITEM_LOOKUP_RESPONSE);
    let ctx = Context::new().with_http_send(mock.clone()).with_env(StaticEnv {
        envs: HashMap::from([
            ("AWS_ACCESS_KEY_ID".to_string(), "env_access_key".to_string()),
            (
                "AWS_SECRET_ACCESS_KEY".to_string(),
                "env_secret_key".to_string(),
            ),
        ]),
    });
    let client = Client::new(
        ctx,
        ENDPOINT,
        Config::new(),
        DefaultCredentialProvider::new(),
    )?;

    let url = client.url(&[("Operation", "ItemLookup")]).await?;
    assert!(url.contains("AWSAccessKeyId=env_access_key&"));
    // Building a url sends nothing.
    assert!(mock.requests().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_missing_credential_sends_nothing() -> Result<()> {
    let mock = MockHttpSend::new(StatusCode::OK, ITEM_LOOKUP_RESPONSE);
    let ctx = Context::new().with_http_send(mock.clone());
    let client = Client::new(
        ctx,
        ENDPOINT,
        Config::new(),
        DefaultCredentialProvider::new(),
    )?;

    let err = client
        .get(&[("Operation", "ItemLookup")])
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ConfigInvalid);
    assert!(mock.requests().is_empty());
    Ok(())
}
