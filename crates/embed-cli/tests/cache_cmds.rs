#![allow(missing_docs, clippy::expect_used, clippy::unwrap_used)]

mod common;

use common::{HELLO, Sandbox, embed_cmd};
use predicates::prelude::*;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn hello_server(expected_hits: u64) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/p"))
        .respond_with(ResponseTemplate::new(200).set_body_string(HELLO))
        .expect(expected_hits)
        .mount(&server)
        .await;
    server
}

fn request(sandbox: &Sandbox) {
    embed_cmd(sandbox)
        .args(["request", "page", ".title"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Hello"));
}

#[tokio::test]
async fn forget_causes_a_refetch() -> anyhow::Result<()> {
    let server = hello_server(2).await;
    let sandbox = Sandbox::new(&server.uri());

    request(&sandbox);
    embed_cmd(&sandbox)
        .args(["forget", "page", ".title"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Forgot cached content"));
    request(&sandbox);
    Ok(())
}

#[tokio::test]
async fn flush_by_site_tag_causes_a_refetch() -> anyhow::Result<()> {
    let server = hello_server(2).await;
    let sandbox = Sandbox::new(&server.uri());
    let host = url_host(&server.uri());

    request(&sandbox);
    embed_cmd(&sandbox)
        .args(["flush", "--tag", &format!("site:{host}")])
        .assert()
        .success()
        .stdout(predicate::str::contains("Evicted 1 cached entry"));
    request(&sandbox);
    Ok(())
}

#[tokio::test]
async fn flush_other_tag_keeps_entries() -> anyhow::Result<()> {
    let server = hello_server(1).await;
    let sandbox = Sandbox::new(&server.uri());

    request(&sandbox);
    embed_cmd(&sandbox)
        .args(["flush", "--tag", "site:elsewhere.test"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No cached entries"));
    request(&sandbox);
    Ok(())
}

#[tokio::test]
async fn flush_everything_causes_a_refetch() -> anyhow::Result<()> {
    let server = hello_server(2).await;
    let sandbox = Sandbox::new(&server.uri());

    request(&sandbox);
    embed_cmd(&sandbox)
        .arg("flush")
        .assert()
        .success()
        .stdout(predicate::str::contains("Cache cleared"));
    request(&sandbox);
    Ok(())
}

fn url_host(uri: &str) -> String {
    uri.trim_start_matches("http://")
        .split(':')
        .next()
        .unwrap_or_default()
        .to_string()
}
