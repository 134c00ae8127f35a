use std::time::Duration;

use configs::AppConfig;
use reqwest::StatusCode as HttpStatusCode;
use server::errors::{ServerError, StartupError};

struct TestApp {
    app: server::App<service::store::MysqlStore>,
    base_url: String,
    diagnostic: String,
}

async fn start_server() -> anyhow::Result<TestApp> {
    let mut cfg = AppConfig::default();
    cfg.server.port = 0;
    cfg.store.connection = "mysql".into();
    cfg.normalize_and_validate()?;

    let mut app = server::build(&cfg).await?;
    let started = app.start().await?;
    let base_url = format!("http://{}", started.local_addr);
    Ok(TestApp { app, base_url, diagnostic: started.diagnostic })
}

#[tokio::test]
async fn e2e_ping_lookup_and_stop() -> anyhow::Result<()> {
    let mut t = start_server().await?;
    assert_eq!(t.diagnostic, "Mysql: hello");

    let c = reqwest::Client::new();
    let res = c.get(format!("{}/ping", t.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    assert_eq!(res.text().await?, r#"{"message":"pong"}"#);

    let res = c.get(format!("{}/lookup/world", t.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["value"], "Mysql: world");

    t.app.stop(Duration::from_secs(5)).await?;
    let after = reqwest::Client::new()
        .get(format!("{}/ping", t.base_url))
        .timeout(Duration::from_secs(2))
        .send()
        .await;
    assert!(after.is_err());
    Ok(())
}

#[tokio::test]
async fn e2e_second_app_on_same_port_fails() -> anyhow::Result<()> {
    let mut first = start_server().await?;
    let port = first.app.http().local_addr().expect("listening").port();

    let mut cfg = AppConfig::default();
    cfg.server.port = port;
    let mut second = server::build(&cfg).await?;
    match second.start().await {
        Err(StartupError::Server(ServerError::AddrInUse(addr))) => assert_eq!(addr.port(), port),
        Err(other) => panic!("expected AddrInUse, got {other}"),
        Ok(s) => panic!("second server unexpectedly bound {}", s.local_addr),
    }
    assert_eq!(second.http().local_addr(), None);

    let res = reqwest::get(format!("{}/ping", first.base_url)).await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    first.app.stop(Duration::from_secs(5)).await?;
    Ok(())
}
