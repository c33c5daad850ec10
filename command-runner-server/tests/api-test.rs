//! Tests which start the binary and call the api.

use std::path::PathBuf;
use std::time::Duration;

use command_runner_api::api::{Command, CREATED_MESSAGE, STOPPED_MESSAGE};
use httpc_test::Client;
use tokio::process::Child;

/// A running server binary with its own database file.
struct TestServer {
    child: Child,
    hc: Client,
    database: PathBuf,
}

impl TestServer {
    async fn shutdown(mut self) {
        self.child.kill().await.expect("Couldn't kill server");
        let _ = std::fs::remove_file(&self.database);
    }
}

/// Starts the command runner binary and waits until it answers on `/health`.
async fn spawn_server() -> anyhow::Result<TestServer> {
    // IANA recommended port range.
    let port = fastrand::u16(49152..65535);
    let database = std::env::temp_dir().join(format!("command-runner-{port}.db"));
    let _ = std::fs::remove_file(&database);

    let child = tokio::process::Command::new(env!("CARGO_BIN_EXE_command-runner-server"))
        .kill_on_drop(true)
        .args(["--host", "127.0.0.1"])
        .args(["--port", &port.to_string()])
        .args([
            "--database-url",
            &format!("sqlite://{}?mode=rwc", database.display()),
        ])
        .args(["--shell", "bash"])
        .spawn()
        .expect("Couldn't spawn server");
    let hc = httpc_test::new_client(format!("http://localhost:{port}"))?;

    for _ in 0..100 {
        if hc.do_get("/health").await.is_ok() {
            return Ok(TestServer {
                child,
                hc,
                database,
            });
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    anyhow::bail!("server did not come up on port {port}")
}

async fn create(hc: &Client, form: &str) -> anyhow::Result<()> {
    let response = hc
        .do_post("/commands", (form, "application/x-www-form-urlencoded"))
        .await?;
    response.print().await?;
    assert_eq!(response.status().as_u16(), 201);
    assert_eq!(response.text_body()?, CREATED_MESSAGE);
    Ok(())
}

#[cfg(unix)]
#[tokio::test(flavor = "current_thread")]
async fn hello_world_scenario() -> anyhow::Result<()> {
    let server = spawn_server().await?;
    let hc = &server.hc;

    create(hc, "content=echo+%27Hello%2C+World%21%27").await?;

    let list = hc.do_get("/commands").await?;
    list.print().await?;
    let commands: Vec<Command> = list.json_body_as()?;
    assert_eq!(commands.len(), 1);
    assert_eq!(commands[0].content, "echo 'Hello, World!'");
    assert_eq!(commands[0].output, "");

    let stop = hc.do_post("/commands/1/stop", "").await?;
    stop.print().await?;
    assert_eq!(stop.status().as_u16(), 200);
    assert_eq!(stop.text_body()?, STOPPED_MESSAGE);

    let command: Command = hc.do_get("/commands/1").await?.json_body_as()?;
    assert_eq!(command.id, 1);
    assert!(command.output.contains("Hello, World!"));

    server.shutdown().await;
    Ok(())
}

#[tokio::test(flavor = "current_thread")]
async fn invalid_and_unknown_ids() -> anyhow::Result<()> {
    let server = spawn_server().await?;
    let hc = &server.hc;

    let response = hc.do_get("/commands/abc").await?;
    assert_eq!(response.status().as_u16(), 400);

    let response = hc.do_get("/commands/12345").await?;
    assert_eq!(response.status().as_u16(), 404);

    let response = hc.do_post("/commands/12345/stop", "").await?;
    assert_eq!(response.status().as_u16(), 404);

    server.shutdown().await;
    Ok(())
}

#[tokio::test(flavor = "current_thread")]
async fn created_ids_are_readable() -> anyhow::Result<()> {
    let server = spawn_server().await?;
    let hc = &server.hc;

    create(hc, "content=pwd").await?;
    create(hc, "content=ls+-l").await?;

    let commands: Vec<Command> = hc.do_get("/commands").await?.json_body_as()?;
    assert_eq!(commands.len(), 2);
    for listed in commands {
        let single: Command = hc
            .do_get(&format!("/commands/{}", listed.id))
            .await?
            .json_body_as()?;
        assert_eq!(single, listed);
    }

    server.shutdown().await;
    Ok(())
}

#[tokio::test(flavor = "current_thread")]
async fn ready_reports_database() -> anyhow::Result<()> {
    let server = spawn_server().await?;

    let response = server.hc.do_get("/ready").await?;
    assert_eq!(response.status().as_u16(), 200);

    server.shutdown().await;
    Ok(())
}

#[cfg(unix)]
#[tokio::test(flavor = "current_thread")]
async fn sigterm_shuts_down_cleanly() -> anyhow::Result<()> {
    let mut server = spawn_server().await?;
    let pid = server.child.id().expect("server is running");

    let kill = tokio::process::Command::new("kill")
        .args(["-TERM", &pid.to_string()])
        .status()
        .await?;
    assert!(kill.success());

    let status = tokio::time::timeout(Duration::from_secs(10), server.child.wait()).await??;
    assert!(status.success(), "server exited with {status}");

    let _ = std::fs::remove_file(&server.database);
    Ok(())
}
