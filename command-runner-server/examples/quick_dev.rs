use command_runner_api::api::{Command, CreateCommand};

const URL: &str = "http://localhost:8080";

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let hc = httpc_test::new_client(URL)?;

    let form = serde_urlencoded::to_string(CreateCommand {
        content: String::from("uname -a"),
    })?;
    hc.do_post("/commands", (form, "application/x-www-form-urlencoded"))
        .await?
        .print()
        .await?;

    let commands: Vec<Command> = hc.do_get("/commands").await?.json_body_as()?;
    let Some(latest) = commands.last() else {
        return Ok(());
    };

    let path = format!("/commands/{}/stop", latest.id);
    hc.do_post(&path, "").await?.print().await?;

    let command: Command = hc
        .do_get(&format!("/commands/{}", latest.id))
        .await?
        .json_body_as()?;
    println!("Output: {}", command.output);

    Ok(())
}
