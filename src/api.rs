use serde::{Deserialize, Serialize};

/// The version of this api, independent of any server implementation.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Plain text body of a successful `POST /commands`.
pub const CREATED_MESSAGE: &str = "Команда успешно создана";

/// Plain text body of a successful `POST /commands/{id}/stop`.
pub const STOPPED_MESSAGE: &str = "Команда успешно остановлена";

/// A stored shell command together with the output of its most recent run.
///
/// # Serialized Example
/// ```
/// # let ser = r#"
/// {
///     "ID": 1,
///     "Content": "echo 'Hello, World!'",
///     "Output": "Hello, World!\n"
/// }
/// # "#;
/// # let deser: command_runner_api::api::Command
/// #    = serde_json::from_str(ser).expect("failed parsing");
/// # assert_eq!(deser.id, 1);
/// # assert_eq!(deser.output, "Hello, World!\n");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    #[serde(rename = "ID")]
    pub id: i64,
    #[serde(rename = "Content")]
    pub content: String,
    /// Empty until the command has been run at least once.
    #[serde(rename = "Output", default)]
    pub output: String,
}

/// Form body of `POST /commands`, e.g. `content=echo+hello`.
///
/// A missing `content` field creates a command with empty content.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CreateCommand {
    #[serde(default)]
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_uses_capitalized_field_names() {
        let command = Command {
            id: 7,
            content: String::from("ls -l"),
            output: String::new(),
        };
        let json = serde_json::to_value(&command).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "ID": 7, "Content": "ls -l", "Output": "" })
        );
    }

    #[test]
    fn command_without_output_deserializes_to_empty() {
        let command: Command =
            serde_json::from_str(r#"{ "ID": 3, "Content": "pwd" }"#).unwrap();
        assert_eq!(command.output, "");
    }

    #[test]
    fn create_form_decodes_shell_quoting() {
        let form: CreateCommand =
            serde_urlencoded::from_str("content=echo+%27Hello%2C+World%21%27").unwrap();
        assert_eq!(form.content, "echo 'Hello, World!'");
    }

    #[test]
    fn create_form_missing_content_is_empty() {
        let form: CreateCommand = serde_urlencoded::from_str("").unwrap();
        assert_eq!(form.content, "");
    }
}
