//! This crate serves purely as a rest api abstraction for a server that stores
//! shell commands and runs them on demand.
//! Additionally there is a canonical server implementation in the same repository.
//!
//! ## Usage
//! For the complete usage, see the serde structs in [`api`].
//! * `POST /commands` stores the form field `content` as a new command.
//! * `GET /commands` lists every stored [`api::Command`].
//! * `GET /commands/{id}` returns a single [`api::Command`].
//! * `POST /commands/{id}/stop` runs the command with the server's shell and
//!   stores the combined stdout and stderr as its output.
//!
//! Successful writes answer with the plain text messages
//! [`api::CREATED_MESSAGE`] and [`api::STOPPED_MESSAGE`].
//! Errors are plain text bodies with a matching status code.
//!
//! ## Running commands
//! Despite its name, `stop` does not interrupt anything. It starts the command,
//! waits until it terminates and only then responds.
//! *Make sure your commands always terminate*, a hanging command hangs its request.
//!
//! Only the output of the latest successful run is kept.
//! A run exiting with a non-zero status fails the request and leaves the
//! previous output untouched.
//!
//! ## Security
//! The api does not include any security measures, the stored content is handed
//! verbatim to a shell. This is *remote execution as a service!*.
//! Make sure it is only reachable from trusted hosts. E.g. by means of ssh port forwarding.

pub mod api;
