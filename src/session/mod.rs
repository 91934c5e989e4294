//! Interactive line-oriented session.
//!
//! A session owns one [`UserListController`] for its whole lifetime, so the
//! cache and any tombstones survive between commands and vanish when the
//! session ends. Input and output are generic async streams; the binary
//! wires them to stdin/stdout and tests use in-memory buffers.

pub mod command;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::debug;

use crate::client::UserResource;
use crate::output::OutputFormat;
use crate::view::UserListController;

pub use command::{parse_command, SessionCommand};

const PROMPT: &str = "roster> ";

const HELP: &str = "\
Commands:
  list                              show users matching the current search
  search [TEXT]                     filter by name, email or department (empty clears)
  add NAME;EMAIL[;DEPARTMENT]       create a user
  edit ID FIELD=VALUE...            update name, email and/or department
                                    (`department=` clears it)
  rm ID                             delete a user
  refresh                           refetch the collection
  help                              show this message
  quit                              leave the session
";

/// An interactive session over a user collection.
#[derive(Debug)]
pub struct Session<R> {
    controller: UserListController<R>,
    format: OutputFormat,
    query: String,
}

impl<R: UserResource> Session<R> {
    pub fn new(controller: UserListController<R>, format: OutputFormat) -> Self {
        Self {
            controller,
            format,
            query: String::new(),
        }
    }

    pub fn controller(&self) -> &UserListController<R> {
        &self.controller
    }

    /// The active search text.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Mount the view, then process commands until `quit` or end of input.
    pub async fn run<I, O>(&mut self, input: I, mut out: O) -> std::io::Result<()>
    where
        I: AsyncBufRead + Unpin,
        O: AsyncWrite + Unpin,
    {
        // Failures are reported through notifications.
        let _ = self.controller.mount().await;
        self.render(&mut out).await?;

        let mut lines = input.lines();
        loop {
            out.write_all(PROMPT.as_bytes()).await?;
            out.flush().await?;

            let Some(line) = lines.next_line().await? else {
                out.write_all(b"\n").await?;
                break;
            };
            if line.trim().is_empty() {
                continue;
            }

            match parse_command(&line) {
                Ok(SessionCommand::Quit) => break,
                Ok(command) => {
                    debug!(?command, "session command");
                    self.execute(command, &mut out).await?;
                }
                Err(message) => {
                    out.write_all(format!("  {message}\n").as_bytes()).await?;
                }
            }
        }
        out.flush().await
    }

    async fn execute<O>(&mut self, command: SessionCommand, out: &mut O) -> std::io::Result<()>
    where
        O: AsyncWrite + Unpin,
    {
        match command {
            SessionCommand::List => {}
            SessionCommand::Search(text) => self.query = text,
            SessionCommand::Refresh => {
                let _ = self.controller.on_focus().await;
            }
            SessionCommand::Add(user) => match user.validate() {
                Ok(user) => {
                    let _ = self.controller.submit_create(user).await;
                }
                Err(e) => return write_line(out, &format!("  {e}")).await,
            },
            SessionCommand::Edit { id, patch } => match patch.validate() {
                Ok(patch) => {
                    let _ = self.controller.submit_update(id, patch).await;
                }
                Err(e) => return write_line(out, &format!("  {e}")).await,
            },
            SessionCommand::Remove(id) => {
                let _ = self.controller.submit_delete(id).await;
            }
            SessionCommand::Help => return out.write_all(HELP.as_bytes()).await,
            SessionCommand::Quit => return Ok(()),
        }
        self.render(out).await
    }

    /// Print queued notifications, then the filtered view.
    async fn render<O>(&self, out: &mut O) -> std::io::Result<()>
    where
        O: AsyncWrite + Unpin,
    {
        for notification in self.controller.drain_notifications() {
            write_line(out, &notification.styled()).await?;
        }
        if !self.query.is_empty() {
            write_line(out, &format!("  search: {:?}", self.query)).await?;
        }
        let users = self.controller.filtered(&self.query);
        let rendered = self.format.render(&users);
        out.write_all(rendered.as_bytes()).await?;
        if !rendered.ends_with('\n') {
            out.write_all(b"\n").await?;
        }
        Ok(())
    }
}

async fn write_line<O>(out: &mut O, line: &str) -> std::io::Result<()>
where
    O: AsyncWrite + Unpin,
{
    out.write_all(line.as_bytes()).await?;
    out.write_all(b"\n").await
}
