//! Terminal prompts
//!
//! Questions, yes/no confirmations and the "press Enter" pause used before
//! the remote directory is wiped.

use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use crate::config::Field;
use crate::error::AppError;

/// User interaction interface
#[async_trait]
pub trait Prompter: Send {
    /// Ask for the value of a field
    async fn input(&mut self, field: Field) -> Result<String, AppError>;

    /// Ask a yes/no question, defaulting to no
    async fn confirm(&mut self, question: &str) -> Result<bool, AppError>;

    /// Block until the user acknowledges
    async fn pause(&mut self, message: &str) -> Result<(), AppError>;
}

/// Line based prompter over a reader/writer pair (stdin/stdout in production)
pub struct TerminalPrompter<R, W> {
    reader: R,
    writer: W,
}

impl TerminalPrompter<BufReader<tokio::io::Stdin>, tokio::io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
    }
}

impl<R, W> TerminalPrompter<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    /// Write `text` and read one line; `None` on end of input
    async fn ask(&mut self, text: &str) -> Result<Option<String>, AppError> {
        self.writer.write_all(text.as_bytes()).await?;
        self.writer.flush().await?;

        let mut line = String::new();
        if self.reader.read_line(&mut line).await? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }
}

#[async_trait]
impl<R, W> Prompter for TerminalPrompter<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    async fn input(&mut self, field: Field) -> Result<String, AppError> {
        loop {
            match self.ask(&format!("{}: ", field.prompt())).await? {
                Some(answer) if !answer.is_empty() => return Ok(answer),
                Some(_) => continue,
                None => return Err(AppError::MissingRequiredValue(field)),
            }
        }
    }

    async fn confirm(&mut self, question: &str) -> Result<bool, AppError> {
        let answer = self.ask(&format!("{} [y/N]: ", question)).await?;
        Ok(matches!(
            answer.map(|a| a.to_lowercase()).as_deref(),
            Some("y") | Some("yes")
        ))
    }

    async fn pause(&mut self, message: &str) -> Result<(), AppError> {
        match self.ask(message).await? {
            Some(_) => Ok(()),
            None => Err(AppError::UserAborted(
                "terminal closed before confirmation".to_string(),
            )),
        }
    }
}

/// Non-interactive prompter (`--yes`)
///
/// Confirms everything and never blocks; values that were not supplied by
/// flags or the settings file cannot be asked for.
pub struct AssumeYes;

#[async_trait]
impl Prompter for AssumeYes {
    async fn input(&mut self, field: Field) -> Result<String, AppError> {
        Err(AppError::MissingRequiredValue(field))
    }

    async fn confirm(&mut self, question: &str) -> Result<bool, AppError> {
        tracing::info!("Assuming yes: {}", question);
        Ok(true)
    }

    async fn pause(&mut self, _message: &str) -> Result<(), AppError> {
        Ok(())
    }
}
