use std::io::{self, Write};

use reqwest::Url;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

/// Source of the one-time authorization code
pub trait CodePrompt: Send + Sync {
    /// Shows `authorization_url` to the operator and waits for one line
    fn read_code(
        &self,
        authorization_url: &Url,
    ) -> impl std::future::Future<Output = io::Result<String>> + Send;
}

/// Prompts on stdout and reads a single line from stdin
#[derive(Debug, Clone, Copy, Default)]
pub struct StdinPrompt;

impl CodePrompt for StdinPrompt {
    async fn read_code(&self, authorization_url: &Url) -> io::Result<String> {
        println!("Authorize this app by visiting this url: {}", authorization_url);
        print!("Enter the code from that page here: ");
        io::stdout().flush()?;

        read_code_line(&mut BufReader::new(tokio::io::stdin())).await
    }
}

/// One line from `reader`, surrounding whitespace removed
async fn read_code_line<R: AsyncBufRead + Unpin>(reader: &mut R) -> io::Result<String> {
    let mut line = String::new();
    if reader.read_line(&mut line).await? == 0 {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "stdin closed before an authorization code was entered",
        ));
    }
    Ok(line.trim().to_owned())
}
