//! Newline-delimited JSON transport.
//!
//! Each message is one compact JSON object followed by `\n`. Blank lines
//! are skipped.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, Stdin, Stdout};

use crate::ScanResult;

use super::protocol::ServerResponse;

/// Line transport over any async reader/writer pair.
pub struct LineTransport<R, W> {
    reader: R,
    writer: W,
}

/// Transport over the process stdin/stdout.
pub type StdioTransport = LineTransport<BufReader<Stdin>, Stdout>;

impl StdioTransport {
    /// Creates a stdio transport.
    pub fn stdio() -> Self {
        LineTransport::new(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
    }
}

impl<R, W> LineTransport<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    /// Wraps a reader and writer.
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    /// Reads the next non-blank line, or `None` at EOF.
    pub async fn read_line(&mut self) -> ScanResult<Option<String>> {
        loop {
            let mut line = String::new();
            let bytes_read = self.reader.read_line(&mut line).await?;
            if bytes_read == 0 {
                return Ok(None);
            }

            let trimmed = line.trim();
            if !trimmed.is_empty() {
                return Ok(Some(trimmed.to_string()));
            }
        }
    }

    /// Writes one response line and flushes.
    pub async fn write_response(&mut self, response: &ServerResponse) -> ScanResult<()> {
        let body = serde_json::to_string(response)?;

        self.writer.write_all(body.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        // flush so the client sees the answer before the next request
        self.writer.flush().await?;

        tracing::debug!(status = response.status, "Sent response");
        Ok(())
    }

    /// Consumes the transport, returning the writer.
    pub fn into_writer(self) -> W {
        self.writer
    }
}
