// Copyright 2025 Chisomo Makombo Sakala
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
use crate::format::LineFormatter;
use std::io;
use tokio::io::AsyncBufRead;
use tokio::io::AsyncBufReadExt;
use tokio::io::AsyncRead;
use tokio::io::AsyncReadExt;
use tokio::io::AsyncWrite;
use tokio::io::AsyncWriteExt;
use tokio::io::BufReader;
use tokio::sync::mpsc;

/// What the relay task hands to the writer: a formatted line, newline
/// included, or the read fault that ended the stream.
pub type RelayItem = io::Result<Vec<u8>>;

/// Reads the child's stdout line by line and formats each line.
#[derive(Debug, Clone)]
pub struct OutputRelay {
  formatter: LineFormatter,
  max_line_bytes: usize,
}

impl OutputRelay {
  pub fn new(formatter: LineFormatter, max_line_bytes: usize) -> Self {
    OutputRelay {
      formatter,
      max_line_bytes,
    }
  }

  /// Relays every line of `stream` into `tx`, in order.
  ///
  /// End of stream closes the channel. A read fault is sent once, then the
  /// channel closes. Stops early if the receiving side goes away.
  pub async fn run<R: AsyncRead + Unpin>(self, stream: R, tx: mpsc::Sender<RelayItem>) {
    let mut reader = BufReader::new(stream);
    let mut buf = Vec::new();
    let mut lines = 0usize;

    loop {
      buf.clear();
      match read_line(&mut reader, &mut buf, self.max_line_bytes).await {
        Ok(false) => {
          tracing::debug!(lines, "Child stdout closed");
          return;
        }
        Ok(true) => {
          lines += 1;
          if tx.send(Ok(self.format_line(&buf))).await.is_err() {
            return;
          }
        }
        Err(e) => {
          tracing::debug!(error = %e, lines, "Child stdout read failed");
          if tx.send(Err(e)).await.is_err() {
            tracing::debug!("Supervisor gone before the read fault was reported");
          }
          return;
        }
      }
    }
  }

  /// Formats one raw line and terminates it with a single `\n`.
  ///
  /// Lines that are not UTF-8 cannot be benchmark records and are copied as-is.
  pub fn format_line(&self, line: &[u8]) -> Vec<u8> {
    let mut out = match std::str::from_utf8(line) {
      Ok(text) => self.formatter.format(text).into_owned().into_bytes(),
      Err(_) => line.to_vec(),
    };
    out.push(b'\n');
    out
  }
}

/// Reads one line into `buf`, without its `\n`. Returns `false` at end of stream.
async fn read_line<R: AsyncBufRead + Unpin>(
  reader: &mut R,
  buf: &mut Vec<u8>,
  max_line_bytes: usize,
) -> io::Result<bool> {
  let limit = max_line_bytes as u64 + 1;
  let n = (&mut *reader).take(limit).read_until(b'\n', buf).await?;
  if n == 0 {
    return Ok(false);
  }

  if buf.last() == Some(&b'\n') {
    buf.pop();
  } else if buf.len() > max_line_bytes {
    return Err(io::Error::new(
      io::ErrorKind::InvalidData,
      format!("line exceeds {max_line_bytes} bytes"),
    ));
  }
  Ok(true)
}

/// Writes one relayed line and flushes it straight away.
pub async fn emit<W: AsyncWrite + Unpin>(out: &mut W, line: &[u8]) -> io::Result<()> {
  out.write_all(line).await?;
  out.flush().await
}
