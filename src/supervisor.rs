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
use crate::config::Config;
use crate::error::SupervisorError;
use crate::format::LineFormatter;
use crate::relay;
use crate::relay::OutputRelay;
use crate::relay::RelayItem;
use crate::signals;
use crate::signals::SignalRelay;
use nix::sys::signal::Signal;
use nix::unistd::Pid;
use std::os::unix::process::ExitStatusExt;
use std::process::ExitStatus;
use tokio::io::AsyncWrite;
use tokio::process::Child;
use tokio::sync::mpsc;
use tracing::Instrument;

/// How a supervised run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
  /// The child exited and all of its output was relayed.
  Exited(ExitStatus),
  /// The child had exited, but a terminating signal arrived while its
  /// leftover output (e.g. from a background grandchild) was still draining.
  Interrupted(Signal),
}

impl Outcome {
  /// The exit code the program should report for this outcome.
  pub fn exit_code(&self) -> u8 {
    match self {
      Outcome::Exited(status) => exit_code(*status),
      Outcome::Interrupted(signal) => signal_exit_code(*signal as i32),
    }
  }
}

/// Runs the configured child to completion, relaying its stdout into `out`.
///
/// A spawned task reads and formats the child's stdout; this loop multiplexes
/// those lines, incoming signals and the child's exit, and is the only writer
/// of `out`. The loop alone owns the child handle, so it is only ever reaped
/// here and a signal is never sent to a pid that was already reaped. Once the
/// exit is seen, every remaining line is written before returning.
pub async fn supervise<W: AsyncWrite + Unpin>(
  config: &Config,
  mut out: W,
) -> Result<Outcome, SupervisorError> {
  let span = tracing::info_span!(
    "supervise",
    command = %config.command.command.display(),
  );

  async {
    // Subscribe first so no signal slips past between spawn and select.
    let mut signals = SignalRelay::listen().map_err(SupervisorError::SignalSubscribe)?;

    let mut child = config
      .command
      .to_command()
      .spawn()
      .map_err(|source| SupervisorError::Spawn {
        command: config.command.command.clone(),
        source,
      })?;
    let pid = child
      .id()
      .map(|id| Pid::from_raw(id as i32))
      .ok_or(SupervisorError::MissingPid)?;
    let stdout = child.stdout.take().ok_or(SupervisorError::PipeStdout)?;
    tracing::info!(pid = pid.as_raw(), args = ?config.command.args, "Spawned child");

    let (line_tx, mut lines) = mpsc::channel::<RelayItem>(config.queue_depth);
    let output_relay = OutputRelay::new(
      LineFormatter::new(config.layout.clone()),
      config.max_line_bytes,
    );
    tokio::spawn(
      output_relay
        .run(stdout, line_tx)
        .instrument(tracing::info_span!("stdout_relay", pid = pid.as_raw())),
    );

    let mut stream_closed = false;
    let status = loop {
      tokio::select! {
        item = lines.recv(), if !stream_closed => match item {
          Some(item) => write_item(&mut out, item).await?,
          None => stream_closed = true,
        },
        Some(signo) = signals.recv() => {
          if let Some(status) = relay_signal(&signals, &mut child, pid, signo)? {
            break status;
          }
        }
        // Child::wait is cancel safe, so re-arming it every turn loses nothing.
        result = child.wait() => break result.map_err(SupervisorError::Wait)?,
      }
    };
    tracing::info!(?status, "Child exited");

    let outcome = if stream_closed {
      Outcome::Exited(status)
    } else {
      drain(&mut signals, &mut lines, &mut out, status).await?
    };
    signals.close();
    Ok(outcome)
  }
  .instrument(span)
  .await
}

/// Forwards `signo` to the child unless it has already exited, in which case
/// its exit status is returned and nothing is sent.
fn relay_signal(
  signals: &SignalRelay,
  child: &mut Child,
  pid: Pid,
  signo: i32,
) -> Result<Option<ExitStatus>, SupervisorError> {
  if let Some(status) = child.try_wait().map_err(SupervisorError::Wait)? {
    tracing::debug!(signo, "Child already exited, not forwarding");
    return Ok(Some(status));
  }
  signals.relay(signo, pid)?;
  Ok(None)
}

/// Writes the lines still in flight after the child exited.
///
/// A grandchild may hold the pipe open indefinitely, so a terminating signal
/// ends the drain early; there is no child left to forward it to.
async fn drain<W: AsyncWrite + Unpin>(
  signals: &mut SignalRelay,
  lines: &mut mpsc::Receiver<RelayItem>,
  out: &mut W,
  status: ExitStatus,
) -> Result<Outcome, SupervisorError> {
  loop {
    tokio::select! {
      item = lines.recv() => match item {
        Some(item) => write_item(out, item).await?,
        None => return Ok(Outcome::Exited(status)),
      },
      Some(signo) = signals.recv() => {
        if let Some(signal) = signals::terminating(signo) {
          tracing::info!(%signal, "Interrupted while draining output");
          return Ok(Outcome::Interrupted(signal));
        }
      }
    }
  }
}

async fn write_item<W: AsyncWrite + Unpin>(out: &mut W, item: RelayItem) -> Result<(), SupervisorError> {
  let line = item.map_err(SupervisorError::ReadStdout)?;
  relay::emit(out, &line)
    .await
    .map_err(SupervisorError::WriteStdout)
}

/// Maps the child's exit status to ours.
///
/// A normal exit keeps its code. Death by signal `N` becomes `128 + N`, as
/// shells report it.
pub fn exit_code(status: ExitStatus) -> u8 {
  match (status.code(), status.signal()) {
    (Some(code), _) => (code & 0xff) as u8,
    (None, Some(signal)) => signal_exit_code(signal),
    (None, None) => 1,
  }
}

fn signal_exit_code(signo: i32) -> u8 {
  u8::try_from(128 + signo).unwrap_or(u8::MAX)
}
