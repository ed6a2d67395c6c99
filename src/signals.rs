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

//! Signal transparency: everything the supervisor receives goes to the child.
//!
//! The supervisor subscribes to every signal the OS lets it handle and
//! forwards each one with `kill(2)`, except for [`SWALLOWED`]. A forwarded
//! job-control stop ([`JOB_STOPS`]) also stops the supervisor, so the shell
//! sees the whole job suspend.
use crate::error::SupervisorError;
use nix::sys::signal::Signal;
use nix::unistd::Pid;
use signal_hook_tokio::Handle;
use signal_hook_tokio::Signals;
use std::io;
use tokio_stream::StreamExt;

/// Signals that are received but never forwarded.
///
/// `SIGCHLD` reports our own child's state changes and means nothing to it.
/// `SIGSTOP` cannot be caught, but is listed so a stray one is never relayed.
pub const SWALLOWED: [Signal; 2] = [Signal::SIGCHLD, Signal::SIGSTOP];

/// Synchronous fault signals. A handler that returns would re-fault forever.
const UNSUBSCRIBED: [Signal; 3] = [Signal::SIGBUS, Signal::SIGTRAP, Signal::SIGSYS];

/// Signals that end the supervisor once there is no child left to forward to.
pub const TERMINATING: [Signal; 4] = [
  Signal::SIGHUP,
  Signal::SIGINT,
  Signal::SIGQUIT,
  Signal::SIGTERM,
];

/// Job-control stops. After forwarding one we stop ourselves with `SIGSTOP`,
/// so the shell sees the whole job stop; `SIGCONT` later resumes both.
pub const JOB_STOPS: [Signal; 3] = [Signal::SIGTSTP, Signal::SIGTTIN, Signal::SIGTTOU];

/// What happened to a received signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
  Forwarded(Signal),
  Swallowed(Signal),
  /// A signal number nix has no name for.
  Unknown(i32),
}

pub fn should_forward(signal: Signal) -> bool {
  !SWALLOWED.contains(&signal)
}

/// `Some(signal)` when `signo` is one of [`TERMINATING`].
pub fn terminating(signo: i32) -> Option<Signal> {
  Signal::try_from(signo)
    .ok()
    .filter(|signal| TERMINATING.contains(signal))
}

/// Every standard signal a handler may be installed for.
pub fn subscribable() -> Vec<i32> {
  Signal::iterator()
    .filter(|signal| !UNSUBSCRIBED.contains(signal))
    .map(|signal| signal as i32)
    .filter(|signo| !signal_hook::consts::FORBIDDEN.contains(signo))
    .collect()
}

/// Sends `signo` on to `child`, unless it is one of [`SWALLOWED`].
pub fn forward(signo: i32, child: Pid) -> Result<Disposition, SupervisorError> {
  let Ok(signal) = Signal::try_from(signo) else {
    return Ok(Disposition::Unknown(signo));
  };
  if !should_forward(signal) {
    return Ok(Disposition::Swallowed(signal));
  }

  nix::sys::signal::kill(child, signal).map_err(|source| SupervisorError::ForwardSignal {
    signal: signal.as_str(),
    pid: child.as_raw(),
    source,
  })?;
  Ok(Disposition::Forwarded(signal))
}

/// A subscription to all catchable signals delivered to this process.
pub struct SignalRelay {
  signals: Signals,
  handle: Handle,
}

impl SignalRelay {
  /// Starts listening. Call before spawning the child so nothing is missed.
  pub fn listen() -> io::Result<Self> {
    let signals = Signals::new(subscribable())?;
    let handle = signals.handle();
    Ok(SignalRelay { signals, handle })
  }

  /// Waits for the next signal. `None` once the subscription is closed.
  pub async fn recv(&mut self) -> Option<i32> {
    self.signals.next().await
  }

  /// Forwards a received signal to the child and logs the outcome.
  ///
  /// `child` must not have been reaped yet, or the pid may belong to someone else.
  pub fn relay(&self, signo: i32, child: Pid) -> Result<Disposition, SupervisorError> {
    let disposition = forward(signo, child)?;
    match disposition {
      Disposition::Forwarded(signal) if JOB_STOPS.contains(&signal) => {
        tracing::debug!(%signal, pid = child.as_raw(), "Forwarded job stop, stopping");
        nix::sys::signal::raise(Signal::SIGSTOP).map_err(SupervisorError::StopSelf)?;
      }
      Disposition::Forwarded(signal) => tracing::debug!(%signal, pid = child.as_raw(), "Forwarded signal"),
      Disposition::Swallowed(signal) => tracing::debug!(%signal, "Swallowed signal"),
      Disposition::Unknown(signo) => tracing::warn!(signo, "Ignoring unknown signal"),
    }
    Ok(disposition)
  }

  /// Stops the subscription; pending and future signals are dropped.
  pub fn close(&self) {
    self.handle.close();
  }
}
