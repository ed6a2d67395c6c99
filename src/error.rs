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
use std::path::PathBuf;
use thiserror::Error;

/// Errors turning parsed arguments into a [`Config`](crate::config::Config) (src/config.rs).
#[derive(Error, Debug)]
pub enum ConfigError {
  #[error("No command given to run")]
  MissingCommand,

  #[error("--{option} value {value} does not fit this platform")]
  OutOfRange { option: &'static str, value: u64 },
}

/// Fatal errors raised while supervising the child (src/supervisor.rs).
///
/// Every variant ends the program with exit code 1.
#[derive(Error, Debug)]
pub enum SupervisorError {
  #[error("Failed to spawn child command: {}", .command.display())]
  Spawn {
    command: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("Failed to subscribe to process signals")]
  SignalSubscribe(#[source] std::io::Error),

  #[error("Child process has no pid")]
  MissingPid,

  #[error("Failed to take child stdout pipe")]
  PipeStdout,

  #[error("Failed to read child stdout")]
  ReadStdout(#[source] std::io::Error),

  #[error("Failed to write to stdout")]
  WriteStdout(#[source] std::io::Error),

  #[error("Could not send signal {signal} to child {pid}")]
  ForwardSignal {
    signal: &'static str,
    pid: i32,
    #[source]
    source: nix::Error,
  },

  #[error("Failed to wait for child process")]
  Wait(#[source] std::io::Error),

  #[error("Could not stop after forwarding a job-control stop")]
  StopSelf(#[source] nix::Error),
}

/// Reasons a candidate benchmark line cannot be rebuilt (src/format.rs).
///
/// These never escape the formatter: the line is passed through instead.
#[derive(Error, Debug, PartialEq)]
pub enum FormatError {
  #[error("Expected magnitude/unit pairs, got {fields} trailing fields")]
  UnpairedFields { fields: usize },

  #[error("Failed to parse magnitude '{text}'")]
  ParseMagnitude {
    text: String,
    #[source]
    source: std::num::ParseFloatError,
  },

  #[error("Magnitude '{text}' is not a finite number")]
  NonFiniteMagnitude { text: String },
}
