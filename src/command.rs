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
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;

/// The executable and arguments of the supervised child.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildCommand {
  /// The command to execute (e.g., "go" or "/path/to/bench.test").
  pub command: PathBuf,

  /// Arguments passed to the command verbatim.
  pub args: Vec<OsString>,
}

impl ChildCommand {
  /// Builds the child with stdout piped to us and stdin/stderr shared.
  ///
  /// The child is killed if its handle is dropped before it exits, so a
  /// fatal error in the supervisor takes the child down with it.
  pub fn to_command(&self) -> Command {
    let mut cmd = Command::new(&self.command);
    cmd
      .args(&self.args)
      .stdin(Stdio::inherit())
      .stdout(Stdio::piped())
      .stderr(Stdio::inherit())
      .kill_on_drop(true);
    cmd
  }
}
