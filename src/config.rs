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
use crate::cli::Cli;
use crate::command::ChildCommand;
use crate::error::ConfigError;
use crate::format::Layout;
use std::path::PathBuf;

/// Fully validated and resolved configuration.
#[derive(Debug, Clone)]
pub struct Config {
  pub command: ChildCommand,
  pub layout: Layout,
  pub max_line_bytes: usize,
  pub queue_depth: usize,
}

impl Config {
  /// Default layout and limits for `command`.
  pub fn for_command(command: ChildCommand) -> Self {
    Config {
      command,
      layout: Layout::default(),
      max_line_bytes: 1 << 20,
      queue_depth: 16,
    }
  }
}

impl TryFrom<Cli> for Config {
  type Error = ConfigError;

  fn try_from(
    Cli {
      prefix,
      precision,
      count_width,
      time_width,
      metric_width,
      rate_width,
      max_line_bytes,
      queue_depth,
      command,
    }: Cli,
  ) -> Result<Self, Self::Error> {
    let mut command = command.into_iter();
    let program = command.next().ok_or(ConfigError::MissingCommand)?;

    let max_line_bytes = usize::try_from(max_line_bytes).map_err(|_| ConfigError::OutOfRange {
      option: "max-line-bytes",
      value: max_line_bytes,
    })?;

    Ok(Config {
      command: ChildCommand {
        command: PathBuf::from(program),
        args: command.collect(),
      },
      layout: Layout {
        prefix,
        precision: precision.into(),
        count_width: count_width.into(),
        time_width: time_width.into(),
        metric_width: metric_width.into(),
        rate_width: rate_width.into(),
      },
      max_line_bytes,
      queue_depth: queue_depth as usize,
    })
  }
}
