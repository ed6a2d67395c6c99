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
use clap::Parser;
use clap::value_parser;
use std::ffi::OsString;

#[derive(Debug, Parser)]
#[command(
  version,
  about = "Runs a benchmark command, printing its results in human-readable units",
  long_about = "humanbench runs the given command, e.g. `humanbench go test -bench .`, \
                and rewrites every benchmark result line it prints into scaled, \
                aligned units while the command is still running. Other output \
                passes through unchanged, signals are forwarded to the command, \
                and humanbench exits with the command's exit code."
)]
pub struct Cli {
  /// Literal every benchmark name starts with.
  #[arg(long, default_value = "Benchmark")]
  pub prefix: String,

  /// Decimals shown for scaled magnitudes.
  #[arg(long, default_value_t = 2, value_parser = value_parser!(u8).range(0..=12))]
  pub precision: u8,

  /// Width of the iteration count column.
  #[arg(long, default_value_t = 8)]
  pub count_width: u16,

  /// Width of time-per-operation columns (e.g. ns/op).
  #[arg(long, default_value_t = 18)]
  pub time_width: u16,

  /// Width of every other scaled column (e.g. B/op, allocs/op).
  #[arg(long, default_value_t = 16)]
  pub metric_width: u16,

  /// Width of a rate's value, before its unit (e.g. MB/s).
  #[arg(long, default_value_t = 7)]
  pub rate_width: u16,

  /// Longest stdout line accepted from the command, in bytes.
  #[arg(long, default_value_t = 1 << 20, value_parser = value_parser!(u64).range(1..))]
  pub max_line_bytes: u64,

  /// Lines buffered between the reader and the writer.
  #[arg(long, default_value_t = 16, value_parser = value_parser!(u32).range(1..))]
  pub queue_depth: u32,

  /// The command to run, followed by its arguments.
  #[arg(
    required = true,
    value_name = "COMMAND",
    trailing_var_arg = true,
    allow_hyphen_values = true
  )]
  pub command: Vec<OsString>,
}
