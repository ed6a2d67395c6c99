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

//! # Humanbench
//!
//! `humanbench` runs a benchmark command and rewrites its result lines into
//! human-readable units as they stream past, e.g. `23200 ns/op` becomes
//! `23.20µs/op`. Everything else the command prints passes through untouched,
//! signals are forwarded to it, and its exit code becomes ours.
//!
//! This crate contains the library behind the `humanbench` binary.
//!
//! ## Core Modules
//!
//! * [`supervisor`]: Spawns the child and drives output, signals and the exit
//!   wait from one `select!` loop.
//! * [`relay`]: Reads the child's stdout line by line and formats each line.
//! * [`signals`]: Subscribes to process signals and forwards them to the child.
//! * [`format`]: Recognises benchmark result lines and rebuilds them in columns.
//! * [`units`]: Moves magnitudes onto the SI prefix that keeps them readable.
//! * [`cli`]: Defines the `clap`-based command-line interface.
//! * [`config`]: Turns the parsed CLI into a `Config`.
//! * [`command`]: Defines the `ChildCommand` struct.
//! * [`error`]: Defines the custom error types for the library.
//! * [`logging`]: Provides the `setup_tracing` utility.

pub mod cli;
pub mod command;
pub mod config;
pub mod error;
pub mod format;
pub mod logging;
pub mod relay;
pub mod signals;
pub mod supervisor;
pub mod units;
