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
use anyhow::Result;
use clap::Parser;
use humanbench::cli::Cli;
use humanbench::config::Config;
use humanbench::logging::setup_tracing;
use humanbench::supervisor::supervise;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> Result<ExitCode> {
  let _log_guard = setup_tracing()?;

  // Usage errors exit with status 2 from inside clap.
  let config = Config::try_from(Cli::parse())?;

  let outcome = supervise(&config, tokio::io::stdout()).await?;

  Ok(ExitCode::from(outcome.exit_code()))
}
