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
use assert_cmd::cargo;
use assert_cmd::prelude::*;
use nix::sys::signal::Signal;
use nix::sys::signal::kill;
use nix::sys::wait::WaitPidFlag;
use nix::sys::wait::WaitStatus;
use nix::sys::wait::waitpid;
use nix::unistd::Pid;
use predicates::prelude::*;
use std::io::BufRead;
use std::io::BufReader;
use std::io::Read;
use std::process::Command;
use std::process::Stdio;
use std::thread;
use std::time::Duration;
use std::time::Instant;

fn humanbench_sh(script: &str) -> Command {
  let mut cmd = Command::new(cargo::cargo_bin!("humanbench"));
  cmd.arg("sh").arg("-c").arg(script);
  cmd
}

#[test]
fn test_non_benchmark_output_passes_through() {
  humanbench_sh(r"printf 'goos: linux\nPASS\nok  \tpkg\t0.002s\n'")
    .assert()
    .success()
    .stdout("goos: linux\nPASS\nok  \tpkg\t0.002s\n");
}

#[test]
fn test_benchmark_line_is_rewritten() {
  humanbench_sh(
    "echo 'BenchmarkIndexRune-4   50000000   23.2 ns/op   44.75 MB/s   0 B/op   0 allocs/op'",
  )
  .assert()
  .success()
  .stdout(predicate::str::starts_with("BenchmarkIndexRune-4\t50000000\t"))
  .stdout(predicate::str::contains("23.20ns/op"))
  .stdout(predicate::str::contains("44.75MB/s"))
  .stdout(predicate::str::contains("0.00B/op"))
  .stdout(predicate::str::contains("0.00 allocs/op"));
}

#[test]
fn test_scaling_and_layout_options() {
  let mut cmd = Command::new(cargo::cargo_bin!("humanbench"));
  cmd
    .args(["--precision", "1", "--time-width", "0", "--count-width", "0"])
    .args(["sh", "-c", "echo 'BenchmarkSlow 5 319000000 ns/op'"]);

  cmd
    .assert()
    .success()
    .stdout("BenchmarkSlow\t5\t319.0ms/op\n");
}

#[test]
fn test_child_arguments_are_not_parsed() {
  humanbench_sh(r#"echo "$@""#)
    .args(["sh", "--precision", "-v"])
    .assert()
    .success()
    .stdout("--precision -v\n");
}

#[test]
fn test_unterminated_last_line() {
  humanbench_sh("printf PASS").assert().success().stdout("PASS\n");
}

#[test]
fn test_stderr_is_untouched() {
  humanbench_sh("echo 'BenchmarkOnStderr 1 2000 ns/op' >&2")
    .assert()
    .success()
    .stdout("")
    .stderr("BenchmarkOnStderr 1 2000 ns/op\n");
}

#[test]
fn test_exit_code_is_propagated() {
  humanbench_sh("echo done; exit 3")
    .assert()
    .code(3)
    .stdout("done\n");
}

#[test]
fn test_signal_death_maps_to_128_plus_signal() {
  humanbench_sh("kill -TERM $$").assert().code(128 + 15);
}

#[test]
fn test_missing_command_is_a_usage_error() {
  Command::new(cargo::cargo_bin!("humanbench"))
    .assert()
    .code(2)
    .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_spawn_failure_is_fatal() {
  Command::new(cargo::cargo_bin!("humanbench"))
    .arg("/nonexistent/humanbench-child")
    .assert()
    .code(1)
    .stderr(predicate::str::contains("Failed to spawn child command"));
}

#[test]
fn test_interrupt_is_forwarded_to_child() {
  let mut child = Command::new(cargo::cargo_bin!("humanbench"))
    .args([
      "sh",
      "-c",
      "trap 'echo interrupted; exit 7' INT; echo ready; while :; do sleep 0.1; done",
    ])
    .stdout(Stdio::piped())
    .spawn()
    .unwrap();

  let mut stdout = BufReader::new(child.stdout.take().unwrap());
  let mut first = String::new();
  stdout.read_line(&mut first).unwrap();
  assert_eq!(first, "ready\n");

  kill(Pid::from_raw(child.id() as i32), Signal::SIGINT).unwrap();

  let mut rest = String::new();
  stdout.read_to_string(&mut rest).unwrap();
  let status = child.wait().unwrap();

  assert_eq!(rest, "interrupted\n");
  assert_eq!(status.code(), Some(7));
}

#[test]
fn test_child_state_change_is_swallowed() {
  // Only shell builtins run after the trap, so the child gets no SIGCHLD of
  // its own; any "got-chld" would have come from us.
  let mut child = Command::new(cargo::cargo_bin!("humanbench"))
    .args([
      "sh",
      "-c",
      "trap 'echo got-chld' CHLD; echo ready; i=0; while [ $i -lt 300000 ]; do i=$((i+1)); done; echo finished",
    ])
    .stdout(Stdio::piped())
    .spawn()
    .unwrap();

  let mut stdout = BufReader::new(child.stdout.take().unwrap());
  let mut first = String::new();
  stdout.read_line(&mut first).unwrap();
  assert_eq!(first, "ready\n");

  kill(Pid::from_raw(child.id() as i32), Signal::SIGCHLD).unwrap();

  let mut rest = String::new();
  stdout.read_to_string(&mut rest).unwrap();
  let status = child.wait().unwrap();

  assert_eq!(rest, "finished\n");
  assert!(status.success());
}

#[test]
fn test_terminate_while_grandchild_holds_output() {
  let mut child = Command::new(cargo::cargo_bin!("humanbench"))
    .args(["sh", "-c", "sleep 5 & echo ready; exit 0"])
    .stdout(Stdio::piped())
    .spawn()
    .unwrap();

  let mut stdout = BufReader::new(child.stdout.take().unwrap());
  let mut first = String::new();
  stdout.read_line(&mut first).unwrap();
  assert_eq!(first, "ready\n");

  // Let the shell exit so only the background sleep keeps the pipe open.
  thread::sleep(Duration::from_millis(500));
  let sent = Instant::now();
  kill(Pid::from_raw(child.id() as i32), Signal::SIGTERM).unwrap();

  let status = child.wait().unwrap();
  assert!(sent.elapsed() < Duration::from_secs(3));
  assert_eq!(status.code(), Some(128 + 15));
}

#[test]
fn test_job_stop_suspends_supervisor_too() {
  let mut child = Command::new(cargo::cargo_bin!("humanbench"))
    .args(["sh", "-c", "echo ready; sleep 1; echo done"])
    .stdout(Stdio::piped())
    .spawn()
    .unwrap();
  let pid = Pid::from_raw(child.id() as i32);

  let mut stdout = BufReader::new(child.stdout.take().unwrap());
  let mut first = String::new();
  stdout.read_line(&mut first).unwrap();
  assert_eq!(first, "ready\n");

  kill(pid, Signal::SIGTSTP).unwrap();
  let stopped = waitpid(pid, Some(WaitPidFlag::WUNTRACED)).unwrap();
  assert_eq!(stopped, WaitStatus::Stopped(pid, Signal::SIGSTOP));

  kill(pid, Signal::SIGCONT).unwrap();

  let mut rest = String::new();
  stdout.read_to_string(&mut rest).unwrap();
  let status = child.wait().unwrap();

  assert_eq!(rest, "done\n");
  assert!(status.success());
}
