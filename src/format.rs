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
use crate::error::FormatError;
use crate::units::UnitFamily;
use crate::units::UnitScaler;
use crate::units::Unit;
use std::borrow::Cow;

/// Column layout for rebuilt benchmark lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
  /// Literal every benchmark name starts with.
  pub prefix: String,
  /// Decimals shown for scaled magnitudes.
  pub precision: usize,
  /// Right-justified width of the iteration count.
  pub count_width: usize,
  /// Right-justified width of time-per-operation columns.
  pub time_width: usize,
  /// Right-justified width of every other scaled column.
  pub metric_width: usize,
  /// Right-justified width of a rate's magnitude, before its unit.
  pub rate_width: usize,
}

impl Default for Layout {
  fn default() -> Self {
    Layout {
      prefix: "Benchmark".to_string(),
      precision: 2,
      count_width: 8,
      time_width: 18,
      metric_width: 16,
      rate_width: 7,
    }
  }
}

/// One `magnitude unit` pair of a benchmark line.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricPair<'a> {
  pub magnitude: f64,
  /// The magnitude exactly as the child printed it.
  pub text: &'a str,
  pub unit: &'a str,
}

/// A benchmark result line split into its fields.
#[derive(Debug, Clone, PartialEq)]
pub struct BenchmarkRecord<'a> {
  pub name: &'a str,
  pub iterations: &'a str,
  pub metrics: Vec<MetricPair<'a>>,
}

/// Rewrites benchmark result lines and leaves everything else alone.
#[derive(Debug, Clone)]
pub struct LineFormatter {
  layout: Layout,
  scaler: UnitScaler,
}

impl Default for LineFormatter {
  fn default() -> Self {
    LineFormatter::new(Layout::default())
  }
}

impl LineFormatter {
  pub fn new(layout: Layout) -> Self {
    let scaler = UnitScaler::new(layout.precision);
    LineFormatter { layout, scaler }
  }

  /// Splits `line` into a [`BenchmarkRecord`].
  ///
  /// Returns `Ok(None)` for lines that are not shaped like a benchmark result
  /// and `Err` for lines that are, but carry unusable metric fields.
  pub fn classify<'a>(&self, line: &'a str) -> Result<Option<BenchmarkRecord<'a>>, FormatError> {
    // The name must open the line; indented lines are never records.
    if !line.starts_with(self.layout.prefix.as_str()) {
      return Ok(None);
    }
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < 4 || !fields[0].starts_with(self.layout.prefix.as_str()) {
      return Ok(None);
    }

    let pairs = &fields[2..];
    if pairs.len() % 2 != 0 {
      return Err(FormatError::UnpairedFields {
        fields: pairs.len(),
      });
    }

    let metrics = pairs
      .chunks_exact(2)
      .map(|pair| {
        let text = pair[0];
        let magnitude = text
          .parse::<f64>()
          .map_err(|source| FormatError::ParseMagnitude {
            text: text.to_string(),
            source,
          })?;
        if !magnitude.is_finite() {
          return Err(FormatError::NonFiniteMagnitude {
            text: text.to_string(),
          });
        }
        Ok(MetricPair {
          magnitude,
          text,
          unit: pair[1],
        })
      })
      .collect::<Result<Vec<_>, _>>()?;

    Ok(Some(BenchmarkRecord {
      name: fields[0],
      iterations: fields[1],
      metrics,
    }))
  }

  /// Formats one line. Anything that is not a well-formed benchmark record
  /// comes back unchanged.
  pub fn format<'a>(&self, line: &'a str) -> Cow<'a, str> {
    match self.classify(line) {
      Ok(Some(record)) => Cow::Owned(self.render(line, &record)),
      Ok(None) => Cow::Borrowed(line),
      Err(e) => {
        tracing::debug!(error = %e, line, "Passing through malformed benchmark line");
        Cow::Borrowed(line)
      }
    }
  }

  fn render(&self, line: &str, record: &BenchmarkRecord<'_>) -> String {
    // Names line up with the child's own first tab stop.
    let name_width = line
      .find('\t')
      .map(|idx| line[..idx].chars().count())
      .unwrap_or(0);

    let layout = &self.layout;
    let mut out = String::with_capacity(line.len() + 32);
    out.push_str(&format!("{:<name_width$}\t", record.name));
    out.push_str(&format!("{:>width$}", record.iterations, width = layout.count_width));

    for metric in &record.metrics {
      out.push('\t');
      let unit = Unit::parse(metric.unit);
      match unit.family() {
        UnitFamily::Rate => {
          out.push_str(&format!("{:>width$}{}", metric.text, metric.unit, width = layout.rate_width));
        }
        UnitFamily::Time => {
          let scaled = self.scaler.scale(metric.magnitude, metric.unit).to_string();
          out.push_str(&format!("{:>width$}", scaled, width = layout.time_width));
        }
        UnitFamily::Other => {
          let scaled = self.scaler.scale(metric.magnitude, metric.unit).to_string();
          out.push_str(&format!("{:>width$}", scaled, width = layout.metric_width));
        }
      }
    }
    out
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_passthrough_non_benchmark_lines() {
    let formatter = LineFormatter::default();
    for line in [
      "PASS",
      "ok  \tpkg\t0.002s",
      "",
      "goos: linux",
      "--- FAIL: TestSomething (0.00s)",
      "  BenchmarkIndented 100 1 ns/op extra",
      "  BenchmarkIndented 100 1 ns/op",
      "\tBenchmarkTabbed-8\t 200\t 3000 ns/op\t 16 B/op",
    ] {
      let out = formatter.format(line);
      assert_eq!(out, line);
    }
  }

  #[test]
  fn test_indented_lines_are_not_records() {
    let formatter = LineFormatter::default();
    assert_eq!(formatter.classify("  BenchmarkIndented 100 1 ns/op"), Ok(None));
    assert_eq!(formatter.classify("\tBenchmarkIndented\t100\t1 ns/op\t2 B/op"), Ok(None));
    assert!(formatter.classify("BenchmarkFlush 100 1 ns/op").unwrap().is_some());
  }

  #[test]
  fn test_passthrough_short_benchmark_lines() {
    let formatter = LineFormatter::default();
    for line in [
      "BenchmarkFoo",
      "BenchmarkFoo-4",
      "BenchmarkFoo-4 \t--- FAIL",
      "BenchmarkFoo-4   100",
    ] {
      assert_eq!(formatter.format(line), line);
    }
  }

  #[test]
  fn test_passthrough_malformed_metrics() {
    let formatter = LineFormatter::default();
    let unparsable = "BenchmarkFoo-4  100  fast ns/op";
    assert_eq!(formatter.format(unparsable), unparsable);
    assert!(matches!(
      formatter.classify(unparsable),
      Err(FormatError::ParseMagnitude { .. })
    ));

    let odd = "BenchmarkFoo-4  100  12 ns/op  7";
    assert_eq!(formatter.format(odd), odd);
    assert_eq!(
      formatter.classify(odd),
      Err(FormatError::UnpairedFields { fields: 3 })
    );

    let nan = "BenchmarkFoo-4  100  NaN ns/op";
    assert_eq!(formatter.format(nan), nan);
  }

  #[test]
  fn test_index_rune_example() {
    let formatter = LineFormatter::default();
    let line = "BenchmarkIndexRune-4   50000000   23.2 ns/op   44.75 MB/s   0 B/op   0 allocs/op";

    let record = formatter.classify(line).unwrap().unwrap();
    assert_eq!(record.name, "BenchmarkIndexRune-4");
    assert_eq!(record.iterations, "50000000");
    assert_eq!(record.metrics.len(), 4);

    let want = format!(
      "BenchmarkIndexRune-4\t50000000\t{:>18}\t{:>7}MB/s\t{:>16}\t{:>16}",
      "23.20ns/op", "44.75", "0.00B/op", "0.00 allocs/op"
    );
    assert_eq!(formatter.format(line), want);
  }

  #[test]
  fn test_name_padded_to_first_tab() {
    let formatter = LineFormatter::default();
    let line = "BenchmarkNewDirectory-4          \t       5\t 319000000 ns/op\t227000000 B/op\t  513000 allocs/op";
    let out = formatter.format(line);

    assert_eq!(
      out,
      "BenchmarkNewDirectory-4          \t       5\t       319.00ms/op\t     227.00MB/op\t513.00k allocs/op"
    );
    assert_eq!(out.find('\t'), line.find('\t'));
  }

  #[test]
  fn test_metric_columns_keep_count_and_order() {
    let formatter = LineFormatter::default();
    let line = "BenchmarkMany 10 1 B/op 2000 ns/op 3 MB/s 4000 widgets/op 5 allocs/op";
    let out = formatter.format(line);

    let columns: Vec<&str> = out.split('\t').map(str::trim).collect();
    assert_eq!(
      columns,
      [
        "BenchmarkMany",
        "10",
        "1.00B/op",
        "2.00µs/op",
        "3MB/s",
        "4.00k widgets/op",
        "5.00 allocs/op",
      ]
    );
  }

  #[test]
  fn test_custom_layout() {
    let formatter = LineFormatter::new(Layout {
      prefix: "Bench_".to_string(),
      precision: 1,
      count_width: 4,
      time_width: 10,
      metric_width: 10,
      rate_width: 4,
    });

    assert_eq!(formatter.format("BenchmarkX 1 2 ns/op"), "BenchmarkX 1 2 ns/op");
    assert_eq!(
      formatter.format("Bench_x 12 1500 ns/op"),
      format!("Bench_x\t  12\t{:>10}", "1.5µs/op")
    );
  }
}
