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

//! Scaling of raw benchmark magnitudes into SI-prefixed, human-sized values.
//!
//! A unit label such as `ns/op` is read as a prefix (`n`), a base symbol (`s`)
//! and a per-suffix (`/op`). The magnitude is then moved along the prefix
//! ladder until it lands in `[1, 1000)`, so `23200 ns/op` becomes `23.20µs/op`.
use std::fmt;

/// The SI prefix ladder, smallest first. Neighbouring tiers are 1000x apart.
const LADDER: [&str; 9] = ["p", "n", "µ", "m", "", "k", "M", "G", "T"];

/// Index of the unprefixed tier in [`LADDER`].
const BASE_TIER: usize = 4;

/// Base symbols that take SI prefixes directly (`ns`, `MB`).
const SYMBOLS: [&str; 2] = ["s", "B"];

/// What a unit label measures, as far as layout is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitFamily {
  /// Time per operation, e.g. `ns/op`.
  Time,
  /// Anything per second, e.g. `MB/s`. Reported values are kept as-is.
  Rate,
  /// Everything else: bytes, allocations, custom counters.
  Other,
}

/// A unit label broken into its parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unit {
  tier: usize,
  base: String,
  per: String,
  counted: bool,
}

impl Unit {
  /// Parses a unit label. Never fails: unknown heads become counted quantities.
  pub fn parse(label: &str) -> Self {
    let (head, per) = match label.find('/') {
      Some(idx) => (&label[..idx], &label[idx..]),
      None => (label, ""),
    };

    for symbol in SYMBOLS {
      if let Some(prefix) = head.strip_suffix(symbol) {
        if let Some(tier) = prefix_tier(prefix) {
          return Unit {
            tier,
            base: symbol.to_string(),
            per: per.to_string(),
            counted: false,
          };
        }
      }
    }

    Unit {
      tier: BASE_TIER,
      base: head.to_string(),
      per: per.to_string(),
      counted: true,
    }
  }

  /// The layout family of this unit.
  pub fn family(&self) -> UnitFamily {
    if self.per == "/s" {
      UnitFamily::Rate
    } else if !self.counted && self.base == "s" {
      UnitFamily::Time
    } else {
      UnitFamily::Other
    }
  }

  fn render(&self, tier: usize) -> String {
    let prefix = LADDER[tier];
    // Counted units read "1.50k allocs/op": the space goes after the prefix.
    if self.counted && !self.base.is_empty() {
      format!("{prefix} {}{}", self.base, self.per)
    } else {
      format!("{prefix}{}{}", self.base, self.per)
    }
  }
}

fn prefix_tier(prefix: &str) -> Option<usize> {
  let canonical = match prefix {
    "u" | "\u{3bc}" => "µ",
    "K" => "k",
    other => other,
  };
  LADDER.iter().position(|symbol| *symbol == canonical)
}

/// A magnitude moved onto the prefix tier that keeps it in `[1, 1000)`.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaledMetric {
  value: f64,
  tier: usize,
  unit: Unit,
  precision: usize,
}

impl ScaledMetric {
  /// The rescaled numeric value.
  pub fn value(&self) -> f64 {
    self.value
  }

  /// The SI prefix the value is expressed in, `""` for none.
  pub fn prefix(&self) -> &'static str {
    LADDER[self.tier]
  }
}

impl fmt::Display for ScaledMetric {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let unit = self.unit.render(self.tier);
    write!(f, "{:.*}{unit}", self.precision, self.value)
  }
}

/// Rescales magnitudes with a fixed number of decimals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitScaler {
  precision: usize,
}

impl Default for UnitScaler {
  fn default() -> Self {
    UnitScaler { precision: 2 }
  }
}

impl UnitScaler {
  pub fn new(precision: usize) -> Self {
    UnitScaler { precision }
  }

  /// Scales `magnitude`, given in `label` units, to the best-fitting prefix.
  ///
  /// Zero and non-finite magnitudes keep the label's own prefix.
  pub fn scale(&self, magnitude: f64, label: &str) -> ScaledMetric {
    let unit = Unit::parse(label);
    let mut tier = unit.tier;
    let mut value = magnitude;

    if value != 0.0 && value.is_finite() {
      while value.abs() >= 1000.0 && tier + 1 < LADDER.len() {
        value /= 1000.0;
        tier += 1;
      }
      while value.abs() < 1.0 && tier > 0 {
        value *= 1000.0;
        tier -= 1;
      }
      if self.rounded(value.abs()) >= 1000.0 && tier + 1 < LADDER.len() {
        value /= 1000.0;
        tier += 1;
      }
    }

    ScaledMetric {
      value,
      tier,
      unit,
      precision: self.precision,
    }
  }

  fn rounded(&self, value: f64) -> f64 {
    let factor = 10f64.powi(self.precision as i32);
    (value * factor).round() / factor
  }
}

/// Scales with the default precision and renders straight to text.
pub fn scale(magnitude: f64, label: &str) -> String {
  UnitScaler::default().scale(magnitude, label).to_string()
}
