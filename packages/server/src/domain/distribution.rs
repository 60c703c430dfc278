//! Distribution of selected card values.
//!
//! A `Distribution` is rebuilt on every aggregation pass and never shared, so it
//! is a plain value type.

use std::collections::BTreeMap;

/// Upper bounds used for the Fibonacci range hint.
const FIBONACCI_SEQUENCE: [f64; 7] = [1.0, 2.0, 3.0, 5.0, 8.0, 13.0, 21.0];

/// Running count, sum and per-label multiplicity of card values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Distribution {
    count: u32,
    sum: f64,
    occurrences: BTreeMap<String, u32>,
}

impl Distribution {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one card label.
    ///
    /// A label that does not parse as a finite number counts as 0. Room
    /// configuration prevents such labels, but adding one must never fail.
    pub fn add(&mut self, label: &str) {
        let value = parse_card_value(label).unwrap_or(0.0);

        self.count += 1;
        self.sum += value;
        *self.occurrences.entry(label.to_string()).or_insert(0) += 1;
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn any(&self) -> bool {
        self.count > 0
    }

    pub fn average(&self) -> Option<f64> {
        if self.count == 0 {
            return None;
        }
        Some(self.sum / f64::from(self.count))
    }

    /// Average rounded to two decimals, without trailing zeros or point.
    ///
    /// Empty when nothing has been added.
    pub fn formatted_average(&self) -> String {
        self.average().map(format_trimmed).unwrap_or_default()
    }

    /// `"label(count)"` tokens sorted lexicographically and joined by a space.
    pub fn histogram(&self) -> String {
        let mut tokens: Vec<String> = self
            .occurrences
            .iter()
            .filter(|(_, count)| **count > 0)
            .map(|(label, count)| format!("{}({})", label, count))
            .collect();
        tokens.sort();
        tokens.join(" ")
    }

    /// Fibonacci bracket of the average, e.g. `"3 - 5"`.
    pub fn fibonacci_range(&self) -> Option<String> {
        self.average().map(fibonacci_range)
    }
}

/// Parse a card label as a finite real number.
pub fn parse_card_value(label: &str) -> Option<f64> {
    label
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

/// Format with two fractional digits, then strip trailing zeros and point.
pub fn format_trimmed(value: f64) -> String {
    let formatted = format!("{:.2}", value);
    formatted
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}

/// Bracket a value between two neighbouring Fibonacci numbers.
///
/// Values beyond the last number are reported as `"<value> < X"`.
pub fn fibonacci_range(value: f64) -> String {
    let mut lower = 0.0;
    let mut upper = FIBONACCI_SEQUENCE[0];
    for &next in &FIBONACCI_SEQUENCE[1..] {
        lower = upper;
        upper = next;
        if value < next {
            break;
        }
    }

    if value > upper {
        return format!("{} < X", format_trimmed(value));
    }
    format!("{} - {}", format_trimmed(lower), format_trimmed(upper))
}
