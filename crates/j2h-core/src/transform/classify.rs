//! Rule-based categorical labeling.
//!
//! Evaluates an ordered, first-match-wins list of threshold predicates
//! against a numeric column and writes the winning label into an output
//! column. Comparisons are numeric by default; a lexical mode reproduces
//! the legacy string-ordering behavior for byte parity with the original
//! transformed output.

use crate::dataset::{Dataset, FieldDescriptor, FieldType, Schema, Value};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// How rule thresholds are compared against the field value.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Comparison {
    /// Floating-point comparison (default)
    #[default]
    Numeric,
    /// Legacy string-ordering comparison on the rendered value
    Lexical,
}

/// A threshold predicate over the classified field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Predicate {
    /// Exact match
    Equals(f64),
    /// Half-open band: `min <= value < max`
    Band { min: f64, max: f64 },
}

impl Predicate {
    fn matches_number(&self, value: f64) -> bool {
        match *self {
            Predicate::Equals(threshold) => value == threshold,
            Predicate::Band { min, max } => value >= min && value < max,
        }
    }

    /// Legacy mode: compare the rendered value against rendered thresholds
    /// with string ordering.
    fn matches_lexical(&self, value: &str) -> bool {
        match *self {
            Predicate::Equals(threshold) => value == render_threshold(threshold),
            Predicate::Band { min, max } => {
                value >= render_threshold(min).as_str() && value < render_threshold(max).as_str()
            }
        }
    }

    /// Whether every value matched by `self` is also matched by `other`.
    fn contained_in(&self, other: &Predicate) -> bool {
        match (*self, *other) {
            (Predicate::Equals(a), Predicate::Equals(b)) => a == b,
            (Predicate::Equals(a), Predicate::Band { min, max }) => a >= min && a < max,
            (Predicate::Band { min: a, max: b }, Predicate::Band { min: c, max: d }) => {
                c <= a && b <= d
            }
            (Predicate::Band { .. }, Predicate::Equals(_)) => false,
        }
    }
}

fn render_threshold(threshold: f64) -> String {
    if threshold.fract() == 0.0 {
        format!("{:.1}", threshold)
    } else {
        threshold.to_string()
    }
}

/// One ordered rule: predicate plus the label it produces.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    /// Threshold predicate
    pub predicate: Predicate,
    /// Label written on match
    pub label: String,
}

impl Rule {
    /// Create a rule.
    pub fn new(predicate: Predicate, label: impl Into<String>) -> Self {
        Self {
            predicate,
            label: label.into(),
        }
    }
}

/// An ordered, first-match-wins decision list with a default label.
///
/// Construction validates the list: an empty band is unmatchable, and a
/// rule wholly covered by an earlier rule can never fire; both fail.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleSet {
    rules: Vec<Rule>,
    default_label: String,
}

impl RuleSet {
    /// Build and validate a rule set.
    pub fn new(rules: Vec<Rule>, default_label: impl Into<String>) -> Result<Self> {
        for (idx, rule) in rules.iter().enumerate() {
            if let Predicate::Band { min, max } = rule.predicate {
                if min >= max {
                    return Err(Error::Rule(format!(
                        "band [{}, {}) for label {:?} is empty",
                        min, max, rule.label
                    )));
                }
            }
            for earlier in &rules[..idx] {
                if rule.predicate.contained_in(&earlier.predicate) {
                    return Err(Error::Rule(format!(
                        "rule for label {:?} can never match: shadowed by earlier rule for {:?}",
                        rule.label, earlier.label
                    )));
                }
            }
        }
        Ok(Self {
            rules,
            default_label: default_label.into(),
        })
    }

    /// The canonical star-rating rule set.
    pub fn star_rules() -> Self {
        // Validated by construction; the literals cannot shadow each other
        Self::new(
            vec![
                Rule::new(Predicate::Equals(5.0), "very recommend"),
                Rule::new(Predicate::Band { min: 4.0, max: 5.0 }, "recommend"),
                Rule::new(Predicate::Band { min: 3.0, max: 4.0 }, "average"),
            ],
            "not recommend",
        )
        .expect("canonical star rules are valid")
    }

    /// Label for a value under the given comparison mode.
    ///
    /// Null, missing, and non-numeric values take the default label in
    /// numeric mode; lexical mode labels whatever string ordering says.
    pub fn label_for(&self, value: Option<&Value>, comparison: Comparison) -> &str {
        match comparison {
            Comparison::Numeric => {
                let Some(number) = value.and_then(Value::as_number) else {
                    return &self.default_label;
                };
                self.rules
                    .iter()
                    .find(|rule| rule.predicate.matches_number(number))
                    .map(|rule| rule.label.as_str())
                    .unwrap_or(&self.default_label)
            }
            Comparison::Lexical => {
                let rendered = match value {
                    Some(Value::Str(s)) => s.clone(),
                    Some(Value::Number(n)) => Value::Number(*n).render(""),
                    _ => return &self.default_label,
                };
                self.rules
                    .iter()
                    .find(|rule| rule.predicate.matches_lexical(&rendered))
                    .map(|rule| rule.label.as_str())
                    .unwrap_or(&self.default_label)
            }
        }
    }
}

/// Classifier binding a rule set to input and output column names.
#[derive(Debug, Clone)]
pub struct CategoryClassifier {
    /// Column the rules read
    pub field: String,
    /// Column the label is written to
    pub output: String,
    /// Ordered decision list
    pub rules: RuleSet,
    /// Comparison mode
    pub comparison: Comparison,
}

impl CategoryClassifier {
    /// Classifier with the canonical star rules.
    pub fn stars(field: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            output: output.into(),
            rules: RuleSet::star_rules(),
            comparison: Comparison::Numeric,
        }
    }

    /// Switch the comparison mode.
    pub fn with_comparison(mut self, comparison: Comparison) -> Self {
        self.comparison = comparison;
        self
    }

    /// Apply the classifier, adding (or overwriting) the output column.
    pub fn apply(&self, dataset: &Dataset) -> Result<Dataset> {
        let mut fields: Vec<FieldDescriptor> = dataset
            .schema
            .fields()
            .iter()
            .filter(|f| f.name != self.output)
            .cloned()
            .collect();
        fields.push(FieldDescriptor::new(self.output.clone(), FieldType::String));
        let schema = Schema::new(fields)?;

        let records = dataset
            .records
            .iter()
            .map(|record| {
                let label = self.rules.label_for(record.get(&self.field), self.comparison);
                let mut out = record.clone();
                out.insert(self.output.clone(), Value::Str(label.to_string()));
                out
            })
            .collect();

        debug!(
            field = %self.field,
            output = %self.output,
            comparison = ?self.comparison,
            rows = dataset.row_count(),
            "Labels derived"
        );

        Ok(Dataset::new(schema, records))
    }
}
