//! Fuzzy truth values and their aggregation.
//!
//! Every unification, guard, and step produces a [`FuzzyValue`]: a payload plus
//! a confidence in `[0, 1]`. A [`Defuzzify`] strategy collapses one into a crisp
//! boolean, which is what plan selection and body execution branch on.
//! [`Conjunction`] and [`Disjunction`] fold several results together.

use serde::{Deserialize, Serialize};

/// A value with a confidence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FuzzyValue<T> {
    value: T,
    confidence: f64,
}

impl<T> FuzzyValue<T> {
    /// Confidence is clamped to `[0, 1]`; NaN becomes `0`.
    pub fn new(value: T, confidence: f64) -> Self {
        let confidence = if confidence.is_nan() {
            0.0
        } else {
            confidence.clamp(0.0, 1.0)
        };
        Self { value, confidence }
    }

    /// Full confidence.
    pub fn certain(value: T) -> Self {
        Self::new(value, 1.0)
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn into_value(self) -> T {
        self.value
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> FuzzyValue<U> {
        FuzzyValue {
            value: f(self.value),
            confidence: self.confidence,
        }
    }
}

impl FuzzyValue<bool> {
    pub fn truth() -> Self {
        Self::certain(true)
    }

    pub fn falsity() -> Self {
        Self::certain(false)
    }

    /// Negated payload, same confidence.
    pub fn complement(self) -> Self {
        Self::new(!self.value, self.confidence)
    }
}

impl From<bool> for FuzzyValue<bool> {
    fn from(value: bool) -> Self {
        Self::certain(value)
    }
}

impl<T: std::fmt::Display> std::fmt::Display for FuzzyValue<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({:.2})", self.value, self.confidence)
    }
}

/// Strategy collapsing a fuzzy boolean to a crisp one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case", tag = "kind", content = "threshold")]
pub enum Defuzzify {
    /// The payload as-is.
    #[default]
    Crisp,
    /// The payload, and only when confidence reaches the threshold.
    Threshold(f64),
}

impl Defuzzify {
    pub fn defuzzify(&self, value: &FuzzyValue<bool>) -> bool {
        match self {
            Defuzzify::Crisp => value.value,
            Defuzzify::Threshold(t) => value.value && value.confidence >= *t,
        }
    }
}

/// Fuzzy AND: all values must defuzzify to true; confidence is the minimum.
#[derive(Debug, Clone)]
pub struct Conjunction {
    defuzzify: Defuzzify,
}

impl Conjunction {
    pub fn new(defuzzify: Defuzzify) -> Self {
        Self { defuzzify }
    }

    /// Evaluate lazily, stopping at the first value that defuzzifies to false.
    /// Returns the result and the number of values evaluated.
    pub fn sequential<I>(&self, values: I) -> (FuzzyValue<bool>, usize)
    where
        I: IntoIterator<Item = FuzzyValue<bool>>,
    {
        let mut confidence: f64 = 1.0;
        let mut evaluated = 0;
        for value in values {
            evaluated += 1;
            confidence = confidence.min(value.confidence);
            if !self.defuzzify.defuzzify(&value) {
                return (FuzzyValue::new(false, value.confidence), evaluated);
            }
        }
        (FuzzyValue::new(true, confidence), evaluated)
    }

    /// Combine values that were all already evaluated.
    pub fn combine(&self, values: &[FuzzyValue<bool>]) -> FuzzyValue<bool> {
        let confidence = values.iter().map(|v| v.confidence).fold(1.0, f64::min);
        let all = values.iter().all(|v| self.defuzzify.defuzzify(v));
        FuzzyValue::new(all, confidence)
    }
}

impl Default for Conjunction {
    fn default() -> Self {
        Self::new(Defuzzify::Crisp)
    }
}

/// Fuzzy OR: any value defuzzifying to true; confidence is the maximum.
#[derive(Debug, Clone)]
pub struct Disjunction {
    defuzzify: Defuzzify,
}

impl Disjunction {
    pub fn new(defuzzify: Defuzzify) -> Self {
        Self { defuzzify }
    }

    /// Stops at the first value that defuzzifies to true.
    pub fn sequential<I>(&self, values: I) -> (FuzzyValue<bool>, usize)
    where
        I: IntoIterator<Item = FuzzyValue<bool>>,
    {
        let mut confidence: f64 = 0.0;
        let mut evaluated = 0;
        for value in values {
            evaluated += 1;
            confidence = confidence.max(value.confidence);
            if self.defuzzify.defuzzify(&value) {
                return (FuzzyValue::new(true, value.confidence), evaluated);
            }
        }
        (FuzzyValue::new(false, if evaluated == 0 { 1.0 } else { confidence }), evaluated)
    }

    pub fn combine(&self, values: &[FuzzyValue<bool>]) -> FuzzyValue<bool> {
        if values.is_empty() {
            return FuzzyValue::falsity();
        }
        let confidence = values.iter().map(|v| v.confidence).fold(0.0, f64::max);
        let any = values.iter().any(|v| self.defuzzify.defuzzify(v));
        FuzzyValue::new(any, confidence)
    }
}

impl Default for Disjunction {
    fn default() -> Self {
        Self::new(Defuzzify::Crisp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confidence_is_clamped() {
        assert_eq!(FuzzyValue::new(true, 1.5).confidence(), 1.0);
        assert_eq!(FuzzyValue::new(true, -0.2).confidence(), 0.0);
        assert_eq!(FuzzyValue::new(true, f64::NAN).confidence(), 0.0);
    }

    #[test]
    fn threshold_defuzzification() {
        let weak = FuzzyValue::new(true, 0.4);
        assert!(Defuzzify::Crisp.defuzzify(&weak));
        assert!(!Defuzzify::Threshold(0.5).defuzzify(&weak));
        assert!(Defuzzify::Threshold(0.3).defuzzify(&weak));
    }

    #[test]
    fn empty_conjunction_is_true() {
        let (result, evaluated) = Conjunction::default().sequential(Vec::new());
        assert!(*result.value());
        assert_eq!(evaluated, 0);
        assert!(*Conjunction::default().combine(&[]).value());
    }

    #[test]
    fn sequential_conjunction_short_circuits() {
        let values = vec![
            FuzzyValue::truth(),
            FuzzyValue::falsity(),
            FuzzyValue::truth(),
        ];
        let mut seen = 0;
        let (result, evaluated) = Conjunction::default().sequential(values.iter().map(|v| {
            seen += 1;
            *v
        }));
        assert!(!*result.value());
        assert_eq!(evaluated, 2);
        assert_eq!(seen, 2);

        let combined = Conjunction::default().combine(&values);
        assert!(!*combined.value());
    }

    #[test]
    fn conjunction_takes_minimum_confidence() {
        let values = [FuzzyValue::new(true, 0.9), FuzzyValue::new(true, 0.6)];
        let combined = Conjunction::default().combine(&values);
        assert!(*combined.value());
        assert!((combined.confidence() - 0.6).abs() < f64::EPSILON);
    }

    #[test]
    fn disjunction_takes_maximum_confidence() {
        let values = [FuzzyValue::new(false, 0.2), FuzzyValue::new(true, 0.7)];
        let combined = Disjunction::default().combine(&values);
        assert!(*combined.value());
        assert!((combined.confidence() - 0.7).abs() < f64::EPSILON);
        assert!(!*Disjunction::default().combine(&[]).value());
    }

    #[test]
    fn complement_keeps_confidence() {
        let v = FuzzyValue::new(true, 0.3).complement();
        assert!(!*v.value());
        assert!((v.confidence() - 0.3).abs() < f64::EPSILON);
    }
}
