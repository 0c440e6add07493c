//! Binary classification diagnostics for the lead-scoring model.

use ndarray::Array2;
use novamart_core::Value;
use serde::Serialize;

/// Interpret a cell as a binary label. Numbers are positive when non-zero;
/// `true`/`yes` text is positive, `false`/`no` negative.
pub fn as_label(value: &Value) -> Option<bool> {
    match value {
        Value::Number(n) if !n.is_nan() => Some(*n != 0.0),
        Value::Text(s) => match s.to_ascii_lowercase().as_str() {
            "true" | "yes" => Some(true),
            "false" | "no" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Threshold scores into predicted labels (`score >= threshold`).
pub fn predict(scores: &[f64], threshold: f64) -> Vec<bool> {
    scores.iter().map(|&s| s >= threshold).collect()
}

/// 2×2 counts, rows = actual, columns = predicted:
/// `[[tn, fp], [fn, tp]]`.
pub fn confusion_matrix(actual: &[bool], predicted: &[bool]) -> Array2<u64> {
    let mut cm = Array2::<u64>::zeros((2, 2));
    for (&a, &p) in actual.iter().zip(predicted) {
        cm[[usize::from(a), usize::from(p)]] += 1;
    }
    cm
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ClassificationMetrics {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

fn ratio(num: f64, den: f64) -> f64 {
    if den > 0.0 {
        num / den
    } else {
        0.0
    }
}

impl ClassificationMetrics {
    /// Metrics from a confusion matrix laid out as in [`confusion_matrix`].
    /// Any ratio with a zero denominator is 0.
    pub fn from_matrix(cm: &Array2<u64>) -> Self {
        let tn = cm[[0, 0]] as f64;
        let fp = cm[[0, 1]] as f64;
        let fn_ = cm[[1, 0]] as f64;
        let tp = cm[[1, 1]] as f64;

        let precision = ratio(tp, tp + fp);
        let recall = ratio(tp, tp + fn_);
        Self {
            accuracy: ratio(tp + tn, tp + tn + fp + fn_),
            precision,
            recall,
            f1: ratio(2.0 * precision * recall, precision + recall),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RocPoint {
    pub fpr: f64,
    pub tpr: f64,
    /// `f64::INFINITY` for the origin point.
    pub threshold: f64,
}

/// ROC curve over every distinct score, thresholds decreasing.
///
/// The first point is (0, 0) at threshold +∞ and the last is (1, 1).
/// Empty when either class is absent from `actual`.
pub fn roc_curve(actual: &[bool], scores: &[f64]) -> Vec<RocPoint> {
    let mut pairs: Vec<(f64, bool)> = scores
        .iter()
        .copied()
        .zip(actual.iter().copied())
        .filter(|(s, _)| !s.is_nan())
        .collect();
    let positives = pairs.iter().filter(|(_, a)| *a).count() as f64;
    let negatives = pairs.len() as f64 - positives;
    if positives == 0.0 || negatives == 0.0 {
        return Vec::new();
    }
    pairs.sort_by(|a, b| b.0.total_cmp(&a.0));

    let mut points = vec![RocPoint {
        fpr: 0.0,
        tpr: 0.0,
        threshold: f64::INFINITY,
    }];
    let (mut tp, mut fp) = (0.0, 0.0);
    let mut i = 0;
    while i < pairs.len() {
        let threshold = pairs[i].0;
        // consume all ties at this threshold
        while i < pairs.len() && pairs[i].0 == threshold {
            if pairs[i].1 {
                tp += 1.0;
            } else {
                fp += 1.0;
            }
            i += 1;
        }
        points.push(RocPoint {
            fpr: fp / negatives,
            tpr: tp / positives,
            threshold,
        });
    }
    points
}

/// Trapezoidal area under the curve.
pub fn auc(points: &[RocPoint]) -> f64 {
    points
        .windows(2)
        .map(|w| (w[1].fpr - w[0].fpr) * (w[1].tpr + w[0].tpr) / 2.0)
        .sum()
}

/// J values closer than this are ties. Rates are ratios of counts, so a true
/// tie can differ in the last bit (2/3 − 0 vs 1 − 1/3).
const J_TOLERANCE: f64 = 1e-9;

/// Point maximising Youden's J (TPR − FPR); first one wins on ties.
pub fn optimal_threshold(points: &[RocPoint]) -> Option<RocPoint> {
    let youden = |p: &RocPoint| p.tpr - p.fpr;
    points.iter().copied().fold(None, |best, p| match best {
        Some(b) if youden(&p) - youden(&b) <= J_TOLERANCE => Some(b),
        _ => Some(p),
    })
}
