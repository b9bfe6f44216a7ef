//! Top-1 / top-k ranking

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::{ClassLabelTable, RankError};

/// One entry of the ranked list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedPrediction {
    #[serde(rename = "disease")]
    pub label: String,
    pub confidence: f32,
}

/// Ranked classification of one image.
///
/// Serializes as `{predicted_disease, confidence, all_predictions}`, the
/// payload handed to external callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    #[serde(rename = "predicted_disease")]
    predicted_label: String,
    confidence: f32,
    #[serde(rename = "all_predictions")]
    ranked_list: Vec<RankedPrediction>,
}

impl PredictionResult {
    pub fn predicted_label(&self) -> &str {
        &self.predicted_label
    }

    /// Probability of the top-1 class
    pub fn confidence(&self) -> f32 {
        self.confidence
    }

    /// Top-k entries, highest confidence first
    pub fn ranked_list(&self) -> &[RankedPrediction] {
        &self.ranked_list
    }
}

/// Rank `probabilities` against `labels`, keeping the `k` best.
///
/// Exact ties go to the lower class index, both for the top-1 pick and at
/// the top-k cut. The top-1 entry is always the head of the ranked list.
/// Non-finite or negative probabilities are rejected.
pub fn rank(probabilities: &[f32], labels: &ClassLabelTable, k: usize) -> Result<PredictionResult, RankError> {
    if probabilities.len() != labels.len() {
        return Err(RankError::LabelMismatch {
            labels: labels.len(),
            probabilities: probabilities.len(),
        });
    }
    if k == 0 || k > labels.len() {
        return Err(RankError::InvalidTopK {
            k,
            classes: labels.len(),
        });
    }

    if let Some((index, &value)) = probabilities
        .iter()
        .enumerate()
        .find(|(_, p)| !p.is_finite() || **p < 0.0)
    {
        return Err(RankError::InvalidProbability { index, value });
    }

    // Finite values compare totally, and -0.0 ties with 0.0
    let mut order: Vec<usize> = (0..probabilities.len()).collect();
    order.sort_by(|&a, &b| {
        probabilities[b]
            .partial_cmp(&probabilities[a])
            .unwrap_or(Ordering::Equal)
            .then(a.cmp(&b))
    });

    let entry = |idx: usize| -> Result<RankedPrediction, RankError> {
        let label = labels.get(idx).ok_or(RankError::LabelMismatch {
            labels: labels.len(),
            probabilities: probabilities.len(),
        })?;
        Ok(RankedPrediction {
            label: label.to_string(),
            confidence: probabilities[idx],
        })
    };

    let ranked_list = order
        .into_iter()
        .take(k)
        .map(entry)
        .collect::<Result<Vec<RankedPrediction>, _>>()?;
    let top = ranked_list[0].clone();

    Ok(PredictionResult {
        predicted_label: top.label,
        confidence: top.confidence,
        ranked_list,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn six_labels() -> ClassLabelTable {
        ClassLabelTable::plant_disease_default()
    }

    #[test]
    fn test_rank_top3() {
        let probs = [0.1, 0.05, 0.05, 0.6, 0.1, 0.1];
        let result = rank(&probs, &six_labels(), 3).unwrap();

        assert_eq!(result.predicted_label(), "Septoria Leaf Spot");
        assert_eq!(result.confidence(), 0.6);

        let ranked: Vec<(&str, f32)> = result
            .ranked_list()
            .iter()
            .map(|p| (p.label.as_str(), p.confidence))
            .collect();
        assert_eq!(
            ranked,
            vec![("Septoria Leaf Spot", 0.6), ("Early Blight", 0.1), ("Bacterial Spot", 0.1)]
        );
    }

    #[test]
    fn test_top1_tie_picks_lowest_index() {
        let labels = ClassLabelTable::new(["a", "b", "c", "d"]).unwrap();
        let result = rank(&[0.1, 0.4, 0.1, 0.4], &labels, 2).unwrap();
        assert_eq!(result.predicted_label(), "b");
        assert_eq!(result.ranked_list()[0].label, "b");
        assert_eq!(result.ranked_list()[1].label, "d");
    }

    #[test]
    fn test_all_equal_keeps_table_order() {
        let labels = ClassLabelTable::new(["a", "b", "c", "d"]).unwrap();
        let result = rank(&[0.25; 4], &labels, 4).unwrap();
        assert_eq!(result.predicted_label(), "a");
        let order: Vec<&str> = result.ranked_list().iter().map(|p| p.label.as_str()).collect();
        assert_eq!(order, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_k_equal_to_classes() {
        let probs = [0.1, 0.05, 0.05, 0.6, 0.1, 0.1];
        let result = rank(&probs, &six_labels(), 6).unwrap();
        assert_eq!(result.ranked_list().len(), 6);
        assert_eq!(result.ranked_list()[5].confidence, 0.05);
        assert_eq!(result.ranked_list()[5].label, "Leaf Mold");
    }

    #[test]
    fn test_k_larger_than_classes_rejected() {
        let probs = [0.1, 0.05, 0.05, 0.6, 0.1, 0.1];
        assert_eq!(
            rank(&probs, &six_labels(), 7),
            Err(RankError::InvalidTopK { k: 7, classes: 6 })
        );
        assert_eq!(
            rank(&probs, &six_labels(), 0),
            Err(RankError::InvalidTopK { k: 0, classes: 6 })
        );
    }

    #[test]
    fn test_label_mismatch_not_truncated() {
        let result = rank(&[0.5, 0.5], &six_labels(), 1);
        assert_eq!(
            result,
            Err(RankError::LabelMismatch {
                labels: 6,
                probabilities: 2
            })
        );

        let too_many = [0.1; 7];
        assert!(matches!(
            rank(&too_many, &six_labels(), 3),
            Err(RankError::LabelMismatch { .. })
        ));
    }

    #[test]
    fn test_signed_zero_ties_keep_top1_consistent() {
        let labels = ClassLabelTable::new(["a", "b"]).unwrap();
        let result = rank(&[-0.0, 0.0], &labels, 2).unwrap();
        assert_eq!(result.predicted_label(), "a");
        assert_eq!(result.ranked_list()[0].label, result.predicted_label());
        assert_eq!(result.ranked_list()[1].label, "b");
    }

    #[test]
    fn test_rejects_non_finite_and_negative() {
        let labels = ClassLabelTable::new(["a", "b"]).unwrap();
        assert!(matches!(
            rank(&[f32::NAN, 0.5], &labels, 1),
            Err(RankError::InvalidProbability { index: 0, .. })
        ));
        assert!(matches!(
            rank(&[0.5, f32::INFINITY], &labels, 1),
            Err(RankError::InvalidProbability { index: 1, .. })
        ));
        assert_eq!(
            rank(&[0.6, -0.1], &labels, 1),
            Err(RankError::InvalidProbability { index: 1, value: -0.1 })
        );
    }

    #[test]
    fn test_payload_field_names() {
        let labels = ClassLabelTable::new(["Healthy", "Leaf Mold"]).unwrap();
        let result = rank(&[0.25, 0.75], &labels, 1).unwrap();
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["predicted_disease"], "Leaf Mold");
        assert_eq!(json["confidence"].as_f64(), Some(0.75));
        assert_eq!(json["all_predictions"][0]["disease"], "Leaf Mold");
        assert_eq!(json["all_predictions"][0]["confidence"].as_f64(), Some(0.75));
        assert_eq!(json["all_predictions"].as_array().unwrap().len(), 1);
    }

    fn normalized(raw: Vec<f32>) -> Vec<f32> {
        let sum: f32 = raw.iter().sum();
        raw.into_iter().map(|v| v / sum).collect()
    }

    proptest! {
        #[test]
        fn prop_top1_is_argmax(raw in prop::collection::vec(0.001f32..1.0, 6)) {
            let probs = normalized(raw);
            let labels = six_labels();
            let result = rank(&probs, &labels, 3).unwrap();

            let max = probs.iter().cloned().fold(f32::MIN, f32::max);
            let argmax = probs.iter().position(|&p| p == max).unwrap();
            prop_assert_eq!(result.predicted_label(), labels.get(argmax).unwrap());
            prop_assert_eq!(result.confidence(), max);
        }

        #[test]
        fn prop_ranked_list_sorted(raw in prop::collection::vec(0.0f32..1.0, 1..20), k_seed in 0usize..100) {
            let labels = ClassLabelTable::new((0..raw.len()).map(|i| format!("class-{}", i))).unwrap();
            let k = k_seed % raw.len() + 1;
            let result = rank(&raw, &labels, k).unwrap();

            prop_assert_eq!(result.ranked_list().len(), k);
            prop_assert_eq!(&result.ranked_list()[0].label, result.predicted_label());
            for pair in result.ranked_list().windows(2) {
                prop_assert!(pair[0].confidence >= pair[1].confidence);
            }
        }
    }
}
