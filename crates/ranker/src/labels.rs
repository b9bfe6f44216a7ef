//! Ordered class-label table

use serde::{Deserialize, Serialize};

use crate::RankError;

/// Ordered disease labels. Index `i` names output `i` of the model, so the
/// order is part of the deployment and never changes after construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct ClassLabelTable {
    labels: Vec<String>,
}

impl ClassLabelTable {
    /// Build a table, rejecting an empty table or blank labels
    pub fn new<I, S>(labels: I) -> Result<Self, RankError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let labels: Vec<String> = labels.into_iter().map(Into::into).collect();
        if labels.is_empty() {
            return Err(RankError::InvalidLabels("table is empty".into()));
        }
        if let Some(idx) = labels.iter().position(|l| l.trim().is_empty()) {
            return Err(RankError::InvalidLabels(format!("label {} is blank", idx)));
        }
        Ok(Self { labels })
    }

    /// Six tomato leaf classes of the deployed model
    pub fn plant_disease_default() -> Self {
        Self {
            labels: [
                "Early Blight",
                "Late Blight",
                "Leaf Mold",
                "Septoria Leaf Spot",
                "Bacterial Spot",
                "Healthy",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }
}

impl Default for ClassLabelTable {
    fn default() -> Self {
        Self::plant_disease_default()
    }
}

impl TryFrom<Vec<String>> for ClassLabelTable {
    type Error = RankError;

    fn try_from(labels: Vec<String>) -> Result<Self, Self::Error> {
        Self::new(labels)
    }
}

impl From<ClassLabelTable> for Vec<String> {
    fn from(table: ClassLabelTable) -> Self {
        table.labels
    }
}
