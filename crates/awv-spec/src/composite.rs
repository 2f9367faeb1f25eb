//! Typed views over structured answers (vital signs, clinical scores).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::rule::as_number;

/// Vital signs captured during the visit. All fields are optional.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct VitalSigns {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub systolic: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diastolic: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heart_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight_lb: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height_in: Option<f64>,
}

pub const VITAL_FIELDS: [&str; 5] = [
    "systolic",
    "diastolic",
    "heart_rate",
    "weight_lb",
    "height_in",
];

impl VitalSigns {
    /// Parse an answer object; `None` unless every present field is numeric.
    pub fn from_value(value: &Value) -> Option<Self> {
        let map = value.as_object()?;
        if map.keys().any(|key| !VITAL_FIELDS.contains(&key.as_str()) && key != "bmi") {
            return None;
        }
        let field = |name: &str| -> Result<Option<f64>, ()> {
            match map.get(name) {
                None | Some(Value::Null) => Ok(None),
                Some(value) => as_number(value).map(Some).ok_or(()),
            }
        };
        Some(Self {
            systolic: field("systolic").ok()?,
            diastolic: field("diastolic").ok()?,
            heart_rate: field("heart_rate").ok()?,
            weight_lb: field("weight_lb").ok()?,
            height_in: field("height_in").ok()?,
        })
    }

    /// Body mass index from pounds and inches.
    pub fn bmi(&self) -> Option<f64> {
        match (self.weight_lb, self.height_in) {
            (Some(weight), Some(height)) if height > 0.0 => {
                let bmi = 703.0 * weight / (height * height);
                Some((bmi * 10.0).round() / 10.0)
            }
            _ => None,
        }
    }

    pub fn blood_pressure(&self) -> Option<(f64, f64)> {
        Some((self.systolic?, self.diastolic?))
    }

    pub fn summary(&self) -> String {
        let mut parts = Vec::new();
        if let Some((systolic, diastolic)) = self.blood_pressure() {
            parts.push(format!("BP {}/{}", systolic, diastolic));
        }
        if let Some(rate) = self.heart_rate {
            parts.push(format!("HR {}", rate));
        }
        if let Some(weight) = self.weight_lb {
            parts.push(format!("Wt {} lb", weight));
        }
        if let Some(height) = self.height_in {
            parts.push(format!("Ht {} in", height));
        }
        if let Some(bmi) = self.bmi() {
            parts.push(format!("BMI {}", bmi));
        }
        parts.join(", ")
    }
}

/// Clinical score answer: a bare total or per-item scores.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScoreAnswer {
    pub items: BTreeMap<String, f64>,
    pub total: Option<f64>,
}

impl ScoreAnswer {
    pub fn from_value(value: &Value) -> Option<Self> {
        if let Some(total) = as_number(value) {
            return Some(Self {
                items: BTreeMap::new(),
                total: Some(total),
            });
        }
        let map = value.as_object()?;
        let mut items = BTreeMap::new();
        if let Some(raw_items) = map.get("items") {
            for (key, item) in raw_items.as_object()? {
                items.insert(key.clone(), as_number(item)?);
            }
        }
        let total = match map.get("total") {
            None | Some(Value::Null) => None,
            Some(value) => Some(as_number(value)?),
        };
        if items.is_empty() && total.is_none() {
            return None;
        }
        Some(Self { items, total })
    }

    /// Explicit total, or the sum of item scores.
    pub fn total(&self) -> f64 {
        self.total.unwrap_or_else(|| self.items.values().sum())
    }
}
