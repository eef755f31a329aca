use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::normalize::{normalize_name, parse_kcal};
use crate::entities::meal::MealType;

/// A menu read from the upstream payload, before it is persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Menu {
    pub name: String,
    pub kcal: f64,
}

impl Menu {
    pub fn new(name: impl Into<String>, kcal: f64) -> Self {
        Self {
            name: name.into(),
            kcal,
        }
    }
}

/// Field names holding a menu's name and calories in one raw record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuColumns {
    pub name: &'static str,
    pub calorie: &'static str,
}

impl MenuColumns {
    pub const BREAKFAST: MenuColumns = MenuColumns::new("brst", "brst_cal");
    pub const LUNCH: MenuColumns = MenuColumns::new("lunc", "lunc_cal");
    pub const DINNER: MenuColumns = MenuColumns::new("dinr", "dinr_cal");

    pub const fn new(name: &'static str, calorie: &'static str) -> Self {
        Self { name, calorie }
    }

    pub const fn for_meal(meal_type: MealType) -> Self {
        match meal_type {
            MealType::Breakfast => Self::BREAKFAST,
            MealType::Lunch => Self::LUNCH,
            MealType::Dinner => Self::DINNER,
        }
    }

    /// Returns `None` when a column is missing, the name is blank after
    /// cleanup or the calories cannot be parsed. Those records are skipped.
    pub fn convert(&self, record: &HashMap<String, String>) -> Option<Menu> {
        let name = normalize_name(record.get(self.name)?);
        if name.is_empty() {
            return None;
        }

        let raw_kcal = record.get(self.calorie)?;
        match parse_kcal(raw_kcal) {
            Ok(kcal) => Some(Menu { name, kcal }),
            Err(e) => {
                tracing::debug!("Skipping menu {:?}: {}", name, e);
                None
            }
        }
    }
}
