use std::collections::{BTreeSet, HashMap};

use chrono::NaiveDate;
use serde::Serialize;

use crate::entities::{daily_meal, meal, meal::MealType, menu};
use crate::mnd::{Menu, MndRow};

/// Natural key of a meal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MealKey {
    pub date: NaiveDate,
    pub meal_type: MealType,
}

/// A converted menu together with the meal it was served at.
#[derive(Debug, Clone, PartialEq)]
pub struct MealEntry {
    pub date: NaiveDate,
    pub meal_type: MealType,
    pub menu: Menu,
}

impl MealEntry {
    pub fn key(&self) -> MealKey {
        MealKey {
            date: self.date,
            meal_type: self.meal_type,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Tally {
    pub created: u64,
    pub existing: u64,
}

impl Tally {
    pub fn record(&mut self, created: bool) {
        if created {
            self.created += 1;
        } else {
            self.existing += 1;
        }
    }
}

/// What one pipeline run touched.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub rows: u64,
    pub menus: Tally,
    pub daily_meals: Tally,
    pub meals: Tally,
    pub meal_menus: Tally,
}

/// State handed from one stage to the next. Lives for a single run only.
#[derive(Debug, Default)]
pub struct IngestContext {
    pub rows: Vec<MndRow>,
    pub entries: Vec<MealEntry>,
    pub menus: HashMap<String, menu::Model>,
    pub daily_meals: HashMap<NaiveDate, daily_meal::Model>,
    pub meals: HashMap<MealKey, meal::Model>,
    pub report: IngestReport,
}

impl IngestContext {
    pub fn dates(&self) -> BTreeSet<NaiveDate> {
        self.rows.iter().map(|row| row.date).collect()
    }

    /// Distinct meal keys in first-seen order.
    pub fn meal_keys(&self) -> Vec<MealKey> {
        let mut seen = BTreeSet::new();
        self.entries
            .iter()
            .map(MealEntry::key)
            .filter(|key| seen.insert(*key))
            .collect()
    }
}
