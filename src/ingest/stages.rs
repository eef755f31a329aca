use std::collections::{HashMap, HashSet};
use std::fmt;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};

use super::context::{IngestContext, MealEntry, MealKey};
use super::IngestError;
use crate::entities::{daily_meal, meal, meal::MealType, meal_menu, menu, DailyMeal, Meal, MealMenu, Menu};
use crate::mnd::{MenuColumns, MndApi, MndRowsParser};

// Keeps `IN (...)` lists under every backend's bind parameter limit.
const LOOKUP_CHUNK: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Fetch,
    PersistMenus,
    PersistDailyMeals,
    CacheDailyMeals,
    PersistMeals,
    PersistMealMenus,
}

impl Stage {
    pub const ALL: [Stage; 6] = [
        Stage::Fetch,
        Stage::PersistMenus,
        Stage::PersistDailyMeals,
        Stage::CacheDailyMeals,
        Stage::PersistMeals,
        Stage::PersistMealMenus,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Fetch => "fetch",
            Stage::PersistMenus => "persist_menus",
            Stage::PersistDailyMeals => "persist_daily_meals",
            Stage::CacheDailyMeals => "cache_daily_meals",
            Stage::PersistMeals => "persist_meals",
            Stage::PersistMealMenus => "persist_meal_menus",
        }
    }

    pub async fn run(
        self,
        ctx: IngestContext,
        api: &MndApi,
        db: &DatabaseConnection,
    ) -> Result<IngestContext, IngestError> {
        match self {
            Stage::Fetch => fetch(ctx, api).await,
            Stage::PersistMenus => persist_menus(ctx, db).await,
            Stage::PersistDailyMeals => persist_daily_meals(ctx, db).await,
            Stage::CacheDailyMeals => cache_daily_meals(ctx, db).await,
            Stage::PersistMeals => persist_meals(ctx, db).await,
            Stage::PersistMealMenus => persist_meal_menus(ctx, db).await,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn storage(stage: Stage) -> impl Fn(DbErr) -> IngestError {
    move |source| IngestError::Storage { stage, source }
}

async fn fetch(mut ctx: IngestContext, api: &MndApi) -> Result<IngestContext, IngestError> {
    ctx.rows = api.parse(&MndRowsParser).await?;
    ctx.report.rows = ctx.rows.len() as u64;
    tracing::info!("Fetched {} rows from MND API", ctx.rows.len());
    Ok(ctx)
}

/// Converts every row and finds or creates one menu per distinct name.
/// The first occurrence of a name decides its calories.
async fn persist_menus(
    mut ctx: IngestContext,
    db: &DatabaseConnection,
) -> Result<IngestContext, IngestError> {
    let err = storage(Stage::PersistMenus);

    ctx.entries = ctx
        .rows
        .iter()
        .flat_map(|row| {
            MealType::ALL.into_iter().filter_map(move |meal_type| {
                MenuColumns::for_meal(meal_type)
                    .convert(&row.record)
                    .map(|menu| MealEntry {
                        date: row.date,
                        meal_type,
                        menu,
                    })
            })
        })
        .collect();

    let mut seen = HashSet::new();
    let distinct: Vec<&MealEntry> = ctx
        .entries
        .iter()
        .filter(|entry| seen.insert(entry.menu.name.as_str()))
        .collect();

    let txn = db.begin().await.map_err(&err)?;

    let names: Vec<String> = distinct.iter().map(|e| e.menu.name.clone()).collect();
    let mut existing: HashMap<String, menu::Model> = HashMap::new();
    for chunk in names.chunks(LOOKUP_CHUNK) {
        let found = Menu::find()
            .filter(menu::Column::Name.is_in(chunk.iter().cloned()))
            .all(&txn)
            .await
            .map_err(&err)?;
        existing.extend(found.into_iter().map(|m| (m.name.clone(), m)));
    }

    let mut menus = HashMap::with_capacity(distinct.len());
    for entry in distinct {
        let model = match existing.remove(&entry.menu.name) {
            Some(model) => {
                ctx.report.menus.record(false);
                model
            }
            None => {
                let model = menu::ActiveModel {
                    name: Set(entry.menu.name.clone()),
                    kcal: Set(entry.menu.kcal),
                    like_count: Set(0),
                    ..Default::default()
                }
                .insert(&txn)
                .await
                .map_err(&err)?;
                ctx.report.menus.record(true);
                model
            }
        };
        menus.insert(model.name.clone(), model);
    }

    txn.commit().await.map_err(&err)?;

    tracing::info!(
        "Menus: {} created, {} already present",
        ctx.report.menus.created,
        ctx.report.menus.existing
    );
    ctx.menus = menus;
    Ok(ctx)
}

async fn persist_daily_meals(
    mut ctx: IngestContext,
    db: &DatabaseConnection,
) -> Result<IngestContext, IngestError> {
    let err = storage(Stage::PersistDailyMeals);
    let txn = db.begin().await.map_err(&err)?;

    for date in ctx.dates() {
        let found = DailyMeal::find()
            .filter(daily_meal::Column::Date.eq(date))
            .one(&txn)
            .await
            .map_err(&err)?;

        if found.is_none() {
            daily_meal::ActiveModel {
                date: Set(date),
                ..Default::default()
            }
            .insert(&txn)
            .await
            .map_err(&err)?;
        }
        ctx.report.daily_meals.record(found.is_none());
    }

    txn.commit().await.map_err(&err)?;
    Ok(ctx)
}

/// Loads every daily meal of the run with one range query so later stages
/// resolve dates without going back to storage.
async fn cache_daily_meals(
    mut ctx: IngestContext,
    db: &DatabaseConnection,
) -> Result<IngestContext, IngestError> {
    let dates = ctx.dates();
    let (Some(first), Some(last)) = (dates.first().copied(), dates.last().copied()) else {
        return Ok(ctx);
    };

    let cached = DailyMeal::find()
        .filter(daily_meal::Column::Date.between(first, last))
        .all(db)
        .await
        .map_err(storage(Stage::CacheDailyMeals))?;
    ctx.daily_meals = cached.into_iter().map(|d| (d.date, d)).collect();

    if let Some(missing) = dates.iter().find(|d| !ctx.daily_meals.contains_key(*d)) {
        return Err(IngestError::MissingDailyMeal(*missing));
    }
    Ok(ctx)
}

async fn persist_meals(
    mut ctx: IngestContext,
    db: &DatabaseConnection,
) -> Result<IngestContext, IngestError> {
    let err = storage(Stage::PersistMeals);
    let keys = ctx.meal_keys();

    let mut daily_ids = Vec::with_capacity(ctx.daily_meals.len());
    for key in &keys {
        let daily = ctx
            .daily_meals
            .get(&key.date)
            .ok_or(IngestError::MissingDailyMeal(key.date))?;
        daily_ids.push(daily.id);
    }
    daily_ids.sort_unstable();
    daily_ids.dedup();

    let txn = db.begin().await.map_err(&err)?;

    let mut existing: HashMap<(i32, MealType), meal::Model> = HashMap::new();
    for chunk in daily_ids.chunks(LOOKUP_CHUNK) {
        let found = Meal::find()
            .filter(meal::Column::DailyMealId.is_in(chunk.iter().copied()))
            .all(&txn)
            .await
            .map_err(&err)?;
        existing.extend(found.into_iter().map(|m| ((m.daily_meal_id, m.meal_type), m)));
    }

    for key in keys {
        let daily_meal_id = ctx.daily_meals[&key.date].id;
        let model = match existing.remove(&(daily_meal_id, key.meal_type)) {
            Some(model) => {
                ctx.report.meals.record(false);
                model
            }
            None => {
                let model = meal::ActiveModel {
                    daily_meal_id: Set(daily_meal_id),
                    meal_type: Set(key.meal_type),
                    ..Default::default()
                }
                .insert(&txn)
                .await
                .map_err(&err)?;
                ctx.report.meals.record(true);
                model
            }
        };
        ctx.meals.insert(key, model);
    }

    txn.commit().await.map_err(&err)?;
    Ok(ctx)
}

/// Links every entry's menu to its meal. `position` follows the order the
/// menus appeared in the feed for that meal.
async fn persist_meal_menus(
    mut ctx: IngestContext,
    db: &DatabaseConnection,
) -> Result<IngestContext, IngestError> {
    let err = storage(Stage::PersistMealMenus);

    let meal_ids: Vec<i32> = ctx.meals.values().map(|m| m.id).collect();
    let txn = db.begin().await.map_err(&err)?;

    let mut linked: HashSet<(i32, i32)> = HashSet::new();
    for chunk in meal_ids.chunks(LOOKUP_CHUNK) {
        let found = MealMenu::find()
            .filter(meal_menu::Column::MealId.is_in(chunk.iter().copied()))
            .all(&txn)
            .await
            .map_err(&err)?;
        linked.extend(found.into_iter().map(|mm| (mm.meal_id, mm.menu_id)));
    }

    let mut positions: HashMap<MealKey, i32> = HashMap::new();
    for entry in &ctx.entries {
        let key = entry.key();
        let meal = ctx.meals.get(&key).ok_or(IngestError::MissingMeal(key))?;
        let menu = ctx
            .menus
            .get(&entry.menu.name)
            .ok_or_else(|| IngestError::MissingMenu(entry.menu.name.clone()))?;

        let position = positions.entry(key).or_insert(0);
        let current = *position;
        *position += 1;

        if !linked.insert((meal.id, menu.id)) {
            ctx.report.meal_menus.record(false);
            continue;
        }

        meal_menu::ActiveModel {
            meal_id: Set(meal.id),
            menu_id: Set(menu.id),
            position: Set(current),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(&err)?;
        ctx.report.meal_menus.record(true);
    }

    txn.commit().await.map_err(&err)?;
    Ok(ctx)
}
