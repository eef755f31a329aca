//! Read side: meals with their menus and the caller's like state.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder};
use serde::Serialize;

use crate::entities::{
    daily_meal, meal, meal::MealType, meal_menu, menu, DailyMeal, Meal, MealMenu, Menu,
};
use crate::likes::LikeService;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MenuView {
    pub id: i32,
    pub name: String,
    pub kcal: f64,
    pub like_count: i32,
    pub liked: bool,
}

impl MenuView {
    pub fn new(menu: menu::Model, liked: bool) -> Self {
        Self {
            id: menu.id,
            name: menu.name,
            kcal: menu.kcal,
            like_count: menu.like_count,
            liked,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MealView {
    pub id: i32,
    pub date: NaiveDate,
    pub meal_type: MealType,
    pub menus: Vec<MenuView>,
}

/// Menus among `menu_ids` liked by the member. Anonymous callers like nothing.
pub(crate) async fn liked_by(
    db: &DatabaseConnection,
    member_id: Option<i32>,
    menu_ids: impl IntoIterator<Item = i32>,
) -> Result<HashSet<i32>, DbErr> {
    match member_id {
        Some(member_id) => {
            LikeService::new(db.clone())
                .liked_menu_ids(member_id, menu_ids)
                .await
        }
        None => Ok(HashSet::new()),
    }
}

/// Meals served between `start` and `end` (inclusive), by date then serving.
pub async fn meals_between(
    db: &DatabaseConnection,
    member_id: Option<i32>,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<MealView>, DbErr> {
    let days = DailyMeal::find()
        .filter(daily_meal::Column::Date.between(start, end))
        .all(db)
        .await?;
    let dates: HashMap<i32, NaiveDate> = days.into_iter().map(|d| (d.id, d.date)).collect();
    if dates.is_empty() {
        return Ok(Vec::new());
    }

    let meals = Meal::find()
        .filter(meal::Column::DailyMealId.is_in(dates.keys().copied()))
        .all(db)
        .await?;

    let mut views = assemble(db, member_id, meals, &dates).await?;
    views.sort_by_key(|v| (v.date, v.meal_type));
    Ok(views)
}

pub async fn meal_by_id(
    db: &DatabaseConnection,
    member_id: Option<i32>,
    meal_id: i32,
) -> Result<Option<MealView>, DbErr> {
    let Some((meal, Some(day))) = Meal::find_by_id(meal_id)
        .find_also_related(DailyMeal)
        .one(db)
        .await?
    else {
        return Ok(None);
    };

    let dates = HashMap::from([(day.id, day.date)]);
    Ok(assemble(db, member_id, vec![meal], &dates).await?.pop())
}

async fn assemble(
    db: &DatabaseConnection,
    member_id: Option<i32>,
    meals: Vec<meal::Model>,
    dates: &HashMap<i32, NaiveDate>,
) -> Result<Vec<MealView>, DbErr> {
    let links = MealMenu::find()
        .filter(meal_menu::Column::MealId.is_in(meals.iter().map(|m| m.id)))
        .order_by_asc(meal_menu::Column::Position)
        .find_also_related(Menu)
        .all(db)
        .await?;

    let liked = liked_by(db, member_id, links.iter().map(|(link, _)| link.menu_id)).await?;

    let mut menus_by_meal: HashMap<i32, Vec<MenuView>> = HashMap::new();
    for (link, menu) in links {
        let Some(menu) = menu else { continue };
        let is_liked = liked.contains(&menu.id);
        menus_by_meal
            .entry(link.meal_id)
            .or_default()
            .push(MenuView::new(menu, is_liked));
    }

    Ok(meals
        .into_iter()
        .filter_map(|meal| {
            Some(MealView {
                date: *dates.get(&meal.daily_meal_id)?,
                menus: menus_by_meal.remove(&meal.id).unwrap_or_default(),
                id: meal.id,
                meal_type: meal.meal_type,
            })
        })
        .collect())
}
