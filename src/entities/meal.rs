use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Which daily serving a meal is.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter, DeriveActiveEnum,
    Deserialize, Serialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "UPPERCASE")]
pub enum MealType {
    #[sea_orm(string_value = "BREAKFAST")]
    Breakfast,
    #[sea_orm(string_value = "LUNCH")]
    Lunch,
    #[sea_orm(string_value = "DINNER")]
    Dinner,
}

impl MealType {
    /// Serving order within a day.
    pub const ALL: [MealType; 3] = [MealType::Breakfast, MealType::Lunch, MealType::Dinner];
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Deserialize, Serialize)]
#[sea_orm(table_name = "meals")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub daily_meal_id: i32,
    pub meal_type: MealType,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::daily_meal::Entity",
        from = "Column::DailyMealId",
        to = "super::daily_meal::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    DailyMeal,
    #[sea_orm(has_many = "super::meal_menu::Entity")]
    MealMenu,
    #[sea_orm(has_many = "super::review::Entity")]
    Review,
}

impl Related<super::daily_meal::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DailyMeal.def()
    }
}

impl Related<super::meal_menu::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MealMenu.def()
    }
}

impl Related<super::review::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Review.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
