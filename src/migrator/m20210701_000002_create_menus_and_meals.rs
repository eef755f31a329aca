use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Menus: name is the natural key used by ingestion
        manager
            .create_table(
                Table::create()
                    .table(Menus::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Menus::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Menus::Name)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Menus::Kcal).double().not_null())
                    .col(
                        ColumnDef::new(Menus::LikeCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(DailyMeals::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DailyMeals::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(DailyMeals::Date)
                            .date()
                            .not_null()
                            .unique_key(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Meals::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Meals::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Meals::DailyMealId).integer().not_null())
                    .col(ColumnDef::new(Meals::MealType).string_len(16).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_meals_daily_meal")
                            .from(Meals::Table, Meals::DailyMealId)
                            .to(DailyMeals::Table, DailyMeals::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_meals_daily_meal_type")
                    .table(Meals::Table)
                    .col(Meals::DailyMealId)
                    .col(Meals::MealType)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(MealMenus::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MealMenus::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(MealMenus::MealId).integer().not_null())
                    .col(ColumnDef::new(MealMenus::MenuId).integer().not_null())
                    .col(ColumnDef::new(MealMenus::Position).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_meal_menus_meal")
                            .from(MealMenus::Table, MealMenus::MealId)
                            .to(Meals::Table, Meals::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_meal_menus_menu")
                            .from(MealMenus::Table, MealMenus::MenuId)
                            .to(Menus::Table, Menus::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_meal_menus_meal_menu")
                    .table(MealMenus::Table)
                    .col(MealMenus::MealId)
                    .col(MealMenus::MenuId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(MealMenus::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Meals::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(DailyMeals::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Menus::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Menus {
    Table,
    Id,
    Name,
    Kcal,
    LikeCount,
}

#[derive(DeriveIden)]
enum DailyMeals {
    Table,
    Id,
    Date,
}

#[derive(DeriveIden)]
enum Meals {
    Table,
    Id,
    DailyMealId,
    MealType,
}

#[derive(DeriveIden)]
enum MealMenus {
    Table,
    Id,
    MealId,
    MenuId,
    Position,
}
