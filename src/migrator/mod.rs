use sea_orm_migration::prelude::*;

mod m20210701_000001_create_members;
mod m20210701_000002_create_menus_and_meals;
mod m20210701_000003_create_likes_and_reviews;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20210701_000001_create_members::Migration),
            Box::new(m20210701_000002_create_menus_and_meals::Migration),
            Box::new(m20210701_000003_create_likes_and_reviews::Migration),
        ]
    }
}
