use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};

use crate::entities::{review, Meal, Review};
use crate::page::{self, Page, PageParams};

#[derive(Debug, thiserror::Error)]
pub enum ReviewError {
    #[error("review content must not be empty")]
    EmptyContent,
    #[error("meal {0} not found")]
    MealNotFound(i32),
    #[error("review {0} not found")]
    ReviewNotFound(i32),
    #[error("member {member_id} does not own review {review_id}")]
    NotOwner { member_id: i32, review_id: i32 },
    #[error(transparent)]
    Db(#[from] DbErr),
}

fn content_of(raw: &str) -> Result<String, ReviewError> {
    let content = raw.trim();
    if content.is_empty() {
        return Err(ReviewError::EmptyContent);
    }
    Ok(content.to_string())
}

pub async fn create(
    db: &DatabaseConnection,
    member_id: i32,
    meal_id: i32,
    content: &str,
) -> Result<review::Model, ReviewError> {
    let content = content_of(content)?;
    ensure_meal(db, meal_id).await?;

    let now = Utc::now().naive_utc();
    let review = review::ActiveModel {
        content: Set(content),
        meal_id: Set(meal_id),
        member_id: Set(member_id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    metrics::counter!("menu_review_reviews_total", "action" => "create").increment(1);
    Ok(review)
}

async fn ensure_meal(db: &DatabaseConnection, meal_id: i32) -> Result<(), ReviewError> {
    if Meal::find_by_id(meal_id).one(db).await?.is_none() {
        return Err(ReviewError::MealNotFound(meal_id));
    }
    Ok(())
}

/// Reviews of a meal, newest first.
pub async fn list_for_meal(
    db: &DatabaseConnection,
    meal_id: i32,
    params: &PageParams,
) -> Result<Page<review::Model>, ReviewError> {
    ensure_meal(db, meal_id).await?;
    let paginator = Review::find()
        .filter(review::Column::MealId.eq(meal_id))
        .order_by_desc(review::Column::CreatedAt)
        .order_by_desc(review::Column::Id)
        .paginate(db, params.page_size());
    Ok(page::fetch(paginator, params).await?)
}

/// A review looked up through its meal; a review of another meal is not found.
pub async fn by_id(
    db: &DatabaseConnection,
    meal_id: i32,
    review_id: i32,
) -> Result<review::Model, ReviewError> {
    ensure_meal(db, meal_id).await?;
    Review::find_by_id(review_id)
        .filter(review::Column::MealId.eq(meal_id))
        .one(db)
        .await?
        .ok_or(ReviewError::ReviewNotFound(review_id))
}

async fn owned(
    db: &DatabaseConnection,
    member_id: i32,
    review_id: i32,
) -> Result<review::Model, ReviewError> {
    let review = Review::find_by_id(review_id)
        .one(db)
        .await?
        .ok_or(ReviewError::ReviewNotFound(review_id))?;
    if review.member_id != member_id {
        return Err(ReviewError::NotOwner {
            member_id,
            review_id,
        });
    }
    Ok(review)
}

pub async fn update(
    db: &DatabaseConnection,
    member_id: i32,
    review_id: i32,
    content: &str,
) -> Result<review::Model, ReviewError> {
    let content = content_of(content)?;
    let mut active = owned(db, member_id, review_id).await?.into_active_model();
    active.content = Set(content);
    active.updated_at = Set(Utc::now().naive_utc());
    Ok(active.update(db).await?)
}

pub async fn delete(
    db: &DatabaseConnection,
    member_id: i32,
    review_id: i32,
) -> Result<(), ReviewError> {
    let review = owned(db, member_id, review_id).await?;
    Review::delete_by_id(review.id).exec(db).await?;
    metrics::counter!("menu_review_reviews_total", "action" => "delete").increment(1);
    Ok(())
}
