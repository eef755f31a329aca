mod common;

use common::{create_member, setup_db};
use menu_review_server::entities::{daily_meal, meal, meal::MealType, Review};
use menu_review_server::page::{PageInfo, PageParams};
use menu_review_server::reviews::{self, ReviewError};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, PaginatorTrait, Set};

async fn create_meal(db: &DatabaseConnection) -> meal::Model {
    create_meal_on(db, 5).await
}

async fn create_meal_on(db: &DatabaseConnection, day_of_month: u32) -> meal::Model {
    let day = daily_meal::ActiveModel {
        date: Set(chrono::NaiveDate::from_ymd_opt(2021, 7, day_of_month).unwrap()),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap();

    meal::ActiveModel {
        daily_meal_id: Set(day.id),
        meal_type: Set(MealType::Lunch),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}

#[tokio::test]
async fn create_trims_and_lists_newest_first() {
    let db = setup_db().await;
    let member = create_member(&db, "soldier1").await;
    let lunch = create_meal(&db).await;

    let first = reviews::create(&db, member.id, lunch.id, "  짜다  ").await.unwrap();
    let second = reviews::create(&db, member.id, lunch.id, "맛있다").await.unwrap();
    assert_eq!(first.content, "짜다");

    let listed = reviews::list_for_meal(&db, lunch.id, &PageParams::default())
        .await
        .unwrap();
    let ids: Vec<i32> = listed.items.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![second.id, first.id]);
    assert_eq!(listed.page.total_elements, 2);
}

#[tokio::test]
async fn review_lists_are_paged() {
    let db = setup_db().await;
    let member = create_member(&db, "soldier1").await;
    let lunch = create_meal(&db).await;

    let mut created = Vec::new();
    for n in 0..5 {
        let review = reviews::create(&db, member.id, lunch.id, &format!("리뷰 {n}"))
            .await
            .unwrap();
        created.push(review.id);
    }
    created.reverse();

    let second = reviews::list_for_meal(&db, lunch.id, &PageParams::new(1, 2))
        .await
        .unwrap();
    let ids: Vec<i32> = second.items.iter().map(|r| r.id).collect();
    assert_eq!(ids, created[2..4].to_vec());
    assert_eq!(
        second.page,
        PageInfo {
            size: 2,
            total_elements: 5,
            total_pages: 3,
            number: 1,
        }
    );

    let past_end = reviews::list_for_meal(&db, lunch.id, &PageParams::new(7, 2))
        .await
        .unwrap();
    assert!(past_end.items.is_empty());
    assert_eq!(past_end.page.total_elements, 5);

    let oversized = reviews::list_for_meal(&db, lunch.id, &PageParams::new(0, 1000))
        .await
        .unwrap();
    assert_eq!(oversized.page.size, 100);
    assert_eq!(oversized.items.len(), 5);
}

#[tokio::test]
async fn review_is_found_only_through_its_meal() {
    let db = setup_db().await;
    let member = create_member(&db, "soldier1").await;
    let lunch = create_meal_on(&db, 5).await;
    let other_lunch = create_meal_on(&db, 6).await;
    let review = reviews::create(&db, member.id, lunch.id, "짜다").await.unwrap();

    let found = reviews::by_id(&db, lunch.id, review.id).await.unwrap();
    assert_eq!(found, review);

    let err = reviews::by_id(&db, other_lunch.id, review.id).await.unwrap_err();
    assert!(matches!(err, ReviewError::ReviewNotFound(id) if id == review.id));

    let err = reviews::by_id(&db, lunch.id, review.id + 100).await.unwrap_err();
    assert!(matches!(err, ReviewError::ReviewNotFound(_)));

    let err = reviews::by_id(&db, 99, review.id).await.unwrap_err();
    assert!(matches!(err, ReviewError::MealNotFound(99)));
}

#[tokio::test]
async fn blank_review_is_rejected() {
    let db = setup_db().await;
    let member = create_member(&db, "soldier1").await;
    let lunch = create_meal(&db).await;

    let err = reviews::create(&db, member.id, lunch.id, "   ").await.unwrap_err();

    assert!(matches!(err, ReviewError::EmptyContent));
    assert_eq!(Review::find().count(&db).await.unwrap(), 0);
}

#[tokio::test]
async fn review_on_unknown_meal_is_rejected() {
    let db = setup_db().await;
    let member = create_member(&db, "soldier1").await;

    let err = reviews::create(&db, member.id, 99, "맛있다").await.unwrap_err();
    assert!(matches!(err, ReviewError::MealNotFound(99)));

    let err = reviews::list_for_meal(&db, 99, &PageParams::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ReviewError::MealNotFound(99)));
}

#[tokio::test]
async fn only_author_can_edit_or_delete() {
    let db = setup_db().await;
    let author = create_member(&db, "soldier1").await;
    let other = create_member(&db, "soldier2").await;
    let lunch = create_meal(&db).await;
    let review = reviews::create(&db, author.id, lunch.id, "짜다").await.unwrap();

    let err = reviews::update(&db, other.id, review.id, "싱겁다").await.unwrap_err();
    assert!(matches!(err, ReviewError::NotOwner { .. }));
    let err = reviews::delete(&db, other.id, review.id).await.unwrap_err();
    assert!(matches!(err, ReviewError::NotOwner { .. }));

    let updated = reviews::update(&db, author.id, review.id, "싱겁다").await.unwrap();
    assert_eq!(updated.content, "싱겁다");
    assert!(updated.updated_at >= review.updated_at);

    reviews::delete(&db, author.id, review.id).await.unwrap();
    let err = reviews::delete(&db, author.id, review.id).await.unwrap_err();
    assert!(matches!(err, ReviewError::ReviewNotFound(_)));
}
