mod common;

use axum::http::StatusCode;
use chrono::NaiveDate;
use common::{setup_db, FakeMnd, WEEK_FEED};
use menu_review_server::entities::{
    daily_meal, meal, meal::MealType, meal_menu, menu, DailyMeal, Meal, MealMenu, Menu,
};
use menu_review_server::ingest::{IngestError, IngestPipeline, Tally};
use menu_review_server::likes::LikeService;
use menu_review_server::mnd::{MndApi, MndError};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder};
use std::time::Duration;

async fn counts(db: &DatabaseConnection) -> (u64, u64, u64, u64) {
    (
        Menu::find().count(db).await.unwrap(),
        DailyMeal::find().count(db).await.unwrap(),
        Meal::find().count(db).await.unwrap(),
        MealMenu::find().count(db).await.unwrap(),
    )
}

async fn menu_named(db: &DatabaseConnection, name: &str) -> menu::Model {
    Menu::find()
        .filter(menu::Column::Name.eq(name))
        .one(db)
        .await
        .unwrap()
        .unwrap_or_else(|| panic!("menu {name} missing"))
}

async fn menu_names_of(
    db: &DatabaseConnection,
    date: NaiveDate,
    meal_type: MealType,
) -> Vec<(i32, String)> {
    let day = DailyMeal::find()
        .filter(daily_meal::Column::Date.eq(date))
        .one(db)
        .await
        .unwrap()
        .unwrap();
    let meal = Meal::find()
        .filter(meal::Column::DailyMealId.eq(day.id))
        .filter(meal::Column::MealType.eq(meal_type))
        .one(db)
        .await
        .unwrap()
        .unwrap();

    MealMenu::find()
        .filter(meal_menu::Column::MealId.eq(meal.id))
        .order_by_asc(meal_menu::Column::Position)
        .find_also_related(Menu)
        .all(db)
        .await
        .unwrap()
        .into_iter()
        .map(|(link, menu)| (link.position, menu.unwrap().name))
        .collect()
}

fn date(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2021, 7, d).unwrap()
}

#[tokio::test]
async fn ingest_persists_week_feed() {
    let db = setup_db().await;
    let mnd = FakeMnd::serving(WEEK_FEED).await;

    let report = IngestPipeline::new(mnd.api(), db.clone()).run().await.unwrap();

    assert_eq!(mnd.requests(), vec![1, 4]);
    assert_eq!(report.rows, 4);
    assert_eq!(report.menus, Tally { created: 6, existing: 0 });
    assert_eq!(report.daily_meals.created, 2);
    assert_eq!(report.meals.created, 5);
    assert_eq!(report.meal_menus.created, 8);
    assert_eq!(counts(&db).await, (6, 2, 5, 8));

    let soup = menu_named(&db, "된장국").await;
    assert_eq!(soup.kcal, 45.2);
    assert_eq!(soup.like_count, 0);
    assert_eq!(menu_named(&db, "불고기").await.kcal, 320.5);

    assert_eq!(
        menu_names_of(&db, date(5), MealType::Breakfast).await,
        vec![(0, "쌀밥".to_string()), (1, "된장국".to_string())]
    );
    assert_eq!(
        menu_names_of(&db, date(6), MealType::Breakfast).await,
        vec![(0, "쌀밥".to_string()), (1, "우유".to_string())]
    );
    assert_eq!(
        menu_names_of(&db, date(6), MealType::Dinner).await,
        vec![(0, "불고기".to_string())]
    );
}

#[tokio::test]
async fn count_request_reads_total_count() {
    let mnd = FakeMnd::serving(WEEK_FEED).await;

    assert_eq!(mnd.api().total_count().await.unwrap(), 4);
    assert_eq!(mnd.requests(), vec![1]);
}

#[tokio::test]
async fn rerunning_ingest_creates_nothing() {
    let db = setup_db().await;
    let mnd = FakeMnd::serving(WEEK_FEED).await;
    let pipeline = IngestPipeline::new(mnd.api(), db.clone());

    pipeline.run().await.unwrap();
    let before = counts(&db).await;
    let rice_id = menu_named(&db, "쌀밥").await.id;

    let report = pipeline.run().await.unwrap();

    assert_eq!(counts(&db).await, before);
    assert_eq!(menu_named(&db, "쌀밥").await.id, rice_id);
    assert_eq!(report.menus, Tally { created: 0, existing: 6 });
    assert_eq!(report.daily_meals, Tally { created: 0, existing: 2 });
    assert_eq!(report.meals, Tally { created: 0, existing: 5 });
    assert_eq!(report.meal_menus, Tally { created: 0, existing: 8 });
}

#[tokio::test]
async fn reingest_keeps_like_counts() {
    let db = setup_db().await;
    let member = common::create_member(&db, "soldier1").await;
    let mnd = FakeMnd::serving(WEEK_FEED).await;
    let pipeline = IngestPipeline::new(mnd.api(), db.clone());

    pipeline.run().await.unwrap();
    let rice = menu_named(&db, "쌀밥").await;
    LikeService::new(db.clone()).like(member.id, rice.id).await.unwrap();

    pipeline.run().await.unwrap();

    assert_eq!(menu_named(&db, "쌀밥").await.like_count, 1);
}

#[tokio::test]
async fn repeated_menu_in_one_meal_is_linked_once() {
    let feed = r#"{"svc": {"list_total_count": 2, "row": [
        {"dates": "2021-07-05", "brst": "쌀밥(1)", "brst_cal": "500kcal"},
        {"dates": "", "brst": "쌀밥", "brst_cal": "510kcal"}
    ]}}"#;
    let db = setup_db().await;
    let mnd = FakeMnd::serving(feed).await;

    let report = IngestPipeline::new(mnd.api(), db.clone()).run().await.unwrap();

    assert_eq!(counts(&db).await, (1, 1, 1, 1));
    assert_eq!(report.meal_menus, Tally { created: 1, existing: 1 });
    // First occurrence decides the calories.
    assert_eq!(menu_named(&db, "쌀밥").await.kcal, 500.0);
}

#[tokio::test]
async fn unparseable_menus_are_skipped() {
    let feed = r#"{"svc": {"list_total_count": 2, "row": [
        {"dates": "2021-07-05", "brst": "(5)(6)", "brst_cal": "10kcal", "lunc": "국수", "lunc_cal": "kcal"},
        {"dates": "", "dinr": "카레", "dinr_cal": "410kcal"}
    ]}}"#;
    let db = setup_db().await;
    let mnd = FakeMnd::serving(feed).await;

    IngestPipeline::new(mnd.api(), db.clone()).run().await.unwrap();

    assert_eq!(counts(&db).await, (1, 1, 1, 1));
    menu_named(&db, "카레").await;
}

#[tokio::test]
async fn single_row_feed_reuses_count_request() {
    let feed = r#"{"svc": {"list_total_count": 1, "row": [
        {"dates": "2021-07-05", "lunc": "짜장면", "lunc_cal": "650kcal"}
    ]}}"#;
    let db = setup_db().await;
    let mnd = FakeMnd::serving(feed).await;

    let report = IngestPipeline::new(mnd.api(), db.clone()).run().await.unwrap();

    assert_eq!(mnd.requests(), vec![1]);
    assert_eq!(report.rows, 1);
    assert_eq!(counts(&db).await, (1, 1, 1, 1));
}

#[tokio::test]
async fn empty_feed_writes_nothing() {
    let db = setup_db().await;
    let mnd = FakeMnd::serving(r#"{"svc": {"list_total_count": 0}}"#).await;

    let report = IngestPipeline::new(mnd.api(), db.clone()).run().await.unwrap();

    assert_eq!(report.rows, 0);
    assert_eq!(counts(&db).await, (0, 0, 0, 0));
}

#[tokio::test]
async fn missing_total_count_aborts_before_storage() {
    let db = setup_db().await;
    let mnd = FakeMnd::serving(r#"{"svc": {"row": []}}"#).await;

    let err = IngestPipeline::new(mnd.api(), db.clone()).run().await.unwrap_err();

    assert!(matches!(
        err,
        IngestError::Upstream(MndError::UpstreamFormat(_))
    ));
    assert_eq!(mnd.requests(), vec![1]);
    assert_eq!(counts(&db).await, (0, 0, 0, 0));
}

#[tokio::test]
async fn upstream_error_status_is_unavailable() {
    let db = setup_db().await;
    let mnd = FakeMnd::start(|_| (StatusCode::SERVICE_UNAVAILABLE, "down".to_string())).await;

    let err = IngestPipeline::new(mnd.api(), db.clone()).run().await.unwrap_err();

    match err {
        IngestError::Upstream(MndError::UpstreamUnavailable(e)) => {
            assert_eq!(e.status(), Some(StatusCode::SERVICE_UNAVAILABLE))
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(counts(&db).await, (0, 0, 0, 0));
}

#[tokio::test]
async fn failing_full_fetch_keeps_storage_untouched() {
    let db = setup_db().await;
    let count_only = r#"{"svc": {"list_total_count": 4}}"#.to_string();
    let mnd = FakeMnd::start(move |end| match end {
        1 => (StatusCode::OK, count_only.clone()),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, String::new()),
    })
    .await;

    let err = IngestPipeline::new(mnd.api(), db.clone()).run().await.unwrap_err();

    assert!(matches!(err, IngestError::Upstream(MndError::UpstreamUnavailable(_))));
    assert_eq!(mnd.requests(), vec![1, 4]);
    assert_eq!(counts(&db).await, (0, 0, 0, 0));
}

#[tokio::test]
async fn unreachable_upstream_is_unavailable() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let api = MndApi::new(format!("http://{}/svc", addr), Duration::from_secs(2)).unwrap();
    let err = api.total_count().await.unwrap_err();

    match err {
        MndError::UpstreamUnavailable(e) => assert_eq!(e.status(), None),
        other => panic!("unexpected error: {other}"),
    }
}
