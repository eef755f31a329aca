use sea_orm::{DatabaseConnection, EntityTrait, PaginatorTrait};

use crate::entities::{Like, Member, Menu, Review};

pub async fn init_metrics(db: &DatabaseConnection) {
    let menu_count = Menu::find().count(db).await.unwrap_or(0);
    metrics::gauge!("menu_review_menus_total").set(menu_count as f64);

    let member_count = Member::find().count(db).await.unwrap_or(0);
    metrics::gauge!("menu_review_members_total").set(member_count as f64);

    let like_count = Like::find().count(db).await.unwrap_or(0);
    metrics::gauge!("menu_review_likes_current").set(like_count as f64);

    let review_count = Review::find().count(db).await.unwrap_or(0);
    metrics::gauge!("menu_review_reviews_current").set(review_count as f64);

    tracing::info!(
        "Initialized metrics: Menus={}, Members={}, Likes={}, Reviews={}",
        menu_count,
        member_count,
        like_count,
        review_count
    );
}
