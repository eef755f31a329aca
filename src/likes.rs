use std::collections::HashSet;

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, Set, SqlErr, TransactionTrait,
};

use crate::entities::{like, menu, Like, Menu};

#[derive(Debug, thiserror::Error)]
pub enum LikeError {
    #[error("member {member_id} already likes menu {menu_id}")]
    AlreadyLiked { member_id: i32, menu_id: i32 },
    #[error("member {member_id} does not like menu {menu_id}")]
    NotLiked { member_id: i32, menu_id: i32 },
    #[error("menu {0} not found")]
    MenuNotFound(i32),
    #[error(transparent)]
    Db(#[from] DbErr),
}

impl LikeError {
    /// Maps a failed like insert, turning a unique index violation on
    /// (member_id, menu_id) into `AlreadyLiked`.
    pub fn from_insert(err: DbErr, member_id: i32, menu_id: i32) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                LikeError::AlreadyLiked { member_id, menu_id }
            }
            _ => LikeError::Db(err),
        }
    }
}

/// Likes and unlikes menus, keeping `menus.like_count` equal to the number
/// of like rows. Counter and row are always written in one transaction.
#[derive(Clone)]
pub struct LikeService {
    db: DatabaseConnection,
}

impl LikeService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn like(&self, member_id: i32, menu_id: i32) -> Result<like::Model, LikeError> {
        let txn = self.db.begin().await?;

        if Menu::find_by_id(menu_id).one(&txn).await?.is_none() {
            return Err(LikeError::MenuNotFound(menu_id));
        }
        if find_like(&txn, member_id, menu_id).await?.is_some() {
            return Err(LikeError::AlreadyLiked { member_id, menu_id });
        }

        // A concurrent like can still slip past the check above; the unique
        // index on (member_id, menu_id) rejects it.
        let like = like::ActiveModel {
            member_id: Set(member_id),
            menu_id: Set(menu_id),
            created_at: Set(Utc::now().naive_utc()),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| LikeError::from_insert(e, member_id, menu_id))?;

        Menu::update_many()
            .col_expr(
                menu::Column::LikeCount,
                Expr::col(menu::Column::LikeCount).add(1),
            )
            .filter(menu::Column::Id.eq(menu_id))
            .exec(&txn)
            .await?;

        txn.commit().await?;

        tracing::info!("Member {} liked menu {}", member_id, menu_id);
        metrics::counter!("menu_review_likes_total", "action" => "like").increment(1);
        Ok(like)
    }

    /// Removes the like and returns the menu with its updated counter.
    pub async fn cancel(&self, member_id: i32, menu_id: i32) -> Result<menu::Model, LikeError> {
        let txn = self.db.begin().await?;

        let existing = find_like(&txn, member_id, menu_id)
            .await?
            .ok_or(LikeError::NotLiked { member_id, menu_id })?;

        Like::delete_by_id(existing.id).exec(&txn).await?;

        Menu::update_many()
            .col_expr(
                menu::Column::LikeCount,
                Expr::col(menu::Column::LikeCount).sub(1),
            )
            .filter(menu::Column::Id.eq(menu_id))
            .filter(menu::Column::LikeCount.gt(0))
            .exec(&txn)
            .await?;

        let menu = Menu::find_by_id(menu_id)
            .one(&txn)
            .await?
            .ok_or(LikeError::MenuNotFound(menu_id))?;

        txn.commit().await?;

        tracing::info!("Member {} cancelled like on menu {}", member_id, menu_id);
        metrics::counter!("menu_review_likes_total", "action" => "cancel").increment(1);
        Ok(menu)
    }

    /// Which of `menu_ids` the member currently likes.
    pub async fn liked_menu_ids(
        &self,
        member_id: i32,
        menu_ids: impl IntoIterator<Item = i32>,
    ) -> Result<HashSet<i32>, DbErr> {
        let menu_ids: Vec<i32> = menu_ids.into_iter().collect();
        if menu_ids.is_empty() {
            return Ok(HashSet::new());
        }

        let likes = Like::find()
            .filter(like::Column::MemberId.eq(member_id))
            .filter(like::Column::MenuId.is_in(menu_ids))
            .all(&self.db)
            .await?;
        Ok(likes.into_iter().map(|l| l.menu_id).collect())
    }
}

async fn find_like<C: ConnectionTrait>(
    conn: &C,
    member_id: i32,
    menu_id: i32,
) -> Result<Option<like::Model>, DbErr> {
    Like::find()
        .filter(like::Column::MemberId.eq(member_id))
        .filter(like::Column::MenuId.eq(menu_id))
        .one(conn)
        .await
}
