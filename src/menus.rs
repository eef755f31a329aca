//! Read side for menus on their own, outside of any meal.

use sea_orm::{DatabaseConnection, DbErr, EntityTrait, Order, PaginatorTrait, QueryOrder};

use crate::entities::{menu, Menu};
use crate::meals::{liked_by, MenuView};
use crate::page::{self, Page, PageParams};

#[derive(Debug, thiserror::Error)]
pub enum MenuError {
    #[error("menu {0} not found")]
    NotFound(i32),
    #[error("cannot sort menus by {0:?}")]
    InvalidSort(String),
    #[error(transparent)]
    Db(#[from] DbErr),
}

/// Parses `field[,ASC|DESC]`. Without a sort, menus come in id order.
fn sort_of(raw: Option<&str>) -> Result<(menu::Column, Order), MenuError> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok((menu::Column::Id, Order::Asc));
    };
    let invalid = || MenuError::InvalidSort(raw.to_string());

    let (field, direction) = match raw.split_once(',') {
        Some((field, direction)) => (field.trim(), direction.trim()),
        None => (raw, "ASC"),
    };
    let column = match field {
        "id" => menu::Column::Id,
        "name" => menu::Column::Name,
        "kcal" => menu::Column::Kcal,
        "like" | "like_count" => menu::Column::LikeCount,
        _ => return Err(invalid()),
    };
    let order = match direction.to_ascii_uppercase().as_str() {
        "ASC" => Order::Asc,
        "DESC" => Order::Desc,
        _ => return Err(invalid()),
    };
    Ok((column, order))
}

pub async fn list(
    db: &DatabaseConnection,
    member_id: Option<i32>,
    params: &PageParams,
) -> Result<Page<MenuView>, MenuError> {
    let (column, order) = sort_of(params.sort.as_deref())?;

    // Id breaks ties so pages never overlap.
    let paginator = Menu::find()
        .order_by(column, order)
        .order_by_asc(menu::Column::Id)
        .paginate(db, params.page_size());
    let page = page::fetch(paginator, params).await?;

    let liked = liked_by(db, member_id, page.items.iter().map(|m| m.id)).await?;
    Ok(page.map(|menu| {
        let is_liked = liked.contains(&menu.id);
        MenuView::new(menu, is_liked)
    }))
}

pub async fn by_id(
    db: &DatabaseConnection,
    member_id: Option<i32>,
    menu_id: i32,
) -> Result<MenuView, MenuError> {
    let menu = Menu::find_by_id(menu_id)
        .one(db)
        .await?
        .ok_or(MenuError::NotFound(menu_id))?;
    let liked = liked_by(db, member_id, [menu.id]).await?;
    Ok(MenuView::new(menu, !liked.is_empty()))
}
