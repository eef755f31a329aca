use sea_orm::{ConnectionTrait, DbErr, Paginator, SelectorTrait};
use serde::{Deserialize, Serialize};

pub const MAX_PAGE_SIZE: u64 = 100;

/// `?page=&size=&sort=` query. Pages are numbered from 0.
#[derive(Debug, Clone, Deserialize)]
pub struct PageParams {
    #[serde(default)]
    pub page: u64,
    #[serde(default = "default_size")]
    pub size: u64,
    pub sort: Option<String>,
}

fn default_size() -> u64 {
    20
}

impl Default for PageParams {
    fn default() -> Self {
        Self {
            page: 0,
            size: default_size(),
            sort: None,
        }
    }
}

impl PageParams {
    pub fn new(page: u64, size: u64) -> Self {
        Self {
            page,
            size,
            sort: None,
        }
    }

    pub fn sorted(mut self, sort: impl Into<String>) -> Self {
        self.sort = Some(sort.into());
        self
    }

    pub fn page_size(&self) -> u64 {
        self.size.clamp(1, MAX_PAGE_SIZE)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageInfo {
    pub size: u64,
    pub total_elements: u64,
    pub total_pages: u64,
    pub number: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: PageInfo,
}

impl<T> Page<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
        }
    }
}

/// Loads page `params.page` of `paginator` together with its totals.
/// The paginator must have been built with `params.page_size()`.
pub async fn fetch<'db, C, S>(
    paginator: Paginator<'db, C, S>,
    params: &PageParams,
) -> Result<Page<S::Item>, DbErr>
where
    C: ConnectionTrait,
    S: SelectorTrait + 'db,
{
    let totals = paginator.num_items_and_pages().await?;
    let items = paginator.fetch_page(params.page).await?;
    Ok(Page {
        items,
        page: PageInfo {
            size: params.page_size(),
            total_elements: totals.number_of_items,
            total_pages: totals.number_of_pages,
            number: params.page,
        },
    })
}
