#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{extract::Path, http::StatusCode, routing::get, Router};
use menu_review_server::entities::{member, member::MemberType};
use menu_review_server::migrator::Migrator;
use menu_review_server::mnd::MndApi;
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, Set};
use sea_orm_migration::MigratorTrait;

/// Two days of July 2021. The second row of each day has no date and the
/// last row only serves breakfast.
pub const WEEK_FEED: &str = r#"{
    "DS_TB_MNDT_DATEBYMLSVC_1691": {
        "list_total_count": 4,
        "row": [
            {"dates": "2021-07-05(월)", "brst": "쌀밥(1)", "brst_cal": "500kcal", "lunc": "잡곡밥", "lunc_cal": "480kcal", "dinr": "쌀밥", "dinr_cal": "500kcal"},
            {"dates": "", "brst": "된장국(5)(6)", "brst_cal": "45.2kcal", "lunc": "김치찌개(9)", "lunc_cal": "120kcal", "dinr": "", "dinr_cal": ""},
            {"dates": "2021-07-06(화)", "brst": "쌀밥", "brst_cal": "500kcal", "lunc": "", "lunc_cal": "", "dinr": "불고기(16)", "dinr_cal": "320.5kcal"},
            {"dates": "", "brst": "우유", "brst_cal": "130kcal", "lunc": "", "lunc_cal": "", "dinr": "", "dinr_cal": ""}
        ]
    }
}"#;

pub async fn setup_db() -> DatabaseConnection {
    // A single connection keeps every query on the same in-memory database.
    let mut opt = ConnectOptions::new("sqlite::memory:");
    opt.max_connections(1).min_connections(1).sqlx_logging(false);

    let db = Database::connect(opt).await.expect("connect sqlite");
    Migrator::up(&db, None).await.expect("run migrations");
    db
}

pub async fn create_member(db: &DatabaseConnection, username: &str) -> member::Model {
    member::ActiveModel {
        username: Set(username.to_string()),
        password_hash: Set("unused".to_string()),
        name: Set(username.to_string()),
        member_type: Set(MemberType::Soldier),
        created_at: Set(chrono::Utc::now().naive_utc()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("insert member")
}

/// Stand-in for the MND API served on a random local port.
pub struct FakeMnd {
    pub base_url: String,
    requests: Arc<Mutex<Vec<u32>>>,
}

impl FakeMnd {
    pub async fn start<F>(respond: F) -> Self
    where
        F: Fn(u32) -> (StatusCode, String) + Clone + Send + Sync + 'static,
    {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let seen = requests.clone();

        let app = Router::new().route(
            "/svc/1/:end",
            get(move |Path(end): Path<u32>| {
                let respond = respond.clone();
                let seen = seen.clone();
                async move {
                    seen.lock().unwrap().push(end);
                    respond(end)
                }
            }),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}/svc", addr),
            requests,
        }
    }

    /// Always answers with `body`, whatever range is requested.
    pub async fn serving(body: &str) -> Self {
        let body = body.to_string();
        Self::start(move |_| (StatusCode::OK, body.clone())).await
    }

    pub fn api(&self) -> MndApi {
        MndApi::new(self.base_url.clone(), Duration::from_secs(5)).unwrap()
    }

    /// End indices requested so far, in order.
    pub fn requests(&self) -> Vec<u32> {
        self.requests.lock().unwrap().clone()
    }
}
