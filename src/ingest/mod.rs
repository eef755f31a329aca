//! Pulls the MND menu feed into the database.
//!
//! A run walks [`Stage::ALL`] in order over one [`IngestContext`]. Every
//! persisting stage commits its own transaction and only ever finds or
//! creates rows by natural key, so a failed run can simply be repeated.

pub mod context;
pub mod stages;

use std::time::Instant;

use chrono::NaiveDate;
use sea_orm::{DatabaseConnection, DbErr};
use tracing::Instrument;

pub use context::{IngestContext, IngestReport, MealEntry, MealKey, Tally};
pub use stages::Stage;

use crate::mnd::{MndApi, MndError};

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error(transparent)]
    Upstream(#[from] MndError),
    #[error("storage failure during {stage}: {source}")]
    Storage {
        stage: Stage,
        #[source]
        source: DbErr,
    },
    #[error("no daily meal cached for {0}")]
    MissingDailyMeal(NaiveDate),
    #[error("no meal resolved for {0:?}")]
    MissingMeal(MealKey),
    #[error("no menu persisted under {0:?}")]
    MissingMenu(String),
}

pub struct IngestPipeline {
    api: MndApi,
    db: DatabaseConnection,
}

impl IngestPipeline {
    pub fn new(api: MndApi, db: DatabaseConnection) -> Self {
        Self { api, db }
    }

    pub async fn run(&self) -> Result<IngestReport, IngestError> {
        let span = tracing::info_span!("ingest_run", "otel.name" = "ingest_run");
        let started = Instant::now();

        let result = async {
            let mut ctx = IngestContext::default();
            for stage in Stage::ALL {
                let stage_started = Instant::now();
                ctx = stage
                    .run(ctx, &self.api, &self.db)
                    .instrument(tracing::info_span!("ingest_stage", stage = %stage))
                    .await?;
                metrics::histogram!(
                    "menu_review_ingest_stage_duration_seconds",
                    "stage" => stage.as_str()
                )
                .record(stage_started.elapsed().as_secs_f64());
            }
            Ok::<_, IngestError>(ctx.report)
        }
        .instrument(span)
        .await;

        metrics::histogram!("menu_review_ingest_duration_seconds")
            .record(started.elapsed().as_secs_f64());

        match &result {
            Ok(report) => {
                metrics::counter!("menu_review_ingest_runs_total", "result" => "ok").increment(1);
                for (table, tally) in [
                    ("menus", report.menus),
                    ("daily_meals", report.daily_meals),
                    ("meals", report.meals),
                    ("meal_menus", report.meal_menus),
                ] {
                    metrics::counter!("menu_review_ingest_rows_created_total", "table" => table)
                        .increment(tally.created);
                }
                tracing::info!("Ingestion finished: {:?}", report);
            }
            Err(e) => {
                metrics::counter!("menu_review_ingest_runs_total", "result" => "failed")
                    .increment(1);
                tracing::error!("Ingestion aborted: {}", e);
            }
        }

        result
    }
}
