pub mod aggregation;
pub mod error;
pub mod generator;
pub mod random;
pub mod routes;
pub mod schedule;

use std::path::Path;
use std::sync::Arc;

use axum::extract::FromRef;
use axum::handler::Handler;
use axum::http::Method;
use axum::Router;
use error::AppError;
use generator::GenerationSettings;
use meeting_insights_config::Config;
use meeting_insights_database::{
    ensure_schema, get_database_connection, InMemoryMeetingStore, MeetingStore, PgMeetingStore,
};
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::routes::meetings::average::{average_meetings_per_month, average_participants};
use crate::routes::meetings::create::create;
use crate::routes::meetings::next::next_meeting_per_participant;
use crate::routes::meetings::total::total_meetings;
use crate::routes::meetings::upcoming::upcoming;

#[derive(Clone, FromRef)]
pub struct MyState {
    pub store: Arc<dyn MeetingStore>,
    pub settings: Arc<GenerationSettings>,
}

#[derive(Default)]
struct MyRouter {
    router: Router<MyState>,
}

impl MyRouter {
    #[track_caller]
    #[must_use]
    pub fn route<T: 'static, H: Handler<T, MyState>>(
        self,
        method: &Method,
        path: &'static str,
        handler: H,
    ) -> Self {
        let method_router = if method == Method::GET {
            axum::routing::get(handler)
        } else if method == Method::POST {
            axum::routing::post(handler)
        } else {
            unreachable!("no route uses {method}")
        };
        Self {
            router: self.router.route(path, method_router),
        }
    }

    pub fn finish(self) -> Router<MyState> {
        self.router
    }
}

/// Postgres when a database url is configured, process memory otherwise.
pub async fn build_store(config: &Config) -> Result<Arc<dyn MeetingStore>, AppError> {
    if let Some(database_url) = &config.database_url {
        let pool = get_database_connection(database_url)?;
        ensure_schema(&pool).await?;
        info!("connected to database");
        Ok(Arc::new(PgMeetingStore::new(pool)))
    } else {
        warn!("no database_url configured, meetings are kept in memory only");
        Ok(Arc::new(InMemoryMeetingStore::new()))
    }
}

pub fn setup_router(state: MyState, static_dir: &Path) -> Router {
    let my_router = MyRouter::default()
        .route(&Method::POST, "/meetings", create)
        .route(
            &Method::GET,
            "/meetings/average/participants",
            average_participants,
        )
        .route(
            &Method::GET,
            "/meetings/average/permonth",
            average_meetings_per_month,
        )
        .route(
            &Method::GET,
            "/meetings/next/perparticipant",
            next_meeting_per_participant,
        )
        .route(&Method::GET, "/meetings/upcoming", upcoming)
        .route(&Method::GET, "/meetings/total", total_meetings);

    my_router
        .finish()
        .fallback_service(ServeDir::new(static_dir))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CatchPanicLayer::new()),
        )
}

pub async fn setup_server(config: &Config) -> Result<Router, AppError> {
    info!("starting up server...");

    let state = MyState {
        store: build_store(config).await?,
        settings: Arc::new(GenerationSettings::from(config)),
    };

    Ok(setup_router(state, &config.static_dir))
}
