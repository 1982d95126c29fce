mod config;
mod delivery;
mod domain;
mod repository;
mod telemetry;
mod usecase;

use std::sync::Arc;

use axum::{
    extract::State,
    middleware,
    routing::{get, put},
    Router,
};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::delivery::http::v1::bookings::{
    accept_or_reject_booking, create_booking, delete_booking, get_booking, list_bookings,
    owner_history, update_booking, user_history,
};
use crate::delivery::http::v1::middleware::auth_middleware;
use crate::delivery::http::v1::reviews::{create_booking_review, get_booking_review};
use crate::repository::postgres::{
    create_pool, PostgresBookingRepository, PostgresCarDirectory, PostgresReviewRepository,
};
use crate::usecase::bookings::BookingsUseCase;
use crate::usecase::jwt::JwtService;
use crate::usecase::reviews::ReviewsUseCase;

pub struct AppState {
    pub bookings_usecase: BookingsUseCase<PostgresBookingRepository, PostgresCarDirectory>,
    pub reviews_usecase: ReviewsUseCase<PostgresBookingRepository, PostgresReviewRepository>,
    pub jwt_service: JwtService,
    pub metrics_handle: PrometheusHandle,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = config::AppConfig::from_env();

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    // Initialize tracing subscriber with optional OpenTelemetry layer
    if config.telemetry_enabled {
        let telemetry_config = telemetry::TelemetryConfig {
            service_name: config.telemetry_service_name.clone(),
            service_version: config.telemetry_service_version.clone(),
            environment: config.telemetry_environment.clone(),
            otlp_endpoint: config.telemetry_otlp_endpoint.clone(),
        };

        telemetry::init_telemetry_with_subscriber(&telemetry_config, env_filter)
            .expect("failed to initialize telemetry");
    } else {
        telemetry::init_subscriber_without_telemetry(env_filter);
    }

    tracing::info!("starting the bookings service");

    let metrics_handle = PrometheusBuilder::new()
        .install_recorder()
        .expect("failed to install Prometheus recorder");
    metrics_process::Collector::default().describe();
    tracing::info!("prometheus metrics initialized");

    let pool = create_pool(&config.database_url, config.database_max_connections)
        .await
        .expect("failed to create database pool");
    tracing::info!("database pool created");

    sqlx::migrate!().run(&pool).await?;
    tracing::info!("database migrations applied");

    let bookings_usecase = BookingsUseCase::new(
        PostgresBookingRepository::new(pool.clone()),
        PostgresCarDirectory::new(pool.clone()),
    );
    let reviews_usecase = ReviewsUseCase::new(
        PostgresBookingRepository::new(pool.clone()),
        PostgresReviewRepository::new(pool),
    );
    let jwt_service = JwtService::new(config.jwt_secret);

    let shared_state = Arc::new(AppState {
        bookings_usecase,
        reviews_usecase,
        jwt_service,
        metrics_handle,
    });

    // All booking routes require authentication
    let bookings_api = Router::new()
        .route("/api/v1/bookings", get(list_bookings).post(create_booking))
        .route("/api/v1/bookings/history/mine", get(user_history))
        .route("/api/v1/bookings/history/owned", get(owner_history))
        .route(
            "/api/v1/bookings/{id}",
            get(get_booking).put(update_booking).delete(delete_booking),
        )
        .route(
            "/api/v1/bookings/{id}/accept-or-reject",
            put(accept_or_reject_booking),
        )
        .route(
            "/api/v1/bookings/{id}/review",
            get(get_booking_review).post(create_booking_review),
        )
        .layer(middleware::from_fn_with_state(
            shared_state.clone(),
            auth_middleware,
        ));

    let router = Router::new()
        .route("/healthz", get(healthz))
        .route("/metrics", get(metrics))
        .merge(bookings_api)
        .layer(TraceLayer::new_for_http())
        .with_state(shared_state);

    let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
    tracing::info!("bookings service running on 0.0.0.0:8080");
    axum::serve(listener, router).await?;

    // Shutdown telemetry on exit
    if config.telemetry_enabled {
        telemetry::shutdown_telemetry();
    }

    Ok(())
}

async fn metrics(State(state): State<Arc<AppState>>) -> String {
    metrics_process::Collector::default().collect();
    state.metrics_handle.render()
}

#[tracing::instrument]
async fn healthz() -> &'static str {
    "OK"
}
