#![warn(clippy::pedantic, clippy::all, clippy::nursery)]
#![allow(clippy::single_match_else)]

use crate::{
    auth::{backend::TasselAuthBackend, postgres_store::PostgresSessionStore},
    config::RuntimeConfiguration,
    routes::{
        health::get_health_check,
        import::{get_import_page, post_import},
        index::get_index_route,
        login::{get_login, post_login, post_logout},
        lookup::post_lookup,
        onboarding::{get_start_onboarding, post_create_staff},
        students::{
            delete_student, get_students, internal_get_add_student_form,
            internal_get_edit_student_form, internal_get_student_in_detail, internal_get_students,
            internal_post_update_student, internal_put_new_student,
        },
    },
    state::TasselState,
};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use axum_login::{
    AuthManagerLayerBuilder,
    tower_sessions::{Expiry, SessionManagerLayer, cookie::time::Duration},
};
use sqlx::postgres::PgPoolOptions;
use std::env;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::{compression::CompressionLayer, trace::TraceLayer};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[macro_use]
extern crate tracing;

mod auth;
mod config;
mod data;
mod error;
mod maud_conveniences;
mod routes;
mod state;

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    warn!("signal received, starting graceful shutdown");
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().expect("unable to load env vars");

    tracing::subscriber::set_global_default(
        FmtSubscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .finish(),
    )
    .expect("unable to set tracing subscriber");

    info!("`tracing` online");

    let options = PgPoolOptions::new().max_connections(15);
    let config = RuntimeConfiguration::new().expect("unable to create config");
    let state = TasselState::new(options, config)
        .await
        .expect("unable to create state");

    let session_store = PostgresSessionStore::new(state.clone());
    let session_layer = SessionManagerLayer::new(session_store)
        .with_expiry(Expiry::OnInactivity(Duration::days(5)));
    let auth_backend = TasselAuthBackend::new(state.clone());
    let auth_layer = AuthManagerLayerBuilder::new(auth_backend, session_layer).build();

    let app = Router::new()
        .route("/", get(get_index_route))
        .route("/search", post(post_lookup))
        .route("/health_check", get(get_health_check))
        .route("/students", get(get_students).delete(delete_student))
        .route(
            "/import",
            get(get_import_page)
                .post(post_import)
                .layer(DefaultBodyLimit::max(2 * 1024 * 1024)),
        )
        .route("/login", get(get_login).post(post_login))
        .route("/logout", post(post_logout))
        .route(
            "/onboarding",
            get(get_start_onboarding).post(post_create_staff),
        )
        .route(
            "/internal/students",
            get(internal_get_students)
                .put(internal_put_new_student)
                .post(internal_post_update_student),
        )
        .route(
            "/internal/students/new_form",
            get(internal_get_add_student_form),
        )
        .route(
            "/internal/students/edit_form",
            get(internal_get_edit_student_form),
        )
        .route(
            "/internal/students/in_detail",
            get(internal_get_student_in_detail),
        )
        .layer(auth_layer)
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .with_state(state);

    let server_ip = env::var("TASSEL_SERVER_IP").unwrap_or_else(|_| "127.0.0.1:8080".to_string());
    let listener = TcpListener::bind(&server_ip)
        .await
        .expect("unable to listen on server ip");

    info!(?server_ip, "Listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("unable to serve app");
}
