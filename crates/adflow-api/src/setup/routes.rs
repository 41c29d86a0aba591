//! Route configuration and setup

use std::sync::Arc;

use axum::{
    http::{HeaderValue, Method},
    routing::{delete, get, patch, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use adflow_core::Config;

use crate::auth::middleware::{auth_middleware, AuthState};
use crate::constants::API_PREFIX;
use crate::handlers;
use crate::state::AppState;

const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router, anyhow::Error> {
    let cors = setup_cors(config)?;

    let auth_state = Arc::new(AuthState {
        jwt_secret: config.jwt_secret.clone(),
        agency_repository: state.agencies.clone(),
        membership_repository: state.memberships.clone(),
        client_repository: state.clients.clone(),
    });

    // Public routes (no authentication required)
    let public_routes = Router::new()
        .route("/health", get(|| async { "ok" }))
        .route(
            &format!("{API_PREFIX}/agencies"),
            post(handlers::agencies::create_agency),
        )
        .with_state(state.clone());

    // Protected routes (require a bearer identity)
    let protected_routes = protected_routes(state).layer(axum::middleware::from_fn_with_state(
        auth_state,
        auth_middleware,
    ));

    let router = public_routes
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(cors);

    Ok(router)
}

fn protected_routes(state: Arc<AppState>) -> Router {
    Router::new()
        // Agencies
        .route(
            &format!("{API_PREFIX}/agencies/{{id}}/email-config"),
            get(handlers::agencies::get_email_config),
        )
        .route(
            &format!("{API_PREFIX}/agencies/{{id}}/activity"),
            get(handlers::agencies::list_activity),
        )
        .route(
            &format!("{API_PREFIX}/agencies/{{id}}/members"),
            post(handlers::members::add_member),
        )
        .route(
            &format!("{API_PREFIX}/members/{{id}}/role"),
            put(handlers::members::set_member_role),
        )
        // Clients
        .route(
            &format!("{API_PREFIX}/clients"),
            post(handlers::clients::create_client),
        )
        .route(
            &format!("{API_PREFIX}/clients/{{id}}/deactivate"),
            post(handlers::clients::deactivate_client),
        )
        .route(
            &format!("{API_PREFIX}/clients/{{id}}/contacts"),
            post(handlers::clients::create_contact),
        )
        // Projects
        .route(
            &format!("{API_PREFIX}/projects"),
            post(handlers::projects::create_project),
        )
        .route(
            &format!("{API_PREFIX}/projects/{{id}}/archive"),
            post(handlers::projects::archive_project),
        )
        .route(
            &format!("{API_PREFIX}/projects/{{id}}/approvers"),
            post(handlers::projects::add_approver),
        )
        .route(
            &format!("{API_PREFIX}/projects/{{id}}/approvers/{{membership_id}}"),
            delete(handlers::projects::remove_approver),
        )
        .route(
            &format!("{API_PREFIX}/projects/{{id}}/users"),
            post(handlers::projects::add_project_user),
        )
        .route(
            &format!("{API_PREFIX}/projects/{{id}}/campaigns"),
            post(handlers::campaigns::create_campaign),
        )
        // Campaigns
        .route(
            &format!("{API_PREFIX}/campaigns/{{id}}"),
            get(handlers::campaigns::get_campaign),
        )
        .route(
            &format!("{API_PREFIX}/campaigns/{{id}}/activate"),
            post(handlers::campaigns::activate_campaign),
        )
        .route(
            &format!("{API_PREFIX}/campaigns/{{id}}/submit-review"),
            post(handlers::campaigns::submit_campaign_for_review),
        )
        .route(
            &format!("{API_PREFIX}/campaigns/{{id}}/approve"),
            post(handlers::campaigns::approve_campaign),
        )
        .route(
            &format!("{API_PREFIX}/campaigns/{{id}}/reject"),
            post(handlers::campaigns::reject_campaign_review),
        )
        .route(
            &format!("{API_PREFIX}/campaigns/{{id}}/complete"),
            post(handlers::campaigns::complete_campaign),
        )
        .route(
            &format!("{API_PREFIX}/campaigns/{{id}}/archive"),
            post(handlers::campaigns::archive_campaign),
        )
        .route(
            &format!("{API_PREFIX}/campaigns/{{id}}/details"),
            patch(handlers::campaigns::update_campaign_details),
        )
        .route(
            &format!("{API_PREFIX}/campaigns/{{id}}/dates"),
            put(handlers::campaigns::set_campaign_dates),
        )
        .route(
            &format!("{API_PREFIX}/campaigns/{{id}}/brief"),
            put(handlers::campaigns::update_campaign_brief),
        )
        .route(
            &format!("{API_PREFIX}/campaigns/{{id}}/members"),
            post(handlers::campaigns::assign_campaign_member),
        )
        .route(
            &format!("{API_PREFIX}/campaigns/{{id}}/members/{{membership_id}}"),
            delete(handlers::campaigns::remove_campaign_member),
        )
        .route(
            &format!("{API_PREFIX}/campaigns/{{id}}/creators"),
            post(handlers::campaigns::assign_creator),
        )
        .route(
            &format!("{API_PREFIX}/campaigns/{{id}}/deliverables"),
            post(handlers::deliverables::create_deliverable),
        )
        // Deliverables
        .route(
            &format!("{API_PREFIX}/deliverables/{{id}}"),
            get(handlers::deliverables::get_deliverable),
        )
        .route(
            &format!("{API_PREFIX}/deliverables/{{id}}/versions"),
            post(handlers::deliverables::upload_version),
        )
        .route(
            &format!("{API_PREFIX}/deliverables/{{id}}/submit-review"),
            post(handlers::deliverables::submit_for_review),
        )
        .route(
            &format!("{API_PREFIX}/deliverables/{{id}}/approve"),
            post(handlers::deliverables::approve_deliverable),
        )
        .route(
            &format!("{API_PREFIX}/deliverables/{{id}}/reject"),
            post(handlers::deliverables::reject_deliverable),
        )
        .route(
            &format!("{API_PREFIX}/deliverables/{{id}}/versions/{{version_id}}"),
            delete(handlers::deliverables::delete_version),
        )
        // Client portal
        .route(
            &format!("{API_PREFIX}/portal/deliverables"),
            get(handlers::portal::list_pending_deliverables),
        )
        // Creators & credit-gated fetches
        .route(
            &format!("{API_PREFIX}/creators"),
            post(handlers::creators::create_creator),
        )
        .route(
            &format!("{API_PREFIX}/creators/{{id}}/social-fetch"),
            post(handlers::metering::trigger_social_fetch),
        )
        .route(
            &format!("{API_PREFIX}/campaign-creators/{{id}}/analytics"),
            post(handlers::metering::fetch_pre_campaign_analytics),
        )
        .route(
            &format!("{API_PREFIX}/campaign-creators/{{id}}/payments"),
            post(handlers::payments::create_payment),
        )
        .route(
            &format!("{API_PREFIX}/social-jobs/{{id}}"),
            get(handlers::metering::get_social_job),
        )
        .route(
            &format!("{API_PREFIX}/analytics-snapshots/{{id}}"),
            get(handlers::metering::get_analytics_snapshot),
        )
        // Payments
        .route(
            &format!("{API_PREFIX}/payments/{{id}}"),
            get(handlers::payments::get_payment),
        )
        .route(
            &format!("{API_PREFIX}/payments/{{id}}/mark-processing"),
            post(handlers::payments::mark_payment_processing),
        )
        .route(
            &format!("{API_PREFIX}/payments/{{id}}/mark-paid"),
            post(handlers::payments::mark_payment_paid),
        )
        .route(
            &format!("{API_PREFIX}/payments/{{id}}/mark-failed"),
            post(handlers::payments::mark_payment_failed),
        )
        .with_state(state)
}

fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let methods = [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::PATCH,
        Method::DELETE,
    ];
    let cors = if config.cors_origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any)
    } else {
        let origins = config
            .cors_origins
            .iter()
            .map(|origin| origin.parse::<HeaderValue>())
            .collect::<Result<Vec<_>, _>>()?;
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers(Any)
    };
    Ok(cors)
}
