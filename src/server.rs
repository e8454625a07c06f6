//! # Server Configuration
//!
//! This module contains the application state, router assembly and server
//! startup for the RoomOps API.

use std::sync::Arc;

use axum::{
    Router,
    extract::Request,
    http::HeaderValue,
    middleware::{self, Next},
    response::Response,
    routing::{get, patch, post},
};
use sea_orm::DatabaseConnection;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;
use uuid::Uuid;

use crate::auth::auth_middleware;
use crate::availability::BookingPolicy;
use crate::config::AppConfig;
use crate::handlers;
use crate::kpi::KpiAggregator;
use crate::lifecycle::LifecycleController;
use crate::telemetry::{self, TraceContext};

/// Application state containing shared resources
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: Arc<AppConfig>,
    pub lifecycle: LifecycleController,
    pub kpis: KpiAggregator,
}

impl AppState {
    pub fn new(config: AppConfig, db: DatabaseConnection) -> Self {
        let policy = BookingPolicy::from_config(&config.booking);
        Self {
            lifecycle: LifecycleController::new(db.clone(), policy),
            kpis: KpiAggregator::new(db.clone()),
            config: Arc::new(config),
            db,
        }
    }
}

/// Middleware assigning each request a trace id, available both to handlers
/// (via task-local context) and to the caller (X-Trace-Id header).
async fn trace_context_middleware(mut request: Request, next: Next) -> Response {
    let trace_id = Uuid::new_v4().to_string();
    let context = TraceContext {
        trace_id: trace_id.clone(),
    };

    request.extensions_mut().insert(context.clone());
    let mut response = telemetry::with_trace_context(context, next.run(request)).await;

    if let Ok(value) = HeaderValue::from_str(&trace_id) {
        response.headers_mut().insert("X-Trace-Id", value);
    }

    response
}

/// Creates and configures the Axum application router
pub fn create_app(state: AppState) -> Router {
    let api = Router::new()
        .route(
            "/rooms",
            get(handlers::rooms::list_rooms).post(handlers::rooms::create_room),
        )
        .route("/rooms/{room_id}", patch(handlers::rooms::update_room))
        .route(
            "/rooms/{room_id}/availability",
            get(handlers::rooms::check_room_availability),
        )
        .route(
            "/rooms/{room_id}/inspect",
            post(handlers::rooms::inspect_room),
        )
        .route(
            "/rooms/{room_id}/out-of-order",
            post(handlers::maintenance::declare_out_of_order),
        )
        .route(
            "/rooms/{room_id}/return-to-service",
            post(handlers::maintenance::return_to_service),
        )
        .route(
            "/rooms/{room_id}/tickets",
            get(handlers::maintenance::list_tickets),
        )
        .route(
            "/bookings",
            get(handlers::bookings::list_bookings).post(handlers::bookings::create_booking),
        )
        .route(
            "/bookings/upcoming",
            get(handlers::bookings::upcoming_bookings),
        )
        .route(
            "/bookings/{booking_id}/check-in",
            post(handlers::bookings::check_in),
        )
        .route(
            "/bookings/{booking_id}/check-out",
            post(handlers::bookings::check_out),
        )
        .route(
            "/housekeeping-tasks",
            get(handlers::housekeeping::list_tasks),
        )
        .route(
            "/housekeeping-tasks/{task_id}/complete",
            post(handlers::housekeeping::complete_task),
        )
        .route("/kpis", get(handlers::kpis::get_kpis))
        .layer(middleware::from_fn_with_state(
            Arc::clone(&state.config),
            auth_middleware,
        ));

    Router::new()
        .route("/", get(handlers::root))
        .route("/healthz", get(handlers::health))
        .nest("/api/v1", api)
        .layer(middleware::from_fn(trace_context_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi()))
}

/// Starts the server with the given configuration
pub async fn run_server(
    config: AppConfig,
    db: DatabaseConnection,
) -> Result<(), Box<dyn std::error::Error>> {
    // Resolve the configured bind address before moving config into state.
    let addr = config
        .bind_addr()
        .map_err(|e| format!("Invalid server address: {}", e))?;
    let profile = config.profile.clone();

    let state = AppState::new(config, db);
    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, %profile, "Server listening");

    axum::serve(listener, app).await?;

    Ok(())
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::root,
        crate::handlers::health,
        crate::handlers::rooms::list_rooms,
        crate::handlers::rooms::create_room,
        crate::handlers::rooms::update_room,
        crate::handlers::rooms::check_room_availability,
        crate::handlers::rooms::inspect_room,
        crate::handlers::maintenance::declare_out_of_order,
        crate::handlers::maintenance::return_to_service,
        crate::handlers::maintenance::list_tickets,
        crate::handlers::bookings::list_bookings,
        crate::handlers::bookings::create_booking,
        crate::handlers::bookings::upcoming_bookings,
        crate::handlers::bookings::check_in,
        crate::handlers::bookings::check_out,
        crate::handlers::housekeeping::list_tasks,
        crate::handlers::housekeeping::complete_task,
        crate::handlers::kpis::get_kpis,
    ),
    components(
        schemas(
            crate::models::ServiceInfo,
            crate::models::room::RoomStatus,
            crate::models::room::HousekeepingStatus,
            crate::models::booking::BookingStatus,
            crate::models::maintenance_ticket::TicketStatus,
            crate::models::housekeeping_task::TaskStatus,
            crate::error::ApiError,
            crate::error::BookingConflict,
            crate::handlers::rooms::RoomInfo,
            crate::handlers::rooms::CurrentBookingInfo,
            crate::handlers::rooms::CreateRoomRequest,
            crate::handlers::rooms::UpdateRoomRequest,
            crate::handlers::rooms::AvailabilityResponse,
            crate::handlers::bookings::BookingInfo,
            crate::handlers::bookings::CreateBookingRequestDto,
            crate::handlers::bookings::CheckOutResponse,
            crate::handlers::housekeeping::TaskInfo,
            crate::handlers::maintenance::TicketInfo,
            crate::handlers::maintenance::DeclareOutOfOrderRequest,
            crate::handlers::maintenance::OutOfOrderResponse,
            crate::kpi::KpiWindow,
            crate::kpi::KpiSnapshot,
        )
    ),
    info(
        title = "RoomOps API",
        description = "Multi-tenant room inventory and booking management",
        version = env!("CARGO_PKG_VERSION"),
    )
)]
pub struct ApiDoc;
