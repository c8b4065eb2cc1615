use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tracing::info;

use crate::handlers::api::{
    create_appointment, evaluate_appointment, list_clinics, list_doctors, my_appointments,
    scheduler_config, slot_grid, AppState,
};
use crate::handlers::health::health_check;

pub fn create_router(app_state: Arc<AppState>, is_production: bool) -> Router {
    let mut router = Router::new();

    // Health check is always available
    let health_route = Router::new().route("/health", get(health_check));
    router = router.merge(health_route);

    let booking_routes = Router::new()
        .route("/clinics", get(list_clinics))
        .route("/clinics/:clinic_id/doctors", get(list_doctors))
        .route("/doctors/:doctor_id/slots", get(slot_grid))
        .route("/appointments", post(create_appointment))
        .route("/appointments/evaluate", post(evaluate_appointment))
        .route("/me/appointments", get(my_appointments));
    router = router.merge(booking_routes);

    // Only expose debug routes outside production
    if !is_production {
        let debug_routes =
            Router::new().route("/debug/scheduler-config", get(scheduler_config));
        router = router.merge(debug_routes);

        info!("Debug routes enabled - server running in development mode");
    } else {
        info!("Running in production mode - debug routes hidden");
    }

    router.with_state(app_state)
}
