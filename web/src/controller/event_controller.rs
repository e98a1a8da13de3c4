use crate::controller::EventReply;
use crate::params::event::EventParams;
use crate::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use domain::connection::{ConnectionId, RoutingEndpoint};
use domain::relay::InboundEvent;
use log::*;

/// POST a gateway event (connect, disconnect, message or any other route)
/// and relay it. The HTTP status mirrors `statusCode` in the reply.
pub async fn handle(
    State(app_state): State<AppState>,
    Json(params): Json<EventParams>,
) -> impl IntoResponse {
    let context = params.request_context;
    debug!(
        "Event {} for connection {}",
        context.route_key, context.connection_id
    );

    let local = app_state.sockets.endpoint();
    let endpoint = RoutingEndpoint::new(
        context
            .domain_name
            .unwrap_or_else(|| local.domain_name.clone()),
        context.stage.unwrap_or_else(|| local.stage.clone()),
    );

    let event = InboundEvent {
        connection_id: ConnectionId::new(context.connection_id),
        endpoint,
        route: app_state.relay.route_for_key(&context.route_key),
        body: params.body,
    };

    let response = app_state.relay.dispatch(event).await;
    let status_code = response.status_code();
    let status = StatusCode::from_u16(status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    (status, Json(EventReply::new(status_code, response.message)))
}
