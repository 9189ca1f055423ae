use std::{convert::Infallible, sync::Arc, time::Duration};

use axum::{
    response::sse::{Event, KeepAlive, Sse},
    routing::get,
    Extension, Router,
};
use tokio_stream::{Stream, StreamExt};

use crate::{middleware::SessionContext, AppState};

pub fn feed_handler() -> Router {
    Router::new().route("/", get(subscribe))
}

/// Live change stream for the signed-in user. Closing the connection unsubscribes.
pub async fn subscribe(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(session): Extension<SessionContext>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    tracing::debug!("feed subscriber connected: {}", session.user.id);

    let stream = app_state
        .feed
        .subscribe_for(session.user.id, session.user.role)
        .map(|event| {
            let sse = Event::default().event(event.event_name());
            Ok(sse
                .json_data(&event)
                .unwrap_or_else(|_| Event::default().event("error").data("unserializable event")))
        });

    Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15)))
}
