use std::{io::IsTerminal, time::Duration};

use axum::{
    http::{Request, Response},
    Router,
};
use tower_http::{classify::ServerErrorsFailureClass, trace::TraceLayer};
use tracing::Span;
use tracing_error::ErrorLayer;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::utilities::friendly_id;

/// Installs the global subscriber. `RUST_LOG` wins over the configured directives.
pub fn setup(directives: &[String]) -> anyhow::Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => filter_layer(directives)?,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(ErrorLayer::default())
        .with(
            fmt::Layer::new()
                .with_ansi(std::io::stderr().is_terminal())
                .with_writer(std::io::stderr)
                .compact()
                .with_target(false)
                .with_thread_ids(false)
                .with_thread_names(false)
                .with_file(false)
                .with_line_number(false),
        )
        .try_init()?;

    Ok(())
}

fn filter_layer(directives: &[String]) -> anyhow::Result<EnvFilter> {
    let mut layer = EnvFilter::default();

    for directive in directives {
        layer = layer.add_directive(directive.parse()?);
    }

    Ok(layer)
}

pub fn add_layer(router: Router) -> Router {
    router.layer(
        TraceLayer::new_for_http()
            .make_span_with(|req: &Request<_>| {
                tracing::info_span!(
                    "request",
                    id = %friendly_id(8),
                    method = %req.method(),
                    uri = %req.uri(),
                    status = tracing::field::Empty,
                    latency = tracing::field::Empty,
                )
            })
            .on_request(|_: &Request<_>, _: &Span| {
                tracing::trace!("got request");
            })
            .on_response(|res: &Response<_>, latency: Duration, span: &Span| {
                span.record(
                    "latency",
                    tracing::field::display(format!("{}ms", latency.as_millis())),
                );
                span.record("status", tracing::field::display(res.status()));
                tracing::debug!("responded");
            })
            .on_failure(
                |class: ServerErrorsFailureClass, latency: Duration, _: &Span| {
                    tracing::warn!("request failed after {}ms: {class}", latency.as_millis());
                },
            ),
    )
}
