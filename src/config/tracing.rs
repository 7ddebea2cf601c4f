use tracing_subscriber::{filter, prelude::*};

pub trait HttpTracingExt: tracing::Subscriber {
    /// Keep request/response events from tower-http and everything at INFO from the app.
    fn with_http_tracing(self) -> tracing_subscriber::layer::Layered<filter::Targets, Self>
    where
        Self: Sized,
    {
        self.with(
            filter::Targets::new()
                .with_target("tower_http::trace", tracing::Level::DEBUG)
                .with_target("yatube", tracing::Level::TRACE)
                .with_default(tracing::Level::INFO),
        )
    }
}

impl<S: tracing::Subscriber> HttpTracingExt for S {}
