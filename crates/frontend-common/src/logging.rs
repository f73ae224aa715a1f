//! Browser console logging

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};
use tracing_web::MakeWebConsoleWriter;

/// Route `tracing` output to the browser console; later calls are no-ops
pub fn init_logging(directives: &str) {
    let fmt_layer = fmt::layer()
        .with_ansi(false)
        .without_time()
        .with_writer(MakeWebConsoleWriter::new());

    let _ = tracing_subscriber::registry()
        .with(EnvFilter::try_new(directives).unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt_layer)
        .try_init();
}
