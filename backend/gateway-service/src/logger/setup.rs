//! Subscriber installation.

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

use super::config::{Log, LogFormat};

/// Keeps the non-blocking writer flushing until dropped.
#[derive(Debug)]
pub struct TelemetryGuard {
    _log_guards: Vec<WorkerGuard>,
}

/// Installs the global subscriber described by `config`.
///
/// Crates listed in `crates_to_filter` log at the configured level, everything else at `WARN`
/// unless `filtering_directive` says otherwise. A second call leaves the first subscriber in
/// place.
pub fn setup(
    config: &Log,
    service_name: &str,
    crates_to_filter: impl AsRef<[&'static str]>,
) -> TelemetryGuard {
    let mut guards = Vec::new();
    let console = &config.console;

    let console_layer = console.enabled.then(|| {
        let (writer, guard) = tracing_appender::non_blocking(std::io::stdout());
        guards.push(guard);

        let filter = match console.filtering_directive.as_deref() {
            Some(directive) => EnvFilter::builder().parse_lossy(directive),
            None => get_envfilter(console.level.into_level(), crates_to_filter.as_ref()),
        };
        match console.log_format {
            LogFormat::Default => fmt::layer()
                .with_target(true)
                .with_span_events(FmtSpan::CLOSE)
                .with_writer(writer)
                .with_filter(filter)
                .boxed(),
            LogFormat::Json => fmt::layer()
                .json()
                .with_current_span(true)
                .with_span_list(true)
                .with_target(true)
                .with_span_events(FmtSpan::CLOSE)
                .with_writer(writer)
                .with_filter(filter)
                .boxed(),
        }
    });

    if tracing_subscriber::registry()
        .with(console_layer)
        .try_init()
        .is_err()
    {
        tracing::debug!("global subscriber already installed");
    }
    tracing::info!(service = service_name, "logger initialized");

    TelemetryGuard {
        _log_guards: guards,
    }
}

fn get_envfilter(level: tracing::Level, crates_to_filter: &[&'static str]) -> EnvFilter {
    let directive = crates_to_filter
        .iter()
        .map(|krate| format!("{krate}={level}"))
        .chain(std::iter::once(tracing::Level::WARN.to_string()))
        .collect::<Vec<_>>()
        .join(",");
    EnvFilter::builder().parse_lossy(directive)
}
