use opsgate_core::OPSGATE_LOG_VAR;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub use tracing::{debug, error, info, span, warn, Level, Span};

const RUST_LOG_VAR: &str = "RUST_LOG";

/// Install the global subscriber.
///
/// The filter comes from `OPSGATE_LOG`, then `RUST_LOG`, then `default_level`.
/// Output is a compact single-line format on stderr, colored only on a TTY.
pub fn init(
    default_level: &str,
) -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
    let filter = build_filter(default_level, |name| std::env::var(name).ok())?;

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(is_tty())
        .compact()
        .with_target(false)
        .with_thread_ids(false)
        .with_level(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}

/// The directive string that [`init`] would use
pub fn filter_directive<F>(default_level: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    [OPSGATE_LOG_VAR, RUST_LOG_VAR]
        .into_iter()
        .filter_map(|name| lookup(name))
        .find(|value| !value.trim().is_empty())
        .unwrap_or_else(|| default_level.to_string())
}

fn build_filter<F>(
    default_level: &str,
    lookup: F,
) -> Result<EnvFilter, tracing_subscriber::filter::ParseError>
where
    F: Fn(&str) -> Option<String>,
{
    EnvFilter::try_new(filter_directive(default_level, lookup))
}

fn is_tty() -> bool {
    std::io::IsTerminal::is_terminal(&std::io::stderr())
}

/// Span covering one batch job
pub fn job_span(job_id: &str, action: &str, total: usize) -> Span {
    span!(Level::INFO, "batch_job", job_id = %job_id, action = %action, total)
}

/// Span covering one target inside a job
pub fn target_span(target: &str) -> Span {
    span!(Level::INFO, "target", target = %target)
}

/// Structured event for a finished batch job
pub fn job_completed(job_id: &str, success_count: usize, failed_count: usize, elapsed_ms: u64) {
    if failed_count == 0 {
        info!(job_id = %job_id, success_count, failed_count, elapsed_ms, "batch scale finished");
    } else {
        warn!(
            job_id = %job_id,
            success_count,
            failed_count,
            elapsed_ms,
            "batch scale finished with failures"
        );
    }
}
