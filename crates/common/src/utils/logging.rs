use tracing::Subscriber;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Default directives when `RUST_LOG` is not set.
pub const DEFAULT_FILTER: &str = "info,sqlx=warn,sea_orm=warn";

fn env_filter(fallback: Option<&str>) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(fallback.unwrap_or(DEFAULT_FILTER)))
}

/// Compact, human-readable subscriber writing to `writer`.
/// - Respects `RUST_LOG` if set
/// - Falls back to `filter`, then to [`DEFAULT_FILTER`]
/// - Colours only when `ansi` is true
pub fn compact_subscriber<W>(filter: Option<&str>, writer: W, ansi: bool) -> impl Subscriber + Send + Sync + 'static
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    fmt()
        .with_env_filter(env_filter(filter))
        .with_target(false)
        .with_ansi(ansi)
        .compact()
        .with_writer(writer)
        .finish()
}

/// JSON structured subscriber writing to `writer`. Same filter precedence as
/// [`compact_subscriber`]; never coloured.
pub fn json_subscriber<W>(filter: Option<&str>, writer: W) -> impl Subscriber + Send + Sync + 'static
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    fmt()
        .with_env_filter(env_filter(filter))
        .with_target(true)
        .with_ansi(false)
        .json()
        .with_writer(writer)
        .finish()
}

/// Install a compact subscriber globally. Repeated calls are ignored.
pub fn init_logging_default<W>(filter: Option<&str>, writer: W, ansi: bool)
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let _ = compact_subscriber(filter, writer, ansi).try_init();
}

/// Install a JSON subscriber globally. Repeated calls are ignored.
pub fn init_logging_json<W>(filter: Option<&str>, writer: W)
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let _ = json_subscriber(filter, writer).try_init();
}
