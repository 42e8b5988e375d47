use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::MakeWriterExt;

pub fn init_logging(verbosity: u8) {
	// 0 = errors only (stdout carries the result envelope)
	// 1 (-v) = command progress, request-level traffic stays quiet
	// 2+ (-vv) = every request and poll attempt
	let filter = match verbosity {
		0 => "error",
		1 => "info,ilo::http=warn",
		_ => "debug,hyper_util=info,rustls=info",
	};

	let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

	let stderr = std::io::stderr.with_max_level(tracing::Level::TRACE);

	tracing_subscriber::fmt()
		.with_env_filter(env_filter)
		.with_writer(stderr)
		.with_target(true)
		.with_level(true)
		.compact()
		.init();
}
