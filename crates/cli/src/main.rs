use clap::Parser;
use ilo_cli::cli::Cli;
use ilo_cli::error::CliError;
use ilo_cli::logging;
use ilo_cli::output::{self, OutputFormat, ResultBuilder};
use ilo_cli::run::{COMMAND_NAME, run};

#[tokio::main]
async fn main() {
	let cli = Cli::parse();
	logging::init_logging(cli.verbose);

	let format = cli.format;

	if let Err(err) = run(cli).await {
		if !err.is_output_already_printed() {
			handle_error(err, format);
		}
		std::process::exit(1);
	}
}

fn handle_error(err: CliError, format: OutputFormat) {
	let cmd_error = err.to_command_error();

	output::print_error_stderr(&cmd_error);

	// Machine consumers still get an envelope on stdout
	if format != OutputFormat::Text {
		let result: output::CommandResult<()> = ResultBuilder::new(COMMAND_NAME).command_error(cmd_error).build();
		output::print_result(&result, format);
	}
}
