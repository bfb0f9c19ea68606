use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;

#[derive(Parser)]
#[command(
	author,
	version,
	about = "Convert note markup into ginko components.",
	long_about = "ginko rewrites notes written with callouts, tabs, steps, quizzes, layouts, file \
	              trees, snippets and FAQs into the component markup rendered by ginko \
	              sites.\n\nQuick start:\n  ginko convert note.md      Print the converted note\n  \
	              ginko convert note.md -o out.md\n  ginko check notes/*.md     Verify notes \
	              convert cleanly\n  ginko ast note.md          Inspect the parsed tree"
)]
pub struct GinkoCli {
	#[command(subcommand)]
	pub command: Option<Commands>,

	/// Directory to search for `ginko.toml`. Defaults to the current
	/// directory.
	#[arg(long, short, global = true)]
	pub path: Option<PathBuf>,

	/// Enable verbose output.
	#[arg(long, short, global = true, default_value_t = false)]
	pub verbose: bool,

	/// Disable colored output.
	#[arg(long, global = true, default_value_t = false)]
	pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
	/// Create a sample `ginko.toml`.
	///
	/// If the file already exists, this command is a no-op and exits
	/// successfully.
	Init,
	/// Convert a note and print or write the result.
	///
	/// Reads from a file, or from stdin when INPUT is `-`. The output file is
	/// only replaced once the whole note converted successfully, so a failed
	/// conversion never leaves a half written file behind.
	Convert {
		/// The note to convert, or `-` for stdin.
		input: PathBuf,

		/// Write the result to this file instead of stdout.
		#[arg(long, short)]
		output: Option<PathBuf>,

		/// Convert without writing anything. Reports whether the output file
		/// would change.
		#[arg(long, default_value_t = false)]
		dry_run: bool,

		/// Show a unified diff between the input and the converted output.
		#[arg(long, default_value_t = false)]
		diff: bool,
	},
	/// Check that notes convert without errors.
	///
	/// Exits with a non-zero status code if any note fails to parse or
	/// convert. Ideal for CI pipelines.
	Check {
		/// The notes to check.
		#[arg(required = true)]
		inputs: Vec<PathBuf>,

		/// Output format for check results. Use `text` for human-readable
		/// output or `json` for programmatic consumption.
		#[arg(long, value_enum, default_value_t = OutputFormat::Text)]
		format: OutputFormat,
	},
	/// Print the parsed tree of a note as JSON.
	Ast {
		/// The note to parse, or `-` for stdin.
		input: PathBuf,
	},
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
	/// Human-readable text output with colors and formatting.
	Text,
	/// JSON output for programmatic consumption.
	Json,
}
