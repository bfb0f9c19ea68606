use std::io::Read;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use ginko_cli::Commands;
use ginko_cli::GinkoCli;
use ginko_cli::OutputFormat;
use ginko_core::CONFIG_FILE_CANDIDATES;
use ginko_core::Converter;
use ginko_core::GinkoConfig;
use owo_colors::OwoColorize;
use similar::ChangeTag;
use similar::TextDiff;
use tracing::debug;
use tracing_subscriber::EnvFilter;

static USE_COLOR: std::sync::atomic::AtomicBool = std::sync::atomic::AtomicBool::new(true);

fn color_enabled() -> bool {
	USE_COLOR.load(std::sync::atomic::Ordering::Relaxed)
}

/// Apply ANSI color codes only when color is enabled.
macro_rules! colored {
	($text:expr,red) => {
		if color_enabled() {
			format!("{}", $text.red())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,green) => {
		if color_enabled() {
			format!("{}", $text.green())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,bold) => {
		if color_enabled() {
			format!("{}", $text.bold())
		} else {
			format!("{}", $text)
		}
	};
}

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

const SAMPLE_CONFIG: &str = "# ginko configuration\n\n[parser]\n# Blocks and dash elements \
                             nested deeper than this are rejected.\nmax_depth = 64\n\n[rules]\n# \
                             Rules to leave out: callout, tabs, steps, layout, snippet, \
                             file-tree, faq, quiz.\ndisabled = []\n\n[quiz]\n# Difficulty for \
                             questions without a `difficulty` property.\ndefault_difficulty = \
                             \"medium\"\n\n[faq]\n# Length of generated FAQ item ids.\nid_length \
                             = 10\n";

fn main() {
	let args = GinkoCli::parse();

	// Respect NO_COLOR env var and --no-color flag.
	let use_color = !args.no_color && std::env::var_os("NO_COLOR").is_none();
	if !use_color {
		USE_COLOR.store(false, std::sync::atomic::Ordering::Relaxed);
	}

	init_tracing(args.verbose, use_color);

	// Install miette's fancy handler for rich error diagnostics.
	miette::set_hook(Box::new(move |_| {
		Box::new(
			miette::MietteHandlerOpts::new()
				.color(use_color)
				.unicode(use_color)
				.build(),
		)
	}))
	.ok();

	let result = match &args.command {
		Some(Commands::Init) => run_init(&args),
		Some(Commands::Convert {
			input,
			output,
			dry_run,
			diff,
		}) => run_convert(&args, input, output.as_deref(), *dry_run, *diff),
		Some(Commands::Check { inputs, format }) => run_check(&args, inputs, *format),
		Some(Commands::Ast { input }) => run_ast(&args, input),
		None => {
			eprintln!("No subcommand specified. Run `ginko --help` for usage.");
			process::exit(1);
		}
	};

	if let Err(e) = result {
		// Try to render through miette for rich diagnostics with help text
		// and error codes.
		match e.downcast::<ginko_core::GinkoError>() {
			Ok(ginko_err) => {
				let report: miette::Report = (*ginko_err).into();
				eprintln!("{report:?}");
			}
			Err(e) => {
				eprintln!("{} {e}", colored!("error:", red));
			}
		}
		process::exit(2);
	}
}

/// Logs go to stderr. `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool, use_color: bool) {
	let default_level = if verbose { "debug" } else { "warn" };
	let filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_ansi(use_color)
		.with_target(false)
		.try_init()
		.ok();
}

fn resolve_root(args: &GinkoCli) -> PathBuf {
	args.path
		.clone()
		.unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

fn load_converter(args: &GinkoCli) -> CliResult<Converter> {
	let root = resolve_root(args);
	let config = match GinkoConfig::load(&root)? {
		Some(config) => {
			debug!(path = ?GinkoConfig::resolve_path(&root), "loaded config");
			config
		}
		None => GinkoConfig::default(),
	};

	Ok(Converter::from_config(&config))
}

fn is_stdin(path: &Path) -> bool {
	path.as_os_str() == "-"
}

fn read_input(path: &Path) -> CliResult<String> {
	if is_stdin(path) {
		let mut content = String::new();
		std::io::stdin().read_to_string(&mut content)?;
		return Ok(content);
	}

	std::fs::read_to_string(path)
		.map_err(|e| format!("failed to read {}: {e}", path.display()).into())
}

fn display_name(path: &Path) -> String {
	if is_stdin(path) {
		"<stdin>".to_string()
	} else {
		path.display().to_string()
	}
}

fn run_init(args: &GinkoCli) -> CliResult<()> {
	let root = resolve_root(args);

	if let Some(existing) = GinkoConfig::resolve_path(&root) {
		println!("Config file already exists: {}", existing.display());
		return Ok(());
	}

	let config_path = root.join(CONFIG_FILE_CANDIDATES[0]);
	std::fs::write(&config_path, SAMPLE_CONFIG)?;
	println!("Created {}", config_path.display());

	Ok(())
}

fn run_convert(
	args: &GinkoCli,
	input: &Path,
	output: Option<&Path>,
	dry_run: bool,
	show_diff: bool,
) -> CliResult<()> {
	let converter = load_converter(args)?;
	let content = read_input(input)?;
	let converted = converter.convert(&content)?;

	if show_diff {
		print_diff(&content, &converted);
	}

	let Some(output) = output else {
		if dry_run {
			println!("{} converts cleanly", display_name(input));
		} else {
			print!("{converted}");
		}
		return Ok(());
	};

	let current = std::fs::read_to_string(output).ok();
	let unchanged = current.as_deref() == Some(converted.as_str());

	if dry_run {
		if unchanged {
			println!("{} is up to date", output.display());
		} else {
			println!("Would write {}", output.display());
		}
		return Ok(());
	}

	if unchanged {
		println!("{} is up to date", output.display());
		return Ok(());
	}

	write_atomic(output, &converted)?;
	println!(
		"{} {}",
		colored!("Wrote", green),
		colored!(output.display(), bold)
	);

	Ok(())
}

/// Write through a temporary file in the same directory and rename it over
/// `path`, so readers never see a partial file.
fn write_atomic(path: &Path, content: &str) -> CliResult<()> {
	let directory = match path.parent() {
		Some(parent) if !parent.as_os_str().is_empty() => parent,
		_ => Path::new("."),
	};

	let mut file = tempfile::NamedTempFile::new_in(directory)?;
	file.write_all(content.as_bytes())?;
	file.persist(path).map_err(|e| e.error)?;

	Ok(())
}

#[derive(Debug)]
struct CheckOutcome {
	file: String,
	error: Option<String>,
}

fn run_check(args: &GinkoCli, inputs: &[PathBuf], format: OutputFormat) -> CliResult<()> {
	let converter = load_converter(args)?;

	let outcomes: Vec<CheckOutcome> = inputs
		.iter()
		.map(|input| {
			let error = read_input(input)
				.and_then(|content| converter.convert(&content).map_err(Into::into))
				.err()
				.map(|e| e.to_string());

			CheckOutcome {
				file: display_name(input),
				error,
			}
		})
		.collect();

	let failed = outcomes.iter().filter(|outcome| outcome.error.is_some()).count();

	match format {
		OutputFormat::Json => {
			let files: Vec<serde_json::Value> = outcomes
				.iter()
				.map(|outcome| {
					match &outcome.error {
						Some(error) => {
							serde_json::json!({ "file": outcome.file, "ok": false, "error": error })
						}
						None => serde_json::json!({ "file": outcome.file, "ok": true }),
					}
				})
				.collect();
			let output = serde_json::json!({ "ok": failed == 0, "files": files });
			println!("{}", serde_json::to_string_pretty(&output)?);
		}
		OutputFormat::Text => {
			for outcome in &outcomes {
				match &outcome.error {
					Some(error) => {
						println!("{} {}: {error}", colored!("✗", red), outcome.file);
					}
					None => println!("{} {}", colored!("✓", green), outcome.file),
				}
			}

			if failed == 0 {
				println!("Check passed: {} note(s) convert cleanly.", outcomes.len());
			} else {
				println!(
					"{}",
					colored!(
						format!("Check failed: {failed} of {} note(s) did not convert.", outcomes.len()),
						red
					)
				);
			}
		}
	}

	if failed > 0 {
		process::exit(1);
	}

	Ok(())
}

fn run_ast(args: &GinkoCli, input: &Path) -> CliResult<()> {
	let converter = load_converter(args)?;
	let content = read_input(input)?;
	let ast = converter.parse(&content)?;
	println!("{}", serde_json::to_string_pretty(&ast)?);

	Ok(())
}

fn print_diff(current: &str, expected: &str) {
	let diff = TextDiff::from_lines(current, expected);
	for change in diff.iter_all_changes() {
		match change.tag() {
			ChangeTag::Delete => {
				eprint!("  {}", colored!(format!("-{change}"), red));
			}
			ChangeTag::Insert => {
				eprint!("  {}", colored!(format!("+{change}"), green));
			}
			ChangeTag::Equal => {
				eprint!("   {change}");
			}
		}
	}
}
