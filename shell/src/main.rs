use std::env;
use std::io;
use std::path::PathBuf;

use anyhow::Result;
use argh::FromArgs;
use tracing_subscriber::EnvFilter;

use shortcut::global::State;
use shortcut::shell::{Script, Shell, DEFAULT_PROMPT};
use shortcut::shortcut::ShortcutStore;

const SHORTCUT_DIR: &str = ".shortcuts";
const HISTORY_FILE: &str = ".shortcut_history";

#[derive(FromArgs)]
/// Run pipelines of programs; record what you type with `r`, save it with `s <name>`, replay it by name.
struct Args {
	/// text shown before each line
	#[argh(option, default = "String::from(DEFAULT_PROMPT)")]
	prompt: String,

	/// directory holding shortcut files (default: ~/.shortcuts)
	#[argh(option)]
	shortcut_dir: Option<PathBuf>,

	/// line editor history file (default: ~/.shortcut_history)
	#[argh(option)]
	history: Option<PathBuf>,

	/// run this line instead of reading the terminal; may be repeated
	#[argh(option, short = 'c')]
	command: Vec<String>,

	/// log debug information to stderr
	#[argh(switch, short = 'v')]
	verbose: bool,
}

fn init_logging(verbose: bool) {
	let filter = if verbose {
		EnvFilter::new("debug")
	} else {
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("error"))
	};
	tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).init();
}

fn in_home(name: &str) -> PathBuf {
	match dirs::home_dir() {
		Some(home) => home.join(name),
		None => PathBuf::from(name),
	}
}

fn main() -> Result<()> {
	let args: Args = argh::from_env();
	init_logging(args.verbose);

	// absolute, so that `cd` does not move the store
	let shortcut_dir = env::current_dir()?.join(args.shortcut_dir.unwrap_or_else(|| in_home(SHORTCUT_DIR)));
	let state = State::new(ShortcutStore::new(shortcut_dir));
	let mut shell = Shell::new(state, args.prompt);

	if !args.command.is_empty() {
		return shell.run(&mut Script::new(args.command));
	}
	shell.with_history(args.history.unwrap_or_else(|| in_home(HISTORY_FILE))).run_interactive()
}
