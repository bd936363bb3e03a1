use std::collections::VecDeque;
use std::path::PathBuf;

use anyhow::Result;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing::{debug, warn};

use crate::dispatch::{self, Action};
use crate::eval;
use crate::global::State;
use crate::record::Recorder;
use crate::shortcut;

pub const DEFAULT_PROMPT: &str = "shortcut> ";
const NAME_PROMPT: &str = "name> ";

/// Where the shell loop gets its lines.
pub trait LineSource {
	/// `None` once input is exhausted.
	fn read_line(&mut self, prompt: &str) -> Result<Option<String>>;

	fn add_history(&mut self, _line: &str) {}
}

impl LineSource for DefaultEditor {
	fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
		loop {
			match self.readline(prompt) {
				Ok(line) => return Ok(Some(line)),
				// Ctrl-C drops the line being edited
				Err(ReadlineError::Interrupted) => continue,
				Err(ReadlineError::Eof) => return Ok(None),
				Err(e) => return Err(e.into()),
			}
		}
	}

	fn add_history(&mut self, line: &str) {
		let _ = self.add_history_entry(line);
	}
}

/// Fixed lines, as given with `-c`.
#[derive(Debug, Default)]
pub struct Script {
	lines: VecDeque<String>,
}

impl Script {
	pub fn new<I: IntoIterator<Item = String>>(lines: I) -> Script {
		Script { lines: lines.into_iter().collect() }
	}
}

impl LineSource for Script {
	fn read_line(&mut self, _prompt: &str) -> Result<Option<String>> {
		Ok(self.lines.pop_front())
	}
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Flow {
	Continue,
	Exit,
}

pub struct Shell {
	state: State,
	prompt: String,
	history: Option<PathBuf>,
}

impl Shell {
	pub fn new(state: State, prompt: impl Into<String>) -> Shell {
		Shell { state: state, prompt: prompt.into(), history: None }
	}

	pub fn with_history(mut self, path: PathBuf) -> Shell {
		self.history = Some(path);
		self
	}

	pub fn state(&self) -> &State {
		&self.state
	}

	/// Prompts on the terminal until `exit` or end of input.
	pub fn run_interactive(&mut self) -> Result<()> {
		let mut rl = DefaultEditor::new()?;
		if let Some(path) = &self.history {
			if let Err(e) = rl.load_history(path) {
				eprintln!("shortcut: unable to load history: {}", e);
			}
		}
		let r = self.run(&mut rl);
		if let Some(path) = &self.history {
			if let Err(e) = rl.save_history(path) {
				eprintln!("shortcut: unable to save history: {}", e);
			}
		}
		r
	}

	pub fn run(&mut self, source: &mut dyn LineSource) -> Result<()> {
		loop {
			self.state.job_set.reap();
			let line = match source.read_line(&self.prompt)? {
				Some(line) => line,
				None => break,
			};
			if !line.trim().is_empty() {
				source.add_history(line.trim());
			}
			if self.handle(&line, source)? == Flow::Exit {
				break;
			}
		}
		if self.state.recorder.stop().is_some() {
			warn!("recording discarded on exit");
		}
		Ok(())
	}

	/// Handles one line; only a failing `source` is an error.
	pub fn handle(&mut self, line: &str, source: &mut dyn LineSource) -> Result<Flow> {
		match dispatch::classify(line, &self.state.shortcuts) {
			Action::Empty => {},
			Action::Exit => return Ok(Flow::Exit),
			Action::StartRecording => {
				if !self.state.recorder.start() {
					eprintln!("shortcut: already recording");
				}
			},
			Action::StopRecording { name } => self.stop_recording(name, source)?,
			Action::Shortcut(name) => self.replay(name),
			Action::Pipeline(line) => {
				self.state.recorder.record(line);
				self.eval(line);
			},
		}
		Ok(Flow::Continue)
	}

	fn eval(&mut self, line: &str) {
		match eval::eval(&mut self.state, line) {
			Ok(result) => debug!(?result, "evaluated"),
			Err(e) => warn!(error = %e, "pipeline aborted"),
		}
	}

	/// Runs each stored line; while recording, the lines themselves are recorded.
	fn replay(&mut self, name: &str) {
		let lines = match self.state.shortcuts.load(name) {
			Ok(lines) => lines,
			Err(e) => {
				eprintln!("shortcut: {}", e);
				return;
			},
		};
		debug!(name, lines = lines.len(), "replaying");
		for line in &lines {
			self.state.recorder.record(line);
			self.eval(line);
		}
	}

	/// The recording is only given up once it is saved or the name is left empty.
	fn stop_recording(&mut self, name: Option<&str>, source: &mut dyn LineSource) -> Result<()> {
		if !self.state.recorder.is_recording() {
			eprintln!("shortcut: not recording");
			return Ok(());
		}
		let name = match name {
			Some(name) => name.to_string(),
			None => source.read_line(NAME_PROMPT)?.unwrap_or_default().trim().to_string(),
		};
		if name.is_empty() {
			self.state.recorder.stop();
			eprintln!("shortcut: recording discarded");
			return Ok(());
		}
		if !shortcut::is_valid_name(&name) {
			eprintln!("shortcut: invalid shortcut name: {:?}, still recording", name);
			return Ok(());
		}
		let lines = self.state.recorder.stop().unwrap_or_default();
		match self.state.shortcuts.save(&name, &lines) {
			Ok(path) => eprintln!("shortcut: saved {} ({} lines)", path.display(), lines.len()),
			Err(e) => {
				eprintln!("shortcut: {}, still recording", e);
				self.state.recorder = Recorder::Recording(lines);
			},
		}
		Ok(())
	}
}
