use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::dispatch;
use crate::error::ShortcutError;
use crate::parser::PIPE_SEPARATOR;

/// A directory of shortcuts, one plain-text file per shortcut, one line per entry.
#[derive(Debug, Clone)]
pub struct ShortcutStore {
	dir: PathBuf,
}

/// A name is a single plain path component that could also be typed as a command.
///
/// The recorder's control words are taken: a shortcut under one of them could never be replayed.
pub fn is_valid_name(name: &str) -> bool {
	!name.is_empty()
		&& ![dispatch::EXIT, dispatch::START_RECORDING, dispatch::STOP_RECORDING].contains(&name)
		&& !name.starts_with('.')
		&& !name.contains(|c: char| c == '/' || c == '\0' || c == PIPE_SEPARATOR || c.is_whitespace())
}

impl ShortcutStore {
	pub fn new(dir: impl Into<PathBuf>) -> ShortcutStore {
		ShortcutStore { dir: dir.into() }
	}

	pub fn dir(&self) -> &Path {
		&self.dir
	}

	pub fn path(&self, name: &str) -> Result<PathBuf, ShortcutError> {
		if !is_valid_name(name) {
			return Err(ShortcutError::InvalidName(name.to_string()));
		}
		Ok(self.dir.join(name))
	}

	pub fn contains(&self, name: &str) -> bool {
		self.path(name).map_or(false, |p| p.is_file())
	}

	/// Writes `lines` as shortcut `name`, replacing any previous one.
	pub fn save(&self, name: &str, lines: &[String]) -> Result<PathBuf, ShortcutError> {
		let path = self.path(name)?;
		fs::create_dir_all(&self.dir)
			.map_err(|e| ShortcutError::CreateDir { dir: self.dir.clone(), source: e })?;
		let io_err = |e| ShortcutError::Io { name: name.to_string(), source: e };
		let mut w = BufWriter::new(File::create(&path).map_err(io_err)?);
		for line in lines {
			writeln!(w, "{}", line).map_err(io_err)?;
		}
		w.flush().map_err(io_err)?;
		debug!(name, lines = lines.len(), path = %path.display(), "saved shortcut");
		Ok(path)
	}

	/// Reads the lines worth replaying: anything of one byte or less once trimmed is dropped.
	pub fn load(&self, name: &str) -> Result<Vec<String>, ShortcutError> {
		let path = self.path(name)?;
		let bytes = fs::read(&path).map_err(|e| ShortcutError::Io { name: name.to_string(), source: e })?;
		Ok(String::from_utf8_lossy(&bytes)
			.lines()
			.filter(|line| line.trim().len() > 1)
			.map(str::to_string)
			.collect())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn lines(v: &[&str]) -> Vec<String> {
		v.iter().map(|s| s.to_string()).collect()
	}

	#[test]
	fn names() {
		assert!(is_valid_name("build"));
		assert!(is_valid_name("deploy-2"));
		assert!(!is_valid_name(""));
		assert!(!is_valid_name(".hidden"));
		assert!(!is_valid_name(".."));
		assert!(!is_valid_name("a/b"));
		assert!(!is_valid_name("a|b"));
		assert!(!is_valid_name("a b"));
		assert!(!is_valid_name("r"));
		assert!(!is_valid_name("s"));
		assert!(!is_valid_name("exit"));
		assert!(is_valid_name("rs"));
	}

	#[test]
	fn save_then_load() {
		let dir = tempfile::tempdir().unwrap();
		let store = ShortcutStore::new(dir.path().join("nested"));
		assert!(!store.contains("greet"));

		let path = store.save("greet", &lines(&["echo hi | tr a-z A-Z", "x", "", "  ", "pwd"])).unwrap();
		assert_eq!(path, dir.path().join("nested").join("greet"));
		assert!(store.contains("greet"));
		assert_eq!(store.load("greet").unwrap(), lines(&["echo hi | tr a-z A-Z", "pwd"]));
	}

	#[test]
	fn save_replaces() {
		let dir = tempfile::tempdir().unwrap();
		let store = ShortcutStore::new(dir.path());
		store.save("s1", &lines(&["ls -l", "pwd"])).unwrap();
		store.save("s1", &lines(&["date"])).unwrap();
		assert_eq!(store.load("s1").unwrap(), lines(&["date"]));
	}

	#[test]
	fn load_handles_crlf_files() {
		let dir = tempfile::tempdir().unwrap();
		fs::write(dir.path().join("win"), "echo one\r\n\r\necho two\r\n").unwrap();
		let store = ShortcutStore::new(dir.path());
		assert_eq!(store.load("win").unwrap(), lines(&["echo one", "echo two"]));
	}

	#[test]
	fn missing_and_invalid() {
		let dir = tempfile::tempdir().unwrap();
		let store = ShortcutStore::new(dir.path());
		assert!(matches!(store.load("nope"), Err(ShortcutError::Io { .. })));
		assert!(matches!(store.save("../escape", &[]), Err(ShortcutError::InvalidName(_))));
		assert!(!store.contains("../escape"));
	}
}
