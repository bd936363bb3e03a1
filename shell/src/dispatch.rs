use crate::builtin;
use crate::parser::Tokens;
use crate::shortcut::ShortcutStore;

pub const EXIT: &str = "exit";
pub const START_RECORDING: &str = "r";
pub const STOP_RECORDING: &str = "s";

/// What the shell loop should do with one line.
#[derive(Debug, PartialEq, Eq)]
pub enum Action<'a> {
	Empty,
	Exit,
	StartRecording,
	/// `s` or `s <name>`.
	StopRecording { name: Option<&'a str> },
	Shortcut(&'a str),
	Pipeline(&'a str),
}

/// Control words first, then a lone word naming a stored shortcut, then a pipeline.
///
/// Builtins win over shortcuts of the same name.
pub fn classify<'a>(line: &'a str, shortcuts: &ShortcutStore) -> Action<'a> {
	let mut tokens = Tokens::new(line);
	let first = match tokens.next() {
		Some(first) => first,
		None => return Action::Empty,
	};
	match (first, tokens.next(), tokens.next()) {
		(EXIT, None, _) => Action::Exit,
		(START_RECORDING, None, _) => Action::StartRecording,
		(STOP_RECORDING, name, None) => Action::StopRecording { name: name },
		(name, None, _) if builtin::match_builtin(name).is_none() && shortcuts.contains(name) => Action::Shortcut(name),
		_ => Action::Pipeline(line),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn store_with(names: &[&str]) -> (tempfile::TempDir, ShortcutStore) {
		let dir = tempfile::tempdir().unwrap();
		let store = ShortcutStore::new(dir.path());
		for name in names {
			store.save(name, &["echo saved".to_string()]).unwrap();
		}
		(dir, store)
	}

	#[test]
	fn control_words() {
		let (_dir, store) = store_with(&[]);
		assert_eq!(classify("", &store), Action::Empty);
		assert_eq!(classify(" \t\n", &store), Action::Empty);
		assert_eq!(classify("exit\n", &store), Action::Exit);
		assert_eq!(classify("  r ", &store), Action::StartRecording);
		assert_eq!(classify("s", &store), Action::StopRecording { name: None });
		assert_eq!(classify("s build", &store), Action::StopRecording { name: Some("build") });
	}

	#[test]
	fn control_words_with_more_tokens_are_pipelines() {
		let (_dir, store) = store_with(&[]);
		assert_eq!(classify("r -f x", &store), Action::Pipeline("r -f x"));
		assert_eq!(classify("s a b", &store), Action::Pipeline("s a b"));
		assert_eq!(classify("exit 1", &store), Action::Pipeline("exit 1"));
	}

	#[test]
	fn shortcuts() {
		let (_dir, store) = store_with(&["greet", "cd"]);
		assert_eq!(classify("greet", &store), Action::Shortcut("greet"));
		assert_eq!(classify("greet now", &store), Action::Pipeline("greet now"));
		assert_eq!(classify("greet | cat", &store), Action::Pipeline("greet | cat"));
		assert_eq!(classify("cd", &store), Action::Pipeline("cd"));
		assert_eq!(classify("ls", &store), Action::Pipeline("ls"));
	}
}
