use std::{ffi, io};
use std::path::PathBuf;

use nix::unistd::Pid;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
	#[error("empty command in stage {stage}")]
	EmptyCommand { stage: usize },
}

/// Failures that abort one pipeline invocation. None of them is fatal to the shell.
#[derive(Debug, Error)]
pub enum ExecError {
	#[error("invalid pipeline: {0}")]
	Parse(#[from] ParseError),
	#[error("cannot create pipe: {0}")]
	Pipe(#[source] nix::Error),
	#[error("cannot fork: {0}")]
	Fork(#[source] nix::Error),
	#[error("argument contains a nul byte: {0}")]
	Nul(#[from] ffi::NulError),
	#[error("cannot wait for process {pid}: {source}")]
	Wait { pid: Pid, #[source] source: nix::Error },
}

#[derive(Debug, Error)]
pub enum ShortcutError {
	#[error("invalid shortcut name: {0:?}")]
	InvalidName(String),
	#[error("shortcut {name}: {source}")]
	Io { name: String, #[source] source: io::Error },
	#[error("cannot create shortcut directory {}: {source}", .dir.display())]
	CreateDir { dir: PathBuf, #[source] source: io::Error },
}
