use std::env;
use std::io::{self, Write};

use tracing::debug;

use crate::types::Pipeline;

/// Changes the shell's own working directory; a child's `chdir` would be lost.
pub fn builtin_cd(arguments: &[&str]) -> u8 {
	let dir = match arguments.get(1) {
		Some(&dir) => dir,
		None => return 0,
	};
	match env::set_current_dir(dir) {
		Ok(()) => {
			debug!(dir, "changed directory");
			0
		},
		Err(e) => {
			let _ = writeln!(&mut io::stderr(), "cd: {}: {}", dir, e);
			1
		},
	}
}

pub fn match_builtin(name: &str) -> Option<fn(&[&str]) -> u8> {
	match name {
		"cd" => Some(builtin_cd),
		_ => None,
	}
}

/// Runs a single-stage builtin in-process. Multi-stage pipelines are never intercepted.
pub fn intercept(pipeline: &Pipeline) -> Option<u8> {
	let command = pipeline.single()?;
	let builtin = match_builtin(command.program_name()?)?;
	Some(builtin(&command.arguments))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::parser::parse_pipeline;

	#[test]
	fn only_cd_is_builtin() {
		assert!(match_builtin("cd").is_some());
		assert!(match_builtin("ls").is_none());
		assert!(match_builtin("CD").is_none());
	}

	#[test]
	fn pipelines_are_not_intercepted() {
		assert_eq!(intercept(&parse_pipeline("cd / | cat")), None);
		assert_eq!(intercept(&parse_pipeline("ls")), None);
		assert_eq!(intercept(&parse_pipeline("")), None);
	}

	#[test]
	fn bare_cd_does_nothing() {
		let before = env::current_dir().unwrap();
		assert_eq!(intercept(&parse_pipeline("cd")), Some(0));
		assert_eq!(env::current_dir().unwrap(), before);
	}

	#[test]
	fn failed_cd_is_reported_not_fatal() {
		let before = env::current_dir().unwrap();
		assert_eq!(intercept(&parse_pipeline("cd /no/such/dir/for/shortcut")), Some(1));
		assert_eq!(env::current_dir().unwrap(), before);
	}
}
