use tracing::debug;

use crate::error::ParseError;
use crate::types::*;

type ParseResult<T> = Result<T, ParseError>;

/// Lines and segments longer than this are cut; recorded shortcuts rely on it.
pub const MAX_COMMAND_BYTES: usize = 1024;

pub const BACKGROUND_MARKER: &str = "&";

pub const PIPE_SEPARATOR: char = '|';

/// Cursor over a segment yielding delimiter-separated tokens.
///
/// Runs of delimiters collapse, so no token is ever empty. There is no
/// quoting: a delimiter always splits.
#[derive(Debug, Clone)]
pub struct Tokens<'a> {
	line: &'a str,
	i: usize,
}

impl<'a> Tokens<'a> {
	pub fn new(line: &'a str) -> Tokens<'a> {
		Tokens { line: line, i: 0 }
	}

	fn proceed_while<F>(&mut self, f: F) where F: Fn(u8) -> bool {
		while let Some(&c) = self.line.as_bytes().get(self.i) {
			if !f(c) { break; }
			self.i += 1;
		}
	}

	pub fn is_delimiter(c: u8) -> bool {
		matches!(c, b' ' | b'\t' | b'\n' | b'\r')
	}

	fn is_letter(c: u8) -> bool {
		!Tokens::is_delimiter(c)
	}
}

impl<'a> Iterator for Tokens<'a> {
	type Item = &'a str;

	fn next(&mut self) -> Option<&'a str> {
		self.proceed_while(Tokens::is_delimiter);
		let orig = self.i;
		self.proceed_while(Tokens::is_letter);
		// delimiters are ASCII, so both ends sit on char boundaries
		if orig == self.i {
			None
		} else {
			Some(&self.line[orig .. self.i])
		}
	}
}

/// Cuts `line` to at most `MAX_COMMAND_BYTES`, backing off to a char boundary.
pub fn truncate(line: &str) -> &str {
	if line.len() <= MAX_COMMAND_BYTES {
		return line;
	}
	let mut end = MAX_COMMAND_BYTES;
	while !line.is_char_boundary(end) {
		end -= 1;
	}
	&line[.. end]
}

pub fn parse_command<'a>(segment: &'a str) -> Command<'a> {
	let mut arguments: Vec<&'a str> = Tokens::new(truncate(segment)).collect();
	let mut runs_in_background = false;
	if arguments.last() == Some(&BACKGROUND_MARKER) {
		arguments.pop();
		runs_in_background = true;
	}
	Command { arguments: arguments, runs_in_background: runs_in_background }
}

/// Builds one stage per `|`-separated segment; `k` pipes always give `k + 1` stages.
pub fn parse_pipeline<'a>(line: &'a str) -> Pipeline<'a> {
	let stages = truncate(line).split(PIPE_SEPARATOR).map(parse_command).collect();
	Pipeline { stages: stages }
}

/// Parses and rejects pipelines that must never reach the executor.
pub fn parse<'a>(line: &'a str) -> ParseResult<Pipeline<'a>> {
	let pipeline = parse_pipeline(line);
	if let Err(e) = pipeline.check() {
		debug!(error = %e, "rejected");
		return Err(e);
	}
	debug!(?pipeline, "parsed");
	Ok(pipeline)
}
