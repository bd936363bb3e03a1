use crate::error::ParseError;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Command<'a> {
	/// argv, including the program name at index 0.
	pub arguments: Vec<&'a str>,
	pub runs_in_background: bool,
}

impl<'a> Command<'a> {
	pub fn program_name(&self) -> Option<&'a str> {
		self.arguments.first().copied()
	}
}

/// Commands connected stdout-to-stdin, left to right.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pipeline<'a> {
	pub stages: Vec<Command<'a>>,
}

impl<'a> Pipeline<'a> {
	/// Only the last stage's marker counts; backgrounding applies to the whole pipeline.
	pub fn runs_in_background(&self) -> bool {
		self.stages.last().map_or(false, |c| c.runs_in_background)
	}

	pub fn is_valid(&self) -> bool {
		self.check().is_ok()
	}

	/// Fails at the first stage without a program name; no stages at all counts as stage 0.
	pub fn check(&self) -> Result<(), ParseError> {
		if self.stages.is_empty() {
			return Err(ParseError::EmptyCommand { stage: 0 });
		}
		match self.stages.iter().position(|c| c.program_name().is_none()) {
			Some(stage) => Err(ParseError::EmptyCommand { stage: stage }),
			None => Ok(()),
		}
	}

	/// The stage of a single-command pipeline.
	pub fn single(&self) -> Option<&Command<'a>> {
		match self.stages.as_slice() {
			[command] => Some(command),
			_ => None,
		}
	}
}
