use std::mem;

/// Capture of entered lines for a new shortcut.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Recorder {
	#[default]
	Idle,
	Recording(Vec<String>),
}

impl Recorder {
	pub fn is_recording(&self) -> bool {
		matches!(self, Recorder::Recording(_))
	}

	/// Idle to Recording. Returns false if a recording is already running.
	pub fn start(&mut self) -> bool {
		if self.is_recording() {
			return false;
		}
		*self = Recorder::Recording(Vec::new());
		true
	}

	/// Recording to Idle, handing back the captured lines.
	pub fn stop(&mut self) -> Option<Vec<String>> {
		match mem::take(self) {
			Recorder::Recording(lines) => Some(lines),
			Recorder::Idle => None,
		}
	}

	pub fn record(&mut self, line: &str) {
		if let Recorder::Recording(lines) = self {
			lines.push(line.to_string());
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn records_only_while_recording() {
		let mut r = Recorder::default();
		r.record("ls");
		assert!(r.start());
		r.record("echo a");
		r.record("cd /tmp");
		assert_eq!(r.stop(), Some(vec!["echo a".to_string(), "cd /tmp".to_string()]));
		assert_eq!(r, Recorder::Idle);
		r.record("ls");
		assert_eq!(r.stop(), None);
	}

	#[test]
	fn start_twice_keeps_recording() {
		let mut r = Recorder::default();
		assert!(r.start());
		r.record("pwd");
		assert!(!r.start());
		assert_eq!(r.stop(), Some(vec!["pwd".to_string()]));
	}
}
