use crate::job::JobSet;
use crate::record::Recorder;
use crate::shortcut::ShortcutStore;

pub struct State {
	pub job_set: JobSet,
	pub recorder: Recorder,
	pub shortcuts: ShortcutStore,
}

impl State {
	pub fn new(shortcuts: ShortcutStore) -> State {
		State { job_set: JobSet::new(), recorder: Recorder::default(), shortcuts: shortcuts }
	}
}
