use std::mem;

use nix::errno::Errno;
use nix::sys::signal::{self, Signal};
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::{self, ForkResult, Pid};
use tracing::{debug, warn};

use crate::error::ExecError;

/// Calls `f` again for as long as it is interrupted by a signal.
pub fn syscall<F, T>(f: F) -> nix::Result<T>
where
	F: Fn() -> nix::Result<T>,
{
	loop {
		match f() {
			Err(Errno::EINTR) => continue,
			other => return other,
		}
	}
}

/// How one stage's process ended.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum StageStatus {
	Exited(i32),
	Signaled(Signal),
}

impl StageStatus {
	fn from_wait(status: WaitStatus) -> Option<StageStatus> {
		match status {
			WaitStatus::Exited(_, code) => Some(StageStatus::Exited(code)),
			WaitStatus::Signaled(_, sig, _) => Some(StageStatus::Signaled(sig)),
			_ => None,
		}
	}

	/// Shell convention: a signal `n` reads as `128 + n`.
	pub fn code(self) -> i32 {
		match self {
			StageStatus::Exited(code) => code,
			StageStatus::Signaled(sig) => 128 + sig as i32,
		}
	}

	pub fn success(self) -> bool {
		self == StageStatus::Exited(0)
	}
}

fn wait_for(pid: Pid) -> Result<StageStatus, ExecError> {
	loop {
		let status = syscall(|| waitpid(pid, None)).map_err(|e| ExecError::Wait { pid: pid, source: e })?;
		if let Some(s) = StageStatus::from_wait(status) {
			debug!(%pid, code = s.code(), "reaped");
			return Ok(s);
		}
	}
}

/// Collects the children of a pipeline while it is being spawned.
///
/// Dropping a builder that was never built kills and reaps every child it
/// holds, so a pipeline that fails half way leaves nothing behind.
#[derive(Debug)]
pub struct JobBuilder {
	pids: Vec<Pid>,
}

impl JobBuilder {
	pub fn new(size_hint: usize) -> JobBuilder {
		JobBuilder { pids: Vec::with_capacity(size_hint) }
	}

	/// Forks and records the child's pid on the parent side.
	///
	/// # Safety
	///
	/// Same contract as `nix::unistd::fork`: the child may only perform
	/// async-signal-safe operations before it execs or `_exit`s.
	pub unsafe fn push_fork(&mut self) -> nix::Result<ForkResult> {
		let r = unistd::fork()?;
		if let ForkResult::Parent { child } = r {
			debug!(pid = %child, stage = self.pids.len(), "spawned");
			self.pids.push(child);
		}
		Ok(r)
	}

	pub fn len(&self) -> usize {
		self.pids.len()
	}

	pub fn is_empty(&self) -> bool {
		self.pids.is_empty()
	}

	pub fn build(mut self) -> Job {
		Job { pids: mem::take(&mut self.pids) }
	}
}

impl Drop for JobBuilder {
	fn drop(&mut self) {
		for &pid in &self.pids {
			let _ = signal::kill(pid, Signal::SIGKILL);
		}
		for &pid in &self.pids {
			if let Err(e) = wait_for(pid) {
				warn!(error = %e, "cannot reap abandoned stage");
			}
		}
	}
}

/// The processes of one spawned pipeline, in stage order.
#[derive(Debug)]
pub struct Job {
	pids: Vec<Pid>,
}

impl Job {
	pub fn pids(&self) -> &[Pid] {
		&self.pids
	}

	/// Blocks until every stage has terminated.
	pub fn wait(self) -> Result<Vec<StageStatus>, ExecError> {
		self.pids.iter().map(|&pid| wait_for(pid)).collect()
	}
}

/// Background pipelines nobody waits for.
#[derive(Debug, Default)]
pub struct JobSet {
	jobs: Vec<Job>,
}

impl JobSet {
	pub fn new() -> JobSet {
		JobSet::default()
	}

	pub fn push(&mut self, job: Job) {
		self.jobs.push(job);
	}

	/// Processes not yet reaped.
	pub fn running(&self) -> usize {
		self.jobs.iter().map(|job| job.pids.len()).sum()
	}

	/// Reaps whatever has finished without blocking; returns how many processes were collected.
	pub fn reap(&mut self) -> usize {
		let mut reaped = 0;
		for job in &mut self.jobs {
			job.pids.retain(|&pid| match syscall(|| waitpid(pid, Some(WaitPidFlag::WNOHANG))) {
				Ok(WaitStatus::StillAlive) => true,
				Ok(status) => match StageStatus::from_wait(status) {
					Some(s) => {
						debug!(%pid, code = s.code(), "background process finished");
						reaped += 1;
						false
					},
					None => true,
				},
				Err(e) => {
					warn!(%pid, error = %e, "cannot poll background process");
					false
				},
			});
		}
		self.jobs.retain(|job| !job.pids.is_empty());
		reaped
	}
}
