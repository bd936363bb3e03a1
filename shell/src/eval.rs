use std::ffi::CString;
use std::io::{self, Write};
use std::os::fd::{AsRawFd, OwnedFd};

use nix::fcntl::OFlag;
use nix::sys::signal::{self, SigHandler, Signal};
use nix::unistd::{self, ForkResult, Pid};
use tracing::debug;

use crate::builtin;
use crate::error::ExecError;
use crate::global;
use crate::job::{self, Job, JobBuilder, StageStatus};
use crate::parser;
use crate::types::Pipeline;

/// One end of a pipeline.
#[derive(Debug, Default)]
pub enum Stream {
	/// The shell's own stdin or stdout.
	#[default]
	Inherit,
	Fd(OwnedFd),
}

#[derive(Debug, Default)]
pub struct Streams {
	pub stdin: Stream,
	pub stdout: Stream,
}

#[derive(Debug, PartialEq, Eq)]
pub enum EvalResult {
	/// Nothing to run: the line was empty or had an empty stage.
	Skipped,
	/// Handled inside the shell; carries the builtin's status.
	Builtin(u8),
	/// Foreground pipeline, every stage reaped.
	Done(Vec<StageStatus>),
	/// Background pipeline, left running.
	Running(Vec<Pid>),
}

fn redirect(stream: &Stream, to: libc::c_int) {
	if let Stream::Fd(fd) = stream {
		if job::syscall(|| unistd::dup2(fd.as_raw_fd(), to)).is_err() {
			unsafe { libc::_exit(126) }
		}
	}
}

fn exec_stage(argv: &[CString], input: &Stream, output: &Stream, interrupts: SigHandler) -> ! {
	// the Rust runtime ignores SIGPIPE and exec would pass that on
	let _ = unsafe { signal::signal(Signal::SIGPIPE, SigHandler::SigDfl) };
	for &sig in &INTERRUPTS {
		let _ = unsafe { signal::signal(sig, interrupts) };
	}
	redirect(input, libc::STDIN_FILENO);
	redirect(output, libc::STDOUT_FILENO);
	let _ = unistd::execvp(&argv[0], argv);
	unsafe { libc::_exit(127) }
}

/// Terminal interrupts go to the whole process group, shell included.
const INTERRUPTS: [Signal; 2] = [Signal::SIGINT, Signal::SIGQUIT];

/// Ignores the interrupt signals until dropped, then puts the previous handlers back.
///
/// Held while a foreground pipeline runs so Ctrl-C ends the pipeline and not the shell.
pub struct IgnoreInterrupts {
	previous: Vec<(Signal, SigHandler)>,
}

impl IgnoreInterrupts {
	pub fn new() -> IgnoreInterrupts {
		// SAFETY: SigIgn installs no handler code.
		let previous = INTERRUPTS.iter()
			.filter_map(|&sig| unsafe { signal::signal(sig, SigHandler::SigIgn) }.ok().map(|h| (sig, h)))
			.collect();
		IgnoreInterrupts { previous: previous }
	}
}

impl Drop for IgnoreInterrupts {
	fn drop(&mut self) {
		for &(sig, handler) in &self.previous {
			// SAFETY: restores whatever was installed before new().
			let _ = unsafe { signal::signal(sig, handler) };
		}
	}
}

/// Forks one process per stage, each reading what the previous one writes.
///
/// The first stage reads `streams.stdin` and the last writes `streams.stdout`.
/// Every pipe is created before either of its ends is forked, and the parent
/// closes its copy of an end as soon as the child owning it exists.
/// Background stages keep ignoring SIGINT and SIGQUIT; foreground stages get
/// the default action.
pub fn spawn(pipeline: &Pipeline, streams: Streams) -> Result<Job, ExecError> {
	pipeline.check()?;
	let interrupts = if pipeline.runs_in_background() { SigHandler::SigIgn } else { SigHandler::SigDfl };

	let argvs = pipeline.stages.iter()
		.map(|c| c.arguments.iter().map(|&a| CString::new(a)).collect::<Result<Vec<_>, _>>())
		.collect::<Result<Vec<_>, _>>()?;
	let _ = io::stdout().flush();

	let n = argvs.len();
	let mut job_builder = JobBuilder::new(n);
	let mut input = streams.stdin;
	let mut last_output = Some(streams.stdout);
	for (i, argv) in argvs.iter().enumerate() {
		let (next_input, output) = if i + 1 < n {
			let (pipe_read, pipe_write) = unistd::pipe2(OFlag::O_CLOEXEC).map_err(ExecError::Pipe)?;
			(Stream::Fd(pipe_read), Stream::Fd(pipe_write))
		} else {
			(Stream::Inherit, last_output.take().unwrap_or_default())
		};
		// SAFETY: the child only calls signal, dup2, execvp and _exit.
		match unsafe { job_builder.push_fork() }.map_err(ExecError::Fork)? {
			ForkResult::Parent { .. } => {},
			ForkResult::Child => exec_stage(argv, &input, &output, interrupts),
		}
		drop(output);
		input = next_input;
	}
	Ok(job_builder.build())
}

/// Spawns `pipeline` and, unless it runs in the background, waits for all of it.
pub fn run(state: &mut global::State, pipeline: &Pipeline, streams: Streams) -> Result<EvalResult, ExecError> {
	if pipeline.runs_in_background() {
		let job = spawn(pipeline, streams)?;
		let pids = job.pids().to_vec();
		debug!(?pids, "running in background");
		state.job_set.push(job);
		Ok(EvalResult::Running(pids))
	} else {
		let _interrupts = IgnoreInterrupts::new();
		let job = spawn(pipeline, streams)?;
		Ok(EvalResult::Done(job.wait()?))
	}
}

pub fn eval_with(state: &mut global::State, line: &str, streams: Streams) -> Result<EvalResult, ExecError> {
	let pipeline = match parser::parse(line) {
		Ok(pipeline) => pipeline,
		Err(e) => {
			debug!(error = %e, "skipped");
			return Ok(EvalResult::Skipped);
		},
	};
	if let Some(s) = builtin::intercept(&pipeline) {
		return Ok(EvalResult::Builtin(s));
	}
	run(state, &pipeline, streams)
}

/// Evaluates one line against the shell's own stdin and stdout.
pub fn eval(state: &mut global::State, line: &str) -> Result<EvalResult, ExecError> {
	eval_with(state, line, Streams::default())
}
