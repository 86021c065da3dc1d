//! Vision process adapter.
//!
//! Spawns the breed detector as a child process and hands its stdout to
//! the gating loop as a line reader. The child's stderr is inherited so
//! model warnings reach the operator instead of filling a pipe.

use std::io::BufReader;
use std::process::{Child, ChildStdout, Command, ExitStatus, Stdio};

use log::{info, warn};

use crate::error::Error;

pub struct DetectorProcess {
    child: Child,
    program: String,
}

impl DetectorProcess {
    /// Start `program args...`. Failure here is fatal to the daemon.
    pub fn spawn(program: &str, args: &[String]) -> Result<Self, Error> {
        let child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| Error::Detector(format!("cannot start '{program}': {e}")))?;
        info!("detector: started '{}' (pid {})", program, child.id());
        Ok(Self {
            child,
            program: program.to_owned(),
        })
    }

    /// Take the detector's stdout. Only the first call returns a reader.
    pub fn take_output(&mut self) -> Result<BufReader<ChildStdout>, Error> {
        self.child
            .stdout
            .take()
            .map(BufReader::new)
            .ok_or_else(|| Error::Detector("detector stdout already taken".into()))
    }

    /// Stop the child early, e.g. when its stream failed mid-run.
    /// Follow with [`wait`](Self::wait) to reap it.
    pub fn kill(&mut self) -> Result<(), Error> {
        warn!("detector: killing '{}' (pid {})", self.program, self.child.id());
        self.child
            .kill()
            .map_err(|e| Error::Detector(format!("kill '{}': {e}", self.program)))
    }

    /// Reap the child after its output closed.
    pub fn wait(mut self) -> Result<ExitStatus, Error> {
        let status = self
            .child
            .wait()
            .map_err(|e| Error::Detector(format!("wait for '{}': {e}", self.program)))?;
        if status.success() {
            info!("detector: '{}' exited cleanly", self.program);
        } else {
            warn!("detector: '{}' exited with {}", self.program, status);
        }
        Ok(status)
    }
}
