//! Scramble generation on a dedicated thread.
//!
//! Requests go over a channel to a named worker thread; answers come back on
//! the response channel the orchestrator pumps. A request the worker cannot
//! serve is logged and never answered, so its pairing slot stays open.

use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

use tracing::{debug, warn};

use cubetime_core::scramble::{
    PortError, ResponseSender, ScramblePort, ScrambleRequest, ScrambleResponse,
};

use crate::generator::Generator;

/// Handle to the worker thread. Dropping it stops the thread.
pub struct ScrambleWorker {
    requests: Option<Sender<ScrambleRequest>>,
    handle: Option<JoinHandle<()>>,
}

impl ScrambleWorker {
    /// Spawn the worker thread.
    pub fn spawn(seed: u64, responses: ResponseSender) -> io::Result<Self> {
        let (tx, rx) = mpsc::channel();
        let handle = thread::Builder::new()
            .name("cubetime-scramble".to_string())
            .spawn(move || Self::serve(Generator::new(seed), rx, responses))?;

        Ok(Self {
            requests: Some(tx),
            handle: Some(handle),
        })
    }

    fn serve(
        mut generator: Generator,
        requests: Receiver<ScrambleRequest>,
        responses: ResponseSender,
    ) {
        debug!("scramble worker started");
        for request in requests {
            let scramble = match generator.generate(&request.puzzle_kind) {
                Ok(scramble) => scramble,
                Err(err) => {
                    warn!(
                        command_id = %request.command_id,
                        error = %err,
                        "scramble generation failed"
                    );
                    continue;
                }
            };
            let response = ScrambleResponse {
                command_id: request.command_id,
                scramble,
            };
            if responses.send(response).is_err() {
                debug!("response channel closed, scramble worker exiting");
                return;
            }
        }
        debug!("scramble worker stopped");
    }

    /// Stop accepting requests and wait for the thread to finish.
    pub fn shutdown(&mut self) {
        self.requests.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("scramble worker panicked");
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl ScramblePort for ScrambleWorker {
    fn post(&mut self, request: ScrambleRequest) -> Result<(), PortError> {
        let requests = self.requests.as_ref().ok_or(PortError::Disconnected)?;
        requests.send(request).map_err(|_| PortError::Disconnected)
    }
}

impl Drop for ScrambleWorker {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cubetime_core::id::CommandId;
    use cubetime_core::scramble::scramble_channel;
    use std::time::Duration;

    const WAIT: Duration = Duration::from_secs(5);

    #[test]
    fn answers_each_request_by_id() {
        let (tx, rx) = scramble_channel();
        let mut worker = ScrambleWorker::spawn(3, tx).unwrap();
        worker.post(ScrambleRequest::random(CommandId(0), "333")).unwrap();
        worker.post(ScrambleRequest::random(CommandId(1), "minx")).unwrap();

        let first = rx.recv_timeout(WAIT).unwrap();
        let second = rx.recv_timeout(WAIT).unwrap();
        assert_eq!(first.command_id, CommandId(0));
        assert_eq!(second.command_id, CommandId(1));
        assert!(second.scramble.contains("<br>"));
    }

    #[test]
    fn failed_request_gets_no_answer_and_worker_survives() {
        let (tx, rx) = scramble_channel();
        let mut worker = ScrambleWorker::spawn(3, tx).unwrap();
        worker.post(ScrambleRequest::random(CommandId(0), "clock")).unwrap();
        worker.post(ScrambleRequest::random(CommandId(1), "222")).unwrap();

        let response = rx.recv_timeout(WAIT).unwrap();
        assert_eq!(response.command_id, CommandId(1));
        assert!(worker.is_running());
    }

    #[test]
    fn matches_inline_generation_for_the_same_seed() {
        let (tx, rx) = scramble_channel();
        let mut worker = ScrambleWorker::spawn(77, tx).unwrap();
        worker.post(ScrambleRequest::random(CommandId(0), "444")).unwrap();
        let response = rx.recv_timeout(WAIT).unwrap();

        let expected = Generator::new(77).generate("444").unwrap();
        assert_eq!(response.scramble, expected);
    }

    #[test]
    fn post_after_shutdown_is_disconnected() {
        let (tx, _rx) = scramble_channel();
        let mut worker = ScrambleWorker::spawn(0, tx).unwrap();
        worker.shutdown();
        assert!(!worker.is_running());
        assert_eq!(
            worker.post(ScrambleRequest::random(CommandId(0), "333")),
            Err(PortError::Disconnected)
        );
    }
}
