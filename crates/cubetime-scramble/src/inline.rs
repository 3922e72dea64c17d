//! In-thread scramble port.
//!
//! Generates during `post` and puts the response straight onto the response
//! channel. Nothing reaches the orchestrator until the host pumps, so the
//! exchange is still asynchronous from the core's point of view.

use tracing::{debug, warn};

use cubetime_core::scramble::{
    PortError, ResponseSender, ScramblePort, ScrambleRequest, ScrambleResponse,
};

use crate::generator::Generator;

/// Scramble port that answers on the caller's thread.
pub struct InlineScrambler {
    generator: Generator,
    responses: ResponseSender,
    reorder_window: usize,
    held: Vec<ScrambleResponse>,
}

impl InlineScrambler {
    pub fn new(seed: u64, responses: ResponseSender) -> Self {
        Self {
            generator: Generator::new(seed),
            responses,
            reorder_window: 1,
            held: Vec::new(),
        }
    }

    /// Hold responses until `window` have accumulated, then send them newest
    /// first. Values of 0 and 1 answer immediately.
    pub fn with_reorder_window(mut self, window: usize) -> Self {
        self.reorder_window = window.max(1);
        self
    }

    /// Responses generated but not yet sent.
    pub fn held(&self) -> usize {
        self.held.len()
    }

    /// Send every held response, newest first.
    pub fn flush(&mut self) -> Result<(), PortError> {
        while let Some(response) = self.held.pop() {
            self.responses
                .send(response)
                .map_err(|_| PortError::Disconnected)?;
        }
        Ok(())
    }
}

impl ScramblePort for InlineScrambler {
    fn post(&mut self, request: ScrambleRequest) -> Result<(), PortError> {
        let scramble = self
            .generator
            .generate(&request.puzzle_kind)
            .map_err(|err| {
                warn!(command_id = %request.command_id, error = %err, "scramble rejected");
                PortError::Rejected {
                    command_id: request.command_id,
                    reason: err.to_string(),
                }
            })?;
        debug!(command_id = %request.command_id, "scramble generated inline");

        self.held.push(ScrambleResponse {
            command_id: request.command_id,
            scramble,
        });
        if self.held.len() >= self.reorder_window {
            self.flush()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cubetime_core::id::CommandId;
    use cubetime_core::scramble::scramble_channel;
    use tracing_test::traced_test;

    #[test]
    fn answers_immediately_by_default() {
        let (tx, rx) = scramble_channel();
        let mut port = InlineScrambler::new(1, tx);
        port.post(ScrambleRequest::random(CommandId(0), "333")).unwrap();

        let response = rx.try_recv().unwrap();
        assert_eq!(response.command_id, CommandId(0));
        assert_eq!(response.scramble.split(' ').count(), 25);
    }

    #[test]
    fn reorder_window_reverses_a_batch() {
        let (tx, rx) = scramble_channel();
        let mut port = InlineScrambler::new(1, tx).with_reorder_window(3);
        for id in 0..3 {
            port.post(ScrambleRequest::random(CommandId(id), "222")).unwrap();
            if id < 2 {
                assert!(rx.try_recv().is_err());
            }
        }
        let ids: Vec<u64> = rx.try_iter().map(|r| r.command_id.0).collect();
        assert_eq!(ids, vec![2, 1, 0]);
        assert_eq!(port.held(), 0);
    }

    #[test]
    fn flush_sends_a_partial_batch() {
        let (tx, rx) = scramble_channel();
        let mut port = InlineScrambler::new(1, tx).with_reorder_window(4);
        port.post(ScrambleRequest::random(CommandId(7), "skewb")).unwrap();
        port.flush().unwrap();
        assert_eq!(rx.try_recv().unwrap().command_id, CommandId(7));
    }

    #[test]
    #[traced_test]
    fn unknown_puzzle_is_rejected() {
        let (tx, rx) = scramble_channel();
        let mut port = InlineScrambler::new(1, tx);
        let err = port
            .post(ScrambleRequest::random(CommandId(4), "clock"))
            .unwrap_err();
        assert!(matches!(err, PortError::Rejected { command_id: CommandId(4), .. }));
        assert!(rx.try_recv().is_err());
        assert!(logs_contain("scramble rejected"));
    }

    #[test]
    fn dropped_receiver_is_disconnected() {
        let (tx, rx) = scramble_channel();
        drop(rx);
        let mut port = InlineScrambler::new(1, tx);
        assert_eq!(
            port.post(ScrambleRequest::random(CommandId(0), "333")),
            Err(PortError::Disconnected)
        );
    }
}
