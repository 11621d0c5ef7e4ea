//! One-shot adapter between the provider's `(result, status)` callbacks and
//! awaitable results

use futures::channel::oneshot;

use super::status::ServiceStatus;

/// What a provider callback delivers: an optional payload and a status code
pub type Settlement<T> = (Option<T>, ServiceStatus);

/// A call that never produced a provider status
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportFailure {
    /// The request could not be sent or the response could not be read
    #[error("{0}")]
    Network(String),

    /// A response arrived but was not a valid payload
    #[error("malformed response: {0}")]
    Malformed(String),
}

/// What travels over the reply channel
pub type ReplyOutcome<T> = std::result::Result<Settlement<T>, TransportFailure>;

/// The callback handed to a remote provider call. Sending consumes the
/// reply, so every call settles at most once.
#[derive(Debug)]
pub struct Reply<T> {
    tx: oneshot::Sender<ReplyOutcome<T>>,
}

/// The awaiting half of a [`Reply`]
pub type PendingReply<T> = oneshot::Receiver<ReplyOutcome<T>>;

impl<T> Reply<T> {
    pub fn channel() -> (Self, PendingReply<T>) {
        let (tx, rx) = oneshot::channel();
        (Self { tx }, rx)
    }

    /// Settles the call. Returns false when the caller stopped waiting.
    pub fn send(self, result: Option<T>, status: ServiceStatus) -> bool {
        self.tx.send(Ok((result, status))).is_ok()
    }

    pub fn ok(self, result: T) -> bool {
        self.send(Some(result), ServiceStatus::Ok)
    }

    pub fn fail(self, status: ServiceStatus) -> bool {
        self.send(None, status)
    }

    /// Settles a call the provider never answered
    pub fn abort(self, failure: TransportFailure) -> bool {
        self.tx.send(Err(failure)).is_ok()
    }

    /// True once the awaiting side has been dropped
    pub fn is_canceled(&self) -> bool {
        self.tx.is_canceled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reply_settles_once() {
        let (reply, rx) = Reply::<u32>::channel();
        assert!(reply.ok(5));
        let (result, status) = futures::executor::block_on(rx).unwrap().unwrap();
        assert_eq!(result, Some(5));
        assert!(status.is_ok());
    }

    #[test]
    fn test_abort_carries_no_status() {
        let (reply, rx) = Reply::<u32>::channel();
        assert!(reply.abort(TransportFailure::Malformed("expected value".into())));
        let outcome = futures::executor::block_on(rx).unwrap();
        assert_eq!(
            outcome,
            Err(TransportFailure::Malformed("expected value".into()))
        );
    }

    #[test]
    fn test_dropped_receiver_is_reported() {
        let (reply, rx) = Reply::<u32>::channel();
        drop(rx);
        assert!(reply.is_canceled());
        assert!(!reply.fail(ServiceStatus::UnknownError));
    }

    #[test]
    fn test_dropped_reply_cancels_receiver() {
        let (reply, rx) = Reply::<u32>::channel();
        drop(reply);
        assert!(futures::executor::block_on(rx).is_err());
    }
}
