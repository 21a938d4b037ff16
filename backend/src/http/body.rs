//! Response body that completes the request's log event.
//!
//! The event is dispatched exactly once, when the body ends or is dropped.
//! If the payload was never handed to the transport (the connection went
//! away, or the server shut down first), the event is marked as a write
//! failure before it leaves.

use std::convert::Infallible;
use std::pin::Pin;
use std::task::{Context, Poll};

use axum::body::Bytes;
use http_body::{Body, Frame, SizeHint};

use crate::publisher::EventDispatcher;
use crate::services::RequestLog;

const DISCARDED_REASON: &str = "response body discarded before it was sent";

pub struct LoggedBody {
    data: Option<Bytes>,
    len: u64,
    log: Option<RequestLog>,
    dispatcher: EventDispatcher,
}

impl LoggedBody {
    /// Wrap `data`; an empty payload counts as written.
    pub fn new(data: Bytes, log: RequestLog, dispatcher: EventDispatcher) -> Self {
        let len = data.len() as u64;
        Self {
            data: (!data.is_empty()).then_some(data),
            len,
            log: Some(log),
            dispatcher,
        }
    }

    fn complete(&mut self) {
        let Some(mut log) = self.log.take() else {
            return;
        };
        if self.data.take().is_some() {
            log.record_write_failure(DISCARDED_REASON);
        }
        self.dispatcher.dispatch(log.finish());
    }
}

impl Body for LoggedBody {
    type Data = Bytes;
    type Error = Infallible;

    fn poll_frame(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        let this = self.get_mut();
        match this.data.take() {
            Some(data) => Poll::Ready(Some(Ok(Frame::data(data)))),
            None => {
                this.complete();
                Poll::Ready(None)
            }
        }
    }

    fn is_end_stream(&self) -> bool {
        self.data.is_none()
    }

    fn size_hint(&self) -> SizeHint {
        match self.data {
            Some(_) => SizeHint::with_exact(self.len),
            None => SizeHint::with_exact(0),
        }
    }
}

impl Drop for LoggedBody {
    fn drop(&mut self) {
        self.complete();
    }
}
