//! Response body tee.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::body::{Body, Bytes};
use bytes::BytesMut;
use http_body::{Frame, SizeHint};

use crate::capture::sink::{CaptureSink, ExchangeRecord};

/// Everything the finalize step needs besides the response bytes.
pub(crate) struct CaptureContext {
    pub uri: String,
    pub method: String,
    pub client_key: String,
    pub response_status: u16,
    pub request_body: Bytes,
    pub sink: Arc<dyn CaptureSink>,
}

/// Response body wrapper that copies every data frame into a capture
/// buffer while forwarding it unchanged.
///
/// The exchange record is emitted exactly once: at end-of-stream, on a
/// stream error, or from `Drop` if the body is discarded early (client
/// disconnect, timeout). An early drop records the bytes captured up to
/// that point.
pub struct TeeBody {
    inner: Body,
    captured: BytesMut,
    context: Option<CaptureContext>,
}

impl TeeBody {
    pub(crate) fn new(inner: Body, context: CaptureContext) -> Self {
        Self {
            inner,
            captured: BytesMut::new(),
            context: Some(context),
        }
    }

    fn finalize(&mut self) {
        if let Some(context) = self.context.take() {
            let record = ExchangeRecord {
                uri: context.uri,
                method: context.method,
                client_key: context.client_key,
                response_status: context.response_status,
                request_body: context.request_body,
                response_body: self.captured.split().freeze(),
            };
            context.sink.record(record);
        }
    }
}

impl http_body::Body for TeeBody {
    type Data = Bytes;
    type Error = axum::Error;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        let this = self.get_mut();
        match Pin::new(&mut this.inner).poll_frame(cx) {
            Poll::Ready(Some(Ok(frame))) => {
                if let Some(data) = frame.data_ref() {
                    this.captured.extend_from_slice(data);
                }
                Poll::Ready(Some(Ok(frame)))
            }
            Poll::Ready(Some(Err(err))) => {
                this.finalize();
                Poll::Ready(Some(Err(err)))
            }
            Poll::Ready(None) => {
                this.finalize();
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }

    fn is_end_stream(&self) -> bool {
        http_body::Body::is_end_stream(&self.inner)
    }

    fn size_hint(&self) -> SizeHint {
        http_body::Body::size_hint(&self.inner)
    }
}

impl Drop for TeeBody {
    fn drop(&mut self) {
        self.finalize();
    }
}
