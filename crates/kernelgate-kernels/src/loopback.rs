//! In-process loopback kernel.
//!
//! A [`LoopbackKernelConnection`] speaks the envelope protocol without any
//! real compute backend: it acknowledges connects with an `idle` status,
//! answers `execute_request` with a busy/reply/idle sequence that echoes the
//! received code, and records every inbound frame. That makes it usable both
//! as the demo backend for the gateway binary and as the observable far end
//! in tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use kernelgate_core::{Envelope, Frame, MSG_TYPE_EXECUTE_REQUEST};
use parking_lot::Mutex;
use serde_json::json;
use tracing::debug;

use crate::connection::{ConnectionFactory, KernelConnection, OutboundSender};
use crate::errors::KernelsError;
use crate::manager::Kernel;

/// Relay handle backed by an in-process echo kernel.
pub struct LoopbackKernelConnection {
    kernel: Arc<Kernel>,
    preferred: Option<String>,
    session: Mutex<Option<String>>,
    outbound: Mutex<Option<OutboundSender>>,
    received: Mutex<Vec<Frame>>,
    execution_count: AtomicU64,
}

impl LoopbackKernelConnection {
    /// Create an unconnected loopback handle for `kernel`.
    #[must_use]
    pub fn new(kernel: Arc<Kernel>, preferred: Option<String>) -> Self {
        Self {
            kernel,
            preferred,
            session: Mutex::new(None),
            outbound: Mutex::new(None),
            received: Mutex::new(Vec::new()),
            execution_count: AtomicU64::new(0),
        }
    }

    /// Every inbound frame seen so far, in arrival order.
    #[must_use]
    pub fn received(&self) -> Vec<Frame> {
        self.received.lock().clone()
    }

    /// Whether the kernel-side channel is currently open.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.outbound.lock().is_some()
    }

    fn status_message(&self, state: &str) -> String {
        json!({
            "header": {
                "msg_type": "status",
                "session": self.session.lock().clone(),
            },
            "content": { "execution_state": state },
        })
        .to_string()
    }

    async fn emit(&self, text: String) {
        let sender = self.outbound.lock().clone();
        if let Some(tx) = sender {
            let _ = tx.send(Frame::Text(text)).await;
        }
    }

    async fn answer_execute(&self, request: &Envelope) {
        let count = self.execution_count.fetch_add(1, Ordering::Relaxed) + 1;
        let reply = json!({
            "header": {
                "msg_type": "execute_reply",
                "session": self.session.lock().clone(),
            },
            "parent_header": request.as_value().get("header"),
            "content": {
                "status": "ok",
                "execution_count": count,
                // Echoed so the far side of the relay is observable.
                "code": request.code(),
            },
        });
        self.emit(self.status_message("busy")).await;
        self.emit(reply.to_string()).await;
        self.emit(self.status_message("idle")).await;
    }
}

#[async_trait]
impl KernelConnection for LoopbackKernelConnection {
    fn preferred_subprotocol(&self) -> Option<String> {
        self.preferred.clone()
    }

    fn set_session(&self, session_id: String) {
        *self.session.lock() = Some(session_id);
    }

    async fn connect(&self, outbound: OutboundSender) -> Result<(), KernelsError> {
        {
            let mut slot = self.outbound.lock();
            if slot.is_some() {
                return Err(KernelsError::ConnectFailed {
                    reason: "already connected".into(),
                });
            }
            *slot = Some(outbound);
        }
        debug!(kernel_id = %self.kernel.id, "loopback kernel connected");
        // The loopback kernel is ready immediately.
        self.emit(self.status_message("idle")).await;
        Ok(())
    }

    async fn handle_incoming(&self, frame: Frame) {
        self.received.lock().push(frame.clone());

        let Some(text) = frame.as_text() else {
            // Binary traffic has no meaning to the echo kernel.
            return;
        };
        let Ok(envelope) = Envelope::parse(text) else {
            return;
        };
        match envelope.msg_type() {
            Some(MSG_TYPE_EXECUTE_REQUEST) => self.answer_execute(&envelope).await,
            Some("kernel_info_request") => {
                let reply = json!({
                    "header": {
                        "msg_type": "kernel_info_reply",
                        "session": self.session.lock().clone(),
                    },
                    "parent_header": envelope.as_value().get("header"),
                    "content": {
                        "status": "ok",
                        "implementation": "loopback",
                        "kernel_name": self.kernel.name,
                    },
                });
                self.emit(reply.to_string()).await;
            }
            _ => {}
        }
    }

    async fn disconnect(&self) {
        let _ = self.outbound.lock().take();
        debug!(kernel_id = %self.kernel.id, "loopback kernel disconnected");
    }
}

/// Factory producing [`LoopbackKernelConnection`] handles.
#[derive(Default)]
pub struct LoopbackConnectionFactory {
    preferred: Option<String>,
}

impl LoopbackConnectionFactory {
    /// Factory whose connections express no stored preference (the gateway
    /// falls back to the v1 sub-protocol).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the sub-protocol preference handed to every created connection.
    #[must_use]
    pub fn with_preferred_subprotocol(mut self, preferred: Option<String>) -> Self {
        self.preferred = preferred;
        self
    }
}

impl ConnectionFactory for LoopbackConnectionFactory {
    fn create(&self, kernel: Arc<Kernel>) -> Arc<dyn KernelConnection> {
        Arc::new(LoopbackKernelConnection::new(kernel, self.preferred.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kernelgate_core::KernelId;
    use tokio::sync::mpsc;

    fn loopback() -> LoopbackKernelConnection {
        let kernel = Arc::new(Kernel {
            id: KernelId::generate(),
            name: "python3".into(),
        });
        LoopbackKernelConnection::new(kernel, None)
    }

    #[tokio::test]
    async fn connect_reports_idle() {
        let conn = loopback();
        let (tx, mut rx) = mpsc::channel(8);
        conn.connect(tx).await.unwrap();
        assert!(conn.is_connected());

        let frame = rx.recv().await.unwrap();
        let env = Envelope::parse(frame.as_text().unwrap()).unwrap();
        assert_eq!(env.msg_type(), Some("status"));
        assert_eq!(env.as_value()["content"]["execution_state"], "idle");
    }

    #[tokio::test]
    async fn second_connect_fails() {
        let conn = loopback();
        let (tx, _rx) = mpsc::channel(8);
        conn.connect(tx.clone()).await.unwrap();
        assert!(conn.connect(tx).await.is_err());
    }

    #[tokio::test]
    async fn execute_request_gets_busy_reply_idle() {
        let conn = loopback();
        let (tx, mut rx) = mpsc::channel(8);
        conn.connect(tx).await.unwrap();
        let _ = rx.recv().await; // initial idle

        conn.handle_incoming(Frame::Text(
            r#"{"header":{"msg_type":"execute_request"},"content":{"code":"1+1"}}"#.into(),
        ))
        .await;

        let busy = Envelope::parse(rx.recv().await.unwrap().as_text().unwrap()).unwrap();
        assert_eq!(busy.as_value()["content"]["execution_state"], "busy");

        let reply = Envelope::parse(rx.recv().await.unwrap().as_text().unwrap()).unwrap();
        assert_eq!(reply.msg_type(), Some("execute_reply"));
        assert_eq!(reply.as_value()["content"]["code"], "1+1");
        assert_eq!(reply.as_value()["content"]["execution_count"], 1);

        let idle = Envelope::parse(rx.recv().await.unwrap().as_text().unwrap()).unwrap();
        assert_eq!(idle.as_value()["content"]["execution_state"], "idle");
    }

    #[tokio::test]
    async fn execution_count_increments() {
        let conn = loopback();
        let (tx, mut rx) = mpsc::channel(16);
        conn.connect(tx).await.unwrap();
        let _ = rx.recv().await;

        for _ in 0..2 {
            conn.handle_incoming(Frame::Text(
                r#"{"header":{"msg_type":"execute_request"},"content":{"code":"x"}}"#.into(),
            ))
            .await;
        }
        let mut counts = Vec::new();
        for _ in 0..6 {
            let frame = rx.recv().await.unwrap();
            let env = Envelope::parse(frame.as_text().unwrap()).unwrap();
            if env.msg_type() == Some("execute_reply") {
                counts.push(env.as_value()["content"]["execution_count"].clone());
            }
        }
        assert_eq!(counts, vec![serde_json::json!(1), serde_json::json!(2)]);
    }

    #[tokio::test]
    async fn kernel_info_request_answered() {
        let conn = loopback();
        let (tx, mut rx) = mpsc::channel(8);
        conn.connect(tx).await.unwrap();
        let _ = rx.recv().await;

        conn.handle_incoming(Frame::Text(
            r#"{"header":{"msg_type":"kernel_info_request"},"content":{}}"#.into(),
        ))
        .await;

        let reply = Envelope::parse(rx.recv().await.unwrap().as_text().unwrap()).unwrap();
        assert_eq!(reply.msg_type(), Some("kernel_info_reply"));
        assert_eq!(reply.as_value()["content"]["kernel_name"], "python3");
    }

    #[tokio::test]
    async fn binary_frames_recorded_but_unanswered() {
        let conn = loopback();
        let (tx, mut rx) = mpsc::channel(8);
        conn.connect(tx).await.unwrap();
        let _ = rx.recv().await;

        conn.handle_incoming(Frame::Binary(vec![1, 2, 3])).await;
        assert_eq!(conn.received(), vec![Frame::Binary(vec![1, 2, 3])]);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn disconnect_closes_channel() {
        let conn = loopback();
        let (tx, _rx) = mpsc::channel(8);
        conn.connect(tx).await.unwrap();
        conn.disconnect().await;
        assert!(!conn.is_connected());
    }

    #[tokio::test]
    async fn handle_incoming_before_connect_is_safe() {
        let conn = loopback();
        conn.handle_incoming(Frame::Text("not json".into())).await;
        assert_eq!(conn.received().len(), 1);
    }

    #[tokio::test]
    async fn session_appears_in_replies() {
        let conn = loopback();
        conn.set_session("sess-1".into());
        let (tx, mut rx) = mpsc::channel(8);
        conn.connect(tx).await.unwrap();

        let frame = rx.recv().await.unwrap();
        let env = Envelope::parse(frame.as_text().unwrap()).unwrap();
        assert_eq!(env.as_value()["header"]["session"], "sess-1");
    }

    #[test]
    fn factory_passes_preference() {
        let kernel = Arc::new(Kernel {
            id: KernelId::generate(),
            name: "python3".into(),
        });
        let factory =
            LoopbackConnectionFactory::new().with_preferred_subprotocol(Some("custom.v2".into()));
        let conn = factory.create(kernel);
        assert_eq!(conn.preferred_subprotocol(), Some("custom.v2".into()));
    }

    #[test]
    fn default_factory_has_no_preference() {
        let kernel = Arc::new(Kernel {
            id: KernelId::generate(),
            name: "python3".into(),
        });
        let conn = LoopbackConnectionFactory::new().create(kernel);
        assert_eq!(conn.preferred_subprotocol(), None);
    }
}
