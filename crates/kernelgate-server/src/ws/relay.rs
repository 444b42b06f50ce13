//! Relay lifecycle — one task per admitted connection.
//!
//! `Idle → Connecting → Active → Closed`, with no path back. Connecting
//! starts right after the handshake and is never retried; Active pumps
//! frames both ways; Closed fires exactly one disconnect on the relay
//! handle, whether closure came from the client, the transport, or a
//! connect failure.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use axum::extract::ws::{CloseFrame, Message, WebSocket, close_code};
use futures::{SinkExt, StreamExt};
use kernelgate_core::Frame;
use metrics::{counter, gauge, histogram};
use tokio::sync::mpsc;
use tracing::{info, instrument, warn};

use crate::metrics::{
    FRAMES_INBOUND_TOTAL, FRAMES_OUTBOUND_TOTAL, KERNEL_CONNECT_FAILURES_TOTAL,
    WS_CONNECTION_DURATION_SECONDS, WS_CONNECTIONS_ACTIVE, WS_CONNECTIONS_TOTAL,
    WS_DISCONNECTIONS_TOTAL,
};
use crate::ws::admission::Admission;
use crate::ws::intercept::rewrite_frame;

/// Run the relay for one upgraded connection.
///
/// 1. Connects the relay handle to the kernel (waits for readiness)
/// 2. Forwards kernel→client frames from the outbound channel
/// 3. Passes each inbound frame through the interceptor, then to the handle
/// 4. On closure from either side, disconnects the handle exactly once
#[instrument(skip_all, fields(kernel_id = %admission.kernel.id, user = %admission.identity.name))]
pub async fn run_relay(
    ws: WebSocket,
    admission: Admission,
    outbound_capacity: usize,
    active: Arc<AtomicUsize>,
) {
    let Admission {
        kernel, connection, token, ..
    } = admission;
    let (mut ws_tx, mut ws_rx) = ws.split();
    let started = Instant::now();

    let _ = active.fetch_add(1, Ordering::Relaxed);
    counter!(WS_CONNECTIONS_TOTAL).increment(1);
    gauge!(WS_CONNECTIONS_ACTIVE).increment(1.0);
    info!(kernel_id = %kernel.id, "connecting to kernel");

    // Connecting: the handle completes only once the kernel reports ready.
    let (outbound_tx, mut outbound_rx) = mpsc::channel::<Frame>(outbound_capacity);
    if let Err(err) = connection.connect(outbound_tx).await {
        warn!(error = %err, "kernel connect failed, closing connection");
        counter!(KERNEL_CONNECT_FAILURES_TOTAL).increment(1);
        let _ = ws_tx
            .send(Message::Close(Some(CloseFrame {
                code: close_code::ERROR,
                reason: "kernel connect failed".into(),
            })))
            .await;
        connection.disconnect().await;
        teardown(started, &active);
        return;
    }

    // Active: kernel→client forwarder, in emission order.
    let outbound = tokio::spawn(async move {
        while let Some(frame) = outbound_rx.recv().await {
            counter!(FRAMES_OUTBOUND_TOTAL).increment(1);
            let msg = match frame {
                Frame::Text(text) => Message::Text(text.into()),
                Frame::Binary(bytes) => Message::Binary(bytes.into()),
            };
            if ws_tx.send(msg).await.is_err() {
                break;
            }
        }
    });

    // Active: client→kernel pump, in delivery order.
    while let Some(Ok(msg)) = ws_rx.next().await {
        let frame = match msg {
            Message::Text(text) => Frame::Text(text.to_string()),
            Message::Binary(bytes) => Frame::Binary(bytes.to_vec()),
            Message::Close(_) => {
                info!("client sent close frame");
                break;
            }
            Message::Ping(_) | Message::Pong(_) => continue,
        };
        counter!(FRAMES_INBOUND_TOTAL).increment(1);
        let frame = rewrite_frame(frame, &token);
        connection.handle_incoming(frame).await;
    }

    // Closed: one disconnect, no re-entry.
    outbound.abort();
    connection.disconnect().await;
    info!("client disconnected");
    teardown(started, &active);
}

fn teardown(started: Instant, active: &AtomicUsize) {
    let _ = active.fetch_sub(1, Ordering::Relaxed);
    gauge!(WS_CONNECTIONS_ACTIVE).decrement(1.0);
    counter!(WS_DISCONNECTIONS_TOTAL).increment(1);
    histogram!(WS_CONNECTION_DURATION_SECONDS).record(started.elapsed().as_secs_f64());
}
