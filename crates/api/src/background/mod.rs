//! Background tasks spawned by the binary.
//!
//! Each task runs until its [`CancellationToken`](tokio_util::sync::CancellationToken)
//! is cancelled during graceful shutdown.

pub mod session_cleanup;
