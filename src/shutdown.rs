use tokio::sync::broadcast;

/// Operator-requested stop (Ctrl+C, SIGTERM) fan-out.
pub type ShutdownSender = broadcast::Sender<()>;
pub type ShutdownReceiver = broadcast::Receiver<()>;
