use tokio::sync::watch;

/// Host-environment visibility, as reported by the embedding shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Visible,
    Hidden,
}

/// Handle through which the host environment reports foreground/background
/// transitions. The session store watches the paired receiver and runs a
/// quiet re-check whenever the process comes back to the foreground.
#[derive(Debug, Clone)]
pub struct VisibilitySignal {
    tx: watch::Sender<Visibility>,
}

impl VisibilitySignal {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(Visibility::Visible);
        Self { tx }
    }

    pub fn set(&self, visibility: Visibility) {
        self.tx.send_replace(visibility);
    }

    pub fn subscribe(&self) -> watch::Receiver<Visibility> {
        self.tx.subscribe()
    }
}

impl Default for VisibilitySignal {
    fn default() -> Self {
        Self::new()
    }
}
