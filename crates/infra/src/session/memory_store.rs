use async_trait::async_trait;
use parking_lot::Mutex;
use scoutgate_core::SessionStore;
use scoutgate_domain::{Result, Session};

/// Process-local session store; nothing survives a restart
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    session: Mutex<Option<Session>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self) -> Result<Option<Session>> {
        Ok(self.session.lock().clone())
    }

    async fn save(&self, session: &Session) -> Result<()> {
        *self.session.lock() = Some(session.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.session.lock().take();
        Ok(())
    }
}
