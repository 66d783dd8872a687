use std::sync::{
    atomic::{AtomicU8, Ordering},
    Arc,
};

use async_trait::async_trait;

use crate::{
    messaging::{
        port::Interaction,
        types::{MessagingCapabilities, Reply, SessionStats},
    },
    Result,
};

/// How far an interaction has progressed on the platform side.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReplyState {
    /// Nothing sent yet; the next message must be an initial response.
    Pending,
    /// Placeholder sent; the final content arrives via edit.
    Deferred,
    /// Initial response sent directly.
    Replied,
}

impl ReplyState {
    fn from_u8(v: u8) -> Self {
        match v {
            1 => ReplyState::Deferred,
            2 => ReplyState::Replied,
            _ => ReplyState::Pending,
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            ReplyState::Pending => 0,
            ReplyState::Deferred => 1,
            ReplyState::Replied => 2,
        }
    }
}

/// Interaction decorator that remembers whether an initial response went out.
///
/// The dispatcher relies on this to pick `reply` vs `follow_up` for error
/// notices, since the platform rejects a second initial response.
pub struct Responder {
    inner: Arc<dyn Interaction>,
    state: AtomicU8,
}

impl Responder {
    pub fn new(inner: Arc<dyn Interaction>) -> Self {
        Self {
            inner,
            state: AtomicU8::new(ReplyState::Pending.as_u8()),
        }
    }

    pub fn state(&self) -> ReplyState {
        ReplyState::from_u8(self.state.load(Ordering::SeqCst))
    }

    pub fn is_acknowledged(&self) -> bool {
        self.state() != ReplyState::Pending
    }

    /// Send `reply` as the initial response, or as a follow-up if one was
    /// already sent.
    pub async fn notify(&self, reply: Reply) -> Result<()> {
        if self.is_acknowledged() {
            self.follow_up(reply).await
        } else {
            self.reply(reply).await
        }
    }

    fn mark(&self, state: ReplyState) {
        self.state.store(state.as_u8(), Ordering::SeqCst);
    }
}

#[async_trait]
impl Interaction for Responder {
    fn capabilities(&self) -> MessagingCapabilities {
        self.inner.capabilities()
    }

    async fn defer(&self) -> Result<()> {
        self.inner.defer().await?;
        self.mark(ReplyState::Deferred);
        Ok(())
    }

    async fn reply(&self, reply: Reply) -> Result<()> {
        self.inner.reply(reply).await?;
        self.mark(ReplyState::Replied);
        Ok(())
    }

    async fn edit_reply(&self, content: &str) -> Result<()> {
        self.inner.edit_reply(content).await
    }

    async fn follow_up(&self, reply: Reply) -> Result<()> {
        self.inner.follow_up(reply).await
    }

    async fn session_stats(&self) -> SessionStats {
        self.inner.session_stats().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeInteraction, Sent};

    #[tokio::test]
    async fn notify_replies_before_any_acknowledgement() {
        let fake = Arc::new(FakeInteraction::default());
        let r = Responder::new(fake.clone());
        assert_eq!(r.state(), ReplyState::Pending);

        r.notify(Reply::ephemeral("oops")).await.unwrap();

        assert_eq!(r.state(), ReplyState::Replied);
        assert_eq!(fake.sent(), vec![Sent::Reply(Reply::ephemeral("oops"))]);
    }

    #[tokio::test]
    async fn notify_follows_up_after_defer() {
        let fake = Arc::new(FakeInteraction::default());
        let r = Responder::new(fake.clone());

        r.defer().await.unwrap();
        r.notify(Reply::ephemeral("oops")).await.unwrap();

        assert_eq!(r.state(), ReplyState::Deferred);
        assert_eq!(
            fake.sent(),
            vec![Sent::Defer, Sent::FollowUp(Reply::ephemeral("oops"))]
        );
    }

    #[tokio::test]
    async fn failed_defer_leaves_state_pending() {
        let fake = Arc::new(FakeInteraction::failing_defer());
        let r = Responder::new(fake.clone());

        assert!(r.defer().await.is_err());
        assert_eq!(r.state(), ReplyState::Pending);
    }
}
