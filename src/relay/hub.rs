use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::runtime::{Builder, Runtime};
use tokio::sync::mpsc::{self, error::TryRecvError, UnboundedReceiver, UnboundedSender};

use super::{MoveChannel, SessionId};
use crate::error::RelayError;

/// Identifies one joined participant within the relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParticipantId(u64);

struct Member {
    id: ParticipantId,
    tx: UnboundedSender<usize>,
}

/// Columns relayed to one participant, read from synchronous code.
pub(super) struct Inbox {
    rx: UnboundedReceiver<usize>,
}

impl Inbox {
    pub(super) fn new(rx: UnboundedReceiver<usize>) -> Self {
        Inbox { rx }
    }

    pub(super) fn try_next(&mut self) -> Result<Option<usize>, RelayError> {
        match self.rx.try_recv() {
            Ok(column) => Ok(Some(column)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(RelayError::Disconnected),
        }
    }

    /// Block on `runtime` for up to `timeout`. Must not be called from
    /// inside an async context.
    pub(super) fn next_within(
        &mut self,
        runtime: &Runtime,
        timeout: Duration,
    ) -> Result<Option<usize>, RelayError> {
        let received = runtime.block_on(async {
            tokio::time::timeout(timeout, self.rx.recv()).await
        });
        match received {
            Ok(Some(column)) => Ok(Some(column)),
            Ok(None) => Err(RelayError::Disconnected),
            Err(_elapsed) => Ok(None),
        }
    }
}

/// Session membership for the whole process. Create one at startup and share
/// it behind an `Arc`.
pub struct Relay {
    sessions: Mutex<HashMap<SessionId, Vec<Member>>>,
    next_id: AtomicU64,
}

impl Relay {
    pub fn new() -> Self {
        Relay {
            sessions: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Join `session` with an in-process endpoint.
    pub fn join(self: &Arc<Self>, session: SessionId) -> Result<RelayEndpoint, RelayError> {
        let runtime = Builder::new_current_thread().enable_time().build()?;
        let (tx, rx) = mpsc::unbounded_channel();
        let id = self.join_with_sender(&session, tx);
        Ok(RelayEndpoint {
            relay: Arc::clone(self),
            session,
            id,
            inbox: Inbox::new(rx),
            runtime,
        })
    }

    /// Register a participant whose incoming columns go to `tx`. More than two
    /// participants are accepted; each receives every other member's moves.
    pub fn join_with_sender(&self, session: &SessionId, tx: UnboundedSender<usize>) -> ParticipantId {
        let id = ParticipantId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let mut sessions = self.lock();
        let members = sessions.entry(session.clone()).or_default();
        members.push(Member { id, tx });
        log::info!(
            "participant {} joined session {session} ({} present)",
            id.0,
            members.len()
        );
        id
    }

    /// Forward `column` to every member of `session` except `from`. Returns
    /// how many members it was handed to. Members whose receiver is gone are
    /// dropped from the session.
    pub fn publish_move(&self, session: &SessionId, from: Option<ParticipantId>, column: usize) -> usize {
        let mut sessions = self.lock();
        let Some(members) = sessions.get_mut(session) else {
            log::debug!("move {column} for unknown session {session} dropped");
            return 0;
        };

        let mut delivered = 0;
        members.retain(|member| {
            if Some(member.id) == from {
                return true;
            }
            match member.tx.send(column) {
                Ok(()) => {
                    delivered += 1;
                    true
                }
                Err(_) => {
                    log::warn!("participant {} of session {session} is gone, dropping", member.id.0);
                    false
                }
            }
        });
        if members.is_empty() {
            sessions.remove(session);
        }
        delivered
    }

    pub fn leave(&self, session: &SessionId, id: ParticipantId) {
        let mut sessions = self.lock();
        if let Some(members) = sessions.get_mut(session) {
            members.retain(|member| member.id != id);
            if members.is_empty() {
                sessions.remove(session);
            }
            log::info!("participant {} left session {session}", id.0);
        }
    }

    /// Number of participants currently joined to `session`
    pub fn participants(&self, session: &SessionId) -> usize {
        self.lock().get(session).map_or(0, Vec::len)
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<SessionId, Vec<Member>>> {
        // Membership stays consistent even if a holder panicked mid-update.
        self.sessions.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for Relay {
    fn default() -> Self {
        Self::new()
    }
}

/// In-process participant. Leaves the session when dropped.
pub struct RelayEndpoint {
    relay: Arc<Relay>,
    session: SessionId,
    id: ParticipantId,
    inbox: Inbox,
    runtime: Runtime,
}

impl RelayEndpoint {
    pub fn id(&self) -> ParticipantId {
        self.id
    }
}

impl MoveChannel for RelayEndpoint {
    fn session_id(&self) -> &SessionId {
        &self.session
    }

    fn publish_move(&mut self, column: usize) -> Result<(), RelayError> {
        self.relay.publish_move(&self.session, Some(self.id), column);
        Ok(())
    }

    fn try_recv_move(&mut self) -> Result<Option<usize>, RelayError> {
        self.inbox.try_next()
    }

    fn recv_move_timeout(&mut self, timeout: Duration) -> Result<Option<usize>, RelayError> {
        self.inbox.next_within(&self.runtime, timeout)
    }
}

impl Drop for RelayEndpoint {
    fn drop(&mut self) {
        self.relay.leave(&self.session, self.id);
    }
}
