use crate::aggregator::Aggregator;
use crate::error::{HIndexError, Result};
use crate::models::{AggregateResult, RequestState};
use ractor::{Actor, ActorProcessingErr, ActorRef, RpcReplyPort, SpawnErr};
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};

const CALL_TIMEOUT: Duration = Duration::from_secs(5);

/// Owns the state the presentation layer renders.
///
/// Each submit starts a new generation. A lookup that finishes after a newer
/// submit is dropped instead of overwriting the newer state.
pub struct LookupSession;

pub struct LookupSessionState {
    aggregator: Aggregator,
    current: RequestState,
    updates: watch::Sender<RequestState>,
}

impl LookupSessionState {
    fn commit(&mut self, next: RequestState) {
        self.current = next;
        self.updates.send_replace(self.current.clone());
    }
}

#[derive(Debug)]
pub enum LookupSessionMessage {
    /// Start a lookup; replies with its generation
    Submit(String, RpcReplyPort<u64>),
    /// A lookup task finished
    Completed {
        generation: u64,
        result: AggregateResult,
    },
    GetState(RpcReplyPort<RequestState>),
}

pub struct LookupSessionArgs {
    pub aggregator: Aggregator,
    pub updates: watch::Sender<RequestState>,
}

impl LookupSession {
    /// Spawn the session, returning a receiver that sees every committed state
    pub async fn spawn(
        aggregator: Aggregator,
    ) -> std::result::Result<(ActorRef<LookupSessionMessage>, watch::Receiver<RequestState>), SpawnErr> {
        let (updates, receiver) = watch::channel(RequestState::idle());
        let args = LookupSessionArgs { aggregator, updates };

        let (actor_ref, _handle) = Actor::spawn(None, LookupSession, args).await?;
        Ok((actor_ref, receiver))
    }
}

#[ractor::async_trait]
impl Actor for LookupSession {
    type Msg = LookupSessionMessage;
    type State = LookupSessionState;
    type Arguments = LookupSessionArgs;

    async fn pre_start(
        &self,
        _myself: ActorRef<Self::Msg>,
        args: Self::Arguments,
    ) -> std::result::Result<Self::State, ActorProcessingErr> {
        debug!("Lookup session starting");
        Ok(LookupSessionState {
            aggregator: args.aggregator,
            current: RequestState::idle(),
            updates: args.updates,
        })
    }

    async fn handle(
        &self,
        myself: ActorRef<Self::Msg>,
        message: Self::Msg,
        state: &mut Self::State,
    ) -> std::result::Result<(), ActorProcessingErr> {
        match message {
            LookupSessionMessage::Submit(username, reply) => {
                let generation = state.current.generation + 1;
                state.commit(RequestState::loading(generation, &username));
                info!(generation, %username, "Lookup submitted");

                if reply.send(generation).is_err() {
                    debug!(generation, "Submitter went away before receiving generation");
                }

                let aggregator = state.aggregator.clone();
                tokio::spawn(async move {
                    let result = aggregator.lookup(&username).await;
                    if let Err(e) = myself.send_message(LookupSessionMessage::Completed { generation, result }) {
                        warn!(generation, "Failed to deliver lookup result: {}", e);
                    }
                });
            }

            LookupSessionMessage::Completed { generation, result } => {
                if generation == state.current.generation {
                    info!(
                        generation,
                        h_index = result.h_index,
                        total_stars = result.total_stars,
                        "Lookup committed"
                    );
                    state.commit(RequestState::loaded(generation, result));
                } else {
                    debug!(
                        generation,
                        latest = state.current.generation,
                        "Discarding stale lookup result"
                    );
                }
            }

            LookupSessionMessage::GetState(reply) => {
                if reply.send(state.current.clone()).is_err() {
                    debug!("State requester went away");
                }
            }
        }

        Ok(())
    }
}

/// Submit a username and return the generation it was assigned
pub async fn submit(session: &ActorRef<LookupSessionMessage>, username: &str) -> Result<u64> {
    let username = username.to_string();
    match session
        .call(|reply| LookupSessionMessage::Submit(username, reply), Some(CALL_TIMEOUT))
        .await
    {
        Ok(ractor::rpc::CallResult::Success(generation)) => Ok(generation),
        Ok(ractor::rpc::CallResult::Timeout) => {
            Err(HIndexError::SessionError("Timeout submitting lookup".to_string()))
        }
        Ok(ractor::rpc::CallResult::SenderError) => {
            Err(HIndexError::SessionError("Session dropped the submit reply".to_string()))
        }
        Err(e) => Err(HIndexError::SessionError(format!("Failed to submit lookup: {}", e))),
    }
}

/// Snapshot of the session's current state
pub async fn current_state(session: &ActorRef<LookupSessionMessage>) -> Result<RequestState> {
    match session
        .call(LookupSessionMessage::GetState, Some(CALL_TIMEOUT))
        .await
    {
        Ok(ractor::rpc::CallResult::Success(state)) => Ok(state),
        Ok(ractor::rpc::CallResult::Timeout) => {
            Err(HIndexError::SessionError("Timeout reading session state".to_string()))
        }
        Ok(ractor::rpc::CallResult::SenderError) => {
            Err(HIndexError::SessionError("Session dropped the state reply".to_string()))
        }
        Err(e) => Err(HIndexError::SessionError(format!("Failed to read session state: {}", e))),
    }
}
