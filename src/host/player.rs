use serde::{Deserialize, Serialize};

use crate::{
    domain::{skip::PlaybackContext, track::TrackIdentity},
    host::metadata::HostSnapshot,
    ports::{JumpRequest, PlayerError, PlayerPort},
};

/// Command the core asked the host player to perform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum PlayerCommand {
    Advance,
    JumpTo(JumpRequest),
}

/// Player that answers from the last snapshot the host reported and
/// records the commands issued against it, for the host to carry out.
#[derive(Debug, Default)]
pub struct ObservedPlayer {
    current: Option<TrackIdentity>,
    context: PlaybackContext,
    commands: Vec<PlayerCommand>,
    /// Host-side rejection to report for the next jump.
    pub reject_jumps: Option<String>,
}

impl ObservedPlayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, current: Option<TrackIdentity>, context: PlaybackContext) {
        self.current = current;
        self.context = context;
    }

    pub fn observe_snapshot(&mut self, snapshot: &HostSnapshot) {
        self.observe(
            snapshot.track.as_ref().map(TrackIdentity::from),
            PlaybackContext::from(&snapshot.context),
        );
    }

    pub fn take_commands(&mut self) -> Vec<PlayerCommand> {
        std::mem::take(&mut self.commands)
    }

    pub fn commands(&self) -> &[PlayerCommand] {
        &self.commands
    }
}

impl PlayerPort for ObservedPlayer {
    fn current_track(&self) -> Option<TrackIdentity> {
        self.current.clone()
    }

    fn context(&self) -> PlaybackContext {
        self.context.clone()
    }

    fn advance(&mut self) {
        log::debug!("player: advance");
        self.commands.push(PlayerCommand::Advance);
    }

    fn jump_to(&mut self, request: &JumpRequest) -> Result<(), PlayerError> {
        if let Some(reason) = &self.reject_jumps {
            return Err(PlayerError::JumpRejected {
                track_uri: request.track_uri.clone(),
                reason: reason.clone(),
            });
        }
        log::debug!("player: jump to {} in {}", request.track_uri, request.context_uri);
        self.commands.push(PlayerCommand::JumpTo(request.clone()));
        Ok(())
    }
}
