use bevy::prelude::*;
use tracing::{debug, info};

use crate::candy::CandyId;
use crate::config::CandyConfig;

/// Asks the animoji to talk because it caught a candy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Event)]
pub struct Talk {
    pub candy: CandyId,
}

/// Tracks the current talk. Requests arriving mid-talk are dropped.
#[derive(Debug, Default, Resource)]
pub struct TalkState {
    current: Option<Timer>,
    talks: u32,
}

impl TalkState {
    pub fn is_talking(&self) -> bool {
        self.current.is_some()
    }

    /// Number of talks started so far.
    pub fn talks(&self) -> u32 {
        self.talks
    }
}

pub fn handle_talk(
    time: Res<Time>,
    config: Res<CandyConfig>,
    mut requests: EventReader<Talk>,
    mut state: ResMut<TalkState>,
) {
    let finished = state.current.as_mut()
        .is_some_and(|timer| timer.tick(time.delta()).finished());
    if finished {
        debug!("talk finished");
        state.current = None;
    }

    for request in requests.read() {
        if state.is_talking() {
            debug!(candy = %request.candy, "already talking");
            continue;
        }
        state.current = Some(Timer::new(config.talk_duration, TimerMode::Once));
        state.talks += 1;
        info!(candy = %request.candy, "animoji talks");
    }
}
