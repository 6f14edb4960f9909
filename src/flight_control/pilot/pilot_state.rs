use std::fmt::{Display, Formatter};
use strum_macros::EnumIter;

/// Lifecycle phase of the pilot.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, EnumIter)]
pub enum PilotState {
    Initializing,
    WaitingForButton,
    WaitingForLaunch,
    Flying,
    Landed,
    TestMode,
}

impl PilotState {
    pub fn name(self) -> &'static str { self.into() }
}

impl From<PilotState> for &'static str {
    fn from(value: PilotState) -> Self {
        match value {
            PilotState::Initializing => "initializing",
            PilotState::WaitingForButton => "waiting for button",
            PilotState::WaitingForLaunch => "waiting for launch",
            PilotState::Flying => "flying",
            PilotState::Landed => "landed",
            PilotState::TestMode => "test mode",
        }
    }
}

impl Display for PilotState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result { f.write_str(self.name()) }
}
