use ng_upstream::Orchestrator;

use crate::profiles::{self, RouteProfile};

pub struct AppState {
    pub orchestrator: Orchestrator,
    pub profiles: Vec<RouteProfile>,
}

impl AppState {
    pub fn new(orchestrator: Orchestrator) -> Self {
        Self {
            orchestrator,
            profiles: profiles::builtin(),
        }
    }

    pub fn profile(&self, name: &str) -> Option<&RouteProfile> {
        self.profiles.iter().find(|p| p.name == name)
    }
}
