use bevy_log::warn;
use indexmap::IndexSet;

use super::{StateId, StateTransition};

/// Shared outbound transitions applied to several origin states when the machine is built.
#[derive(Clone, Debug)]
pub struct StateAlias<Id: StateId> {
    pub origins: IndexSet<Id>,
    pub outbound: Vec<StateTransition<Id>>,
}

impl<Id: StateId> StateAlias<Id> {
    pub fn builder() -> StateAliasBuilder<Id> {
        StateAliasBuilder {
            alias: StateAlias {
                origins: IndexSet::new(),
                outbound: Vec::new(),
            },
        }
    }
}

pub struct StateAliasBuilder<Id: StateId> {
    alias: StateAlias<Id>,
}

impl<Id: StateId> StateAliasBuilder<Id> {
    pub fn can_originate_from(mut self, states: impl IntoIterator<Item = Id>) -> Self {
        self.alias.origins.extend(states);
        self
    }

    pub fn add_outbound_transition(mut self, transition: StateTransition<Id>) -> Self {
        if self.alias.origins.contains(&transition.target) {
            warn!(
                "Alias transition to {:?} also originates from it; it is skipped for that state",
                transition.target
            );
        }
        self.alias.outbound.push(transition);
        self
    }

    pub fn build(self) -> StateAlias<Id> {
        self.alias
    }
}
