use std::fmt::Debug;

use bevy_log::warn;

use super::{StateId, StateTransition};
use crate::pose_function::PoseFunction;

/// A state of a [`StateMachineFunction`](super::StateMachineFunction): the subgraph it
/// plays and the transitions leaving it.
#[derive(Clone)]
pub struct State<Id> {
    pub id: Id,
    pub input: Box<dyn PoseFunction>,
    pub outbound: Vec<StateTransition<Id>>,
    /// Restart the input without blending whenever the state is entered.
    pub reset_upon_entry: bool,
}

impl<Id: StateId> State<Id> {
    pub fn builder(id: Id, input: impl PoseFunction) -> StateBuilder<Id> {
        StateBuilder {
            state: State {
                id,
                input: input.into_boxed(),
                outbound: Vec::new(),
                reset_upon_entry: false,
            },
        }
    }
}

impl<Id: Debug> Debug for State<Id> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("State")
            .field("id", &self.id)
            .field("outbound", &self.outbound)
            .field("reset_upon_entry", &self.reset_upon_entry)
            .finish()
    }
}

pub struct StateBuilder<Id> {
    state: State<Id>,
}

impl<Id: StateId> StateBuilder<Id> {
    pub fn reset_upon_entry(mut self, reset_upon_entry: bool) -> Self {
        self.state.reset_upon_entry = reset_upon_entry;
        self
    }

    pub fn add_outbound_transition(mut self, transition: StateTransition<Id>) -> Self {
        if transition.target == self.state.id {
            warn!(
                "Transition from {:?} to itself will never be taken",
                self.state.id
            );
        }
        self.state.outbound.push(transition);
        self
    }

    pub fn build(self) -> State<Id> {
        self.state
    }
}
