use std::{fmt::Debug, sync::Arc};

use bevy_log::error;

use super::StateId;
use crate::{
    context::EvaluationState,
    driver::{Driver, DriverKey},
    pose_function::{AnimationPlayer, PoseFunction},
    time::{TimeSpan, Transition},
};

/// Everything a transition condition can look at.
pub struct TransitionContext<'a, 'b> {
    pub state: &'a EvaluationState<'b>,
    pub time_in_current_state: TimeSpan,
    pub current_state_weight: f32,
    pub previous_state_weight: f32,
    pub current_state_input: &'a dyn PoseFunction,
    /// Duration of the transition being tested, not of the one currently running.
    pub transition_duration: TimeSpan,
}

impl TransitionContext<'_, '_> {
    pub fn driver_value<D: Driver>(&self, key: &DriverKey<D>) -> D::Value {
        self.state.driver_value(key)
    }

    pub fn most_relevant_animation_player(&self) -> Option<&dyn AnimationPlayer> {
        self.current_state_input.most_relevant_animation_player()
    }

    /// Whether the relevant player passed the point `crossfade * transition_duration` before
    /// its end during the last tick. A crossfade of `0` waits for the very end.
    pub fn most_relevant_animation_player_finishing_within(&self, crossfade: f32) -> bool {
        self.most_relevant_animation_player().is_some_and(|player| {
            player.is_finishing_within(self.transition_duration * crossfade)
        })
    }
}

pub fn current_transition_finished(ctx: &TransitionContext) -> bool {
    ctx.current_state_weight >= 1. && ctx.previous_state_weight >= 1.
}

pub fn most_relevant_animation_player_is_finishing(ctx: &TransitionContext) -> bool {
    ctx.most_relevant_animation_player_finishing_within(1.)
}

pub fn most_relevant_animation_player_has_finished(ctx: &TransitionContext) -> bool {
    ctx.most_relevant_animation_player_finishing_within(0.)
}

/// Condition that holds while a boolean driver is set.
pub fn boolean_driver<D>(key: DriverKey<D>) -> impl Fn(&TransitionContext) -> bool + Send + Sync + 'static
where
    D: Driver<Value = bool>,
{
    move |ctx: &TransitionContext| ctx.driver_value(&key)
}

pub type TransitionCondition = Arc<dyn Fn(&TransitionContext) -> bool + Send + Sync>;

fn boxed_condition(f: impl Fn(&TransitionContext) -> bool + Send + Sync + 'static) -> TransitionCondition {
    Arc::new(f)
}

pub type TransitionTakenCallback = Arc<dyn Fn(&mut EvaluationState<'_>) + Send + Sync>;

/// Outbound edge of a state.
#[derive(Clone)]
pub struct StateTransition<Id> {
    pub target: Id,
    pub condition: TransitionCondition,
    pub transition: Transition,
    /// Higher values win; ties are broken at random.
    pub priority: i32,
    pub on_taken: Vec<TransitionTakenCallback>,
    /// Also taken when the current state's relevant player is about to finish.
    pub automatic: bool,
}

impl<Id: StateId> StateTransition<Id> {
    pub const DEFAULT_PRIORITY: i32 = 50;

    pub fn builder(target: Id) -> StateTransitionBuilder<Id> {
        StateTransitionBuilder {
            target,
            condition: None,
            transition: Transition::SINGLE_TICK,
            priority: Self::DEFAULT_PRIORITY,
            on_taken: Vec::new(),
            automatic_crossfade: None,
        }
    }

    pub fn is_passable(&self, ctx: &TransitionContext) -> bool {
        (self.condition)(ctx)
    }
}

impl<Id: Debug> Debug for StateTransition<Id> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateTransition")
            .field("target", &self.target)
            .field("transition", &self.transition)
            .field("priority", &self.priority)
            .field("automatic", &self.automatic)
            .finish()
    }
}

pub struct StateTransitionBuilder<Id> {
    target: Id,
    condition: Option<TransitionCondition>,
    transition: Transition,
    priority: i32,
    on_taken: Vec<TransitionTakenCallback>,
    automatic_crossfade: Option<f32>,
}

impl<Id: StateId> StateTransitionBuilder<Id> {
    pub fn is_taken_if(
        mut self,
        condition: impl Fn(&TransitionContext) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.condition = Some(boxed_condition(condition));
        self
    }

    /// Also takes the transition when the relevant player of the current state is within
    /// `crossfade * duration` of finishing or looping.
    pub fn is_taken_if_most_relevant_animation_player_finishing(mut self, crossfade: f32) -> Self {
        self.automatic_crossfade = Some(crossfade.clamp(0., 1.));
        self
    }

    pub fn with_timing(mut self, transition: Transition) -> Self {
        self.transition = transition;
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Runs `callback` every time the transition is taken. Callbacks run in binding order.
    pub fn bind_to_on_taken(
        mut self,
        callback: impl Fn(&mut EvaluationState<'_>) + Send + Sync + 'static,
    ) -> Self {
        self.on_taken.push(Arc::new(callback));
        self
    }

    pub fn build(self) -> StateTransition<Id> {
        let condition: TransitionCondition = match (self.condition, self.automatic_crossfade) {
            (Some(condition), None) => condition,
            (Some(user), Some(crossfade)) => boxed_condition(move |ctx| {
                user(ctx) || ctx.most_relevant_animation_player_finishing_within(crossfade)
            }),
            (None, Some(crossfade)) => {
                boxed_condition(move |ctx| ctx.most_relevant_animation_player_finishing_within(crossfade))
            }
            (None, None) => {
                error!(
                    "Transition to {:?} has no condition and will never be taken",
                    self.target
                );
                boxed_condition(|_| false)
            }
        };

        StateTransition {
            target: self.target,
            condition,
            transition: self.transition,
            priority: self.priority,
            on_taken: self.on_taken,
            automatic: self.automatic_crossfade.is_some(),
        }
    }
}
