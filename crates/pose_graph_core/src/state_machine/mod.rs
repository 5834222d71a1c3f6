//! Layer-stack state machine.
//!
//! The machine keeps a stack of blending layers, one per state entry. Taking a transition
//! pushes a layer whose weight ramps from 0 to 1 over the transition's duration; once a layer
//! has been at full weight for two ticks, every layer below it is dropped.

mod alias;
mod state;
mod transition;

pub use alias::*;
pub use state::*;
pub use transition::*;

use std::{cmp::Reverse, fmt::Debug, hash::Hash};

use bevy_log::{debug, warn};
use indexmap::IndexMap;
use rand::{SeedableRng, rngs::StdRng, seq::SliceRandom};

use crate::{
    context::{EvaluationState, InterpolationContext},
    driver::{Driver, VariableDriver},
    errors::{AnimationError, AnimationResult},
    pose::LocalSpacePose,
    pose_function::{
        AnimationPlayer, EvaluationFn, PoseFunction, TimeBasedPlayback, evaluation_fn,
    },
    time::Transition,
};

/// Identifier of a state: usually a small fieldless enum owned by the animator.
pub trait StateId: Copy + Debug + Eq + Hash + Send + Sync + 'static {}

impl<T> StateId for T where T: Copy + Debug + Eq + Hash + Send + Sync + 'static {}

/// Durations shorter than this are treated as this long.
const MIN_TRANSITION_TICKS: f32 = 0.01;

#[derive(Clone, Debug)]
struct StateLayer<Id> {
    state: Id,
    transition: Transition,
    ticks_entered: u32,
    weight: VariableDriver<f32>,
}

impl<Id: StateId> StateLayer<Id> {
    fn entering(state: Id, transition: Transition) -> Self {
        Self {
            state,
            transition,
            ticks_entered: 0,
            weight: VariableDriver::interpolated(0.),
        }
    }

    fn fully_active(state: Id) -> Self {
        Self {
            state,
            transition: Transition::INSTANT,
            ticks_entered: 0,
            weight: VariableDriver::interpolated(1.),
        }
    }

    /// Weight reaches exactly 1 after `ceil(duration)` ticks.
    fn tick_weight(&mut self) {
        self.weight.push_current_to_previous();
        if *self.weight.current() >= 1. {
            return;
        }
        self.ticks_entered += 1;
        let duration = self.transition.duration.in_ticks().max(MIN_TRANSITION_TICKS);
        self.weight.set_value((self.ticks_entered as f32 / duration).clamp(0., 1.));
    }

    fn is_fully_active(&self) -> bool {
        *self.weight.previous() >= 1. && *self.weight.current() >= 1.
    }
}

#[derive(Clone)]
pub struct StateMachineFunction<Id: StateId> {
    states: IndexMap<Id, State<Id>>,
    initial_state: EvaluationFn<Id>,
    resets_upon_relevant: bool,
    seeded: bool,
    layers: Vec<StateLayer<Id>>,
    time_in_state: TimeBasedPlayback,
    last_ticked: Option<u64>,
    rng: StdRng,
}

impl<Id: StateId> StateMachineFunction<Id> {
    /// Starts a machine whose initial state is picked by `initial_state` whenever the machine
    /// (re)initializes.
    pub fn builder(
        initial_state: impl Fn(&EvaluationState<'_>) -> Id + Send + Sync + 'static,
    ) -> StateMachineBuilder<Id> {
        StateMachineBuilder {
            initial_state: evaluation_fn(initial_state),
            states: IndexMap::new(),
            duplicates: Vec::new(),
            aliases: Vec::new(),
            resets_upon_relevant: false,
            seed: None,
        }
    }

    /// Layers from bottom to top, with their current weights.
    pub fn active_layers(&self) -> Vec<(Id, f32)> {
        self.layers
            .iter()
            .map(|layer| (layer.state, *layer.weight.current()))
            .collect()
    }

    /// State of the topmost layer.
    pub fn current_state(&self) -> Option<Id> {
        self.layers.last().map(|layer| layer.state)
    }

    fn state(&self, id: &Id) -> AnimationResult<&State<Id>> {
        self.states
            .get(id)
            .ok_or_else(|| AnimationError::MissingState(format!("{id:?}")))
    }

    fn initialize(&mut self, state: &EvaluationState) -> AnimationResult<Id> {
        let initial = (self.initial_state)(state);
        self.state(&initial)?;
        self.layers.clear();
        self.layers.push(StateLayer::fully_active(initial));
        self.time_in_state.reset_time();
        Ok(initial)
    }

    /// Picks the transition to take out of the topmost state: passable candidates are
    /// shuffled, then stably sorted by descending priority.
    fn select_transition(&mut self, state: &EvaluationState) -> AnimationResult<Option<StateTransition<Id>>> {
        let top = self.layers.last().ok_or(AnimationError::EmptyStateStack)?;
        let current = top.state;
        let origin = self
            .states
            .get(&current)
            .ok_or_else(|| AnimationError::MissingState(format!("{current:?}")))?;

        let mut candidates: Vec<&StateTransition<Id>> = origin
            .outbound
            .iter()
            .filter(|transition| {
                transition.target != current && self.states.contains_key(&transition.target)
            })
            .filter(|transition| {
                transition.is_passable(&TransitionContext {
                    state,
                    time_in_current_state: self.time_in_state.current_elapsed(),
                    current_state_weight: *top.weight.current(),
                    previous_state_weight: *top.weight.previous(),
                    current_state_input: origin.input.as_ref(),
                    transition_duration: transition.transition.duration,
                })
            })
            .collect();

        candidates.shuffle(&mut self.rng);
        candidates.sort_by_key(|transition| Reverse(transition.priority));
        Ok(candidates.first().map(|transition| (*transition).clone()))
    }

    fn compute_state(&self, id: &Id, ctx: &InterpolationContext) -> AnimationResult<LocalSpacePose> {
        self.state(id)?.input.compute(ctx)
    }
}

impl<Id: StateId> PoseFunction for StateMachineFunction<Id> {
    fn tick(&mut self, state: &mut EvaluationState) -> AnimationResult<()> {
        let inactive_gap = self
            .last_ticked
            .is_some_and(|last| state.current_tick > last + 1);
        self.last_ticked = Some(state.current_tick);

        let mut entered = None;
        if self.layers.is_empty() || state.is_resetting() || (self.resets_upon_relevant && inactive_gap) {
            entered = Some(self.initialize(state)?);
        }

        self.time_in_state.tick(&state.cleared());

        if entered.is_none()
            && let Some(transition) = self.select_transition(state)?
        {
            debug!(
                "State machine transition {:?} -> {:?}",
                self.current_state(),
                transition.target
            );
            for callback in &transition.on_taken {
                callback(state);
            }
            self.layers
                .push(StateLayer::entering(transition.target, transition.transition));
            self.time_in_state.reset_time();
            entered = Some(transition.target);
        }

        for layer in &mut self.layers {
            layer.tick_weight();
        }
        if let Some(top_full) = self.layers.iter().rposition(StateLayer::is_fully_active) {
            self.layers.drain(..top_full);
        }

        let mut ticked = Vec::with_capacity(self.layers.len());
        for layer in &self.layers {
            if !ticked.contains(&layer.state) {
                ticked.push(layer.state);
            }
        }
        for id in ticked {
            let Some(active) = self.states.get_mut(&id) else {
                return Err(AnimationError::MissingState(format!("{id:?}")));
            };
            let reset = entered == Some(id) && active.reset_upon_entry;
            active.input.tick(&mut state.with_reset(reset))?;
        }
        Ok(())
    }

    fn compute(&self, ctx: &InterpolationContext) -> AnimationResult<LocalSpacePose> {
        let (bottom, rest) = self
            .layers
            .split_first()
            .ok_or(AnimationError::EmptyStateStack)?;
        let mut pose = self.compute_state(&bottom.state, ctx)?;
        for layer in rest {
            let layer_pose = self.compute_state(&layer.state, ctx)?;
            let weight = layer.weight.value_interpolated(ctx.partial_tick);
            pose = pose.interpolated_by_transition(&layer_pose, weight, &layer.transition);
        }
        Ok(pose)
    }

    fn wrap_unique(&self) -> Box<dyn PoseFunction> {
        let mut unique = self.clone();
        for state in unique.states.values_mut() {
            state.input = state.input.wrap_unique();
        }
        if !self.seeded {
            unique.rng = StdRng::seed_from_u64(rand::random());
        }
        Box::new(unique)
    }

    fn most_relevant_animation_player(&self) -> Option<&dyn AnimationPlayer> {
        self.layers.iter().rev().find_map(|layer| {
            self.states
                .get(&layer.state)
                .and_then(|state| state.input.most_relevant_animation_player())
        })
    }
}

/// `(origin, target)` of every automatic transition leaving a state that keeps its clock
/// when re-entered.
fn automatic_transitions_without_reset<Id: StateId>(states: &IndexMap<Id, State<Id>>) -> Vec<(Id, Id)> {
    states
        .values()
        .filter(|state| !state.reset_upon_entry)
        .flat_map(|state| {
            state
                .outbound
                .iter()
                .filter(|transition| transition.automatic)
                .map(|transition| (state.id, transition.target))
        })
        .collect()
}

pub struct StateMachineBuilder<Id: StateId> {
    initial_state: EvaluationFn<Id>,
    states: IndexMap<Id, State<Id>>,
    duplicates: Vec<Id>,
    aliases: Vec<StateAlias<Id>>,
    resets_upon_relevant: bool,
    seed: Option<u64>,
}

impl<Id: StateId> StateMachineBuilder<Id> {
    pub fn add_state(mut self, state: State<Id>) -> Self {
        if self.states.contains_key(&state.id) {
            self.duplicates.push(state.id);
        } else {
            self.states.insert(state.id, state);
        }
        self
    }

    pub fn add_state_alias(mut self, alias: StateAlias<Id>) -> Self {
        self.aliases.push(alias);
        self
    }

    /// Re-pick the initial state when the machine becomes relevant again after being skipped
    /// for more than one tick.
    pub fn resets_upon_relevant(mut self, resets_upon_relevant: bool) -> Self {
        self.resets_upon_relevant = resets_upon_relevant;
        self
    }

    /// Seeds the tie-break between transitions of equal priority.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn build(mut self) -> AnimationResult<StateMachineFunction<Id>> {
        if let Some(duplicate) = self.duplicates.first() {
            return Err(AnimationError::DuplicateState(format!("{duplicate:?}")));
        }

        for alias in &self.aliases {
            for origin in &alias.origins {
                let Some(state) = self.states.get_mut(origin) else {
                    warn!("State alias origin {origin:?} is not a state of this machine");
                    continue;
                };
                state.outbound.extend(
                    alias
                        .outbound
                        .iter()
                        .filter(|transition| transition.target != *origin)
                        .cloned(),
                );
            }
        }

        for (origin, target) in automatic_transitions_without_reset(&self.states) {
            warn!(
                "Automatic transition {origin:?} -> {target:?} leaves a state that does not reset upon entry"
            );
        }
        for state in self.states.values() {
            if state.outbound.is_empty() {
                warn!("State {:?} has no outbound transitions", state.id);
            }
            for transition in &state.outbound {
                if !self.states.contains_key(&transition.target) {
                    warn!(
                        "Transition {:?} -> {:?} targets a state missing from this machine",
                        state.id, transition.target
                    );
                }
            }
        }

        let rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::seed_from_u64(rand::random()),
        };

        Ok(StateMachineFunction {
            states: self.states,
            initial_state: self.initial_state,
            resets_upon_relevant: self.resets_upon_relevant,
            seeded: self.seed.is_some(),
            layers: Vec::new(),
            time_in_state: TimeBasedPlayback::new(),
            last_ticked: None,
            rng,
        })
    }
}
