use core::fmt::{self, Display, Formatter};

use bevy::prelude::*;
use bitflags::bitflags;
#[cfg(feature = "serialize")]
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::prelude::*;

/// Event produced by a trigger state transition, ordered by firing priority.
///
/// When several sources feed the same action within a tick, the greatest event wins,
/// except for the first source of the tick which always overwrites.
///
/// Table of state transitions:
///
/// | Last state                   | New state                    | Event                   |
/// | ---------------------------- | ---------------------------- | ----------------------- |
/// | [`TriggerState::None`]       | [`TriggerState::None`]       | [`Self::None`]          |
/// | [`TriggerState::None`]       | [`TriggerState::Ongoing`]    | [`Self::Started`]       |
/// | [`TriggerState::None`]       | [`TriggerState::Triggered`]  | [`Self::StartedAndTriggered`] |
/// | [`TriggerState::Ongoing`]    | [`TriggerState::None`]       | [`Self::Canceled`]      |
/// | [`TriggerState::Ongoing`]    | [`TriggerState::Ongoing`]    | [`Self::Ongoing`]       |
/// | [`TriggerState::Ongoing`]    | [`TriggerState::Triggered`]  | [`Self::Triggered`]     |
/// | [`TriggerState::Triggered`]  | [`TriggerState::None`]       | [`Self::Completed`]     |
/// | [`TriggerState::Triggered`]  | [`TriggerState::Ongoing`]    | [`Self::None`]          |
/// | [`TriggerState::Triggered`]  | [`TriggerState::Triggered`]  | [`Self::Triggered`]     |
#[derive(Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy)]
#[cfg_attr(feature = "reflect", derive(Reflect), reflect(Clone, Debug, PartialEq))]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum TriggerEventInternal {
    #[default]
    None,
    Completed,
    Started,
    Ongoing,
    Canceled,
    StartedAndTriggered,
    Triggered,
}

impl TriggerEventInternal {
    /// Returns the event for a state transition.
    #[must_use]
    pub fn from_transition(last: TriggerState, new: TriggerState) -> Self {
        match (last, new) {
            (TriggerState::None, TriggerState::None) => Self::None,
            (TriggerState::None, TriggerState::Ongoing) => Self::Started,
            (TriggerState::None, TriggerState::Triggered) => Self::StartedAndTriggered,
            (TriggerState::Ongoing, TriggerState::None) => Self::Canceled,
            (TriggerState::Ongoing, TriggerState::Ongoing) => Self::Ongoing,
            (TriggerState::Ongoing, TriggerState::Triggered) => Self::Triggered,
            (TriggerState::Triggered, TriggerState::None) => Self::Completed,
            // Dropping back from triggered to ongoing has no event.
            (TriggerState::Triggered, TriggerState::Ongoing) => Self::None,
            (TriggerState::Triggered, TriggerState::Triggered) => Self::Triggered,
        }
    }
}

/// Publicly observable event of an action for the current tick.
///
/// Collapsed from [`TriggerEventInternal`]: a same-tick start and trigger
/// reports [`Self::Triggered`], while [`ActionEvents`] keeps both flags so bindings
/// to [`Self::Started`] still fire.
#[derive(Debug, Default, PartialEq, Eq, Hash, Clone, Copy)]
#[cfg_attr(feature = "reflect", derive(Reflect), reflect(Clone, Debug, PartialEq))]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum TriggerEvent {
    #[default]
    None,
    Started,
    Ongoing,
    Canceled,
    Triggered,
    Completed,
}

impl From<TriggerEventInternal> for TriggerEvent {
    fn from(value: TriggerEventInternal) -> Self {
        match value {
            TriggerEventInternal::None => Self::None,
            TriggerEventInternal::Completed => Self::Completed,
            TriggerEventInternal::Started => Self::Started,
            TriggerEventInternal::Ongoing => Self::Ongoing,
            TriggerEventInternal::Canceled => Self::Canceled,
            TriggerEventInternal::StartedAndTriggered | TriggerEventInternal::Triggered => {
                Self::Triggered
            }
        }
    }
}

impl TriggerEvent {
    /// Returns the flag corresponding to this event.
    #[must_use]
    pub fn flag(self) -> ActionEvents {
        match self {
            Self::None => ActionEvents::empty(),
            Self::Started => ActionEvents::STARTED,
            Self::Ongoing => ActionEvents::ONGOING,
            Self::Canceled => ActionEvents::CANCELED,
            Self::Triggered => ActionEvents::TRIGGERED,
            Self::Completed => ActionEvents::COMPLETED,
        }
    }
}

impl Display for TriggerEvent {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let name = match self {
            Self::None => "None",
            Self::Started => "Started",
            Self::Ongoing => "Ongoing",
            Self::Canceled => "Canceled",
            Self::Triggered => "Triggered",
            Self::Completed => "Completed",
        };
        f.write_str(name)
    }
}

/// Bitset with the public events of an action for the current tick.
///
/// Usually contains a single flag. [`TriggerEventInternal::StartedAndTriggered`]
/// sets both [`Self::STARTED`] and [`Self::TRIGGERED`].
#[derive(Default, Debug, PartialEq, Eq, Hash, Clone, Copy)]
#[cfg_attr(feature = "reflect", derive(Reflect), reflect(Clone, Debug, PartialEq))]
pub struct ActionEvents(u8);

bitflags! {
    impl ActionEvents: u8 {
        /// Corresponds to [`TriggerEvent::Started`].
        const STARTED = 0b00000001;
        /// Corresponds to [`TriggerEvent::Ongoing`].
        const ONGOING = 0b00000010;
        /// Corresponds to [`TriggerEvent::Triggered`].
        const TRIGGERED = 0b00000100;
        /// Corresponds to [`TriggerEvent::Canceled`].
        const CANCELED = 0b00001000;
        /// Corresponds to [`TriggerEvent::Completed`].
        const COMPLETED = 0b00010000;
    }
}

impl From<TriggerEventInternal> for ActionEvents {
    fn from(value: TriggerEventInternal) -> Self {
        match value {
            TriggerEventInternal::StartedAndTriggered => Self::STARTED | Self::TRIGGERED,
            event => TriggerEvent::from(event).flag(),
        }
    }
}

impl ActionEvents {
    /// Returns public events in firing order.
    pub fn iter_events(self) -> impl Iterator<Item = TriggerEvent> {
        [
            TriggerEvent::Started,
            TriggerEvent::Ongoing,
            TriggerEvent::Triggered,
            TriggerEvent::Canceled,
            TriggerEvent::Completed,
        ]
        .into_iter()
        .filter(move |event| self.contains(event.flag()))
    }
}

#[cfg(feature = "serialize")]
impl Serialize for ActionEvents {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        bitflags::serde::serialize(self, serializer)
    }
}

#[cfg(feature = "serialize")]
impl<'de> Deserialize<'de> for ActionEvents {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        bitflags::serde::deserialize(deserializer)
    }
}

/// Triggered on the player entity for every non-empty action event of a tick.
///
/// A same-tick start and trigger produces two events: [`TriggerEvent::Started`]
/// followed by [`TriggerEvent::Triggered`].
///
/// # Examples
///
/// ```
/// use bevy::prelude::*;
/// use bevy_enhanced_player_input::prelude::*;
///
/// let mut app = App::new();
/// app.add_observer(jump);
///
/// fn jump(event: On<InputActionEvent>) {
///     if event.action.as_str() == "Jump" && event.event == TriggerEvent::Triggered {
///         // Apply jump to `event.player`...
///     }
/// }
/// ```
#[derive(EntityEvent, Debug, Clone)]
pub struct InputActionEvent {
    /// Entity with [`EnhancedPlayerInput`].
    #[event_target]
    pub player: Entity,

    /// Action that produced the event.
    pub action: ActionId,

    pub event: TriggerEvent,

    /// Current action value.
    pub value: ActionValue,

    /// Time the action has been started, ongoing or triggered.
    pub elapsed_processed_secs: f32,

    /// Time the action has been triggered.
    pub elapsed_triggered_secs: f32,
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use super::*;

    #[test]
    fn none_transitions() {
        assert_eq!(
            TriggerEventInternal::from_transition(TriggerState::None, TriggerState::None),
            TriggerEventInternal::None
        );
        assert_eq!(
            TriggerEventInternal::from_transition(TriggerState::None, TriggerState::Ongoing),
            TriggerEventInternal::Started
        );
        assert_eq!(
            TriggerEventInternal::from_transition(TriggerState::None, TriggerState::Triggered),
            TriggerEventInternal::StartedAndTriggered
        );
    }

    #[test]
    fn ongoing_transitions() {
        assert_eq!(
            TriggerEventInternal::from_transition(TriggerState::Ongoing, TriggerState::None),
            TriggerEventInternal::Canceled
        );
        assert_eq!(
            TriggerEventInternal::from_transition(TriggerState::Ongoing, TriggerState::Ongoing),
            TriggerEventInternal::Ongoing
        );
        assert_eq!(
            TriggerEventInternal::from_transition(TriggerState::Ongoing, TriggerState::Triggered),
            TriggerEventInternal::Triggered
        );
    }

    #[test]
    fn triggered_transitions() {
        assert_eq!(
            TriggerEventInternal::from_transition(TriggerState::Triggered, TriggerState::None),
            TriggerEventInternal::Completed
        );
        assert_eq!(
            TriggerEventInternal::from_transition(TriggerState::Triggered, TriggerState::Ongoing),
            TriggerEventInternal::None,
        );
        assert_eq!(
            TriggerEventInternal::from_transition(
                TriggerState::Triggered,
                TriggerState::Triggered
            ),
            TriggerEventInternal::Triggered
        );
    }

    #[test]
    fn priority_order() {
        assert!(TriggerEventInternal::Completed > TriggerEventInternal::None);
        assert!(TriggerEventInternal::Started > TriggerEventInternal::Completed);
        assert!(TriggerEventInternal::Canceled > TriggerEventInternal::Ongoing);
        assert!(TriggerEventInternal::Triggered > TriggerEventInternal::StartedAndTriggered);
    }

    #[test]
    fn started_and_triggered_collapse() {
        let internal = TriggerEventInternal::StartedAndTriggered;
        assert_eq!(TriggerEvent::from(internal), TriggerEvent::Triggered);

        let events = ActionEvents::from(internal);
        assert!(events.contains(TriggerEvent::Started.flag()));
        assert!(events.contains(TriggerEvent::Triggered.flag()));
        assert_eq!(
            events.iter_events().collect::<Vec<_>>(),
            [TriggerEvent::Started, TriggerEvent::Triggered]
        );

        let events = ActionEvents::from(TriggerEventInternal::Triggered);
        assert!(!events.contains(TriggerEvent::Started.flag()));
    }
}
