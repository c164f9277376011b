use std::collections::{HashMap, HashSet};

/// A gameplay intent. Physical keys are mapped onto these by [`KeyBindings`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    Left,
    Right,
    Jump,
    Shoot,
    Quit,
}

/// Input for one frame: held actions plus the edges seen since the last frame.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InputSnapshot {
    held: HashSet<Action>,
    pressed: HashSet<Action>,
    released: HashSet<Action>,
}

impl InputSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// A snapshot with `actions` held and no edges.
    pub fn holding(actions: &[Action]) -> Self {
        Self {
            held: actions.iter().copied().collect(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_pressed(mut self, action: Action) -> Self {
        self.pressed.insert(action);
        self.held.insert(action);
        self
    }

    #[must_use]
    pub fn with_released(mut self, action: Action) -> Self {
        self.released.insert(action);
        self.held.remove(&action);
        self
    }

    /// Returns true if the action is currently held down.
    pub fn is_held(&self, action: Action) -> bool {
        self.held.contains(&action)
    }

    /// Returns true if the action went down this frame.
    pub fn was_pressed(&self, action: Action) -> bool {
        self.pressed.contains(&action)
    }

    /// Returns true if the action went up this frame.
    pub fn was_released(&self, action: Action) -> bool {
        self.released.contains(&action)
    }

    /// Horizontal intent in `{-1, 0, 1}`. Left wins when both are held.
    pub fn horizontal(&self) -> f32 {
        if self.is_held(Action::Left) {
            -1.0
        } else if self.is_held(Action::Right) {
            1.0
        } else {
            0.0
        }
    }
}

/// Accumulates press/release events between frames.
#[derive(Clone, Debug, Default)]
pub struct InputState {
    held: HashSet<Action>,
    pressed: HashSet<Action>,
    released: HashSet<Action>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, action: Action) {
        if self.held.insert(action) {
            self.pressed.insert(action);
        }
    }

    pub fn release(&mut self, action: Action) {
        if self.held.remove(&action) {
            self.released.insert(action);
        }
    }

    pub fn is_held(&self, action: Action) -> bool {
        self.held.contains(&action)
    }

    /// Snapshot of the current frame. Clears the per-frame edge sets.
    pub fn take_snapshot(&mut self) -> InputSnapshot {
        InputSnapshot {
            held: self.held.clone(),
            pressed: std::mem::take(&mut self.pressed),
            released: std::mem::take(&mut self.released),
        }
    }
}

/// Maps key names coming from a window/backend onto actions.
#[derive(Clone, Debug)]
pub struct KeyBindings {
    keys: HashMap<String, Action>,
}

impl KeyBindings {
    pub fn new() -> Self {
        Self {
            keys: HashMap::new(),
        }
    }

    pub fn bind(&mut self, key: impl Into<String>, action: Action) {
        self.keys.insert(key.into(), action);
    }

    pub fn action_for(&self, key: &str) -> Option<Action> {
        self.keys.get(key).copied()
    }

    /// Feed a key event into `state`. Unbound keys are ignored.
    pub fn handle_key(&self, state: &mut InputState, key: &str, pressed: bool) -> Option<Action> {
        let action = self.action_for(key)?;
        if pressed {
            state.press(action);
        } else {
            state.release(action);
        }
        Some(action)
    }
}

impl Default for KeyBindings {
    /// Arrow keys move, space jumps, `x` shoots, escape quits.
    fn default() -> Self {
        let mut bindings = Self::new();
        bindings.bind("ArrowLeft", Action::Left);
        bindings.bind("ArrowRight", Action::Right);
        bindings.bind("Space", Action::Jump);
        bindings.bind("KeyX", Action::Shoot);
        bindings.bind("Escape", Action::Quit);
        bindings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edges_are_reported_once() {
        let mut state = InputState::new();
        state.press(Action::Jump);
        state.press(Action::Jump);

        let first = state.take_snapshot();
        assert!(first.is_held(Action::Jump));
        assert!(first.was_pressed(Action::Jump));

        let second = state.take_snapshot();
        assert!(second.is_held(Action::Jump));
        assert!(!second.was_pressed(Action::Jump));

        state.release(Action::Jump);
        let third = state.take_snapshot();
        assert!(!third.is_held(Action::Jump));
        assert!(third.was_released(Action::Jump));
    }

    #[test]
    fn release_without_press_is_ignored() {
        let mut state = InputState::new();
        state.release(Action::Shoot);
        assert!(!state.take_snapshot().was_released(Action::Shoot));
    }

    #[test]
    fn left_wins_over_right() {
        let snap = InputSnapshot::holding(&[Action::Left, Action::Right]);
        assert_eq!(snap.horizontal(), -1.0);
        assert_eq!(InputSnapshot::holding(&[Action::Right]).horizontal(), 1.0);
        assert_eq!(InputSnapshot::new().horizontal(), 0.0);
    }

    #[test]
    fn bindings_route_key_names() {
        let bindings = KeyBindings::default();
        let mut state = InputState::new();
        assert_eq!(bindings.handle_key(&mut state, "Space", true), Some(Action::Jump));
        assert_eq!(bindings.handle_key(&mut state, "KeyQ", true), None);
        assert!(state.is_held(Action::Jump));
    }
}
