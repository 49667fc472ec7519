//! # State Machine
//!
//! Generic finite-state container with enter/exit/tick hooks.
//!
//! Transition *policy* lives outside the machine: callers decide which
//! state to install next (the game phases use the explicit table in
//! [`crate::game::states`]). The machine only guarantees hook ordering and
//! that exactly one state is live at any instant.

/// Hooks a state type offers to the machine.
///
/// All hooks have empty default bodies so simple states only implement
/// what they need.
pub trait State {
    /// Called after the previous state's [`State::on_exit`], immediately
    /// before this state becomes current.
    fn on_enter(&mut self) {}

    /// Called when this state is replaced.
    fn on_exit(&mut self) {}

    /// Per-frame update hook, forwarded from [`StateMachine::tick`].
    fn on_tick(&mut self, _dt: f32) {}
}

/// Holds one current state value and dispatches hooks to it.
///
/// A state's `on_enter`/`on_exit` must not attempt to drive the machine
/// itself; the exclusive borrow taken by [`StateMachine::set_state`] makes
/// synchronous re-entrancy unrepresentable in safe code, so no runtime
/// guard is needed.
///
/// # Examples
///
/// ```
/// use forage::{State, StateMachine};
///
/// struct Counting(u32);
/// impl State for Counting {
///     fn on_enter(&mut self) { self.0 += 1; }
/// }
///
/// let mut machine = StateMachine::new();
/// machine.set_state(Counting(0));
/// assert_eq!(machine.current().unwrap().0, 1);
/// ```
#[derive(Debug)]
pub struct StateMachine<S: State> {
    current: Option<S>,
}

impl<S: State> StateMachine<S> {
    /// Creates a machine with no live state.
    pub fn new() -> Self {
        Self { current: None }
    }

    /// Transitions to `next`: runs `on_exit` on the outgoing state (if
    /// any), then `on_enter` on the incoming one, then installs it.
    pub fn set_state(&mut self, mut next: S) {
        if let Some(previous) = self.current.as_mut() {
            previous.on_exit();
        }
        next.on_enter();
        self.current = Some(next);
    }

    /// Forwards one frame to the current state's update hook.
    pub fn tick(&mut self, dt: f32) {
        if let Some(state) = self.current.as_mut() {
            state.on_tick(dt);
        }
    }

    /// The current state, if one has been installed.
    pub fn current(&self) -> Option<&S> {
        self.current.as_ref()
    }

    /// Mutable access to the current state.
    pub fn current_mut(&mut self) -> Option<&mut S> {
        self.current.as_mut()
    }
}

impl<S: State> Default for StateMachine<S> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct Probe {
        entered: u32,
        exited: u32,
        ticked: f32,
        log: Vec<&'static str>,
    }

    impl State for Probe {
        fn on_enter(&mut self) {
            self.entered += 1;
            self.log.push("enter");
        }

        fn on_exit(&mut self) {
            self.exited += 1;
            self.log.push("exit");
        }

        fn on_tick(&mut self, dt: f32) {
            self.ticked += dt;
        }
    }

    #[test]
    fn test_starts_empty() {
        let machine: StateMachine<Probe> = StateMachine::new();
        assert!(machine.current().is_none());
    }

    #[test]
    fn test_enter_runs_on_install() {
        let mut machine = StateMachine::new();
        machine.set_state(Probe::default());
        let state = machine.current().unwrap();
        assert_eq!(state.entered, 1);
        assert_eq!(state.exited, 0);
    }

    #[test]
    fn test_exit_runs_before_replacement() {
        let mut machine = StateMachine::new();
        machine.set_state(Probe::default());
        machine.set_state(Probe::default());
        // The replacement is fresh; it has only seen its own enter.
        let state = machine.current().unwrap();
        assert_eq!(state.log, vec!["enter"]);
        assert_eq!(state.exited, 0);
    }

    #[test]
    fn test_tick_forwards_to_current() {
        let mut machine = StateMachine::new();
        machine.tick(1.0); // no state yet, must not panic
        machine.set_state(Probe::default());
        machine.tick(0.25);
        machine.tick(0.25);
        assert_eq!(machine.current().unwrap().ticked, 0.5);
    }
}
