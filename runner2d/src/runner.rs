//! Fixed-rate frame loop tying an input source, the world and a renderer together.

use std::time::{Duration, Instant};

use anyhow::{Context, Result};

use crate::camera::Camera;
use crate::input::{Action, InputSnapshot, InputState};
use crate::math::Rect;
use crate::world::{DrawCommand, EndReason, RoundState, World};

/// Produces one input snapshot per frame. `None` means the source closed.
pub trait InputSource {
    fn next_frame(&mut self, frame: u64) -> Result<Option<InputSnapshot>>;
}

/// Everything a renderer needs for one frame, in screen space.
pub struct RenderFrame<'a> {
    pub frame: u64,
    pub now_ms: u64,
    pub camera: &'a Camera,
    pub platforms: &'a [Rect],
    pub commands: &'a [DrawCommand],
    pub player_health: i32,
}

pub trait FrameRenderer {
    fn render(&mut self, frame: &RenderFrame<'_>) -> Result<()>;
}

/// Sleeps so frames start at a fixed rate. A late frame resets the schedule
/// instead of trying to catch up.
#[derive(Debug)]
pub struct FramePacer {
    frame_duration: Duration,
    next_deadline: Option<Instant>,
    enabled: bool,
}

impl FramePacer {
    pub fn new(fps: u32) -> Self {
        Self {
            frame_duration: Duration::from_secs_f64(1.0 / f64::from(fps.max(1))),
            next_deadline: None,
            enabled: true,
        }
    }

    /// A pacer that never sleeps; simulated time still advances per frame.
    pub fn unpaced(fps: u32) -> Self {
        Self {
            enabled: false,
            ..Self::new(fps)
        }
    }

    pub fn frame_duration(&self) -> Duration {
        self.frame_duration
    }

    /// Simulated clock reading at the start of `frame`.
    pub fn frame_time_ms(&self, frame: u64) -> u64 {
        (self.frame_duration.as_secs_f64() * 1000.0 * frame as f64).round() as u64
    }

    pub fn wait(&mut self) {
        if !self.enabled {
            return;
        }
        let now = Instant::now();
        let deadline = self.next_deadline.unwrap_or(now + self.frame_duration);
        if deadline > now {
            std::thread::sleep(deadline - now);
            self.next_deadline = Some(deadline + self.frame_duration);
        } else {
            self.next_deadline = Some(now + self.frame_duration);
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunSummary {
    pub frames: u64,
    pub state: RoundState,
}

pub struct GameLoop {
    pacer: FramePacer,
    max_frames: Option<u64>,
}

impl GameLoop {
    pub fn new(pacer: FramePacer) -> Self {
        Self {
            pacer,
            max_frames: None,
        }
    }

    /// Stop after `frames` frames even if the round is still running.
    #[must_use]
    pub fn with_max_frames(mut self, frames: u64) -> Self {
        self.max_frames = Some(frames);
        self
    }

    /// Runs frames until the round ends, the input source closes or the
    /// frame limit is hit.
    pub fn run(
        &mut self,
        world: &mut World,
        input: &mut dyn InputSource,
        renderer: &mut dyn FrameRenderer,
    ) -> Result<RunSummary> {
        let mut frame = 0;
        let mut state = world.state();

        while !state.is_over() && self.max_frames.map_or(true, |max| frame < max) {
            let Some(snapshot) = input
                .next_frame(frame)
                .with_context(|| format!("reading input for frame {frame}"))?
            else {
                log::info!("input closed after {frame} frames");
                state = RoundState::Over(EndReason::Quit);
                break;
            };

            let now_ms = self.pacer.frame_time_ms(frame);
            state = world.step(&snapshot, now_ms);

            let platforms = world.visible_platforms();
            let commands = world.draw_list();
            renderer
                .render(&RenderFrame {
                    frame,
                    now_ms,
                    camera: world.camera(),
                    platforms: &platforms,
                    commands: &commands,
                    player_health: world.player().health(),
                })
                .with_context(|| format!("rendering frame {frame}"))?;

            frame += 1;
            self.pacer.wait();
        }

        Ok(RunSummary { frames: frame, state })
    }
}

/// One stretch of a scripted run: hold `actions` for `frames` frames.
#[derive(Clone, Debug)]
pub struct ScriptStep {
    pub frames: u64,
    pub actions: Vec<Action>,
}

impl ScriptStep {
    pub fn new(frames: u64, actions: &[Action]) -> Self {
        Self {
            frames,
            actions: actions.to_vec(),
        }
    }

    pub fn idle(frames: u64) -> Self {
        Self::new(frames, &[])
    }
}

/// Replays a fixed script of held actions, generating press/release edges
/// between steps. Closes when the script runs out.
#[derive(Clone, Debug)]
pub struct ScriptedInput {
    steps: Vec<ScriptStep>,
    step: usize,
    frames_in_step: u64,
    state: InputState,
}

impl ScriptedInput {
    pub fn new(steps: Vec<ScriptStep>) -> Self {
        Self {
            steps,
            step: 0,
            frames_in_step: 0,
            state: InputState::new(),
        }
    }
}

impl InputSource for ScriptedInput {
    fn next_frame(&mut self, _frame: u64) -> Result<Option<InputSnapshot>> {
        while self
            .steps
            .get(self.step)
            .is_some_and(|s| self.frames_in_step >= s.frames)
        {
            self.step += 1;
            self.frames_in_step = 0;
        }
        let Some(step) = self.steps.get(self.step) else {
            return Ok(None);
        };

        for action in [Action::Left, Action::Right, Action::Jump, Action::Shoot, Action::Quit] {
            if step.actions.contains(&action) {
                self.state.press(action);
            } else {
                self.state.release(action);
            }
        }
        self.frames_in_step += 1;
        Ok(Some(self.state.take_snapshot()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_generates_edges_and_closes() {
        let mut input = ScriptedInput::new(vec![ScriptStep::new(2, &[Action::Jump]), ScriptStep::idle(1)]);

        let first = input.next_frame(0).unwrap().unwrap();
        assert!(first.was_pressed(Action::Jump));
        let second = input.next_frame(1).unwrap().unwrap();
        assert!(second.is_held(Action::Jump) && !second.was_pressed(Action::Jump));
        let third = input.next_frame(2).unwrap().unwrap();
        assert!(third.was_released(Action::Jump));
        assert!(input.next_frame(3).unwrap().is_none());
    }

    #[test]
    fn simulated_clock_follows_fps() {
        let pacer = FramePacer::unpaced(60);
        assert_eq!(pacer.frame_time_ms(0), 0);
        assert_eq!(pacer.frame_time_ms(60), 1000);
        assert_eq!(pacer.frame_time_ms(3), 50);
    }
}
