//! Suspendable processes
//!
//! Replaces engine coroutines: each task is advanced once per frame by the
//! tick driver, in registration order, until it reports `Done`.

use super::block::BlockId;
use super::coord::Direction;
use super::player::PlayerId;
use super::slide::SlideTask;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    Running,
    Done,
}

#[derive(Debug, Clone)]
pub enum Task {
    /// A block in flight between columns
    Slide(SlideTask),
    /// A player's push, started after the wind-up delay
    DelayedSlide {
        player: PlayerId,
        block: BlockId,
        direction: Direction,
        remaining: f32,
    },
}

impl Task {
    pub fn advance(&mut self, dt: f32) -> TaskStatus {
        match self {
            Task::Slide(slide) => slide.advance(dt),
            Task::DelayedSlide { remaining, .. } => {
                *remaining -= dt;
                if *remaining <= 0.0 {
                    TaskStatus::Done
                } else {
                    TaskStatus::Running
                }
            }
        }
    }
}

/// Registered tasks, oldest first
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    tasks: Vec<Task>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a task; it first advances on the next `run`
    pub fn spawn(&mut self, task: Task) {
        self.tasks.push(task);
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter()
    }

    /// Blocks currently sliding
    pub fn slides(&self) -> impl Iterator<Item = &SlideTask> {
        self.tasks.iter().filter_map(|t| match t {
            Task::Slide(slide) => Some(slide),
            Task::DelayedSlide { .. } => None,
        })
    }

    /// Advance every registered task by `dt` and return the finished ones in
    /// registration order. Tasks spawned while the caller handles the
    /// finished list wait for the next frame.
    pub fn run(&mut self, dt: f32) -> Vec<Task> {
        let mut finished = Vec::new();
        let mut running = Vec::with_capacity(self.tasks.len());
        for mut task in self.tasks.drain(..) {
            match task.advance(dt) {
                TaskStatus::Running => running.push(task),
                TaskStatus::Done => finished.push(task),
            }
        }
        self.tasks = running;
        finished
    }
}
