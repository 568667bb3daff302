//! Session engine - guided execution of one routine
//!
//! Phases: Preview -> Active -> (rest | ExerciseSummary)* -> Finished, with
//! Resuming at start-up when a same-day snapshot exists. Resting is Active
//! with a rest countdown running; set completion is blocked meanwhile.
//!
//! The position (exercise, set, sub-exercise) is snapshotted on every change
//! while Active so an interrupted session can resume at the start of the
//! current set. Countdown values are never persisted.

use anyhow::Result;
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::db::DocumentStore;
use crate::model::{
    Descriptor, Exercise, HistoryEntry, Measure, Position, Routine, SessionSnapshot, Target,
};
use crate::storage::Storage;

use super::timer::{Countdown, TickSource};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Same-day snapshot found, waiting for resume or discard
    Resuming,
    Preview,
    Active,
    ExerciseSummary,
    Finished,
}

/// Why an action was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Blocked {
    Resting,
    CountdownRunning,
    NoCountdown,
    NoRoutine,
    NoExercise,
    WrongPhase(Phase),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Started,
    Resumed(Position),
    SnapshotDiscarded,
    NextSubExercise { index: usize },
    NextSet { set: u32, rest_secs: Option<u32> },
    ExerciseCompleted { exercise_index: usize },
    NextExercise { exercise_index: usize },
    CountdownStarted { secs: u32 },
    RestFinished,
    Finished(HistoryEntry),
    /// Nothing to record; the caller should just leave
    Exit,
    Blocked(Blocked),
}

pub struct SessionEngine<S: DocumentStore, C: Clock> {
    storage: Storage<S>,
    clock: C,
    routine: Option<Routine>,
    routine_index: usize,
    phase: Phase,
    position: Position,
    rest: Option<Countdown>,
    countdown: Option<Countdown>,
    pending: Option<SessionSnapshot>,
}

impl<S: DocumentStore, C: Clock> SessionEngine<S, C> {
    /// Load `routine_id` and check for a saved snapshot.
    ///
    /// A snapshot from another day is cleared. One from today puts the
    /// engine in `Resuming` until the caller resumes or discards it.
    pub fn open(mut storage: Storage<S>, clock: C, routine_id: &str, routine_index: usize) -> Result<Self> {
        let routine = storage.routines()?.into_iter().find(|r| r.id == routine_id);
        if routine.is_none() {
            warn!(routine_id, "Routine not found, nothing to train");
        }

        let today = clock.today();
        let mut phase = Phase::Preview;
        let mut pending = None;

        if let Some(saved) = storage.snapshot()? {
            if saved.date != today {
                debug!(date = %saved.date, "Discarding stale snapshot");
                storage.clear_snapshot()?;
            } else {
                info!(
                    exercise = saved.exercise_index,
                    set = saved.current_set,
                    "Unfinished session from today"
                );
                pending = Some(saved);
                phase = Phase::Resuming;
            }
        }

        Ok(Self {
            storage,
            clock,
            routine,
            routine_index,
            phase,
            position: Position::start(),
            rest: None,
            countdown: None,
            pending,
        })
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn routine(&self) -> Option<&Routine> {
        self.routine.as_ref()
    }

    pub fn routine_index(&self) -> usize {
        self.routine_index
    }

    /// Snapshot awaiting a resume/discard decision
    pub fn pending_snapshot(&self) -> Option<&SessionSnapshot> {
        self.pending.as_ref()
    }

    pub fn storage(&self) -> &Storage<S> {
        &self.storage
    }

    pub fn into_storage(self) -> Storage<S> {
        self.storage
    }

    pub fn active_exercise(&self) -> Option<&Exercise> {
        self.routine.as_ref()?.exercises.get(self.position.exercise_index)
    }

    pub fn next_exercise(&self) -> Option<&Exercise> {
        self.routine.as_ref()?.exercises.get(self.position.exercise_index + 1)
    }

    pub fn descriptor(&self) -> Option<Descriptor<'_>> {
        self.active_exercise()?.descriptor(self.position.sub_exercise_index)
    }

    /// Target of the active descriptor for the current set
    pub fn current_target(&self) -> Option<u32> {
        self.descriptor()
            .map(|d| resolve_target(d.target, self.position.current_set))
    }

    pub fn is_resting(&self) -> bool {
        self.rest.is_some()
    }

    pub fn rest_remaining(&self) -> Option<u32> {
        self.rest.map(|c| c.remaining())
    }

    pub fn countdown_remaining(&self) -> Option<u32> {
        self.countdown.map(|c| c.remaining())
    }

    /// Preview -> Active
    pub fn begin(&mut self) -> Result<SessionEvent> {
        if self.phase != Phase::Preview {
            return Ok(SessionEvent::Blocked(Blocked::WrongPhase(self.phase)));
        }
        if self.routine.is_none() {
            return Ok(SessionEvent::Blocked(Blocked::NoRoutine));
        }
        self.position = Position::start();
        self.phase = Phase::Active;
        self.save_snapshot()?;
        info!(routine_index = self.routine_index, "Session started");
        Ok(SessionEvent::Started)
    }

    /// Restore the pending snapshot and go straight to Active
    pub fn resume(&mut self) -> Result<SessionEvent> {
        if self.phase != Phase::Resuming {
            return Ok(SessionEvent::Blocked(Blocked::WrongPhase(self.phase)));
        }
        if self.routine.is_none() {
            return Ok(SessionEvent::Blocked(Blocked::NoRoutine));
        }
        let Some(saved) = self.pending.take() else {
            self.phase = Phase::Preview;
            return Ok(SessionEvent::Blocked(Blocked::WrongPhase(Phase::Resuming)));
        };

        if let Some(routine) = self.routine.as_ref()
            && routine.id != saved.routine_id
        {
            warn!(
                saved = %saved.routine_id,
                today = %routine.id,
                "Snapshot belongs to another routine, resuming today's"
            );
        }

        let mut position = saved.position();
        if !self.fits(position) {
            warn!(?position, "Snapshot does not fit this routine, starting over");
            self.storage.clear_snapshot()?;
            self.phase = Phase::Preview;
            return Ok(SessionEvent::SnapshotDiscarded);
        }
        if self.exercise_at(position.exercise_index).is_some_and(|e| !e.is_superset()) {
            position.sub_exercise_index = 0;
        }

        self.position = position;
        self.phase = Phase::Active;
        self.save_snapshot()?;
        info!(?position, "Session resumed");
        Ok(SessionEvent::Resumed(position))
    }

    /// Drop the pending snapshot and go to Preview
    pub fn discard_snapshot(&mut self) -> Result<SessionEvent> {
        if self.phase != Phase::Resuming {
            return Ok(SessionEvent::Blocked(Blocked::WrongPhase(self.phase)));
        }
        self.pending = None;
        self.storage.clear_snapshot()?;
        self.phase = Phase::Preview;
        Ok(SessionEvent::SnapshotDiscarded)
    }

    /// The "complete set" action.
    ///
    /// For a timed descriptor this starts its countdown instead; the set
    /// completes when the countdown expires or on `stop_early`.
    pub fn complete_set(&mut self) -> Result<SessionEvent> {
        if self.phase != Phase::Active {
            return Ok(SessionEvent::Blocked(Blocked::WrongPhase(self.phase)));
        }
        if self.rest.is_some() {
            return Ok(SessionEvent::Blocked(Blocked::Resting));
        }

        let (measure, target) = match self.descriptor() {
            Some(d) => (d.measure, resolve_target(d.target, self.position.current_set)),
            None => return Ok(SessionEvent::Blocked(Blocked::NoExercise)),
        };

        match measure {
            Measure::Reps => self.advance_set(),
            Measure::Time => {
                if self.countdown.is_some() {
                    return Ok(SessionEvent::Blocked(Blocked::CountdownRunning));
                }
                if target == 0 {
                    return self.advance_set();
                }
                self.countdown = Some(Countdown::new(target));
                debug!(secs = target, "Countdown started");
                Ok(SessionEvent::CountdownStarted { secs: target })
            }
        }
    }

    /// Cut a running countdown short and count the set as done
    pub fn stop_early(&mut self) -> Result<SessionEvent> {
        if self.phase != Phase::Active || self.countdown.is_none() {
            return Ok(SessionEvent::Blocked(Blocked::NoCountdown));
        }
        self.countdown = None;
        self.advance_set()
    }

    /// One second of session time
    pub fn tick(&mut self) -> Result<Option<SessionEvent>> {
        if self.phase != Phase::Active {
            return Ok(None);
        }

        if let Some(rest) = self.rest.as_mut() {
            if rest.tick() {
                self.rest = None;
                debug!("Rest finished");
                return Ok(Some(SessionEvent::RestFinished));
            }
            return Ok(None);
        }

        if let Some(countdown) = self.countdown.as_mut()
            && countdown.tick()
        {
            self.countdown = None;
            return self.advance_set().map(Some);
        }

        Ok(None)
    }

    /// Apply `ticks` seconds, collecting whatever happened
    pub fn advance(&mut self, ticks: u32) -> Result<Vec<SessionEvent>> {
        let mut events = Vec::new();
        for _ in 0..ticks {
            if let Some(event) = self.tick()? {
                events.push(event);
            }
        }
        Ok(events)
    }

    /// Drain a tick source into the engine
    pub fn pump(&mut self, source: &mut impl TickSource) -> Result<Vec<SessionEvent>> {
        let ticks = source.poll_ticks();
        self.advance(ticks)
    }

    /// ExerciseSummary -> next exercise, or finish after the last one
    pub fn continue_next(&mut self) -> Result<SessionEvent> {
        if self.phase != Phase::ExerciseSummary {
            return Ok(SessionEvent::Blocked(Blocked::WrongPhase(self.phase)));
        }
        if self.next_exercise().is_none() {
            return self.finish();
        }

        self.position = Position {
            exercise_index: self.position.exercise_index + 1,
            current_set: 1,
            sub_exercise_index: 0,
        };
        self.phase = Phase::Active;
        self.save_snapshot()?;
        Ok(SessionEvent::NextExercise {
            exercise_index: self.position.exercise_index,
        })
    }

    /// End the session early; partial sessions are recorded too.
    /// Not allowed while a timed set is counting down.
    pub fn terminate(&mut self) -> Result<SessionEvent> {
        match self.phase {
            Phase::Active | Phase::ExerciseSummary => {}
            other => return Ok(SessionEvent::Blocked(Blocked::WrongPhase(other))),
        }
        if self.countdown.is_some() {
            return Ok(SessionEvent::Blocked(Blocked::CountdownRunning));
        }
        self.finish()
    }

    /// Record the history entry, clear the snapshot, go to Finished.
    /// Only a started session is recorded; without a routine this only
    /// signals Exit.
    pub fn finish(&mut self) -> Result<SessionEvent> {
        let Some(routine) = self.routine.as_ref() else {
            return Ok(SessionEvent::Exit);
        };
        if !matches!(self.phase, Phase::Active | Phase::ExerciseSummary) {
            return Ok(SessionEvent::Blocked(Blocked::WrongPhase(self.phase)));
        }

        let entry = HistoryEntry::new(self.clock.today(), routine, self.routine_index);
        self.storage.append_history(entry.clone())?;
        self.storage.clear_snapshot()?;

        self.rest = None;
        self.countdown = None;
        self.pending = None;
        self.phase = Phase::Finished;
        info!(routine = %entry.routine_name, date = %entry.date, "Session recorded");
        Ok(SessionEvent::Finished(entry))
    }

    /// Set-completion transition: next sub-exercise, next set (with rest),
    /// or exercise done.
    fn advance_set(&mut self) -> Result<SessionEvent> {
        let Some(exercise) = self.active_exercise() else {
            return Ok(SessionEvent::Blocked(Blocked::NoExercise));
        };
        let sub_count = exercise.sub_exercises().len();
        let set_count = exercise.set_count;
        let rest = exercise.rest_between_sets_seconds;

        if self.position.sub_exercise_index + 1 < sub_count {
            self.position.sub_exercise_index += 1;
            self.save_snapshot()?;
            return Ok(SessionEvent::NextSubExercise {
                index: self.position.sub_exercise_index,
            });
        }

        if self.position.current_set < set_count {
            self.position.current_set += 1;
            self.position.sub_exercise_index = 0;
            let rest_secs = (rest > 0).then_some(rest);
            self.rest = rest_secs.map(Countdown::new);
            self.save_snapshot()?;
            return Ok(SessionEvent::NextSet {
                set: self.position.current_set,
                rest_secs,
            });
        }

        self.phase = Phase::ExerciseSummary;
        debug!(exercise = self.position.exercise_index, "Exercise complete");
        Ok(SessionEvent::ExerciseCompleted {
            exercise_index: self.position.exercise_index,
        })
    }

    fn save_snapshot(&mut self) -> Result<()> {
        if self.phase != Phase::Active {
            return Ok(());
        }
        let Some(routine) = self.routine.as_ref() else {
            return Ok(());
        };
        let snapshot = SessionSnapshot {
            routine_id: routine.id.clone(),
            date: self.clock.today(),
            exercise_index: self.position.exercise_index,
            current_set: self.position.current_set,
            sub_exercise_index: self.position.sub_exercise_index,
            saved_at: self.clock.now(),
        };
        self.storage.save_snapshot(&snapshot)
    }

    fn exercise_at(&self, index: usize) -> Option<&Exercise> {
        self.routine.as_ref().and_then(|r| r.exercises.get(index))
    }

    fn fits(&self, position: Position) -> bool {
        let Some(exercise) = self.exercise_at(position.exercise_index) else {
            return false;
        };
        let subs = exercise.sub_exercises().len();
        position.current_set >= 1
            && position.current_set <= exercise.set_count
            && (subs == 0 || position.sub_exercise_index < subs)
    }
}

/// Target for a 1-indexed set, clamped to the last per-set value
pub fn resolve_target(target: &Target, set: u32) -> u32 {
    target.for_set(set)
}
