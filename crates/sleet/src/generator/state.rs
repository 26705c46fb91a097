use crate::{Error, Result, SleetId};

/// A copy of a generator's mutable state, taken under its lock.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct StateSnapshot {
    /// Absolute millisecond (since the Unix epoch) of the last issued ID, or
    /// `None` before the first one.
    pub last_millis: Option<u64>,
    /// Sequence value of the last issued ID.
    pub sequence: u64,
}

/// What a clock reading means for the current state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Step {
    /// Issue an ID with these values.
    Issue { millis: u64, sequence: u64 },
    /// All sequence values of `last_millis` are spent.
    Exhausted { last_millis: u64 },
}

/// The `(last_millis, sequence)` pair. Only ever touched under the
/// generator's lock.
#[derive(Debug, Default)]
pub(crate) struct SequenceState {
    last_millis: Option<u64>,
    sequence: u64,
}

impl SequenceState {
    /// Classifies `now` against the state without mutating it.
    pub(crate) fn step(&self, now: u64) -> Result<Step> {
        match self.last_millis {
            Some(last_millis) if now < last_millis => Err(cold_clock_behind(last_millis, now)),
            Some(last_millis) if now == last_millis => {
                let sequence = (self.sequence + 1) & SleetId::SEQUENCE_MASK;
                if sequence == 0 {
                    Ok(Step::Exhausted { last_millis })
                } else {
                    Ok(Step::Issue {
                        millis: now,
                        sequence,
                    })
                }
            }
            _ => Ok(Step::Issue {
                millis: now,
                sequence: 0,
            }),
        }
    }

    pub(crate) fn commit(&mut self, millis: u64, sequence: u64) {
        debug_assert!(sequence <= SleetId::SEQUENCE_MASK, "sequence overflow");
        debug_assert!(self.last_millis.is_none_or(|last| millis >= last));
        self.last_millis = Some(millis);
        self.sequence = sequence;
    }

    pub(crate) fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            last_millis: self.last_millis,
            sequence: self.sequence,
        }
    }
}

#[cold]
#[inline(never)]
fn cold_clock_behind(last_millis: u64, now: u64) -> Error {
    #[cfg(feature = "tracing")]
    tracing::warn!(last_millis, now, "clock moved backwards, refusing to issue id");
    Error::ClockRolledBack { last_millis, now }
}
