//! Id and clock sources consumed by the task reducer.
//!
//! The reducer never calls `Uuid::new_v4` or `Utc::now` directly, so tests can
//! drive it with deterministic values.

use crate::model::timestamp::Timestamp;
use chrono::{Duration, Utc};
use uuid::Uuid;

/// Side-effect seam for identity and time.
pub trait BoardEffects {
    fn next_id(&mut self) -> Uuid;
    fn now(&mut self) -> Timestamp;
}

/// Random v4 ids and the system clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemEffects;

impl BoardEffects for SystemEffects {
    fn next_id(&mut self) -> Uuid {
        Uuid::new_v4()
    }

    fn now(&mut self) -> Timestamp {
        Utc::now()
    }
}

/// Sequential ids and a clock that advances one second per reading.
#[derive(Debug, Clone)]
pub struct FixedEffects {
    next: u128,
    clock: Timestamp,
}

impl FixedEffects {
    pub fn starting_at(clock: Timestamp) -> Self {
        Self { next: 1, clock }
    }
}

impl BoardEffects for FixedEffects {
    fn next_id(&mut self) -> Uuid {
        let id = Uuid::from_u128(self.next);
        self.next += 1;
        id
    }

    fn now(&mut self) -> Timestamp {
        let current = self.clock;
        self.clock += Duration::seconds(1);
        current
    }
}
