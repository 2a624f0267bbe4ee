mod accumulator;
mod engine;
mod recovery;
mod snapshot;
mod ticker;

pub use accumulator::Accumulator;
pub use engine::{MainOutcome, Phase, PhaseSignal, TimerEngine, TimerMode};
pub use recovery::{recover, Recovered, MAX_OFFLINE_MS};
pub use snapshot::{SessionSnapshot, SNAPSHOT_KEY};
pub use ticker::{Tick, Ticker, TICK_MS};
