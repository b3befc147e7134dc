mod clock;
mod engine;

pub use clock::{parse_day, Clock, ClockMode, FixedClock, LocalClock, UtcClock};
pub use engine::{day_difference, BackdatePolicy, StreakEngine, StreakRecord, StreakView};
