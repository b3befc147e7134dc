pub mod config;
pub mod streak;
pub mod todo;

use tickoff_core::streak::{Clock, FixedClock};
use tickoff_core::{Config, Database, Tracker};
use tracing::debug;

pub type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Global flags shared by the todo and streak commands.
pub struct Context {
    user: Option<String>,
    today: Option<String>,
}

impl Context {
    pub fn new(user: Option<String>, today: Option<String>) -> Self {
        Self { user, today }
    }

    /// Build a tracker from config plus the global overrides.
    pub fn tracker(
        &self,
    ) -> Result<(String, Tracker<Database, Box<dyn Clock + Send + Sync>>), Box<dyn std::error::Error>>
    {
        let config = Config::load()?;

        let clock: Box<dyn Clock + Send + Sync> = match self.today.as_deref() {
            Some(day) => Box::new(FixedClock::parse(day)?),
            None => config.clock.mode.system_clock(),
        };

        let user = self
            .user
            .clone()
            .unwrap_or_else(|| config.user.default_id.clone());

        debug!(user = %user, fixed_today = ?self.today, "building tracker");
        let db = Database::open(config.storage.busy_timeout())?;
        let tracker = Tracker::new(db, clock, config.engine())
            .with_max_retries(config.storage.max_retries);
        Ok((user, tracker))
    }
}
