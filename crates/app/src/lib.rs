pub mod driver;
pub mod launcher;
pub mod settings;

pub use driver::{
    inspect, inspect_table, run, run_table, GroupFailure, RunContext, RunError, RunEvent, RunOutcome,
    RunStatus,
};
pub use launcher::{build_command, launch, GeneratorCard, LaunchError, CARDS, DEFAULT_SCRUBBED_PREFIXES};
pub use settings::{Settings, SettingsError};
