//! Error surface for the fallible seams of the core: save-state slots,
//! script loading, and invalid watch unregistration reported by host
//! wrappers. The instruction loop itself never returns `Result` — every
//! 65C816 architectural event (interrupt, stop, wait) is represented as
//! state, not failure.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("no callback matched the given (type, cpu, reference, start, end)")]
    InvalidRegistration,

    #[error("save slot {0} has no stored state")]
    SaveStateUnavailable(i32),

    #[error("script failed to load")]
    ScriptLoadFailed,
}

pub type CoreResult<T> = Result<T, CoreError>;
