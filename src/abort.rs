use std::{cell::Cell, fmt::Display};

use crate::error;

/// Whether a command is being dispatched.
///
/// Aborting reports the failure and clears the flag, so an abort raised
/// while another one is already being handled prints nothing.
#[derive(Debug, Default)]
pub struct Running(Cell<bool>);

impl Running {
    pub fn start(&self) {
        self.0.set(true);
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.0.get()
    }

    /// Returns `true` if this call reported `err`.
    pub fn abort(&self, err: impl Display) -> bool {
        if self.0.replace(false) {
            error!(err);
            true
        } else {
            false
        }
    }
}
