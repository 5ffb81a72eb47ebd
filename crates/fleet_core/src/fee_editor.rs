//! Admin fee edit form state.

use crate::error::ExecutorError;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeeEditor {
    open: bool,
    input: String,
}

impl FeeEditor {
    pub fn open(&mut self) {
        self.open = true;
    }

    /// Hides the form. The input buffer survives a cancel, like the form did.
    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn set_input(&mut self, value: impl Into<String>) {
        self.input = value.into();
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn parse(&self) -> Result<i128, ExecutorError> {
        let trimmed = self.input.trim();
        match trimmed.parse::<i128>() {
            Ok(fee) if fee >= 0 => Ok(fee),
            _ => Err(ExecutorError::InvalidFeeInput(trimmed.to_string())),
        }
    }

    /// Applied after a confirmed fee change.
    pub(crate) fn finish(&mut self) {
        self.open = false;
        self.input.clear();
    }
}
