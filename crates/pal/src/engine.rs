//! Per-pass context handed to candidate generation.

use crate::feedback::{Feedback, NoFeedback};
use crate::label::PalSettings;

/// Engine settings plus the cancellation capability of the current pass.
pub struct Pal<'f> {
    pub settings: PalSettings,
    feedback: &'f dyn Feedback,
}

impl Pal<'static> {
    pub fn new(settings: PalSettings) -> Self {
        Self {
            settings,
            feedback: &NoFeedback,
        }
    }
}

impl<'f> Pal<'f> {
    pub fn with_feedback(settings: PalSettings, feedback: &'f dyn Feedback) -> Self {
        Self { settings, feedback }
    }

    #[inline]
    pub fn is_canceled(&self) -> bool {
        self.feedback.is_canceled()
    }
}

impl std::fmt::Debug for Pal<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pal").field("settings", &self.settings).finish_non_exhaustive()
    }
}
