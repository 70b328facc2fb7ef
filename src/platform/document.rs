//! Document-level fullscreen and Picture-in-Picture surface

use crate::{Error, Result};
use std::sync::Mutex;

/// Fullscreen options
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FullscreenOptions {
    pub navigation_ui: NavigationUi,
}

/// Navigation UI visibility while fullscreen
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NavigationUi {
    #[default]
    Auto,
    Show,
    Hide,
}

/// Exit operations are scoped to the document, not to a single element.
pub trait MediaDocument: Send + Sync {
    fn exit_picture_in_picture(&self) -> Result<()>;
    fn exit_fullscreen(&self) -> Result<()>;
}

/// Document that accepts every exit request without doing anything
pub struct NoopDocument;

impl NoopDocument {
    pub fn new() -> Self {
        NoopDocument
    }
}

impl Default for NoopDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl MediaDocument for NoopDocument {
    fn exit_picture_in_picture(&self) -> Result<()> {
        Ok(())
    }

    fn exit_fullscreen(&self) -> Result<()> {
        Ok(())
    }
}

#[derive(Debug)]
struct DocumentState {
    fullscreen_element: Option<u64>,
    fullscreen_options: Option<FullscreenOptions>,
    fullscreen_enabled: bool,
    pip_element: Option<u64>,
    pip_enabled: bool,
}

/// In-memory document that tracks which element is fullscreen or in PiP.
///
/// Policy switches let tests exercise user-agent rejections.
#[derive(Debug)]
pub struct SimulatedDocument {
    state: Mutex<DocumentState>,
}

impl SimulatedDocument {
    pub fn new() -> Self {
        SimulatedDocument {
            state: Mutex::new(DocumentState {
                fullscreen_element: None,
                fullscreen_options: None,
                fullscreen_enabled: true,
                pip_element: None,
                pip_enabled: true,
            }),
        }
    }

    fn state(&self) -> std::sync::MutexGuard<'_, DocumentState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn set_fullscreen_enabled(&self, enabled: bool) {
        self.state().fullscreen_enabled = enabled;
    }

    pub fn set_picture_in_picture_enabled(&self, enabled: bool) {
        self.state().pip_enabled = enabled;
    }

    pub fn fullscreen_element(&self) -> Option<u64> {
        self.state().fullscreen_element
    }

    pub fn fullscreen_options(&self) -> Option<FullscreenOptions> {
        self.state().fullscreen_options.clone()
    }

    pub fn picture_in_picture_element(&self) -> Option<u64> {
        self.state().pip_element
    }

    pub(crate) fn enter_fullscreen(&self, element_id: u64, options: FullscreenOptions) -> Result<()> {
        let mut s = self.state();
        if !s.fullscreen_enabled {
            return Err(Error::NotAllowed("fullscreen is disabled by policy".to_string()));
        }
        s.fullscreen_element = Some(element_id);
        s.fullscreen_options = Some(options);
        Ok(())
    }

    pub(crate) fn enter_picture_in_picture(&self, element_id: u64) -> Result<()> {
        let mut s = self.state();
        if !s.pip_enabled {
            return Err(Error::NotAllowed("picture-in-picture is disabled by policy".to_string()));
        }
        s.pip_element = Some(element_id);
        Ok(())
    }
}

impl Default for SimulatedDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl MediaDocument for SimulatedDocument {
    fn exit_picture_in_picture(&self) -> Result<()> {
        let mut s = self.state();
        match s.pip_element.take() {
            Some(_) => Ok(()),
            None => Err(Error::InvalidState("no element is in picture-in-picture".to_string())),
        }
    }

    fn exit_fullscreen(&self) -> Result<()> {
        let mut s = self.state();
        s.fullscreen_options = None;
        match s.fullscreen_element.take() {
            Some(_) => Ok(()),
            None => Err(Error::InvalidState("document is not in fullscreen".to_string())),
        }
    }
}
