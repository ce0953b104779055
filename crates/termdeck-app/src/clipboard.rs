use termdeck_common::TermError;

/// Where copy and paste go.
pub trait ClipboardProvider {
    fn get_text(&mut self) -> Result<String, TermError>;
    fn set_text(&mut self, text: &str) -> Result<(), TermError>;
}

/// System clipboard backed by `arboard`.
pub struct SystemClipboard {
    inner: arboard::Clipboard,
}

impl SystemClipboard {
    pub fn new() -> Result<Self, TermError> {
        let inner = arboard::Clipboard::new().map_err(|e| TermError::Clipboard(e.to_string()))?;
        Ok(Self { inner })
    }
}

impl ClipboardProvider for SystemClipboard {
    fn get_text(&mut self) -> Result<String, TermError> {
        self.inner
            .get_text()
            .map_err(|e| TermError::Clipboard(e.to_string()))
    }

    fn set_text(&mut self, text: &str) -> Result<(), TermError> {
        self.inner
            .set_text(text.to_owned())
            .map_err(|e| TermError::Clipboard(e.to_string()))
    }
}

/// Process-local clipboard, used when no system clipboard is reachable.
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    text: String,
}

impl ClipboardProvider for MemoryClipboard {
    fn get_text(&mut self) -> Result<String, TermError> {
        Ok(self.text.clone())
    }

    fn set_text(&mut self, text: &str) -> Result<(), TermError> {
        self.text = text.to_owned();
        Ok(())
    }
}

/// The system clipboard if available, else a memory one.
pub fn default_clipboard() -> Box<dyn ClipboardProvider> {
    match SystemClipboard::new() {
        Ok(clipboard) => Box::new(clipboard),
        Err(e) => {
            tracing::warn!(error = %e, "system clipboard unavailable, using in-memory clipboard");
            Box::new(MemoryClipboard::default())
        }
    }
}
