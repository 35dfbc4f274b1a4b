//! Cached system-template loading with manual invalidation.

use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use anyhow::Context as _;

use docask_core::traits::TemplateSource;

/// File-backed [`TemplateSource`]. The file is read once and served from
/// cache until [`TemplateSource::invalidate`] drops it, e.g. after an
/// operator edits the template on disk.
pub struct FileTemplateCache {
    path: PathBuf,
    cached: RwLock<Option<Arc<str>>>,
}

impl FileTemplateCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cached: RwLock::new(None),
        }
    }
}

impl TemplateSource for FileTemplateCache {
    fn load(&self) -> anyhow::Result<Arc<str>> {
        {
            let guard = self
                .cached
                .read()
                .map_err(|_| anyhow::anyhow!("template cache lock poisoned"))?;
            if let Some(template) = guard.as_ref() {
                return Ok(Arc::clone(template));
            }
        }

        let text = std::fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read system template at {}", self.path.display()))?;
        let template: Arc<str> = Arc::from(text);

        let mut guard = self
            .cached
            .write()
            .map_err(|_| anyhow::anyhow!("template cache lock poisoned"))?;
        *guard = Some(Arc::clone(&template));
        tracing::debug!(path = %self.path.display(), "system template (re)loaded");
        Ok(template)
    }

    fn invalidate(&self) {
        if let Ok(mut guard) = self.cached.write() {
            *guard = None;
        }
    }
}
