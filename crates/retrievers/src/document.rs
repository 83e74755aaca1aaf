use anyhow::{bail, Context, Result};
use ignore::WalkBuilder;
use std::path::Path;

/// Upper bound on the snippet view handed to the engine.
pub const SNIPPET_MAX_CHARS: usize = 600;

const MAX_FILE_SIZE_BYTES: u64 = 1_048_576; // 1 MB

/// One corpus unit a retriever can score.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub path: String,
    pub content: String,
}

impl Document {
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }

    /// Bounded snippet view: the first `SNIPPET_MAX_CHARS` chars, cut back to
    /// the last line boundary inside the window when one exists.
    #[must_use]
    pub fn snippet(&self) -> &str {
        bounded_prefix(&self.content, SNIPPET_MAX_CHARS)
    }
}

/// Char-boundary-safe prefix of at most `max_chars` characters, preferring a
/// newline cut when the text is truncated.
pub(crate) fn bounded_prefix(text: &str, max_chars: usize) -> &str {
    let Some((cut, _)) = text.char_indices().nth(max_chars) else {
        return text;
    };
    let window = &text[..cut];
    match window.rfind('\n') {
        Some(last_newline) if last_newline > 0 => &window[..last_newline],
        _ => window,
    }
}

/// An immutable, lexicographically sorted corpus shared by retrievers.
#[derive(Debug, Clone, Default)]
pub struct DocumentSet {
    docs: Vec<Document>,
}

impl DocumentSet {
    /// Sorts by path so scoring and tie-breaking are reproducible regardless
    /// of input order.
    #[must_use]
    pub fn new(mut docs: Vec<Document>) -> Self {
        docs.sort_by(|a, b| a.path.cmp(&b.path));
        Self { docs }
    }

    /// Load every readable UTF-8 file under `root` (`.gitignore` aware,
    /// hidden files skipped, files over 1 MB skipped).
    pub fn load_dir(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref();
        if !root.is_dir() {
            bail!("Corpus root {} is not a directory", root.display());
        }

        let mut docs = Vec::new();
        let walker = WalkBuilder::new(root)
            .hidden(true)
            .git_ignore(true)
            .git_global(true)
            .git_exclude(true)
            // Corpus roots are not always git repositories.
            .require_git(false)
            .build();

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    log::warn!("Failed to read entry: {e}");
                    continue;
                }
            };
            if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                continue;
            }

            let path = entry.path();
            if let Ok(meta) = entry.metadata() {
                if meta.len() > MAX_FILE_SIZE_BYTES {
                    log::debug!(
                        "Skipping large file {} ({} bytes > {})",
                        path.display(),
                        meta.len(),
                        MAX_FILE_SIZE_BYTES
                    );
                    continue;
                }
            }

            let bytes = std::fs::read(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let Ok(content) = String::from_utf8(bytes) else {
                log::debug!("Skipping non-UTF-8 file {}", path.display());
                continue;
            };

            let relative = path.strip_prefix(root).unwrap_or(path);
            docs.push(Document::new(relative.display().to_string(), content));
        }

        log::info!("Loaded {} documents from {}", docs.len(), root.display());
        Ok(Self::new(docs))
    }

    #[must_use]
    pub fn documents(&self) -> &[Document] {
        &self.docs
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.docs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }
}
