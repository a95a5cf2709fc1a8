//! Import bookkeeping for rewrites that introduce or drop type references.
//!
//! The engine never edits import declarations itself; it reports what a
//! rewrite needs through [`ImportManager`] and leaves the declaration
//! edits to the host. [`RecordingImportManager`] is the standalone
//! implementation used by the fixer and the tests.

use rustc_hash::FxHashSet;

/// Receives import requirements discovered while building a fix.
pub trait ImportManager {
    /// Make `qualified_name` available and return the name to spell in
    /// the rewritten source, normally the simple name.
    fn ensure_import_available(&mut self, qualified_name: &str) -> String;

    /// Report that the rewrite removed the last use the engine knows of
    /// for `qualified_name`. Whether the declaration is actually removed
    /// is the host's call.
    fn mark_import_candidate_removed(&mut self, qualified_name: &str);
}

/// Simple name of a dotted qualified name.
#[must_use]
pub fn simple_name(qualified_name: &str) -> &str {
    qualified_name
        .rsplit('.')
        .next()
        .unwrap_or(qualified_name)
}

/// [`ImportManager`] that records requests for later inspection.
#[derive(Debug, Default)]
pub struct RecordingImportManager {
    added: FxHashSet<String>,
    removal_candidates: FxHashSet<String>,
}

impl RecordingImportManager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Qualified names some fix asked to have imported.
    #[must_use]
    pub fn added(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.added.iter().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Qualified names whose last known use a fix removed.
    #[must_use]
    pub fn removal_candidates(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.removal_candidates.iter().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl ImportManager for RecordingImportManager {
    fn ensure_import_available(&mut self, qualified_name: &str) -> String {
        self.added.insert(qualified_name.to_owned());
        simple_name(qualified_name).to_owned()
    }

    fn mark_import_candidate_removed(&mut self, qualified_name: &str) {
        self.removal_candidates.insert(qualified_name.to_owned());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_name() {
        assert_eq!(simple_name("java.text.MessageFormat"), "MessageFormat");
        assert_eq!(simple_name("Unqualified"), "Unqualified");
    }

    #[test]
    fn test_recording_manager() {
        let mut imports = RecordingImportManager::new();
        assert_eq!(
            imports.ensure_import_available("java.text.MessageFormat"),
            "MessageFormat"
        );
        imports.mark_import_candidate_removed("java.util.Iterator");
        assert_eq!(imports.added(), vec!["java.text.MessageFormat"]);
        assert_eq!(imports.removal_candidates(), vec!["java.util.Iterator"]);
    }
}
