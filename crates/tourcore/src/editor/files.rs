//! Multi-file fields: the upload buffer, its terminal choices, and the ledger
//! deciding which stored files are deleted once the session ends.

use std::collections::HashSet;

use itertools::Itertools;
use strum::{AsRefStr, Display, EnumString};

use crate::content::FileRef;

/// Files uploaded for the current multi-file field, in arrival order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileBatch {
    buffer: Vec<FileRef>,
}

impl FileBatch {
    /// Appends an upload and returns how many files the batch holds now.
    pub fn push(&mut self, file: FileRef) -> usize {
        self.buffer.push(file);
        self.buffer.len()
    }

    pub fn into_buffer(self) -> Vec<FileRef> {
        self.buffer
    }
}

/// How a finished batch combines with the files already on the entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum FileResolution {
    Replace,
    Append,
    Clear,
}

/// Outcome of resolving a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    /// Value to record for the field.
    pub value: Vec<FileRef>,
    /// Previously stored files to delete once the edit commits.
    pub superseded: Vec<FileRef>,
    /// Buffered uploads that will never be referenced.
    pub dropped: Vec<FileRef>,
}

pub fn resolve(resolution: FileResolution, existing: &[FileRef], buffer: Vec<FileRef>) -> Resolved {
    match resolution {
        FileResolution::Replace => Resolved {
            value: buffer,
            superseded: existing.to_vec(),
            dropped: Vec::new(),
        },
        FileResolution::Append => Resolved {
            value: existing.iter().cloned().chain(buffer).collect(),
            superseded: Vec::new(),
            dropped: Vec::new(),
        },
        FileResolution::Clear => Resolved {
            value: Vec::new(),
            superseded: existing.to_vec(),
            dropped: buffer,
        },
    }
}

/// Tracks uploads made during a session and stored files it replaced.
///
/// Nothing already referenced by the live tree is deleted before the commit
/// succeeds; a discarded session only removes its own uploads.
#[derive(Debug, Default)]
pub struct UploadLedger {
    staged: Vec<FileRef>,
    superseded: Vec<FileRef>,
}

impl UploadLedger {
    pub fn stage(&mut self, file: FileRef) {
        self.staged.push(file);
    }

    pub fn supersede(&mut self, files: impl IntoIterator<Item = FileRef>) {
        self.superseded.extend(files);
    }

    /// Forgets uploads that were already deleted.
    pub fn release(&mut self, files: &[FileRef]) {
        self.staged.retain(|file| !files.contains(file));
    }

    /// Files to delete after a successful commit: everything superseded or
    /// uploaded that the committed tree no longer references.
    pub fn into_commit_deletions<'a>(self, kept: impl IntoIterator<Item = &'a FileRef>) -> Vec<FileRef> {
        let kept: HashSet<&FileRef> = kept.into_iter().collect();
        self.superseded
            .into_iter()
            .chain(self.staged)
            .filter(|file| !kept.contains(file))
            .unique()
            .collect()
    }

    /// Files to delete when the session is thrown away.
    pub fn into_discard_deletions(self) -> Vec<FileRef> {
        self.staged.into_iter().unique().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn refs(keys: &[&str]) -> Vec<FileRef> {
        keys.iter().map(|key| FileRef::new(*key)).collect()
    }

    #[test]
    fn replace_supersedes_every_prior_file() {
        let resolved = resolve(FileResolution::Replace, &refs(&["old1", "old2"]), refs(&["new1"]));
        assert_eq!(resolved.value, refs(&["new1"]));
        assert_eq!(resolved.superseded, refs(&["old1", "old2"]));
        assert!(resolved.dropped.is_empty());
    }

    #[test]
    fn replace_with_empty_buffer_clears() {
        let resolved = resolve(FileResolution::Replace, &refs(&["old"]), Vec::new());
        assert!(resolved.value.is_empty());
        assert_eq!(resolved.superseded, refs(&["old"]));
    }

    #[test]
    fn append_keeps_prior_files_first() {
        let resolved = resolve(FileResolution::Append, &refs(&["old"]), refs(&["new1", "new2"]));
        assert_eq!(resolved.value, refs(&["old", "new1", "new2"]));
        assert!(resolved.superseded.is_empty());
    }

    #[test]
    fn clear_drops_the_buffer_too() {
        let resolved = resolve(FileResolution::Clear, &refs(&["old"]), refs(&["new"]));
        assert!(resolved.value.is_empty());
        assert_eq!(resolved.superseded, refs(&["old"]));
        assert_eq!(resolved.dropped, refs(&["new"]));
    }

    #[test]
    fn resolution_parses_from_callback_text() {
        assert_eq!("append".parse::<FileResolution>().unwrap(), FileResolution::Append);
        assert_eq!(FileResolution::Replace.to_string(), "replace");
    }

    #[test]
    fn commit_deletes_only_unreferenced_files() {
        let mut ledger = UploadLedger::default();
        ledger.stage(FileRef::new("new1"));
        ledger.stage(FileRef::new("orphan"));
        ledger.supersede(refs(&["old"]));

        let kept = refs(&["new1"]);
        assert_eq!(ledger.into_commit_deletions(&kept), refs(&["old", "orphan"]));
    }

    #[test]
    fn discard_deletes_staged_uploads_only() {
        let mut ledger = UploadLedger::default();
        ledger.stage(FileRef::new("new1"));
        ledger.stage(FileRef::new("new2"));
        ledger.supersede(refs(&["old"]));
        ledger.release(&refs(&["new2"]));

        assert_eq!(ledger.into_discard_deletions(), refs(&["new1"]));
    }
}
