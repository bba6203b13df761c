// SPDX-FileCopyrightText: 2026 Challan Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Proof attachment collection.
//!
//! Holds the ordered set of user-selected proof files, capped at
//! [`MAX_ATTACHMENTS`]. `set_files` replaces the full set rather than
//! appending, and is rejected entirely while offline: large binary blobs
//! are never allowed to reach the durable queue, so they must be refused
//! at the source.

use challan_core::types::{Attachment, Reachability, MAX_ATTACHMENTS};

use crate::FormError;

/// Ordered collection of proof files for one submission.
#[derive(Debug, Clone, Default)]
pub struct AttachmentCollector {
    files: Vec<Attachment>,
}

impl AttachmentCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the full file set.
    ///
    /// Rejects more than [`MAX_ATTACHMENTS`] files and any change while
    /// offline; on rejection the previously accepted set is retained, so
    /// the display listing never disagrees with what was stored.
    pub fn set_files(
        &mut self,
        files: Vec<Attachment>,
        reachability: Reachability,
    ) -> Result<(), FormError> {
        if !reachability.is_online() {
            return Err(FormError::Offline);
        }
        if files.len() > MAX_ATTACHMENTS {
            return Err(FormError::TooManyAttachments { count: files.len() });
        }
        self.files = files;
        Ok(())
    }

    /// Read-only listing for display.
    pub fn files(&self) -> &[Attachment] {
        &self.files
    }

    pub fn clear(&mut self) {
        self.files.clear();
    }

    /// Hand the files over for submission assembly.
    pub(crate) fn take(&mut self) -> Vec<Attachment> {
        std::mem::take(&mut self.files)
    }
}
