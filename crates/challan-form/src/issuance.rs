// SPDX-FileCopyrightText: 2026 Challan Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The challan issuance form.
//!
//! Composes the field map, the attachment collector, and the signature
//! pad into a [`SubmissionAttempt`] ready to hand to the offline queue.
//! The form owns the attempt only until that handoff.

use std::collections::BTreeMap;

use challan_core::types::{Reachability, SubmissionAttempt};

use crate::{AttachmentCollector, FormError, SignaturePad};

/// Default signature pad size, matching the on-screen canvas.
const PAD_WIDTH: u32 = 400;
const PAD_HEIGHT: u32 = 150;

/// Data-entry state for one challan.
#[derive(Debug, Clone)]
pub struct IssuanceForm {
    fields: BTreeMap<String, String>,
    attachments: AttachmentCollector,
    signature: SignaturePad,
}

impl Default for IssuanceForm {
    fn default() -> Self {
        Self::new()
    }
}

impl IssuanceForm {
    pub fn new() -> Self {
        Self {
            fields: BTreeMap::new(),
            attachments: AttachmentCollector::new(),
            signature: SignaturePad::new(PAD_WIDTH, PAD_HEIGHT),
        }
    }

    /// Set one passenger/offense field. Fields are opaque to everything
    /// downstream of the form.
    pub fn set_field(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(name.into(), value.into());
    }

    pub fn fields(&self) -> &BTreeMap<String, String> {
        &self.fields
    }

    pub fn attachments_mut(&mut self) -> &mut AttachmentCollector {
        &mut self.attachments
    }

    pub fn attachments(&self) -> &AttachmentCollector {
        &self.attachments
    }

    pub fn signature_mut(&mut self) -> &mut SignaturePad {
        &mut self.signature
    }

    /// Assemble a submission attempt, consuming the form's current state.
    ///
    /// While offline, attachments and the signature are omitted from the
    /// attempt rather than silently included: the resulting queue entry
    /// must stay bounded to form-field text.
    pub fn build(&mut self, reachability: Reachability) -> Result<SubmissionAttempt, FormError> {
        let mut attempt = SubmissionAttempt::new(std::mem::take(&mut self.fields));

        if reachability.is_online() {
            attempt.attachments = self.attachments.take();
            attempt.signature = self.signature.to_image()?;
        } else {
            self.attachments.clear();
        }
        self.signature.clear();

        Ok(attempt)
    }
}
