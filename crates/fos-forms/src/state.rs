//! Form State Restore
//!
//! Snapshot of the restorable state of natively associated controls, keyed
//! by control name and position so it survives a rebuild of the document.

use std::collections::HashMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{ControlView, Document, FormValue, NodeId, RestoreReason};

/// Saved state of one control
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedControlState {
    /// Submission value at save time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<FormValue>,
    /// State handed back to the control on restore
    pub state: FormValue,
}

/// Restorable state of a document's controls
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormStateSnapshot {
    controls: IndexMap<String, SavedControlState>,
}

impl FormStateSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, state: SavedControlState) {
        self.controls.insert(key.into(), state);
    }

    pub fn get(&self, key: &str) -> Option<&SavedControlState> {
        self.controls.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.controls.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.controls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controls.is_empty()
    }
}

impl Document {
    /// Connected natively associated controls with their restore keys
    ///
    /// Keys are `name#ordinal`, the ordinal counting earlier controls with
    /// the same name in tree order. Unnamed controls use their tag name.
    fn restore_keys(&self) -> Vec<(NodeId, String)> {
        let mut ordinals: HashMap<String, usize> = HashMap::new();
        let mut keys = Vec::new();
        for node in self.tree.traverse(self.tree.root()) {
            let Some(participant) = self.participants.get(&node) else {
                continue;
            };
            let participant = participant.borrow();
            if participant.internals().is_none() {
                continue;
            }
            let base = ControlView::new(node, participant.control(), &self.tree, "")
                .name()
                .or_else(|| self.tree.tag_name(node).map(str::to_string))
                .unwrap_or_default();
            let ordinal = ordinals.entry(base.clone()).or_default();
            keys.push((node, format!("{base}#{ordinal}")));
            *ordinal += 1;
        }
        keys
    }

    /// Save the state of every natively associated control that has one
    pub fn save_form_state(&self) -> FormStateSnapshot {
        let mut snapshot = FormStateSnapshot::new();
        for (node, key) in self.restore_keys() {
            let Some(participant) = self.participants.get(&node) else {
                continue;
            };
            let participant = participant.borrow();
            let Some(internals) = participant.internals() else {
                continue;
            };
            if let Some(state) = internals.state() {
                snapshot.insert(
                    key,
                    SavedControlState {
                        value: internals.form_value().cloned(),
                        state: state.clone(),
                    },
                );
            }
        }
        snapshot
    }

    /// Hand saved states back to matching controls, returning how many were restored
    pub fn restore_form_state(&mut self, snapshot: &FormStateSnapshot) -> usize {
        let mut restored = 0;
        for (node, key) in self.restore_keys() {
            let Some(saved) = snapshot.get(&key) else {
                continue;
            };
            let state = saved.state.clone();
            if self
                .call(node, |p, ctx| p.form_state_restore(state, RestoreReason::Restore, ctx))
                .is_some()
            {
                restored += 1;
            }
        }
        tracing::debug!("Restored {} of {} saved control states", restored, snapshot.len());
        self.flush();
        restored
    }
}
