//! Form Registry
//!
//! Side tables keyed by node identity: form to registered controls, control
//! to its form, and control to its interaction record. The owning
//! [`Document`](crate::Document) calls [`FormRegistry::forget`] for every
//! destroyed node, so entries never outlive the nodes they describe.

use std::collections::HashMap;

use indexmap::IndexSet;

use crate::{InteractionRecord, NodeId};

/// Registered controls per form and interaction state per control
#[derive(Debug, Default)]
pub struct FormRegistry {
    forms: HashMap<NodeId, IndexSet<NodeId>>,
    owners: HashMap<NodeId, NodeId>,
    interactions: HashMap<NodeId, InteractionRecord>,
}

impl FormRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `control` to the set of `form`
    ///
    /// A control already registered with a different form is moved. Returns
    /// false when there is no form or the control was already registered.
    pub fn register(&mut self, form: Option<NodeId>, control: NodeId) -> bool {
        let Some(form) = form else {
            return false;
        };
        if let Some(previous) = self.owners.get(&control).copied() {
            if previous == form {
                return false;
            }
            tracing::warn!(
                "Control {} registered with form {} while still in form {}",
                control,
                form,
                previous
            );
            self.unregister(Some(previous), control);
        }
        self.owners.insert(control, form);
        self.forms.entry(form).or_default().insert(control)
    }

    /// Remove `control` from `form`, returning how many controls remain
    pub fn unregister(&mut self, form: Option<NodeId>, control: NodeId) -> usize {
        let Some(form) = form else {
            return 0;
        };
        if self.owners.get(&control) == Some(&form) {
            self.owners.remove(&control);
        }
        let Some(controls) = self.forms.get_mut(&form) else {
            return 0;
        };
        controls.shift_remove(&control);
        let remaining = controls.len();
        if remaining == 0 {
            self.forms.remove(&form);
        }
        remaining
    }

    /// Controls currently registered with `form`, in registration order
    pub fn controls_of(&self, form: NodeId) -> Vec<NodeId> {
        self.forms
            .get(&form)
            .map(|controls| controls.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn registrant_count(&self, form: NodeId) -> usize {
        self.forms.get(&form).map_or(0, IndexSet::len)
    }

    pub fn is_registered(&self, form: NodeId, control: NodeId) -> bool {
        self.forms
            .get(&form)
            .is_some_and(|controls| controls.contains(&control))
    }

    /// Form a control is registered with
    pub fn form_of(&self, control: NodeId) -> Option<NodeId> {
        self.owners.get(&control).copied()
    }

    /// Interaction record for `control`, created with `triggers` on first use
    ///
    /// A record created before the control was tracked (by a failed report
    /// or a submit attempt) has no triggers yet and receives them here.
    pub fn track(&mut self, control: NodeId, triggers: &[String]) -> &mut InteractionRecord {
        let record = self
            .interactions
            .entry(control)
            .or_insert_with(|| InteractionRecord::new(triggers.iter().cloned()));
        if record.triggers().is_empty() && !triggers.is_empty() {
            record.set_triggers(triggers.iter().cloned());
        }
        record
    }

    pub fn interaction(&self, control: NodeId) -> Option<&InteractionRecord> {
        self.interactions.get(&control)
    }

    pub fn interaction_mut(&mut self, control: NodeId) -> Option<&mut InteractionRecord> {
        self.interactions.get_mut(&control)
    }

    pub fn has_interacted(&self, control: NodeId) -> bool {
        self.interactions
            .get(&control)
            .is_some_and(InteractionRecord::has_interacted)
    }

    /// Mark a single control as interacted; returns true if the flag changed
    pub fn mark_interacted(&mut self, control: NodeId) -> bool {
        self.interactions
            .entry(control)
            .or_default()
            .mark_interacted()
    }

    /// Mark every control of `form` as interacted, returning all of them
    pub fn mark_all_interacted(&mut self, form: NodeId) -> Vec<NodeId> {
        let controls = self.controls_of(form);
        for &control in &controls {
            self.mark_interacted(control);
        }
        controls
    }

    /// Drop every entry that mentions `node`
    pub fn forget(&mut self, node: NodeId) {
        if let Some(controls) = self.forms.remove(&node) {
            for control in controls {
                self.owners.remove(&control);
            }
        }
        if let Some(form) = self.owners.get(&node).copied() {
            self.unregister(Some(form), node);
        }
        self.interactions.remove(&node);
    }
}
