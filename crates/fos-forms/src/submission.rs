//! Form Submission
//!
//! Submit and reset algorithms: interactive validation of natively
//! associated controls, the cancellable submit event, entry list
//! construction and the programmatic submit/reset helpers controls use.

use crate::participant::resolve_form;
use crate::{ControlView, DomError, Document, FormData, FormError, FormEvent, FormResult, NodeId};

/// Form overrides copied from an explicit submitter onto the transient trigger
const SUBMITTER_OVERRIDES: [&str; 5] = [
    "formaction",
    "formenctype",
    "formmethod",
    "formnovalidate",
    "formtarget",
];

const TRANSIENT_TRIGGER_STYLE: &str =
    "position: absolute; width: 0; height: 0; clip-path: inset(50%); overflow: hidden; white-space: nowrap;";

/// A completed submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub form: NodeId,
    pub submitter: Option<NodeId>,
    pub data: FormData,
    pub action: String,
    pub method: String,
    pub enctype: String,
    pub target: String,
}

/// Result of a submission attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Submitted(Submission),
    /// Interactive validation failed; no submit event was fired
    Invalid,
    /// A submit listener prevented the default action
    Cancelled,
}

impl SubmitOutcome {
    pub fn is_submitted(&self) -> bool {
        matches!(self, Self::Submitted(_))
    }

    pub fn submission(&self) -> Option<&Submission> {
        match self {
            Self::Submitted(submission) => Some(submission),
            _ => None,
        }
    }
}

/// What activating an element did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Activation {
    /// Not a submit or reset trigger, disabled, or without a form
    Ignored,
    Submit(SubmitOutcome),
    /// Reset ran (`true`) or was cancelled (`false`)
    Reset(bool),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TriggerKind {
    Submit,
    Reset,
}

fn normalize_method(method: &str) -> &'static str {
    match method.to_ascii_lowercase().as_str() {
        "post" => "post",
        "dialog" => "dialog",
        _ => "get",
    }
}

fn normalize_enctype(enctype: &str) -> &'static str {
    match enctype.to_ascii_lowercase().as_str() {
        "multipart/form-data" => "multipart/form-data",
        "text/plain" => "text/plain",
        _ => "application/x-www-form-urlencoded",
    }
}

impl Document {
    /// Submit `form` as if `submitter` had been activated
    pub fn request_submit(
        &mut self,
        form: NodeId,
        submitter: Option<NodeId>,
    ) -> FormResult<SubmitOutcome> {
        self.ensure_form(form)?;
        if let Some(submitter) = submitter {
            if self.submitter_form(submitter) != Some(form) {
                return Err(FormError::ForeignSubmitter { form, submitter });
            }
        }

        let no_validate = self.tree.has_attribute(form, "novalidate")
            || submitter.is_some_and(|s| self.tree.has_attribute(s, "formnovalidate"));

        let native = self.native_controls(form);
        for &host in &native {
            if self.registry.mark_interacted(host) {
                self.pending.insert(host);
            }
        }

        if !no_validate {
            let mut valid = true;
            for host in native {
                valid &= self.call(host, |p, ctx| p.report_validity(ctx)).unwrap_or(true);
            }
            if !valid {
                tracing::debug!("Submission of form {} failed validation", form);
                self.flush();
                return Ok(SubmitOutcome::Invalid);
            }
        }

        let mut event = FormEvent::submit(form, submitter, no_validate);
        self.dispatch_form_event(&mut event);
        if event.is_default_prevented() {
            tracing::debug!("Submission of form {} cancelled", form);
            self.flush();
            return Ok(SubmitOutcome::Cancelled);
        }

        let submission = self.build_submission(form, submitter);
        tracing::debug!(
            "Submitting form {} with {} entries to {:?}",
            form,
            submission.data.len(),
            submission.action
        );
        self.flush();
        Ok(SubmitOutcome::Submitted(submission))
    }

    /// Submit without validation and without a submit event
    pub fn submit(&mut self, form: NodeId) -> FormResult<Submission> {
        self.ensure_form(form)?;
        let submission = self.build_submission(form, None);
        self.flush();
        Ok(submission)
    }

    /// Reset `form`; returns false when a reset listener cancelled it
    pub fn reset_form(&mut self, form: NodeId) -> FormResult<bool> {
        self.ensure_form(form)?;
        let mut event = FormEvent::reset(form);
        self.dispatch_form_event(&mut event);
        if event.is_default_prevented() {
            self.flush();
            return Ok(false);
        }
        for host in self.native_controls(form) {
            self.call(host, |p, ctx| p.form_reset(ctx));
        }
        tracing::debug!("Form {} reset", form);
        self.flush();
        Ok(true)
    }

    /// Entry list `form` would submit right now
    pub fn form_data(&mut self, form: NodeId) -> FormResult<FormData> {
        self.ensure_form(form)?;
        let data = self.construct_entry_list(form, None);
        self.flush();
        Ok(data)
    }

    /// Activate an element the way a click would
    pub fn click(&mut self, node: NodeId) -> FormResult<Activation> {
        if !self.tree.is_alive(node) {
            return Err(DomError::StaleNode(node).into());
        }
        let Some(kind) = self.trigger_kind(node) else {
            return Ok(Activation::Ignored);
        };
        if self.is_trigger_disabled(node) {
            return Ok(Activation::Ignored);
        }
        let Some(form) = self.submitter_form(node) else {
            return Ok(Activation::Ignored);
        };
        Ok(match kind {
            TriggerKind::Submit => Activation::Submit(self.request_submit(form, Some(node))?),
            TriggerKind::Reset => Activation::Reset(self.reset_form(form)?),
        })
    }

    /// Submit the form of `control` through a transient hidden submit button
    ///
    /// Returns `None` when the control has no form.
    pub fn submit_from(
        &mut self,
        control: NodeId,
        submitter: Option<NodeId>,
    ) -> FormResult<Option<SubmitOutcome>> {
        match self.activate_transient(control, TriggerKind::Submit, submitter)? {
            Some(Activation::Submit(outcome)) => Ok(Some(outcome)),
            _ => Ok(None),
        }
    }

    /// Reset the form of `control` through a transient hidden reset button
    pub fn reset_from(&mut self, control: NodeId) -> FormResult<Option<bool>> {
        match self.activate_transient(control, TriggerKind::Reset, None)? {
            Some(Activation::Reset(performed)) => Ok(Some(performed)),
            _ => Ok(None),
        }
    }

    fn activate_transient(
        &mut self,
        control: NodeId,
        kind: TriggerKind,
        submitter: Option<NodeId>,
    ) -> FormResult<Option<Activation>> {
        let Some(form) = self.form_of(control)? else {
            return Ok(None);
        };

        let trigger = self.tree.create_element("button");
        let kind_name = match kind {
            TriggerKind::Submit => "submit",
            TriggerKind::Reset => "reset",
        };
        self.tree.set_attribute(trigger, "type", kind_name)?;
        self.tree.set_attribute(trigger, "tabindex", "-1")?;
        self.tree.set_attribute(trigger, "style", TRANSIENT_TRIGGER_STYLE)?;
        if let Some(submitter) = submitter {
            if let Some((name, value)) = self.submitter_entry(submitter) {
                self.tree.set_attribute(trigger, "name", name)?;
                self.tree.set_attribute(trigger, "value", value)?;
            }
            for attribute in SUBMITTER_OVERRIDES {
                if let Some(value) = self.tree.attribute(submitter, attribute).map(str::to_string) {
                    self.tree.set_attribute(trigger, attribute, value)?;
                }
            }
        }

        self.append_child(form, trigger)?;
        let activation = self.click(trigger);
        self.destroy(trigger)?;
        activation.map(Some)
    }

    fn trigger_kind(&self, node: NodeId) -> Option<TriggerKind> {
        let kind = self.tree.attribute(node, "type").map(str::to_ascii_lowercase);
        if let Some(participant) = self.participants.get(&node) {
            if !participant.borrow().control().is_submitter() {
                return None;
            }
            return match kind.as_deref() {
                Some("reset") => Some(TriggerKind::Reset),
                Some("button") => None,
                _ => Some(TriggerKind::Submit),
            };
        }
        match (self.tree.tag_name(node)?, kind.as_deref()) {
            ("button", None | Some("submit")) => Some(TriggerKind::Submit),
            ("button", Some("reset")) => Some(TriggerKind::Reset),
            ("button", _) => None,
            ("input", Some("submit" | "image")) => Some(TriggerKind::Submit),
            ("input", Some("reset")) => Some(TriggerKind::Reset),
            _ => None,
        }
    }

    fn is_trigger_disabled(&self, node: NodeId) -> bool {
        let widget_disabled = self
            .participants
            .get(&node)
            .is_some_and(|p| p.borrow().control().is_disabled());
        widget_disabled
            || self.tree.has_attribute(node, "disabled")
            || self.tree.is_disabled_by_fieldset(node)
    }

    /// Form owner of a submit trigger
    fn submitter_form(&self, node: NodeId) -> Option<NodeId> {
        match self.participants.get(&node) {
            Some(participant) => participant.borrow().form(),
            None if self.tree.is_connected(node) => resolve_form(&self.tree, node, "form"),
            None => None,
        }
    }

    /// Name/value pair a submitter contributes
    fn submitter_entry(&self, node: NodeId) -> Option<(String, String)> {
        let (name, value) = match self.participants.get(&node) {
            Some(participant) => {
                let participant = participant.borrow();
                let view = ControlView::new(node, participant.control(), &self.tree, "");
                let value = view
                    .value()
                    .and_then(|v| v.iter().next().map(str::to_string))
                    .or_else(|| view.attribute("value").map(str::to_string));
                (view.name(), value)
            }
            None => (
                self.tree.attribute(node, "name").map(str::to_string),
                self.tree.attribute(node, "value").map(str::to_string),
            ),
        };
        let name = name.filter(|n| !n.is_empty())?;
        Some((name, value.unwrap_or_default()))
    }

    /// Natively associated entries in tree order, then the data collection event
    pub(crate) fn construct_entry_list(&mut self, form: NodeId, submitter: Option<NodeId>) -> FormData {
        let mut data = FormData::new();
        for node in self.tree.traverse(self.tree.root()) {
            if Some(node) == submitter {
                if let Some((name, value)) = self.submitter_entry(node) {
                    data.append(name, value);
                }
                continue;
            }
            let Some(participant) = self.participants.get(&node) else {
                continue;
            };
            let participant = participant.borrow();
            let Some(internals) = participant.internals() else {
                continue;
            };
            if internals.form() != Some(form) {
                continue;
            }
            let view = ControlView::new(node, participant.control(), &self.tree, "");
            if view.is_disabled() || view.is_submitter() {
                continue;
            }
            if let (Some(name), Some(value)) = (view.name(), internals.form_value()) {
                data.append_value(&name, value);
            }
        }

        let mut event = FormEvent::form_data(form, submitter, &mut data);
        self.dispatch_form_event(&mut event);
        data
    }

    fn build_submission(&mut self, form: NodeId, submitter: Option<NodeId>) -> Submission {
        let data = self.construct_entry_list(form, submitter);
        let attribute = |submitter_attr: &str, form_attr: &str| -> Option<String> {
            submitter
                .and_then(|s| self.tree.attribute(s, submitter_attr))
                .or_else(|| self.tree.attribute(form, form_attr))
                .map(str::to_string)
        };
        Submission {
            form,
            submitter,
            action: attribute("formaction", "action").unwrap_or_default(),
            method: normalize_method(&attribute("formmethod", "method").unwrap_or_default()).to_string(),
            enctype: normalize_enctype(&attribute("formenctype", "enctype").unwrap_or_default())
                .to_string(),
            target: attribute("formtarget", "target").unwrap_or_default(),
            data,
        }
    }
}
