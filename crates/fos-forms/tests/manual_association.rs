//! Integration tests for manually associated controls
//!
//! Registration, the aggregated validity entry points, form events and the
//! programmatic submit/reset helpers.

mod common;

use common::*;
use fos_forms::{
    Activation, EntryPoints, FormEventKind, FormValue, ManualAssociation, ManualOptions,
    SubmitOutcome, ValidityStates,
};

// ============================================================================
// SUBMISSION SCENARIOS
// ============================================================================

#[test]
fn test_required_empty_control_cancels_submit() {
    let (mut doc, form) = form_fixture();
    let field = TextField::new("email").required();
    let signals = field.signals.clone();
    let (host, _) = add_manual(&mut doc, form, "pc-input", field, &TEXT_VALIDATORS);
    let button = doc.create_element("button");
    doc.append_child(form, button).unwrap();
    let collected = count_events(&mut doc, form, FormEventKind::FormData);

    let outcome = doc.click(button).unwrap();

    assert_eq!(outcome, Activation::Submit(SubmitOutcome::Cancelled));
    assert!(doc.has_interacted(host));
    assert_eq!(collected.get(), 0);
    assert_eq!(signals.invalid.get(), 1);
    assert!(doc.states(host).contains(ValidityStates::USER_INVALID));

    let bubbles = doc.take_validation_bubbles();
    assert_eq!(bubbles.len(), 1);
    assert_eq!(bubbles[0].control, host);
    assert_eq!(bubbles[0].message, "Please fill out this field.");
}

#[test]
fn test_multi_value_control_appends_each_value() {
    let (mut doc, form) = form_fixture();
    let select = MultiSelect {
        name: "colors".to_string(),
        selected: vec!["a".to_string(), "b".to_string()],
    };
    add_manual(&mut doc, form, "pc-select", select, &NO_VALIDATORS);

    let data = doc.form_data(form).unwrap();
    assert_eq!(data.len(), 2);
    assert_eq!(data.get_all("colors"), vec!["a", "b"]);
    let pairs: Vec<_> = data.iter().collect();
    assert_eq!(pairs, vec![("colors", "a"), ("colors", "b")]);
}

#[test]
fn test_valid_form_submits_with_data() {
    let (mut doc, form) = form_fixture();
    add_manual(&mut doc, form, "pc-input", TextField::new("user").with_value("ada"), &TEXT_VALIDATORS);
    let mut terms = Checkbox::new("terms");
    terms.checked = true;
    add_manual(&mut doc, form, "pc-checkbox", terms, &CHECKBOX_VALIDATORS);

    let outcome = doc.request_submit(form, None).unwrap();
    let submission = outcome.submission().unwrap();
    assert_eq!(submission.action, "/signup");
    assert_eq!(submission.method, "get");
    assert_eq!(submission.data.get("user"), Some("ada"));
    assert_eq!(submission.data.get("terms"), Some("on"));
}

#[test]
fn test_submit_marks_siblings_interacted() {
    let (mut doc, form) = form_fixture();
    let (invalid, _) = add_manual(&mut doc, form, "pc-input", TextField::new("a").required(), &TEXT_VALIDATORS);
    let (valid, _) = add_manual(&mut doc, form, "pc-input", TextField::new("b").with_value("x"), &TEXT_VALIDATORS);
    assert!(!doc.states(valid).contains(ValidityStates::USER_VALID));

    let outcome = doc.request_submit(form, None).unwrap();

    assert_eq!(outcome, SubmitOutcome::Cancelled);
    assert!(doc.has_interacted(valid));
    assert_eq!(
        doc.states(invalid),
        ValidityStates::REQUIRED | ValidityStates::INVALID | ValidityStates::USER_INVALID
    );
    assert_eq!(
        doc.states(valid),
        ValidityStates::OPTIONAL | ValidityStates::VALID | ValidityStates::USER_VALID
    );
}

#[test]
fn test_novalidate_form_submits_invalid_control() {
    let (mut doc, form) = form_fixture();
    doc.set_attribute(form, "novalidate", "").unwrap();
    let (host, _) = add_manual(&mut doc, form, "pc-input", TextField::new("email").required(), &TEXT_VALIDATORS);

    let outcome = doc.request_submit(form, None).unwrap();

    assert_eq!(outcome.submission().unwrap().data.get("email"), Some(""));
    assert!(doc.has_interacted(host));
    assert!(doc.take_validation_bubbles().is_empty());
}

#[test]
fn test_application_listener_can_cancel() {
    let (mut doc, form) = form_fixture();
    add_manual(&mut doc, form, "pc-input", TextField::new("q").with_value("rust"), &TEXT_VALIDATORS);
    doc.add_form_listener(form, FormEventKind::Submit, |event| event.prevent_default())
        .unwrap();

    assert_eq!(doc.request_submit(form, None).unwrap(), SubmitOutcome::Cancelled);
}

#[test]
fn test_application_listener_appends_data() {
    let (mut doc, form) = form_fixture();
    add_manual(&mut doc, form, "pc-input", TextField::new("q").with_value("rust"), &TEXT_VALIDATORS);
    doc.add_form_listener(form, FormEventKind::FormData, |event| {
        if let Some(data) = event.data() {
            data.append("source", "test");
        }
    })
    .unwrap();

    let data = doc.form_data(form).unwrap();
    assert_eq!(data.iter().collect::<Vec<_>>(), vec![("q", "rust"), ("source", "test")]);
}

// ============================================================================
// DISABLED CONTROLS
// ============================================================================

#[test]
fn test_disabled_control_never_contributes_or_blocks() {
    let (mut doc, form) = form_fixture();
    let mut field = TextField::new("email").required();
    field.disabled = true;
    let signals = field.signals.clone();
    let (host, _) = add_manual(&mut doc, form, "pc-input", field, &TEXT_VALIDATORS);

    assert!(doc.check_form_validity(form).unwrap());
    let outcome = doc.request_submit(form, None).unwrap();
    assert!(!outcome.submission().unwrap().data.has("email"));
    assert_eq!(signals.invalid.get(), 0);
    assert!(!doc.will_validate(host).unwrap());
    // Flags are still observable on the control itself
    assert!(doc.validity(host).unwrap().value_missing());
}

#[test]
fn test_fieldset_disables_manual_control() {
    let (mut doc, form) = form_fixture();
    let fieldset = doc.create_element("fieldset");
    doc.append_child(form, fieldset).unwrap();
    let legend = doc.create_element("legend");
    doc.append_child(fieldset, legend).unwrap();
    let (inside, _) = add_manual(&mut doc, fieldset, "pc-input", TextField::new("inner").required(), &TEXT_VALIDATORS);
    add_manual(&mut doc, legend, "pc-input", TextField::new("legend").with_value("kept"), &TEXT_VALIDATORS);

    assert!(!doc.check_form_validity(form).unwrap());
    doc.set_attribute(fieldset, "disabled", "").unwrap();

    assert!(doc.check_form_validity(form).unwrap());
    assert!(doc.states(inside).contains(ValidityStates::VALID));
    let data = doc.form_data(form).unwrap();
    assert!(!data.has("inner"));
    assert_eq!(data.get("legend"), Some("kept"));

    doc.remove_attribute(fieldset, "disabled").unwrap();
    assert!(!doc.check_form_validity(form).unwrap());
}

// ============================================================================
// REGISTRY AND FACADE
// ============================================================================

#[test]
fn test_sibling_removal_keeps_override_until_last() {
    let (mut doc, form) = form_fixture();
    let (first, _) = add_manual(&mut doc, form, "pc-checkbox", Checkbox::new("a"), &CHECKBOX_VALIDATORS);
    let mut second_box = Checkbox::new("b");
    second_box.required = true;
    let (second, _) = add_manual(&mut doc, form, "pc-checkbox", second_box, &CHECKBOX_VALIDATORS);
    assert_eq!(doc.facade().entry_points(form), EntryPoints::Aggregated { owner: first });

    doc.remove(first).unwrap();
    assert!(doc.facade().is_installed(form));
    assert_eq!(doc.registry().controls_of(form), vec![second]);
    assert!(!doc.check_form_validity(form).unwrap());
    doc.set_value(second, Some(FormValue::text("on"))).unwrap();
    assert!(doc.check_form_validity(form).unwrap());
    doc.set_value(second, None).unwrap();

    doc.remove(second).unwrap();
    assert_eq!(doc.facade().entry_points(form), EntryPoints::Native);
    assert!(doc.registry().controls_of(form).is_empty());
    // The detached invalid checkbox no longer affects the form
    assert!(doc.check_form_validity(form).unwrap());
}

#[test]
fn test_reattach_is_idempotent() {
    let (mut doc, form) = form_fixture();
    let (host, _) = add_manual(&mut doc, form, "pc-input", TextField::new("q"), &TEXT_VALIDATORS);
    let (other, _) = add_manual(&mut doc, form, "pc-input", TextField::new("r"), &TEXT_VALIDATORS);

    doc.remove(host).unwrap();
    doc.append_child(form, host).unwrap();

    let mut controls = doc.registry().controls_of(form);
    controls.sort();
    let mut expected = vec![host, other];
    expected.sort();
    assert_eq!(controls, expected);
    assert_eq!(doc.form_of(host).unwrap(), Some(form));
    assert!(doc.facade().is_installed(form));
}

#[test]
fn test_form_attribute_resolution() {
    let (mut doc, form) = form_fixture();
    doc.set_attribute(form, "id", "signup").unwrap();
    let other = doc.create_element("form");
    doc.set_attribute(other, "id", "other").unwrap();
    doc.append_child(doc.body(), other).unwrap();

    let host = doc.create_element("pc-input");
    doc.set_attribute(host, "form", "signup").unwrap();
    doc.append_child(doc.body(), host).unwrap();
    doc.add_participant(ManualAssociation::new(host, TextField::new("q"), TEXT_VALIDATORS.clone()))
        .unwrap();
    assert_eq!(doc.form_of(host).unwrap(), Some(form));

    doc.set_attribute(host, "form", "other").unwrap();
    assert_eq!(doc.form_of(host).unwrap(), Some(other));
    assert!(!doc.facade().is_installed(form));
    assert!(doc.facade().is_installed(other));

    // Unknown ids fall back to the ancestor form, here none
    doc.set_attribute(host, "form", "missing").unwrap();
    assert_eq!(doc.form_of(host).unwrap(), None);
    assert!(!doc.facade().is_installed(other));
}

#[test]
fn test_custom_form_attribute_and_late_form() {
    let (mut doc, _) = form_fixture();
    let host = doc.create_element("pc-input");
    doc.set_attribute(host, "data-form", "late").unwrap();
    doc.append_child(doc.body(), host).unwrap();
    let options = ManualOptions::default().with_form_attribute("data-form");
    doc.add_participant(
        ManualAssociation::new(host, TextField::new("q"), TEXT_VALIDATORS.clone()).with_options(options),
    )
    .unwrap();
    assert_eq!(doc.form_of(host).unwrap(), None);

    let late = doc.create_element("form");
    doc.set_attribute(late, "id", "late").unwrap();
    doc.append_child(doc.body(), late).unwrap();
    assert_eq!(doc.form_of(host).unwrap(), Some(late));

    doc.destroy(late).unwrap();
    assert_eq!(doc.form_of(host).unwrap(), None);
}

#[test]
fn test_moving_between_forms() {
    let (mut doc, form) = form_fixture();
    let second = doc.create_element("form");
    doc.append_child(doc.body(), second).unwrap();
    let (host, _) = add_manual(&mut doc, form, "pc-input", TextField::new("q"), &TEXT_VALIDATORS);

    doc.append_child(second, host).unwrap();

    assert_eq!(doc.registry().form_of(host), Some(second));
    assert!(doc.registry().controls_of(form).is_empty());
    assert_eq!(doc.facade().entry_points(form), EntryPoints::Native);
    assert!(doc.facade().is_installed(second));
}

// ============================================================================
// VALIDITY
// ============================================================================

#[test]
fn test_custom_error_toggles_form_validity() {
    let (mut doc, form) = form_fixture();
    let (a, _) = add_manual(&mut doc, form, "pc-input", TextField::new("a").with_value("1"), &TEXT_VALIDATORS);
    let (b, _) = add_manual(&mut doc, form, "pc-input", TextField::new("b").with_value("2"), &TEXT_VALIDATORS);
    let b_before = doc.validity(b).unwrap();
    assert!(doc.check_form_validity(form).unwrap());

    doc.set_custom_validity(a, "Already taken").unwrap();
    assert!(!doc.check_form_validity(form).unwrap());
    assert_eq!(doc.validation_message(a).unwrap(), "Already taken");

    doc.set_custom_validity(a, "").unwrap();
    assert!(doc.check_form_validity(form).unwrap());
    assert_eq!(doc.validity(b).unwrap(), b_before);
}

#[test]
fn test_custom_validity_round_trip() {
    let (mut doc, form) = form_fixture();
    let (host, _) = add_manual(&mut doc, form, "pc-input", TextField::new("email").required(), &TEXT_VALIDATORS);
    let before = doc.validity(host).unwrap();
    let states_before = doc.states(host);

    doc.set_custom_validity(host, "x").unwrap();
    assert!(doc.validity(host).unwrap().custom_error());
    doc.set_custom_validity(host, "").unwrap();

    assert_eq!(doc.validity(host).unwrap(), before);
    assert_eq!(doc.states(host), states_before);
}

#[test]
fn test_report_form_validity_surfaces_first_failure() {
    let (mut doc, form) = form_fixture();
    let (a, _) = add_manual(&mut doc, form, "pc-input", TextField::new("a").required(), &TEXT_VALIDATORS);
    let (b, _) = add_manual(&mut doc, form, "pc-input", TextField::new("b").required(), &TEXT_VALIDATORS);

    assert!(!doc.report_form_validity(form).unwrap());
    let bubbles = doc.take_validation_bubbles();
    assert_eq!(bubbles.len(), 1);
    assert_eq!(bubbles[0].control, a);
    assert!(!doc.has_interacted(b));
}

#[test]
fn test_prevented_invalid_suppresses_bubble() {
    let (mut doc, form) = form_fixture();
    let field = TextField::new("email").required();
    let signals = field.signals.clone();
    signals.prevent_invalid.set(true);
    let (host, _) = add_manual(&mut doc, form, "pc-input", field, &TEXT_VALIDATORS);

    assert!(!doc.report_validity(host).unwrap());
    assert_eq!(signals.invalid.get(), 1);
    assert!(doc.take_validation_bubbles().is_empty());
    assert!(doc.has_interacted(host));
}

#[test]
fn test_pattern_attribute_revalidates() {
    let (mut doc, form) = form_fixture();
    let (host, _) = add_manual(&mut doc, form, "pc-input", TextField::new("zip").with_value("12a"), &TEXT_VALIDATORS);
    assert!(doc.check_validity(host).unwrap());

    doc.set_attribute(host, "pattern", "[0-9]{5}").unwrap();
    assert!(doc.validity(host).unwrap().pattern_mismatch());
    assert!(doc.states(host).contains(ValidityStates::INVALID));

    doc.set_value(host, Some(FormValue::text("12345"))).unwrap();
    assert!(doc.states(host).contains(ValidityStates::VALID));
}

#[test]
fn test_bare_widget_degrades() {
    let (mut doc, form) = form_fixture();
    let (host, _) = add_manual(&mut doc, form, "pc-thing", Bare, &NO_VALIDATORS);
    doc.set_attribute(host, "name", "thing").unwrap();

    assert!(doc.check_validity(host).unwrap());
    assert!(doc.form_data(form).unwrap().is_empty());
    assert!(doc.request_submit(form, None).unwrap().is_submitted());
}

// ============================================================================
// INTERACTION AND RESET
// ============================================================================

#[test]
fn test_interaction_is_monotonic_until_reset() {
    let (mut doc, form) = form_fixture();
    let field = TextField::new("q").with_default("hello");
    let (host, handle) = add_manual(&mut doc, form, "pc-input", field, &TEXT_VALIDATORS);

    doc.set_value(host, Some(FormValue::text("typed"))).unwrap();
    assert!(!doc.has_interacted(host));
    doc.dispatch_event(host, "pc-input").unwrap();
    assert!(doc.has_interacted(host));
    for event in ["pc-input", "focus", "blur", "pc-input"] {
        doc.dispatch_event(host, event).unwrap();
        assert!(doc.has_interacted(host));
    }
    assert!(doc.states(host).contains(ValidityStates::USER_VALID));

    assert!(doc.reset_form(form).unwrap());
    assert!(!doc.has_interacted(host));
    assert_eq!(handle.borrow().widget().value, "hello");
    assert!(!doc.states(host).contains(ValidityStates::USER_VALID));
}

#[test]
fn test_report_before_connect_keeps_triggers() {
    let (mut doc, form) = form_fixture();
    let host = doc.create_element("pc-input");
    doc.add_participant(ManualAssociation::new(
        host,
        TextField::new("q").required(),
        TEXT_VALIDATORS.clone(),
    ))
    .unwrap();
    assert!(!doc.report_validity(host).unwrap());
    assert!(doc.has_interacted(host));

    doc.append_child(form, host).unwrap();
    assert!(doc.reset_form(form).unwrap());
    assert!(!doc.has_interacted(host));

    doc.dispatch_event(host, "pc-input").unwrap();
    assert!(doc.has_interacted(host));
    let triggers = doc.registry().interaction(host).unwrap().triggers().to_vec();
    assert_eq!(triggers, vec!["pc-input".to_string()]);
}

#[test]
fn test_reset_listener_can_stop_control_reset() {
    let (mut doc, form) = form_fixture();
    doc.add_form_listener(form, FormEventKind::Reset, |event| {
        event.prevent_default();
        event.stop_immediate_propagation();
    })
    .unwrap();
    let (host, handle) = add_manual(
        &mut doc,
        form,
        "pc-input",
        TextField::new("q").with_value("typed"),
        &TEXT_VALIDATORS,
    );
    doc.dispatch_event(host, "pc-input").unwrap();

    assert!(!doc.reset_form(form).unwrap());
    assert_eq!(handle.borrow().widget().value, "typed");
    assert!(doc.has_interacted(host));
}

// ============================================================================
// PROGRAMMATIC SUBMIT AND RESET
// ============================================================================

#[test]
fn test_submit_from_copies_submitter_overrides() {
    let (mut doc, form) = form_fixture();
    let (field, _) = add_manual(&mut doc, form, "pc-input", TextField::new("q").with_value("rust"), &TEXT_VALIDATORS);
    let button = Button {
        name: "op".to_string(),
        value: "search".to_string(),
    };
    let (submitter, _) = add_manual(&mut doc, form, "pc-button", button, &NO_VALIDATORS);
    doc.set_attribute(submitter, "formaction", "/search").unwrap();
    doc.set_attribute(submitter, "formmethod", "post").unwrap();
    let nodes_before = doc.tree().len();

    let outcome = doc.submit_from(field, Some(submitter)).unwrap().unwrap();

    let submission = outcome.submission().unwrap();
    assert_eq!(submission.action, "/search");
    assert_eq!(submission.method, "post");
    assert_eq!(submission.data.get("q"), Some("rust"));
    assert_eq!(submission.data.get("op"), Some("search"));
    assert_eq!(doc.tree().len(), nodes_before);
}

#[test]
fn test_submit_from_runs_validation() {
    let (mut doc, form) = form_fixture();
    let (field, _) = add_manual(&mut doc, form, "pc-input", TextField::new("q").required(), &TEXT_VALIDATORS);

    let outcome = doc.submit_from(field, None).unwrap();
    assert_eq!(outcome, Some(SubmitOutcome::Cancelled));
}

#[test]
fn test_submit_from_without_form() {
    let (mut doc, _) = form_fixture();
    let body = doc.body();
    let (orphan, _) = add_manual(&mut doc, body, "pc-input", TextField::new("q"), &TEXT_VALIDATORS);
    assert_eq!(doc.submit_from(orphan, None).unwrap(), None);
    assert_eq!(doc.reset_from(orphan).unwrap(), None);
}

#[test]
fn test_click_custom_submitter() {
    let (mut doc, form) = form_fixture();
    let button = Button {
        name: "op".to_string(),
        value: "save".to_string(),
    };
    let (submitter, _) = add_manual(&mut doc, form, "pc-button", button, &NO_VALIDATORS);

    let Activation::Submit(SubmitOutcome::Submitted(submission)) = doc.click(submitter).unwrap() else {
        panic!("expected submission");
    };
    assert_eq!(submission.submitter, Some(submitter));
    assert_eq!(submission.data.get_all("op"), vec!["save"]);
}

#[test]
fn test_reset_from_restores_defaults() {
    let (mut doc, form) = form_fixture();
    let (field, handle) = add_manual(
        &mut doc,
        form,
        "pc-input",
        TextField::new("q").with_value("typed").with_default("initial"),
        &TEXT_VALIDATORS,
    );

    assert_eq!(doc.reset_from(field).unwrap(), Some(true));
    assert_eq!(handle.borrow().widget().value, "initial");
}
