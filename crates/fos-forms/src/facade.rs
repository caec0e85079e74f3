//! Form Validity Facade
//!
//! Per form record of which validity entry points are active. Installing
//! the aggregated entry points makes `check_form_validity` and
//! `report_form_validity` consult every registered control in addition to
//! the natively associated ones. Restoring brings back the native entry
//! points exactly.

use std::collections::HashMap;

use crate::NodeId;

/// Entry points a form's validity checks currently run through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EntryPoints {
    /// Only natively associated controls are consulted
    #[default]
    Native,
    /// Registered controls are consulted too; `owner` installed the override
    Aggregated { owner: NodeId },
}

impl EntryPoints {
    pub fn is_aggregated(&self) -> bool {
        matches!(self, Self::Aggregated { .. })
    }
}

#[derive(Debug, Default)]
pub struct FormValidityFacade {
    overrides: HashMap<NodeId, NodeId>,
}

impl FormValidityFacade {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the aggregated entry points on `form`
    ///
    /// Returns false, leaving the existing owner in place, if already installed.
    pub fn install(&mut self, form: NodeId, owner: NodeId) -> bool {
        if self.overrides.contains_key(&form) {
            return false;
        }
        tracing::debug!("Installing aggregated validity on form {} (owner {})", form, owner);
        self.overrides.insert(form, owner);
        true
    }

    /// Restore the native entry points; returns false if nothing was installed
    pub fn restore(&mut self, form: NodeId) -> bool {
        let restored = self.overrides.remove(&form).is_some();
        if restored {
            tracing::debug!("Restored native validity on form {}", form);
        }
        restored
    }

    pub fn entry_points(&self, form: NodeId) -> EntryPoints {
        match self.overrides.get(&form) {
            Some(&owner) => EntryPoints::Aggregated { owner },
            None => EntryPoints::Native,
        }
    }

    pub fn is_installed(&self, form: NodeId) -> bool {
        self.overrides.contains_key(&form)
    }

    /// Drop the override of a destroyed form
    pub fn forget(&mut self, node: NodeId) {
        self.overrides.remove(&node);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DomTree;

    #[test]
    fn test_install_is_idempotent() {
        let mut tree = DomTree::new();
        let form = tree.create_element("form");
        let first = tree.create_element("pc-input");
        let second = tree.create_element("pc-input");
        let mut facade = FormValidityFacade::new();

        assert!(facade.install(form, first));
        assert!(!facade.install(form, second));
        assert_eq!(facade.entry_points(form), EntryPoints::Aggregated { owner: first });
    }

    #[test]
    fn test_restore_without_install_is_noop() {
        let mut tree = DomTree::new();
        let form = tree.create_element("form");
        let mut facade = FormValidityFacade::new();

        assert!(!facade.restore(form));
        assert_eq!(facade.entry_points(form), EntryPoints::Native);

        facade.install(form, form);
        assert!(facade.restore(form));
        assert!(!facade.restore(form));
        assert!(!facade.entry_points(form).is_aggregated());
    }
}
