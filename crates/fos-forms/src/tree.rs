//! DOM Tree (arena-based allocation)
//!
//! Generational arena holding the host document: elements, shadow roots,
//! their attributes and the custom state sets participants publish into.
//! Freed slots bump their generation, so a stale `NodeId` never resolves
//! to whatever node reuses the slot later.

use std::collections::BTreeSet;

use indexmap::IndexMap;

use crate::NodeId;

/// Result type for DOM operations
pub type DomResult<T> = Result<T, DomError>;

/// DOM operation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    #[error("Node {0} is not alive")]
    StaleNode(NodeId),

    #[error("Hierarchy request error: cannot insert {child} into {parent}")]
    HierarchyRequest { parent: NodeId, child: NodeId },

    #[error("Node {0} is not an element")]
    NotAnElement(NodeId),

    #[error("Node {child} is not a child of {parent}")]
    NotAChild { parent: NodeId, child: NodeId },
}

/// Node-specific data
#[derive(Debug, Clone)]
pub enum NodeKind {
    /// Document root
    Document,
    /// Element with its attributes and custom state set
    Element(ElementData),
    /// Shadow root attached to a host element
    ShadowRoot { host: NodeId },
}

/// Element payload
#[derive(Debug, Clone)]
pub struct ElementData {
    /// Lowercased tag name
    pub tag: String,
    attributes: IndexMap<String, String>,
    states: BTreeSet<String>,
    shadow_root: Option<NodeId>,
}

impl ElementData {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            attributes: IndexMap::new(),
            states: BTreeSet::new(),
            shadow_root: None,
        }
    }
}

/// DOM Node
#[derive(Debug, Clone)]
pub struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    pub kind: NodeKind,
}

impl Node {
    fn new(kind: NodeKind) -> Self {
        Self {
            parent: None,
            children: Vec::new(),
            kind,
        }
    }

    /// Get element data if this is an element
    #[inline]
    pub fn as_element(&self) -> Option<&ElementData> {
        match &self.kind {
            NodeKind::Element(e) => Some(e),
            _ => None,
        }
    }

    #[inline]
    fn as_element_mut(&mut self) -> Option<&mut ElementData> {
        match &mut self.kind {
            NodeKind::Element(e) => Some(e),
            _ => None,
        }
    }
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    node: Option<Node>,
}

/// Arena-based DOM tree
#[derive(Debug)]
pub struct DomTree {
    slots: Vec<Slot>,
    free: Vec<u32>,
    live: usize,
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

impl DomTree {
    /// Create a tree containing only the document root
    pub fn new() -> Self {
        Self {
            slots: vec![Slot {
                generation: 0,
                node: Some(Node::new(NodeKind::Document)),
            }],
            free: Vec::new(),
            live: 1,
        }
    }

    /// The document root
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Number of live nodes in the tree
    pub fn len(&self) -> usize {
        self.live
    }

    /// A tree always holds its document root
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Get a node by ID, `None` when the id is stale
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_ref())
    }

    fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
    }

    fn node(&self, id: NodeId) -> DomResult<&Node> {
        self.get(id).ok_or(DomError::StaleNode(id))
    }

    fn node_mut(&mut self, id: NodeId) -> DomResult<&mut Node> {
        self.get_mut(id).ok_or(DomError::StaleNode(id))
    }

    fn element_mut(&mut self, id: NodeId) -> DomResult<&mut ElementData> {
        self.node_mut(id)?
            .as_element_mut()
            .ok_or(DomError::NotAnElement(id))
    }

    /// Whether `id` still refers to a node in this tree
    pub fn is_alive(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    fn allocate(&mut self, node: Node) -> NodeId {
        self.live += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.node = Some(node);
            return NodeId {
                index,
                generation: slot.generation,
            };
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            node: Some(node),
        });
        NodeId {
            index,
            generation: 0,
        }
    }

    /// Create a detached element
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.allocate(Node::new(NodeKind::Element(ElementData::new(tag))))
    }

    /// Attach a shadow root to `host`, returning the existing one if present
    pub fn attach_shadow(&mut self, host: NodeId) -> DomResult<NodeId> {
        if let Some(existing) = self.shadow_root(host) {
            return Ok(existing);
        }
        self.element_mut(host)?;
        let root = self.allocate(Node::new(NodeKind::ShadowRoot { host }));
        self.element_mut(host)?.shadow_root = Some(root);
        Ok(root)
    }

    /// Shadow root attached to `host`
    pub fn shadow_root(&self, host: NodeId) -> Option<NodeId> {
        self.get(host)?.as_element()?.shadow_root
    }

    /// Host of a shadow root
    pub fn host(&self, shadow_root: NodeId) -> Option<NodeId> {
        match self.get(shadow_root)?.kind {
            NodeKind::ShadowRoot { host } => Some(host),
            _ => None,
        }
    }

    /// Parent node, `None` for roots and detached nodes
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id)?.parent
    }

    /// Parent, or the host when `id` is a shadow root
    pub fn parent_or_host(&self, id: NodeId) -> Option<NodeId> {
        self.parent(id).or_else(|| self.host(id))
    }

    /// Children of a node (empty for stale ids)
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Lowercased tag name of an element
    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.get(id)?.as_element().map(|e| e.tag.as_str())
    }

    /// Whether `id` is an element with the given tag
    pub fn is_element_named(&self, id: NodeId, tag: &str) -> bool {
        self.tag_name(id)
            .is_some_and(|name| name.eq_ignore_ascii_case(tag))
    }

    /// Shadow-including inclusive ancestor check
    pub fn is_inclusive_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.parent_or_host(current);
        }
        false
    }

    /// Append `child` to `parent`, detaching it from any previous parent
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<()> {
        self.insert_before(parent, child, None)
    }

    /// Insert `child` before `reference` (or at the end when `None`)
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: Option<NodeId>,
    ) -> DomResult<()> {
        self.node(parent)?;
        let child_node = self.node(child)?;
        if !matches!(child_node.kind, NodeKind::Element(_)) || self.is_inclusive_ancestor(child, parent) {
            return Err(DomError::HierarchyRequest { parent, child });
        }
        if let Some(reference) = reference {
            if self.parent(reference) != Some(parent) {
                return Err(DomError::NotAChild {
                    parent,
                    child: reference,
                });
            }
        }

        self.detach(child);
        let node = self.node_mut(parent)?;
        let position = reference
            .and_then(|r| node.children.iter().position(|&c| c == r))
            .unwrap_or(node.children.len());
        node.children.insert(position, child);
        self.node_mut(child)?.parent = Some(parent);
        Ok(())
    }

    fn detach(&mut self, child: NodeId) -> Option<NodeId> {
        let parent = self.get_mut(child)?.parent.take()?;
        if let Some(node) = self.get_mut(parent) {
            node.children.retain(|&c| c != child);
        }
        Some(parent)
    }

    /// Remove a node from its parent; the node stays alive and may be reinserted
    pub fn remove(&mut self, id: NodeId) -> DomResult<Option<NodeId>> {
        self.node(id)?;
        Ok(self.detach(id))
    }

    /// Detach and free a node with its whole shadow-including subtree
    ///
    /// Returns the freed ids in tree order.
    pub fn destroy(&mut self, id: NodeId) -> DomResult<Vec<NodeId>> {
        if id == NodeId::ROOT {
            return Err(DomError::HierarchyRequest {
                parent: NodeId::ROOT,
                child: id,
            });
        }
        if let Some(host) = self.host(id) {
            self.element_mut(host)?.shadow_root = None;
        }
        self.node(id)?;
        self.detach(id);
        let freed = self.traverse(id);
        for &node in &freed {
            let slot = &mut self.slots[node.index as usize];
            slot.node = None;
            slot.generation = slot.generation.wrapping_add(1);
            self.free.push(node.index);
            self.live -= 1;
        }
        Ok(freed)
    }

    /// Shadow-including preorder traversal starting at `root`
    pub fn traverse(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let Some(node) = self.get(id) else {
                continue;
            };
            out.push(id);
            for &child in node.children.iter().rev() {
                stack.push(child);
            }
            if let Some(shadow) = node.as_element().and_then(|e| e.shadow_root) {
                stack.push(shadow);
            }
        }
        out
    }

    /// Whether the node is reachable from the document root
    pub fn is_connected(&self, id: NodeId) -> bool {
        self.is_alive(id) && self.is_inclusive_ancestor(NodeId::ROOT, id)
    }

    /// Root of the node's tree scope: the document, a shadow root, or the
    /// top of a detached subtree
    pub fn scope_root(&self, id: NodeId) -> NodeId {
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            current = parent;
        }
        current
    }

    /// Find the first element with `id` inside a tree scope, without
    /// descending into nested shadow roots
    pub fn get_element_by_id(&self, scope: NodeId, id: &str) -> Option<NodeId> {
        let mut stack: Vec<NodeId> = self.children(scope).iter().rev().copied().collect();
        while let Some(node) = stack.pop() {
            if self.attribute(node, "id") == Some(id) {
                return Some(node);
            }
            stack.extend(self.children(node).iter().rev().copied());
        }
        None
    }

    /// Nearest inclusive ancestor with the given tag, within the same tree scope
    pub fn closest(&self, id: NodeId, tag: &str) -> Option<NodeId> {
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            if self.is_element_named(current, tag) {
                return Some(current);
            }
            cursor = self.parent(current);
        }
        None
    }

    /// Whether an ancestor `<fieldset disabled>` disables this node
    ///
    /// Descendants of the fieldset's first `<legend>` stay enabled.
    pub fn is_disabled_by_fieldset(&self, id: NodeId) -> bool {
        let mut child = id;
        let mut cursor = self.parent(id);
        while let Some(parent) = cursor {
            if self.is_element_named(parent, "fieldset") && self.has_attribute(parent, "disabled") {
                let first_legend = self
                    .children(parent)
                    .iter()
                    .copied()
                    .find(|&c| self.is_element_named(c, "legend"));
                if first_legend != Some(child) {
                    return true;
                }
            }
            child = parent;
            cursor = self.parent(parent);
        }
        false
    }

    // ------------------------------------------------------------------
    // Attributes
    // ------------------------------------------------------------------

    /// Get attribute value
    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.get(id)?
            .as_element()?
            .attributes
            .get(name)
            .map(String::as_str)
    }

    /// Check attribute presence
    pub fn has_attribute(&self, id: NodeId, name: &str) -> bool {
        self.attribute(id, name).is_some()
    }

    /// Set attribute, returning the previous value
    pub fn set_attribute(
        &mut self,
        id: NodeId,
        name: &str,
        value: impl Into<String>,
    ) -> DomResult<Option<String>> {
        Ok(self
            .element_mut(id)?
            .attributes
            .insert(name.to_ascii_lowercase(), value.into()))
    }

    /// Remove attribute, returning the previous value
    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> DomResult<Option<String>> {
        Ok(self.element_mut(id)?.attributes.shift_remove(name))
    }

    /// Attributes in insertion order
    pub fn attributes(&self, id: NodeId) -> impl Iterator<Item = (&str, &str)> {
        self.get(id)
            .and_then(Node::as_element)
            .into_iter()
            .flat_map(|e| e.attributes.iter().map(|(k, v)| (k.as_str(), v.as_str())))
    }

    // ------------------------------------------------------------------
    // Custom states
    // ------------------------------------------------------------------

    /// Whether the element's custom state set contains `state`
    pub fn has_state(&self, id: NodeId, state: &str) -> bool {
        self.get(id)
            .and_then(Node::as_element)
            .is_some_and(|e| e.states.contains(state))
    }

    /// Custom states currently set on an element
    pub fn states(&self, id: NodeId) -> impl Iterator<Item = &str> {
        self.get(id)
            .and_then(Node::as_element)
            .into_iter()
            .flat_map(|e| e.states.iter().map(String::as_str))
    }

    /// Replace every state in `managed` with the ones in `active` in a single step
    pub fn replace_states<'a>(
        &mut self,
        id: NodeId,
        managed: &[&str],
        active: impl IntoIterator<Item = &'a str>,
    ) -> DomResult<()> {
        let element = self.element_mut(id)?;
        for state in managed {
            element.states.remove(*state);
        }
        element.states.extend(active.into_iter().map(str::to_string));
        Ok(())
    }
}
