//! DOM Event system.
//!
//! Implements the W3C DOM event dispatch algorithm:
//!   1. Build the propagation path from target to root.
//!   2. **Capture phase**: walk root → target.parent, invoke capture listeners.
//!   3. **At-target phase**: invoke both capture and bubble listeners on target.
//!   4. **Bubble phase**: walk target.parent → root, invoke bubble listeners.
//!
//! Listeners receive the host that owns the tree (`&mut H`) alongside the
//! event, so a handler can mutate the document it is attached to. The listener
//! list for each node is snapshotted before invocation; listeners added during
//! dispatch do not fire for the current event and listeners removed during
//! dispatch no longer fire.
//!
//! Registration options follow `addEventListener`: `capture`, `once` (removed
//! before its first invocation) and `passive` (`prevent_default` is ignored).

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::node::NodeId;
use crate::tree::Dom;

// ---------------------------------------------------------------------------
// Event phase
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventPhase {
    None,
    Capturing,
    AtTarget,
    Bubbling,
}

// ---------------------------------------------------------------------------
// Event
// ---------------------------------------------------------------------------

/// Extra data carried by specific event families.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub enum EventDetail {
    #[default]
    None,
    /// Mouse events: pointer position in viewport (client) coordinates.
    Pointer { client_x: f64, client_y: f64 },
}

/// A DOM event that can be dispatched through the tree.
#[derive(Clone, Debug)]
pub struct Event {
    /// Event type name (e.g. `"click"`, `"scroll"`).
    pub type_: String,
    pub detail: EventDetail,

    /// The node the event was originally dispatched on.
    pub target: Option<NodeId>,
    /// The node whose listeners are currently being invoked.
    pub current_target: Option<NodeId>,
    pub phase: EventPhase,

    pub bubbles: bool,
    pub cancelable: bool,
    pub default_prevented: bool,
    pub propagation_stopped: bool,
    pub immediate_propagation_stopped: bool,

    /// Set while a passive listener runs.
    in_passive_listener: bool,
}

impl Event {
    pub fn new(type_: &str, bubbles: bool, cancelable: bool) -> Self {
        Self {
            type_: type_.to_string(),
            detail: EventDetail::None,
            target: None,
            current_target: None,
            phase: EventPhase::None,
            bubbles,
            cancelable,
            default_prevented: false,
            propagation_stopped: false,
            immediate_propagation_stopped: false,
            in_passive_listener: false,
        }
    }

    /// A mouse event positioned at `(client_x, client_y)`.
    pub fn pointer(type_: &str, bubbles: bool, client_x: f64, client_y: f64) -> Self {
        let mut event = Self::new(type_, bubbles, true);
        event.detail = EventDetail::Pointer { client_x, client_y };
        event
    }

    /// Client coordinates, for pointer events.
    pub fn client_position(&self) -> Option<(f64, f64)> {
        match self.detail {
            EventDetail::Pointer { client_x, client_y } => Some((client_x, client_y)),
            EventDetail::None => None,
        }
    }

    /// Prevent the default action. Ignored for non-cancelable events and
    /// inside passive listeners.
    pub fn prevent_default(&mut self) {
        if self.cancelable && !self.in_passive_listener {
            self.default_prevented = true;
        }
    }

    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    /// Stop *all* further processing, including the current node's remaining listeners.
    pub fn stop_immediate_propagation(&mut self) {
        self.propagation_stopped = true;
        self.immediate_propagation_stopped = true;
    }
}

// ---------------------------------------------------------------------------
// Listener
// ---------------------------------------------------------------------------

/// Identifies one registration; returned by [`EventTargetMap::add_listener`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

/// `addEventListener` options.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ListenerOptions {
    pub capture: bool,
    pub once: bool,
    pub passive: bool,
}

impl ListenerOptions {
    /// Persistent, non-capturing, may cancel.
    pub const PERSISTENT: Self = Self { capture: false, once: false, passive: false };
    /// Fires at most once, then unregisters itself.
    pub const ONCE: Self = Self { capture: false, once: true, passive: false };
    /// Persistent and unable to cancel; used for scroll and pointer tracking.
    pub const PASSIVE: Self = Self { capture: false, once: false, passive: true };
}

type ListenerCallback<H> = Rc<dyn Fn(&mut H, &mut Event)>;

/// A single event listener attached to a node.
pub struct EventListener<H> {
    pub id: ListenerId,
    pub type_: String,
    pub options: ListenerOptions,
    callback: ListenerCallback<H>,
}

impl<H> Clone for EventListener<H> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            type_: self.type_.clone(),
            options: self.options,
            callback: Rc::clone(&self.callback),
        }
    }
}

impl<H> EventListener<H> {
    pub fn invoke(&self, host: &mut H, event: &mut Event) {
        (self.callback)(host, event);
    }
}

impl<H> fmt::Debug for EventListener<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventListener")
            .field("id", &self.id)
            .field("type_", &self.type_)
            .field("options", &self.options)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// EventTarget map (lives alongside the Dom)
// ---------------------------------------------------------------------------

/// Stores event listeners for every node that has at least one.
pub struct EventTargetMap<H> {
    listeners: HashMap<NodeId, Vec<EventListener<H>>>,
    next_id: u64,
}

impl<H> Default for EventTargetMap<H> {
    fn default() -> Self {
        Self {
            listeners: HashMap::new(),
            next_id: 1,
        }
    }
}

impl<H> fmt::Debug for EventTargetMap<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventTargetMap")
            .field("nodes", &self.listeners.len())
            .field("listeners", &self.len())
            .finish()
    }
}

impl<H> EventTargetMap<H> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `callback` for `type_` events on `node`.
    pub fn add_listener<F>(
        &mut self,
        node: NodeId,
        type_: &str,
        options: ListenerOptions,
        callback: F,
    ) -> ListenerId
    where
        F: Fn(&mut H, &mut Event) + 'static,
    {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.entry(node).or_default().push(EventListener {
            id,
            type_: type_.to_string(),
            options,
            callback: Rc::new(callback),
        });
        id
    }

    /// Unregister one listener. Returns `false` if it was already gone.
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        let mut emptied = None;
        let mut removed = false;
        for (node, list) in self.listeners.iter_mut() {
            if let Some(pos) = list.iter().position(|l| l.id == id) {
                list.remove(pos);
                removed = true;
                if list.is_empty() {
                    emptied = Some(*node);
                }
                break;
            }
        }
        if let Some(node) = emptied {
            self.listeners.remove(&node);
        }
        removed
    }

    /// Drop every listener on `node` (used when the node is freed).
    pub fn remove_node(&mut self, node: NodeId) {
        self.listeners.remove(&node);
    }

    pub fn contains(&self, id: ListenerId) -> bool {
        self.listeners
            .values()
            .any(|list| list.iter().any(|l| l.id == id))
    }

    /// Number of listeners for `type_` on `node`.
    pub fn count(&self, node: NodeId, type_: &str) -> usize {
        self.listeners
            .get(&node)
            .map_or(0, |list| list.iter().filter(|l| l.type_ == type_).count())
    }

    /// Total number of registered listeners.
    pub fn len(&self) -> usize {
        self.listeners.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Snapshot of the listeners on `node` that match `type_`.
    fn matching_listeners(&self, node: NodeId, type_: &str) -> Vec<EventListener<H>> {
        self.listeners
            .get(&node)
            .map(|list| list.iter().filter(|l| l.type_ == type_).cloned().collect())
            .unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// Dispatch algorithm
// ---------------------------------------------------------------------------

/// Anything that owns a [`Dom`] and the listeners registered against it.
pub trait EventHost: Sized {
    fn dom(&self) -> &Dom;
    fn listeners(&self) -> &EventTargetMap<Self>;
    fn listeners_mut(&mut self) -> &mut EventTargetMap<Self>;
}

/// Dispatch `event` at `target` (capture → at-target → bubble).
///
/// Returns `true` if the default action was *not* prevented.
pub fn dispatch_event<H: EventHost>(host: &mut H, target: NodeId, event: &mut Event) -> bool {
    event.target = Some(target);

    // Propagation path: [root, …, parent, target].
    let mut path: Vec<NodeId> = host.dom().ancestors(target);
    path.reverse();
    path.push(target);
    let target_index = path.len() - 1;

    event.phase = EventPhase::Capturing;
    for &node in &path[..target_index] {
        if event.propagation_stopped {
            break;
        }
        invoke_listeners(host, node, event, Some(true));
    }

    if !event.propagation_stopped {
        event.phase = EventPhase::AtTarget;
        invoke_listeners(host, target, event, None);
    }

    if event.bubbles && !event.propagation_stopped {
        event.phase = EventPhase::Bubbling;
        for &node in path[..target_index].iter().rev() {
            if event.propagation_stopped {
                break;
            }
            invoke_listeners(host, node, event, Some(false));
        }
    }

    event.phase = EventPhase::None;
    event.current_target = None;

    !event.default_prevented
}

/// Invoke the listeners on `node` that match the event type. `capture`
/// filters by registration phase; `None` (at-target) runs both.
fn invoke_listeners<H: EventHost>(
    host: &mut H,
    node: NodeId,
    event: &mut Event,
    capture: Option<bool>,
) {
    event.current_target = Some(node);
    let snapshot = host.listeners().matching_listeners(node, &event.type_);
    for listener in snapshot {
        if event.immediate_propagation_stopped {
            break;
        }
        if capture.is_some_and(|c| c != listener.options.capture) {
            continue;
        }
        // Removed by an earlier listener during this dispatch.
        if !host.listeners().contains(listener.id) {
            continue;
        }
        if listener.options.once {
            host.listeners_mut().remove_listener(listener.id);
        }
        event.in_passive_listener = listener.options.passive;
        listener.invoke(host, event);
        event.in_passive_listener = false;
    }
}

// ===========================================================================
// Tests
// ===========================================================================
