//! Command Bus
//!
//! Prioritized dispatch of named commands between independent plugins.
//! Plugins never hold references to each other: they subscribe to a command
//! kind and may dispatch follow-up commands from inside a handler.
//!
//! ## Dispatch order
//!
//! - Handlers run from `High` to `Low` priority
//! - Within a tier, handlers run in registration order
//! - Dispatch stops at the first handler returning `true` (handled)
//! - A handler error stops dispatch and is returned to the caller as-is

use anyhow::Result;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::rc::{Rc, Weak};

/// Handler priority tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Priority {
    Low,
    Normal,
    High,
}

/// A command that can travel over the bus
///
/// Handlers register against the command's kind, so payload-carrying
/// variants of the same command share one handler list.
pub trait BusCommand: Debug {
    /// Discriminant handlers subscribe to
    type Kind: Copy + Eq + Hash + Debug + 'static;

    fn kind(&self) -> Self::Kind;
}

/// Handler signature
///
/// Receives the command, the shared context and the bus itself so it can
/// dispatch nested commands. Returns `Ok(true)` when the command is handled.
pub type HandlerFn<C, X> = Rc<dyn Fn(&C, &mut X, &CommandBus<C, X>) -> Result<bool>>;

struct Entry<C: BusCommand, X> {
    id: u64,
    priority: Priority,
    handler: HandlerFn<C, X>,
}

struct Registry<C: BusCommand, X> {
    next_id: u64,
    handlers: HashMap<C::Kind, Vec<Entry<C, X>>>,
}

impl<C: BusCommand, X> Registry<C, X> {
    fn remove(&mut self, kind: C::Kind, id: u64) {
        if let Some(entries) = self.handlers.get_mut(&kind) {
            entries.retain(|entry| entry.id != id);
            if entries.is_empty() {
                self.handlers.remove(&kind);
            }
        }
    }
}

/// Single-threaded prioritized command bus
pub struct CommandBus<C: BusCommand, X> {
    registry: Rc<RefCell<Registry<C, X>>>,
}

impl<C: BusCommand + 'static, X: 'static> CommandBus<C, X> {
    /// Create an empty bus
    pub fn new() -> Self {
        Self {
            registry: Rc::new(RefCell::new(Registry {
                next_id: 0,
                handlers: HashMap::new(),
            })),
        }
    }

    /// Register a handler for a command kind
    ///
    /// The handler stays registered until the returned [`Subscription`] is
    /// unsubscribed or dropped.
    pub fn subscribe<F>(&self, kind: C::Kind, priority: Priority, handler: F) -> Subscription
    where
        F: Fn(&C, &mut X, &CommandBus<C, X>) -> Result<bool> + 'static,
    {
        let id = {
            let mut registry = self.registry.borrow_mut();
            let id = registry.next_id;
            registry.next_id += 1;

            let entries = registry.handlers.entry(kind).or_default();
            // Insert after every entry of equal or higher priority
            let index = entries
                .iter()
                .position(|entry| entry.priority < priority)
                .unwrap_or(entries.len());
            entries.insert(
                index,
                Entry {
                    id,
                    priority,
                    handler: Rc::new(handler),
                },
            );
            id
        };

        let registry: Weak<RefCell<Registry<C, X>>> = Rc::downgrade(&self.registry);
        Subscription::new(move || {
            if let Some(registry) = registry.upgrade() {
                registry.borrow_mut().remove(kind, id);
            }
        })
    }

    /// Dispatch a command to its handlers
    ///
    /// Returns `Ok(true)` if some handler reported the command as handled.
    /// The handler list is snapshotted first, so handlers may subscribe,
    /// unsubscribe or dispatch re-entrantly.
    pub fn dispatch(&self, command: &C, ctx: &mut X) -> Result<bool> {
        let handlers: Vec<HandlerFn<C, X>> = {
            let registry = self.registry.borrow();
            match registry.handlers.get(&command.kind()) {
                Some(entries) => entries.iter().map(|e| Rc::clone(&e.handler)).collect(),
                None => return Ok(false),
            }
        };

        tracing::trace!(command = ?command, handlers = handlers.len(), "Dispatching command");

        for handler in handlers {
            if handler(command, ctx, self)? {
                tracing::trace!(kind = ?command.kind(), "Command handled");
                return Ok(true);
            }
        }

        Ok(false)
    }

    /// Number of handlers currently registered for a kind
    pub fn handler_count(&self, kind: C::Kind) -> usize {
        self.registry
            .borrow()
            .handlers
            .get(&kind)
            .map_or(0, |entries| entries.len())
    }
}

impl<C: BusCommand + 'static, X: 'static> Default for CommandBus<C, X> {
    fn default() -> Self {
        Self::new()
    }
}

/// Registration handle returned by [`CommandBus::subscribe`]
///
/// Dropping the handle unsubscribes the handler.
#[must_use = "dropping a Subscription unsubscribes its handler"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    fn new(cancel: impl FnOnce() + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Remove the handler from the bus now
    pub fn unsubscribe(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}
