//! System interconnect (bus) for transaction routing.
//!
//! This module implements the router between initiator ports and targets. It provides:
//! 1. **Target registration:** Targets are owned by the router and addressed by [`TargetId`].
//! 2. **Static routing:** Each inbound [`PortId`] is bound to exactly one target by a
//!    [`RouterBuilder`]; the table cannot change once built.
//! 3. **Forwarding:** Transactions pass through untouched and keep the target's response.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use tracing::warn;

use super::memory::Memory;
use super::traits::Target;
use crate::common::{SimError, SimTime};
use crate::tlm::{ResponseStatus, Transaction};

/// Inbound router port an initiator is bound to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct PortId(pub usize);

impl fmt::Display for PortId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "port{}", self.0)
    }
}

/// Handle to a target owned by a router.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct TargetId(pub usize);

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "target{}", self.0)
    }
}

#[derive(Clone, Copy, Debug)]
struct Route {
    target: TargetId,
    forwarded: u64,
}

/// Collects targets and port bindings, then freezes them into a [`Router`].
#[derive(Default)]
pub struct RouterBuilder {
    targets: Vec<Box<dyn Target>>,
    bindings: Vec<(PortId, TargetId)>,
}

impl RouterBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a target and returns its handle.
    pub fn add_target(&mut self, target: Box<dyn Target>) -> TargetId {
        self.targets.push(target);
        TargetId(self.targets.len() - 1)
    }

    /// Binds an inbound port to a target.
    pub fn bind(&mut self, port: PortId, target: TargetId) -> &mut Self {
        self.bindings.push((port, target));
        self
    }

    /// Validates the bindings and builds the router.
    ///
    /// # Returns
    ///
    /// The router, or [`SimError::DuplicatePort`] / [`SimError::UnknownTarget`] for a
    /// malformed table.
    pub fn build(self) -> Result<Router, SimError> {
        let mut table = BTreeMap::new();
        for (port, target) in self.bindings {
            if target.0 >= self.targets.len() {
                return Err(SimError::UnknownTarget { port, target });
            }
            let route = Route {
                target,
                forwarded: 0,
            };
            if table.insert(port, route).is_some() {
                return Err(SimError::DuplicatePort(port));
            }
        }
        Ok(Router {
            targets: self.targets,
            table,
            unrouted: 0,
        })
    }
}

impl fmt::Debug for RouterBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouterBuilder")
            .field("targets", &self.targets.len())
            .field("bindings", &self.bindings)
            .finish()
    }
}

/// Static router connecting initiator ports to targets.
pub struct Router {
    targets: Vec<Box<dyn Target>>,
    table: BTreeMap<PortId, Route>,
    unrouted: u64,
}

impl Router {
    /// Starts building a router.
    pub fn builder() -> RouterBuilder {
        RouterBuilder::new()
    }

    /// Forwards a transaction arriving on `port` to its bound target.
    ///
    /// The transaction is passed through unmodified and keeps whatever response the target
    /// produced. An unbound port is answered with `Error` and charges no time.
    ///
    /// # Arguments
    ///
    /// * `port` - Inbound port the initiator is bound to.
    /// * `txn` - Transaction to deliver.
    /// * `delay` - Annotated delay, updated by the target.
    pub fn forward(&mut self, port: PortId, txn: &mut Transaction<'_>, delay: &mut SimTime) {
        let Some(route) = self.table.get_mut(&port) else {
            self.unrouted += 1;
            warn!(%port, address = format_args!("{:#x}", txn.address()), "no route for port");
            txn.set_response_status(ResponseStatus::Error);
            return;
        };
        route.forwarded += 1;
        self.targets[route.target.0].submit(txn, delay);
    }

    /// Returns the target bound to `port`, if any.
    pub fn route(&self, port: PortId) -> Option<TargetId> {
        self.table.get(&port).map(|r| r.target)
    }

    /// Returns all bound ports in ascending order.
    pub fn ports(&self) -> impl Iterator<Item = PortId> + '_ {
        self.table.keys().copied()
    }

    /// Returns the number of transactions forwarded through `port`.
    pub fn forwarded(&self, port: PortId) -> u64 {
        self.table.get(&port).map_or(0, |r| r.forwarded)
    }

    /// Returns the number of transactions that arrived on unbound ports.
    pub fn unrouted(&self) -> u64 {
        self.unrouted
    }

    /// Returns a target by handle.
    pub fn target(&self, id: TargetId) -> Option<&dyn Target> {
        self.targets.get(id.0).map(|t| &**t)
    }

    /// Returns a target by handle, mutably.
    pub fn target_mut(&mut self, id: TargetId) -> Option<&mut (dyn Target + 'static)> {
        self.targets.get_mut(id.0).map(|t| &mut **t)
    }

    /// Returns the first registered memory target.
    pub fn find_memory(&self) -> Option<&Memory> {
        self.targets.iter().find_map(|t| t.as_memory())
    }

    /// Returns the first registered memory target, mutably.
    pub fn find_memory_mut(&mut self) -> Option<&mut Memory> {
        self.targets.iter_mut().find_map(|t| t.as_memory_mut())
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.targets.iter().map(|t| t.name()).collect();
        f.debug_struct("Router")
            .field("targets", &names)
            .field("ports", &self.table.len())
            .field("unrouted", &self.unrouted)
            .finish()
    }
}
