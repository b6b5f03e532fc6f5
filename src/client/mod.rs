//! Client Coordinator Module
//!
//! The store has no metadata service: the client re-derives everything each
//! run by asking every node what it holds. This module implements that
//! orchestration.
//!
//! ## Core Mechanisms
//! - **Static membership**: an ordered `host:port` list from the cluster
//!   config. Order fixes ring positions, so it is a deployment constraint.
//! - **Connect-once reachability**: one TCP connect per node at startup;
//!   nodes that fail to connect stay down for the whole run, no retries.
//! - **Operations**: `put` drives the replica schedule, `get` drives version
//!   resolution and reconstruction, `ls` aggregates raw listings.

pub mod config;
pub mod coordinator;
