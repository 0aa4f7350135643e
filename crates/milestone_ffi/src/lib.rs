//! Flutter-facing bindings for the milestone timeline core.

pub mod api;
