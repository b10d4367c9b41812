//! Push-based reactive primitives.
//!
//! A [`World`] owns a fixed dependency graph of four kinds of nodes:
//! [`Source`]s accept values from the outside, [`Stream`]s carry a value
//! only during the propagation that produced it, [`Cell`]s always hold a
//! value, and [`Outlet`]s hand values to an external callback.
//!
//! Each [`Source::push`] runs one synchronous propagation: every node
//! depending on the source is updated exactly once, in dependency order,
//! before `push` returns.

pub use crate::cell::Cell;
pub use crate::combinators::{
    bind_outlet, combine2, combine3, combine4, lift_to_cell, lift_to_stream,
    merge_streams_into_cell,
};
pub use crate::error::WiringError;
pub use crate::graph::NodeIndex;
pub use crate::outlet::Outlet;
pub use crate::source::Source;
pub use crate::stream::Stream;
pub use crate::world::World;
use std::fmt::Debug;

mod cell;
mod combinators;
mod error;
mod graph;
mod outlet;
mod source;
mod stream;
mod world;

pub trait Data: Debug + 'static {
    fn changed(&self, other: &Self) -> bool;
    fn cheap_clone(&self) -> Self;
}

impl<T: Debug + Clone + PartialEq + 'static> Data for T {
    fn changed(&self, other: &T) -> bool {
        self != other
    }

    fn cheap_clone(&self) -> Self {
        self.clone()
    }
}

pub trait Emitter<T: Data> {
    fn world(&self) -> &World;

    fn node(&self) -> NodeIndex;

    /// The value fired in the running propagation, if any. Always `None`
    /// outside of a propagation.
    fn pulse(&self) -> Option<T>;
}
