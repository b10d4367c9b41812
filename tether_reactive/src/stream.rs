use crate::cell::Cell;
use crate::combinators::same_world;
use crate::graph::NodeIndex;
use crate::world::{OwnNode, Propagate, World};
use crate::{Data, Emitter, WiringError};
use log::debug;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt::{Debug, Formatter};
use std::rc::Rc;

pub(crate) struct StreamCore<T: Data> {
    pulse: RefCell<Option<T>>,
    rule: Box<dyn Fn() -> Option<T>>,
    discard: Option<Box<dyn Fn()>>,
    node: OwnNode,
}

impl<T: Data> Propagate for StreamCore<T> {
    fn update(&self) {
        let next = (self.rule)();
        *self.pulse.borrow_mut() = next;
    }

    fn settle(&self) {
        self.pulse.borrow_mut().take();
    }

    fn discard(&self) {
        if let Some(discard) = &self.discard {
            discard()
        }
    }
}

/// Carries a value only while the propagation that produced it runs.
pub struct Stream<T: Data>(Rc<StreamCore<T>>);

impl<T: Data> Stream<T> {
    pub(crate) fn create<R: Fn() -> Option<T> + 'static>(
        world: &World,
        parents: &[NodeIndex],
        rule: R,
    ) -> Self {
        Stream::build(world, parents, Box::new(rule), None)
    }

    /// A root stream firing one value from `pending` per propagation.
    pub(crate) fn create_root(world: &World, pending: Rc<RefCell<VecDeque<T>>>) -> Self {
        let queue = pending.clone();
        let discard: Box<dyn Fn()> = Box::new(move || pending.borrow_mut().clear());
        Stream::build(
            world,
            &[],
            Box::new(move || queue.borrow_mut().pop_front()),
            Some(discard),
        )
    }

    fn build(
        world: &World,
        parents: &[NodeIndex],
        rule: Box<dyn Fn() -> Option<T>>,
        discard: Option<Box<dyn Fn()>>,
    ) -> Self {
        let node = OwnNode::new(world.clone());
        for parent in parents {
            node.depend_on(*parent);
        }
        debug!("Stream created: {}", node.node());
        let core = Rc::new(StreamCore {
            pulse: RefCell::new(None),
            rule,
            discard,
            node,
        });
        core.node.attach(&core);
        Stream(core)
    }

    pub fn map<R: Data, M: Fn(T) -> R + 'static>(&self, mapper: M) -> Stream<R> {
        let parent = self.clone();
        Stream::create(self.world(), &[self.node()], move || {
            parent.pulse().map(&mapper)
        })
    }

    pub fn filter<F: Fn(&T) -> bool + 'static>(&self, filter: F) -> Stream<T> {
        let parent = self.clone();
        Stream::create(self.world(), &[self.node()], move || {
            parent.pulse().filter(&filter)
        })
    }

    /// Fires whenever either stream fires. If both fire in the same
    /// propagation, the value of `self` wins.
    pub fn merge(&self, other: &Stream<T>) -> Result<Stream<T>, WiringError> {
        let world = same_world(self.world(), &[(other.world(), other.node())])?;
        let left = self.clone();
        let right = other.clone();
        Ok(Stream::create(
            &world,
            &[self.node(), other.node()],
            move || left.pulse().or_else(|| right.pulse()),
        ))
    }

    pub fn lift<R: Data, M: Fn(T) -> R + 'static>(&self, initial: R, mapper: M) -> Cell<R> {
        let parent = self.clone();
        Cell::create(self.world(), &[self.node()], initial, move || {
            parent.pulse().map(&mapper)
        })
    }

    pub fn hold(&self, initial: T) -> Cell<T> {
        let parent = self.clone();
        Cell::create(self.world(), &[self.node()], initial, move || parent.pulse())
    }
}

impl<T: Data> Emitter<T> for Stream<T> {
    fn world(&self) -> &World {
        self.0.node.world()
    }

    fn node(&self) -> NodeIndex {
        self.0.node.node()
    }

    fn pulse(&self) -> Option<T> {
        self.0.pulse.borrow().as_ref().map(Data::cheap_clone)
    }
}

impl<T: Data> Clone for Stream<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T: Data> Debug for Stream<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Stream {{ node: {}, pulse: {:?} }}", self.node(), self.0.pulse.borrow())
    }
}
