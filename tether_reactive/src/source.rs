use crate::cell::Cell;
use crate::graph::NodeIndex;
use crate::stream::Stream;
use crate::world::World;
use crate::{Data, Emitter};
use log::trace;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt::{Debug, Formatter};
use std::rc::Rc;

pub struct Source<T: Data> {
    pending: Rc<RefCell<VecDeque<T>>>,
    stream: Stream<T>,
}

impl<T: Data> Source<T> {
    pub fn new(world: &World) -> Self {
        let pending = Rc::new(RefCell::new(VecDeque::new()));
        let stream = Stream::create_root(world, pending.clone());
        Source { pending, stream }
    }

    /// Outlets downstream have been called by the time this returns,
    /// except when pushing from inside a running propagation.
    pub fn push(&self, value: T) {
        trace!("Push into {}: {:?}", self.node(), value);
        self.pending.borrow_mut().push_back(value);
        self.world().schedule(self.node());
    }

    pub fn stream(&self) -> Stream<T> {
        self.stream.clone()
    }

    pub fn map<R: Data, M: Fn(T) -> R + 'static>(&self, mapper: M) -> Stream<R> {
        self.stream.map(mapper)
    }

    pub fn filter<F: Fn(&T) -> bool + 'static>(&self, filter: F) -> Stream<T> {
        self.stream.filter(filter)
    }

    pub fn lift<R: Data, M: Fn(T) -> R + 'static>(&self, initial: R, mapper: M) -> Cell<R> {
        self.stream.lift(initial, mapper)
    }
}

impl World {
    pub fn source<T: Data>(&self) -> Source<T> {
        Source::new(self)
    }
}

impl<T: Data> Emitter<T> for Source<T> {
    fn world(&self) -> &World {
        self.stream.world()
    }

    fn node(&self) -> NodeIndex {
        self.stream.node()
    }

    fn pulse(&self) -> Option<T> {
        self.stream.pulse()
    }
}

impl<T: Data> Clone for Source<T> {
    fn clone(&self) -> Self {
        Self {
            pending: self.pending.clone(),
            stream: self.stream.clone(),
        }
    }
}

impl<T: Data> Debug for Source<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Source {{ node: {}, pending: {} }}",
            self.node(),
            self.pending.borrow().len()
        )
    }
}
