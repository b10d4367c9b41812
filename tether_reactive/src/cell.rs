use crate::graph::NodeIndex;
use crate::stream::Stream;
use crate::world::{OwnNode, Propagate, World};
use crate::{Data, Emitter};
use log::debug;
use std::cell::RefCell;
use std::fmt::{Debug, Formatter};
use std::rc::Rc;

pub(crate) struct CellCore<T: Data> {
    value: RefCell<T>,
    fired: std::cell::Cell<bool>,
    rule: Box<dyn Fn() -> Option<T>>,
    node: OwnNode,
}

impl<T: Data> Propagate for CellCore<T> {
    fn update(&self) {
        if let Some(next) = (self.rule)() {
            *self.value.borrow_mut() = next;
            self.fired.set(true);
        }
    }

    fn settle(&self) {
        self.fired.set(false);
    }
}

pub struct Cell<T: Data>(Rc<CellCore<T>>);

impl<T: Data> Cell<T> {
    pub(crate) fn create<R: Fn() -> Option<T> + 'static>(
        world: &World,
        parents: &[NodeIndex],
        initial: T,
        rule: R,
    ) -> Self {
        let node = OwnNode::new(world.clone());
        for parent in parents {
            node.depend_on(*parent);
        }
        debug!("Cell created: {} = {:?}", node.node(), initial);
        let core = Rc::new(CellCore {
            value: RefCell::new(initial),
            fired: std::cell::Cell::new(false),
            rule: Box::new(rule),
            node,
        });
        core.node.attach(&core);
        Cell(core)
    }

    pub fn sample(&self) -> T {
        self.0.value.borrow().cheap_clone()
    }

    /// Whether the cell was updated in the running propagation.
    pub fn fired(&self) -> bool {
        self.0.fired.get()
    }

    pub fn map<R: Data, M: Fn(T) -> R + 'static>(&self, mapper: M) -> Cell<R> {
        let parent = self.clone();
        let initial = mapper(self.sample());
        Cell::create(self.world(), &[self.node()], initial, move || {
            parent.pulse().map(&mapper)
        })
    }

    pub fn updates(&self) -> Stream<T> {
        let parent = self.clone();
        Stream::create(self.world(), &[self.node()], move || parent.pulse())
    }

    /// Fires the cell's value only when it differs from the previous one.
    pub fn changes(&self) -> Stream<T> {
        let parent = self.clone();
        let last = RefCell::new(self.sample());
        Stream::create(self.world(), &[self.node()], move || {
            let next = parent.pulse()?;
            let mut last = last.borrow_mut();
            if next.changed(&*last) {
                *last = next.cheap_clone();
                Some(next)
            } else {
                None
            }
        })
    }
}

impl World {
    pub fn constant<T: Data>(&self, value: T) -> Cell<T> {
        Cell::create(self, &[], value, || None)
    }
}

impl<T: Data> Emitter<T> for Cell<T> {
    fn world(&self) -> &World {
        self.0.node.world()
    }

    fn node(&self) -> NodeIndex {
        self.0.node.node()
    }

    fn pulse(&self) -> Option<T> {
        if self.fired() {
            Some(self.sample())
        } else {
            None
        }
    }
}

impl<T: Data> Clone for Cell<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T: Data> Debug for Cell<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Cell {{ node: {}, value: {:?} }}", self.node(), self.0.value.borrow())
    }
}
