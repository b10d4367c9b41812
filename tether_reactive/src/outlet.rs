use crate::combinators::same_world;
use crate::graph::NodeIndex;
use crate::world::{OwnNode, Propagate, World};
use crate::{Data, Emitter, WiringError};
use log::debug;
use std::cell::RefCell;
use std::fmt::{Debug, Formatter};
use std::rc::Rc;

struct OutletCore<T: Data> {
    upstream: NodeIndex,
    pulse: Box<dyn Fn() -> Option<T>>,
    callback: Box<dyn Fn(T)>,
    node: OwnNode,
}

impl<T: Data> Propagate for OutletCore<T> {
    fn update(&self) {
        if let Some(value) = (self.pulse)() {
            (self.callback)(value)
        }
    }

    fn settle(&self) {}
}

/// Hands every value its upstream fires to a callback. Bound at most
/// once; dropping the handle detaches the callback.
#[must_use = "dropping an outlet detaches its callback"]
pub struct Outlet<T: Data> {
    world: World,
    binding: RefCell<Option<Rc<OutletCore<T>>>>,
}

impl<T: Data> Outlet<T> {
    pub fn new(world: &World) -> Self {
        Outlet {
            world: world.clone(),
            binding: RefCell::new(None),
        }
    }

    pub fn is_bound(&self) -> bool {
        self.binding.borrow().is_some()
    }

    pub fn bind<E, C>(&self, upstream: &E, callback: C) -> Result<(), WiringError>
    where
        E: Emitter<T> + Clone + 'static,
        C: Fn(T) + 'static,
    {
        if let Some(core) = self.binding.borrow().as_ref() {
            return Err(WiringError::OutletAlreadyBound(core.upstream));
        }
        same_world(&self.world, &[(upstream.world(), upstream.node())])?;
        self.connect(upstream, callback);
        Ok(())
    }

    pub(crate) fn connect<E, C>(&self, upstream: &E, callback: C)
    where
        E: Emitter<T> + Clone + 'static,
        C: Fn(T) + 'static,
    {
        let node = OwnNode::new(self.world.clone());
        node.depend_on(upstream.node());
        debug!("Outlet {} bound to {}", node.node(), upstream.node());
        let source = upstream.clone();
        let core = Rc::new(OutletCore {
            upstream: upstream.node(),
            pulse: Box::new(move || source.pulse()),
            callback: Box::new(callback),
            node,
        });
        core.node.attach(&core);
        *self.binding.borrow_mut() = Some(core);
    }

    pub fn upstream(&self) -> Option<NodeIndex> {
        self.binding.borrow().as_ref().map(|core| core.upstream)
    }
}

impl<T: Data> Debug for Outlet<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.upstream() {
            Some(upstream) => write!(f, "Outlet {{ upstream: {} }}", upstream),
            None => write!(f, "Outlet {{ unbound }}"),
        }
    }
}
