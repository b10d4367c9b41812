use crate::graph::{Graph, NodeIndex, SearchContinuation};
use log::{debug, trace, warn};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt::{Debug, Formatter};
use std::rc::{Rc, Weak};

pub(crate) trait Propagate {
    /// Recomputes the node from its parents. Called at most once per
    /// propagation, after every parent has been updated.
    fn update(&self);

    fn settle(&self);

    /// Drops input queued for propagations that will not run.
    fn discard(&self) {}
}

struct NodeState {
    dirty: bool,
    core: Option<Weak<dyn Propagate>>,
}

struct WorldData {
    dependencies: Graph<NodeState>,
    roots: VecDeque<NodeIndex>,
    in_flight: Vec<(NodeIndex, Weak<dyn Propagate>)>,
    propagating: bool,
    propagations: u64,
}

pub struct World(Rc<RefCell<WorldData>>);

impl World {
    pub fn new() -> Self {
        World(Rc::new(RefCell::new(WorldData {
            dependencies: Graph::new(),
            roots: VecDeque::new(),
            in_flight: Vec::new(),
            propagating: false,
            propagations: 0,
        })))
    }

    pub fn same(&self, other: &World) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub fn node_count(&self) -> usize {
        self.0.borrow().dependencies.len()
    }

    pub fn propagations(&self) -> u64 {
        self.0.borrow().propagations
    }

    pub fn is_propagating(&self) -> bool {
        self.0.borrow().propagating
    }

    pub(crate) fn create_node(&self) -> NodeIndex {
        self.0.borrow_mut().dependencies.add_node(NodeState {
            dirty: false,
            core: None,
        })
    }

    pub(crate) fn attach(&self, node: NodeIndex, core: Weak<dyn Propagate>) {
        self.0.borrow_mut().dependencies[node].core = Some(core);
    }

    pub(crate) fn destroy_node(&self, node: NodeIndex) {
        self.0.borrow_mut().dependencies.remove_node(node);
    }

    pub(crate) fn add_dependency(&self, parent: NodeIndex, child: NodeIndex) {
        self.0.borrow_mut().dependencies.add_edge(parent, child);
    }

    /// Runs one propagation rooted at `root`. When called while another
    /// propagation is in progress, the root is queued and handled right
    /// after the running one completes.
    pub(crate) fn schedule(&self, root: NodeIndex) {
        {
            let mut wd = self.0.borrow_mut();
            wd.roots.push_back(root);
            if wd.propagating {
                trace!("Queued propagation from {}", root);
                return;
            }
            wd.propagating = true;
        }
        let _running = Running(self);
        loop {
            let next = self.0.borrow_mut().roots.pop_front();
            match next {
                Some(root) => self.propagate(root),
                None => break,
            }
        }
    }

    fn propagate(&self, root: NodeIndex) {
        let order = {
            let mut wd = self.0.borrow_mut();
            wd.propagations += 1;
            let dirty = mark_dirty(&mut wd.dependencies, root);
            let order: Vec<(NodeIndex, Weak<dyn Propagate>)> = dirty
                .into_iter()
                .filter_map(|node| Some((node, wd.dependencies[node].core.clone()?)))
                .collect();
            wd.in_flight = order.clone();
            order
        };
        debug!("Propagating from {} through {} nodes", root, order.len());
        for (node, core) in &order {
            // skips nodes dropped by an earlier callback
            if let Some(core) = core.upgrade() {
                trace!("Updating {}", node);
                core.update();
            }
        }
        self.settle();
    }

    fn settle(&self) {
        let order = std::mem::take(&mut self.0.borrow_mut().in_flight);
        for (_, core) in &order {
            if let Some(core) = core.upgrade() {
                core.settle();
            }
        }
        let mut wd = self.0.borrow_mut();
        for (node, _) in &order {
            if wd.dependencies.contains(*node) {
                wd.dependencies[*node].dirty = false;
            }
        }
    }

    /// Leaves the world ready for the next push after a propagation
    /// panicked: the interrupted nodes are settled and queued pushes are
    /// dropped.
    fn abort(&self) {
        self.settle();
        let abandoned: Vec<Weak<dyn Propagate>> = {
            let mut wd = self.0.borrow_mut();
            let roots: Vec<NodeIndex> = wd.roots.drain(..).collect();
            roots
                .into_iter()
                .filter(|root| wd.dependencies.contains(*root))
                .filter_map(|root| wd.dependencies[root].core.clone())
                .collect()
        };
        warn!("Propagation panicked, dropping {} queued pushes", abandoned.len());
        for core in &abandoned {
            if let Some(core) = core.upgrade() {
                core.discard();
            }
        }
    }
}

fn mark_dirty(dependencies: &mut Graph<NodeState>, root: NodeIndex) -> Vec<NodeIndex> {
    let mut marked = vec![root];
    dependencies[root].dirty = true;
    dependencies.search_children_mut(
        |child, state| {
            if !state.dirty {
                state.dirty = true;
                marked.push(child);
                SearchContinuation::Continue
            } else {
                SearchContinuation::Stop
            }
        },
        root,
    );
    marked.sort_by_key(|node| (dependencies.rank(*node), *node));
    marked
}

struct Running<'w>(&'w World);

impl<'w> Drop for Running<'w> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            self.0.abort();
        }
        (self.0).0.borrow_mut().propagating = false;
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for World {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl Debug for World {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let wd = self.0.borrow();
        write!(
            f,
            "World {{ nodes: {}, propagations: {} }}",
            wd.dependencies.len(),
            wd.propagations
        )
    }
}

pub(crate) struct OwnNode(World, NodeIndex);

impl OwnNode {
    pub fn new(world: World) -> Self {
        let idx = world.create_node();
        Self(world, idx)
    }

    pub fn world(&self) -> &World {
        &self.0
    }

    pub fn node(&self) -> NodeIndex {
        self.1
    }

    pub fn depend_on(&self, parent: NodeIndex) {
        self.0.add_dependency(parent, self.1)
    }

    pub fn attach<P: Propagate + 'static>(&self, core: &Rc<P>) {
        let core: Rc<dyn Propagate> = core.clone();
        self.0.attach(self.1, Rc::downgrade(&core))
    }
}

impl Drop for OwnNode {
    fn drop(&mut self) {
        debug!("Dropping node: {}", self.1);
        self.0.destroy_node(self.1)
    }
}
