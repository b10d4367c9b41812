use crate::cell::Cell;
use crate::graph::NodeIndex;
use crate::outlet::Outlet;
use crate::stream::Stream;
use crate::world::World;
use crate::{Data, Emitter, WiringError};

pub(crate) fn same_world(
    world: &World,
    nodes: &[(&World, NodeIndex)],
) -> Result<World, WiringError> {
    match nodes.iter().find(|(other, _)| !world.same(other)) {
        Some((_, foreign)) => Err(WiringError::ForeignWorld(*foreign)),
        None => Ok(world.clone()),
    }
}

pub fn lift_to_stream<A, B, E, M>(upstream: &E, mapper: M) -> Stream<B>
where
    A: Data,
    B: Data,
    E: Emitter<A> + Clone + 'static,
    M: Fn(A) -> B + 'static,
{
    let parent = upstream.clone();
    Stream::create(upstream.world(), &[upstream.node()], move || {
        parent.pulse().map(&mapper)
    })
}

pub fn lift_to_cell<A, B, E, M>(upstream: &E, initial: B, mapper: M) -> Cell<B>
where
    A: Data,
    B: Data,
    E: Emitter<A> + Clone + 'static,
    M: Fn(A) -> B + 'static,
{
    let parent = upstream.clone();
    Cell::create(upstream.world(), &[upstream.node()], initial, move || {
        parent.pulse().map(&mapper)
    })
}

/// A cell taking the value of whichever stream fires. When several fire
/// in one propagation, the first one in `streams` wins.
pub fn merge_streams_into_cell<T: Data>(
    streams: &[Stream<T>],
    initial: T,
) -> Result<Cell<T>, WiringError> {
    let first = streams.first().ok_or(WiringError::EmptyMerge)?;
    let nodes: Vec<(&World, NodeIndex)> = streams.iter().map(|s| (s.world(), s.node())).collect();
    let world = same_world(first.world(), &nodes)?;
    let parents: Vec<NodeIndex> = streams.iter().map(|s| s.node()).collect();
    let streams = streams.to_vec();
    Ok(Cell::create(&world, &parents, initial, move || {
        streams.iter().find_map(|s| s.pulse())
    }))
}

impl World {
    pub fn merge_into_cell<T: Data>(
        &self,
        streams: &[Stream<T>],
        initial: T,
    ) -> Result<Cell<T>, WiringError> {
        let nodes: Vec<(&World, NodeIndex)> = streams.iter().map(|s| (s.world(), s.node())).collect();
        same_world(self, &nodes)?;
        merge_streams_into_cell(streams, initial)
    }
}

pub fn bind_outlet<T, E, C>(upstream: &E, callback: C) -> Outlet<T>
where
    T: Data,
    E: Emitter<T> + Clone + 'static,
    C: Fn(T) + 'static,
{
    let outlet = Outlet::new(upstream.world());
    outlet.connect(upstream, callback);
    outlet
}

macro_rules! combine_cells {
    ($(#[$doc:meta])* $name:ident, $($input:ident: $ty:ident),+) => {
        $(#[$doc])*
        pub fn $name<$($ty: Data,)+ O: Data, M: Fn($($ty),+) -> O + 'static>(
            $($input: &Cell<$ty>,)+
            mapper: M,
        ) -> Result<Cell<O>, WiringError> {
            let nodes = [$(($input.world(), $input.node())),+];
            let world = same_world(nodes[0].0, &nodes)?;
            let parents = [$($input.node()),+];
            let initial = mapper($($input.sample()),+);
            $(let $input = $input.clone();)+
            Ok(Cell::create(&world, &parents, initial, move || {
                if $($input.fired())||+ {
                    Some(mapper($($input.sample()),+))
                } else {
                    None
                }
            }))
        }
    };
}

combine_cells!(
    /// A cell recomputed from the current values of both inputs whenever
    /// either of them is updated.
    combine2, a: A, b: B
);
combine_cells!(combine3, a: A, b: B, c: C);
combine_cells!(combine4, a: A, b: B, c: C, d: D);
