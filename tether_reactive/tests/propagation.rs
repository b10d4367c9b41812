use log::LevelFilter;
use simple_logger::SimpleLogger;
use std::cell::{Cell as Counter, RefCell};
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;
use tether_reactive::*;

fn init_logging() {
    let _ = SimpleLogger::new().with_level(LevelFilter::Trace).init();
}

#[test]
fn test_diamond_computes_once() {
    init_logging();
    let world = World::new();
    let src = world.source::<i32>();
    let plus = src.lift(0, |x| x + 1);
    let times = src.lift(0, |x| x * 2);
    let calls = Rc::new(Counter::new(0));
    let c = calls.clone();
    let pair = combine2(&plus, &times, move |p, t| {
        c.set(c.get() + 1);
        (p, t)
    })
    .unwrap();
    assert_eq!(1, calls.get());

    let seen = Rc::new(RefCell::new(Vec::new()));
    let s = seen.clone();
    let _out = bind_outlet(&pair, move |v| s.borrow_mut().push(v));

    src.push(1);
    src.push(5);
    assert_eq!(3, calls.get());
    assert_eq!(vec![(2, 2), (6, 10)], *seen.borrow());
}

#[test]
fn test_one_propagation_per_push() {
    init_logging();
    let world = World::new();
    let a = world.source::<i32>();
    let b = world.source::<i32>();
    let sum = combine2(&a.stream().hold(0), &b.stream().hold(0), |x, y| x + y).unwrap();
    let calls = Rc::new(Counter::new(0));
    let c = calls.clone();
    let _out = bind_outlet(&sum, move |_| c.set(c.get() + 1));
    let before = world.propagations();
    a.push(1);
    b.push(2);
    a.push(1);
    assert_eq!(before + 3, world.propagations());
    assert_eq!(3, calls.get());
    assert!(!world.is_propagating());
}

#[test]
fn test_outlet_sees_committed_values() {
    init_logging();
    let world = World::new();
    let src = world.source::<i32>();
    let doubled = src.lift(0, |x| x * 2);
    let total = combine2(&doubled, &world.constant(100), |d, k| d + k).unwrap();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let s = seen.clone();
    let d = doubled.clone();
    let t = total.clone();
    let _out = bind_outlet(&total, move |v| {
        s.borrow_mut().push((v, d.sample(), t.sample()));
    });
    src.push(3);
    src.push(4);
    assert_eq!(vec![(106, 6, 106), (108, 8, 108)], *seen.borrow());
}

#[test]
fn test_untouched_branches_stay_quiet() {
    init_logging();
    let world = World::new();
    let a = world.source::<i32>();
    let b = world.source::<i32>();
    let held_a = a.stream().hold(0);
    let held_b = b.stream().hold(0);
    let a_calls = Rc::new(Counter::new(0));
    let b_calls = Rc::new(Counter::new(0));
    let ac = a_calls.clone();
    let bc = b_calls.clone();
    let _oa = bind_outlet(&held_a, move |_| ac.set(ac.get() + 1));
    let _ob = bind_outlet(&held_b, move |_| bc.set(bc.get() + 1));
    a.push(1);
    a.push(2);
    b.push(3);
    assert_eq!(2, a_calls.get());
    assert_eq!(1, b_calls.get());
}

#[test]
fn test_push_from_outlet_is_queued() {
    init_logging();
    let world = World::new();
    let src = world.source::<i32>();
    let log = Rc::new(RefCell::new(Vec::new()));

    let echo = src.clone();
    let l = log.clone();
    let _first = bind_outlet(&src, move |v| {
        l.borrow_mut().push(format!("first {}", v));
        if v < 3 {
            echo.push(v + 1);
            l.borrow_mut().push(format!("pushed {}", v + 1));
        }
    });
    let l = log.clone();
    let _second = bind_outlet(&src, move |v| l.borrow_mut().push(format!("second {}", v)));

    src.push(1);
    assert_eq!(
        vec![
            "first 1", "pushed 2", "second 1", "first 2", "pushed 3", "second 2", "first 3",
            "second 3",
        ],
        *log.borrow()
    );
    assert_eq!(3, world.propagations());
}

#[test]
fn test_dropped_handles_keep_upstream_alive() {
    init_logging();
    let world = World::new();
    let src = world.source::<i32>();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let s = seen.clone();
    let out = {
        let mapped = src.map(|x| x * 3);
        let held = mapped.hold(0);
        bind_outlet(&held, move |v| s.borrow_mut().push(v))
    };
    assert_eq!(4, world.node_count());
    src.push(2);
    assert_eq!(vec![6], *seen.borrow());
    drop(out);
    assert_eq!(1, world.node_count());
}

#[test]
fn test_recovers_after_panicking_outlet() {
    init_logging();
    let world = World::new();
    let src = world.source::<i32>();
    let held = src.stream().hold(0);
    let seen = Rc::new(RefCell::new(Vec::new()));
    let s = seen.clone();
    let _out = bind_outlet(&held, move |v| {
        if v == 13 {
            panic!("unlucky value");
        }
        s.borrow_mut().push(v);
    });
    src.push(1);
    assert!(panic::catch_unwind(AssertUnwindSafe(|| src.push(13))).is_err());
    assert!(!world.is_propagating());
    assert_eq!(13, held.sample());

    src.push(2);
    src.push(3);
    assert_eq!(3, held.sample());
    assert_eq!(vec![1, 2, 3], *seen.borrow());
}

#[test]
fn test_panic_drops_queued_pushes() {
    init_logging();
    let world = World::new();
    let src = world.source::<i32>();
    let other = world.source::<i32>();
    let held = other.stream().hold(0);
    let echo = other.clone();
    let _out = bind_outlet(&src, move |v| {
        echo.push(v * 10);
        if v == 13 {
            panic!("unlucky value");
        }
    });
    src.push(1);
    assert_eq!(10, held.sample());

    assert!(panic::catch_unwind(AssertUnwindSafe(|| src.push(13))).is_err());
    assert_eq!(10, held.sample());
    other.push(4);
    assert_eq!(4, held.sample());
    src.push(2);
    assert_eq!(20, held.sample());
}

#[test]
fn test_outlet_dropped_by_callback_stays_quiet() {
    init_logging();
    let world = World::new();
    let src = world.source::<i32>();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let s = seen.clone();
    let victim = Rc::new(RefCell::new(Some(bind_outlet(
        &src.map(|x| x),
        move |v| s.borrow_mut().push(v),
    ))));
    let v = victim.clone();
    let _dropper = bind_outlet(&src, move |_| {
        drop(v.borrow_mut().take());
    });
    assert_eq!(4, world.node_count());
    src.push(7);
    assert!(seen.borrow().is_empty());
    assert!(victim.borrow().is_none());
    assert_eq!(2, world.node_count());
    src.push(8);
    assert!(seen.borrow().is_empty());
}
