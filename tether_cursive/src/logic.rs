use log::warn;
use std::rc::{Rc, Weak};
use tether_reactive::{
    combine3, Cell, Emitter, Outlet, Source, Stream, WiringError, World,
};

/// Toggle state as reported by a two-state (or mixed) button.
pub type ButtonState = i64;

pub const OFF_STATE: ButtonState = 0;
pub const ON_STATE: ButtonState = 1;
pub const MIXED_STATE: ButtonState = -1;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Knock;

/// The view side of the home screen.
pub trait HomeController {
    fn set_lights_enabled(&self, value: bool);
    fn set_message(&self, value: String);
}

pub struct HomeLogic {
    world: World,

    src_knock: Source<Knock>,
    src_light_switch: Source<ButtonState>,
    src_at_home: Source<ButtonState>,

    s_knock_to_show: Stream<bool>,
    s_light_to_hide: Stream<bool>,
    s_at_home_to_hide: Stream<bool>,

    c_at_home: Cell<bool>,
    c_lights_on: Cell<bool>,
    c_should_show_message: Cell<bool>,
    c_message: Cell<String>,

    o_enable_lights: Outlet<bool>,
    o_set_message: Outlet<String>,
}

impl HomeLogic {
    /// Builds the graph and binds its outlets to `controller`. The
    /// controller is only referenced weakly, so it may own the logic.
    pub fn wire<C: HomeController + 'static>(controller: &Rc<C>) -> Result<Self, WiringError> {
        let world = World::new();

        let src_knock = world.source::<Knock>();
        let src_light_switch = world.source::<ButtonState>();
        let src_at_home = world.source::<ButtonState>();

        let s_knock_to_show = src_knock.map(return_show);
        let s_light_to_hide = src_light_switch.map(return_hide);
        let s_at_home_to_hide = src_at_home.map(return_hide);

        let c_should_show_message = world.merge_into_cell(
            &[
                s_knock_to_show.clone(),
                s_light_to_hide.clone(),
                s_at_home_to_hide.clone(),
            ],
            false,
        )?;
        let c_at_home = src_at_home.lift(true, button_state_to_bool);
        let c_lights_on = src_light_switch.lift(false, button_state_to_bool);
        let c_message = combine3(
            &c_should_show_message,
            &c_at_home,
            &c_lights_on,
            message_to_show,
        )?;

        let o_enable_lights = Outlet::new(&world);
        let view = Rc::downgrade(controller);
        o_enable_lights.bind(&c_at_home, move |enabled| {
            with_controller(&view, |c| c.set_lights_enabled(enabled))
        })?;

        let o_set_message = Outlet::new(&world);
        let view = Rc::downgrade(controller);
        o_set_message.bind(&c_message, move |message| {
            with_controller(&view, |c| c.set_message(message))
        })?;

        Ok(HomeLogic {
            world,
            src_knock,
            src_light_switch,
            src_at_home,
            s_knock_to_show,
            s_light_to_hide,
            s_at_home_to_hide,
            c_at_home,
            c_lights_on,
            c_should_show_message,
            c_message,
            o_enable_lights,
            o_set_message,
        })
    }

    pub fn send_knock(&self) {
        self.src_knock.push(Knock)
    }

    pub fn send_lights_on(&self, state: ButtonState) {
        self.src_light_switch.push(state)
    }

    pub fn send_at_home(&self, state: ButtonState) {
        self.src_at_home.push(state)
    }

    pub fn at_home(&self) -> bool {
        self.c_at_home.sample()
    }

    pub fn lights_on(&self) -> bool {
        self.c_lights_on.sample()
    }

    pub fn should_show_message(&self) -> bool {
        self.c_should_show_message.sample()
    }

    pub fn message(&self) -> String {
        self.c_message.sample()
    }

    pub fn world(&self) -> &World {
        &self.world
    }
}

impl std::fmt::Debug for HomeLogic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HomeLogic")
            .field("world", &self.world)
            .field("knock", &self.s_knock_to_show.node())
            .field("light_to_hide", &self.s_light_to_hide.node())
            .field("at_home_to_hide", &self.s_at_home_to_hide.node())
            .field("at_home", &self.c_at_home)
            .field("lights_on", &self.c_lights_on)
            .field("should_show_message", &self.c_should_show_message)
            .field("message", &self.c_message)
            .field("enable_lights", &self.o_enable_lights)
            .field("set_message", &self.o_set_message)
            .finish()
    }
}

fn with_controller<C: HomeController, F: FnOnce(&C)>(controller: &Weak<C>, then: F) {
    match controller.upgrade() {
        Some(c) => then(&*c),
        None => warn!("Home controller is gone, dropping update"),
    }
}

pub fn return_show(_: Knock) -> bool {
    true
}

pub fn return_hide(_: ButtonState) -> bool {
    false
}

pub fn button_state_to_bool(state: ButtonState) -> bool {
    state == ON_STATE
}

pub fn message_to_show(should_show: bool, at_home: bool, lights_on: bool) -> String {
    if !should_show || !at_home {
        String::new()
    } else if lights_on {
        String::from("Welcome!")
    } else {
        String::from("Go Away!")
    }
}
