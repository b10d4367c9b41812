use crate::logic::{ButtonState, HomeController, HomeLogic, OFF_STATE, ON_STATE};
use cursive::traits::Nameable;
use cursive::views::{Checkbox, Dialog, DummyView, LinearLayout, TextContent, TextView};
use cursive::{CbSink, Cursive, View};
use log::{debug, warn};
use std::rc::Rc;

pub const LIGHTS_SWITCH: &str = "lights";

/// Applies the values computed by [`HomeLogic`] to the terminal UI.
pub struct TerminalController {
    message: TextContent,
    sink: CbSink,
}

impl TerminalController {
    pub fn new(sink: CbSink) -> Self {
        Self {
            message: TextContent::new(""),
            sink,
        }
    }

    pub fn message(&self) -> TextContent {
        self.message.clone()
    }
}

impl HomeController for TerminalController {
    fn set_lights_enabled(&self, value: bool) {
        debug!("Lights switch enabled: {}", value);
        let sent = self.sink.send(Box::new(move |s: &mut Cursive| {
            s.call_on_name(LIGHTS_SWITCH, |c: &mut Checkbox| c.set_enabled(value));
        }));
        if sent.is_err() {
            warn!("UI is gone, lights switch left as is");
        }
    }

    fn set_message(&self, value: String) {
        self.message.set_content(value);
    }
}

pub fn state_of(checked: bool) -> ButtonState {
    if checked {
        ON_STATE
    } else {
        OFF_STATE
    }
}

pub fn home_dialog(logic: Rc<HomeLogic>, message: TextContent) -> impl View {
    let at_home = logic.clone();
    let lights = logic.clone();
    let knock = logic;

    let at_home_switch = Checkbox::new()
        .with_checked(true)
        .on_change(move |_, checked| at_home.send_at_home(state_of(checked)));
    let lights_switch = Checkbox::new()
        .on_change(move |_, checked| lights.send_lights_on(state_of(checked)))
        .with_name(LIGHTS_SWITCH);

    Dialog::around(
        LinearLayout::vertical()
            .child(
                LinearLayout::horizontal()
                    .child(at_home_switch)
                    .child(TextView::new(" At home")),
            )
            .child(
                LinearLayout::horizontal()
                    .child(lights_switch)
                    .child(TextView::new(" Lights on")),
            )
            .child(DummyView)
            .child(TextView::new_with_content(message)),
    )
    .title("Home")
    .button("Knock", move |_| knock.send_knock())
    .button("Quit", |s| s.quit())
}
