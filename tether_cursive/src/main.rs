use cursive::Cursive;
use log::LevelFilter;
use std::rc::Rc;
use tether_cursive::controller::{home_dialog, TerminalController};
use tether_cursive::HomeLogic;
use tether_reactive::WiringError;

fn main() -> Result<(), WiringError> {
    cursive::logger::init();
    log::set_max_level(LevelFilter::Debug);

    let mut siv = cursive::default();
    let controller = Rc::new(TerminalController::new(siv.cb_sink().clone()));
    let logic = Rc::new(HomeLogic::wire(&controller)?);
    log::info!("Wired {:?}", logic.world());

    siv.add_layer(home_dialog(logic, controller.message()));
    siv.add_global_callback('~', Cursive::toggle_debug_console);

    // Starts the event loop.
    siv.run();
    Ok(())
}
