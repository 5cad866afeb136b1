//! Terminal front end. It owns no data of its own: the record store and the
//! roster view are injected through [`App::new`], and every user action goes
//! store first, then view refresh, then redraw.

mod app;
mod forms;
mod helpers;
mod terminal;

pub use app::App;
pub use terminal::run_app;
