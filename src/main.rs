//! Binary entry point: resolve paths, start logging, open the store, load the
//! first snapshot and hand everything to the terminal loop.
use anyhow::Context;
use student_roster::{logging, run_app, App, Config, RecordStore, RosterView};
use tracing::info;

fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    logging::init(&config.log_path)?;
    info!(db = %config.db_path.display(), "starting student roster");

    let store = RecordStore::open(&config.db_path).context("failed to open record store")?;
    let mut view = RosterView::new();
    view.refresh(&store).context("failed to load students")?;

    let mut app = App::new(store, view);
    run_app(&mut app)
}
