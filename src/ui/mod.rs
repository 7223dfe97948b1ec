//! Terminal explorer for dependency forests
//!
//! Renders each root tree as a collapsible list with fuzzy search.
//! Cycle stubs are marked so truncated branches are easy to spot.

mod app;
pub mod tree;

use std::io;
use std::rc::Rc;

use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use crate::tree::Artifact;

pub use app::{run_app, App};
pub use tree::{flatten_forest, toggle_forest_at_index, FlattenedNode, TreeNode};

/// Open the explorer on a forest and block until the user quits.
///
/// The terminal is restored even when the event loop fails.
pub fn explore(forest: &[Rc<Artifact>]) -> io::Result<()> {
    let mut roots = TreeNode::from_forest(forest);
    // A single tree starts opened one level
    if let [only] = roots.as_mut_slice() {
        only.expand_to_depth(1);
    }
    let mut app = App::new(roots);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    if let Err(err) = execute!(stdout, EnterAlternateScreen) {
        disable_raw_mode()?;
        return Err(err);
    }

    let result = Terminal::new(CrosstermBackend::new(stdout))
        .and_then(|mut terminal| run_app(&mut terminal, &mut app));

    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen)?;
    result
}
