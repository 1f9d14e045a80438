//! CLI command implementations.
//!
//! Each submodule implements a specific CLI command:
//! - [`append`] - Append one entry of a given type
//! - [`show`] - Print the stored history
//! - [`prune`] - Re-apply retention to the stored history

pub mod append;
pub mod prune;
pub mod show;

pub use append::AppendCommand;
pub use prune::PruneCommand;
pub use show::ShowCommand;
