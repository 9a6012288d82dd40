//! karmad command line front end
//!
//! Thin layer over `karmad-lyrics` and `karmad-common`: argument parsing,
//! startup (config, logging, root folder) and one handler per subcommand.

pub mod args;
pub mod commands;
pub mod context;

pub use args::{Args, Command};
pub use context::AppContext;
