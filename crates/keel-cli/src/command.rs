mod ddl;
pub use ddl::DdlCommand;

mod migrate;
pub use migrate::MigrateCommand;

mod status;
pub use status::StatusCommand;

use clap::Parser;

#[derive(Parser, Debug)]
pub(crate) enum Command {
    /// Create missing tables and apply pending schema versions
    Migrate(MigrateCommand),

    /// Compare the version registry against the current schemas
    Status(StatusCommand),

    /// Print the statements that create every table at its current version
    Ddl(DdlCommand),
}
