use crate::Config;

use keel_core::{driver::Flavor, Connection};
use keel_sql::Serializer;

/// The engine context: configuration plus the logging span every operation
/// runs in.
///
/// Create one at process start and share it by reference. Connections are
/// passed to each call and are used exclusively for its duration.
#[derive(Debug)]
pub struct Engine {
    pub(crate) config: Config,
    pub(crate) span: tracing::Span,
}

impl Engine {
    pub fn new(config: Config) -> Engine {
        let span = tracing::info_span!("keel", registry = %config.registry_table);
        Engine { config, span }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn span(&self) -> &tracing::Span {
        &self.span
    }

    /// The serializer matching the connection's dialect and the configured
    /// table options.
    pub fn serializer(&self, conn: &dyn Connection) -> Serializer {
        self.serializer_for(conn.capability().flavor)
    }

    pub fn serializer_for(&self, flavor: Flavor) -> Serializer {
        Serializer::for_flavor(flavor)
            .table_options(&self.config.storage_engine, &self.config.charset)
    }
}

impl Default for Engine {
    fn default() -> Self {
        Engine::new(Config::default())
    }
}
