#[macro_use]
mod fmt;
use fmt::ToSql;

mod delim;
use delim::Comma;

mod flavor;

mod ident;
use ident::Ident;

mod params;
use params::Placeholder;
pub use params::Slot;

// Statement serializers
mod alter;
mod column_def;
mod create_table;
mod dml;
mod registry;

use keel_core::driver::Flavor;

/// Generates SQL text for schemas in one dialect.
///
/// Every generated statement lists columns in the schema's declared field
/// order, so binding values in that same order always lines up.
#[derive(Debug, Clone)]
pub struct Serializer {
    /// The database flavor handles the differences between SQL dialects.
    flavor: Flavor,

    /// MySQL `ENGINE=` table option.
    storage_engine: String,

    /// MySQL `DEFAULT CHARSET=` table option.
    charset: String,
}

struct Formatter<'a> {
    /// Handle to the serializer
    serializer: &'a Serializer,

    /// Where to write the serialized SQL
    dst: &'a mut String,
}

impl Serializer {
    /// Sets the MySQL table options appended to `CREATE TABLE`.
    pub fn table_options(mut self, storage_engine: &str, charset: &str) -> Self {
        self.storage_engine = storage_engine.to_string();
        self.charset = charset.to_string();
        self
    }

    pub fn flavor(&self) -> Flavor {
        self.flavor
    }

    fn is_mysql(&self) -> bool {
        self.flavor == Flavor::Mysql
    }

    fn serialize(&self, f: impl FnOnce(&mut Formatter<'_>)) -> String {
        let mut ret = String::new();
        let mut fmt = Formatter {
            serializer: self,
            dst: &mut ret,
        };
        f(&mut fmt);
        ret
    }
}
