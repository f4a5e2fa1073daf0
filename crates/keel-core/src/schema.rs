mod builder;
pub use builder::SchemaBuilder;

mod delta;
pub use delta::Delta;

mod field;
pub use field::{EnumTags, Field, FieldType, IndexRole};

mod index;
pub use index::MultiFieldIndex;

mod table;
pub use table::Schema;

mod verify;

use std::sync::Arc;

/// A type-erased view of a schema, so that tables of different model types
/// can be migrated and inspected together.
pub trait Table: Send + Sync {
    fn schema_name(&self) -> &str;

    fn table_name(&self) -> &str;

    fn version(&self) -> u32;
}

impl<M: Send + Sync> Table for Schema<M> {
    fn schema_name(&self) -> &str {
        self.name()
    }

    fn table_name(&self) -> &str {
        Schema::table_name(self)
    }

    fn version(&self) -> u32 {
        Schema::version(self)
    }
}

impl<T: Table + ?Sized> Table for Arc<T> {
    fn schema_name(&self) -> &str {
        (**self).schema_name()
    }

    fn table_name(&self) -> &str {
        (**self).table_name()
    }

    fn version(&self) -> u32 {
        (**self).version()
    }
}
