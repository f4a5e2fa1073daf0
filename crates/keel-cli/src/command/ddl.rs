use anyhow::Result;
use clap::{Parser, ValueEnum};
use keel::{driver::Flavor, Engine, Migrate};

#[derive(Parser, Debug)]
pub struct DdlCommand {
    /// SQL dialect to print
    #[arg(long, value_enum, default_value_t = Dialect::Mysql)]
    dialect: Dialect,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Dialect {
    Mysql,
    Sqlite,
}

impl DdlCommand {
    pub(crate) fn run(self, engine: &Engine, tables: &[&dyn Migrate]) -> Result<()> {
        let flavor = match self.dialect {
            Dialect::Mysql => Flavor::Mysql,
            Dialect::Sqlite => Flavor::Sqlite,
        };
        let serializer = engine.serializer_for(flavor);

        for table in tables {
            println!("-- {} (version {})", table.table_name(), table.version());
            for sql in table.create_statements(&serializer) {
                println!("{sql};");
            }
            println!();
        }

        Ok(())
    }
}
