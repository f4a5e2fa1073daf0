/// SQL dialect spoken by a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flavor {
    Mysql,
    Sqlite,
}

#[derive(Debug, Clone)]
pub struct Capability {
    pub flavor: Flavor,

    /// When true, DDL statements take part in the surrounding transaction
    /// and are undone by a rollback. MySQL commits implicitly around DDL.
    pub transactional_ddl: bool,
}

impl Capability {
    /// MySQL capabilities.
    pub const MYSQL: Self = Self {
        flavor: Flavor::Mysql,
        transactional_ddl: false,
    };

    /// SQLite capabilities.
    pub const SQLITE: Self = Self {
        flavor: Flavor::Sqlite,
        transactional_ddl: true,
    };
}
