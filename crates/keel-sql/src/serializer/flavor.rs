use super::Serializer;

use keel_core::driver::Flavor;

impl Serializer {
    pub fn mysql() -> Serializer {
        Serializer::for_flavor(Flavor::Mysql)
    }

    pub fn sqlite() -> Serializer {
        Serializer::for_flavor(Flavor::Sqlite)
    }

    pub fn for_flavor(flavor: Flavor) -> Serializer {
        Serializer {
            flavor,
            storage_engine: "InnoDB".to_string(),
            charset: "utf8".to_string(),
        }
    }
}
