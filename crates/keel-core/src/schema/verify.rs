use super::{FieldType, IndexRole, Schema};
use crate::{Error, Result};

use std::collections::HashSet;

struct Verify<'a, M> {
    schema: &'a Schema<M>,
}

pub(super) fn verify<M>(schema: &Schema<M>) -> Result<()> {
    Verify { schema }.verify()
}

impl<M> Verify<'_, M> {
    fn verify(&self) -> Result<()> {
        self.verify_field_names_are_unique()?;
        self.verify_single_identity()?;
        self.verify_string_sizes()?;
        self.verify_enum_tags_are_unique()?;
        self.verify_index_overrides()?;
        self.verify_multi_field_indices()?;
        Ok(())
    }

    fn verify_field_names_are_unique(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for field in self.schema.fields() {
            if !seen.insert(field.name()) {
                return Err(self.invalid(format!("duplicate field `{}`", field.name())));
            }
        }
        Ok(())
    }

    fn verify_single_identity(&self) -> Result<()> {
        let mut identities = self.schema.fields().filter(|field| field.is_unique_id());

        if let Some(identity) = identities.next() {
            if !matches!(identity.ty(), FieldType::Int | FieldType::Long) {
                return Err(self.invalid(format!(
                    "identity field `{}` must be an int or long, not {}",
                    identity.name(),
                    identity.ty().name()
                )));
            }
        }

        if let Some(second) = identities.next() {
            return Err(self.invalid(format!(
                "more than one identity field (second is `{}`)",
                second.name()
            )));
        }
        Ok(())
    }

    fn verify_string_sizes(&self) -> Result<()> {
        for field in self.schema.fields() {
            if field.ty().is_string() && field.size() == 0 {
                return Err(self.invalid(format!("string field `{}` has size 0", field.name())));
            }
        }
        Ok(())
    }

    fn verify_enum_tags_are_unique(&self) -> Result<()> {
        for field in self.schema.fields() {
            let FieldType::Enum(tags) = field.ty() else {
                continue;
            };
            let mut seen = HashSet::new();
            for (variant, tag) in tags.variants() {
                if !seen.insert(*tag) {
                    return Err(self.invalid(format!(
                        "enum field `{}`: variant {variant} reuses tag {tag}",
                        field.name()
                    )));
                }
            }
        }
        Ok(())
    }

    fn verify_index_overrides(&self) -> Result<()> {
        for (name, role) in &self.schema.index_overrides {
            let Some(field) = self.schema.field(name) else {
                return Err(self.invalid(format!("index override on unknown field `{name}`")));
            };
            // The identity is fixed by the field declaration.
            if *role == IndexRole::Identity || field.is_unique_id() {
                return Err(self.invalid(format!(
                    "index override on `{name}` cannot add or remove the identity"
                )));
            }
        }
        Ok(())
    }

    fn verify_multi_field_indices(&self) -> Result<()> {
        let mut numbers = HashSet::new();
        for index in self.schema.indices() {
            if !numbers.insert(index.number()) {
                return Err(self.invalid(format!("duplicate index number {}", index.number())));
            }
            if index.fields().is_empty() {
                return Err(self.invalid(format!("index {} has no fields", index.number())));
            }
            if index.role() == IndexRole::Identity {
                return Err(self.invalid(format!(
                    "index {} cannot be an identity index",
                    index.number()
                )));
            }
            for name in index.fields() {
                if self.schema.field(name).is_none() {
                    return Err(self.invalid(format!(
                        "index {} references unknown field `{name}`",
                        index.number()
                    )));
                }
            }
        }
        Ok(())
    }

    fn invalid(&self, message: String) -> Error {
        Error::invalid_schema(format!(
            "schema `{}` version {}: {message}",
            self.schema.name(),
            self.schema.version()
        ))
    }
}
