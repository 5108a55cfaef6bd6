use std::sync::{Arc, Weak};

use crate::error::SchemaError;
use crate::schema::FormSchema;
use crate::validate::{CompiledSchema, compile};

/// Compiled validators memoized per schema instance.
///
/// Entries are keyed by `Arc` identity, so an equal but separately allocated
/// schema compiles again. Entries whose schema has been dropped are pruned on
/// each lookup.
#[derive(Debug, Default)]
pub struct SchemaCache {
    entries: Vec<(Weak<FormSchema>, Arc<CompiledSchema>)>,
}

impl SchemaCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_compile(
        &mut self,
        schema: &Arc<FormSchema>,
    ) -> Result<Arc<CompiledSchema>, SchemaError> {
        self.entries.retain(|(owner, _)| owner.strong_count() > 0);
        if let Some((_, compiled)) = self
            .entries
            .iter()
            .find(|(owner, _)| std::ptr::eq(owner.as_ptr(), Arc::as_ptr(schema)))
        {
            return Ok(Arc::clone(compiled));
        }

        let compiled = Arc::new(compile(schema)?);
        self.entries
            .push((Arc::downgrade(schema), Arc::clone(&compiled)));
        Ok(compiled)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldSchema, FieldType};

    fn schema() -> Arc<FormSchema> {
        Arc::new(FormSchema::new(vec![FieldSchema::new(
            "f1",
            "name",
            FieldType::Text,
            "Name",
        )]))
    }

    #[test]
    fn same_instance_reuses_compiled_output() {
        let mut cache = SchemaCache::new();
        let schema = schema();
        let first = cache.get_or_compile(&schema).expect("compile");
        let second = cache.get_or_compile(&schema).expect("compile");
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn equal_copy_compiles_separately_and_dropped_entries_prune() {
        let mut cache = SchemaCache::new();
        let schema_a = schema();
        let schema_b = Arc::new((*schema_a).clone());
        let first = cache.get_or_compile(&schema_a).expect("compile");
        let second = cache.get_or_compile(&schema_b).expect("compile");
        assert!(!Arc::ptr_eq(&first, &second));
        drop(schema_a);
        cache.get_or_compile(&schema_b).expect("compile");
        assert_eq!(cache.len(), 1);
    }
}
