//! Column value generators.
//!
//! Lookup happens in two steps: conventional column names (`firstName`,
//! `email`, ...) on textual columns first, then the column's logical type.
//! Types without a rule use the fallback generator and are reported.

use std::collections::HashMap;

use chrono::NaiveDateTime;
use rand::RngCore;

use dbseed_core::{ColumnDescriptor, LogicalType, TableDescriptor, normalize_column_name};

use crate::value::SeedValue;

pub mod primitives;
pub mod semantic;
pub mod structured;

/// Inputs available to a generator for one column of one row.
#[derive(Debug, Clone, Copy)]
pub struct GeneratorContext<'a> {
    pub table: &'a TableDescriptor,
    pub column: &'a ColumnDescriptor,
    pub base_time: NaiveDateTime,
}

pub trait ValueGenerator: Send + Sync {
    fn id(&self) -> &'static str;

    fn generate(&self, ctx: &GeneratorContext<'_>, rng: &mut dyn RngCore) -> SeedValue;
}

/// Result of a registry lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct Generated {
    pub value: SeedValue,
    pub generator_id: &'static str,
    pub fallback: bool,
}

/// Generators keyed by normalized column name and by logical type.
pub struct GeneratorRegistry {
    by_name: HashMap<String, Box<dyn ValueGenerator>>,
    by_type: HashMap<LogicalType, Box<dyn ValueGenerator>>,
    fallback: Box<dyn ValueGenerator>,
}

impl std::fmt::Debug for GeneratorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&str> = self.by_name.keys().map(String::as_str).collect();
        names.sort_unstable();
        let mut types: Vec<LogicalType> = self.by_type.keys().copied().collect();
        types.sort_unstable();
        f.debug_struct("GeneratorRegistry")
            .field("by_name", &names)
            .field("by_type", &types)
            .field("fallback", &self.fallback.id())
            .finish()
    }
}

impl Default for GeneratorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl GeneratorRegistry {
    /// Registry with the built-in name overrides and type generators.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        primitives::register(&mut registry);
        structured::register(&mut registry);
        semantic::register(&mut registry);
        registry
    }

    /// Registry with no rules; every column uses the fallback.
    pub fn empty() -> Self {
        Self {
            by_name: HashMap::new(),
            by_type: HashMap::new(),
            fallback: Box::new(structured::FallbackGenerator),
        }
    }

    /// Register a generator for a column name; the name is normalized.
    pub fn register_name(&mut self, column_name: &str, generator: Box<dyn ValueGenerator>) {
        self.by_name
            .insert(normalize_column_name(column_name), generator);
    }

    pub fn register_type(&mut self, logical: LogicalType, generator: Box<dyn ValueGenerator>) {
        self.by_type.insert(logical, generator);
    }

    pub fn has_type(&self, logical: LogicalType) -> bool {
        self.by_type.contains_key(&logical)
    }

    pub fn generate(&self, ctx: &GeneratorContext<'_>, rng: &mut dyn RngCore) -> Generated {
        let logical = ctx.column.logical_type();

        let (generator, fallback) = match self.lookup_name(ctx.column, logical) {
            Some(generator) => (generator, false),
            None => match self.by_type.get(&logical) {
                Some(generator) => (generator.as_ref(), false),
                None => (self.fallback.as_ref(), true),
            },
        };

        let value = generator.generate(ctx, rng);
        Generated {
            value: fit_length(value, ctx.column.max_length),
            generator_id: generator.id(),
            fallback,
        }
    }

    fn lookup_name(
        &self,
        column: &ColumnDescriptor,
        logical: LogicalType,
    ) -> Option<&dyn ValueGenerator> {
        if !logical.is_textual() {
            return None;
        }
        self.by_name
            .get(&normalize_column_name(&column.name))
            .map(|generator| generator.as_ref())
    }
}

/// Truncate text to the column's size hint, counting characters.
fn fit_length(value: SeedValue, max_length: Option<u32>) -> SeedValue {
    match (value, max_length) {
        (SeedValue::Text(text), Some(max)) if text.chars().count() > max as usize => {
            SeedValue::Text(text.chars().take(max as usize).collect())
        }
        (value, _) => value,
    }
}

pub(crate) fn pick<'a>(values: &'a [&'a str], rng: &mut dyn RngCore) -> &'a str {
    use rand::Rng;

    if values.is_empty() {
        return "";
    }
    values[rng.random_range(0..values.len())]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn generate(column: ColumnDescriptor) -> Generated {
        let table = TableDescriptor::new("People", vec![column.clone()]);
        let ctx = GeneratorContext {
            table: &table,
            column: &column,
            base_time: NaiveDateTime::default(),
        };
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        GeneratorRegistry::new().generate(&ctx, &mut rng)
    }

    #[test]
    fn name_override_wins_for_text_columns() {
        let generated = generate(ColumnDescriptor::new("first_name", "nvarchar(50)"));
        assert_eq!(generated.generator_id, "semantic.first_name");
        assert!(!generated.fallback);
    }

    #[test]
    fn name_override_ignored_for_non_text_columns() {
        let generated = generate(ColumnDescriptor::new("email", "int"));
        assert!(matches!(generated.value, SeedValue::Int(_)));
    }

    #[test]
    fn text_is_truncated_to_max_length() {
        let generated =
            generate(ColumnDescriptor::new("description", "varchar(5)").with_max_length(5));
        let text = generated.value.as_str().expect("text");
        assert!(text.chars().count() <= 5);
    }

    #[test]
    fn unknown_type_uses_fallback() {
        let generated = generate(ColumnDescriptor::new("shape", "hierarchyid"));
        assert!(generated.fallback);
        assert!(matches!(generated.value, SeedValue::Text(_)));
    }

    #[test]
    fn every_known_type_has_a_generator() {
        let registry = GeneratorRegistry::new();
        for logical in LogicalType::ALL {
            if *logical == LogicalType::Unknown {
                assert!(!registry.has_type(*logical));
            } else {
                assert!(registry.has_type(*logical), "{logical} has no generator");
            }
        }
    }
}
