use rand::{Rng, RngCore};

use crate::generators::{GeneratorContext, GeneratorRegistry, ValueGenerator, pick};
use crate::value::SeedValue;

pub fn register(registry: &mut GeneratorRegistry) {
    registry.register_name("firstName", Box::new(FirstNameGenerator));
    registry.register_name("lastName", Box::new(LastNameGenerator));
    registry.register_name("email", Box::new(EmailGenerator));
    registry.register_name("emailAddress", Box::new(EmailGenerator));
    registry.register_name("phoneNumber", Box::new(PhoneGenerator));
    registry.register_name("phone", Box::new(PhoneGenerator));
}

struct FirstNameGenerator;

impl ValueGenerator for FirstNameGenerator {
    fn id(&self) -> &'static str {
        "semantic.first_name"
    }

    fn generate(&self, _ctx: &GeneratorContext<'_>, rng: &mut dyn RngCore) -> SeedValue {
        SeedValue::Text(pick(FIRST_NAMES, rng).to_string())
    }
}

struct LastNameGenerator;

impl ValueGenerator for LastNameGenerator {
    fn id(&self) -> &'static str {
        "semantic.last_name"
    }

    fn generate(&self, _ctx: &GeneratorContext<'_>, rng: &mut dyn RngCore) -> SeedValue {
        SeedValue::Text(pick(LAST_NAMES, rng).to_string())
    }
}

/// Addresses on the reserved `example.com` domain.
struct EmailGenerator;

impl ValueGenerator for EmailGenerator {
    fn id(&self) -> &'static str {
        "semantic.email"
    }

    fn generate(&self, _ctx: &GeneratorContext<'_>, rng: &mut dyn RngCore) -> SeedValue {
        let first = pick(FIRST_NAMES, rng).to_lowercase();
        let last = pick(LAST_NAMES, rng).to_lowercase();
        let suffix = rng.random_range(1..=999);
        SeedValue::Text(format!("{first}.{last}{suffix}@example.com"))
    }
}

/// Numbers in the 555-0100..555-0199 range set aside for fiction.
struct PhoneGenerator;

impl ValueGenerator for PhoneGenerator {
    fn id(&self) -> &'static str {
        "semantic.phone"
    }

    fn generate(&self, _ctx: &GeneratorContext<'_>, rng: &mut dyn RngCore) -> SeedValue {
        let area = pick(AREA_CODES, rng);
        let line = rng.random_range(0..=99);
        SeedValue::Text(format!("({area}) 555-01{line:02}"))
    }
}

const FIRST_NAMES: &[&str] = &[
    "Ada", "Bruno", "Carla", "Diego", "Elena", "Felix", "Grace", "Hugo", "Irene", "Jonas",
    "Keira", "Luis", "Maya", "Nolan", "Olga", "Pedro", "Quinn", "Rosa", "Samir", "Tara",
];

const LAST_NAMES: &[&str] = &[
    "Almeida", "Brooks", "Castro", "Dalton", "Evans", "Fischer", "Garcia", "Hayes", "Ibarra",
    "Jensen", "Keller", "Lopez", "Moreau", "Novak", "Ortiz", "Park", "Quinlan", "Reyes",
];

const AREA_CODES: &[&str] = &["202", "312", "415", "512", "617", "702", "808", "919"];

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;
    use dbseed_core::{ColumnDescriptor, TableDescriptor};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn text(generator: &dyn ValueGenerator, seed: u64) -> String {
        let column = ColumnDescriptor::new("value", "varchar");
        let table = TableDescriptor::new("People", vec![column.clone()]);
        let ctx = GeneratorContext {
            table: &table,
            column: &column,
            base_time: NaiveDateTime::default(),
        };
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        generator
            .generate(&ctx, &mut rng)
            .as_str()
            .expect("text")
            .to_string()
    }

    #[test]
    fn emails_use_reserved_domain() {
        for seed in 0..10 {
            let email = text(&EmailGenerator, seed);
            assert!(email.ends_with("@example.com"), "{email}");
            assert_eq!(email.matches('@').count(), 1);
        }
    }

    #[test]
    fn phones_use_fictional_exchange() {
        for seed in 0..10 {
            let phone = text(&PhoneGenerator, seed);
            assert!(phone.contains(" 555-01"), "{phone}");
        }
    }

    #[test]
    fn names_come_from_pools() {
        for seed in 0..10 {
            assert!(FIRST_NAMES.contains(&text(&FirstNameGenerator, seed).as_str()));
            assert!(LAST_NAMES.contains(&text(&LastNameGenerator, seed).as_str()));
        }
    }
}
