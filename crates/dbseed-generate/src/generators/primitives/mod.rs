use chrono::{Duration, NaiveTime};
use fake::Fake;
use fake::faker::lorem::en::Sentence;
use rand::{Rng, RngCore};

use dbseed_core::LogicalType;

use crate::generators::{GeneratorContext, GeneratorRegistry, ValueGenerator};
use crate::value::SeedValue;

/// Dates and timestamps fall within this many days before the run's base time.
const DATE_WINDOW_DAYS: i64 = 365;

pub fn register(registry: &mut GeneratorRegistry) {
    registry.register_type(
        LogicalType::TinyInt,
        Box::new(IntRangeGenerator {
            id: "primitive.tinyint",
            min: 0,
            max: 100,
        }),
    );
    registry.register_type(
        LogicalType::SmallInt,
        Box::new(IntRangeGenerator {
            id: "primitive.smallint",
            min: 0,
            max: 1_000,
        }),
    );
    registry.register_type(
        LogicalType::Integer,
        Box::new(IntRangeGenerator {
            id: "primitive.int",
            min: 0,
            max: 10_000,
        }),
    );
    registry.register_type(
        LogicalType::BigInt,
        Box::new(IntRangeGenerator {
            id: "primitive.bigint",
            min: 0,
            max: 1_000_000,
        }),
    );
    registry.register_type(LogicalType::Boolean, Box::new(BoolGenerator));
    registry.register_type(
        LogicalType::Float,
        Box::new(FloatRangeGenerator {
            id: "primitive.float",
            min: 0.0,
            max: 10_000.0,
            scale: None,
        }),
    );
    registry.register_type(
        LogicalType::Decimal,
        Box::new(FloatRangeGenerator {
            id: "primitive.decimal",
            min: 0.0,
            max: 10_000.0,
            scale: Some(2),
        }),
    );
    registry.register_type(
        LogicalType::Money,
        Box::new(FloatRangeGenerator {
            id: "primitive.money",
            min: 1.0,
            max: 1_000.0,
            scale: Some(2),
        }),
    );
    registry.register_type(LogicalType::Text, Box::new(SentenceGenerator));
    registry.register_type(LogicalType::Char, Box::new(CharGenerator));
    registry.register_type(LogicalType::Date, Box::new(DateGenerator));
    registry.register_type(LogicalType::Time, Box::new(TimeGenerator));
    registry.register_type(
        LogicalType::Timestamp,
        Box::new(TimestampGenerator {
            id: "primitive.timestamp",
        }),
    );
    registry.register_type(
        LogicalType::TimestampTz,
        Box::new(TimestampGenerator {
            id: "primitive.timestamptz",
        }),
    );
    registry.register_type(LogicalType::Uuid, Box::new(UuidGenerator));
    registry.register_type(LogicalType::Binary, Box::new(BytesGenerator));
}

struct IntRangeGenerator {
    id: &'static str,
    min: i64,
    max: i64,
}

impl ValueGenerator for IntRangeGenerator {
    fn id(&self) -> &'static str {
        self.id
    }

    fn generate(&self, _ctx: &GeneratorContext<'_>, rng: &mut dyn RngCore) -> SeedValue {
        SeedValue::Int(rng.random_range(self.min..=self.max))
    }
}

struct BoolGenerator;

impl ValueGenerator for BoolGenerator {
    fn id(&self) -> &'static str {
        "primitive.bool"
    }

    fn generate(&self, _ctx: &GeneratorContext<'_>, rng: &mut dyn RngCore) -> SeedValue {
        SeedValue::Bool(rng.random_bool(0.5))
    }
}

struct FloatRangeGenerator {
    id: &'static str,
    min: f64,
    max: f64,
    scale: Option<i32>,
}

impl ValueGenerator for FloatRangeGenerator {
    fn id(&self) -> &'static str {
        self.id
    }

    fn generate(&self, _ctx: &GeneratorContext<'_>, rng: &mut dyn RngCore) -> SeedValue {
        let value = rng.random_range(self.min..=self.max);
        let value = match self.scale {
            Some(scale) => {
                let factor = 10_f64.powi(scale);
                (value * factor).round() / factor
            }
            None => value,
        };
        SeedValue::Float(value)
    }
}

/// Short lorem sentence for free-text columns.
struct SentenceGenerator;

impl ValueGenerator for SentenceGenerator {
    fn id(&self) -> &'static str {
        "primitive.text.sentence"
    }

    fn generate(&self, _ctx: &GeneratorContext<'_>, rng: &mut dyn RngCore) -> SeedValue {
        let sentence: String = Sentence(3..8).fake_with_rng(rng);
        SeedValue::Text(sentence)
    }
}

/// Fixed-width character columns: uppercase letters filling the declared width.
struct CharGenerator;

impl ValueGenerator for CharGenerator {
    fn id(&self) -> &'static str {
        "primitive.char"
    }

    fn generate(&self, ctx: &GeneratorContext<'_>, rng: &mut dyn RngCore) -> SeedValue {
        let width = ctx.column.max_length.unwrap_or(1).clamp(1, 16);
        let text = (0..width)
            .map(|_| char::from(b'A' + rng.random_range(0..26_u8)))
            .collect();
        SeedValue::Text(text)
    }
}

struct DateGenerator;

impl ValueGenerator for DateGenerator {
    fn id(&self) -> &'static str {
        "primitive.date"
    }

    fn generate(&self, ctx: &GeneratorContext<'_>, rng: &mut dyn RngCore) -> SeedValue {
        let offset = rng.random_range(0..=DATE_WINDOW_DAYS);
        SeedValue::Date(ctx.base_time.date() - Duration::days(offset))
    }
}

struct TimeGenerator;

impl ValueGenerator for TimeGenerator {
    fn id(&self) -> &'static str {
        "primitive.time"
    }

    fn generate(&self, _ctx: &GeneratorContext<'_>, rng: &mut dyn RngCore) -> SeedValue {
        let seconds = rng.random_range(0..86_400_u32);
        SeedValue::Time(
            NaiveTime::from_num_seconds_from_midnight_opt(seconds, 0).unwrap_or_default(),
        )
    }
}

struct TimestampGenerator {
    id: &'static str,
}

impl ValueGenerator for TimestampGenerator {
    fn id(&self) -> &'static str {
        self.id
    }

    fn generate(&self, ctx: &GeneratorContext<'_>, rng: &mut dyn RngCore) -> SeedValue {
        let offset = rng.random_range(0..=DATE_WINDOW_DAYS * 86_400);
        SeedValue::Timestamp(ctx.base_time - Duration::seconds(offset))
    }
}

struct UuidGenerator;

impl ValueGenerator for UuidGenerator {
    fn id(&self) -> &'static str {
        "primitive.uuid"
    }

    fn generate(&self, _ctx: &GeneratorContext<'_>, rng: &mut dyn RngCore) -> SeedValue {
        SeedValue::Uuid(random_uuid(rng))
    }
}

struct BytesGenerator;

impl ValueGenerator for BytesGenerator {
    fn id(&self) -> &'static str {
        "primitive.bytes"
    }

    fn generate(&self, ctx: &GeneratorContext<'_>, rng: &mut dyn RngCore) -> SeedValue {
        let len = ctx.column.max_length.unwrap_or(16).clamp(1, 16) as usize;
        let mut bytes = vec![0_u8; len];
        rng.fill_bytes(&mut bytes);
        SeedValue::Bytes(bytes)
    }
}

/// Version 4 UUID drawn from the run's generator so seeded runs repeat.
pub fn random_uuid(rng: &mut dyn RngCore) -> uuid::Uuid {
    let mut bytes = [0_u8; 16];
    rng.fill_bytes(&mut bytes);
    uuid::Builder::from_random_bytes(bytes).into_uuid()
}
