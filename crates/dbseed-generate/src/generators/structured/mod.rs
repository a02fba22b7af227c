use rand::{Rng, RngCore};
use serde_json::json;

use dbseed_core::LogicalType;

use crate::generators::{GeneratorContext, GeneratorRegistry, ValueGenerator};
use crate::value::SeedValue;

pub fn register(registry: &mut GeneratorRegistry) {
    registry.register_type(LogicalType::Json, Box::new(JsonPlaceholderGenerator));
    registry.register_type(LogicalType::Xml, Box::new(XmlPlaceholderGenerator));
    registry.register_type(LogicalType::Geometry, Box::new(PointGenerator));
}

struct JsonPlaceholderGenerator;

impl ValueGenerator for JsonPlaceholderGenerator {
    fn id(&self) -> &'static str {
        "structured.json"
    }

    fn generate(&self, ctx: &GeneratorContext<'_>, rng: &mut dyn RngCore) -> SeedValue {
        let seed: u32 = rng.random_range(0..10_000);
        SeedValue::Json(json!({
            "seed": seed,
            "source": format!("{}.{}", ctx.table.name, ctx.column.name),
        }))
    }
}

struct XmlPlaceholderGenerator;

impl ValueGenerator for XmlPlaceholderGenerator {
    fn id(&self) -> &'static str {
        "structured.xml"
    }

    fn generate(&self, _ctx: &GeneratorContext<'_>, rng: &mut dyn RngCore) -> SeedValue {
        let value: u32 = rng.random_range(0..10_000);
        SeedValue::Text(format!("<seed value=\"{value}\"/>"))
    }
}

/// WKT point with longitude/latitude in valid ranges.
struct PointGenerator;

impl ValueGenerator for PointGenerator {
    fn id(&self) -> &'static str {
        "structured.geometry.point"
    }

    fn generate(&self, _ctx: &GeneratorContext<'_>, rng: &mut dyn RngCore) -> SeedValue {
        let lon: f64 = rng.random_range(-180.0..=180.0);
        let lat: f64 = rng.random_range(-90.0..=90.0);
        SeedValue::Text(format!("POINT({lon:.6} {lat:.6})"))
    }
}

/// Generic text for types without a rule.
pub struct FallbackGenerator;

impl ValueGenerator for FallbackGenerator {
    fn id(&self) -> &'static str {
        "fallback.text"
    }

    fn generate(&self, ctx: &GeneratorContext<'_>, rng: &mut dyn RngCore) -> SeedValue {
        let mut suffix = [0_u8; 4];
        rng.fill_bytes(&mut suffix);
        SeedValue::Text(format!("{}_{}", ctx.column.name, hex::encode(suffix)))
    }
}
