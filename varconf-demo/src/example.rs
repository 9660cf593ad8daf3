//! The configuration schema served by the demo.

use serde::{Deserialize, Serialize};
use varconf::{
    SchemaError, codec,
    variable::{
        BoolVar, CharVar, Container, DoubleVar, EnumVar, FloatVar, Group, IntVar, ListVar, MapVar,
        StringVar, Variable, Variants,
    },
};

/// Rendering quality preset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Quality {
    Low,
    Medium,
    High,
}

impl Variants for Quality {
    const VARIANTS: &'static [Self] = &[Quality::Low, Quality::Medium, Quality::High];

    fn name(&self) -> &str {
        match self {
            Quality::Low => "Low",
            Quality::Medium => "Medium",
            Quality::High => "High",
        }
    }
}

/// Remote endpoint, stored through serde.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
}

/// Contents of the `map` group.
pub struct MapSettings {
    pub scale: DoubleVar,
    pub quality: EnumVar<Quality>,
}

impl Container for MapSettings {
    fn variables(&self) -> Vec<&dyn Variable> {
        vec![&self.scale, &self.quality]
    }

    fn variables_mut(&mut self) -> Vec<&mut dyn Variable> {
        vec![&mut self.scale, &mut self.quality]
    }
}

/// One element of the `profiles` list.
pub struct Profile {
    pub name: StringVar,
    pub level: IntVar,
}

impl Profile {
    pub fn new() -> Self {
        Self {
            name: StringVar::without_default("name"),
            level: IntVar::bounded("level", 1, 1, 10),
        }
    }
}

impl Container for Profile {
    fn variables(&self) -> Vec<&dyn Variable> {
        vec![&self.name, &self.level]
    }

    fn variables_mut(&mut self) -> Vec<&mut dyn Variable> {
        vec![&mut self.name, &mut self.level]
    }
}

pub struct Example {
    pub string: StringVar,
    pub character: CharVar,
    pub boolean: BoolVar,
    pub float: FloatVar,
    pub array: ListVar<i32>,
    pub map: Group<MapSettings>,
    pub labels: MapVar<String>,
    pub profiles: ListVar<Group<Profile>>,
    pub endpoints: ListVar<Endpoint>,
}

impl Example {
    pub fn new() -> Result<Self, SchemaError> {
        let map = MapSettings {
            scale: DoubleVar::bounded("scale", 1.0, 0.1, 100.0),
            quality: EnumVar::new("quality", Quality::Medium),
        };

        Ok(Self {
            string: StringVar::new("string", "Default".to_string()),
            character: CharVar::new("character", 'a'),
            boolean: BoolVar::new("boolean", true),
            float: FloatVar::bounded("float", 1.0, 0.0, 10.0),
            array: ListVar::with_items("array", vec![Some(6)], codec::primitive::<i32>()),
            map: Group::new("map", map)?,
            labels: MapVar::new("labels", codec::primitive::<String>()),
            profiles: ListVar::new("profiles", codec::group(Profile::new)?),
            endpoints: ListVar::new("endpoints", codec::serde::<Endpoint>()),
        })
    }
}

impl Container for Example {
    fn variables(&self) -> Vec<&dyn Variable> {
        vec![
            &self.string,
            &self.character,
            &self.boolean,
            &self.float,
            &self.array,
            &self.map,
            &self.labels,
            &self.profiles,
            &self.endpoints,
        ]
    }

    fn variables_mut(&mut self) -> Vec<&mut dyn Variable> {
        vec![
            &mut self.string,
            &mut self.character,
            &mut self.boolean,
            &mut self.float,
            &mut self.array,
            &mut self.map,
            &mut self.labels,
            &mut self.profiles,
            &mut self.endpoints,
        ]
    }
}
