use super::product::*;
use crate::graph::{PinIndex, PinState};
use smallvec::SmallVec;
use std::fmt::{self, Display, Formatter};

/// Amount of properties kept in the stack for a sensor.
pub const SENSOR_PROPERTIES_TINYVEC_SIZE: usize = 4;

/// A single property a [Sensor] can detect.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Property {
    Color(Color),
    Shape(Shape),
    Content(Content),
}

impl Property {
    /// Returns true if `product` has this property.
    ///
    /// # Example
    /// ```
    /// # use kickgates::{Color, Content, Product, Property, Shape};
    /// let product = Product::new(Color::Red, Shape::Circle, Content::None);
    /// assert!(Property::Color(Color::Red).matches(&product));
    /// assert!(Property::Content(Content::None).matches(&product));
    /// assert!(!Property::Shape(Shape::Square).matches(&product));
    /// ```
    pub fn matches(&self, product: &Product) -> bool {
        match *self {
            Property::Color(color) => product.color == color,
            Property::Shape(shape) => product.shape == shape,
            Property::Content(content) => product.content == content,
        }
    }
}

impl Display for Property {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Property::Color(color) => write!(f, "color:{}", color),
            Property::Shape(shape) => write!(f, "shape:{}", shape),
            Property::Content(content) => write!(f, "content:{}", content),
        }
    }
}

/// Reads the product in front of it and drives one output pin per property.
#[derive(Debug, Clone, PartialEq)]
pub struct Sensor {
    properties: SmallVec<[Property; SENSOR_PROPERTIES_TINYVEC_SIZE]>,
    outputs: SmallVec<[PinIndex; SENSOR_PROPERTIES_TINYVEC_SIZE]>,
}

impl Sensor {
    /// Returns a new [Sensor], `outputs[i]` reports `properties[i]`.
    pub(crate) fn new(
        properties: SmallVec<[Property; SENSOR_PROPERTIES_TINYVEC_SIZE]>,
        outputs: SmallVec<[PinIndex; SENSOR_PROPERTIES_TINYVEC_SIZE]>,
    ) -> Self {
        debug_assert_eq!(properties.len(), outputs.len());
        Sensor {
            properties,
            outputs,
        }
    }

    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    pub fn outputs(&self) -> &[PinIndex] {
        &self.outputs
    }

    /// Returns the output pin reporting `property`, if the sensor has it.
    pub fn output_for(&self, property: Property) -> Option<PinIndex> {
        self.properties
            .iter()
            .position(|p| *p == property)
            .map(|i| self.outputs[i])
    }

    /// Returns the state every output pin should take for `product`.
    ///
    /// With nothing in view every pin reads [PinState::Zero].
    pub fn readings<'a>(
        &'a self,
        product: Option<&'a Product>,
    ) -> impl Iterator<Item = (PinIndex, PinState)> + 'a {
        self.properties
            .iter()
            .zip(self.outputs.iter())
            .map(move |(property, pin)| {
                let seen = product.map_or(false, |p| property.matches(p));
                (*pin, PinState::from_bool(seen))
            })
    }
}
