use strum_macros::{Display, EnumIter};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Display, EnumIter)]
pub enum Color {
    Red,
    Green,
    Blue,
    White,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Display, EnumIter)]
pub enum Shape {
    Circle,
    Square,
    Diamond,
}

/// What a product carries inside its shape.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Display, EnumIter)]
pub enum Content {
    Izzo,
    Smith,
    Football,
    Basketball,
    None,
}

/// A product travelling on the conveyor, as seen by a [Sensor](super::Sensor).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct Product {
    pub color: Color,
    pub shape: Shape,
    pub content: Content,
}

impl Product {
    pub fn new(color: Color, shape: Shape, content: Content) -> Product {
        Product {
            color,
            shape,
            content,
        }
    }
}
