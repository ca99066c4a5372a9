//! Carousel navigation
//!
//! Pure state machines behind the category carousels and the slideshow
//! view. Nothing here performs I/O.

pub mod engine;
pub mod gesture;
pub mod layout;
pub mod slideshow;

pub use engine::{initial_index, CarouselEngine, PointerTarget};
pub use gesture::{classify_gesture, Direction, Gesture, GestureConfig};
pub use layout::{card_layout, CardLayout};
pub use slideshow::Slideshow;
