pub mod image;

pub use self::image::{ImageBuffer, ImageF32, ImageRGB8, ImageY8, InputImage};
