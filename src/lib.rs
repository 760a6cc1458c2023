#![no_std]

mod buffer_model;
mod driver;
mod geometry;
mod pins;
mod word;

pub mod pin_driver;

pub use buffer_model::{BufferModel, SubFrame};
pub use driver::DisplayDriver;
pub use geometry::{DataAddr, FullDisplay, Geometry, WrappedDisplay};
pub use pins::Pins;
pub use word::Word;
