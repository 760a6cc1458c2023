//! Binds a geometry and a pin-driver collaborator into a usable display:
//! owns the word buffer(s), builds the physical pin mapping, and exposes
//! `write_rgb`/`flip`/`flip_done`.

use crate::buffer_model::BufferModel;
use crate::geometry::Geometry;
use crate::pin_driver::PinDriver;
use crate::pins::Pins;
use crate::word::Word;
use embedded_graphics::{
    draw_target::DrawTarget,
    geometry::{OriginDimensions, Size},
    pixelcolor::{Rgb888, RgbColor},
    Pixel,
};

/// The assembled display: geometry `G`, a bounded sub-frame table of
/// capacity `N` (see [`BufferModel`]), pin-driver collaborator `P`, and
/// whether it streams one buffer or double-buffers.
pub struct DisplayDriver<G: Geometry, P: PinDriver, const N: usize, const DOUBLE_BUFFERED: bool> {
    buffer_model: BufferModel<G, N>,
    pin_driver: P,
    back_buffer: usize,
}

impl<G: Geometry, P: PinDriver, const N: usize, const DOUBLE_BUFFERED: bool>
    DisplayDriver<G, P, N, DOUBLE_BUFFERED>
{
    /// Builds the waveform layout, maps logical control bits onto `pins`,
    /// asks `pin_driver` to allocate its buffer(s), and initializes each
    /// with the static OE/LE/address pattern.
    ///
    /// Panics if `pins.addr`/`pins.data` don't match `G::ADDR_BITS`/
    /// `G::DATA_BITS`, or if the sub-frame table overflows `N`.
    pub fn new(
        mut pin_driver: P,
        pins: Pins,
        min_pulse: usize,
        num_bit_planes: usize,
        config: P::Config,
    ) -> Self {
        assert_eq!(
            pins.addr.len(),
            G::ADDR_BITS,
            "pins.addr length must equal Geometry::ADDR_BITS"
        );
        assert_eq!(
            pins.data.len(),
            G::DATA_BITS,
            "pins.data length must equal Geometry::DATA_BITS"
        );

        let buffer_model: BufferModel<G, N> = BufferModel::new(min_pulse, num_bit_planes);

        let num_bits = BufferModel::<G, N>::num_bits();
        assert!(
            P::Word::BITS as usize >= num_bits,
            "word width too narrow for num_bits"
        );
        let mut data_pins = [0i32; 32];
        data_pins[BufferModel::<G, N>::oe_bit()] = pins.oe;
        data_pins[BufferModel::<G, N>::le_bit()] = pins.le;
        for i in 0..G::ADDR_BITS {
            data_pins[BufferModel::<G, N>::addr_bit(i)] = pins.addr[i];
        }
        for i in 0..G::DATA_BITS {
            data_pins[BufferModel::<G, N>::data_bit(i)] = pins.data[i];
        }

        let num_buffers = if DOUBLE_BUFFERED { 2 } else { 1 };
        pin_driver.setup(
            &data_pins[..num_bits],
            pins.clk,
            config,
            num_buffers,
            buffer_model.buf_len,
        );

        for i in 0..num_buffers {
            buffer_model.init_buffer(pin_driver.buffer_mut(i));
        }

        let back_buffer = if DOUBLE_BUFFERED { 1 } else { 0 };

        DisplayDriver {
            buffer_model,
            pin_driver,
            back_buffer,
        }
    }

    /// Writes one pixel's three color channels into the back buffer,
    /// taking the top `num_bit_planes` bits of each `num_bits_value`-wide
    /// channel value.
    pub fn write_rgb(&mut self, row: usize, col: usize, r: u32, g: u32, b: u32, num_bits_value: u32) {
        let buf = self.pin_driver.buffer_mut(self.back_buffer);
        self.buffer_model.write_rgb(buf, row, col, r, g, b, num_bits_value);
    }

    /// Convenience wrapper for 8-bit-per-channel color values.
    pub fn write_rgb8(&mut self, row: usize, col: usize, r: u8, g: u8, b: u8) {
        self.write_rgb(row, col, r as u32, g as u32, b as u32, 8);
    }

    /// Requests the pin driver switch streaming to the back buffer at the
    /// next cyclic boundary. No-op when single-buffered.
    pub fn flip(&mut self) {
        if DOUBLE_BUFFERED {
            self.pin_driver.flip_to(self.back_buffer);
            self.back_buffer ^= 1;
        }
    }

    /// `true` once the most recent [`DisplayDriver::flip`] has taken
    /// effect. Always `true` when single-buffered.
    pub fn flip_done(&mut self) -> bool {
        if DOUBLE_BUFFERED {
            self.pin_driver.flip_done()
        } else {
            true
        }
    }

    pub fn buffer_model(&self) -> &BufferModel<G, N> {
        &self.buffer_model
    }

    /// Direct access to a specific word buffer, for tests and diagnostics
    /// that need to inspect or decode the raw waveform.
    pub fn raw_buffer_mut(&mut self, i: usize) -> &mut [P::Word] {
        self.pin_driver.buffer_mut(i)
    }
}

impl<G: Geometry, P: PinDriver, const N: usize, const DOUBLE_BUFFERED: bool> OriginDimensions
    for DisplayDriver<G, P, N, DOUBLE_BUFFERED>
{
    fn size(&self) -> Size {
        Size::new(G::COLS as u32, G::ROWS as u32)
    }
}

impl<G: Geometry, P: PinDriver, const N: usize, const DOUBLE_BUFFERED: bool> DrawTarget
    for DisplayDriver<G, P, N, DOUBLE_BUFFERED>
{
    type Color = Rgb888;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(coord, color) in pixels.into_iter() {
            if let Ok(pos) = coord.try_into() {
                let (x, y): (u32, u32) = pos;
                self.write_rgb8(y as usize, x as usize, color.r(), color.g(), color.b());
            }
        }
        Ok(())
    }
}
