//! The collaborator contract a platform-specific parallel-output peripheral
//! driver must satisfy. No implementation ships in this crate: the real
//! DMA/peripheral plumbing is external, per the crate's scope.

use crate::word::Word;

/// Binds one streaming peripheral to the buffer model.
///
/// Implementors own the word buffers (one if single-buffered, two if
/// double-buffered) and the hardware descriptor ring that streams them
/// continuously to the panel's CLK/OE/LE/address/data lines.
///
/// # Synchronization
///
/// `flip_to` requests the peripheral switch to streaming a different
/// buffer at the next cyclic boundary, typically by updating a DMA
/// descriptor under an interrupt-safe critical section. `flip_done` is
/// polled by the caller; an implementation should set its underlying flag
/// from the completion interrupt with release ordering and read it here
/// with acquire ordering, so writes to the newly-front buffer that happened
/// before the flip are visible once `flip_done` reports `true`.
pub trait PinDriver {
    /// The buffer word width this backend streams, selected by
    /// `num_bits` at [`PinDriver::setup`] time (see
    /// [`crate::word::word_width_for`]).
    type Word: Word;

    /// Backend-specific option bag (device index, clock divider, ...).
    type Config: Default;

    /// Acquires `num_buffers` word buffers of `buf_len` words each and
    /// configures the streaming peripheral. `data_pins` is indexed by
    /// logical bit position (see [`crate::BufferModel::oe_bit`] and
    /// friends); `clk_pin` is the shift clock.
    fn setup(
        &mut self,
        data_pins: &[i32],
        clk_pin: i32,
        config: Self::Config,
        num_buffers: usize,
        buf_len: usize,
    );

    /// Mutable access to word buffer `i`. Implementations that stream in a
    /// non-natural FIFO byte order apply their swizzle here; the core
    /// always addresses buffers by logical cycle index.
    fn buffer_mut(&mut self, i: usize) -> &mut [Self::Word];

    /// Requests the peripheral switch to streaming buffer `i` at the next
    /// cyclic boundary.
    fn flip_to(&mut self, i: usize);

    /// `true` once the most recent [`PinDriver::flip_to`] has taken effect.
    /// Always `true` for a single-buffered backend.
    fn flip_done(&mut self) -> bool;
}
