//! GPIO wiring description passed to a [`crate::pin_driver::PinDriver`].

/// Upper bound on `ADDR_BITS` this crate's [`Pins`] can describe. Panels
/// needing more row-address lines than this should widen the bound rather
/// than pass a geometry with `ADDR_BITS` beyond it.
pub const MAX_ADDR_BITS: usize = 8;

/// Upper bound on `DATA_BITS` this crate's [`Pins`] can describe.
pub const MAX_DATA_BITS: usize = 24;

/// Logical-to-physical GPIO wiring for one panel chain.
///
/// `addr` and `data` are bounded `heapless::Vec`s rather than arrays sized
/// by a geometry's associated consts, since stable Rust cannot size an
/// array from another type parameter's associated const. Their runtime
/// length is checked against the geometry by
/// [`crate::DisplayDriver::new`].
#[derive(Debug, Clone)]
pub struct Pins {
    pub clk: i32,
    pub oe: i32,
    pub le: i32,
    pub addr: heapless::Vec<i32, MAX_ADDR_BITS>,
    pub data: heapless::Vec<i32, MAX_DATA_BITS>,
}
