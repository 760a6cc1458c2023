//! Precomputed cyclic DMA waveform: sub-frame allocation, packing, address
//! transitions, and the per-pixel bit writers that sit on top of them.

use crate::geometry::Geometry;
use crate::word::Word;
use core::marker::PhantomData;

/// One `(bit-plane, row-address)` scheduling unit of the packed waveform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubFrame {
    /// Bit-plane index, in `0..num_bit_planes`.
    pub bit: usize,
    pub addr: usize,
    /// Length in cycles of this sub-frame's OE-active pulse.
    pub oe_length: usize,
    /// Cycle index at which this sub-frame's data begins shifting in.
    pub data_offset: usize,
    /// Cycle index at which this sub-frame's OE pulse begins.
    pub oe_offset: usize,
    /// Cycle index, cyclic, at which the row address switches to this
    /// sub-frame's `addr`.
    pub addr_transition: usize,
}

/// Planner and waveform encoder for one geometry.
///
/// `N` bounds the sub-frame table: construction panics if
/// `num_bit_planes * 2^ADDR_BITS` exceeds it. This crate carries no
/// allocator, so callers size `N` for the largest configuration they build.
pub struct BufferModel<G: Geometry, const N: usize> {
    sub_frames: heapless::Vec<SubFrame, N>,
    /// Lookup table from `bit_plane * num_addrs + addr` to `data_offset`,
    /// used by [`BufferModel::write_color`] to find where a pixel's bit
    /// lives without re-scanning `sub_frames`.
    data_offsets: heapless::Vec<usize, N>,
    pub buf_len: usize,
    pub min_pulse: usize,
    pub num_bit_planes: usize,
    _geometry: PhantomData<G>,
}

impl<G: Geometry, const N: usize> BufferModel<G, N> {
    /// Bit position of the output-enable line within a buffer word.
    pub const fn oe_bit() -> usize {
        0
    }

    /// Bit position of the latch-enable line within a buffer word.
    pub const fn le_bit() -> usize {
        1
    }

    /// Bit position of row-address line `i` within a buffer word.
    pub const fn addr_bit(i: usize) -> usize {
        2 + i
    }

    /// Bit position of data lane `i` within a buffer word.
    pub const fn data_bit(i: usize) -> usize {
        2 + G::ADDR_BITS + i
    }

    /// Total control-and-data bits a buffer word must carry.
    pub const fn num_bits() -> usize {
        2 + G::ADDR_BITS + G::DATA_BITS
    }

    const fn num_addrs() -> usize {
        1 << G::ADDR_BITS
    }

    /// Builds the static waveform layout for `num_bit_planes` bit-planes,
    /// each weighted `min_pulse << bit_plane` cycles of OE-on time.
    ///
    /// Panics if the sub-frame table would overflow `N`.
    pub fn new(min_pulse: usize, num_bit_planes: usize) -> Self {
        let mut sub_frames: heapless::Vec<SubFrame, N> = heapless::Vec::new();
        Self::allocate_subframes(&mut sub_frames, min_pulse, num_bit_planes);

        let buf_len = Self::pack_subframes(&mut sub_frames);
        Self::calc_addr_transitions(&mut sub_frames, buf_len);

        let mut data_offsets: heapless::Vec<usize, N> = heapless::Vec::new();
        data_offsets
            .resize(num_bit_planes * Self::num_addrs(), 0)
            .expect("data offset table exceeds capacity N");
        for sf in sub_frames.iter() {
            data_offsets[sf.bit * Self::num_addrs() + sf.addr] = sf.data_offset;
        }

        BufferModel {
            sub_frames,
            data_offsets,
            buf_len,
            min_pulse,
            num_bit_planes,
            _geometry: PhantomData,
        }
    }

    /// Bit-planes interleaved MSB/LSB so long and short OE pulses alternate,
    /// each paired with every row address in ascending order.
    fn allocate_subframes(
        sub_frames: &mut heapless::Vec<SubFrame, N>,
        min_pulse: usize,
        num_bit_planes: usize,
    ) {
        for i in 0..num_bit_planes {
            let bit = if i % 2 == 0 {
                i
            } else {
                (num_bit_planes & !1) - i
            };
            for addr in 0..Self::num_addrs() {
                sub_frames
                    .push(SubFrame {
                        bit,
                        addr,
                        oe_length: min_pulse << bit,
                        data_offset: 0,
                        oe_offset: 0,
                        addr_transition: 0,
                    })
                    .expect("sub-frame table exceeds capacity N");
            }
        }
    }

    /// Lays sub-frames end to end so no two data-shift windows overlap and
    /// an OE window only ever overlaps the following sub-frame's data
    /// window. Returns the total packed length (the cyclic wrap point).
    fn pack_subframes(sub_frames: &mut heapless::Vec<SubFrame, N>) -> usize {
        let data_words = G::DATA_WORDS;
        let mut offset = 0usize;
        for sf in sub_frames.iter_mut() {
            sf.data_offset = offset;
            let data_end = offset + data_words;
            sf.oe_offset = data_end + 1;
            let oe_end = sf.oe_offset + sf.oe_length;
            offset = core::cmp::max(data_end, oe_end - data_words);
        }
        if let Some(first) = sub_frames.first_mut() {
            first.data_offset = 0;
        }
        offset
    }

    /// Places each sub-frame's address-validity start midway between the
    /// previous sub-frame's OE pulse and this one's, on the circular buffer.
    fn calc_addr_transitions(sub_frames: &mut heapless::Vec<SubFrame, N>, buf_len: usize) {
        let len = sub_frames.len();
        if len == 0 {
            return;
        }
        let ends: heapless::Vec<usize, N> = sub_frames
            .iter()
            .map(|sf| sf.oe_offset + sf.oe_length)
            .collect();
        let starts: heapless::Vec<usize, N> = sub_frames.iter().map(|sf| sf.oe_offset).collect();

        let mut transitions: heapless::Vec<usize, N> = heapless::Vec::new();
        transitions.resize(len, 0).expect("unreachable: same capacity as sub_frames");
        for i in 0..len {
            let b = (i + 1) % len;
            let oe_end_a = ends[i];
            let mut oe_start_b = starts[b];
            if oe_start_b < oe_end_a {
                oe_start_b += buf_len;
            }
            transitions[b] = ((oe_end_a + oe_start_b) / 2) % buf_len;
        }
        for (sf, t) in sub_frames.iter_mut().zip(transitions.iter()) {
            sf.addr_transition = *t;
        }
    }

    fn data_offset_for(&self, bit_plane: usize, addr: usize) -> usize {
        self.data_offsets[bit_plane * Self::num_addrs() + addr]
    }

    fn write_cyclic<W: Word>(buf: &mut [W], start: usize, len: usize, mut f: impl FnMut(&mut W)) {
        let buf_len = buf.len();
        for k in 0..len {
            f(&mut buf[(start + k) % buf_len]);
        }
    }

    /// Initializes a freshly allocated word buffer with the static OE/LE/
    /// address waveform. Data bits are left clear (all pixels black) until
    /// [`BufferModel::write_rgb`] sets them.
    pub fn init_buffer<W: Word>(&self, buf: &mut [W]) {
        assert_eq!(buf.len(), self.buf_len, "buffer length must equal buf_len");

        for w in buf.iter_mut() {
            w.set_bit(Self::oe_bit(), true);
        }

        for sf in self.sub_frames.iter() {
            let le_idx = (sf.data_offset + G::DATA_WORDS) % self.buf_len;
            buf[le_idx].set_bit(Self::le_bit(), true);
            Self::write_cyclic(buf, sf.oe_offset, sf.oe_length, |w| {
                w.set_bit(Self::oe_bit(), false)
            });
        }

        let len = self.sub_frames.len();
        for i in 0..len {
            let a = &self.sub_frames[i];
            let b = &self.sub_frames[(i + 1) % len];
            let span = if b.addr_transition >= a.addr_transition {
                b.addr_transition - a.addr_transition
            } else {
                self.buf_len - a.addr_transition + b.addr_transition
            };
            let addr = a.addr;
            Self::write_cyclic(buf, a.addr_transition, span, |w| {
                w.set_bits(Self::addr_bit(0), G::ADDR_BITS, addr)
            });
        }
    }

    /// Sets or clears the bits of one pixel's color channel across every
    /// bit-plane, taking the top `num_bit_planes` bits of `value` (as
    /// presented in a `num_bits_value`-wide quantity).
    pub fn write_color<W: Word>(
        &self,
        buf: &mut [W],
        row: usize,
        col: usize,
        color: usize,
        value: u32,
        num_bits_value: u32,
    ) {
        let addr = G::encode(row, col, color);
        for p in 0..self.num_bit_planes {
            let source_bit = p as i64 + (num_bits_value as i64 - self.num_bit_planes as i64);
            let set = source_bit >= 0 && ((value >> source_bit) & 1) != 0;
            let offset = self.data_offset_for(p, addr.addr) + (G::DATA_WORDS - addr.word);
            let idx = offset % self.buf_len;
            buf[idx].set_bit(Self::data_bit(addr.bit), set);
        }
    }

    /// Writes all three color channels of one pixel.
    pub fn write_rgb<W: Word>(
        &self,
        buf: &mut [W],
        row: usize,
        col: usize,
        r: u32,
        g: u32,
        b: u32,
        num_bits_value: u32,
    ) {
        self.write_color(buf, row, col, 0, r, num_bits_value);
        self.write_color(buf, row, col, 1, g, num_bits_value);
        self.write_color(buf, row, col, 2, b, num_bits_value);
    }

    pub fn sub_frames(&self) -> &[SubFrame] {
        &self.sub_frames
    }
}
