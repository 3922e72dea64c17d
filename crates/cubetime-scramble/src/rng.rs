//! Move picker randomness.
//!
//! SplitMix64: one word of state, identical output on every platform, so a
//! seed pins down every scramble a generator will ever produce.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveRng {
    state: u64,
}

impl MoveRng {
    const GAMMA: u64 = 0x9E37_79B9_7F4A_7C15;

    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    pub fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(Self::GAMMA);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Uniform in `0..n`; 0 when `n` is 0.
    pub fn below(&mut self, n: usize) -> usize {
        match n {
            0 => 0,
            n => ((u128::from(self.next_u64()) * n as u128) >> 64) as usize,
        }
    }

    /// Fair coin from the top bit.
    pub fn coin(&mut self) -> bool {
        self.next_u64() & (1 << 63) != 0
    }
}
