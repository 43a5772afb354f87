//! deterministic random streams & the per‑chunk position hash
//!
//! Nothing here touches global state: a chunk's layout is a pure function of
//! `(chunk_x, chunk_z, level_seed)`.

/* ===========================================================
   seeded stream (mulberry32)
   =========================================================== */
/// Restartable 32‑bit generator; the same seed always replays the same
/// sequence.
#[derive(Clone, Debug)]
pub struct SeededStream {
    state: u32,
}

impl SeededStream {
    pub fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    /// raw 32‑bit output; advances the stream by one step
    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_add(0x6D2B_79F5);
        let a = self.state;
        let mut t = (a ^ (a >> 15)).wrapping_mul(1 | a);
        t ^= t.wrapping_add((t ^ (t >> 7)).wrapping_mul(61 | t));
        t ^ (t >> 14)
    }

    /// uniform float in `[0, 1)`
    pub fn next_f64(&mut self) -> f64 {
        self.next_u32() as f64 / 4_294_967_296.0
    }

    /// `true` with probability `p`
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }
}

/// Uniform integer over the inclusive range `min..=max`.
pub fn rand_int(stream: &mut SeededStream, min: i32, max: i32) -> i32 {
    let span = (max as i64 - min as i64 + 1) as f64;
    (stream.next_f64() * span).floor() as i32 + min
}

/* ===========================================================
   position hash
   =========================================================== */
#[inline]
fn avalanche(mut h: u32) -> u32 {
    h ^= h >> 16;
    h = h.wrapping_mul(0x7feb_352d);
    h ^= h >> 15;
    h = h.wrapping_mul(0x846c_a68b);
    h ^ (h >> 16)
}

/// Per‑chunk seed. Each axis is folded in through a bijective mix, so for a
/// fixed `level_seed` two chunks in the same column or row never collide.
pub fn position_hash(chunk_x: i32, chunk_z: i32, level_seed: u32) -> u32 {
    let h = avalanche(level_seed ^ (chunk_x as u32).wrapping_mul(374_761_393));
    avalanche(h ^ (chunk_z as u32).wrapping_mul(668_265_263))
}
