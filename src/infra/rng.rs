use crate::engine::RandomSource;

//
// NATIVE ВАРИАНТ (не wasm32): обёртки над rand.
//
#[cfg(not(target_arch = "wasm32"))]
#[derive(Clone, Debug, Default)]
pub struct SystemRng;

#[cfg(not(target_arch = "wasm32"))]
impl RandomSource for SystemRng {
    fn shuffle<T>(&mut self, slice: &mut [T]) {
        use rand::seq::SliceRandom;
        use rand::thread_rng;

        slice.shuffle(&mut thread_rng());
    }

    fn coin_flip(&mut self) -> bool {
        use rand::Rng;
        rand::thread_rng().gen_bool(0.5)
    }

    fn pick_index(&mut self, len: usize) -> usize {
        use rand::Rng;
        if len == 0 {
            return 0;
        }
        rand::thread_rng().gen_range(0..len)
    }
}

/// Детерминированный RNG для тестов и реплея.
/// Одинаковый seed даёт одинаковые раздачи и одинаковый первый ход.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Clone, Debug)]
pub struct DeterministicRng {
    inner: rand::rngs::StdRng,
}

#[cfg(not(target_arch = "wasm32"))]
impl DeterministicRng {
    pub fn from_seed(seed: u64) -> Self {
        use rand::SeedableRng;
        Self {
            inner: rand::rngs::StdRng::seed_from_u64(seed),
        }
    }

    /// Свой поток для каждого стола: столы не влияют на раздачи друг друга.
    pub fn for_table(seed: u64, table_id: crate::domain::TableId) -> Self {
        Self::from_seed(seed ^ table_id.wrapping_mul(0x9E37_79B9_7F4A_7C15))
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl RandomSource for DeterministicRng {
    fn shuffle<T>(&mut self, slice: &mut [T]) {
        use rand::seq::SliceRandom;
        slice.shuffle(&mut self.inner);
    }

    fn coin_flip(&mut self) -> bool {
        use rand::Rng;
        self.inner.gen_bool(0.5)
    }

    fn pick_index(&mut self, len: usize) -> usize {
        use rand::Rng;
        if len == 0 {
            return 0;
        }
        self.inner.gen_range(0..len)
    }
}

//
// WASM ВАРИАНТ (Linera контракт): тут нет rand / getrandom.
//
#[cfg(target_arch = "wasm32")]
#[derive(Clone, Debug, Default)]
pub struct SystemRng;

#[cfg(target_arch = "wasm32")]
impl RandomSource for SystemRng {
    fn shuffle<T>(&mut self, _slice: &mut [T]) {
        // Заглушка: контракт детерминированный, колода не перемешивается.
    }

    fn coin_flip(&mut self) -> bool {
        true
    }

    fn pick_index(&mut self, _len: usize) -> usize {
        0
    }
}
