//! Seeded randomness for network generation and passenger spawning.
//!
//! `SimRng` is the only randomness source in the core. Seeding it from the
//! session config makes a whole game reproducible: the same seed and the same
//! commands yield the same network, the same passengers and the same rewards.

use bevy::prelude::*;
use bitcode::{Decode, Encode};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

const DEFAULT_SEED: u64 = 0x7261_696c;

/// Full `ChaCha8Rng` state, enough to resume the exact stream after a load.
#[derive(Encode, Decode)]
struct StreamState {
    seed: [u8; 32],
    stream: u64,
    word_pos: u128,
}

impl From<&ChaCha8Rng> for StreamState {
    fn from(rng: &ChaCha8Rng) -> Self {
        Self {
            seed: rng.get_seed(),
            stream: rng.get_stream(),
            word_pos: rng.get_word_pos(),
        }
    }
}

impl StreamState {
    fn resume(&self) -> ChaCha8Rng {
        let mut rng = ChaCha8Rng::from_seed(self.seed);
        rng.set_stream(self.stream);
        rng.set_word_pos(self.word_pos);
        rng
    }
}

#[derive(Resource)]
pub struct SimRng(pub ChaCha8Rng);

impl Default for SimRng {
    fn default() -> Self {
        Self::from_seed_u64(DEFAULT_SEED)
    }
}

impl SimRng {
    pub fn from_seed_u64(seed: u64) -> Self {
        Self(ChaCha8Rng::seed_from_u64(seed))
    }

    /// Restart the stream from `seed`.
    pub fn reseed(&mut self, seed: u64) {
        self.0 = ChaCha8Rng::seed_from_u64(seed);
    }
}

impl crate::Saveable for SimRng {
    const SAVE_KEY: &'static str = "sim_rng";

    fn save_to_bytes(&self) -> Option<Vec<u8>> {
        Some(bitcode::encode(&StreamState::from(&self.0)))
    }

    fn load_from_bytes(bytes: &[u8]) -> Self {
        match bitcode::decode::<StreamState>(bytes) {
            Ok(state) => Self(state.resume()),
            Err(e) => {
                warn!("SimRng: undecodable stream state, reseeding with default: {}", e);
                Self::default()
            }
        }
    }
}

pub struct SimRngPlugin;

impl Plugin for SimRngPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SimRng>();
        app.init_resource::<crate::SaveableRegistry>();
        app.world_mut()
            .resource_mut::<crate::SaveableRegistry>()
            .register::<SimRng>();
    }
}
