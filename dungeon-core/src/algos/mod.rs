mod map_generator;

pub use map_generator::{
    GenerationConfig, GenerationObserver, GenerationReport, MapGenerator, ProgressHandle,
};

pub(crate) type GeneratorRng = rand_xoshiro::Xoshiro256Plus;

pub(crate) struct RngHandler;

impl RngHandler {
    // Every generation run starts from a fresh engine so that the seed and
    // the configuration fully determine the output.
    pub fn seeded(seed: u64) -> GeneratorRng {
        use rand::SeedableRng;

        GeneratorRng::seed_from_u64(seed)
    }
}
