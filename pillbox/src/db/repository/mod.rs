mod pills;

pub use pills::PillRepository;
