pub mod allele;
pub mod read;
pub mod region;
pub mod variant;

pub use allele::Allele;
pub use read::Read;
pub use region::Region;
pub use variant::Variant;
