mod packed_symmetric;

pub use packed_symmetric::PackedSymmetricMatrix;
