pub mod dto;

pub use dto::BackorderLine;
