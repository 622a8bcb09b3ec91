pub mod whoogle;

pub use whoogle::WhoogleProvider;
