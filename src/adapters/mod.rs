pub mod typesense;

pub use typesense::TypesenseClient;
