pub mod http_generator;
pub mod mappers;

pub use http_generator::HttpRecipeGenerator;
