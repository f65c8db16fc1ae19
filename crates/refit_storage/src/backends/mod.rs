pub mod laravel;
pub mod memory;

pub use laravel::LaravelApi;
pub use memory::InMemoryContentApi;
