pub mod memory_page;

pub use memory_page::MemoryPage;
