pub mod error;
pub mod supabase;

pub use error::StoreError;
