pub mod identity;
pub mod records;
pub mod supabase;
