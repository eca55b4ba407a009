// 轉接層：領域埠介面對外部系統的實作

pub mod supabase;

pub use supabase::SupabaseClient;
