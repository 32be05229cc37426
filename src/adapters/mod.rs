// Adapters layer: concrete implementations of the domain ports for external systems.

pub mod csv_catalog;
pub mod memory;
pub mod mistral;
pub mod supabase;

pub use csv_catalog::CsvCatalog;
pub use memory::{AnonymousIdentity, InMemoryUsageLedger, StaticIdentity};
pub use mistral::{MistralNotes, MistralSettings};
pub use supabase::SupabaseClient;
