use crate::infra::identity::SupabaseIdentityService;
use crate::infra::records::SupabaseRecordStore;
use crate::infra::supabase::SupabaseClient;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    /// Service-role handle: admin identity calls and table access.
    pub admin: SupabaseClient,
    /// Public-key handle: end-user sign-in.
    pub public: SupabaseClient,
}

impl AppState {
    pub fn identity_service(&self) -> SupabaseIdentityService {
        SupabaseIdentityService {
            admin: self.admin.clone(),
            public: self.public.clone(),
        }
    }

    pub fn record_store(&self) -> SupabaseRecordStore {
        SupabaseRecordStore {
            client: self.admin.clone(),
        }
    }
}
