pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod matching;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::Arc;

use crate::matching::llm::CompletionModel;
use crate::matching::store::MatchStore;
use crate::services::{
    audit_service::AuditService, candidate_service::CandidateService,
    llm_service::OpenAiService, match_store::PgMatchStore, role_service::RoleService,
};
use reqwest::Client;
use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub role_service: RoleService,
    pub candidate_service: CandidateService,
    pub audit_service: AuditService,
    pub llm: Arc<dyn CompletionModel>,
    pub match_store: Arc<dyn MatchStore>,
}

impl AppState {
    pub fn new(pool: PgPool) -> Self {
        let config = crate::config::get_config();
        let http_client = Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .unwrap();

        let role_service = RoleService::new(pool.clone());
        let candidate_service = CandidateService::new(pool.clone());
        let audit_service = AuditService::new(config.match_audit_dir.clone());
        let llm: Arc<dyn CompletionModel> = Arc::new(OpenAiService::new(
            config.openai_api_key.clone(),
            config.openai_model.clone(),
            http_client,
        ));
        let match_store: Arc<dyn MatchStore> = Arc::new(PgMatchStore::new(pool.clone()));

        Self {
            pool,
            role_service,
            candidate_service,
            audit_service,
            llm,
            match_store,
        }
    }
}
