pub mod audit_service;
pub mod candidate_service;
pub mod employee_service;
pub mod llm_service;
pub mod match_store;
pub mod role_service;
