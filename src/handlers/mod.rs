// handlers/mod.rs - Two-tier handler layout
//
// Public (no auth) → Protected (bearer JWT scoped to the operator's region)
pub mod public; // Tier 1: /, /health, /api/login
pub mod protected; // Tier 2: /api/employees/*, /api/employee/*
