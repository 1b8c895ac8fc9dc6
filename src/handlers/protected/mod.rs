// handlers/protected/mod.rs - Protected handlers (JWT authentication required)
//
// Every handler here receives the `AuthUser` inserted by `jwt_auth_middleware`
// and passes its region scope down to the services.

pub mod documents;
pub mod employees;
