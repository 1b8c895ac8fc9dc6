pub mod auth_service;
pub mod document_service;
pub mod employee_query;
pub mod employee_service;
pub mod salary;

pub use auth_service::{AuthError, AuthService, LoginResult};
pub use document_service::{DocumentDeletion, DocumentError, DocumentService, UploadFile, UploadedDocument};
pub use employee_query::EmployeeQuery;
pub use employee_service::{EmployeeError, EmployeeInput, EmployeeService};
