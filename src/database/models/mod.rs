pub mod document;
pub mod employee;
pub mod lookup;
pub mod operator;
pub mod salary;

pub use document::{Document, PROFILE_PHOTO};
pub use employee::{EmployeeDetails, EmployeePage, EmployeeRecord, EmployeeSummary};
pub use lookup::{LookupItem, Lookups, RegionItem};
pub use operator::Operator;
pub use salary::{SalaryHistoryEntry, SalarySnapshot};
