pub mod aggregation_service;
pub mod home_service;
pub mod ledger_service;
pub mod quote_service;
pub mod report_service;
