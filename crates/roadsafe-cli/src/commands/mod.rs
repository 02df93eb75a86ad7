pub mod debts;
pub mod init;
pub mod owed;
pub mod status;
