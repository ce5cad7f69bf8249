pub mod generator;
pub mod init;
