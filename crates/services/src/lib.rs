//! asb-services: the service module families.
//!
//! Each family implements the engine's [`Module`](asb_engine::Module) and
//! [`ServiceManager`](asb_engine::ServiceManager) contracts for one managed
//! data service:
//!
//! - [`mssql`] -- Azure SQL Database (all-in-one, DBMS-only, database-only,
//!   registered, and from-existing variants)
//! - [`mssqlfg`] -- Azure SQL failover-group pairs (disaster recovery)
//! - [`mysql`] -- Azure Database for MySQL
//! - [`postgresql`] -- Azure Database for PostgreSQL
//!
//! The families differ only in which steps they wire and which validation
//! calls they make; the pipeline engine and the data model are shared.

mod common;

pub mod mssql;
pub mod mssqlfg;
pub mod mysql;
pub mod postgresql;
