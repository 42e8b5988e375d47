//! Wire types for the Redfish resources exposed by HPE iLO controllers.
//!
//! Only the fields that `ilo-manage` reads or writes are modelled; every
//! struct ignores unknown fields so newer firmware payloads keep parsing.
//!
//! # Main Types
//!
//! - [`ODataLink`] and [`Collection`] - navigation between resources
//! - [`ServiceRoot`], [`ComputerSystem`], [`Manager`] - resolution targets
//! - [`ManagerAccount`], [`Role`], [`Session`] - privilege inspection
//! - [`BackupRestoreService`], [`BackupFile`] - backup file lifecycle
//! - [`ErrorResponse`] - controller error bodies with extended info

mod error;
mod odata;
mod resources;

pub use error::{ErrorBody, ErrorResponse, MessageInfo};
pub use odata::{ActionTarget, Collection, ODataLink};
pub use resources::{
	AccountLinks, AccountOem, AccountService, BACKUP_ACTION, BackupFile, BackupRestoreService,
	ComputerSystem, EthernetInterface, FACTORY_RESET_ACTION, HpeAccount, HpeManager, HpeManagerLinks,
	HpeSession, HpeSystem, Manager, ManagerAccount, ManagerOem, RESTORE_ACTION, Role, ServiceRoot,
	Session, SessionOem, SessionService, SystemOem,
};
