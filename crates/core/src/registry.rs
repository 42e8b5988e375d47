//! Static table of legal categories and commands.
//!
//! The table is built once (normally [`CommandRegistry::builtin`]) and handed
//! to the expander and dispatcher by reference; nothing here is global.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Wildcard accepted in both the category and the command list.
pub const WILDCARD: &str = "all";

/// A group of commands bound to one controller resource type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
	Systems,
	Manager,
}

impl Category {
	pub const fn as_str(self) -> &'static str {
		match self {
			Category::Systems => "Systems",
			Category::Manager => "Manager",
		}
	}

	/// Name of the service-root link that leads to this category's collection.
	pub const fn collection(self) -> &'static str {
		match self {
			Category::Systems => "Systems",
			Category::Manager => "Managers",
		}
	}
}

impl fmt::Display for Category {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// A named operation. Each variant maps to exactly one handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Command {
	WaitForRebootCompletion,
	CheckUserPrivileges,
	FactoryReset,
	DeleteBackupFiles,
	CreateBackup,
	RestoreBackup,
	GetBackupFiles,
	GetHostName,
}

impl Command {
	pub const ALL: [Command; 8] = [
		Command::WaitForRebootCompletion,
		Command::CheckUserPrivileges,
		Command::FactoryReset,
		Command::DeleteBackupFiles,
		Command::CreateBackup,
		Command::RestoreBackup,
		Command::GetBackupFiles,
		Command::GetHostName,
	];

	/// The name callers use and the report is keyed by.
	pub const fn name(self) -> &'static str {
		match self {
			Command::WaitForRebootCompletion => "WaitforiLORebootCompletion",
			Command::CheckUserPrivileges => "CheckUserPrivileges",
			Command::FactoryReset => "iLOFactoryReset",
			Command::DeleteBackupFiles => "DeleteiLOBackupFiles",
			Command::CreateBackup => "iLOBackup",
			Command::RestoreBackup => "iLORestore",
			Command::GetBackupFiles => "GetiLOBackupFiles",
			Command::GetHostName => "GetHostName",
		}
	}

	pub fn from_name(name: &str) -> Option<Command> {
		Command::ALL.into_iter().find(|cmd| cmd.name() == name)
	}
}

impl fmt::Display for Command {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}

#[derive(Debug, Clone)]
struct CategoryEntry {
	category: Category,
	commands: Vec<Command>,
	default: Command,
}

/// Immutable category -> commands table with a default command per category.
#[derive(Debug, Clone)]
pub struct CommandRegistry {
	entries: Vec<CategoryEntry>,
}

impl CommandRegistry {
	/// Builds a registry from `(category, legal commands, default command)` rows.
	///
	/// Row order is the order used when a wildcard is expanded.
	pub fn new(rows: Vec<(Category, Vec<Command>, Command)>) -> Result<Self> {
		let mut entries: Vec<CategoryEntry> = Vec::with_capacity(rows.len());
		for (category, commands, default) in rows {
			if entries.iter().any(|entry| entry.category == category) {
				return Err(Error::InvalidInput(format!("category {category} registered twice")));
			}
			if !commands.contains(&default) {
				return Err(Error::InvalidInput(format!(
					"default command {default} is not legal in category {category}"
				)));
			}
			entries.push(CategoryEntry {
				category,
				commands,
				default,
			});
		}
		Ok(Self { entries })
	}

	/// The iLO management table.
	pub fn builtin() -> Self {
		Self {
			entries: vec![
				CategoryEntry {
					category: Category::Systems,
					commands: vec![Command::WaitForRebootCompletion, Command::CheckUserPrivileges],
					default: Command::WaitForRebootCompletion,
				},
				CategoryEntry {
					category: Category::Manager,
					commands: vec![
						Command::FactoryReset,
						Command::DeleteBackupFiles,
						Command::CreateBackup,
						Command::RestoreBackup,
						Command::GetBackupFiles,
						Command::GetHostName,
					],
					default: Command::GetBackupFiles,
				},
			],
		}
	}

	pub fn categories(&self) -> impl Iterator<Item = Category> + '_ {
		self.entries.iter().map(|entry| entry.category)
	}

	/// Looks up a category by its exact name.
	pub fn category(&self, name: &str) -> Option<Category> {
		self.categories().find(|category| category.as_str() == name)
	}

	pub fn is_valid_category(&self, name: &str) -> bool {
		self.category(name).is_some()
	}

	/// Legal commands of `category`, empty if the category is not registered.
	pub fn commands_of(&self, category: Category) -> &[Command] {
		self.entry(category).map(|entry| entry.commands.as_slice()).unwrap_or(&[])
	}

	pub fn default_command_of(&self, category: Category) -> Option<Command> {
		self.entry(category).map(|entry| entry.default)
	}

	/// Looks up `name` among the commands legal in `category` only.
	pub fn command(&self, category: Category, name: &str) -> Option<Command> {
		self.commands_of(category).iter().copied().find(|cmd| cmd.name() == name)
	}

	fn entry(&self, category: Category) -> Option<&CategoryEntry> {
		self.entries.iter().find(|entry| entry.category == category)
	}
}

impl Default for CommandRegistry {
	fn default() -> Self {
		Self::builtin()
	}
}
