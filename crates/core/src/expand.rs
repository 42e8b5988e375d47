//! Turns caller-supplied category/command names into a validated plan.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::registry::{Category, Command, CommandRegistry, WILDCARD};

/// Raw request as supplied by the caller. Either list may contain [`WILDCARD`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionRequest {
	pub categories: Vec<String>,
	/// Empty means "run each category's default command".
	#[serde(default)]
	pub commands: Vec<String>,
}

impl ExecutionRequest {
	pub fn new<C, M>(categories: C, commands: M) -> Self
	where
		C: IntoIterator,
		C::Item: Into<String>,
		M: IntoIterator,
		M::Item: Into<String>,
	{
		Self {
			categories: categories.into_iter().map(Into::into).collect(),
			commands: commands.into_iter().map(Into::into).collect(),
		}
	}
}

/// One category and the commands to run against its resource, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanStep {
	pub category: Category,
	pub commands: Vec<Command>,
}

/// Fully validated work. Construction goes through [`expand`] only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionPlan {
	steps: Vec<PlanStep>,
}

impl ExecutionPlan {
	pub fn steps(&self) -> &[PlanStep] {
		&self.steps
	}

	pub fn categories(&self) -> impl Iterator<Item = Category> + '_ {
		self.steps.iter().map(|step| step.category)
	}

	/// Total number of commands across all categories.
	pub fn len(&self) -> usize {
		self.steps.iter().map(|step| step.commands.len()).sum()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

/// Expands wildcards and validates every name against `registry`.
///
/// Nothing is executed here, so an invalid name anywhere in the request fails
/// the whole request before any controller traffic. Repeated names run once,
/// at their first position.
pub fn expand(registry: &CommandRegistry, request: &ExecutionRequest) -> Result<ExecutionPlan> {
	let categories = expand_categories(registry, &request.categories)?;

	let mut steps = Vec::with_capacity(categories.len());
	for category in categories {
		let commands = expand_commands(registry, category, &request.commands)?;
		steps.push(PlanStep { category, commands });
	}

	Ok(ExecutionPlan { steps })
}

fn expand_categories(registry: &CommandRegistry, raw: &[String]) -> Result<Vec<Category>> {
	if raw.is_empty() {
		return Err(Error::InvalidInput("at least one category is required".into()));
	}

	if raw.iter().any(|name| name == WILDCARD) {
		return Ok(registry.categories().collect());
	}

	let mut categories = Vec::with_capacity(raw.len());
	for name in raw {
		let category = registry
			.category(name)
			.ok_or_else(|| Error::InvalidCategory(name.clone()))?;
		push_unique(&mut categories, category);
	}
	Ok(categories)
}

fn expand_commands(registry: &CommandRegistry, category: Category, raw: &[String]) -> Result<Vec<Command>> {
	if raw.is_empty() {
		let default = registry
			.default_command_of(category)
			.ok_or_else(|| Error::InvalidCategory(category.to_string()))?;
		return Ok(vec![default]);
	}

	if raw.iter().any(|name| name == WILDCARD) {
		return Ok(registry.commands_of(category).to_vec());
	}

	let mut commands = Vec::with_capacity(raw.len());
	for name in raw {
		let command = registry.command(category, name).ok_or_else(|| Error::InvalidCommand {
			category,
			command: name.clone(),
		})?;
		push_unique(&mut commands, command);
	}
	Ok(commands)
}

fn push_unique<T: PartialEq>(items: &mut Vec<T>, item: T) {
	if !items.contains(&item) {
		items.push(item);
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn plan(categories: &[&str], commands: &[&str]) -> Result<ExecutionPlan> {
		expand(
			&CommandRegistry::builtin(),
			&ExecutionRequest::new(categories.iter().copied(), commands.iter().copied()),
		)
	}

	#[test]
	fn wildcard_category_yields_registry_set_regardless_of_order_or_duplicates() {
		let registry = CommandRegistry::builtin();
		let expected: Vec<Category> = registry.categories().collect();

		for categories in [
			vec!["all"],
			vec!["Manager", "all"],
			vec!["all", "all", "Systems"],
			vec!["Bogus", "all"],
		] {
			let plan = plan(&categories, &[]).unwrap();
			assert_eq!(plan.categories().collect::<Vec<_>>(), expected, "input {categories:?}");
		}
	}

	#[test]
	fn no_commands_uses_each_category_default() {
		let plan = plan(&["all"], &[]).unwrap();
		assert_eq!(
			plan.steps(),
			&[
				PlanStep {
					category: Category::Systems,
					commands: vec![Command::WaitForRebootCompletion],
				},
				PlanStep {
					category: Category::Manager,
					commands: vec![Command::GetBackupFiles],
				},
			]
		);
		assert_eq!(plan.len(), 2);
	}

	#[test]
	fn wildcard_command_is_expanded_per_category() {
		let plan = plan(&["Systems", "Manager"], &["all"]).unwrap();
		assert_eq!(
			plan.steps()[0].commands,
			vec![Command::WaitForRebootCompletion, Command::CheckUserPrivileges]
		);
		assert_eq!(plan.steps()[1].commands.len(), 6);
		assert_eq!(plan.steps()[1].commands[0], Command::FactoryReset);
	}

	#[test]
	fn literal_order_is_preserved() {
		let plan = plan(&["Manager"], &["GetHostName", "iLOBackup", "GetiLOBackupFiles"]).unwrap();
		assert_eq!(
			plan.steps()[0].commands,
			vec![Command::GetHostName, Command::CreateBackup, Command::GetBackupFiles]
		);
	}

	#[test]
	fn duplicates_run_once_at_first_position() {
		let plan = plan(&["Manager", "Manager"], &["GetHostName", "iLOBackup", "GetHostName"]).unwrap();
		assert_eq!(plan.steps().len(), 1);
		assert_eq!(plan.steps()[0].commands, vec![Command::GetHostName, Command::CreateBackup]);
	}

	#[test]
	fn unknown_category_fails() {
		let err = plan(&["Systems", "Chassis"], &[]).unwrap_err();
		assert!(matches!(err, Error::InvalidCategory(ref name) if name == "Chassis"));
		assert_eq!(err.to_string(), "Invalid Category: Chassis");
	}

	#[test]
	fn command_legal_elsewhere_is_still_invalid_here() {
		let err = plan(&["Systems"], &["GetHostName"]).unwrap_err();
		match err {
			Error::InvalidCommand { category, command } => {
				assert_eq!(category, Category::Systems);
				assert_eq!(command, "GetHostName");
			}
			other => panic!("expected InvalidCommand, got {other:?}"),
		}
	}

	#[test]
	fn mixed_commands_fail_for_the_category_that_lacks_one() {
		let err = plan(&["Systems", "Manager"], &["CheckUserPrivileges"]).unwrap_err();
		assert!(matches!(
			err,
			Error::InvalidCommand {
				category: Category::Manager,
				..
			}
		));
	}

	#[test]
	fn validity_follows_the_registry_table() {
		let registry = CommandRegistry::new(vec![
			(Category::Systems, vec![Command::GetHostName], Command::GetHostName),
			(Category::Manager, vec![Command::GetBackupFiles], Command::GetBackupFiles),
		])
		.unwrap();

		let request = ExecutionRequest::new(["Systems"], ["GetHostName"]);
		assert!(expand(&registry, &request).is_ok());

		let request = ExecutionRequest::new(["Manager"], ["GetHostName"]);
		assert!(matches!(expand(&registry, &request), Err(Error::InvalidCommand { .. })));
	}

	#[test]
	fn empty_category_list_is_rejected() {
		assert!(matches!(plan(&[], &["all"]), Err(Error::InvalidInput(_))));
	}
}
