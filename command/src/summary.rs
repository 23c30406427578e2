//! Serializable help data.
//!
//! Rendering help text is left to the embedding application; the
//! dispatcher hands back a [`CommandSummary`] when `--help` is requested.

use cmdtree_core::{FlagInfo, FlagSet};
use serde::Serialize;

use crate::tree::{CommandTree, NodeId};

/// Everything a help renderer needs to describe one command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandSummary {
    /// Routing names from the root.
    pub path: Vec<String>,
    /// Name including usage syntax, e.g. `create [-d dest] file...`.
    pub name: String,
    pub usage: String,
    pub description: String,
    pub aliases: Vec<String>,
    pub version: Option<String>,
    /// Children sorted by name.
    pub subcommands: Vec<SubcommandSummary>,
    /// The command's own flags.
    pub flags: Vec<FlagInfo>,
    /// Persistent flags visible here, declared on this command or inherited.
    pub persistent_flags: Vec<FlagInfo>,
}

/// One line of a subcommand listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubcommandSummary {
    pub name: String,
    pub aliases: Vec<String>,
    pub usage: String,
}

impl CommandTree {
    /// Collects help data for the command at `id`.
    pub fn summary(&self, id: NodeId) -> CommandSummary {
        let command = self.command(id);

        let mut subcommands: Vec<_> = self
            .children(id)
            .iter()
            .map(|child| {
                let child = self.command(*child);
                SubcommandSummary {
                    name: child.name().to_string(),
                    aliases: child.aliases().to_vec(),
                    usage: child.usage.clone(),
                }
            })
            .collect();
        subcommands.sort_by(|a, b| a.name.cmp(&b.name));

        let mut persistent = FlagSet::new();
        for level in self.lineage(id) {
            persistent.merge(&self.command(level).persistent_flags);
        }

        CommandSummary {
            path: self.path(id),
            name: command.full_name().to_string(),
            usage: command.usage.clone(),
            description: command.description.clone(),
            aliases: command.aliases().to_vec(),
            version: self.version(id).map(str::to_string),
            subcommands,
            flags: command.flags.describe(),
            persistent_flags: persistent.describe(),
        }
    }
}

#[cfg(test)]
mod tests {
    use cmdtree_core::Flag;

    use super::*;
    use crate::command::Command;

    #[test]
    fn test_summary_collects_inherited_flags() {
        let tree = CommandTree::new(
            Command::new("app")
                .version("0.3.1")
                .persistent_flag(Flag::new("verbose", false, "chatty output").short('v'))
                .subcommand(
                    Command::new("deploy <env>")
                        .usage("deploy the service")
                        .alias("d")
                        .flag(Flag::new("dry-run", false, "print the plan only"))
                        .subcommand(Command::new("status").usage("show rollout"))
                        .subcommand(Command::new("abort").alias("cancel")),
                ),
        )
        .unwrap();

        let deploy = tree.find(&["deploy"]).unwrap();
        let summary = tree.summary(deploy);

        assert_eq!(summary.path, vec!["app", "deploy"]);
        assert_eq!(summary.name, "deploy <env>");
        assert_eq!(summary.version.as_deref(), Some("0.3.1"));
        assert_eq!(summary.aliases, vec!["d"]);
        let names: Vec<_> = summary.subcommands.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["abort", "status"]);
        assert_eq!(summary.subcommands[0].aliases, vec!["cancel"]);
        assert_eq!(summary.flags.len(), 1);
        assert_eq!(summary.flags[0].name, "dry-run");
        assert_eq!(summary.persistent_flags.len(), 1);
        assert_eq!(summary.persistent_flags[0].short, Some('v'));
    }

    #[test]
    fn test_summary_serializes() {
        let tree = CommandTree::new(Command::new("app").usage("does things")).unwrap();
        let json = serde_json::to_value(tree.summary(crate::tree::ROOT)).unwrap();
        assert_eq!(json["usage"], "does things");
        assert_eq!(json["version"], serde_json::Value::Null);
    }
}
