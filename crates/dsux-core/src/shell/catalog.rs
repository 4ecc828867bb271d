//! Catalog of shell commands.
//!
//! Every command the shell understands is a [`CommandKind`]. The
//! [`CommandCatalog`] holds its metadata (name, aliases, usage line,
//! description) for `help` output, and fuzzy-matches unknown input to
//! suggest what the user probably meant.

use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;

/// Every command name the shell accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    List,
    Tree,
    Touch,
    MakeDir,
    Remove,
    ChangeDir,
    Back,
    Forward,
    Pwd,
    Cat,
    Write,
    Hash,
    Dups,
    Help,
    Exit,
}

/// Metadata for a single command.
#[derive(Debug, Clone)]
pub struct CommandDescriptor {
    pub kind: CommandKind,
    /// Primary name typed at the prompt (e.g. `"mkdir"`).
    pub name: &'static str,
    /// Other accepted names (e.g. `"quit"` for `exit`).
    pub aliases: &'static [&'static str],
    /// Usage line shown by `help` and on missing arguments.
    pub usage: &'static str,
    pub description: &'static str,
}

impl CommandDescriptor {
    fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        std::iter::once(self.name).chain(self.aliases.iter().copied())
    }
}

/// All shell commands, in `help` order.
#[derive(Debug, Clone)]
pub struct CommandCatalog {
    descriptors: Vec<CommandDescriptor>,
}

impl CommandCatalog {
    pub fn new() -> Self {
        let descriptors = vec![
            CommandDescriptor {
                kind: CommandKind::List,
                name: "ls",
                aliases: &[],
                usage: "ls [path] [-r]",
                description: "List a directory (-r lists recursively)",
            },
            CommandDescriptor {
                kind: CommandKind::Tree,
                name: "tree",
                aliases: &[],
                usage: "tree [path]",
                description: "List everything below a directory",
            },
            CommandDescriptor {
                kind: CommandKind::Touch,
                name: "touch",
                aliases: &[],
                usage: "touch <path>",
                description: "Create an empty file",
            },
            CommandDescriptor {
                kind: CommandKind::MakeDir,
                name: "mkdir",
                aliases: &[],
                usage: "mkdir <path>",
                description: "Create a directory and any missing parents",
            },
            CommandDescriptor {
                kind: CommandKind::Remove,
                name: "rm",
                aliases: &[],
                usage: "rm <path>",
                description: "Delete a file or a directory with its contents",
            },
            CommandDescriptor {
                kind: CommandKind::ChangeDir,
                name: "cd",
                aliases: &[],
                usage: "cd [path]",
                description: "Change the working directory",
            },
            CommandDescriptor {
                kind: CommandKind::Back,
                name: "back",
                aliases: &[],
                usage: "back",
                description: "Return to the previous directory",
            },
            CommandDescriptor {
                kind: CommandKind::Forward,
                name: "forward",
                aliases: &[],
                usage: "forward",
                description: "Undo the last back",
            },
            CommandDescriptor {
                kind: CommandKind::Pwd,
                name: "pwd",
                aliases: &[],
                usage: "pwd",
                description: "Print the working directory",
            },
            CommandDescriptor {
                kind: CommandKind::Cat,
                name: "cat",
                aliases: &[],
                usage: "cat <path>",
                description: "Print a file's content",
            },
            CommandDescriptor {
                kind: CommandKind::Write,
                name: "write",
                aliases: &[],
                usage: "write <path> <text...>",
                description: "Replace a file's content with text",
            },
            CommandDescriptor {
                kind: CommandKind::Hash,
                name: "hash",
                aliases: &[],
                usage: "hash <path>",
                description: "Print a file's SHA-256 digest",
            },
            CommandDescriptor {
                kind: CommandKind::Dups,
                name: "dups",
                aliases: &[],
                usage: "dups [path] [--json] [--all]",
                description: "Find files with identical content",
            },
            CommandDescriptor {
                kind: CommandKind::Help,
                name: "help",
                aliases: &[],
                usage: "help",
                description: "Show this list",
            },
            CommandDescriptor {
                kind: CommandKind::Exit,
                name: "exit",
                aliases: &["quit"],
                usage: "exit",
                description: "Leave the shell",
            },
        ];
        Self { descriptors }
    }

    /// Returns every descriptor.
    pub fn all(&self) -> &[CommandDescriptor] {
        &self.descriptors
    }

    /// Finds the command typed as `name` (primary name or alias).
    pub fn lookup(&self, name: &str) -> Option<&CommandDescriptor> {
        self.descriptors
            .iter()
            .find(|d| d.names().any(|n| n == name))
    }

    pub fn descriptor_for(&self, kind: CommandKind) -> Option<&CommandDescriptor> {
        self.descriptors.iter().find(|d| d.kind == kind)
    }

    /// Usage line for `kind`.
    pub fn usage(&self, kind: CommandKind) -> &'static str {
        self.descriptor_for(kind).map_or("", |d| d.usage)
    }

    /// Fuzzy-searches commands by name, alias and description. Best match
    /// first; an empty query returns everything.
    ///
    /// Names are matched in both directions so that a typo with an extra
    /// character (`lss`) still finds the shorter name (`ls`).
    pub fn fuzzy_search(&self, query: &str) -> Vec<&CommandDescriptor> {
        if query.is_empty() {
            return self.descriptors.iter().collect();
        }
        let matcher = SkimMatcherV2::default();
        let mut scored: Vec<(i64, &CommandDescriptor)> = self
            .descriptors
            .iter()
            .filter_map(|d| {
                let name_score = d
                    .names()
                    .map(|n| {
                        let forward = matcher.fuzzy_match(n, query).unwrap_or(0);
                        let reverse = matcher.fuzzy_match(query, n).unwrap_or(0);
                        forward.max(reverse)
                    })
                    .max()
                    .unwrap_or(0);
                let desc_score = matcher.fuzzy_match(d.description, query).unwrap_or(0);
                let best = name_score.max(desc_score);
                (best > 0).then_some((best, d))
            })
            .collect();
        scored.sort_by(|a, b| b.0.cmp(&a.0));
        scored.into_iter().map(|(_, d)| d).collect()
    }

    /// Up to `limit` command names resembling `query`.
    pub fn suggestions(&self, query: &str, limit: usize) -> Vec<&'static str> {
        if query.is_empty() {
            return Vec::new();
        }
        self.fuzzy_search(query)
            .into_iter()
            .take(limit)
            .map(|d| d.name)
            .collect()
    }
}

impl Default for CommandCatalog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_contains_every_kind() {
        let catalog = CommandCatalog::new();
        assert_eq!(catalog.all().len(), 15);
        for kind in [
            CommandKind::List,
            CommandKind::Dups,
            CommandKind::Exit,
            CommandKind::Write,
        ] {
            assert!(catalog.descriptor_for(kind).is_some());
        }
    }

    #[test]
    fn lookup_by_name_and_alias() {
        let catalog = CommandCatalog::new();
        assert_eq!(catalog.lookup("mkdir").unwrap().kind, CommandKind::MakeDir);
        assert_eq!(catalog.lookup("quit").unwrap().kind, CommandKind::Exit);
        assert_eq!(catalog.lookup("exit").unwrap().kind, CommandKind::Exit);
        assert!(catalog.lookup("rmdir").is_none());
    }

    #[test]
    fn usage_lines() {
        let catalog = CommandCatalog::new();
        assert_eq!(catalog.usage(CommandKind::Write), "write <path> <text...>");
        assert_eq!(catalog.usage(CommandKind::Touch), "touch <path>");
    }

    #[test]
    fn fuzzy_search_empty_query_returns_all() {
        let catalog = CommandCatalog::new();
        assert_eq!(catalog.fuzzy_search("").len(), catalog.all().len());
    }

    #[test]
    fn suggestions_for_missing_letter() {
        let catalog = CommandCatalog::new();
        let suggestions = catalog.suggestions("mkdr", 3);
        assert_eq!(suggestions.first(), Some(&"mkdir"));
    }

    #[test]
    fn suggestions_for_extra_letter() {
        let catalog = CommandCatalog::new();
        assert!(catalog.suggestions("lss", 3).contains(&"ls"));
    }

    #[test]
    fn suggestions_respect_limit() {
        let catalog = CommandCatalog::new();
        assert!(catalog.suggestions("e", 2).len() <= 2);
        assert!(catalog.suggestions("", 2).is_empty());
    }

    #[test]
    fn no_suggestions_for_gibberish() {
        let catalog = CommandCatalog::new();
        assert!(catalog.suggestions("xyzxyzxyz", 3).is_empty());
    }
}
