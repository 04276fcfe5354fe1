//! Command registry: Arabic-primary names, a closed set of English
//! aliases, and the per-command parameter descriptor tables that replace
//! runtime reflection.

use std::collections::HashMap;

use tracing::debug;

use crate::command::CommandHandler;
use crate::commands;
use crate::value::ParamType;

/// Declared parameter: how binding finds it and what it converts to.
#[derive(Debug, Clone)]
pub struct ParameterSpec {
    /// English name; binding and storage key.
    pub name: &'static str,
    /// Arabic alias, matched before the English name.
    pub arabic: Option<&'static str>,
    /// Positional index among unbound arguments, if bindable by position.
    pub position: Option<usize>,
    pub mandatory: bool,
    /// Switch parameters accept no value (or an explicit true/false).
    pub switch: bool,
    pub ty: ParamType,
    /// Bind the whole pipeline input object to this parameter.
    pub from_pipeline: bool,
    /// Bind the input object's property of the same name.
    pub from_pipeline_by_name: bool,
}

impl ParameterSpec {
    pub fn new(name: &'static str, arabic: Option<&'static str>, ty: ParamType) -> Self {
        ParameterSpec {
            name,
            arabic,
            position: None,
            mandatory: false,
            switch: false,
            ty,
            from_pipeline: false,
            from_pipeline_by_name: false,
        }
    }

    pub fn at_position(mut self, position: usize) -> Self {
        self.position = Some(position);
        self
    }

    pub fn mandatory(mut self) -> Self {
        self.mandatory = true;
        self
    }

    pub fn switch(mut self) -> Self {
        self.switch = true;
        self.ty = ParamType::Bool;
        self
    }

    pub fn from_pipeline(mut self) -> Self {
        self.from_pipeline = true;
        self
    }

    pub fn from_pipeline_by_name(mut self) -> Self {
        self.from_pipeline_by_name = true;
        self
    }

    /// Both names for diagnostics: `-عناصر/-items`.
    pub fn display_names(&self) -> String {
        match self.arabic {
            Some(arabic) => format!("-{arabic}/-{}", self.name),
            None => format!("-{}", self.name),
        }
    }

    pub fn matches_name(&self, candidate: &str) -> bool {
        if let Some(arabic) = self.arabic {
            if arabic == candidate {
                return true;
            }
        }
        self.name.eq_ignore_ascii_case(candidate)
    }
}

/// A registered command.
#[derive(Clone)]
pub struct CommandSpec {
    /// Primary (Arabic) name.
    pub name: &'static str,
    /// Optional English alias.
    pub english: Option<&'static str>,
    pub summary_ar: &'static str,
    pub summary_en: &'static str,
    pub params: Vec<ParameterSpec>,
    pub factory: fn() -> Box<dyn CommandHandler>,
}

impl std::fmt::Debug for CommandSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandSpec")
            .field("name", &self.name)
            .field("english", &self.english)
            .field("params", &self.params.len())
            .finish()
    }
}

/// Case-insensitive name → descriptor map, filled once at startup.
pub struct CommandRegistry {
    specs: Vec<CommandSpec>,
    index: HashMap<String, usize>,
}

impl CommandRegistry {
    pub fn empty() -> Self {
        CommandRegistry {
            specs: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Registry with the built-in command set.
    pub fn with_builtins() -> Self {
        let mut registry = CommandRegistry::empty();
        for spec in commands::builtin_specs() {
            registry.register(spec);
        }
        debug!(
            target: "exec.registry",
            commands = registry.specs.len(),
            "registry_initialized"
        );
        registry
    }

    pub fn register(&mut self, spec: CommandSpec) {
        let idx = self.specs.len();
        self.index.insert(fold(spec.name), idx);
        if let Some(english) = spec.english {
            self.index.insert(fold(english), idx);
        }
        self.specs.push(spec);
    }

    /// Resolve a command name (Arabic primary or English alias),
    /// case-insensitively.
    pub fn resolve(&self, name: &str) -> Option<&CommandSpec> {
        self.index.get(&fold(name)).map(|&idx| &self.specs[idx])
    }

    /// All specs in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &CommandSpec> {
        self.specs.iter()
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

fn fold(name: &str) -> String {
    name.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtins_resolve_by_arabic_and_english() {
        let registry = CommandRegistry::with_builtins();
        assert!(registry.resolve("اطبع").is_some());
        assert!(registry.resolve("echo").is_some());
        assert!(registry.resolve("ECHO").is_some(), "lookup is case-insensitive");
        assert_eq!(
            registry.resolve("echo").unwrap().name,
            registry.resolve("اطبع").unwrap().name
        );
        assert!(registry.resolve("no-such-command").is_none());
    }

    #[test]
    fn builtin_surface_is_complete() {
        let registry = CommandRegistry::with_builtins();
        for name in [
            "مساعدة",
            "الأوامر",
            "اطبع",
            "انتقل",
            "المسار",
            "اعرض",
            "اختبار-مصفوفة",
            "اختبار-نوع",
            "لغة",
        ] {
            assert!(registry.resolve(name).is_some(), "missing builtin {name}");
        }
    }

    #[test]
    fn parameter_names_match_both_aliases() {
        let spec = ParameterSpec::new("hidden", Some("مخفي"), ParamType::Bool).switch();
        assert!(spec.matches_name("hidden"));
        assert!(spec.matches_name("HIDDEN"));
        assert!(spec.matches_name("مخفي"));
        assert!(!spec.matches_name("visible"));
        assert_eq!(spec.display_names(), "-مخفي/-hidden");
    }
}
