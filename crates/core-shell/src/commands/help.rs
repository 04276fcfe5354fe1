//! `مساعدة` (help) and `الأوامر` (command listing).

use crate::command::{BoundArgs, CommandHandler, StageContext};
use crate::error::ShellError;
use crate::registry::{CommandSpec, ParameterSpec};
use crate::session::Language;
use crate::value::{ParamType, PipelineItem, Value};

pub fn help_spec() -> CommandSpec {
    CommandSpec {
        name: "مساعدة",
        english: Some("help"),
        summary_ar: "يعرض المساعدة، أو مساعدة أمر معين",
        summary_en: "show help, or help for one command",
        params: vec![ParameterSpec::new("command", Some("أمر"), ParamType::Str).at_position(0)],
        factory: || Box::new(HelpCommand),
    }
}

pub struct HelpCommand;

fn summary_for(spec: &CommandSpec, language: Language) -> &'static str {
    match language {
        Language::Arabic => spec.summary_ar,
        Language::English => spec.summary_en,
    }
}

fn describe(spec: &CommandSpec, language: Language) -> String {
    let alias = spec
        .english
        .map(|english| format!(" ({english})"))
        .unwrap_or_default();
    format!("{}{alias} - {}", spec.name, summary_for(spec, language))
}

impl CommandHandler for HelpCommand {
    fn process(
        &mut self,
        args: &BoundArgs,
        _input: Option<&PipelineItem>,
        ctx: &mut StageContext,
    ) -> Result<(), ShellError> {
        let language = ctx.session.read().expect("session lock").language;
        match args.get_text("command") {
            Some(name) => {
                let Some(spec) = ctx.registry.resolve(&name) else {
                    return Err(ShellError::CommandNotFound { name });
                };
                ctx.out.emit(Value::Str(describe(spec, language)));
                for param in &spec.params {
                    let mut line = format!("  {}", param.display_names());
                    if param.mandatory {
                        line.push_str(match language {
                            Language::Arabic => " (إلزامي)",
                            Language::English => " (mandatory)",
                        });
                    }
                    if param.switch {
                        line.push_str(match language {
                            Language::Arabic => " [مفتاح]",
                            Language::English => " [switch]",
                        });
                    }
                    ctx.out.emit(Value::Str(line));
                }
            }
            None => {
                let heading = match language {
                    Language::Arabic => "الأوامر المتاحة، اكتب: مساعدة <أمر> للتفاصيل",
                    Language::English => "available commands; type: help <command> for details",
                };
                ctx.out.emit(Value::str(heading));
                for spec in ctx.registry.iter() {
                    ctx.out.emit(Value::Str(describe(spec, language)));
                }
            }
        }
        Ok(())
    }
}

pub fn commands_spec() -> CommandSpec {
    CommandSpec {
        name: "الأوامر",
        english: None,
        summary_ar: "يسرد الأوامر المتاحة",
        summary_en: "list available commands",
        params: vec![],
        factory: || Box::new(CommandsCommand),
    }
}

pub struct CommandsCommand;

impl CommandHandler for CommandsCommand {
    fn process(
        &mut self,
        _args: &BoundArgs,
        _input: Option<&PipelineItem>,
        ctx: &mut StageContext,
    ) -> Result<(), ShellError> {
        let language = ctx.session.read().expect("session lock").language;
        for spec in ctx.registry.iter() {
            ctx.out.emit(Value::Str(describe(spec, language)));
        }
        Ok(())
    }
}
