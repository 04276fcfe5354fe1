//! Directory commands: `انتقل` (cd), `المسار` (pwd), `اعرض` (ls). All of
//! them act on the session directory; the process working directory never
//! changes.

use crate::command::{BoundArgs, CommandHandler, StageContext};
use crate::error::ShellError;
use crate::registry::{CommandSpec, ParameterSpec};
use crate::session::normalize_path;
use crate::value::{ParamType, PipelineItem, Value};

pub fn cd_spec() -> CommandSpec {
    CommandSpec {
        name: "انتقل",
        english: Some("cd"),
        summary_ar: "يغير مجلد الجلسة الحالي",
        summary_en: "change the session's current directory",
        params: vec![ParameterSpec::new("path", Some("مسار"), ParamType::Str)
            .at_position(0)
            .mandatory()],
        factory: || Box::new(CdCommand),
    }
}

pub struct CdCommand;

impl CommandHandler for CdCommand {
    fn process(
        &mut self,
        args: &BoundArgs,
        _input: Option<&PipelineItem>,
        ctx: &mut StageContext,
    ) -> Result<(), ShellError> {
        let path = args.get_text("path").expect("mandatory parameter bound");
        let mut session = ctx.session.write().expect("session lock");
        session.set_current_dir(&path)?;
        Ok(())
    }
}

pub fn pwd_spec() -> CommandSpec {
    CommandSpec {
        name: "المسار",
        english: Some("pwd"),
        summary_ar: "يطبع مجلد الجلسة الحالي",
        summary_en: "print the session's current directory",
        params: vec![],
        factory: || Box::new(PwdCommand),
    }
}

pub struct PwdCommand;

impl CommandHandler for PwdCommand {
    fn process(
        &mut self,
        _args: &BoundArgs,
        _input: Option<&PipelineItem>,
        ctx: &mut StageContext,
    ) -> Result<(), ShellError> {
        let dir = {
            let session = ctx.session.read().expect("session lock");
            session.current_dir().display().to_string()
        };
        ctx.out.emit(Value::Str(dir));
        Ok(())
    }
}

pub fn list_spec() -> CommandSpec {
    CommandSpec {
        name: "اعرض",
        english: Some("ls"),
        summary_ar: "يسرد محتويات المجلد",
        summary_en: "list directory entries",
        params: vec![
            ParameterSpec::new("path", Some("مسار"), ParamType::Str).at_position(0),
            ParameterSpec::new("hidden", Some("مخفي"), ParamType::Bool).switch(),
        ],
        factory: || Box::new(ListCommand),
    }
}

pub struct ListCommand;

impl CommandHandler for ListCommand {
    fn process(
        &mut self,
        args: &BoundArgs,
        _input: Option<&PipelineItem>,
        ctx: &mut StageContext,
    ) -> Result<(), ShellError> {
        let show_hidden = args.get_bool("hidden");
        let base = {
            let session = ctx.session.read().expect("session lock");
            session.current_dir().to_path_buf()
        };
        let target = match args.get_text("path") {
            Some(path) => normalize_path(&base, std::path::Path::new(&path)),
            None => base,
        };

        let entries = std::fs::read_dir(&target).map_err(|source| {
            ShellError::handler("اعرض", format!("{}: {source}", target.display()))
        })?;
        let mut names: Vec<String> = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| {
                ShellError::handler("اعرض", format!("{}: {source}", target.display()))
            })?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if show_hidden || !name.starts_with('.') {
                names.push(name);
            }
        }
        // Stable order across invocations.
        names.sort_unstable();
        for name in names {
            ctx.out.emit(Value::Str(name));
        }
        Ok(())
    }
}
