//! `لغة`: switch the session's diagnostic language.

use crate::command::{BoundArgs, CommandHandler, StageContext};
use crate::error::ShellError;
use crate::registry::{CommandSpec, ParameterSpec};
use crate::session::Language;
use crate::value::{ParamType, PipelineItem, Value};

pub fn language_spec() -> CommandSpec {
    CommandSpec {
        name: "لغة",
        english: None,
        summary_ar: "يبدل لغة الجلسة (العربية أو الإنجليزية)",
        summary_en: "switch the session language (Arabic or English)",
        params: vec![ParameterSpec::new("name", Some("اسم"), ParamType::Str)
            .at_position(0)
            .mandatory()],
        factory: || Box::new(LanguageCommand),
    }
}

pub struct LanguageCommand;

impl CommandHandler for LanguageCommand {
    fn process(
        &mut self,
        args: &BoundArgs,
        _input: Option<&PipelineItem>,
        ctx: &mut StageContext,
    ) -> Result<(), ShellError> {
        let name = args.get_text("name").expect("mandatory parameter bound");
        let language = match name.to_lowercase().as_str() {
            "العربية" | "عربي" | "arabic" | "ar" => Language::Arabic,
            "الإنجليزية" | "إنجليزي" | "english" | "en" => Language::English,
            other => {
                return Err(ShellError::handler(
                    "لغة",
                    format!("لغة غير معروفة (unknown language): {other}"),
                ))
            }
        };
        ctx.session.write().expect("session lock").language = language;
        let confirmation = match language {
            Language::Arabic => "تم التبديل إلى العربية",
            Language::English => "switched to English",
        };
        ctx.out.emit(Value::str(confirmation));
        Ok(())
    }
}
