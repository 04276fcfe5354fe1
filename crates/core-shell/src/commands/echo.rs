//! `اطبع` / `echo`: write arguments (or pipeline input) to the output
//! pipeline.

use crate::command::{BoundArgs, CommandHandler, StageContext};
use crate::error::ShellError;
use crate::registry::{CommandSpec, ParameterSpec};
use crate::value::{ParamType, PipelineItem, Value};

pub fn echo_spec() -> CommandSpec {
    CommandSpec {
        name: "اطبع",
        english: Some("echo"),
        summary_ar: "يكتب الوسائط إلى أنبوب الإخراج",
        summary_en: "write arguments to the output pipeline",
        params: vec![
            ParameterSpec::new("text", Some("نص"), ParamType::StrList)
                .at_position(0)
                .from_pipeline(),
            ParameterSpec::new("separator", Some("فاصل"), ParamType::Str),
        ],
        factory: || Box::new(EchoCommand),
    }
}

pub struct EchoCommand;

impl CommandHandler for EchoCommand {
    fn process(
        &mut self,
        args: &BoundArgs,
        input: Option<&PipelineItem>,
        ctx: &mut StageContext,
    ) -> Result<(), ShellError> {
        // With upstream input, act as passthrough; otherwise join the bound
        // arguments into one line.
        if let Some(item) = input {
            ctx.out.emit_item(item.clone());
            return Ok(());
        }
        let separator = args.get_text("separator").unwrap_or_else(|| " ".into());
        let pieces: Vec<String> = args
            .get_list("text")
            .iter()
            .map(Value::to_text)
            .collect();
        ctx.out.emit(Value::Str(pieces.join(&separator)));
        Ok(())
    }
}
