//! Binding demonstration harnesses: `اختبار-مصفوفة` exercises array
//! parameters, `اختبار-نوع` exercises type-literal arguments.

use crate::command::{BoundArgs, CommandHandler, StageContext};
use crate::error::ShellError;
use crate::registry::{CommandSpec, ParameterSpec};
use crate::value::{ParamType, PipelineItem, Value};

pub fn array_test_spec() -> CommandSpec {
    CommandSpec {
        name: "اختبار-مصفوفة",
        english: None,
        summary_ar: "يوضح ربط معامل مصفوفة",
        summary_en: "demonstrate array parameter binding",
        params: vec![ParameterSpec::new("items", Some("عناصر"), ParamType::StrList)
            .at_position(0)],
        factory: || Box::new(ArrayTestCommand),
    }
}

pub struct ArrayTestCommand;

impl CommandHandler for ArrayTestCommand {
    fn process(
        &mut self,
        args: &BoundArgs,
        _input: Option<&PipelineItem>,
        ctx: &mut StageContext,
    ) -> Result<(), ShellError> {
        let items = args.get_list("items");
        ctx.out
            .emit(Value::Str(format!("العدد: {}", items.len())));
        for (index, item) in items.iter().enumerate() {
            ctx.out
                .emit(Value::Str(format!("{index}: {}", item.to_text())));
        }
        Ok(())
    }
}

pub fn type_test_spec() -> CommandSpec {
    CommandSpec {
        name: "اختبار-نوع",
        english: None,
        summary_ar: "يوضح ربط معامل نوع حرفي",
        summary_en: "demonstrate type-literal parameter binding",
        params: vec![ParameterSpec::new("type", Some("نوع"), ParamType::Str)
            .at_position(0)
            .mandatory()],
        factory: || Box::new(TypeTestCommand),
    }
}

pub struct TypeTestCommand;

impl CommandHandler for TypeTestCommand {
    fn process(
        &mut self,
        args: &BoundArgs,
        _input: Option<&PipelineItem>,
        ctx: &mut StageContext,
    ) -> Result<(), ShellError> {
        let name = args.get_text("type").expect("mandatory parameter bound");
        ctx.out.emit(Value::Str(format!("النوع: [{name}]")));
        Ok(())
    }
}
