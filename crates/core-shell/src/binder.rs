//! Parameter binding: parsed arguments → declared parameters.
//!
//! Binding is two-phase. Static binding runs once per stage before
//! `begin`: names first (Arabic alias, then English, case-insensitive),
//! then positions (array parameters swallow the remaining tail), then the
//! mandatory check. Pipeline binding runs once per input item and is
//! forgiving: a failed conversion keeps the previously bound value.

use tracing::debug;

use core_lang::{Argument, ParsedCommand};

use crate::command::BoundArgs;
use crate::error::ShellError;
use crate::registry::{CommandSpec, ParameterSpec};
use crate::value::{convert, ParamType, PipelineItem, Value};

/// Static (pre-`begin`) binding. Returns the bound values plus non-fatal
/// warnings (unused arguments, unknown parameter names).
pub fn bind_static(
    spec: &CommandSpec,
    cmd: &ParsedCommand,
) -> Result<(BoundArgs, Vec<String>), ShellError> {
    let mut bound = BoundArgs::default();
    let mut warnings = Vec::new();
    let mut used_args = vec![false; cmd.args.len()];
    let mut used_params = vec![false; cmd.params.len()];

    for param in &spec.params {
        if let Some(idx) = find_named(cmd, &used_params, param) {
            used_params[idx] = true;
            bind_named(spec, param, cmd.params[idx].1.as_ref(), &mut bound)?;
            continue;
        }
        if let Some(position) = param.position {
            bind_positional(spec, param, position, cmd, &mut used_args, &mut bound)?;
        }
        if param.mandatory && !bound.contains(param.name) {
            return Err(ShellError::binding(
                spec.name,
                format!("المعامل الإلزامي مفقود (missing mandatory parameter) {}", param.display_names()),
            ));
        }
    }

    for (idx, (name, _)) in cmd.params.iter().enumerate() {
        if !used_params[idx] {
            warnings.push(format!("unknown parameter -{name} ignored"));
        }
    }
    for (idx, arg) in cmd.args.iter().enumerate() {
        if !used_args[idx] && !matches!(arg, Argument::TypeLiteral(_)) {
            warnings.push(format!(
                "unused positional argument {:?}",
                argument_text(arg)
            ));
        }
    }

    Ok((bound, warnings))
}

fn find_named(cmd: &ParsedCommand, used: &[bool], param: &ParameterSpec) -> Option<usize> {
    cmd.params
        .iter()
        .enumerate()
        .find(|(idx, (name, _))| !used[*idx] && param.matches_name(name))
        .map(|(idx, _)| idx)
}

fn bind_named(
    spec: &CommandSpec,
    param: &ParameterSpec,
    value: Option<&Argument>,
    bound: &mut BoundArgs,
) -> Result<(), ShellError> {
    if param.switch {
        let flag = match value {
            None => true,
            Some(arg) => match argument_text(arg).to_ascii_lowercase().as_str() {
                "true" => true,
                "false" => false,
                other => {
                    return Err(ShellError::binding(
                        spec.name,
                        format!(
                            "switch {} does not take a value (got {other:?})",
                            param.display_names()
                        ),
                    ))
                }
            },
        };
        bound.insert(param.name, Value::Bool(flag));
        return Ok(());
    }

    let Some(arg) = value else {
        return Err(ShellError::binding(
            spec.name,
            format!("parameter {} requires a value", param.display_names()),
        ));
    };
    let value = convert_argument(spec, param, arg)?;
    bound.insert(param.name, value);
    Ok(())
}

fn bind_positional(
    spec: &CommandSpec,
    param: &ParameterSpec,
    position: usize,
    cmd: &ParsedCommand,
    used_args: &mut [bool],
    bound: &mut BoundArgs,
) -> Result<(), ShellError> {
    if param.ty == ParamType::StrList {
        // Array parameter: every unused argument from its position onward.
        let mut items = Vec::new();
        for idx in position..cmd.args.len() {
            if !used_args[idx] {
                used_args[idx] = true;
                items.push(Value::Str(argument_text(&cmd.args[idx])));
            }
        }
        if !items.is_empty() {
            bound.insert(param.name, Value::List(items));
        }
        return Ok(());
    }

    let next = (position..cmd.args.len()).find(|&idx| !used_args[idx]);
    if let Some(idx) = next {
        used_args[idx] = true;
        let value = convert_argument(spec, param, &cmd.args[idx])?;
        bound.insert(param.name, value);
    }
    Ok(())
}

fn convert_argument(
    spec: &CommandSpec,
    param: &ParameterSpec,
    arg: &Argument,
) -> Result<Value, ShellError> {
    let raw = Value::Str(argument_text(arg));
    convert(&raw, param.ty).map_err(|err| {
        ShellError::binding(
            spec.name,
            format!("{}: {err}", param.display_names()),
        )
    })
}

fn argument_text(arg: &Argument) -> String {
    match arg {
        Argument::Literal(text) => text.clone(),
        Argument::TypeLiteral(name) => name.clone(),
        // The executor substitutes sub-expressions before binding; an
        // unevaluated one binds as empty text.
        Argument::SubExpr(_) => String::new(),
    }
}

/// Per-item pipeline binding. Failures are logged and the parameter keeps
/// its previous value.
pub fn bind_pipeline(spec: &CommandSpec, bound: &mut BoundArgs, item: &PipelineItem) {
    for param in &spec.params {
        if param.from_pipeline {
            match convert(&item.value, param.ty) {
                Ok(value) => bound.insert(param.name, value),
                Err(err) => debug!(
                    target: "exec.binder",
                    command = spec.name,
                    parameter = param.name,
                    %err,
                    "pipeline_binding_failed"
                ),
            }
        } else if param.from_pipeline_by_name {
            let property = item
                .value
                .property(param.name)
                .or_else(|| param.arabic.and_then(|arabic| item.value.property(arabic)));
            if let Some(value) = property {
                match convert(value, param.ty) {
                    Ok(converted) => bound.insert(param.name, converted),
                    Err(err) => debug!(
                        target: "exec.binder",
                        command = spec.name,
                        parameter = param.name,
                        %err,
                        "pipeline_property_binding_failed"
                    ),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{CommandHandler, StageContext};

    struct NullHandler;
    impl CommandHandler for NullHandler {
        fn process(
            &mut self,
            _args: &BoundArgs,
            _input: Option<&PipelineItem>,
            _ctx: &mut StageContext,
        ) -> Result<(), ShellError> {
            Ok(())
        }
    }

    fn spec_with(params: Vec<ParameterSpec>) -> CommandSpec {
        CommandSpec {
            name: "اختبار",
            english: Some("probe"),
            summary_ar: "",
            summary_en: "",
            params,
            factory: || Box::new(NullHandler),
        }
    }

    fn cmd(args: Vec<Argument>, params: Vec<(&str, Option<Argument>)>) -> ParsedCommand {
        let mut out = ParsedCommand::named("اختبار");
        out.args = args;
        out.params = params
            .into_iter()
            .map(|(name, value)| (name.to_string(), value))
            .collect();
        out
    }

    #[test]
    fn binds_by_arabic_alias_before_english() {
        let spec = spec_with(vec![ParameterSpec::new(
            "path",
            Some("مسار"),
            ParamType::Str,
        )]);
        let parsed = cmd(vec![], vec![("مسار", Some(Argument::Literal("/tmp".into())))]);
        let (bound, warnings) = bind_static(&spec, &parsed).unwrap();
        assert_eq!(bound.get_text("path").as_deref(), Some("/tmp"));
        assert!(warnings.is_empty());
    }

    #[test]
    fn positional_binding_in_declaration_order() {
        let spec = spec_with(vec![
            ParameterSpec::new("first", None, ParamType::Str).at_position(0),
            ParameterSpec::new("second", None, ParamType::Int).at_position(1),
        ]);
        let parsed = cmd(
            vec![
                Argument::Literal("a".into()),
                Argument::Literal("42".into()),
            ],
            vec![],
        );
        let (bound, warnings) = bind_static(&spec, &parsed).unwrap();
        assert_eq!(bound.get_text("first").as_deref(), Some("a"));
        assert_eq!(bound.get("second"), Some(&Value::Int(42)));
        assert!(warnings.is_empty());
    }

    #[test]
    fn named_binding_frees_the_position() {
        // `probe -first x y`: y should land in the second slot even though
        // it is the first positional argument.
        let spec = spec_with(vec![
            ParameterSpec::new("first", None, ParamType::Str).at_position(0),
            ParameterSpec::new("second", None, ParamType::Str).at_position(1),
        ]);
        let parsed = cmd(
            vec![Argument::Literal("y".into())],
            vec![("first", Some(Argument::Literal("x".into())))],
        );
        let (bound, _) = bind_static(&spec, &parsed).unwrap();
        assert_eq!(bound.get_text("first").as_deref(), Some("x"));
        assert_eq!(bound.get_text("second").as_deref(), Some("y"));
    }

    #[test]
    fn array_parameter_consumes_remaining_tail() {
        let spec = spec_with(vec![
            ParameterSpec::new("head", None, ParamType::Str).at_position(0),
            ParameterSpec::new("rest", None, ParamType::StrList).at_position(1),
        ]);
        let parsed = cmd(
            vec![
                Argument::Literal("a".into()),
                Argument::Literal("b".into()),
                Argument::Literal("c".into()),
            ],
            vec![],
        );
        let (bound, warnings) = bind_static(&spec, &parsed).unwrap();
        assert_eq!(bound.get_text("head").as_deref(), Some("a"));
        assert_eq!(
            bound.get("rest"),
            Some(&Value::List(vec![Value::str("b"), Value::str("c")]))
        );
        assert!(warnings.is_empty());
    }

    #[test]
    fn missing_mandatory_parameter_names_both_aliases() {
        let spec = spec_with(vec![ParameterSpec::new(
            "path",
            Some("مسار"),
            ParamType::Str,
        )
        .at_position(0)
        .mandatory()]);
        let parsed = cmd(vec![], vec![]);
        let err = bind_static(&spec, &parsed).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("-مسار/-path"), "got {message}");
    }

    #[test]
    fn switch_rules() {
        let spec = spec_with(vec![ParameterSpec::new(
            "hidden",
            Some("مخفي"),
            ParamType::Bool,
        )
        .switch()]);

        let (bound, _) = bind_static(&spec, &cmd(vec![], vec![("مخفي", None)])).unwrap();
        assert!(bound.get_bool("hidden"));

        let (bound, _) = bind_static(
            &spec,
            &cmd(vec![], vec![("hidden", Some(Argument::Literal("false".into())))]),
        )
        .unwrap();
        assert!(!bound.get_bool("hidden"));

        let err = bind_static(
            &spec,
            &cmd(vec![], vec![("hidden", Some(Argument::Literal("maybe".into())))]),
        )
        .unwrap_err();
        assert!(matches!(err, ShellError::Binding { .. }));
    }

    #[test]
    fn valueless_non_switch_is_a_binding_error() {
        let spec = spec_with(vec![ParameterSpec::new("count", None, ParamType::Int)]);
        let err = bind_static(&spec, &cmd(vec![], vec![("count", None)])).unwrap_err();
        assert!(matches!(err, ShellError::Binding { .. }));
    }

    #[test]
    fn conversion_failure_is_a_binding_error() {
        let spec =
            spec_with(vec![ParameterSpec::new("count", None, ParamType::Int).at_position(0)]);
        let err = bind_static(
            &spec,
            &cmd(vec![Argument::Literal("abc".into())], vec![]),
        )
        .unwrap_err();
        assert!(err.to_string().contains("cannot convert"));
    }

    #[test]
    fn unused_arguments_warn_except_type_literals() {
        let spec = spec_with(vec![]);
        let parsed = cmd(
            vec![
                Argument::Literal("stray".into()),
                Argument::TypeLiteral("int32".into()),
            ],
            vec![("unknown", None)],
        );
        let (_, warnings) = bind_static(&spec, &parsed).unwrap();
        assert_eq!(warnings.len(), 2, "stray literal + unknown name: {warnings:?}");
        assert!(warnings.iter().any(|w| w.contains("stray")));
        assert!(warnings.iter().any(|w| w.contains("unknown")));
    }

    #[test]
    fn pipeline_binding_converts_and_keeps_prior_on_failure() {
        let spec = spec_with(vec![ParameterSpec::new("text", None, ParamType::Int)
            .at_position(0)
            .from_pipeline()]);
        let parsed = cmd(vec![Argument::Literal("1".into())], vec![]);
        let (mut bound, _) = bind_static(&spec, &parsed).unwrap();
        assert_eq!(bound.get("text"), Some(&Value::Int(1)));

        bind_pipeline(&spec, &mut bound, &PipelineItem::output(Value::str("5")));
        assert_eq!(bound.get("text"), Some(&Value::Int(5)));

        // Unconvertible input: prior value survives.
        bind_pipeline(&spec, &mut bound, &PipelineItem::output(Value::str("xyz")));
        assert_eq!(bound.get("text"), Some(&Value::Int(5)));
    }

    #[test]
    fn pipeline_property_binding_by_name() {
        let spec = spec_with(vec![ParameterSpec::new("name", Some("اسم"), ParamType::Str)
            .from_pipeline_by_name()]);
        let (mut bound, _) = bind_static(&spec, &cmd(vec![], vec![])).unwrap();
        let record = Value::Record(vec![("اسم".into(), Value::str("ملف"))]);
        bind_pipeline(&spec, &mut bound, &PipelineItem::output(record));
        assert_eq!(bound.get_text("name").as_deref(), Some("ملف"));
    }
}
